//! Runbook sync with relationship enrichment. Runbooks carry no
//! structured links to the rest of the graph — they link in by text match
//! against entity names already present from other syncers, so this module
//! runs late in the sync order and pre-fetches the names it matches against
//! once rather than per-runbook.

use serde_json::{json, Value};
use source_clients::ToolClient;
use tracing::info;

use crate::Result;

pub async fn sync_runbooks(graph: &graph_store::GraphStore, mcp: &ToolClient, knowledge_base_url: &str) -> Result<i64> {
    info!("syncing runbook relationships");

    let svc_rows = graph.query("MATCH (s:Service) RETURN s.name AS name", vec![]).await?;
    let known_services: Vec<String> = svc_rows
    .iter()
    .filter_map(|r| r.get_opt::<String>("name"))
    .filter(|n| n.len() > 3)
    .collect();

    let host_rows = graph.query("MATCH (h:Host) RETURN h.hostname AS hostname", vec![]).await?;
    let known_hosts: Vec<String> = host_rows
    .iter()
    .filter_map(|r| r.get_opt::<String>("hostname"))
    .filter(|h| h.len() > 3)
    .map(|h| h.to_lowercase())
    .collect();

    let alert_rows = graph.query("MATCH (a:Alert) RETURN a.name AS name", vec![]).await?;
    let known_alerts: Vec<String> = alert_rows.iter().filter_map(|r| r.get_opt::<String>("name")).collect();

    info!(
        services = known_services.len(),
        hosts = known_hosts.len(),
        alerts = known_alerts.len(),
        "pre-fetched entities for runbook matching",
    );

    let response = mcp.call_rest(knowledge_base_url, "/api/runbooks?limit=100").await;
    let runbooks = source_clients::extract_list(&response, &["runbooks"]);

    let mut count = 0i64;
    let mut rel_count = 0i64;
    for runbook in &runbooks {
        let Some(title) = runbook.get("title").and_then(Value::as_str).filter(|t| !t.is_empty()) else {
            continue;
        };
        let qdrant_id = runbook.get("id").and_then(Value::as_str).unwrap_or("");
        let trigger_pattern = runbook.get("trigger_pattern").and_then(Value::as_str).unwrap_or("");
        let path = runbook.get("path").and_then(Value::as_str).unwrap_or("");

        let domain = match runbook.get("domain").and_then(Value::as_str).filter(|d| !d.is_empty()) {
            Some(d) => d.to_string(),
            None => derive_domain(path),
        };

        let solution = runbook.get("solution").and_then(Value::as_str).unwrap_or("");
        let solution_preview: String = solution.chars().take(200).collect();
        let has_content = !solution.is_empty();
        let automation_level = runbook.get("automation_level").and_then(Value::as_str).unwrap_or("manual");

        let rows = graph
        .query(
            "MERGE (r:RunbookDocument {qdrant_id: $qdrant_id})
            SET r.title = $title,
            r.path = $path,
            r.domain = $domain,
            r.automation_level = $automation_level,
            r.trigger_pattern = $trigger_pattern,
            r.solution_preview = $solution_preview,
            r.has_content = $has_content,
            r.last_seen = datetime(),
            r.source = 'knowledge',
            r._sync_status = 'active'
            RETURN r.title AS title",
            vec![
                ("qdrant_id", json!(qdrant_id)),
                ("title", json!(title)),
                ("path", json!(path)),
                ("domain", json!(domain)),
                ("automation_level", json!(automation_level)),
                ("trigger_pattern", json!(trigger_pattern)),
                ("solution_preview", json!(solution_preview)),
                ("has_content", json!(has_content)),
            ],
        )
        .await?;
        if !rows.is_empty() {
            count += 1;
        }

        let solution_lower = format!("{solution} {title}").to_lowercase();

        if !trigger_pattern.is_empty() && !trigger_pattern.starts_with('*') {
            graph
            .write(
                "MATCH (r:RunbookDocument {qdrant_id: $qdrant_id})
                MERGE (a:Alert {name: $alert_name})
                MERGE (r)-[:RESOLVES]->(a)",
                vec![("qdrant_id", json!(qdrant_id)), ("alert_name", json!(trigger_pattern))],
            )
            .await?;
            rel_count += 1;
        }

        let title_normalized = normalize(title);
        for alert_name in &known_alerts {
            let alert_normalized = normalize(alert_name);
            if title_normalized == alert_normalized || solution_lower.contains(&alert_name.to_lowercase()) {
                graph
                .write(
                    "MATCH (r:RunbookDocument {qdrant_id: $qdrant_id})
                    MATCH (a:Alert {name: $alert_name})
                    MERGE (r)-[:RESOLVES]->(a)",
                    vec![("qdrant_id", json!(qdrant_id)), ("alert_name", json!(alert_name))],
                )
                .await?;
                rel_count += 1;
            }
        }

        for svc_name in &known_services {
            if solution_lower.contains(&svc_name.to_lowercase()) {
                graph
                .write(
                    "MATCH (r:RunbookDocument {qdrant_id: $qdrant_id})
                    MATCH (s:Service {name: $svc_name})
                    MERGE (r)-[:TROUBLESHOOTS]->(s)",
                    vec![("qdrant_id", json!(qdrant_id)), ("svc_name", json!(svc_name))],
                )
                .await?;
                rel_count += 1;
            }
        }

        for hostname in &known_hosts {
            if solution_lower.contains(hostname) {
                graph
                .write(
                    "MATCH (r:RunbookDocument {qdrant_id: $qdrant_id})
                    MATCH (h:Host {hostname: $hostname})
                    MERGE (r)-[:APPLIES_TO]->(h)",
                    vec![("qdrant_id", json!(qdrant_id)), ("hostname", json!(hostname))],
                )
                .await?;
                rel_count += 1;
            }
        }
    }

    info!(count, rel_count, "runbook sync complete");
    Ok(count)
}

fn normalize(s: &str) -> String {
    s.to_lowercase().replace([' ', '-', '_'], "")
}

fn derive_domain(path: &str) -> String {
    if path.is_empty() {
        return String::new();
    }
    let parts: Vec<&str> = path.replace('\\', "/").split('/').map(str::trim).collect();
    match parts.iter().position(|p| *p == "runbooks") {
        Some(idx) if idx + 1 < parts.len().saturating_sub(1) => parts[idx + 1].to_string(),
        Some(_) => String::new(),
        None if parts.len() > 1 => parts[0].to_string(),
        None => String::new(),
    }
}
