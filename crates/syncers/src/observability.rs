//! Coroot (service health + dependency map), Gatus (uptime), Keep (alerts),
//! and Grafana (dashboards) sync. Coroot enriches existing Service
//! nodes in place rather than creating new ones — it has no notion of a
//! Kubernetes Deployment/namespace identity, only a dependency graph keyed
//! by its own opaque ids, so it piggybacks on whatever the K8s syncer
//! already created.

use serde_json::{json, Value};
use source_clients::ToolClient;
use tracing::info;

use crate::Result;

const COROOT_CLUSTER_IDS: &[&str] = &["jd756uxv", "qorspfs5", "loka6zue"];

fn coroot_cluster_name(id: &str) -> Option<&'static str> {
    match id {
        "jd756uxv" => Some("prod"),
        "qorspfs5" => Some("agentic"),
        "loka6zue" => Some("monit"),
        _ => None,
    }
}

/// Splits a coroot node id into `(namespace, name)`. Accepts the 4-part
/// `cluster:namespace:kind:name` form, the 2-part `namespace:name` form, and
/// a slash-separated `namespace/name` fallback.
fn parse_coroot_id(id: &str) -> Option<(String, String)> {
    if id.contains(':') {
        let parts: Vec<&str> = id.split(':').collect();
        match parts.len() {
            4 => Some((parts[1].to_string(), parts[3].to_string())),
            2 => Some((parts[0].to_string(), parts[1].to_string())),
            _ => None,
        }
    } else if let Some((ns, name)) = id.split_once('/') {
        Some((ns.to_string(), name.to_string()))
    } else {
        None
    }
}

fn is_noise_name(name: &str) -> bool {
    name.chars().all(|c| c.is_ascii_digit()) || name.contains('.')
}

pub async fn sync_coroot_services(graph: &graph_store::GraphStore, mcp: &ToolClient) -> Result<i64> {
    info!("syncing coroot service health");
    let response = mcp.call_tool("observability", "coroot_list_services", json!({})).await;
    let services = source_clients::extract_list(&response, &["services", "result"]);
    if services.is_empty() {
        info!("no coroot services returned, skipping");
        return Ok(0);
    }

    let mut count = 0i64;
    let mut anomalous = 0i64;
    for svc in &services {
        let Some(coroot_id) = svc.get("id").and_then(Value::as_str) else { continue };
        if COROOT_CLUSTER_IDS.contains(&coroot_id) {
            continue;
        }
        let Some((namespace, name)) = parse_coroot_id(coroot_id) else {
            anomalous += 1;
            continue;
        };
        if is_noise_name(&name) {
            continue;
        }

        let raw_status = svc.get("status").and_then(Value::as_str).unwrap_or("unknown");
        let status = match raw_status {
            "ok" => "healthy",
            "warning" => "warning",
            "critical" | "error" => "critical",
            other => other,
        };

        let rows = graph
        .query(
            "MATCH (s:Service {name: $name, namespace: $namespace})
            SET s.health_status = $status,
            s.coroot_id = $coroot_id,
            s.last_health_check = datetime()
            RETURN s.name AS name",
            vec![
                ("name", json!(name)),
                ("namespace", json!(namespace)),
                ("status", json!(status)),
                ("coroot_id", json!(coroot_id)),
            ],
        )
        .await?;
        if !rows.is_empty() {
            count += 1;
        }
    }

    info!(count, anomalous, "coroot service health sync complete");
    Ok(count)
}

pub async fn sync_coroot_service_map(graph: &graph_store::GraphStore, mcp: &ToolClient) -> Result<i64> {
    info!("syncing coroot dependency map");
    let response = mcp.call_tool("observability", "coroot_get_application_map", json!({})).await;
    let nodes = source_clients::extract_list(&response, &["nodes", "result"]);
    if nodes.is_empty() {
        info!("no coroot map nodes returned, skipping");
        return Ok(0);
    }

    let mut count = 0i64;
    for node in &nodes {
        let Some(node_id) = node.get("id").and_then(Value::as_str) else { continue };
        let Some(cluster) = coroot_cluster_name(node_id) else { continue };
        let _ = cluster;
        let Some((namespace, name)) = parse_coroot_id(node_id) else { continue };

        for direction_key in ["upstreams", "downstreams"] {
            let Some(peers) = node.get(direction_key).and_then(Value::as_array) else { continue };
            for peer_id in peers.iter().filter_map(Value::as_str) {
                let Some((peer_ns, peer_name)) = parse_coroot_id(peer_id) else { continue };
                let (from_ns, from_name, to_ns, to_name) = if direction_key == "upstreams" {
                    (peer_ns, peer_name, namespace.clone(), name.clone())
                } else {
                    (namespace.clone(), name.clone(), peer_ns, peer_name)
                };

                graph
                .write(
                    "MATCH (a:Service {name: $from_name, namespace: $from_ns})
                    MATCH (b:Service {name: $to_name, namespace: $to_ns})
                    MERGE (a)-[r:DEPENDS_ON]->(b)
                    SET r.source = 'coroot'",
                    vec![
                        ("from_name", json!(from_name)),
                        ("from_ns", json!(from_ns)),
                        ("to_name", json!(to_name)),
                        ("to_ns", json!(to_ns)),
                    ],
                )
                .await?;
                count += 1;
            }
        }
    }

    info!(count, "coroot dependency map sync complete");
    Ok(count)
}

fn fuzzy_ratio(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    a.len() as f64 / b.len() as f64
}

/// Strips parenthetical asides, lowercases, and hyphenates whitespace —
/// mirrors the original's `re.sub(r"\(.*?\)", "", name).lower().strip()
/// .replace(" ", "-").rstrip("-")` so Service-name matching tolerates the
/// same cosmetic drift Gatus endpoint names carry.
fn normalize_monitor_name(name: &str) -> String {
    let mut without_parens = String::new();
    let mut depth = 0i32;
    for c in name.chars() {
        match c {
            '(' => depth += 1,
            ')' => depth = (depth - 1).max(0),
            _ if depth == 0 => without_parens.push(c),
            _ => {}
        }
    }
    without_parens.to_lowercase().trim().replace(' ', "-").trim_end_matches('-').to_string()
}

pub async fn sync_gatus_health(graph: &graph_store::GraphStore, mcp: &ToolClient, gatus_url: &str) -> Result<i64> {
    info!("syncing gatus uptime monitors");
    let response = mcp.call_rest(gatus_url, "/api/v1/endpoints/statuses").await;
    let endpoints = source_clients::extract_list(&response, &["endpoints"]);
    if endpoints.is_empty() {
        info!("no gatus endpoints returned, skipping");
        return Ok(0);
    }

    let mut count = 0i64;
    for endpoint in &endpoints {
        let Some(name) = endpoint.get("name").and_then(Value::as_str) else { continue };
        let group = endpoint.get("group").and_then(Value::as_str).unwrap_or("");
        // Gatus endpoints are keyed by `group_name`, not bare name; two
        // endpoints in different groups can legitimately share a name.
        let key = endpoint
        .get("key")
        .and_then(Value::as_str)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("{group}_{name}"));

        let results = endpoint.get("results").and_then(Value::as_array).cloned().unwrap_or_default();
        let total = results.len().max(1) as f64;
        let successes = results
        .iter()
        .filter(|r| r.get("success").and_then(Value::as_bool).unwrap_or(false))
        .count() as f64;
        let uptime = successes / total * 100.0;
        let last_success = results.last().and_then(|r| r.get("success")).and_then(Value::as_bool).unwrap_or(false);

        let status = if last_success && uptime >= 99.0 {
            "healthy"
        } else if last_success {
            "degraded"
        } else {
            "unhealthy"
        };

        graph
        .write(
            "MERGE (m:UptimeMonitor {key: $key})
            SET m.name = $name,
            m.group = $group,
            m.status = $status,
            m.uptime_percent = $uptime,
            m.last_seen = datetime(),
            m.source = 'gatus',
            m._sync_status = 'active'",
            vec![
                ("key", json!(key)),
                ("name", json!(name)),
                ("group", json!(group)),
                ("status", json!(status)),
                ("uptime", json!(uptime)),
            ],
        )
        .await?;
        count += 1;

        let clean_name = normalize_monitor_name(name);

        let linked = graph
        .query(
            "MATCH (m:UptimeMonitor {key: $key})
            MATCH (s:Service) WHERE toLower(s.name) = $clean_name
            MERGE (m)-[:MONITORS]->(s)
            RETURN s.name AS name",
            vec![("key", json!(key)), ("clean_name", json!(clean_name))],
        )
        .await?;
        if !linked.is_empty() {
            continue;
        }

        let candidates = graph
        .query(
            "MATCH (m:UptimeMonitor {key: $key})
            MATCH (s:Service)
            WHERE toLower(s.name) CONTAINS $clean_name OR $clean_name CONTAINS toLower(s.name)
            RETURN s.name AS name LIMIT 10",
            vec![("key", json!(key)), ("clean_name", json!(clean_name))],
        )
        .await?;
        let mut fuzzy_linked = false;
        for candidate in &candidates {
            let candidate_name: String = candidate.get_opt("name").unwrap_or_default();
            let ratio = fuzzy_ratio(&clean_name, &candidate_name);
            if (0.5..=2.0).contains(&ratio) {
                graph
                .write(
                    "MATCH (m:UptimeMonitor {key: $key})
                    MATCH (s:Service {name: $svc_name})
                    MERGE (m)-[:MONITORS]->(s)",
                    vec![("key", json!(key)), ("svc_name", json!(candidate_name))],
                )
                .await?;
                fuzzy_linked = true;
                break;
            }
        }
        if fuzzy_linked {
            continue;
        }

        graph
        .write(
            "MATCH (m:UptimeMonitor {key: $key})
            MATCH (n) WHERE (n:VM OR n:NAS OR n:Host) AND toLower(n.name) CONTAINS $clean_name
            WITH m, n LIMIT 1
            MERGE (m)-[:MONITORS]->(n)",
            vec![("key", json!(key)), ("clean_name", json!(clean_name))],
        )
        .await?;
    }

    info!(count, "gatus sync complete");
    Ok(count)
}

pub async fn sync_keep_alerts(graph: &graph_store::GraphStore, mcp: &ToolClient) -> Result<i64> {
    info!("syncing keep alerts");
    let response = mcp.call_tool("observability", "keep_list_alerts", json!({})).await;
    let alerts = source_clients::extract_list(&response, &["alerts", "result"]);
    if alerts.is_empty() {
        info!("no keep alerts returned, skipping");
        return Ok(0);
    }

    let mut count = 0i64;
    for alert in &alerts {
        let Some(name) = alert.get("name").or_else(|| alert.get("alertname")).and_then(Value::as_str) else {
            continue;
        };
        let raw_status = alert.get("status").and_then(Value::as_str).unwrap_or("firing");
        let status = match raw_status {
            "firing" => "firing",
            "resolved" => "resolved",
            "acknowledged" => "acknowledged",
            other => other,
        };
        let severity = alert.get("severity").and_then(Value::as_str).unwrap_or("warning");

        graph
        .write(
            "MERGE (a:Alert {name: $name})
            SET a.status = $status,
            a.severity = $severity,
            a.last_seen = datetime(),
            a.source = 'keep',
            a._sync_status = 'active'",
            vec![("name", json!(name)), ("status", json!(status)), ("severity", json!(severity))],
        )
        .await?;
        count += 1;

        if let Some(service) = alert.get("labels").and_then(|l| l.get("service")).and_then(Value::as_str) {
            graph
            .write(
                "MATCH (a:Alert {name: $name})
                MATCH (s:Service {name: $service})
                MERGE (a)-[:AFFECTS]->(s)",
                vec![("name", json!(name)), ("service", json!(service))],
            )
            .await?;
        }
    }

    info!(count, "keep alert sync complete");
    Ok(count)
}

pub async fn sync_grafana_dashboards(graph: &graph_store::GraphStore, mcp: &ToolClient) -> Result<i64> {
    info!("syncing grafana dashboards");
    let response = mcp.call_tool("observability", "grafana_list_dashboards", json!({})).await;
    let dashboards = source_clients::extract_list(&response, &["dashboards", "result"]);
    if dashboards.is_empty() {
        info!("no grafana dashboards returned, skipping");
        return Ok(0);
    }

    let mut count = 0i64;
    for dashboard in &dashboards {
        let Some(uid) = dashboard.get("uid").and_then(Value::as_str) else { continue };
        let title = dashboard.get("title").and_then(Value::as_str).unwrap_or(uid);
        let tags: Vec<String> = dashboard
        .get("tags")
        .and_then(Value::as_array)
        .map(|a| a.iter().filter_map(|t| t.as_str().map(str::to_string)).collect())
        .unwrap_or_default();

        graph
        .write(
            "MERGE (d:Dashboard {uid: $uid})
            SET d.title = $title,
            d.last_seen = datetime(),
            d.source = 'grafana',
            d._sync_status = 'active'",
            vec![("uid", json!(uid)), ("title", json!(title))],
        )
        .await?;
        count += 1;

        for tag in tags.iter().filter(|t| t.len() > 3) {
            graph
            .write(
                "MATCH (d:Dashboard {uid: $uid})
                MATCH (s:Service {name: $tag})
                MERGE (d)-[:VISUALIZES]->(s)",
                vec![("uid", json!(uid)), ("tag", json!(tag))],
            )
            .await?;
        }
    }

    info!(count, "grafana dashboard sync complete");
    Ok(count)
}
