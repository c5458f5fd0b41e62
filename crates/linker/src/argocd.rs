//! ArgoApp -> Service linking: five strategies, first-match-wins,
//! each tagged with `(strategy, confidence)` on the `DEPLOYS` edge. Strategy 1
//! never sets `confidence` at all — per Q3, a missing `confidence` reads as
//! `1.0` everywhere it's aggregated, so leaving it unset is itself correct
//! rather than an oversight.

use graph_store::{GraphError, GraphStore};
use serde_json::json;
use tracing::info;

/// Namespaces small and stable enough that "any Service in this namespace"
/// is an acceptable last-resort match for an otherwise-unlinked ArgoApp.
const BROAD_MATCH_NAMESPACE_ALLOWLIST: &[&str] = &["default", "monitoring", "media"];

pub async fn link_argo_apps_to_services(graph: &GraphStore) -> Result<i64, GraphError> {
    let mut count = 0i64;

    // Strategy 1: exact name match within the app's own target cluster. 1.0,
    // confidence left unset.
    let rows = graph
    .write(
        "MATCH (a:ArgoApp)
        WHERE NOT a.is_umbrella AND NOT (a)-[:DEPLOYS]->()
        MATCH (s:Service {name: a.name, cluster: a.target_cluster})
        MERGE (a)-[r:DEPLOYS]->(s)
        SET r.strategy = 'exact_name'
        RETURN a.name AS name",
        vec![],
    )
    .await?;
    count += rows.len() as i64;

    // Strategy 2: derived_namespace + name-prefix match. 0.9.
    let rows = graph
    .write(
        "MATCH (a:ArgoApp)
        WHERE NOT a.is_umbrella AND NOT (a)-[:DEPLOYS]->() AND a.derived_namespace <> ''
        MATCH (s:Service {namespace: a.derived_namespace})
        WHERE s.name STARTS WITH a.name OR a.name STARTS WITH s.name
        WITH a, s LIMIT 1
        MERGE (a)-[r:DEPLOYS]->(s)
        SET r.strategy = 'derived_namespace_prefix', r.confidence = 0.9
        RETURN a.name AS name",
        vec![],
    )
    .await?;
    count += rows.len() as i64;

    // Strategy 3: the trailing path segment equals the service name. 0.85.
    // `split`/`last` on a trailing-slash path gives an empty final element in
    // Cypher, so the tail is computed in Rust rather than leaning on
    // version-specific string trimming functions.
    let unlinked = graph
    .query(
        "MATCH (a:ArgoApp)
        WHERE NOT a.is_umbrella AND NOT (a)-[:DEPLOYS]->() AND a.path <> ''
        RETURN a.name AS name, a.path AS path",
        vec![],
    )
    .await?;
    for app in &unlinked {
        let name: String = app.get("name").unwrap_or_default();
        let path: String = app.get("path").unwrap_or_default();
        let tail = path.trim_end_matches('/').rsplit('/').next().unwrap_or("");
        if tail.is_empty() {
            continue;
        }
        let rows = graph
        .write(
            "MATCH (a:ArgoApp {name: $name})
            WHERE NOT (a)-[:DEPLOYS]->()
            MATCH (s:Service {name: $tail})
            WITH a, s LIMIT 1
            MERGE (a)-[r:DEPLOYS]->(s)
            SET r.strategy = 'path_tail', r.confidence = 0.85
            RETURN a.name AS name",
            vec![("name", json!(name)), ("tail", json!(tail))],
        )
        .await?;
        count += rows.len() as i64;
    }

    // Strategy 4: a Deployment whose name or selector mentions the app name
    // identifies the owning Service. 0.8.
    let rows = graph
    .write(
        "MATCH (a:ArgoApp)
        WHERE NOT a.is_umbrella AND NOT (a)-[:DEPLOYS]->()
        MATCH (d:Deployment)
        WHERE d.name = a.name OR d.name CONTAINS a.name OR d.selector CONTAINS a.name
        MATCH (s:Service {name: d.name, namespace: d.namespace, cluster: d.cluster})
        WITH a, s LIMIT 1
        MERGE (a)-[r:DEPLOYS]->(s)
        SET r.strategy = 'deployment_name', r.confidence = 0.8
        RETURN a.name AS name",
        vec![],
    )
    .await?;
    count += rows.len() as i64;

    // Strategy 5: broad namespace match, restricted to small allowlisted
    // namespaces so it can't silently attach an app to an unrelated Service
    // in a namespace that happens to share a handful of workloads. 0.6.
    for namespace in BROAD_MATCH_NAMESPACE_ALLOWLIST {
        let rows = graph
        .write(
            "MATCH (a:ArgoApp)
            WHERE NOT a.is_umbrella AND NOT (a)-[:DEPLOYS]->()
            MATCH (s:Service {namespace: $namespace})
            WITH a, count(s) AS svc_count, collect(s)[0] AS candidate
            WHERE svc_count > 0 AND svc_count < 5
            MERGE (a)-[r:DEPLOYS]->(candidate)
            SET r.strategy = 'broad_namespace', r.confidence = 0.6
            RETURN a.name AS name",
            vec![("namespace", json!(namespace))],
        )
        .await?;
        count += rows.len() as i64;
    }

    info!(count, "argocd->service linking complete");
    Ok(count)
}
