//! Service -> Pod linking by label-selector subset match.
//!
//! Both `Service.selector` and `Pod.labels` are stored as the `{:?}` debug
//! rendering of a `BTreeMap<String, String>` by the K8s syncer — the same
//! trick `k8s::build_rs_owner_map` uses to avoid a second Kubernetes API
//! round trip, generalized here to an in-memory subset match instead of an
//! exact lookup.

use std::collections::HashMap;

use graph_store::{GraphError, GraphStore};
use serde_json::json;
use tracing::info;

type LabelMap = HashMap<String, String>;

/// Parses `{"k1": "v1", "k2": "v2"}`-shaped debug output back into a map.
/// Label keys/values never contain commas in this workspace's data, so a
/// plain top-level split is safe.
fn parse_label_map(debug_str: &str) -> LabelMap {
    let trimmed = debug_str.trim().trim_start_matches('{').trim_end_matches('}');
    if trimmed.trim().is_empty() {
        return LabelMap::new();
    }
    trimmed
    .split(", ")
    .filter_map(|pair| pair.split_once(':'))
    .map(|(k, v)| (k.trim().trim_matches('"').to_string(), v.trim().trim_matches('"').to_string()))
    .filter(|(k, _)| !k.is_empty())
    .collect()
}

pub async fn link_services_to_pods(graph: &GraphStore) -> Result<i64, GraphError> {
    let services = graph
    .query(
        "MATCH (s:Service)
        WHERE s.selector IS NOT NULL AND s.selector <> '' AND s.selector <> '{}'
        RETURN s.name AS name, s.namespace AS namespace, s.cluster AS cluster, s.selector AS selector",
        vec![],
    )
    .await?;

    let mut count = 0i64;
    for svc in &services {
        let name: String = svc.get("name").unwrap_or_default();
        let namespace: String = svc.get("namespace").unwrap_or_default();
        let cluster: String = svc.get("cluster").unwrap_or_default();
        let selector_str: String = svc.get("selector").unwrap_or_default();
        let selector = parse_label_map(&selector_str);
        if selector.is_empty() {
            continue;
        }

        let pods = graph
        .query(
            "MATCH (p:Pod {namespace: $namespace, cluster: $cluster})
            RETURN p.name AS name, p.labels AS labels",
            vec![("namespace", json!(namespace)), ("cluster", json!(cluster))],
        )
        .await?;

        for pod in &pods {
            let pod_name: String = pod.get("name").unwrap_or_default();
            let labels_str: String = pod.get("labels").unwrap_or_default();
            let labels = parse_label_map(&labels_str);
            let matches = !labels.is_empty() && selector.iter().all(|(k, v)| labels.get(k) == Some(v));
            if !matches {
                continue;
            }

            graph
            .write(
                "MATCH (s:Service {name: $name, namespace: $namespace, cluster: $cluster})
                MATCH (p:Pod {name: $pod_name, namespace: $namespace, cluster: $cluster})
                MERGE (s)-[:SELECTS]->(p)",
                vec![
                    ("name", json!(name)),
                    ("namespace", json!(namespace)),
                    ("cluster", json!(cluster)),
                    ("pod_name", json!(pod_name)),
                ],
            )
            .await?;
            count += 1;
        }
    }

    info!(count, services = services.len(), "service->pod selector linking complete");
    Ok(count)
}
