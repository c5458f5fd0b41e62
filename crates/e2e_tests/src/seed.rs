//! Direct Cypher fixtures for scenario setup. Bypasses the syncers
//! entirely — a test constructs exactly the graph shape one property needs
//! without standing up fake Kubernetes/Proxmox/TrueNAS servers.

use graph_store::{GraphError, GraphStore};
use serde_json::{json, Value};

pub struct Seed<'a> {
    graph: &'a GraphStore,
}

impl<'a> Seed<'a> {
    pub fn new(graph: &'a GraphStore) -> Self {
        Seed { graph }
    }

    pub async fn host(&self, hostname: &str, active: bool) -> Result<(), GraphError> {
        let status = if active { "active" } else { "stale" };
        self.graph
            .write(
                "MERGE (h:Host {hostname: $hostname}) SET h._sync_status = $status, h.last_seen = datetime()",
                vec![("hostname", json!(hostname)), ("status", json!(status))],
            )
            .await?;
        Ok(())
    }

    /// A bare `Network` node — created the way most syncers MERGE a
    /// network target: by name only, no `cidr`.
    pub async fn bare_network(&self, name: &str) -> Result<(), GraphError> {
        self.graph
            .write("MERGE (n:Network {name: $name})", vec![("name", json!(name))])
            .await?;
        Ok(())
    }

    /// An enriched `Network` node — the shape only the network-discovery
    /// syncer produces, carrying a `cidr`.
    pub async fn enriched_network(&self, name: &str, cidr: &str) -> Result<(), GraphError> {
        self.graph
            .write(
                "MERGE (n:Network {name: $name}) SET n.cidr = $cidr",
                vec![("name", json!(name)), ("cidr", json!(cidr))],
            )
            .await?;
        Ok(())
    }

    pub async fn connect(&self, from_label: &str, from_key: &str, rel: &str, to_label: &str, to_key: &str) -> Result<(), GraphError> {
        let cypher = format!(
            "MATCH (a:{from_label} {{name: $from}}), (b:{to_label} {{name: $to}}) \
             MERGE (a)-[:{rel}]->(b)"
        );
        self.graph.write(&cypher, vec![("from", json!(from_key)), ("to", json!(to_key))]).await?;
        Ok(())
    }

    pub async fn replicaset_owned_pod(
        &self,
        pod_name: &str,
        namespace: &str,
        deployment_name: &str,
        node_hostname: &str,
    ) -> Result<(), GraphError> {
        self.graph
            .write(
                "MERGE (d:Deployment {name: $deployment, namespace: $namespace}) \
                 SET d._sync_status = 'active' \
                 MERGE (h:Host {hostname: $host}) \
                 MERGE (p:Pod {name: $pod, namespace: $namespace}) \
                 SET p._sync_status = 'active', p.status = 'healthy' \
                 MERGE (p)-[:BELONGS_TO]->(d) \
                 MERGE (p)-[:SCHEDULED_ON]->(h)",
                vec![
                    ("deployment", json!(deployment_name)),
                    ("namespace", json!(namespace)),
                    ("host", json!(node_hostname)),
                    ("pod", json!(pod_name)),
                ],
            )
            .await?;
        Ok(())
    }

    /// A `Service`/`Pod` pair in the same namespace+cluster, with the
    /// selector/labels stored in the `{:?}`-debug-map string format the
    /// K8s syncer and the service↔pod linker both rely on.
    pub async fn service_selecting_pod(
        &self,
        service_name: &str,
        pod_name: &str,
        namespace: &str,
        cluster: &str,
        label_key: &str,
        label_value: &str,
    ) -> Result<(), GraphError> {
        let selector_str = format!("{{\"{label_key}\": \"{label_value}\"}}");
        self.graph
            .write(
                "MERGE (s:Service {name: $service, namespace: $namespace, cluster: $cluster}) \
                 SET s._sync_status = 'active', s.selector = $selector \
                 MERGE (p:Pod {name: $pod, namespace: $namespace, cluster: $cluster}) \
                 SET p._sync_status = 'active', p.labels = $selector",
                vec![
                    ("service", json!(service_name)),
                    ("pod", json!(pod_name)),
                    ("namespace", json!(namespace)),
                    ("cluster", json!(cluster)),
                    ("selector", json!(selector_str)),
                ],
            )
            .await?;
        Ok(())
    }

    pub async fn ingress_with_backend(&self, ingress_name: &str, namespace: &str, service_name: &str) -> Result<(), GraphError> {
        self.graph
            .write(
                "MERGE (s:Service {name: $service, namespace: $namespace}) \
                 SET s._sync_status = 'active' \
                 MERGE (i:Ingress {name: $ingress, namespace: $namespace}) \
                 SET i._sync_status = 'active', i.status = 'active' \
                 MERGE (i)-[:ROUTES_TO]->(s)",
                vec![
                    ("service", json!(service_name)),
                    ("ingress", json!(ingress_name)),
                    ("namespace", json!(namespace)),
                ],
            )
            .await?;
        Ok(())
    }

    /// A node carrying a non-empty `description`, which protects it from
    /// ever being marked orphaned.
    pub async fn described_node(&self, label: &str, name: &str, description: &str) -> Result<(), GraphError> {
        let cypher = format!(
            "MERGE (n:{label} {{name: $name}}) SET n._sync_status = 'active', n.description = $description"
        );
        self.graph
            .write(&cypher, vec![("name", json!(name)), ("description", json!(description))])
            .await?;
        Ok(())
    }

    /// A bare node with no relationships at all and no description — the
    /// unprotected-orphan case the protected-label and described-node tests
    /// are contrasted against.
    pub async fn bare_node(&self, label: &str, name: &str) -> Result<(), GraphError> {
        let cypher = format!("MERGE (n:{label} {{name: $name}}) SET n._sync_status = 'active'");
        self.graph.write(&cypher, vec![("name", json!(name))]).await?;
        Ok(())
    }

    pub async fn node_count(&self, label: &str) -> Result<i64, GraphError> {
        let cypher = format!("MATCH (n:{label}) RETURN count(n) AS c");
        let rows = self.graph.query(&cypher, vec![]).await?;
        match rows.first() {
            Some(row) => row.get::<i64>("c"),
            None => Ok(0),
        }
    }

    pub async fn set_orphan_since_days_ago(&self, label: &str, name: &str, days_ago: i64) -> Result<(), GraphError> {
        let cypher = format!(
            "MATCH (n:{label} {{name: $name}}) SET n.orphan_since = datetime() - duration({{days: $days}})"
        );
        self.graph
            .write(&cypher, vec![("name", json!(name)), ("days", Value::from(days_ago))])
            .await?;
        Ok(())
    }
}
