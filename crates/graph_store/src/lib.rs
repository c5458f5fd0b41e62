mod convert;
mod error;
mod record;

pub use error::{GraphError, Result};
pub use record::Record;

use serde_json::Value;
use tracing::warn;

/// Thin wrapper around the Bolt driver. Every syncer, linker and the
/// lifecycle manager talk to the graph exclusively through this type.
pub struct GraphStore {
    graph: neo4rs::Graph,
}

impl GraphStore {
    pub async fn connect(uri: &str, user: &str, password: &str) -> Result<Self> {
        let graph = neo4rs::Graph::new(uri, user, password)
            .await
            .map_err(GraphError::Connect)?;
        Ok(GraphStore { graph })
    }

    /// Run a read query and collect every row.
    pub async fn query(&self, cypher: &str, params: Vec<(&str, Value)>) -> Result<Vec<Record>> {
        let mut query = neo4rs::query(cypher);
        for (key, value) in params {
            query = query.param(key, convert::json_to_bolt(&value)?);
        }
        let mut stream = self.graph.execute(query).await.map_err(GraphError::Query)?;
        let mut rows = Vec::new();
        while let Some(row) = stream.next().await.map_err(GraphError::Query)? {
            rows.push(Record(row));
        }
        Ok(rows)
    }

    /// Run a write query and collect any `RETURN`ed rows.
    pub async fn write(&self, cypher: &str, params: Vec<(&str, Value)>) -> Result<Vec<Record>> {
        self.query(cypher, params).await
    }

    /// `UNWIND $rows AS row <cypher_tail>` bulk merge, skipping the round
    /// trip entirely when there is nothing to write.
    ///
    /// `cypher_tail` references the unwound row as `row`, e.g.:
    ///
    /// ```text
    /// MERGE (d:Deployment {name: row.name, namespace: row.namespace})
    /// SET d.replicas = row.replicas
    /// ```
    pub async fn batch_merge(&self, cypher_tail: &str, rows: Vec<Value>) -> Result<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let list = convert::json_to_bolt(&Value::Array(rows))?;
        let full = format!("UNWIND $rows AS row {cypher_tail}");
        let query = neo4rs::query(&full).param("rows", list);
        self.graph.run(query).await.map_err(GraphError::Query)?;
        Ok(())
    }

    /// Returns `true` if the database responds to a trivial query.
    pub async fn verify(&self) -> bool {
        match self.query("RETURN 1 AS ok", vec![]).await {
            Ok(_) => true,
            Err(err) => {
                warn!(error = %err, "graph store verification failed");
                false
            }
        }
    }

    /// `neo4rs::Graph` has no explicit close; the pool drops its connections
    /// when the last handle goes out of scope. Kept as an explicit method so
    /// callers don't need to know that, matching the driver-wrapper shape
    /// every other client in this workspace uses.
    pub fn close(self) {
        drop(self.graph);
    }
}
