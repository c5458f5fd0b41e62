use thiserror::Error;

#[derive(Error, Debug)]
pub enum GraphError {
    #[error("failed to connect to graph store: {0}")]
    Connect(#[source] neo4rs::Error),

    #[error("query failed: {0}")]
    Query(#[source] neo4rs::Error),

    #[error("failed to deserialize row: {0}")]
    Row(#[source] neo4rs::DeError),

    #[error("unsupported value in batch row: {0}")]
    UnsupportedValue(String),
}

impl GraphError {
    pub fn metric_label(&self) -> String {
        format!("{self:?}").to_lowercase()
    }
}

pub type Result<T, E = GraphError> = std::result::Result<T, E>;
