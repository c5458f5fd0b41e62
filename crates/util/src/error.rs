use thiserror::Error;

/// The umbrella error type for code that doesn't need a narrower, crate-local
/// surface. Crates with Bolt- or HTTP-specific failure modes (`graph_store`'s
/// `GraphError`) define their own `thiserror` enum instead and this one wraps
/// it with `#[from]`.
#[derive(Error, Debug)]
pub enum Error {
    #[error("graph store error: {0}")]
    Graph(#[from] graph_store::GraphError),

    #[error("kubernetes client error: {0}")]
    Kube(#[source] kube::Error),

    #[error("http client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("missing configuration: {0}")]
    Config(String),
}

impl Error {
    pub fn metric_label(&self) -> String {
        format!("{self:?}").to_lowercase()
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
