//! One module per external source, each implementing the fetch-normalize-
//! merge-mark contract: call the source client, shape rows keyed by
//! the graph's identity tuple, `batch_merge`, `mark_active`.
//!
//! Source-client failures are already swallowed at the `source_clients`
//! layer and surface here as empty results. A syncer only returns `Err`
//! when the graph store itself fails — the same boundary the orchestrator
//! wraps in a per-syncer try/catch.

pub mod homelab;
pub mod k8s;
pub mod knowledge;
pub mod network;
pub mod observability;
pub mod proxmox;
pub mod truenas;

pub use graph_store::GraphError;

pub type Result<T> = std::result::Result<T, GraphError>;
