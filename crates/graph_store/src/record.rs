use crate::error::{GraphError, Result};
use serde::de::DeserializeOwned;

/// A single result row, wrapping the driver's native row type.
///
/// Kept as a newtype rather than re-exporting `neo4rs::Row` directly so the
/// rest of the workspace depends on this crate's error type, not the driver's.
pub struct Record(pub(crate) neo4rs::Row);

impl Record {
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<T> {
        self.0.get::<T>(key).map_err(GraphError::Row)
    }

    pub fn get_opt<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.0.get::<T>(key).ok()
    }
}
