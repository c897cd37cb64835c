//! Error types for the cluster-state store boundary.

use thiserror::Error;

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors reported by a [`NodeStore`](crate::NodeStore) implementation.
///
/// `Conflict` is the only transient-retryable variant; the label update
/// protocol matches on it specifically and treats everything else as
/// terminal.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("version conflict updating node {node}")]
    Conflict { node: String },

    #[error("node not found: {0}")]
    NotFound(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("unexpected status {status} from {path}")]
    Status { status: u16, path: String },

    #[error("decode error: {0}")]
    Decode(String),
}

impl StoreError {
    /// Whether this error is the store's concurrent-modification signal.
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::Conflict { .. })
    }
}
