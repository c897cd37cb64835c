//! Error types for the score domain.

use joulegrid_state::StoreError;
use thiserror::Error;

/// Result type alias for score operations.
pub type EnergyResult<T> = Result<T, EnergyError>;

/// Errors along the recompute-and-persist path.
///
/// Every variant is per-node-skippable from a driver's point of view:
/// the node's task aborts for the current cycle and the node is
/// retried at the next one.
#[derive(Debug, Error)]
pub enum EnergyError {
    #[error("invalid score text {text:?}: {source}")]
    InvalidScore {
        text: String,
        source: std::num::ParseFloatError,
    },

    #[error("need at least two readings to compute a delta, got {0}")]
    InsufficientReadings(usize),

    #[error("update of node {node} still conflicted after {retries} retries")]
    RetriesExhausted { node: String, retries: u32 },

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}
