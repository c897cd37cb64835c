//! Error types for the metrics collaborators.

use thiserror::Error;

/// Errors from the metrics backend client.
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("unexpected status {status} fetching usage for node {node}")]
    Status { status: u16, node: String },

    #[error("malformed metrics document: {0}")]
    Decode(String),
}

/// Errors from the time-series sink client.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("sink rejected write with status {0}")]
    Status(u16),

    #[error("sink bootstrap failed: {0}")]
    Bootstrap(String),
}
