//! joulegrid-metrics — clients for the two metrics collaborators.
//!
//! The monitor pulls cumulative CPU usage samples for each node from
//! the metrics backend and, after recomputing a node's score, pushes
//! the result into a write-only time-series sink. Both collaborators
//! are external; this crate specifies them at their interface boundary
//! ([`MetricsSource`], [`ScoreSink`]) and ships the HTTP
//! implementations.

pub mod error;
pub mod sampler;
pub mod sink;

pub use error::{MetricsError, SinkError};
pub use sampler::{HttpMetricsSource, MetricsSource, Reading, UsageSample};
pub use sink::{InfluxSink, ScoreSink};
