//! joulegrid-monitor — the recurring score-recomputation driver.
//!
//! On a fixed interval the monitor lists the cluster's nodes and fans
//! out one task per node: fetch that node's usage sample, gate on
//! sample freshness, accumulate the delta onto the node's current
//! score, persist it through the conflict-retrying label writer, and
//! record the new value to the time-series sink. The driver joins
//! every task of a cycle before the next tick, so cycles never
//! overlap.

pub mod monitor;

pub use monitor::{CycleSummary, Monitor, MonitorError, DEFAULT_INTERVAL};
