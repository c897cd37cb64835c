//! Freshness gate over usage samples.
//!
//! Each driver keeps one [`FreshnessIndex`] shared by all of its
//! per-node tasks. The index remembers, per node, the
//! `latest_timestamp` of the most recently consumed sample so a cycle
//! that lands between backend scrapes does not recompute on data it
//! has already charged to the score.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};

/// Per-node last-consumed sample timestamps.
///
/// Staleness uses strict not-equal semantics: a sample is stale iff
/// its timestamp is exactly the recorded one. A sample carrying an
/// *earlier* distinct timestamp still counts as new, so late-arriving
/// backfills are reprocessed rather than silently dropped.
///
/// The check and the record update happen under one lock acquisition,
/// making the per-node read-modify-write atomic: two tasks racing on
/// the same node cannot both consume the same sample.
#[derive(Debug, Default)]
pub struct FreshnessIndex {
    last_seen: Mutex<HashMap<String, DateTime<Utc>>>,
}

impl FreshnessIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true and records `latest` as consumed when the sample
    /// carries new information for `node`; returns false (and records
    /// nothing) when the timestamp matches the one already consumed.
    pub fn observe(&self, node: &str, latest: DateTime<Utc>) -> bool {
        let mut last_seen = self.last_seen.lock().unwrap();
        if last_seen.get(node) == Some(&latest) {
            return false;
        }
        last_seen.insert(node.to_string(), latest);
        true
    }

    /// Number of nodes with a recorded timestamp. Growth is monotone,
    /// bounded by the node-set size.
    pub fn len(&self) -> usize {
        self.last_seen.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.last_seen.lock().unwrap().is_empty()
    }
}
