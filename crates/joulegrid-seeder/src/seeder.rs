//! The seeding pass and the last-values record.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use rand::thread_rng;
use rand_distr::{Distribution, Normal};
use thiserror::Error;
use tokio::task::JoinSet;
use tracing::{info, warn};

use joulegrid_energy::{update_score, Score};
use joulegrid_state::{NodeStore, StoreError};

/// Default distribution mean when a request does not override it.
pub const DEFAULT_MEAN: f64 = 50.0;

/// Default distribution standard deviation.
pub const DEFAULT_STD: f64 = 25.0;

/// Errors from the seeder driver.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("invalid seeding distribution (mean={mean}, std={std})")]
    InvalidDistribution { mean: f64, std: f64 },

    #[error("no recorded scores to restore, run a seeding pass first")]
    NothingToRestore,

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Outcome of one seeding or restore pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    /// Nodes the pass attempted.
    pub total: usize,
    /// Nodes whose label was persisted.
    pub updated: usize,
}

/// The initializer driver.
///
/// Holds the per-node record of the most recent successful seeding
/// pass. The record is cleared at the start of every pass and rebuilt
/// from that pass's successes only — replaced, never merged — and is
/// empty until the first pass runs.
pub struct Seeder<S> {
    store: Arc<S>,
    last_scores: Mutex<HashMap<String, String>>,
}

impl<S: NodeStore + 'static> Seeder<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            last_scores: Mutex::new(HashMap::new()),
        }
    }

    /// Seed every node with a fresh score drawn from
    /// `Normal(mean, std)`, resampled until the pick lands in
    /// [0, 100] and truncated to two decimals. One task per node,
    /// joined before returning; per-node failures are logged and
    /// skipped.
    pub async fn seed(&self, mean: f64, std: f64) -> Result<SeedSummary, SeedError> {
        let normal = Normal::new(mean, std)
            .map_err(|_| SeedError::InvalidDistribution { mean, std })?;

        let nodes = self.store.list_nodes().await?;
        let total = nodes.len();
        info!(total, mean, std, "seeding pass starting");

        // Replace, don't merge: a node that fails this pass must not
        // keep a value from the previous one.
        self.last_scores.lock().unwrap().clear();

        let mut tasks = JoinSet::new();
        for node in nodes {
            let store = Arc::clone(&self.store);
            tasks.spawn(async move {
                let rendered = Score::new(draw_in_range(&normal)).render();
                match update_score(store.as_ref(), &node, &rendered).await {
                    Ok(_) => Ok((node.name, rendered)),
                    Err(err) => Err((node.name, err)),
                }
            });
        }

        let mut updated = 0usize;
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok((name, rendered))) => {
                    updated += 1;
                    info!(node = %name, score = %rendered, "{updated}/{total} nodes seeded");
                    self.last_scores.lock().unwrap().insert(name, rendered);
                }
                Ok(Err((name, err))) => {
                    warn!(node = %name, error = %err, "seeding failed, skipping node");
                }
                Err(err) => {
                    warn!(error = %err, "seeding task panicked");
                }
            }
        }

        info!(updated, total, "seeding pass finished");
        Ok(SeedSummary { total, updated })
    }

    /// Replay the scores recorded by the most recent seeding pass.
    ///
    /// Fetches each recorded node fresh and writes the recorded value
    /// back through the conflict-retrying update path. Fails up front
    /// when no pass has run yet.
    pub async fn restore(&self) -> Result<SeedSummary, SeedError> {
        let recorded: Vec<(String, String)> = {
            let last = self.last_scores.lock().unwrap();
            last.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
        };
        if recorded.is_empty() {
            return Err(SeedError::NothingToRestore);
        }

        let total = recorded.len();
        let mut updated = 0usize;
        for (name, rendered) in recorded {
            let node = match self.store.get_node(&name).await {
                Ok(node) => node,
                Err(err) => {
                    warn!(node = %name, error = %err, "failed to fetch node, skipping restore");
                    continue;
                }
            };
            match update_score(self.store.as_ref(), &node, &rendered).await {
                Ok(_) => {
                    updated += 1;
                    info!(node = %name, score = %rendered, "score restored");
                }
                Err(err) => {
                    warn!(node = %name, error = %err, "restore failed, skipping node");
                }
            }
        }

        Ok(SeedSummary { total, updated })
    }

    /// Snapshot of the last-values record.
    pub fn last_scores(&self) -> HashMap<String, String> {
        self.last_scores.lock().unwrap().clone()
    }
}

/// Draw from `normal`, resampling until the pick lands in [0, 100].
///
/// With std = 0 the distribution degenerates to the mean and the first
/// in-range pick is returned unchanged.
fn draw_in_range(normal: &Normal<f64>) -> f64 {
    let mut rng = thread_rng();
    loop {
        let pick = normal.sample(&mut rng);
        if (0.0..=100.0).contains(&pick) {
            return pick;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use joulegrid_state::MemoryNodeStore;

    fn seeder_over(names: &[&str]) -> Seeder<MemoryNodeStore> {
        Seeder::new(Arc::new(MemoryNodeStore::with_nodes(names)))
    }

    #[tokio::test]
    async fn degenerate_distribution_labels_every_node_with_the_mean() {
        let seeder = seeder_over(&["node1", "node2", "node3"]);

        let summary = seeder.seed(50.0, 0.0).await.unwrap();
        assert_eq!(summary, SeedSummary { total: 3, updated: 3 });

        for name in ["node1", "node2", "node3"] {
            let node = seeder.store.get_node(name).await.unwrap();
            assert_eq!(node.score_label(), Some("50.00"));
        }
    }

    #[tokio::test]
    async fn seeded_values_stay_in_the_clamp_range() {
        let names: Vec<String> = (0..20).map(|i| format!("node{i}")).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let seeder = seeder_over(&refs);

        seeder.seed(50.0, 25.0).await.unwrap();

        for name in &names {
            let node = seeder.store.get_node(name).await.unwrap();
            let score: f64 = node.score_label().unwrap().parse().unwrap();
            assert!((0.0..=100.0).contains(&score), "{name} got {score}");
        }
    }

    #[tokio::test]
    async fn record_tracks_the_persisted_values() {
        let seeder = seeder_over(&["node1", "node2"]);
        assert!(seeder.last_scores().is_empty());

        seeder.seed(10.0, 0.0).await.unwrap();

        let record = seeder.last_scores();
        assert_eq!(record.len(), 2);
        assert_eq!(record["node1"], "10.00");
        assert_eq!(record["node2"], "10.00");
    }

    #[tokio::test]
    async fn record_is_replaced_not_merged() {
        let seeder = seeder_over(&["node1"]);
        seeder.seed(10.0, 0.0).await.unwrap();
        assert_eq!(seeder.last_scores()["node1"], "10.00");

        // Make the only node fail its next update outright: the new
        // pass must leave it out of the record instead of keeping the
        // stale entry.
        seeder.store.inject_conflicts(joulegrid_energy::RETRY_BUDGET + 1);
        let summary = seeder.seed(20.0, 0.0).await.unwrap();

        assert_eq!(summary, SeedSummary { total: 1, updated: 0 });
        assert!(seeder.last_scores().is_empty());
    }

    #[tokio::test]
    async fn restore_replays_recorded_scores() {
        let seeder = seeder_over(&["node1", "node2"]);
        seeder.seed(42.0, 0.0).await.unwrap();

        // Someone else rewrites a label out from under us.
        let mut node = seeder.store.get_node("node1").await.unwrap();
        node.set_score_label("99.99");
        seeder.store.update_node(&node).await.unwrap();

        let summary = seeder.restore().await.unwrap();
        assert_eq!(summary, SeedSummary { total: 2, updated: 2 });

        let node = seeder.store.get_node("node1").await.unwrap();
        assert_eq!(node.score_label(), Some("42.00"));
    }

    #[tokio::test]
    async fn restore_before_any_pass_is_an_error() {
        let seeder = seeder_over(&["node1"]);
        assert!(matches!(
            seeder.restore().await,
            Err(SeedError::NothingToRestore)
        ));
    }

    #[tokio::test]
    async fn negative_std_is_rejected() {
        let seeder = seeder_over(&["node1"]);
        assert!(matches!(
            seeder.seed(50.0, -1.0).await,
            Err(SeedError::InvalidDistribution { .. })
        ));
    }
}
