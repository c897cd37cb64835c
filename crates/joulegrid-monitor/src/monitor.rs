//! The monitor's cycle loop and per-node pipeline.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use joulegrid_energy::{accumulate, update_score, EnergyError, FreshnessIndex};
use joulegrid_metrics::{MetricsError, MetricsSource, ScoreSink, SinkError};
use joulegrid_state::{NodeSnapshot, NodeStore};

/// Default tick interval between cycles.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(5);

/// Upper bound on one node's task per cycle. A hung collaborator call
/// delays only its own slot in the cycle barrier, not the whole loop
/// forever.
const TASK_TIMEOUT: Duration = Duration::from_secs(30);

/// Per-node pipeline errors. All of them abort only the affected
/// node's task for the current cycle; the node is retried next tick.
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("metrics error: {0}")]
    Metrics(#[from] MetricsError),

    #[error("energy error: {0}")]
    Energy(#[from] EnergyError),

    #[error("sink error: {0}")]
    Sink(#[from] SinkError),

    #[error("node task timed out after {0:?}")]
    Timeout(Duration),
}

/// Outcome counts for one cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleSummary {
    pub total: usize,
    pub updated: usize,
    /// Nodes whose sample carried no new readings.
    pub stale: usize,
    pub failed: usize,
}

struct Inner<S, M, K> {
    store: Arc<S>,
    source: M,
    sink: K,
    freshness: FreshnessIndex,
    scale_factor: f64,
    interval: Duration,
}

/// The recurring monitor driver.
pub struct Monitor<S, M, K> {
    inner: Arc<Inner<S, M, K>>,
}

impl<S, M, K> Clone for Monitor<S, M, K> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S, M, K> Monitor<S, M, K>
where
    S: NodeStore + 'static,
    M: MetricsSource + 'static,
    K: ScoreSink + 'static,
{
    pub fn new(store: Arc<S>, source: M, sink: K, interval: Duration, scale_factor: f64) -> Self {
        Self {
            inner: Arc::new(Inner {
                store,
                source,
                sink,
                freshness: FreshnessIndex::new(),
                scale_factor,
                interval,
            }),
        }
    }

    /// Run cycles on the configured interval until the shutdown signal
    /// flips.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        info!(
            interval_secs = self.inner.interval.as_secs(),
            scale_factor = self.inner.scale_factor,
            "monitor started"
        );

        loop {
            tokio::select! {
                _ = tokio::time::sleep(self.inner.interval) => {
                    let summary = self.cycle().await;
                    debug!(
                        total = summary.total,
                        updated = summary.updated,
                        stale = summary.stale,
                        failed = summary.failed,
                        "cycle finished"
                    );
                }
                _ = shutdown.changed() => {
                    info!("monitor shutting down");
                    break;
                }
            }
        }
    }

    /// Run one cycle: list nodes, fan out one task per node, join them
    /// all. A list failure skips the whole cycle until the next tick.
    pub async fn cycle(&self) -> CycleSummary {
        let nodes = match self.inner.store.list_nodes().await {
            Ok(nodes) => nodes,
            Err(err) => {
                warn!(error = %err, "could not list nodes, retrying next cycle");
                return CycleSummary::default();
            }
        };

        let mut summary = CycleSummary {
            total: nodes.len(),
            ..CycleSummary::default()
        };

        let mut tasks = JoinSet::new();
        for node in nodes {
            let inner = Arc::clone(&self.inner);
            tasks.spawn(async move {
                let name = node.name.clone();
                match tokio::time::timeout(TASK_TIMEOUT, refresh_node(&inner, node)).await {
                    Ok(outcome) => (name, outcome),
                    Err(_) => (name, Err(MonitorError::Timeout(TASK_TIMEOUT))),
                }
            });
        }

        // Cycle barrier: every task joins before the tick returns.
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((_, Ok(Some(_)))) => summary.updated += 1,
                Ok((name, Ok(None))) => {
                    summary.stale += 1;
                    debug!(node = %name, "no new readings, skipped");
                }
                Ok((name, Err(err))) => {
                    summary.failed += 1;
                    warn!(node = %name, error = %err, "node update failed, skipping");
                }
                Err(err) => {
                    summary.failed += 1;
                    warn!(error = %err, "node task panicked");
                }
            }
        }

        summary
    }
}

/// One node's pipeline, strictly sequential: sample → freshness gate →
/// accumulate → persist → sink. Returns `Ok(None)` when the sample was
/// stale.
async fn refresh_node<S, M, K>(
    inner: &Inner<S, M, K>,
    node: NodeSnapshot,
) -> Result<Option<f64>, MonitorError>
where
    S: NodeStore,
    M: MetricsSource,
    K: ScoreSink,
{
    let sample = inner.source.node_usage(&node.name).await?;

    if !inner.freshness.observe(&node.name, sample.latest_timestamp) {
        return Ok(None);
    }

    let previous = node.score_label().unwrap_or("");
    let score = accumulate(previous, &sample, inner.scale_factor)?;
    let rendered = score.render();

    update_score(inner.store.as_ref(), &node, &rendered).await?;
    inner.sink.insert(&node.name, score.value()).await?;

    info!(node = %node.name, from = previous, to = %rendered, "score updated");
    Ok(Some(score.value()))
}
