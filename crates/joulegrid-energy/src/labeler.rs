//! Optimistic-concurrency score writer.
//!
//! Persisting a score is a retry state machine over the store's
//! version check: Attempt → Success, or Conflict → Refetch → Attempt,
//! or any other error → Fail. The loop is bounded by [`RETRY_BUDGET`];
//! independent writers racing on the same node are expected and
//! resolve here, not through any in-process lock.

use tracing::{debug, warn};

use joulegrid_state::{NodeSnapshot, NodeStore};

use crate::error::{EnergyError, EnergyResult};

/// Conflict retries allowed per update before giving up.
pub const RETRY_BUDGET: u32 = 3;

/// Set the `joules` label on `node` to `rendered` and submit the
/// update, re-fetching and retrying on version conflicts.
///
/// On success the persisted label equals `rendered` exactly and the
/// returned snapshot is the store's post-update view. Exhausting the
/// retry budget fails with [`EnergyError::RetriesExhausted`]; any
/// non-conflict store error aborts immediately.
pub async fn update_score<S: NodeStore>(
    store: &S,
    node: &NodeSnapshot,
    rendered: &str,
) -> EnergyResult<NodeSnapshot> {
    let mut working = node.clone();
    let mut attempt = 0u32;

    loop {
        working.set_score_label(rendered);

        match store.update_node(&working).await {
            Ok(stored) => {
                debug!(node = %stored.name, score = rendered, attempt, "score label persisted");
                return Ok(stored);
            }
            Err(err) if err.is_conflict() => {
                if attempt >= RETRY_BUDGET {
                    warn!(node = %working.name, retries = RETRY_BUDGET, "retry budget exhausted");
                    return Err(EnergyError::RetriesExhausted {
                        node: node.name.clone(),
                        retries: RETRY_BUDGET,
                    });
                }
                attempt += 1;
                debug!(
                    node = %working.name,
                    attempt,
                    budget = RETRY_BUDGET,
                    "version conflict, re-fetching latest snapshot"
                );
                working = store.get_node(&node.name).await?;
            }
            Err(err) => return Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use joulegrid_state::{MemoryNodeStore, StoreError};

    async fn seeded_store() -> (MemoryNodeStore, NodeSnapshot) {
        let store = MemoryNodeStore::with_nodes(&["node1"]);
        let node = store.get_node("node1").await.unwrap();
        (store, node)
    }

    #[tokio::test]
    async fn clean_update_persists_exact_value() {
        let (store, node) = seeded_store().await;

        let stored = update_score(&store, &node, "42.00").await.unwrap();
        assert_eq!(stored.score_label(), Some("42.00"));

        let fetched = store.get_node("node1").await.unwrap();
        assert_eq!(fetched.score_label(), Some("42.00"));
        assert_eq!(store.update_attempts(), 1);
    }

    #[tokio::test]
    async fn conflicts_within_budget_eventually_succeed() {
        for k in 1..=RETRY_BUDGET {
            let (store, node) = seeded_store().await;
            store.inject_conflicts(k);

            let stored = update_score(&store, &node, "13.37").await.unwrap();
            assert_eq!(stored.score_label(), Some("13.37"));
            assert_eq!(store.update_attempts(), u64::from(k) + 1);
        }
    }

    #[tokio::test]
    async fn conflicts_beyond_budget_exhaust_retries() {
        let (store, node) = seeded_store().await;
        store.inject_conflicts(RETRY_BUDGET + 1);

        let err = update_score(&store, &node, "13.37").await.unwrap_err();
        assert!(matches!(
            err,
            EnergyError::RetriesExhausted { ref node, retries }
                if node == "node1" && retries == RETRY_BUDGET
        ));

        // Initial attempt plus the budgeted retries, and nothing more.
        assert_eq!(store.update_attempts(), u64::from(RETRY_BUDGET) + 1);

        // The stale value survives.
        let fetched = store.get_node("node1").await.unwrap();
        assert_eq!(fetched.score_label(), None);
    }

    #[tokio::test]
    async fn stale_snapshot_is_refreshed_and_applied() {
        let (store, stale) = seeded_store().await;

        // Another writer moves the node forward after our read.
        let mut other = store.get_node("node1").await.unwrap();
        other.set_score_label("1.00");
        store.update_node(&other).await.unwrap();

        // The natural version conflict resolves via refetch.
        let stored = update_score(&store, &stale, "99.00").await.unwrap();
        assert_eq!(stored.score_label(), Some("99.00"));
    }

    #[tokio::test]
    async fn non_conflict_errors_abort_without_retry() {
        let store = MemoryNodeStore::new();
        let node = NodeSnapshot::new("ghost");

        let err = update_score(&store, &node, "1.00").await.unwrap_err();
        assert!(matches!(
            err,
            EnergyError::Store(StoreError::NotFound(_))
        ));
        assert_eq!(store.update_attempts(), 1);
    }
}
