//! In-memory node store for tests.
//!
//! Enforces the same resource-version check as the real store, so the
//! label update protocol's retry loop can be exercised against natural
//! conflicts as well as injected ones.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::{StoreError, StoreResult};
use crate::types::NodeSnapshot;
use crate::NodeStore;

#[derive(Default)]
struct Inner {
    nodes: HashMap<String, NodeSnapshot>,
    next_version: u64,
    /// Updates left to fail with `Conflict` regardless of version.
    forced_conflicts: u32,
    update_attempts: u64,
}

/// Version-checked in-memory [`NodeStore`].
///
/// `inject_conflicts(n)` makes the next `n` update attempts fail with
/// [`StoreError::Conflict`] before normal version checking resumes,
/// which is how tests simulate a store under concurrent writers.
#[derive(Default)]
pub struct MemoryNodeStore {
    inner: Mutex<Inner>,
}

impl MemoryNodeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-populated with bare (unlabeled) nodes.
    pub fn with_nodes(names: &[&str]) -> Self {
        let store = Self::new();
        for name in names {
            store.put(NodeSnapshot::new(*name));
        }
        store
    }

    /// Insert or replace a node, assigning it a fresh resource version.
    pub fn put(&self, mut node: NodeSnapshot) {
        let mut inner = self.inner.lock().unwrap();
        inner.next_version += 1;
        node.resource_version = inner.next_version.to_string();
        inner.nodes.insert(node.name.clone(), node);
    }

    /// Fail the next `n` update attempts with a version conflict.
    pub fn inject_conflicts(&self, n: u32) {
        self.inner.lock().unwrap().forced_conflicts = n;
    }

    /// Total update attempts observed, including conflicted ones.
    pub fn update_attempts(&self) -> u64 {
        self.inner.lock().unwrap().update_attempts
    }
}

impl NodeStore for MemoryNodeStore {
    async fn list_nodes(&self) -> StoreResult<Vec<NodeSnapshot>> {
        let inner = self.inner.lock().unwrap();
        let mut nodes: Vec<NodeSnapshot> = inner.nodes.values().cloned().collect();
        nodes.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(nodes)
    }

    async fn get_node(&self, name: &str) -> StoreResult<NodeSnapshot> {
        let inner = self.inner.lock().unwrap();
        inner
            .nodes
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(name.to_string()))
    }

    async fn update_node(&self, node: &NodeSnapshot) -> StoreResult<NodeSnapshot> {
        let mut inner = self.inner.lock().unwrap();
        inner.update_attempts += 1;

        if inner.forced_conflicts > 0 {
            inner.forced_conflicts -= 1;
            return Err(StoreError::Conflict {
                node: node.name.clone(),
            });
        }

        let current = inner
            .nodes
            .get(&node.name)
            .ok_or_else(|| StoreError::NotFound(node.name.clone()))?;
        if current.resource_version != node.resource_version {
            return Err(StoreError::Conflict {
                node: node.name.clone(),
            });
        }

        inner.next_version += 1;
        let mut stored = node.clone();
        stored.resource_version = inner.next_version.to_string();
        inner.nodes.insert(stored.name.clone(), stored.clone());
        Ok(stored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn list_is_sorted_by_name() {
        let store = MemoryNodeStore::with_nodes(&["charlie", "alpha", "bravo"]);
        let nodes = store.list_nodes().await.unwrap();
        let names: Vec<&str> = nodes.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "bravo", "charlie"]);
    }

    #[tokio::test]
    async fn get_missing_node_is_not_found() {
        let store = MemoryNodeStore::new();
        let err = store.get_node("ghost").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn update_with_current_version_succeeds() {
        let store = MemoryNodeStore::with_nodes(&["node1"]);

        let mut node = store.get_node("node1").await.unwrap();
        node.set_score_label("10.00");
        let stored = store.update_node(&node).await.unwrap();

        assert_eq!(stored.score_label(), Some("10.00"));
        assert_ne!(stored.resource_version, node.resource_version);
    }

    #[tokio::test]
    async fn update_with_stale_version_conflicts() {
        let store = MemoryNodeStore::with_nodes(&["node1"]);

        let stale = store.get_node("node1").await.unwrap();

        // A second writer moves the object forward.
        let mut fresh = store.get_node("node1").await.unwrap();
        fresh.set_score_label("1.00");
        store.update_node(&fresh).await.unwrap();

        let err = store.update_node(&stale).await.unwrap_err();
        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn injected_conflicts_fire_before_version_check() {
        let store = MemoryNodeStore::with_nodes(&["node1"]);
        store.inject_conflicts(2);

        let node = store.get_node("node1").await.unwrap();
        assert!(store.update_node(&node).await.unwrap_err().is_conflict());
        assert!(store.update_node(&node).await.unwrap_err().is_conflict());
        // Budget consumed; the version is still current, so this succeeds.
        store.update_node(&node).await.unwrap();

        assert_eq!(store.update_attempts(), 3);
    }
}
