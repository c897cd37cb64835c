//! joulegrid-state — the cluster-state store boundary.
//!
//! The cluster-state store owns the node objects; everything in this
//! workspace only ever holds transient, caller-owned copies of them.
//! Writes are guarded by the store's resource-version check: an update
//! submitted against a stale snapshot fails with a typed version
//! conflict and the caller must re-fetch before retrying.
//!
//! # Components
//!
//! - **`types`** — `NodeSnapshot` and the `joules` label schema
//! - **`error`** — `StoreError`, with `Conflict` distinguishable from
//!   every other failure
//! - **`client`** — `HttpNodeStore`, the REST client implementation
//! - **`memory`** — `MemoryNodeStore`, a version-checked in-memory
//!   implementation for tests

pub mod client;
pub mod error;
pub mod memory;
pub mod types;

pub use client::HttpNodeStore;
pub use error::{StoreError, StoreResult};
pub use memory::MemoryNodeStore;
pub use types::{JOULES_LABEL, NodeSnapshot};

/// Access to the cluster-state store.
///
/// `update_node` submits the caller's snapshot and fails with
/// [`StoreError::Conflict`] when the stored object has moved past the
/// snapshot's resource version. The store is the only serialization
/// point for node writes; no in-process locking is layered on top.
pub trait NodeStore: Send + Sync {
    /// List every node currently known to the store.
    fn list_nodes(&self) -> impl Future<Output = StoreResult<Vec<NodeSnapshot>>> + Send;

    /// Fetch a single node by name.
    fn get_node(&self, name: &str) -> impl Future<Output = StoreResult<NodeSnapshot>> + Send;

    /// Submit an updated snapshot. Returns the store's post-update view,
    /// carrying the new resource version.
    fn update_node(&self, node: &NodeSnapshot) -> impl Future<Output = StoreResult<NodeSnapshot>> + Send;
}
