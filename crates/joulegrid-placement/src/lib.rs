//! joulegrid-placement — the node-selection decision.
//!
//! Read-only consumer of the scores the drivers persist: given the
//! candidate snapshots an external scheduler hands over, pick the node
//! with the lowest current energy score. This crate never talks to the
//! store and never mutates a snapshot.

pub mod selector;

pub use selector::{select_node, SelectError};
