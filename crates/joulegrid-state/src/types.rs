//! Node snapshot type and the energy label schema.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Label key under which a node's energy score is persisted.
///
/// The value is a decimal string with exactly two fractional digits,
/// e.g. `"50.00"`.
pub const JOULES_LABEL: &str = "joules";

/// A point-in-time copy of one node object from the cluster-state store.
///
/// Snapshots do not stay valid: any write may be rejected because the
/// stored object changed since this copy was read, in which case the
/// latest snapshot must be fetched again.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NodeSnapshot {
    /// Node name, unique within a listing.
    pub name: String,
    /// Opaque version assigned by the store; echoed back on update so
    /// the store can detect concurrent modification.
    #[serde(default, rename = "resourceVersion")]
    pub resource_version: String,
    /// String key/value metadata. The energy score lives under
    /// [`JOULES_LABEL`].
    #[serde(default)]
    pub labels: HashMap<String, String>,
}

impl NodeSnapshot {
    /// A fresh snapshot with no labels and no version, as a caller
    /// would construct before first insertion into a store.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            resource_version: String::new(),
            labels: HashMap::new(),
        }
    }

    /// The raw `joules` label value, if present.
    pub fn score_label(&self) -> Option<&str> {
        self.labels.get(JOULES_LABEL).map(String::as_str)
    }

    /// Set the `joules` label to an already-rendered score string.
    pub fn set_score_label(&mut self, rendered: impl Into<String>) {
        self.labels.insert(JOULES_LABEL.to_string(), rendered.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_label_roundtrip() {
        let mut node = NodeSnapshot::new("node1");
        assert_eq!(node.score_label(), None);

        node.set_score_label("50.00");
        assert_eq!(node.score_label(), Some("50.00"));

        node.set_score_label("52.75");
        assert_eq!(node.score_label(), Some("52.75"));
    }

    #[test]
    fn snapshot_serializes_wire_names() {
        let mut node = NodeSnapshot::new("node1");
        node.resource_version = "7".to_string();
        node.set_score_label("12.34");

        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["name"], "node1");
        assert_eq!(json["resourceVersion"], "7");
        assert_eq!(json["labels"]["joules"], "12.34");
    }

    #[test]
    fn snapshot_deserializes_with_defaults() {
        let node: NodeSnapshot = serde_json::from_str(r#"{"name":"bare"}"#).unwrap();
        assert_eq!(node.name, "bare");
        assert!(node.resource_version.is_empty());
        assert!(node.labels.is_empty());
    }
}
