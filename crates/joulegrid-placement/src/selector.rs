//! Minimum-score node selection.

use thiserror::Error;
use tracing::debug;

use joulegrid_state::NodeSnapshot;

/// Errors from [`select_node`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectError {
    #[error("no candidate nodes were provided")]
    NoCandidates,
}

/// Comparison key for one candidate: its parsed score, or positive
/// infinity when the label is missing or unparseable so the node is
/// never preferred over any node with a usable score.
fn score_key(node: &NodeSnapshot) -> f64 {
    node.score_label()
        .and_then(|text| text.parse::<f64>().ok())
        .unwrap_or(f64::INFINITY)
}

/// Pick the candidate with the lowest energy score.
///
/// Nodes without a usable score sort behind every scored node but stay
/// selectable, so a non-empty input always yields a node (all-sentinel
/// case included). Ties break to the first node in input order, which
/// keeps the decision deterministic for a given candidate list.
pub fn select_node(nodes: &[NodeSnapshot]) -> Result<&NodeSnapshot, SelectError> {
    let mut best: Option<(&NodeSnapshot, f64)> = None;

    for node in nodes {
        let key = score_key(node);
        debug!(node = %node.name, score = key, "candidate considered");
        match best {
            Some((_, lowest)) if key >= lowest => {}
            _ => best = Some((node, key)),
        }
    }

    best.map(|(node, _)| node).ok_or(SelectError::NoCandidates)
}
