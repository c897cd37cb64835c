//! Scheduler extension endpoint.
//!
//! An external scheduling system posts a placement request (pending
//! workload plus candidate nodes) and expects back the filtered
//! candidate list. Selection failure is not a protocol error: the
//! response is always HTTP 200, carrying either exactly one node or
//! none. Malformed bodies are logged and answered with an empty 200 —
//! the body is decoded by hand from raw bytes so no error envelope is
//! ever invented on this wire.

use axum::body::Bytes;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use joulegrid_placement::select_node;
use joulegrid_state::NodeSnapshot;

/// The workload awaiting placement. Only the name is consumed (for
/// logging); unknown fields from richer schedulers are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkloadRef {
    #[serde(default)]
    pub name: String,
}

/// Candidate node list, in the extender wire casing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeList {
    #[serde(rename = "Items", default)]
    pub items: Vec<NodeSnapshot>,
}

/// Placement request body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtenderArgs {
    #[serde(rename = "Pod", default)]
    pub pod: WorkloadRef,
    #[serde(rename = "Nodes", default)]
    pub nodes: NodeList,
}

/// Placement response body: one node on success, none on failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtenderFilterResult {
    #[serde(rename = "Nodes")]
    pub nodes: NodeList,
}

/// Router for the extension endpoint.
pub fn extender_router() -> Router {
    Router::new().route("/", post(filter))
}

async fn filter(body: Bytes) -> Response {
    let args: ExtenderArgs = match serde_json::from_slice(&body) {
        Ok(args) => args,
        Err(err) => {
            error!(error = %err, "could not decode placement request");
            return StatusCode::OK.into_response();
        }
    };

    for node in &args.nodes.items {
        info!(node = %node.name, joules = ?node.score_label(), "candidate received");
    }

    let items = match select_node(&args.nodes.items) {
        Ok(node) => {
            info!(
                node = %node.name,
                joules = ?node.score_label(),
                pod = %args.pod.name,
                "node chosen"
            );
            vec![node.clone()]
        }
        Err(err) => {
            warn!(error = %err, pod = %args.pod.name, "selection failed");
            Vec::new()
        }
    };

    Json(ExtenderFilterResult {
        nodes: NodeList { items },
    })
    .into_response()
}
