//! HTTP client for the cluster-state store's REST API.
//!
//! Wire contract:
//!
//! | Method | Path | Response |
//! |---|---|---|
//! | GET | `/api/v1/nodes` | `{"items": [NodeSnapshot, ...]}` |
//! | GET | `/api/v1/nodes/{name}` | `NodeSnapshot`, 404 when absent |
//! | PUT | `/api/v1/nodes/{name}` | post-update `NodeSnapshot`; 409 when the submitted `resourceVersion` is stale |

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use serde::Deserialize;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::types::NodeSnapshot;
use crate::NodeStore;

#[derive(Deserialize)]
struct NodeList {
    #[serde(default)]
    items: Vec<NodeSnapshot>,
}

/// REST [`NodeStore`] client.
pub struct HttpNodeStore {
    client: Client<HttpConnector, Full<Bytes>>,
    base: String,
}

impl HttpNodeStore {
    /// Client for a store reachable at `base`, e.g. `http://127.0.0.1:8080`.
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            client: Client::builder(TokioExecutor::new()).build_http(),
            base: base.into().trim_end_matches('/').to_string(),
        }
    }

    async fn send(
        &self,
        method: http::Method,
        path: &str,
        body: Option<Vec<u8>>,
    ) -> StoreResult<(http::StatusCode, Bytes)> {
        let uri = format!("{}{path}", self.base);
        let mut builder = http::Request::builder()
            .method(method)
            .uri(&uri)
            .header("accept", "application/json");
        if body.is_some() {
            builder = builder.header("content-type", "application/json");
        }
        let req = builder
            .body(Full::new(Bytes::from(body.unwrap_or_default())))
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        let resp = self
            .client
            .request(req)
            .await
            .map_err(|e| StoreError::Transport(format!("{uri}: {e}")))?;
        let status = resp.status();
        let bytes = resp
            .into_body()
            .collect()
            .await
            .map_err(|e| StoreError::Transport(format!("{uri}: {e}")))?
            .to_bytes();
        debug!(%uri, status = status.as_u16(), "store request");
        Ok((status, bytes))
    }
}

impl NodeStore for HttpNodeStore {
    async fn list_nodes(&self) -> StoreResult<Vec<NodeSnapshot>> {
        let path = "/api/v1/nodes";
        let (status, body) = self.send(http::Method::GET, path, None).await?;
        if !status.is_success() {
            return Err(StoreError::Status {
                status: status.as_u16(),
                path: path.to_string(),
            });
        }
        let list: NodeList =
            serde_json::from_slice(&body).map_err(|e| StoreError::Decode(e.to_string()))?;
        Ok(list.items)
    }

    async fn get_node(&self, name: &str) -> StoreResult<NodeSnapshot> {
        let path = format!("/api/v1/nodes/{name}");
        let (status, body) = self.send(http::Method::GET, &path, None).await?;
        match status {
            s if s.is_success() => {
                serde_json::from_slice(&body).map_err(|e| StoreError::Decode(e.to_string()))
            }
            s if s == http::StatusCode::NOT_FOUND => Err(StoreError::NotFound(name.to_string())),
            s => Err(StoreError::Status {
                status: s.as_u16(),
                path,
            }),
        }
    }

    async fn update_node(&self, node: &NodeSnapshot) -> StoreResult<NodeSnapshot> {
        let path = format!("/api/v1/nodes/{}", node.name);
        let payload =
            serde_json::to_vec(node).map_err(|e| StoreError::Decode(e.to_string()))?;
        let (status, body) = self.send(http::Method::PUT, &path, Some(payload)).await?;
        match status {
            s if s.is_success() => {
                serde_json::from_slice(&body).map_err(|e| StoreError::Decode(e.to_string()))
            }
            s if s == http::StatusCode::CONFLICT => Err(StoreError::Conflict {
                node: node.name.clone(),
            }),
            s if s == http::StatusCode::NOT_FOUND => Err(StoreError::NotFound(node.name.clone())),
            s => Err(StoreError::Status {
                status: s.as_u16(),
                path,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let store = HttpNodeStore::new("http://127.0.0.1:8080/");
        assert_eq!(store.base, "http://127.0.0.1:8080");
    }

    #[tokio::test]
    async fn unreachable_store_is_a_transport_error() {
        // Nothing listens on port 1.
        let store = HttpNodeStore::new("http://127.0.0.1:1");
        let err = store.list_nodes().await.unwrap_err();
        assert!(matches!(err, StoreError::Transport(_)));
    }
}
