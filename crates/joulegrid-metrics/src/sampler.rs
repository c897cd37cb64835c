//! Metrics backend client — per-node cumulative CPU usage samples.
//!
//! The backend exposes one endpoint per node:
//!
//! ```text
//! GET {base}/api/v1/model/nodes/{name}/metrics/cpu/usage
//! ```
//!
//! returning readings ordered oldest-to-newest plus the timestamp of
//! the most recent one. The reading values form a monotonically
//! non-decreasing cumulative counter; the sample is fetched fresh each
//! cycle and owned by the caller for that cycle only.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use http_body_util::{BodyExt, Full};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::MetricsError;

/// One (timestamp, cumulative value) observation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Reading {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

/// The metrics backend's usage document for one node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageSample {
    /// Readings ordered oldest-to-newest.
    #[serde(rename = "metrics", default)]
    pub readings: Vec<Reading>,
    /// Timestamp of the most recent reading; the staleness gate keys
    /// off this field.
    #[serde(rename = "latestTimestamp")]
    pub latest_timestamp: DateTime<Utc>,
}

/// Source of per-node usage samples.
pub trait MetricsSource: Send + Sync {
    fn node_usage(&self, node: &str) -> impl Future<Output = Result<UsageSample, MetricsError>> + Send;
}

/// HTTP [`MetricsSource`] against the metrics backend's model API.
pub struct HttpMetricsSource {
    client: Client<HttpConnector, Full<Bytes>>,
    base: String,
}

impl HttpMetricsSource {
    /// Client for a backend reachable at `base`,
    /// e.g. `http://heapster.kube-system`.
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            client: Client::builder(TokioExecutor::new()).build_http(),
            base: base.into().trim_end_matches('/').to_string(),
        }
    }
}

impl MetricsSource for HttpMetricsSource {
    async fn node_usage(&self, node: &str) -> Result<UsageSample, MetricsError> {
        let uri = format!("{}/api/v1/model/nodes/{node}/metrics/cpu/usage", self.base);
        let req = http::Request::builder()
            .method(http::Method::GET)
            .uri(&uri)
            .header("accept", "application/json")
            .body(Full::default())
            .map_err(|e| MetricsError::Transport(e.to_string()))?;

        let resp = self
            .client
            .request(req)
            .await
            .map_err(|e| MetricsError::Transport(format!("{uri}: {e}")))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(MetricsError::Status {
                status: status.as_u16(),
                node: node.to_string(),
            });
        }
        let body = resp
            .into_body()
            .collect()
            .await
            .map_err(|e| MetricsError::Transport(format!("{uri}: {e}")))?
            .to_bytes();
        debug!(%node, bytes = body.len(), "usage sample fetched");

        serde_json::from_slice(&body).map_err(|e| MetricsError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usage_sample_parses_backend_document() {
        let doc = r#"{
            "metrics": [
                {"timestamp": "2023-02-04T22:43:59Z", "value": 1675550639110},
                {"timestamp": "2023-02-24T15:24:06Z", "value": 1677252246036},
                {"timestamp": "2023-03-13T08:46:09Z", "value": 1678697169283}
            ],
            "latestTimestamp": "2023-03-13T08:46:09Z"
        }"#;

        let sample: UsageSample = serde_json::from_str(doc).unwrap();
        assert_eq!(sample.readings.len(), 3);
        assert_eq!(sample.readings[2].value, 1678697169283.0);
        assert_eq!(
            sample.latest_timestamp,
            sample.readings[2].timestamp
        );
    }

    #[test]
    fn usage_sample_tolerates_missing_readings_array() {
        let sample: UsageSample =
            serde_json::from_str(r#"{"latestTimestamp": "2023-03-13T08:46:09Z"}"#).unwrap();
        assert!(sample.readings.is_empty());
    }

    #[tokio::test]
    async fn unreachable_backend_is_a_transport_error() {
        let source = HttpMetricsSource::new("http://127.0.0.1:1");
        let err = source.node_usage("node1").await.unwrap_err();
        assert!(matches!(err, MetricsError::Transport(_)));
    }
}
