//! Time-series sink client.
//!
//! Write-only: the monitor inserts one point per recomputed score and
//! nothing in this workspace ever reads them back. The sink owns its
//! schema; database bootstrap (create-if-absent) happens once at
//! client construction, and a construction failure is fatal at
//! startup.

use std::time::{SystemTime, UNIX_EPOCH};

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use tracing::{debug, info};

use crate::error::SinkError;

const DATABASE: &str = "joules";
const MEASUREMENT: &str = "joules";
const HOST_TAG: &str = "hostname";

/// Destination for recomputed scores.
pub trait ScoreSink: Send + Sync {
    /// Record `score` for `node`, stamped with the current time.
    fn insert(&self, node: &str, score: f64) -> impl Future<Output = Result<(), SinkError>> + Send;
}

/// InfluxDB line-protocol [`ScoreSink`].
#[derive(Debug)]
pub struct InfluxSink {
    client: Client<HttpConnector, Full<Bytes>>,
    base: String,
}

impl InfluxSink {
    /// Connect to a sink at `base` and create the `joules` database if
    /// it does not exist yet.
    pub async fn connect(base: impl Into<String>) -> Result<Self, SinkError> {
        let sink = Self {
            client: Client::builder(TokioExecutor::new()).build_http(),
            base: base.into().trim_end_matches('/').to_string(),
        };

        let query = format!("CREATE DATABASE IF NOT EXISTS {DATABASE}").replace(' ', "%20");
        let uri = format!("{}/query?q={query}", sink.base);
        let status = sink
            .post(&uri, Vec::new())
            .await
            .map_err(|e| SinkError::Bootstrap(e.to_string()))?;
        if !status.is_success() {
            return Err(SinkError::Bootstrap(format!(
                "create database returned status {status}"
            )));
        }

        info!(database = DATABASE, "time-series sink ready");
        Ok(sink)
    }

    async fn post(&self, uri: &str, body: Vec<u8>) -> Result<http::StatusCode, SinkError> {
        let req = http::Request::builder()
            .method(http::Method::POST)
            .uri(uri)
            .body(Full::new(Bytes::from(body)))
            .map_err(|e| SinkError::Transport(e.to_string()))?;
        let resp = self
            .client
            .request(req)
            .await
            .map_err(|e| SinkError::Transport(format!("{uri}: {e}")))?;
        let status = resp.status();
        // Drain the body so the connection can be reused.
        let _ = resp.into_body().collect().await;
        Ok(status)
    }
}

impl ScoreSink for InfluxSink {
    async fn insert(&self, node: &str, score: f64) -> Result<(), SinkError> {
        let epoch = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        let line = format!("{MEASUREMENT},{HOST_TAG}={node} total={score} {epoch}");
        let uri = format!("{}/write?db={DATABASE}&precision=s", self.base);

        let status = self.post(&uri, line.into_bytes()).await?;
        if !status.is_success() {
            return Err(SinkError::Status(status.as_u16()));
        }
        debug!(%node, score, "score recorded to sink");
        Ok(())
    }
}
