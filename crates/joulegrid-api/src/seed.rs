//! Seeder HTTP surface.
//!
//! Thin adapters over [`Seeder`]: distribution parameters arrive as
//! query parameters, unparseable values fall back to the defaults with
//! a log line rather than rejecting the request.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use serde::Deserialize;
use tracing::{error, info, warn};

use joulegrid_seeder::{SeedError, Seeder, DEFAULT_MEAN, DEFAULT_STD};
use joulegrid_state::NodeStore;

struct SeedApi<S> {
    seeder: Arc<Seeder<S>>,
}

impl<S> Clone for SeedApi<S> {
    fn clone(&self) -> Self {
        Self {
            seeder: Arc::clone(&self.seeder),
        }
    }
}

/// Router for the seeder service.
pub fn seeder_router<S: NodeStore + 'static>(seeder: Arc<Seeder<S>>) -> Router {
    Router::new()
        .route("/", get(hello))
        .route("/setup", get(setup::<S>).post(setup::<S>))
        .route("/reset", get(reset::<S>).post(reset::<S>))
        .with_state(SeedApi { seeder })
}

async fn hello() -> &'static str {
    "Hello!"
}

#[derive(Debug, Default, Deserialize)]
struct SetupParams {
    mean: Option<String>,
    std: Option<String>,
}

/// Parse a query value, falling back to `default` on absent or
/// malformed input.
fn parse_float_or(source: Option<&str>, default: f64) -> f64 {
    match source {
        None => default,
        Some(text) => text.parse().unwrap_or_else(|_| {
            warn!(value = text, default, "unparseable parameter, using default");
            default
        }),
    }
}

async fn setup<S: NodeStore + 'static>(
    State(api): State<SeedApi<S>>,
    Query(params): Query<SetupParams>,
) -> impl IntoResponse {
    let mean = parse_float_or(params.mean.as_deref(), DEFAULT_MEAN);
    let std = parse_float_or(params.std.as_deref(), DEFAULT_STD);
    info!(mean, std, "seeding requested");

    match api.seeder.seed(mean, std).await {
        Ok(summary) => (
            StatusCode::OK,
            format!("seeded {}/{} nodes\n", summary.updated, summary.total),
        ),
        Err(err) => {
            error!(error = %err, "seeding pass failed");
            (StatusCode::INTERNAL_SERVER_ERROR, format!("{err}\n"))
        }
    }
}

async fn reset<S: NodeStore + 'static>(State(api): State<SeedApi<S>>) -> impl IntoResponse {
    match api.seeder.restore().await {
        Ok(summary) => (
            StatusCode::OK,
            format!("restored {}/{} nodes\n", summary.updated, summary.total),
        ),
        Err(err @ SeedError::NothingToRestore) => {
            warn!("reset requested before any seeding pass");
            (StatusCode::BAD_REQUEST, format!("{err}\n"))
        }
        Err(err) => {
            error!(error = %err, "restore failed");
            (StatusCode::INTERNAL_SERVER_ERROR, format!("{err}\n"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use joulegrid_state::MemoryNodeStore;
    use tower::ServiceExt;

    fn app_over(names: &[&str]) -> (Router, Arc<Seeder<MemoryNodeStore>>) {
        let store = Arc::new(MemoryNodeStore::with_nodes(names));
        let seeder = Arc::new(Seeder::new(store));
        (seeder_router(Arc::clone(&seeder)), seeder)
    }

    async fn get_path(app: Router, path: &str) -> (StatusCode, String) {
        let response = app
            .oneshot(Request::builder().uri(path).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn root_greets() {
        let (app, _) = app_over(&[]);
        let (status, body) = get_path(app, "/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "Hello!");
    }

    #[tokio::test]
    async fn setup_with_degenerate_std_labels_all_nodes_with_the_mean() {
        let (app, seeder) = app_over(&["node1", "node2", "node3"]);

        let (status, body) = get_path(app, "/setup?mean=50&std=0").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "seeded 3/3 nodes\n");

        let record = seeder.last_scores();
        for name in ["node1", "node2", "node3"] {
            assert_eq!(record[name], "50.00");
        }
    }

    #[tokio::test]
    async fn setup_falls_back_to_defaults_on_garbage_parameters() {
        let (app, seeder) = app_over(&["node1"]);

        let (status, _) = get_path(app, "/setup?mean=bogus&std=0").await;
        assert_eq!(status, StatusCode::OK);

        // Garbage mean fell back to 50.0; std=0 pins the value to it.
        assert_eq!(seeder.last_scores()["node1"], "50.00");
    }

    #[tokio::test]
    async fn reset_before_setup_is_rejected() {
        let (app, _) = app_over(&["node1"]);
        let (status, body) = get_path(app, "/reset").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("run a seeding pass first"));
    }

    #[tokio::test]
    async fn reset_after_setup_replays_the_recorded_values() {
        let (app, _seeder) = app_over(&["node1"]);

        let (status, _) = get_path(app.clone(), "/setup?mean=42&std=0").await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = get_path(app, "/reset").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "restored 1/1 nodes\n");
    }
}
