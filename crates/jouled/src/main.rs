//! jouled — the joulegrid daemon.
//!
//! Single binary with one subcommand per control loop:
//!
//! - `monitor` — recurring per-node score recomputation
//! - `seeder` — HTTP service exposing `/setup` and `/reset`
//! - `extender` — HTTP callback for the external scheduler
//!
//! # Usage
//!
//! ```text
//! jouled monitor --store-url http://127.0.0.1:8080 --interval 5
//! jouled seeder --port 8090
//! jouled extender --port 8100
//! ```

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tokio::sync::watch;
use tracing::info;

use joulegrid_api::{extender_router, seeder_router};
use joulegrid_energy::{DEFAULT_SCALE_FACTOR, SCALE_FACTOR_ENV};
use joulegrid_metrics::{HttpMetricsSource, InfluxSink};
use joulegrid_monitor::Monitor;
use joulegrid_seeder::Seeder;
use joulegrid_state::HttpNodeStore;

#[derive(Parser)]
#[command(name = "jouled", about = "joulegrid daemon")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the recurring score monitor.
    Monitor {
        /// Cluster-state store base URL.
        #[arg(long, default_value = "http://127.0.0.1:8080")]
        store_url: String,

        /// Metrics backend base URL.
        #[arg(long, default_value = "http://heapster.kube-system")]
        metrics_url: String,

        /// Time-series sink base URL.
        #[arg(long, default_value = "http://nce-pm-influxdb.default:8086")]
        sink_url: String,

        /// Seconds between cycles.
        #[arg(long, default_value_t = 5)]
        interval: u64,

        /// Factor converting raw counter units into score units.
        #[arg(long, env = SCALE_FACTOR_ENV, default_value_t = DEFAULT_SCALE_FACTOR)]
        scale_factor: f64,
    },

    /// Serve the seeding endpoints.
    Seeder {
        /// Cluster-state store base URL.
        #[arg(long, default_value = "http://127.0.0.1:8080")]
        store_url: String,

        /// Port to listen on.
        #[arg(long, default_value_t = 8090)]
        port: u16,
    },

    /// Serve the scheduler extension endpoint.
    Extender {
        /// Port to listen on.
        #[arg(long, default_value_t = 8100)]
        port: u16,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,jouled=debug,joulegrid=debug".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Monitor {
            store_url,
            metrics_url,
            sink_url,
            interval,
            scale_factor,
        } => run_monitor(store_url, metrics_url, sink_url, interval, scale_factor).await,
        Command::Seeder { store_url, port } => run_seeder(store_url, port).await,
        Command::Extender { port } => run_extender(port).await,
    }
}

async fn run_monitor(
    store_url: String,
    metrics_url: String,
    sink_url: String,
    interval: u64,
    scale_factor: f64,
) -> anyhow::Result<()> {
    info!("joulegrid monitor starting");

    let store = Arc::new(HttpNodeStore::new(&store_url));
    let source = HttpMetricsSource::new(&metrics_url);
    // Sink bootstrap failure is fatal before any loop starts.
    let sink = InfluxSink::connect(&sink_url).await?;

    let monitor = Monitor::new(
        store,
        source,
        sink,
        Duration::from_secs(interval),
        scale_factor,
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install CTRL+C handler");
        info!("shutdown signal received");
        let _ = shutdown_tx.send(true);
    });

    monitor.run(shutdown_rx).await;
    info!("joulegrid monitor stopped");
    Ok(())
}

async fn run_seeder(store_url: String, port: u16) -> anyhow::Result<()> {
    let store = Arc::new(HttpNodeStore::new(&store_url));
    let seeder = Arc::new(Seeder::new(store));
    let router = seeder_router(seeder);

    serve(router, port, "seeder").await
}

async fn run_extender(port: u16) -> anyhow::Result<()> {
    serve(extender_router(), port, "extender").await
}

async fn serve(router: axum::Router, port: u16, mode: &str) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, mode, "server starting");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c()
                .await
                .expect("failed to install CTRL+C handler");
            info!("shutdown signal received");
        })
        .await?;

    info!(mode, "server stopped");
    Ok(())
}
