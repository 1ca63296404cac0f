mod beacons;
mod error;
mod models;
mod routes;
mod state;
mod storage;

use std::time::Duration;

use anyhow::{Context, Result};
use beacon_midpoint::{GoogleRoutesClient, MidpointResolver, ResolverConfig, RoutesConfig};
use clap::Parser;
use tower_http::cors::CorsLayer;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "beacon-server", about = "Beacon meetup server with fair midpoint resolution")]
struct Cli {
    /// Port to listen on
    #[arg(long, default_value = "3001", env = "BEACON_PORT")]
    port: u16,

    /// Data directory for persistence
    #[arg(long, default_value = "./beacon-data", env = "BEACON_DATA_DIR")]
    data_dir: String,

    /// Google Routes API key (midpoint requests fail without it)
    #[arg(long, env = "GOOGLE_ROUTES_API_KEY", hide_env_values = true)]
    routes_api_key: Option<String>,

    /// Routes computeRoutes endpoint
    #[arg(long, default_value = beacon_midpoint::google::DEFAULT_ROUTES_URL, env = "GOOGLE_ROUTES_URL")]
    routes_url: String,

    /// Minimum spacing between Routes API requests, in milliseconds
    #[arg(long, default_value = "10")]
    routes_min_interval_ms: u64,

    /// Per-lookup timeout in milliseconds
    #[arg(long, default_value = "5000")]
    call_timeout_ms: u64,

    /// How far to move the search toward the worst-off participant (0..1)
    #[arg(long, default_value = "0.4")]
    shift_fraction: f64,

    /// How far candidates sit from the search center toward each participant (0..1)
    #[arg(long, default_value = "0.25")]
    candidate_fraction: f64,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    tracing::info!(port = cli.port, data_dir = %cli.data_dir, "Starting beacon server");

    for (name, value) in [("shift-fraction", cli.shift_fraction), ("candidate-fraction", cli.candidate_fraction)] {
        if !(0.0..=1.0).contains(&value) {
            anyhow::bail!("--{name} must be between 0 and 1, got {value}");
        }
    }

    let routes = RoutesConfig::new(cli.routes_api_key)
        .with_url(cli.routes_url)
        .with_min_request_interval(Duration::from_millis(cli.routes_min_interval_ms));
    let client = GoogleRoutesClient::new(routes);
    if !client.has_credential() {
        tracing::warn!("GOOGLE_ROUTES_API_KEY not set, midpoint requests will fail");
    }

    let resolver_config = ResolverConfig::default()
        .with_shift_fraction(cli.shift_fraction)
        .with_candidate_fraction(cli.candidate_fraction)
        .with_call_timeout(Duration::from_millis(cli.call_timeout_ms));
    let resolver = MidpointResolver::new(client, resolver_config);
    let cfg = resolver.config();
    tracing::info!(
        shift_fraction = cfg.shift_fraction,
        candidate_fraction = cfg.candidate_fraction,
        call_timeout_ms = cfg.call_timeout.as_millis() as u64,
        routes_min_interval_ms = cli.routes_min_interval_ms,
        "Midpoint resolver configured"
    );

    let store = storage::BeaconStore::new(&cli.data_dir);
    match store.load().await {
        Ok(count) => tracing::info!(beacons = count, "Loaded persisted beacons"),
        Err(e) => tracing::warn!("Failed to load persisted beacons: {e:#}"),
    }

    let state = state::AppState::new(store, resolver);
    let app = routes::create_router(state).layer(CorsLayer::permissive());

    let addr = format!("0.0.0.0:{}", cli.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async { tokio::signal::ctrl_c().await.ok(); };
    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();
    tokio::select! {
        _ = ctrl_c => tracing::info!("Received SIGINT"),
        _ = terminate => tracing::info!("Received SIGTERM"),
    }
}
