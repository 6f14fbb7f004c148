// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc, time::Duration};

use axum::{routing::get, Router};
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;

use crate::application::chart_renderer::ChartRenderer;
use crate::application::dashboard_service::PollingDashboard;
use crate::infrastructure::config::load_dashboard_config;
use crate::infrastructure::koios_repository::KoiosRepository;
use crate::presentation::app_state::AppState;
use crate::presentation::board::SlotBoard;
use crate::presentation::handlers::{get_dashboard, health_check};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load configuration
    let config = load_dashboard_config()?;

    // Create repository (infrastructure layer)
    let repository = Arc::new(KoiosRepository::new(
        &config.api.base_url,
        Duration::from_secs(config.api.timeout_secs),
    ));

    // Create display state and services (application layer)
    let board = Arc::new(SlotBoard::new());
    let charts = Arc::new(ChartRenderer::new());
    let dashboard = Arc::new(PollingDashboard::new(
        repository,
        board.clone(),
        charts.clone(),
        &config,
    ));

    // Start the refresh loop: one cycle immediately, then on the interval
    let cancel_token = CancellationToken::new();
    let _refresh_loop = dashboard.start(cancel_token.clone());

    // Create application state
    let state = Arc::new(AppState { board, charts });

    // Build router (presentation layer)
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/dashboard", get(get_dashboard))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr: SocketAddr = "0.0.0.0:8080".parse().unwrap();
    println!("Starting stakepool-telemetry service on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    cancel_token.cancel();

    Ok(())
}
