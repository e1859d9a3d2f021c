//! # PAD Checker
//!
//! Lab-facing lookup tool for PAD cards (colorimetric drug-quality test
//! results). Wraps the PAD analytics API and serves HTML fragments so the
//! landing page can swap in results without a full reload.
//!
//!
//!
//! # General Infrastructure
//! - Five routes: landing form, search, direct card lookup, newer-card poll, cache refresh
//! - All card data comes from the analytics API, nothing is stored locally
//! - Project table and derived user list are fetched once and cached until `/refresh-cache`
//! - The upstream column layout drifts, so every row goes through column-fallback normalization
//!
//!
//!
//! # Setup
//!
//! Run locally.
//! ```sh
//! RUST_LOG=info cargo run
//! ```
//!
//! Environment:
//! - `PAD_PORT`: listen port, default 8000
//! - `PAD_API_URL`: analytics API base, default <https://pad.crc.nd.edu>
use std::time::Duration;

use axum::{
    Router,
    http::{Method, header::CONTENT_TYPE},
    routing::{get, post},
};

use signal::{
    ctrl_c,
    unix::{SignalKind, signal},
};
use tokio::{net::TcpListener, signal};
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

pub mod analytics;
pub mod config;
pub mod error;
pub mod models;
pub mod normalize;
pub mod render;
pub mod routes;
pub mod service;
pub mod state;

#[cfg(test)]
pub mod fake_source;

use routes::{
    card_handler, check_newer_handler, index_handler, refresh_cache_handler, search_handler,
};
use state::AppState;

pub async fn start_server() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    info!("Initializing state...");
    let state = AppState::new();

    info!("Starting server...");

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    let app = Router::new()
        .route("/", get(index_handler))
        .route("/search", post(search_handler))
        .route("/card/:card_id", get(card_handler))
        .route("/check-newer", get(check_newer_handler))
        .route("/refresh-cache", post(refresh_cache_handler))
        .layer(cors)
        .with_state(state.clone());

    let address = format!("0.0.0.0:{}", state.config.port);
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address).await.unwrap();
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap();

    println!("Server shutting down...");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        ctrl_c().await.expect("Failed to install Ctrl+C handler");

        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        signal(SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;

        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
