//! Framegate Server - Generative-media gateway backend
//!
//! A standalone Rust backend for a no-code workflow orchestrator, providing:
//! - Bearer-authenticated HTTP API via axum
//! - Keyframe-interpolated video generation (Veo long-running operations)
//! - Scene image generation, narration translation, speech synthesis
//!
//! This crate can be used standalone or embedded; the CLI in
//! `framegate-cli` is the usual entry point.

pub mod api;
pub mod auth;
pub mod error;
pub mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use framegate_core::config::GatewayConfig;

use self::state::{AppState, AppStateInner};

/// Configuration for the Framegate HTTP listener. Provider and secret
/// configuration lives in `GatewayConfig`, injected separately.
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

/// Create a shared `AppState` from an injected gateway configuration.
pub fn create_app_state(config: GatewayConfig) -> Result<AppState, String> {
    Ok(Arc::new(AppStateInner::new(config)?))
}

/// Build the complete application router: authenticated generation routes
/// plus the open health probe.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(api::api_router(state.clone()))
        .route("/api/health", axum::routing::get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the gateway server.
///
/// Returns the actual address the server is listening on; the server itself
/// runs in a background task.
pub async fn start_server(
    config: ServerConfig,
    gateway: GatewayConfig,
) -> Result<SocketAddr, String> {
    // Initialize tracing (no-op when the embedding process already did)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "framegate_server=info,tower_http=info".into()),
        )
        .try_init()
        .ok();

    tracing::info!(
        "Starting Framegate gateway on {}:{}",
        config.host,
        config.port
    );

    let state = create_app_state(gateway)?;
    start_server_with_state(config, state).await
}

/// Start the HTTP server with a pre-built `AppState`.
pub async fn start_server_with_state(
    config: ServerConfig,
    state: AppState,
) -> Result<SocketAddr, String> {
    let app = build_router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|e| format!("Invalid address: {}", e))?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| format!("Failed to bind to {}: {}", addr, e))?;

    let local_addr = listener
        .local_addr()
        .map_err(|e| format!("Failed to get local address: {}", e))?;

    tracing::info!("Framegate gateway listening on {}", local_addr);

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!("Server error: {}", e);
        }
    });

    Ok(local_addr)
}

async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "server": "framegate-server",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
