//! HTTP server setup for check-in, admin and display screens

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::path::PathBuf;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use super::{api, viewer};
use crate::managers::{
    create_shared_config_manager, create_shared_draw_manager, create_shared_prize_manager,
    create_shared_registration_manager, SharedConfigManager, SharedDrawManager,
    SharedPrizeManager, SharedRegistrationManager,
};
use crate::realtime::SharedBroadcaster;
use crate::state::SharedStore;

/// Web server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub port: u16,
    /// Location of the JSON document
    pub data_file: PathBuf,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        let addr = format!("{}:{}", self.bind_addr, self.port);
        addr.parse()
            .map_err(|e| anyhow::anyhow!("Invalid bind address '{}': {}", addr, e))
    }
}

/// Shared state for web handlers
#[derive(Clone)]
pub struct AppState {
    pub registration: SharedRegistrationManager,
    pub prizes: SharedPrizeManager,
    pub draws: SharedDrawManager,
    pub config: SharedConfigManager,
    pub broadcaster: SharedBroadcaster,
}

impl AppState {
    pub fn new(store: SharedStore, broadcaster: SharedBroadcaster) -> Self {
        Self {
            registration: create_shared_registration_manager(store.clone(), broadcaster.clone()),
            prizes: create_shared_prize_manager(store.clone()),
            draws: create_shared_draw_manager(store.clone(), broadcaster.clone()),
            config: create_shared_config_manager(store, broadcaster.clone()),
            broadcaster,
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/users", get(api::list_users))
        .route("/api/users/available", get(api::available_users))
        .route("/api/checkin", post(api::check_in))
        .route("/api/prizes", get(api::list_prizes).post(api::create_prize))
        .route(
            "/api/prizes/:id",
            get(api::get_prize)
                .put(api::update_prize)
                .delete(api::delete_prize),
        )
        .route("/api/winners", get(api::list_winners))
        .route("/api/draw", post(api::draw))
        .route("/api/reset", post(api::reset))
        .route("/api/config", get(api::get_config).put(api::update_config))
        .route("/api/events", get(viewer::sse_handler))
        .route("/api/health", get(health))
        .route("/ws", get(viewer::ws_handler))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Serve until Ctrl-C, then close every viewer connection
pub async fn start_web_server(config: ServerConfig, state: AppState) -> anyhow::Result<()> {
    let addr = config.socket_addr()?;
    let broadcaster = state.broadcaster.clone();
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind {}: {}", addr, e))?;

    info!("Lucky draw server listening on http://{}", addr);
    info!("  Check-in:   http://localhost:{}/", config.port);
    info!("  Admin:      http://localhost:{}/#/admin", config.port);
    info!("  Display:    http://localhost:{}/#/display", config.port);
    info!("  Data file:  {}", config.data_file.display());

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            let closed = broadcaster.close_all();
            info!("Shutting down, closed {} viewer connection(s)", closed);
        })
        .await?;

    Ok(())
}

/// GET /api/health
async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "viewers": state.broadcaster.viewer_count(),
    }))
}
