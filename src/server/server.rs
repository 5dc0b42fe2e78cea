use anyhow::{Context, Result};
use std::time::{Duration, Instant};

use tracing::{error, info};

use axum::{
    extract::{DefaultBodyLimit, State},
    middleware,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Serialize;

use super::ingestion_routes::make_ingestion_routes;
use super::metrics::run_metrics_server;
use super::{log_requests, state::*, ServerConfig};

#[derive(Serialize)]
struct VersionInfo {
    pub stable: bool,
    pub hash: String,
    pub uptime: String,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

async fn version(State(state): State<ServerState>) -> impl IntoResponse {
    Json(VersionInfo {
        stable: true,
        hash: state.hash.clone(),
        uptime: format_uptime(state.start_time.elapsed()),
    })
}

impl ServerState {
    pub fn new(config: ServerConfig, orchestrator: GuardedOrchestrator) -> ServerState {
        ServerState {
            config,
            start_time: Instant::now(),
            orchestrator,
            hash: env!("GIT_HASH").to_owned(),
        }
    }
}

pub fn make_app(config: ServerConfig, orchestrator: GuardedOrchestrator) -> Router {
    let state = ServerState::new(config.clone(), orchestrator);

    let version_routes: Router = Router::new()
        .route("/api/v1", get(version))
        .route("/api/v1/", get(version))
        .with_state(state.clone());

    let app: Router = version_routes
        .merge(make_ingestion_routes(state.clone()))
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(middleware::from_fn_with_state(state.clone(), log_requests));

    app
}

pub async fn run_server(config: ServerConfig, orchestrator: GuardedOrchestrator) -> Result<()> {
    let metrics_port = config.metrics_port;
    tokio::spawn(async move {
        if let Err(err) = run_metrics_server(metrics_port).await {
            error!("Metrics server stopped: {:#}", err);
        }
    });

    let port = config.port;
    let app = make_app(config, orchestrator);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port))
        .await
        .with_context(|| format!("Could not bind port {}", port))?;
    info!("Ready to serve at port {}!", port);

    Ok(axum::serve(listener, app).await?)
}
