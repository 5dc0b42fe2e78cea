//! Ingestion HTTP routes.
//!
//! Provides endpoints for:
//! - Uploading a track into a Holding
//! - Uploading album art
//! - Locking a Holding
//! - Recording where a Holding came from, and finding it again by torrent

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Form, Json, Router,
};
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::blob_store::BlobStoreError;
use crate::catalog::{CatalogError, SourceMetadata};
use crate::ingestion::IngestionError;
use crate::server::auth::AuthenticatedUser;
use crate::server::metrics::record_upload_bytes;
use crate::server::state::{GuardedOrchestrator, ServerState};

// =============================================================================
// Request/Response Types
// =============================================================================

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

impl MessageResponse {
    fn ok() -> Json<Self> {
        Json(MessageResponse { message: "ok" })
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct IngestionErrorResponse {
    pub error: String,
    pub catalog_written: bool,
    pub blob_written: bool,
}

#[derive(Debug, Serialize)]
pub struct TorrentHoldingResponse {
    pub holding: String,
}

fn error_response(status: StatusCode, error: impl ToString) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
        }),
    )
        .into_response()
}

fn blob_status(err: &BlobStoreError) -> StatusCode {
    match err {
        BlobStoreError::Locked(_) => StatusCode::LOCKED,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn catalog_status(err: &CatalogError) -> StatusCode {
    match err {
        CatalogError::InvalidTorrentHash(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for IngestionError {
    fn into_response(self) -> Response {
        let status = match &self {
            IngestionError::InvalidRelativePath(_) => StatusCode::BAD_REQUEST,
            IngestionError::PartialFailure {
                blob_error: Some(err),
                ..
            } => blob_status(err),
            IngestionError::PartialFailure { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            IngestionError::Catalog(err) => catalog_status(err),
            IngestionError::BlobStore(err) => blob_status(err),
        };

        if status.is_server_error() {
            warn!("Request failed: {}", self);
        }

        let error = self.to_string();
        match self {
            IngestionError::PartialFailure {
                catalog_written,
                blob_written,
                ..
            } => (
                status,
                Json(IngestionErrorResponse {
                    error,
                    catalog_written,
                    blob_written,
                }),
            )
                .into_response(),
            _ => error_response(status, error),
        }
    }
}

fn parse_id(kind: &str, raw: &str) -> Result<Uuid, Response> {
    Uuid::parse_str(raw).map_err(|_| {
        debug!("Rejecting malformed {} id {:?}", kind, raw);
        error_response(
            StatusCode::BAD_REQUEST,
            format!("Invalid {} id: {}", kind, raw),
        )
    })
}

// =============================================================================
// Handlers
// =============================================================================

/// PUT/POST /holding_groups/{hgid}/{hid}/music/{*path}
async fn create_track(
    user: AuthenticatedUser,
    State(orchestrator): State<GuardedOrchestrator>,
    Path((holding_group_id, holding_id, path)): Path<(String, String, String)>,
    body: Bytes,
) -> Response {
    let holding_group_id = match parse_id("holding group", &holding_group_id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let holding_id = match parse_id("holding", &holding_id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    debug!(
        "{} uploads {} ({} bytes) to holding {}",
        user.username,
        path,
        body.len(),
        holding_id
    );
    record_upload_bytes(body.len());

    let report = match orchestrator
        .create_track(holding_group_id, holding_id, &path, &body)
        .await
    {
        Ok(report) => report,
        Err(err) => return err.into_response(),
    };

    match report.into_result() {
        Ok(_) => MessageResponse::ok().into_response(),
        Err(err) => err.into_response(),
    }
}

/// PUT/POST /holdings/{hid}/albumart
async fn create_album_art(
    _user: AuthenticatedUser,
    State(orchestrator): State<GuardedOrchestrator>,
    Path(holding_id): Path<String>,
    body: Bytes,
) -> Response {
    let holding_id = match parse_id("holding", &holding_id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    record_upload_bytes(body.len());

    match orchestrator.create_album_art(holding_id, &body).await {
        Ok(()) => MessageResponse::ok().into_response(),
        Err(err) => err.into_response(),
    }
}

/// PUT/POST /holdings/{hid}/lock
async fn lock_holding(
    user: AuthenticatedUser,
    State(orchestrator): State<GuardedOrchestrator>,
    Path(holding_id): Path<String>,
) -> Response {
    let holding_id = match parse_id("holding", &holding_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match orchestrator.lock_holding(holding_id).await {
        Ok(()) => {
            info!("{} locked holding {}", user.username, holding_id);
            MessageResponse::ok().into_response()
        }
        Err(err) => err.into_response(),
    }
}

/// POST /holdings/{hid}/source
///
/// Takes form fields; anything but the source fields is ignored.
async fn set_source(
    _user: AuthenticatedUser,
    State(orchestrator): State<GuardedOrchestrator>,
    Path(holding_id): Path<String>,
    Form(fields): Form<Vec<(String, String)>>,
) -> Response {
    let holding_id = match parse_id("holding", &holding_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    let metadata = match SourceMetadata::from_fields(
        fields.iter().map(|(k, v)| (k.as_str(), v.as_str())),
    ) {
        Ok(metadata) => metadata,
        Err(err) => return error_response(StatusCode::BAD_REQUEST, err),
    };

    match orchestrator.set_source_metadata(holding_id, &metadata).await {
        Ok(()) => MessageResponse::ok().into_response(),
        Err(err) => err.into_response(),
    }
}

/// GET/HEAD /torrents/{infohash}
async fn find_torrent(
    _user: AuthenticatedUser,
    State(orchestrator): State<GuardedOrchestrator>,
    Path(infohash): Path<String>,
) -> Response {
    match orchestrator.find_holding_by_torrent_hash(&infohash).await {
        Ok(Some(holding)) => Json(TorrentHoldingResponse { holding }).into_response(),
        Ok(None) => error_response(
            StatusCode::NOT_FOUND,
            format!("No holding for torrent {}", infohash.to_ascii_lowercase()),
        ),
        Err(err) => err.into_response(),
    }
}

// =============================================================================
// Router
// =============================================================================

/// Authenticated ingestion routes. `get` also answers HEAD.
pub fn make_ingestion_routes(state: ServerState) -> Router {
    Router::new()
        .route(
            "/api/v1/holding_groups/{hgid}/{hid}/music/{*path}",
            put(create_track).post(create_track),
        )
        .route(
            "/api/v1/holdings/{hid}/albumart",
            put(create_album_art).post(create_album_art),
        )
        .route("/api/v1/holdings/{hid}/lock", put(lock_holding).post(lock_holding))
        .route("/api/v1/holdings/{hid}/source", post(set_source))
        .route("/api/v1/torrents/{infohash}", get(find_torrent))
        .with_state(state)
}
