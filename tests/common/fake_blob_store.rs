//! Fake blob store service
//!
//! Serves the blob store's HTTP surface on top of the crate's own
//! `MemoryBlobStore`, so lock enforcement (423 on locked holdings) behaves
//! like production. Tests can also make it answer every write with a
//! chosen status.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::put,
    Router,
};
use smuggler::blob_store::{BlobStoreError, MemoryBlobStore, RelativePath};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use uuid::Uuid;

/// Handle on a running fake blob store. Cloning shares the same state.
#[derive(Clone)]
pub struct FakeBlobStore {
    store: Arc<MemoryBlobStore>,
    failing_status: Arc<Mutex<Option<u16>>>,
}

impl FakeBlobStore {
    pub fn new(store: Arc<MemoryBlobStore>) -> Self {
        Self {
            store,
            failing_status: Arc::new(Mutex::new(None)),
        }
    }

    /// Answer every write with `status` until healed. Nothing is stored.
    pub fn fail_with(&self, status: u16) {
        *self.failing_status.lock().unwrap() = Some(status);
    }

    pub fn heal(&self) {
        *self.failing_status.lock().unwrap() = None;
    }

    fn injected_failure(&self) -> Option<Response> {
        let status = (*self.failing_status.lock().unwrap())?;
        Some(StatusCode::from_u16(status).unwrap().into_response())
    }
}

pub async fn spawn_fake_blob_store(
    fake: FakeBlobStore,
) -> (String, tokio::sync::oneshot::Sender<()>) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind fake blob store");
    let port = listener.local_addr().expect("No local address").port();
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

    let app = Router::new()
        .route("/{hid}/music/{*path}", put(put_track))
        .route("/{hid}/albumart", put(put_album_art))
        .route("/{hid}/lock", put(lock))
        .with_state(fake);

    tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                shutdown_rx.await.ok();
            })
            .await
            .expect("Fake blob store failed");
    });

    (format!("http://127.0.0.1:{}", port), shutdown_tx)
}

fn to_response(result: Result<(), BlobStoreError>) -> Response {
    match result {
        Ok(()) => StatusCode::OK.into_response(),
        Err(BlobStoreError::Locked(_)) => StatusCode::LOCKED.into_response(),
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

async fn put_track(
    State(fake): State<FakeBlobStore>,
    Path((holding_id, path)): Path<(Uuid, String)>,
    body: Bytes,
) -> Response {
    if let Some(response) = fake.injected_failure() {
        return response;
    }
    let Ok(path) = RelativePath::parse(&path) else {
        return StatusCode::BAD_REQUEST.into_response();
    };
    to_response(fake.store.store_track(holding_id, &path, &body))
}

async fn put_album_art(
    State(fake): State<FakeBlobStore>,
    Path(holding_id): Path<Uuid>,
    body: Bytes,
) -> Response {
    if let Some(response) = fake.injected_failure() {
        return response;
    }
    to_response(fake.store.store_album_art(holding_id, &body))
}

async fn lock(State(fake): State<FakeBlobStore>, Path(holding_id): Path<Uuid>) -> Response {
    if let Some(response) = fake.injected_failure() {
        return response;
    }
    fake.store.lock_holding(holding_id);
    StatusCode::OK.into_response()
}
