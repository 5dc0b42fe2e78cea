//! Fake catalog service
//!
//! Speaks the catalog wire protocol smuggler relies on: basic-auth login that
//! sets a `session` cookie, form-encoded PUT creates answering 409 on
//! duplicates, holding patches and torrent-hash search. Everything it
//! receives is kept so tests can inspect it.

use super::constants::*;
use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, patch, put},
    Form, Json, Router,
};
use axum_extra::headers::authorization::Basic;
use axum_extra::headers::Authorization;
use axum_extra::TypedHeader;
use serde_json::json;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

pub type Row = HashMap<String, String>;

#[derive(Default)]
struct Inner {
    tokens: Vec<String>,
    logins: usize,
    /// collection -> rows in creation order
    rows: HashMap<String, Vec<Row>>,
    /// Raw form bodies of every holding patch
    patches: Vec<(String, Row)>,
    failing_collection: Option<(String, u16)>,
    search_broken: bool,
}

/// Handle on a running fake catalog. Cloning shares the same state.
#[derive(Clone, Default)]
pub struct FakeCatalog {
    inner: Arc<Mutex<Inner>>,
}

impl FakeCatalog {
    /// Starts the fake on a random port. Returns its base URL and a sender
    /// that stops it.
    pub async fn spawn(&self) -> (String, tokio::sync::oneshot::Sender<()>) {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake catalog");
        let port = listener.local_addr().expect("No local address").port();
        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        let app = Router::new()
            .route("/api/v1/login", get(login))
            .route("/api/v1/logout", get(logout))
            .route("/api/v1/holdings/search", get(search_holdings))
            .route("/api/v1/holdings/{id}", patch(patch_holding))
            .route("/api/v1/{collection}", put(create))
            .with_state(self.clone());

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Fake catalog failed");
        });

        (format!("http://127.0.0.1:{}", port), shutdown_tx)
    }

    /// Rows of a collection, in creation order.
    pub fn rows(&self, collection: &str) -> Vec<Row> {
        let inner = self.inner.lock().unwrap();
        inner.rows.get(collection).cloned().unwrap_or_default()
    }

    pub fn tracks_of(&self, holding_id: &str) -> Vec<Row> {
        self.rows("tracks")
            .into_iter()
            .filter(|r| r.get("holding_id").map(String::as_str) == Some(holding_id))
            .collect()
    }

    pub fn metadata_of(&self, track_id: &str) -> HashMap<String, String> {
        self.rows("track_metadata")
            .into_iter()
            .filter(|r| r.get("track_id").map(String::as_str) == Some(track_id))
            .filter_map(|r| Some((r.get("key")?.clone(), r.get("value")?.clone())))
            .collect()
    }

    pub fn patches(&self) -> Vec<(String, Row)> {
        self.inner.lock().unwrap().patches.clone()
    }

    pub fn logins(&self) -> usize {
        self.inner.lock().unwrap().logins
    }

    /// Forget every issued session cookie, as if they had expired.
    pub fn expire_sessions(&self) {
        self.inner.lock().unwrap().tokens.clear();
    }

    /// Answer every create in `collection` with `status` until healed.
    pub fn fail_collection(&self, collection: &str, status: u16) {
        self.inner.lock().unwrap().failing_collection = Some((collection.to_string(), status));
    }

    /// Make holding searches answer 200 with a body that is not JSON.
    pub fn break_search(&self) {
        self.inner.lock().unwrap().search_broken = true;
    }

    pub fn heal(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.failing_collection = None;
        inner.search_broken = false;
    }

    /// Pre-create a row, as if another client had made it.
    pub fn seed(&self, collection: &str, row: &[(&str, &str)]) {
        let row = row
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let mut inner = self.inner.lock().unwrap();
        inner
            .rows
            .entry(collection.to_string())
            .or_default()
            .push(row);
    }

    fn is_authorized(&self, headers: &HeaderMap) -> bool {
        let Some(cookie) = headers.get(header::COOKIE).and_then(|v| v.to_str().ok()) else {
            return false;
        };
        let inner = self.inner.lock().unwrap();
        cookie
            .split(';')
            .filter_map(|c| c.trim().strip_prefix("session="))
            .any(|token| inner.tokens.iter().any(|t| t == token))
    }
}

fn unauthorized() -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({"error": "not logged in"}))).into_response()
}

async fn login(
    State(catalog): State<FakeCatalog>,
    credentials: Option<TypedHeader<Authorization<Basic>>>,
) -> Response {
    let accepted = credentials.is_some_and(|TypedHeader(Authorization(basic))| {
        basic.username() == CATALOG_USER && basic.password() == CATALOG_PASS
    });
    if !accepted {
        return unauthorized();
    }

    let mut inner = catalog.inner.lock().unwrap();
    inner.logins += 1;
    let token = format!("token-{}", inner.logins);
    inner.tokens.push(token.clone());

    (
        StatusCode::OK,
        [(header::SET_COOKIE, format!("session={}; Path=/; HttpOnly", token))],
        Json(json!({"message": "logged in"})),
    )
        .into_response()
}

async fn logout(State(catalog): State<FakeCatalog>, headers: HeaderMap) -> Response {
    if !catalog.is_authorized(&headers) {
        return unauthorized();
    }
    StatusCode::OK.into_response()
}

/// Natural key of a row: rows with the same key are the same resource.
fn natural_key(collection: &str, row: &Row) -> Option<Vec<String>> {
    let fields: &[&str] = match collection {
        "formats" | "stacks" | "holding_groups" | "holdings" => &["id"],
        "tracks" => &["holding_id", "file_path"],
        "track_metadata" => &["track_id", "key"],
        _ => return None,
    };
    fields.iter().map(|f| row.get(*f).cloned()).collect()
}

async fn create(
    State(catalog): State<FakeCatalog>,
    Path(collection): Path<String>,
    headers: HeaderMap,
    Form(mut row): Form<Row>,
) -> Response {
    if !catalog.is_authorized(&headers) {
        return unauthorized();
    }

    let mut inner = catalog.inner.lock().unwrap();
    if let Some((failing, status)) = &inner.failing_collection {
        if *failing == collection {
            let status = StatusCode::from_u16(*status).unwrap();
            return (status, Json(json!({"error": "injected failure"}))).into_response();
        }
    }

    let Some(key) = natural_key(&collection, &row) else {
        return (StatusCode::BAD_REQUEST, Json(json!({"error": "bad row"}))).into_response();
    };

    let rows = inner.rows.entry(collection.clone()).or_default();
    let existing = rows
        .iter()
        .find(|r| natural_key(&collection, r).as_ref() == Some(&key));
    if let Some(existing) = existing {
        return (StatusCode::CONFLICT, Json(id_body(existing))).into_response();
    }

    if collection == "tracks" {
        // Track ids are assigned here, as integers.
        row.insert("id".to_string(), (rows.len() + 1).to_string());
    }
    let body = id_body(&row);
    rows.push(row);
    (StatusCode::CREATED, Json(body)).into_response()
}

fn id_body(row: &Row) -> serde_json::Value {
    match row.get("id") {
        Some(id) => match id.parse::<u64>() {
            Ok(n) => json!({ "id": n }),
            Err(_) => json!({ "id": id }),
        },
        None => json!({}),
    }
}

async fn patch_holding(
    State(catalog): State<FakeCatalog>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Form(fields): Form<Row>,
) -> Response {
    if !catalog.is_authorized(&headers) {
        return unauthorized();
    }

    let mut inner = catalog.inner.lock().unwrap();
    inner.patches.push((id.clone(), fields.clone()));

    let Some(holding) = inner
        .rows
        .get_mut("holdings")
        .and_then(|rows| rows.iter_mut().find(|r| r.get("id") == Some(&id)))
    else {
        return (StatusCode::NOT_FOUND, Json(json!({"error": "no such holding"}))).into_response();
    };
    holding.extend(fields);
    StatusCode::OK.into_response()
}

async fn search_holdings(
    State(catalog): State<FakeCatalog>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    if !catalog.is_authorized(&headers) {
        return unauthorized();
    }

    let wanted = query.get("torrent_hash").cloned().unwrap_or_default();
    let inner = catalog.inner.lock().unwrap();
    if inner.search_broken {
        return (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/html")],
            "<html>maintenance</html>",
        )
            .into_response();
    }
    let results: Vec<serde_json::Value> = inner
        .rows
        .get("holdings")
        .map(|rows| {
            rows.iter()
                .filter(|r| r.get("torrent_hash") == Some(&wanted))
                .map(|r| json!({ "id": r.get("id") }))
                .collect()
        })
        .unwrap_or_default();
    Json(json!({ "results": results })).into_response()
}
