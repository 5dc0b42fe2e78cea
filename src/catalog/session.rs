//! Cookie-authenticated session against the catalog service ("impala").

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::models::{CatalogRecord, UpsertOutcome};
use super::source::{SourceMetadata, TorrentHash};
use super::{CatalogApi, CatalogError};
use crate::server::metrics::record_catalog_call;

const SESSION_COOKIE: &str = "session";

#[derive(Debug, Clone)]
pub struct CatalogCredentials {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize)]
struct SearchResponse {
    results: Vec<SearchHit>,
}

#[derive(Deserialize)]
struct SearchHit {
    id: serde_json::Value,
}

/// A session against the catalog service.
///
/// The session is either Unauthenticated (no token) or Authenticated (one
/// opaque cookie reused across calls). Any call made while unauthenticated
/// logs in first. There is no retry inside a call: a failed call surfaces
/// its error and the caller decides whether to call again.
pub struct CatalogSession {
    client: Client,
    base_url: String,
    credentials: CatalogCredentials,
    token: Mutex<Option<String>>,
}

impl CatalogSession {
    /// Create an unauthenticated session. The first call logs in.
    pub fn new(
        base_url: String,
        credentials: CatalogCredentials,
        timeout_secs: u64,
    ) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        let base_url = base_url.trim_end_matches('/').to_string();

        Ok(Self {
            client,
            base_url,
            credentials,
            token: Mutex::new(None),
        })
    }

    /// Create a session and log in right away.
    pub async fn connect(
        base_url: String,
        credentials: CatalogCredentials,
        timeout_secs: u64,
    ) -> Result<Self, CatalogError> {
        let session = Self::new(base_url, credentials, timeout_secs)
            .map_err(|e| CatalogError::Network(e.to_string()))?;
        session.login().await?;
        Ok(session)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.lock().unwrap().is_some()
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/api/v1/{}", self.base_url, path)
    }

    /// Log in with HTTP Basic credentials and keep the returned session
    /// cookie, replacing any previous one.
    pub async fn login(&self) -> Result<String, CatalogError> {
        let url = self.endpoint("login");
        debug!("Logging in to catalog at {}", url);

        let response = self
            .client
            .get(&url)
            .basic_auth(&self.credentials.username, Some(&self.credentials.password))
            .send()
            .await
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            warn!("Login to catalog failed with status {}", status);
            record_catalog_call("login", "auth_failure");
            return Err(CatalogError::AuthFailure(status.as_u16()));
        }

        let token = response
            .cookies()
            .find(|c| c.name() == SESSION_COOKIE)
            .map(|c| c.value().to_string())
            .ok_or_else(|| {
                CatalogError::MalformedResponse("login response carried no session cookie".into())
            })?;

        *self.token.lock().unwrap() = Some(token.clone());
        record_catalog_call("login", "ok");
        info!("Authenticated against catalog as {}", self.credentials.username);
        Ok(token)
    }

    /// End the session. The token is dropped even if the catalog complains.
    pub async fn logout(&self) -> Result<(), CatalogError> {
        let token = self.token.lock().unwrap().take();
        let Some(token) = token else {
            return Ok(());
        };

        let response = self
            .client
            .get(self.endpoint("logout"))
            .header(header::COOKIE, format!("{}={}", SESSION_COOKIE, token))
            .send()
            .await
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(CatalogError::Remote {
                status: response.status().as_u16(),
                context: "logout".to_string(),
            });
        }
        Ok(())
    }

    async fn current_token(&self) -> Result<String, CatalogError> {
        let existing = self.token.lock().unwrap().clone();
        match existing {
            Some(token) => Ok(token),
            None => self.login().await,
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, CatalogError> {
        let token = self.current_token().await?;
        let response = request
            .header(header::COOKIE, format!("{}={}", SESSION_COOKIE, token))
            .send()
            .await
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        if response.status() == StatusCode::UNAUTHORIZED {
            // Expired cookie: the next call logs in again.
            self.token.lock().unwrap().take();
            return Err(CatalogError::AuthFailure(StatusCode::UNAUTHORIZED.as_u16()));
        }
        Ok(response)
    }
}

/// Pull the `id` out of a JSON response body, if there is one.
async fn response_id(response: Response) -> Result<Option<String>, CatalogError> {
    let body = response
        .bytes()
        .await
        .map_err(|e| CatalogError::Network(e.to_string()))?;
    if body.is_empty() {
        return Ok(None);
    }
    let json: serde_json::Value = match serde_json::from_slice(&body) {
        Ok(json) => json,
        Err(_) => return Ok(None),
    };
    Ok(json_id(&json["id"]))
}

fn json_id(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[async_trait]
impl CatalogApi for CatalogSession {
    async fn upsert(&self, record: &CatalogRecord) -> Result<UpsertOutcome, CatalogError> {
        let resource = record.resource();
        let collection = resource.collection();
        let request = self.client.put(self.endpoint(collection)).form(record);

        let response = match self.send(request).await {
            Ok(response) => response,
            Err(err) => {
                record_catalog_call(collection, "error");
                return Err(err);
            }
        };

        let status = response.status();
        let outcome = match status {
            StatusCode::OK | StatusCode::CREATED => UpsertOutcome::Created {
                id: response_id(response).await?,
            },
            StatusCode::CONFLICT => UpsertOutcome::AlreadyExists {
                id: response_id(response).await?,
            },
            other => {
                warn!("Got {} from catalog on {} creation", other, collection);
                record_catalog_call(collection, "error");
                return Err(CatalogError::Remote {
                    status: other.as_u16(),
                    context: format!("{} creation", collection),
                });
            }
        };

        debug!("Upsert into {}: {}", collection, outcome.as_str());
        record_catalog_call(collection, outcome.as_str());
        Ok(outcome)
    }

    async fn patch_source(
        &self,
        holding_id: Uuid,
        metadata: &SourceMetadata,
    ) -> Result<(), CatalogError> {
        let url = self.endpoint(&format!("holdings/{}", holding_id));
        let response = self.send(self.client.patch(url).form(metadata)).await?;

        let status = response.status();
        if !status.is_success() {
            record_catalog_call("holding_source", "error");
            return Err(CatalogError::Remote {
                status: status.as_u16(),
                context: "source metadata update".to_string(),
            });
        }

        record_catalog_call("holding_source", "ok");
        Ok(())
    }

    async fn find_holding_by_torrent_hash(
        &self,
        hash: &TorrentHash,
    ) -> Result<Option<String>, CatalogError> {
        let request = self
            .client
            .get(self.endpoint("holdings/search"))
            .query(&[("torrent_hash", hash.as_str())]);
        let response = self.send(request).await?;

        let status = response.status();
        if !status.is_success() {
            record_catalog_call("holding_search", "error");
            return Err(CatalogError::Remote {
                status: status.as_u16(),
                context: "holding search".to_string(),
            });
        }

        let search: SearchResponse = response
            .json()
            .await
            .map_err(|e| CatalogError::MalformedResponse(e.to_string()))?;

        record_catalog_call("holding_search", "ok");
        Ok(search.results.first().and_then(|hit| json_id(&hit.id)))
    }
}
