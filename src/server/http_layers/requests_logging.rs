//! Request logging middleware

use super::super::state::ServerState;
use crate::server::metrics::{categorize_endpoint, record_http_request};
use axum::extract::State;
use axum::{
    body::Body,
    http::{header::HeaderMap, Request},
    middleware::Next,
    response::IntoResponse,
};
use std::time::Instant;
use tracing::info;

#[derive(PartialEq, PartialOrd, Clone, Debug, Default, clap::ValueEnum)]
pub enum RequestsLoggingLevel {
    None,
    #[default]
    Path,
    Headers,
}

impl std::fmt::Display for RequestsLoggingLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

fn content_length(headers: &HeaderMap) -> Option<u64> {
    headers
        .get("content-length")?
        .to_str()
        .ok()?
        .parse::<u64>()
        .ok()
}

pub async fn log_requests(
    State(state): State<ServerState>,
    request: Request<Body>,
    next: Next,
) -> impl IntoResponse {
    let level = state.config.requests_logging_level.clone();

    let start = Instant::now();

    let method = request.method().to_string();
    let uri = request.uri().to_string();
    let path = request.uri().path().to_string();

    if level > RequestsLoggingLevel::None {
        match content_length(request.headers()) {
            Some(size) if size > 0 => info!(
                ">>> {} {} ({:#})",
                method,
                uri,
                byte_unit::Byte::from(size)
            ),
            _ => info!(">>> {} {}", method, uri),
        }
    }

    if level >= RequestsLoggingLevel::Headers {
        info!("  Req Headers:");
        for (name, value) in request.headers().iter() {
            if name == axum::http::header::AUTHORIZATION {
                info!("    {:?}: <redacted>", name);
            } else {
                info!("    {:?}: {:?}", name, value);
            }
        }
    }

    let response = next.run(request).await;

    if level >= RequestsLoggingLevel::Headers {
        info!("  Resp Headers:");
        for header in response.headers().iter() {
            info!("    {:?}: {:?}", header.0, header.1);
        }
    }

    let status = response.status().as_u16();
    let duration = start.elapsed();

    if level > RequestsLoggingLevel::None {
        info!("<<< {} ({}ms)", status, duration.as_millis());
    }

    record_http_request(&method, categorize_endpoint(&path), status, duration);

    response
}
