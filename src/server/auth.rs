use super::state::ServerState;

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::headers::authorization::Basic;
use axum_extra::headers::Authorization;
use axum_extra::TypedHeader;
use serde_json::json;
use tracing::debug;

/// A request that presented the credentials of a configured user.
#[derive(Debug)]
pub struct AuthenticatedUser {
    pub username: String,
}

#[derive(Debug)]
pub enum AuthRejection {
    MissingCredentials,
    InvalidCredentials,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let message = match self {
            AuthRejection::MissingCredentials => "Missing credentials",
            AuthRejection::InvalidCredentials => "Invalid credentials",
        };
        (
            StatusCode::UNAUTHORIZED,
            [(header::WWW_AUTHENTICATE, "Basic realm=\"smuggler\"")],
            Json(json!({ "error": message })),
        )
            .into_response()
    }
}

impl FromRequestParts<ServerState> for AuthenticatedUser {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        ctx: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(basic)) =
            TypedHeader::<Authorization<Basic>>::from_request_parts(parts, ctx)
                .await
                .map_err(|_| {
                    debug!("No basic auth header on {}", parts.uri.path());
                    AuthRejection::MissingCredentials
                })?;

        match ctx.config.find_user(basic.username(), basic.password()) {
            Some(user) => Ok(AuthenticatedUser {
                username: user.username.clone(),
            }),
            None => {
                debug!("Rejected credentials for {:?}", basic.username());
                Err(AuthRejection::InvalidCredentials)
            }
        }
    }
}
