use crate::auth::validate_access_token;
use crate::state::AppState;
use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use vakt_common::error::AuthError;
use vakt_common::models::auth::Claims;

/// Extractor that validates a JWT Bearer token and provides the claims.
///
/// Short-circuits with 401 before the handler runs when the header is absent
/// or malformed, or when the token fails verification. Expired and rejected
/// tokens are logged as distinct reasons even though both answer 401.
#[derive(Debug)]
pub struct AuthUser(pub Claims);

impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok());

        let token = match auth_header {
            Some(val) => match val.strip_prefix("Bearer ") {
                Some(t) => t,
                None => {
                    tracing::warn!("Rejected request: invalid authorization header format");
                    return Err(unauthorized("Invalid token format"));
                }
            },
            None => {
                tracing::warn!("Rejected request: missing authorization header");
                return Err(unauthorized(&AuthError::TokenMissing.to_string()));
            }
        };

        match validate_access_token(token, &state.config.auth.jwt_secret) {
            Ok(claims) => Ok(AuthUser(claims)),
            Err(e @ AuthError::TokenExpired) => {
                tracing::warn!("Rejected request: token expired");
                Err(unauthorized(&e.to_string()))
            }
            Err(e) => {
                tracing::warn!("Rejected request: invalid token");
                Err(unauthorized(&e.to_string()))
            }
        }
    }
}

fn unauthorized(message: &str) -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({"error": message}))).into_response()
}
