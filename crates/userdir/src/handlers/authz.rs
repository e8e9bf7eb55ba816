//! Admin token extraction.

use axum::{
    extract::{FromRef, FromRequestParts, Query},
    http::{header::AUTHORIZATION, request::Parts},
};
use serde::Deserialize;

use crate::state::AppState;

use super::error::ApiError;

#[derive(Debug, Deserialize)]
struct TokenQuery {
    token: Option<String>,
}

/// Extractor proving the request carried the configured admin token.
///
/// The token comes from `Authorization: Bearer <token>`, falling back to
/// the `token` query parameter. Guarded routes reject before their handler
/// runs, so an invalid token yields 401 even for a nonexistent resource.
/// When no admin token is configured, every guarded request is rejected.
pub struct AdminToken;

impl<S> FromRequestParts<S> for AdminToken
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);

        // Authorization header first (API clients), then the token query
        // parameter (browser tooling).
        let supplied = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|header| header.strip_prefix("Bearer "))
            .map(|token| token.to_string());

        let supplied = match supplied {
            Some(token) => Some(token),
            None => Query::<TokenQuery>::try_from_uri(&parts.uri)
                .ok()
                .and_then(|query| query.0.token),
        };

        let Some(supplied) = supplied else {
            return Err(ApiError::Unauthorized("Missing token.".to_string()));
        };

        let Some(expected) = state.config.admin_token.as_deref() else {
            // An unset secret disables the admin surface outright instead
            // of letting an empty token through.
            return Err(ApiError::Unauthorized(
                "Admin token not configured.".to_string(),
            ));
        };

        if supplied != expected {
            return Err(ApiError::Unauthorized("Token mismatch.".to_string()));
        }

        Ok(AdminToken)
    }
}
