//! User CRUD handlers.
//!
//! Each handler is a stateless translation from an HTTP verb to at most two
//! repository calls: one lookup or query, one write.

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde_json::{json, Value};
use uuid::Uuid;

use userdir_core::storage::email_exact_prefix;
use userdir_core::user::{User, UserUpdate};

use crate::{
    models::{created_response, CreateUser, ListUsersQuery, UpdateUser, UserProjection},
    state::AppState,
};

use super::{authz::AdminToken, error::ApiError};

/// Number of records a list request returns at most.
const LIST_LIMIT: i32 = 50;

/// Create a new user (POST /users).
///
/// Open route: creation is the one unauthenticated mutation.
pub async fn create_user(
    State(state): State<AppState>,
    body: Result<Json<CreateUser>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let Json(payload) = body.map_err(|e| {
        tracing::warn!(error = %e, "Rejected create user body");
        ApiError::BadRequest("Email and fullname are required.".to_string())
    })?;

    if payload.email.is_empty() || payload.fullname.is_empty() {
        return Err(ApiError::BadRequest(
            "Email and fullname are required.".to_string(),
        ));
    }

    // Best-effort pre-check so duplicates get a friendly error before the
    // write; the conditional write below stays the authoritative guard.
    let prefix = email_exact_prefix(&payload.email);
    let existing = state.users.find_by_email_prefix(Some(&prefix), 1).await?;
    if !existing.is_empty() {
        return Err(ApiError::BadRequest("Email already exists.".to_string()));
    }

    let user = User::new(payload.email, payload.fullname);
    state.users.create_user(&user).await?;

    tracing::info!(user_id = %user.id, "Created new user");

    Ok((StatusCode::CREATED, Json(created_response(&user))))
}

/// Get a single user by ID (GET /users/{id}).
pub async fn get_user(
    State(state): State<AppState>,
    _admin: AdminToken,
    Path(id): Path<Uuid>,
) -> Result<Json<UserProjection>, ApiError> {
    let user = state
        .users
        .get_user(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found.".to_string()))?;

    Ok(Json(UserProjection::from(&user)))
}

/// List users (GET /users), optionally filtered by email prefix.
pub async fn list_users(
    State(state): State<AppState>,
    _admin: AdminToken,
    Query(query): Query<ListUsersQuery>,
) -> Result<Json<Vec<UserProjection>>, ApiError> {
    let prefix = query.email.as_deref().filter(|email| !email.is_empty());
    let users = state.users.find_by_email_prefix(prefix, LIST_LIMIT).await?;

    Ok(Json(users.iter().map(UserProjection::from).collect()))
}

/// Update a user by ID (PUT /users/{id}).
///
/// `fullname` and `verified` are merged presence-aware: an omitted field
/// keeps the stored value, an explicit `verified: false` is applied. The
/// first transition to verified stamps `verified_date`; it is never cleared
/// afterwards. `updated_at` is refreshed on every update.
pub async fn update_user(
    State(state): State<AppState>,
    _admin: AdminToken,
    Path(id): Path<Uuid>,
    body: Result<Json<UpdateUser>, JsonRejection>,
) -> Result<Json<UserProjection>, ApiError> {
    let Json(payload) = body.map_err(|e| {
        tracing::warn!(error = %e, "Rejected update user body");
        ApiError::BadRequest("Invalid update payload.".to_string())
    })?;

    let mut user = state
        .users
        .get_user(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found.".to_string()))?;

    let update = UserUpdate::resolve(&user, payload.fullname, payload.verified, Utc::now());
    state.users.update_user_fields(id, &update).await?;
    update.apply_to(&mut user);

    tracing::info!(user_id = %id, "Updated user");

    Ok(Json(UserProjection::from(&user)))
}

/// Delete a user by ID (DELETE /users/{id}).
pub async fn delete_user(
    State(state): State<AppState>,
    _admin: AdminToken,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    state
        .users
        .get_user(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found.".to_string()))?;

    state.users.delete_user(id).await?;

    tracing::info!(user_id = %id, "Deleted user");

    Ok(Json(json!({ "message": "User deleted." })))
}
