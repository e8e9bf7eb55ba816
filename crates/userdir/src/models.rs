use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use userdir_core::user::User;

/// Request payload for creating a new user.
///
/// Missing fields deserialize to empty strings so validation can answer
/// with one message for both absent and blank values.
#[derive(Debug, Deserialize)]
pub struct CreateUser {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub fullname: String,
}

/// Request payload for updating a user.
///
/// `None` means the caller omitted the field. An explicit `"verified":
/// false` arrives as `Some(false)` and is honored as a set-to-false.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUser {
    pub fullname: Option<String>,
    pub verified: Option<bool>,
}

/// Query parameters for listing users.
#[derive(Debug, Deserialize)]
pub struct ListUsersQuery {
    /// Case-sensitive email prefix filter.
    pub email: Option<String>,
}

/// The public projection of a user returned to API callers.
///
/// Excludes `roles` and the raw storage keys.
#[derive(Debug, Serialize)]
pub struct UserProjection {
    pub id: Uuid,
    pub email: String,
    pub fullname: String,
    pub verified: bool,
    pub verified_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for UserProjection {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            fullname: user.fullname.clone(),
            verified: user.verified,
            verified_date: user.verified_date,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// The 201 response body: the projection plus a `meta.location` pointer to
/// the created resource.
pub fn created_response(user: &User) -> serde_json::Value {
    json!({
        "id": user.id,
        "email": user.email,
        "fullname": user.fullname,
        "verified": user.verified,
        "verified_date": user.verified_date,
        "created_at": user.created_at,
        "updated_at": user.updated_at,
        "meta": { "location": format!("/users/{}", user.id) },
    })
}
