//! DynamoDB key generation functions.
//!
//! Pure functions for generating partition and sort keys following the
//! single-table design. All functions are sync and have no side effects.

use uuid::Uuid;

pub const USER_PREFIX: &str = "USER#";

/// Fixed GSI1 partition holding every user record.
pub const USER_CATEGORY: &str = "USER";

/// Generate primary key for a User.
///
/// Pattern: `USER#<user_id>`
pub fn user_pk(user_id: Uuid) -> String {
    format!("{USER_PREFIX}{user_id}")
}

/// Generate sort key for a User.
///
/// Pattern: `USER#<user_id>` (same as PK for single-item lookups)
pub fn user_sk(user_id: Uuid) -> String {
    format!("{USER_PREFIX}{user_id}")
}
