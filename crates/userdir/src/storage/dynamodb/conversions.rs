//! DynamoDB attribute conversion functions.
//!
//! Pure functions for converting between DynamoDB AttributeValue maps and
//! the `User` domain type. These are testable in isolation without
//! DynamoDB access.

use std::collections::{BTreeSet, HashMap};

use aws_sdk_dynamodb::types::AttributeValue;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use userdir_core::storage::{email_lookup_value, RepositoryError};
use userdir_core::user::User;

use super::keys;

pub const ENTITY_TYPE_USER: &str = "USER";

/// Convert a User to a DynamoDB item.
pub fn user_to_item(user: &User) -> HashMap<String, AttributeValue> {
    let mut item = HashMap::new();

    // Keys
    item.insert("PK".to_string(), AttributeValue::S(keys::user_pk(user.id)));
    item.insert("SK".to_string(), AttributeValue::S(keys::user_sk(user.id)));
    item.insert(
        "GSI1PK".to_string(),
        AttributeValue::S(keys::USER_CATEGORY.to_string()),
    );
    item.insert(
        "GSI1SK".to_string(),
        AttributeValue::S(email_lookup_value(
            &user.email,
            user.created_at.date_naive(),
        )),
    );

    // Entity type
    item.insert(
        "entityType".to_string(),
        AttributeValue::S(ENTITY_TYPE_USER.to_string()),
    );

    // Data
    item.insert("id".to_string(), AttributeValue::S(user.id.to_string()));
    item.insert("email".to_string(), AttributeValue::S(user.email.clone()));
    item.insert(
        "fullname".to_string(),
        AttributeValue::S(user.fullname.clone()),
    );
    item.insert(
        "roles".to_string(),
        AttributeValue::Ss(user.roles.iter().cloned().collect()),
    );
    item.insert("verified".to_string(), AttributeValue::Bool(user.verified));
    if let Some(date) = user.verified_date {
        item.insert(
            "verifiedDate".to_string(),
            AttributeValue::S(date.to_rfc3339()),
        );
    }
    item.insert(
        "createdAt".to_string(),
        AttributeValue::S(user.created_at.to_rfc3339()),
    );
    item.insert(
        "updatedAt".to_string(),
        AttributeValue::S(user.updated_at.to_rfc3339()),
    );

    item
}

/// Convert a DynamoDB item to a User.
pub fn item_to_user(item: &HashMap<String, AttributeValue>) -> Result<User, RepositoryError> {
    Ok(User {
        id: get_uuid(item, "id")?,
        email: get_string(item, "email")?,
        fullname: get_string(item, "fullname")?,
        roles: get_string_set(item, "roles")?,
        verified: get_bool(item, "verified")?,
        verified_date: get_optional_datetime(item, "verifiedDate")?,
        created_at: get_datetime(item, "createdAt")?,
        updated_at: get_datetime(item, "updatedAt")?,
    })
}

// ============================================================================
// Helper functions
// ============================================================================

/// Get a required string attribute.
fn get_string(
    item: &HashMap<String, AttributeValue>,
    key: &str,
) -> Result<String, RepositoryError> {
    item.get(key)
        .and_then(|v| v.as_s().ok())
        .map(|s| s.to_string())
        .ok_or_else(|| RepositoryError::InvalidData(format!("Missing or invalid field: {}", key)))
}

/// Get a required boolean attribute.
fn get_bool(item: &HashMap<String, AttributeValue>, key: &str) -> Result<bool, RepositoryError> {
    item.get(key)
        .and_then(|v| v.as_bool().ok())
        .copied()
        .ok_or_else(|| RepositoryError::InvalidData(format!("Missing or invalid field: {}", key)))
}

/// Get a required string-set attribute.
fn get_string_set(
    item: &HashMap<String, AttributeValue>,
    key: &str,
) -> Result<BTreeSet<String>, RepositoryError> {
    item.get(key)
        .and_then(|v| v.as_ss().ok())
        .map(|values| values.iter().cloned().collect())
        .ok_or_else(|| RepositoryError::InvalidData(format!("Missing or invalid field: {}", key)))
}

/// Get a required UUID attribute.
fn get_uuid(item: &HashMap<String, AttributeValue>, key: &str) -> Result<Uuid, RepositoryError> {
    let s = get_string(item, key)?;
    Uuid::parse_str(&s)
        .map_err(|e| RepositoryError::InvalidData(format!("Invalid UUID {}: {}", key, e)))
}

/// Get a required datetime attribute (RFC 3339 format).
fn get_datetime(
    item: &HashMap<String, AttributeValue>,
    key: &str,
) -> Result<DateTime<Utc>, RepositoryError> {
    let s = get_string(item, key)?;
    parse_datetime(&s, key)
}

/// Get an optional datetime attribute (RFC 3339 format).
fn get_optional_datetime(
    item: &HashMap<String, AttributeValue>,
    key: &str,
) -> Result<Option<DateTime<Utc>>, RepositoryError> {
    match item.get(key).and_then(|v| v.as_s().ok()) {
        Some(s) => Ok(Some(parse_datetime(s, key)?)),
        None => Ok(None),
    }
}

fn parse_datetime(s: &str, key: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::InvalidData(format!("Invalid datetime {}: {}", key, e)))
}
