use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The role every user is created with. Roles are not mutable through the
/// public API.
pub const DEFAULT_ROLE: &str = "user";

/// A user record in the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    /// Unique across all users, case-sensitive as stored.
    pub email: String,
    pub fullname: String,
    /// Internal-only; never part of the public projection.
    pub roles: BTreeSet<String>,
    pub verified: bool,
    /// Set once, the first time `verified` becomes true. Never cleared.
    pub verified_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Creates a new unverified user with a generated UUID and the default
    /// role set. Both timestamps are set to the current time.
    pub fn new(email: impl Into<String>, fullname: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email: email.into(),
            fullname: fullname.into(),
            roles: BTreeSet::from([DEFAULT_ROLE.to_string()]),
            verified: false,
            verified_date: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Sets a specific ID for this user (useful for testing).
    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }
}

/// The fields a single update may touch.
///
/// `fullname` and `verified` are `None` when the caller omitted them — an
/// explicit `verified: false` in the request arrives here as `Some(false)`
/// and is honored as a set-to-false. `verified_date` is only ever `Some`
/// when this update is the first transition to verified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserUpdate {
    pub fullname: Option<String>,
    pub verified: Option<bool>,
    pub verified_date: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl UserUpdate {
    /// Computes the update for `existing` given the caller's requested
    /// field changes, resolving the verified-date transition.
    pub fn resolve(
        existing: &User,
        fullname: Option<String>,
        verified: Option<bool>,
        now: DateTime<Utc>,
    ) -> Self {
        let effective_verified = verified.unwrap_or(existing.verified);
        // verified_date records the first transition only.
        let verified_date = if effective_verified && existing.verified_date.is_none() {
            Some(now)
        } else {
            None
        };

        Self {
            fullname,
            verified,
            verified_date,
            updated_at: now,
        }
    }

    /// Applies this update to a user in place. Storage backends that hold
    /// whole records (the in-memory one) use this; the DynamoDB backend
    /// translates the same field set into a SET expression instead.
    pub fn apply_to(&self, user: &mut User) {
        if let Some(fullname) = &self.fullname {
            user.fullname = fullname.clone();
        }
        if let Some(verified) = self.verified {
            user.verified = verified;
        }
        if let Some(date) = self.verified_date {
            user.verified_date = Some(date);
        }
        user.updated_at = self.updated_at;
    }
}
