//! Link owner identity.

use chrono::{DateTime, Utc};

/// A user that owns links and API tokens.
///
/// Only the identity is tracked here; profile and credential data live elsewhere.
#[derive(Debug, Clone)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// Input data for registering a new user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
}
