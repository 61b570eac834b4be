//! User Entity
//!
//! Persisted account record. Identifier and timestamps are assigned by storage.

use chrono::{DateTime, Utc};
use platform::password::HashedPassword;

/// Stored user
///
/// Holds the password hash for the credential check only; it is never
/// serialized into a response.
#[derive(Debug, Clone)]
pub struct User {
    /// Storage-assigned identifier (immutable)
    pub id: i64,
    /// Unique, case-sensitive as stored
    pub email: String,
    /// Unique
    pub username: String,
    pub password_hash: HashedPassword,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// User about to be inserted
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub username: String,
    pub password_hash: HashedPassword,
}
