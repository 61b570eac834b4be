//! Repository Traits
//!
//! Interfaces for data persistence. Implementation is in infrastructure layer.

use crate::domain::entity::user::{NewUser, User};
use crate::error::AuthResult;

/// User repository trait
///
/// Uniqueness of email and username is enforced by the implementation; a
/// violation surfaces as `ErrorCode::DuplicateEntry`.
#[trait_variant::make(UserRepository: Send)]
pub trait LocalUserRepository {
    /// Insert a user and return the storage-assigned identifier
    async fn create(&self, user: &NewUser) -> AuthResult<i64>;

    /// Find user by exact email
    async fn find_by_email(&self, email: &str) -> AuthResult<Option<User>>;

    /// Whether any user already holds the email or the username
    async fn exists_by_email_or_username(&self, email: &str, username: &str) -> AuthResult<bool>;
}
