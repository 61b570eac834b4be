//! In-memory Repository
//!
//! Process-local user store with the same uniqueness rules as the `users`
//! table. Used by tests and for running without a database.

use chrono::Utc;
use tokio::sync::Mutex;

use crate::domain::entity::user::{NewUser, User};
use crate::domain::repository::UserRepository;
use crate::error::{AuthError, AuthResult};

#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: Mutex<Vec<User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.users.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.lock().await.is_empty()
    }
}

impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: &NewUser) -> AuthResult<i64> {
        let mut users = self.users.lock().await;

        if users
            .iter()
            .any(|u| u.email == user.email || u.username == user.username)
        {
            return Err(AuthError::duplicate_entry());
        }

        // Ids start at 1 and are never reused
        let id = users.last().map_or(1, |u| u.id + 1);
        let now = Utc::now();
        users.push(User {
            id,
            email: user.email.clone(),
            username: user.username.clone(),
            password_hash: user.password_hash.clone(),
            created_at: now,
            updated_at: now,
        });

        Ok(id)
    }

    async fn find_by_email(&self, email: &str) -> AuthResult<Option<User>> {
        let users = self.users.lock().await;
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn exists_by_email_or_username(&self, email: &str, username: &str) -> AuthResult<bool> {
        let users = self.users.lock().await;
        Ok(users
            .iter()
            .any(|u| u.email == email || u.username == username))
    }
}
