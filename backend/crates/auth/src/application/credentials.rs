//! Credential Service
//!
//! Registration and credential checks against the user repository.

use std::sync::Arc;

use platform::password::{ClearTextPassword, HashedPassword, PasswordHashing};

use crate::domain::entity::user::{NewUser, User};
use crate::domain::repository::UserRepository;
use crate::error::{AuthError, AuthResult};

/// Register input
pub struct RegisterInput {
    pub username: String,
    pub email: String,
    pub password: ClearTextPassword,
}

/// Register output (never carries the hash)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredUser {
    pub id: i64,
    pub email: String,
    pub username: String,
}

/// Login input
pub struct LoginInput {
    pub email: String,
    pub password: ClearTextPassword,
}

/// Credential service
pub struct CredentialService<R>
where
    R: UserRepository,
{
    repo: Arc<R>,
    hasher: Arc<dyn PasswordHashing>,
    /// Verified against when the email is unknown so both failures cost the same
    dummy_hash: HashedPassword,
}

impl<R> CredentialService<R>
where
    R: UserRepository,
{
    pub fn new(repo: Arc<R>, hasher: Arc<dyn PasswordHashing>) -> AuthResult<Self> {
        let dummy_hash = hasher.hash(&ClearTextPassword::new("dummy-password".to_string()))?;

        Ok(Self {
            repo,
            hasher,
            dummy_hash,
        })
    }

    pub async fn register(&self, input: RegisterInput) -> AuthResult<RegisteredUser> {
        let RegisterInput {
            username,
            email,
            password,
        } = input;

        if self
            .repo
            .exists_by_email_or_username(&email, &username)
            .await?
        {
            return Err(AuthError::duplicate_entry());
        }

        let password_hash = self.hash_password(password).await?;

        // A concurrent registration can still hit the unique constraint here;
        // the repository reports it as a duplicate entry as well.
        let id = self
            .repo
            .create(&NewUser {
                email: email.clone(),
                username: username.clone(),
                password_hash,
            })
            .await?;

        tracing::info!(user_id = id, username = %username, "User registered");

        Ok(RegisteredUser {
            id,
            email,
            username,
        })
    }

    /// Return the stored user when email and password match
    ///
    /// Unknown email and wrong password fail identically.
    pub async fn login(&self, input: LoginInput) -> AuthResult<User> {
        let LoginInput { email, password } = input;

        let Some(user) = self.repo.find_by_email(&email).await? else {
            let _ = self
                .verify_password(password, self.dummy_hash.clone())
                .await;
            return Err(AuthError::invalid_credentials());
        };

        if !self
            .verify_password(password, user.password_hash.clone())
            .await?
        {
            return Err(AuthError::invalid_credentials());
        }

        tracing::info!(user_id = user.id, "User logged in");

        Ok(user)
    }

    async fn hash_password(&self, password: ClearTextPassword) -> AuthResult<HashedPassword> {
        let hasher = self.hasher.clone();
        let hashed = tokio::task::spawn_blocking(move || hasher.hash(&password)).await??;
        Ok(hashed)
    }

    async fn verify_password(
        &self,
        password: ClearTextPassword,
        hashed: HashedPassword,
    ) -> AuthResult<bool> {
        let hasher = self.hasher.clone();
        let valid =
            tokio::task::spawn_blocking(move || hasher.verify(&password, &hashed)).await??;
        Ok(valid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::infra::memory::InMemoryUserRepository;
    use platform::password::Argon2Hashing;

    fn service() -> (CredentialService<InMemoryUserRepository>, Arc<InMemoryUserRepository>) {
        let repo = Arc::new(InMemoryUserRepository::new());
        let hasher: Arc<dyn PasswordHashing> = Arc::new(Argon2Hashing::new(1).unwrap());
        (CredentialService::new(repo.clone(), hasher).unwrap(), repo)
    }

    fn password(raw: &str) -> ClearTextPassword {
        ClearTextPassword::new(raw.to_string())
    }

    fn register_input(username: &str, email: &str, raw: &str) -> RegisterInput {
        RegisterInput {
            username: username.to_string(),
            email: email.to_string(),
            password: password(raw),
        }
    }

    #[tokio::test]
    async fn test_register_stores_hash() {
        let (service, repo) = service();

        let user = service
            .register(register_input("user1", "user@example.com", "myAwesomePassword"))
            .await
            .unwrap();

        assert!(user.id > 0);
        assert_eq!(user.email, "user@example.com");
        assert_eq!(user.username, "user1");

        let stored = repo.find_by_email("user@example.com").await.unwrap().unwrap();
        assert_ne!(stored.password_hash.as_phc_string(), "myAwesomePassword");
        assert!(
            Argon2Hashing::default()
                .verify(&password("myAwesomePassword"), &stored.password_hash)
                .unwrap()
        );
    }

    #[tokio::test]
    async fn test_register_duplicate_email_or_username() {
        let (service, _) = service();
        service
            .register(register_input("user1", "user@example.com", "myAwesomePassword"))
            .await
            .unwrap();

        let same_email = service
            .register(register_input("user2", "user@example.com", "anotherPassword"))
            .await
            .unwrap_err();
        assert_eq!(same_email.code(), ErrorCode::DuplicateEntry);

        let same_username = service
            .register(register_input("user1", "other@example.com", "anotherPassword"))
            .await
            .unwrap_err();
        assert_eq!(same_username.code(), ErrorCode::DuplicateEntry);
    }

    /// Repository whose pre-check misses a row that the insert then collides with
    struct RacingRepository;

    impl UserRepository for RacingRepository {
        async fn create(&self, _user: &NewUser) -> AuthResult<i64> {
            Err(AuthError::duplicate_entry())
        }

        async fn find_by_email(&self, _email: &str) -> AuthResult<Option<User>> {
            Ok(None)
        }

        async fn exists_by_email_or_username(
            &self,
            _email: &str,
            _username: &str,
        ) -> AuthResult<bool> {
            Ok(false)
        }
    }

    #[tokio::test]
    async fn test_register_insert_conflict_is_duplicate_entry() {
        let hasher: Arc<dyn PasswordHashing> = Arc::new(Argon2Hashing::new(1).unwrap());
        let service = CredentialService::new(Arc::new(RacingRepository), hasher).unwrap();

        let err = service
            .register(register_input("user1", "user@example.com", "myAwesomePassword"))
            .await
            .unwrap_err();

        assert_eq!(err.code(), ErrorCode::DuplicateEntry);
        assert_eq!(err.status_code(), 400);
    }

    #[tokio::test]
    async fn test_login_success_returns_stored_user() {
        let (service, _) = service();
        let registered = service
            .register(register_input("user1", "user@example.com", "myAwesomePassword"))
            .await
            .unwrap();

        let user = service
            .login(LoginInput {
                email: "user@example.com".to_string(),
                password: password("myAwesomePassword"),
            })
            .await
            .unwrap();

        assert_eq!(user.id, registered.id);
        assert_eq!(user.username, "user1");
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let (service, _) = service();
        service
            .register(register_input("user1", "user@example.com", "myAwesomePassword"))
            .await
            .unwrap();

        let wrong_password = service
            .login(LoginInput {
                email: "user@example.com".to_string(),
                password: password("wrongPassword"),
            })
            .await
            .unwrap_err();
        let unknown_email = service
            .login(LoginInput {
                email: "nobody@example.com".to_string(),
                password: password("myAwesomePassword"),
            })
            .await
            .unwrap_err();

        assert_eq!(wrong_password.code(), ErrorCode::InvalidCredentials);
        assert_eq!(unknown_email.code(), wrong_password.code());
        assert_eq!(unknown_email.message(), wrong_password.message());
        assert_eq!(unknown_email.message(), "Invalid credentials");
    }

    #[tokio::test]
    async fn test_login_email_is_case_sensitive() {
        let (service, _) = service();
        service
            .register(register_input("user1", "user@example.com", "myAwesomePassword"))
            .await
            .unwrap();

        let err = service
            .login(LoginInput {
                email: "User@Example.com".to_string(),
                password: password("myAwesomePassword"),
            })
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidCredentials);
    }
}
