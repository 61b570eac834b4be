//! Auth Router
//!
//! [`AuthPlugin`] wires configuration, services and the repository together
//! and hands out the routes plus a gate for protecting application routes.

use std::error::Error;
use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use platform::cookie::CookieSigner;
use platform::password::{Argon2Hashing, PasswordHashing};

use crate::application::config::AuthConfig;
use crate::application::credentials::CredentialService;
use crate::application::token::TokenService;
use crate::domain::repository::UserRepository;
use crate::error::{AuthError, AuthResult, ErrorCode};
use crate::infra::postgres::PgUserRepository;
use crate::presentation::handlers::{self, AuthAppState};
use crate::presentation::middleware::{AuthGate, require_auth};

/// Registered authentication module
pub struct AuthPlugin<R>
where
    R: UserRepository,
{
    state: AuthAppState<R>,
    gate: AuthGate,
}

impl AuthPlugin<PgUserRepository> {
    /// Connect to PostgreSQL, ensure the `users` table and build the plugin
    pub async fn connect(config: AuthConfig) -> AuthResult<Self> {
        let database = config
            .database
            .clone()
            .ok_or_else(|| AuthError::new(ErrorCode::PoolConnMissing))?;

        let repo = PgUserRepository::connect(&database)
            .await
            .map_err(registration_error)?;
        repo.ensure_schema().await.map_err(registration_error)?;

        tracing::info!("Connected to database");

        Self::with_repository(repo, config)
    }
}

impl<R> AuthPlugin<R>
where
    R: UserRepository + Sync + 'static,
{
    /// Build the plugin on top of an existing repository
    pub fn with_repository(repo: R, config: AuthConfig) -> AuthResult<Self> {
        let hasher: Arc<dyn PasswordHashing> =
            Arc::new(Argon2Hashing::new(config.password_hash_cost)?);
        let credentials = Arc::new(CredentialService::new(Arc::new(repo), hasher)?);
        let tokens = Arc::new(TokenService::from_config(&config));
        let signer = Arc::new(CookieSigner::new(config.cookie_secret.clone()));

        let gate = AuthGate {
            tokens: tokens.clone(),
            signer: signer.clone(),
            cookie_name: config.cookie.name.clone(),
        };

        tracing::info!(
            route_prefix = %config.route_prefix,
            token_ttl_secs = config.token_ttl.map(|ttl| ttl.as_secs()),
            "Authentication plugin registered"
        );

        Ok(Self {
            state: AuthAppState {
                credentials,
                tokens,
                signer,
                config: Arc::new(config),
            },
            gate,
        })
    }

    pub fn config(&self) -> &AuthConfig {
        &self.state.config
    }

    /// Routes mounted under the configured prefix
    ///
    /// Unknown paths and wrong methods both answer `ERR_NOT_FOUND`.
    /// With prefix `/` the routes (and their 404 fallback) sit at the root,
    /// so the result should be merged into a router without a fallback.
    pub fn router(&self) -> Router {
        let routes = Router::new()
            .route("/ping", get(handlers::ping))
            .route("/register", post(handlers::register::<R>))
            .route("/login", post(handlers::login::<R>))
            .method_not_allowed_fallback(handlers::not_found)
            .fallback(handlers::not_found)
            .with_state(self.state.clone());

        match self.state.config.route_prefix.as_str() {
            "/" => routes,
            prefix => Router::new().nest(prefix, routes),
        }
    }

    /// Middleware state for [`require_auth`]
    pub fn gate(&self) -> AuthGate {
        self.gate.clone()
    }

    /// Put every route already added to `router` behind the auth gate
    pub fn protect<S>(&self, router: Router<S>) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        router.route_layer(middleware::from_fn_with_state(self.gate(), require_auth))
    }
}

/// Startup failures other than rejected database credentials
fn registration_error(err: AuthError) -> AuthError {
    if err.code() == ErrorCode::DbAccess {
        return err;
    }

    let detail = err
        .source()
        .map(|source| source.to_string())
        .unwrap_or_else(|| err.message().to_string());

    AuthError::with_message(
        ErrorCode::Internal,
        format!("Error while registering authentication plugin: {detail}"),
    )
    .with_source(err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::config::DatabaseOptions;

    #[tokio::test]
    async fn test_connect_without_database() {
        let err = AuthPlugin::<PgUserRepository>::connect(AuthConfig::default())
            .await
            .err()
            .unwrap();
        assert_eq!(err.code(), ErrorCode::PoolConnMissing);
    }

    #[tokio::test]
    async fn test_connect_with_invalid_url() {
        let config = AuthConfig {
            database: Some(DatabaseOptions::from_url("not a url")),
            ..AuthConfig::default()
        };

        let err = AuthPlugin::<PgUserRepository>::connect(config).await.err().unwrap();
        assert_eq!(err.code(), ErrorCode::Internal);
        assert!(
            err.message()
                .starts_with("Error while registering authentication plugin: ")
        );
    }
}
