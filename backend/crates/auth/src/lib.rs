//! Auth Plugin
//!
//! Cookie-based JWT authentication that can be mounted into any axum
//! application.
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, repository trait
//! - `application/` - Configuration, credential and token services
//! - `infra/` - PostgreSQL and in-memory repositories
//! - `presentation/` - HTTP handlers, DTOs, extractors, router, middleware
//!
//! ## Routes (under `routePrefix`, default `/auth`)
//! - `GET /ping`
//! - `POST /register`
//! - `POST /login` (sets the signed `token` cookie)
//!
//! ## Security Model
//! - Passwords hashed with Argon2id, verified in constant time
//! - Session token is an HS256 JWT inside an HMAC-signed, HttpOnly cookie
//! - Sessions are stateless; nothing is stored server side
//! - Unknown email and wrong password are indistinguishable
//!
//! ## Usage
//! ```rust,no_run
//! use auth_plugin::{AuthConfig, AuthPlugin, CurrentUser, PgUserRepository};
//! use axum::{Router, routing::get};
//!
//! # async fn run(config: AuthConfig) -> auth_plugin::AuthResult<()> {
//! let auth = AuthPlugin::<PgUserRepository>::connect(config).await?;
//!
//! let protected = auth.protect(
//!     Router::new().route("/me", get(|CurrentUser(user): CurrentUser| async move { user.email })),
//! );
//! let app: Router = auth.router().merge(protected);
//! # let _ = app;
//! # Ok(())
//! # }
//! ```

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;


// Re-exports for convenience
pub use application::config::{AuthConfig, AuthOptions, CookieOptions, DatabaseOptions};
pub use domain::SessionIdentity;
pub use error::{AuthError, AuthResult, ErrorCode, handle_error};
pub use infra::{InMemoryUserRepository, PgUserRepository};
pub use presentation::{AuthPlugin, CurrentUser, require_auth};

// Re-export kernel error types for unified error handling
pub use kernel::error::{envelope::Envelope, kind::ErrorKind};

// Convenience re-exports
pub mod config {
    pub use crate::application::config::*;
}

pub mod handlers {
    pub use crate::presentation::handlers::*;
}

pub mod middleware {
    pub use crate::presentation::middleware::*;
}
