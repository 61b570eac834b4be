//! HTTP Handlers

use std::sync::Arc;

use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use kernel::error::envelope::Envelope;
use platform::cookie::{CookieSigner, set_cookie_header};
use platform::password::ClearTextPassword;

use crate::application::config::AuthConfig;
use crate::application::credentials::{CredentialService, LoginInput, RegisterInput};
use crate::application::token::TokenService;
use crate::domain::entity::identity::SessionIdentity;
use crate::domain::repository::UserRepository;
use crate::error::{AuthError, AuthResult, ErrorCode};
use crate::presentation::dto::{LoginRequest, RegisterRequest, RegisteredUserDto};
use crate::presentation::extract::ValidatedJson;

/// Shared state for auth handlers
pub struct AuthAppState<R>
where
    R: UserRepository,
{
    pub credentials: Arc<CredentialService<R>>,
    pub tokens: Arc<TokenService>,
    pub signer: Arc<CookieSigner>,
    pub config: Arc<AuthConfig>,
}

impl<R> Clone for AuthAppState<R>
where
    R: UserRepository,
{
    fn clone(&self) -> Self {
        Self {
            credentials: self.credentials.clone(),
            tokens: self.tokens.clone(),
            signer: self.signer.clone(),
            config: self.config.clone(),
        }
    }
}

/// GET /ping
pub async fn ping() -> Envelope<()> {
    Envelope::ok()
}

/// POST /register
pub async fn register<R>(
    State(state): State<AuthAppState<R>>,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> AuthResult<(StatusCode, Envelope<RegisteredUserDto>)>
where
    R: UserRepository + Sync + 'static,
{
    let input = RegisterInput {
        username: req.username,
        email: req.email,
        password: ClearTextPassword::new(req.password),
    };

    let user = state.credentials.register(input).await?;

    Ok((
        StatusCode::CREATED,
        Envelope::with_data(RegisteredUserDto::from(user)),
    ))
}

/// POST /login
///
/// The token travels only in the signed `Set-Cookie`, never in the body.
pub async fn login<R>(
    State(state): State<AuthAppState<R>>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> AuthResult<impl IntoResponse>
where
    R: UserRepository + Sync + 'static,
{
    let input = LoginInput {
        email: req.email,
        password: ClearTextPassword::new(req.password),
    };

    let user = state.credentials.login(input).await?;
    let token = state.tokens.issue(&SessionIdentity::from(&user))?;

    let cookie = set_cookie_header(&state.config.cookie, &state.signer.sign(&token))
        .ok_or_else(|| AuthError::internal("Session cookie attributes are not a valid header"))?;

    Ok(([(header::SET_COOKIE, cookie)], Envelope::ok()))
}

/// Fallback for unknown paths under the route prefix
pub async fn not_found() -> AuthError {
    AuthError::new(ErrorCode::NotFound)
}
