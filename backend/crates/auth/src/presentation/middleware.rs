//! Auth Middleware
//!
//! Gate for protected routes. The session is carried entirely by the signed
//! cookie; no storage is queried.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use platform::cookie::{CookieSigner, extract_cookie};

use crate::application::token::TokenService;
use crate::domain::entity::identity::SessionIdentity;
use crate::error::{AuthError, AuthResult};

/// Middleware state
#[derive(Clone)]
pub struct AuthGate {
    pub tokens: Arc<TokenService>,
    pub signer: Arc<CookieSigner>,
    pub cookie_name: String,
}

impl AuthGate {
    /// Resolve the caller's identity from the session cookie
    pub fn authenticate(&self, headers: &HeaderMap) -> AuthResult<SessionIdentity> {
        let signed =
            extract_cookie(headers, &self.cookie_name).ok_or_else(AuthError::unauthorized)?;
        let token = self.signer.unsign(&signed)?;
        let identity = self.tokens.verify(token)?;

        tracing::debug!(user_id = identity.id, "Session verified");

        Ok(identity)
    }
}

/// Middleware that requires a valid session cookie
///
/// On success the [`SessionIdentity`] is stored in request extensions
/// (read it with [`CurrentUser`](super::extract::CurrentUser)).
pub async fn require_auth(
    State(gate): State<AuthGate>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let identity = gate.authenticate(req.headers())?;
    req.extensions_mut().insert(identity);

    Ok(next.run(req).await)
}
