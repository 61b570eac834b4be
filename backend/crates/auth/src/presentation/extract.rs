//! Request Extractors

use axum::Json;
use axum::extract::{FromRequest, FromRequestParts, Request};
use axum::http::request::Parts;
use serde_json::Value;

use crate::domain::entity::identity::SessionIdentity;
use crate::error::AuthError;
use crate::presentation::dto::BodySchema;

/// JSON body checked against its [`BodySchema`]
///
/// Every rejection is an `ERR_VALIDATION` error.
#[derive(Debug)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: BodySchema,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(body) = Json::<Value>::from_request(req, state)
            .await
            .map_err(|rejection| AuthError::validation(rejection.body_text()))?;

        T::validate(&body).map_err(AuthError::validation)?;

        let value = serde_json::from_value(body)
            .map_err(|e| AuthError::validation(format!("body {e}")))?;

        Ok(Self(value))
    }
}

/// Identity of the caller, put in place by
/// [`require_auth`](super::middleware::require_auth)
///
/// Rejects with `ERR_UNAUTH` on routes the gate does not cover.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub SessionIdentity);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SessionIdentity>()
            .cloned()
            .map(CurrentUser)
            .ok_or_else(AuthError::unauthorized)
    }
}
