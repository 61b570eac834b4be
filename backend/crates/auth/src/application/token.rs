//! Token Service
//!
//! Issues and verifies the signed session token (HS256 JWT). Verification is
//! pure signature/claims checking; nothing is looked up server side.

use std::fmt;
use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::application::config::AuthConfig;
use crate::domain::entity::identity::SessionIdentity;
use crate::error::{AuthError, AuthResult};

/// Token claims
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Claims {
    id: i64,
    email: String,
    iat: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    exp: Option<i64>,
}

pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Option<Duration>,
}

impl TokenService {
    pub fn new(secret: &str, ttl: Option<Duration>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        if ttl.is_none() {
            validation.validate_exp = false;
            validation.required_spec_claims.clear();
        }

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(&config.jwt_secret, config.token_ttl)
    }

    /// Sign a token for `identity`
    pub fn issue(&self, identity: &SessionIdentity) -> AuthResult<String> {
        let now = Utc::now().timestamp();
        let exp = match self.ttl {
            Some(ttl) => Some(
                i64::try_from(ttl.as_secs())
                    .ok()
                    .and_then(|secs| now.checked_add(secs))
                    .ok_or_else(|| AuthError::internal("Token lifetime out of range"))?,
            ),
            None => None,
        };
        let claims = Claims {
            id: identity.id,
            email: identity.email.clone(),
            iat: now,
            exp,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::internal("Failed to sign session token").with_source(e))
    }

    /// Check signature, structure and expiry; return the embedded identity
    pub fn verify(&self, token: &str) -> AuthResult<SessionIdentity> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        let claims = data.claims;

        if claims.id <= 0 || claims.email.is_empty() {
            return Err(AuthError::token());
        }

        Ok(SessionIdentity {
            id: claims.id,
            email: claims.email,
        })
    }
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    fn identity() -> SessionIdentity {
        SessionIdentity {
            id: 1,
            email: "user@example.com".to_string(),
        }
    }

    #[test]
    fn test_issue_verify_roundtrip() {
        let service = TokenService::new("supersecret", Some(Duration::from_secs(60)));
        let token = service.issue(&identity()).unwrap();

        assert_eq!(service.verify(&token).unwrap(), identity());
    }

    #[test]
    fn test_roundtrip_without_expiry() {
        let service = TokenService::new("supersecret", None);
        let token = service.issue(&identity()).unwrap();

        assert_eq!(service.verify(&token).unwrap(), identity());
    }

    #[test]
    fn test_other_secret_rejected() {
        let token = TokenService::new("supersecret", None)
            .issue(&identity())
            .unwrap();
        let other = TokenService::new("another-secret", None);

        assert_eq!(other.verify(&token).unwrap_err().code(), ErrorCode::Token);
    }

    #[test]
    fn test_altered_token_rejected() {
        let service = TokenService::new("supersecret", None);
        let token = service.issue(&identity()).unwrap();

        for index in [0, token.len() / 2, token.len() - 1] {
            let mut bytes = token.clone().into_bytes();
            bytes[index] = if bytes[index] == b'A' { b'B' } else { b'A' };
            let altered = String::from_utf8(bytes).unwrap();

            let err = service.verify(&altered).unwrap_err();
            assert_eq!(err.code(), ErrorCode::Token);
        }
    }

    #[test]
    fn test_garbage_rejected() {
        let service = TokenService::new("supersecret", None);
        assert_eq!(service.verify("").unwrap_err().code(), ErrorCode::Token);
        assert_eq!(
            service.verify("not.a.token").unwrap_err().code(),
            ErrorCode::Token
        );
    }

    #[test]
    fn test_expired_token_rejected() {
        let service = TokenService::new("supersecret", Some(Duration::from_secs(60)));
        let now = Utc::now().timestamp();
        let claims = Claims {
            id: 1,
            email: "user@example.com".to_string(),
            iat: now - 120,
            exp: Some(now - 60),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"supersecret"),
        )
        .unwrap();

        assert_eq!(service.verify(&token).unwrap_err().code(), ErrorCode::Token);
    }

    #[test]
    fn test_missing_expiry_rejected_when_required() {
        let token = TokenService::new("supersecret", None)
            .issue(&identity())
            .unwrap();
        let strict = TokenService::new("supersecret", Some(Duration::from_secs(60)));

        assert_eq!(strict.verify(&token).unwrap_err().code(), ErrorCode::Token);
    }

    #[test]
    fn test_out_of_range_lifetime_is_an_error() {
        for secs in [u64::MAX, i64::MAX as u64] {
            let service = TokenService::new("supersecret", Some(Duration::from_secs(secs)));
            let err = service.issue(&identity()).unwrap_err();
            assert_eq!(err.code(), ErrorCode::Internal);
        }
    }

    #[test]
    fn test_longest_configurable_lifetime_verifies() {
        let ttl = Duration::from_secs(crate::application::config::MAX_TOKEN_TTL_SECS);
        let service = TokenService::new("supersecret", Some(ttl));
        let token = service.issue(&identity()).unwrap();

        assert_eq!(service.verify(&token).unwrap(), identity());
    }

    #[test]
    fn test_empty_identity_rejected() {
        let service = TokenService::new("supersecret", None);
        let token = service
            .issue(&SessionIdentity {
                id: 0,
                email: String::new(),
            })
            .unwrap();

        assert_eq!(service.verify(&token).unwrap_err().code(), ErrorCode::Token);
    }
}
