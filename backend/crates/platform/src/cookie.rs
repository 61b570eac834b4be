//! Cookie Management Infrastructure
//!
//! Common cookie handling utilities and configuration:
//! - `Set-Cookie` header building
//! - Cookie extraction from request headers
//! - HMAC signing of cookie values (independent of whatever the value carries)

use std::fmt;

use http::{HeaderMap, HeaderValue, header};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;

use crate::crypto::{from_base64url, hmac_sha256, to_base64url, verify_hmac_sha256};

/// SameSite policy for cookies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SameSite {
    Strict,
    #[default]
    Lax,
    None,
}

impl SameSite {
    pub fn as_str(&self) -> &'static str {
        match self {
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
            SameSite::None => "None",
        }
    }
}

/// Cookie configuration
#[derive(Debug, Clone)]
pub struct CookieConfig {
    pub name: String,
    pub secure: bool,
    pub http_only: bool,
    pub same_site: SameSite,
    pub path: String,
    pub domain: Option<String>,
    pub max_age_secs: Option<i64>,
    pub expires: Option<DateTime<Utc>>,
    pub partitioned: bool,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            name: "session".to_string(),
            secure: true,
            http_only: true,
            same_site: SameSite::Lax,
            path: "/".to_string(),
            domain: None,
            max_age_secs: None,
            expires: None,
            partitioned: false,
        }
    }
}

impl CookieConfig {
    /// Build Set-Cookie header value
    pub fn build_set_cookie(&self, value: &str) -> String {
        let mut cookie = format!("{}={}", self.name, value);

        if let Some(domain) = &self.domain {
            cookie.push_str(&format!("; Domain={}", domain));
        }
        cookie.push_str(&format!("; Path={}", self.path));

        if let Some(expires) = self.expires {
            cookie.push_str(&format!(
                "; Expires={}",
                expires.format("%a, %d %b %Y %H:%M:%S GMT")
            ));
        }
        if let Some(max_age) = self.max_age_secs {
            cookie.push_str(&format!("; Max-Age={}", max_age));
        }
        if self.http_only {
            cookie.push_str("; HttpOnly");
        }
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie.push_str(&format!("; SameSite={}", self.same_site.as_str()));

        if self.partitioned {
            cookie.push_str("; Partitioned");
        }

        cookie
    }
}

/// Extract a cookie value from headers
///
/// Every `Cookie` header is searched; the first match wins.
pub fn extract_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .find_map(|cookie| {
            let (key, value) = cookie.trim().split_once('=')?;

            if key == name {
                Some(value.to_string())
            } else {
                None
            }
        })
}

/// Create a Set-Cookie header value
pub fn set_cookie_header(config: &CookieConfig, value: &str) -> Option<HeaderValue> {
    HeaderValue::from_str(&config.build_set_cookie(value)).ok()
}

// ============================================================================
// Signed cookies
// ============================================================================

/// Cookie signature errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CookieError {
    /// Value does not have the `<value>.<signature>` shape
    #[error("Signed cookie is malformed")]
    Malformed,

    /// Signature does not match the value
    #[error("Cookie signature mismatch")]
    BadSignature,
}

/// Signs and unsigns cookie values with HMAC-SHA256
///
/// Signed format: `<value>.<base64url(hmac(secret, value))>`.
#[derive(Clone)]
pub struct CookieSigner {
    secret: Vec<u8>,
}

impl CookieSigner {
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Append a signature to `value`
    pub fn sign(&self, value: &str) -> String {
        let tag = hmac_sha256(&self.secret, value.as_bytes());
        format!("{}.{}", value, to_base64url(&tag))
    }

    /// Verify and strip the signature, returning the original value
    pub fn unsign<'a>(&self, signed: &'a str) -> Result<&'a str, CookieError> {
        let (value, signature) = signed.rsplit_once('.').ok_or(CookieError::Malformed)?;

        let tag = from_base64url(signature).map_err(|_| CookieError::Malformed)?;

        if !verify_hmac_sha256(&self.secret, value.as_bytes(), &tag) {
            return Err(CookieError::BadSignature);
        }

        Ok(value)
    }
}

impl fmt::Debug for CookieSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CookieSigner")
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_cookie_config_build() {
        let config = CookieConfig {
            name: "test".to_string(),
            secure: true,
            http_only: true,
            same_site: SameSite::Lax,
            path: "/api".to_string(),
            domain: Some("example.com".to_string()),
            max_age_secs: Some(3600),
            expires: None,
            partitioned: false,
        };

        let cookie = config.build_set_cookie("value123");
        assert!(cookie.starts_with("test=value123"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Secure"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(cookie.contains("Path=/api"));
        assert!(cookie.contains("Domain=example.com"));
        assert!(cookie.contains("Max-Age=3600"));
        assert!(!cookie.contains("Partitioned"));
    }

    #[test]
    fn test_cookie_expires_format() {
        let config = CookieConfig {
            name: "token".to_string(),
            expires: Some(Utc.with_ymd_and_hms(2030, 1, 2, 3, 4, 5).unwrap()),
            secure: false,
            ..CookieConfig::default()
        };

        let cookie = config.build_set_cookie("v");
        assert!(cookie.contains("Expires=Wed, 02 Jan 2030 03:04:05 GMT"));
        assert!(!cookie.contains("Secure"));
    }

    #[test]
    fn test_extract_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("foo=bar; session=abc123; other=xyz"),
        );

        assert_eq!(
            extract_cookie(&headers, "session"),
            Some("abc123".to_string())
        );
        assert_eq!(extract_cookie(&headers, "foo"), Some("bar".to_string()));
        assert_eq!(extract_cookie(&headers, "missing"), None);
    }

    #[test]
    fn test_extract_cookie_across_headers() {
        let mut headers = HeaderMap::new();
        headers.append(header::COOKIE, HeaderValue::from_static("foo=bar"));
        headers.append(header::COOKIE, HeaderValue::from_static("token=a.b.c"));

        assert_eq!(extract_cookie(&headers, "token"), Some("a.b.c".to_string()));
    }

    #[test]
    fn test_sign_unsign() {
        let signer = CookieSigner::new("my-secret");
        let signed = signer.sign("header.payload.signature");

        assert_ne!(signed, "header.payload.signature");
        assert_eq!(signer.unsign(&signed), Ok("header.payload.signature"));
    }

    #[test]
    fn test_unsign_rejects_other_secret() {
        let signed = CookieSigner::new("my-secret").sign("value");
        let other = CookieSigner::new("other-secret");

        assert_eq!(other.unsign(&signed), Err(CookieError::BadSignature));
    }

    #[test]
    fn test_unsign_rejects_tampered_value() {
        let signer = CookieSigner::new("my-secret");
        let signed = signer.sign("value");
        let tampered = signed.replacen("value", "valuf", 1);

        assert_eq!(signer.unsign(&tampered), Err(CookieError::BadSignature));
    }

    #[test]
    fn test_unsign_malformed() {
        let signer = CookieSigner::new("my-secret");
        assert_eq!(signer.unsign("no-signature"), Err(CookieError::Malformed));
        assert_eq!(signer.unsign("value.!!!"), Err(CookieError::Malformed));
    }

    #[test]
    fn test_signer_debug_redaction() {
        let signer = CookieSigner::new("my-secret");
        assert!(!format!("{:?}", signer).contains("my-secret"));
    }
}
