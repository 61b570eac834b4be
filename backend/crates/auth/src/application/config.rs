//! Plugin Configuration
//!
//! [`AuthOptions`] is what the host application supplies (all keys optional,
//! camelCase, unknown keys rejected). [`AuthConfig::resolve`] applies the
//! defaults field by field and produces the immutable configuration shared by
//! every request.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::error::{AuthError, AuthResult, ErrorCode};

/// Re-export SameSite from platform
pub use platform::cookie::SameSite;
use platform::cookie::CookieConfig;
use platform::password::DEFAULT_TIME_COST;

pub const DEFAULT_ROUTE_PREFIX: &str = "/auth";
/// Insecure fallback; must be overridden in production
pub const DEFAULT_JWT_SECRET: &str = "mysupersecret";
pub const DEFAULT_COOKIE_SECRET: &str = "secret-cookie";
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(3600);
/// Upper bound for `tokenExpiresIn` (ten years)
pub const MAX_TOKEN_TTL_SECS: u64 = 10 * 365 * 24 * 60 * 60;
/// Name of the cookie carrying the signed session token
pub const SESSION_COOKIE_NAME: &str = "token";

const ALLOWED_KEYS: [&str; 6] = [
    "routePrefix",
    "jwtSecret",
    "databasePoolConnection",
    "cookieOptions",
    "tokenExpiresIn",
    "passwordHashCost",
];

const OBJECT_KEYS: [&str; 2] = ["databasePoolConnection", "cookieOptions"];

// ============================================================================
// Raw options
// ============================================================================

/// Options supplied by the host application
#[derive(Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AuthOptions {
    pub route_prefix: Option<String>,
    pub jwt_secret: Option<String>,
    pub database_pool_connection: Option<DatabaseOptions>,
    pub cookie_options: Option<CookieOptions>,
    /// Token lifetime in seconds; `0` issues tokens without expiry
    pub token_expires_in: Option<u64>,
    /// Argon2 time cost
    pub password_hash_cost: Option<u32>,
}

impl fmt::Debug for AuthOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthOptions")
            .field("route_prefix", &self.route_prefix)
            .field("jwt_secret", &self.jwt_secret.as_ref().map(|_| "[REDACTED]"))
            .field("database_pool_connection", &self.database_pool_connection)
            .field("cookie_options", &self.cookie_options)
            .field("token_expires_in", &self.token_expires_in)
            .field("password_hash_cost", &self.password_hash_cost)
            .finish()
    }
}

/// Connection parameters for the storage pool
///
/// `url` is parsed first; individual fields override the matching parts of it.
#[derive(Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DatabaseOptions {
    pub url: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub database: Option<String>,
    pub max_connections: Option<u32>,
}

impl DatabaseOptions {
    pub fn from_url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Default::default()
        }
    }
}

impl fmt::Debug for DatabaseOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseOptions")
            .field("url", &self.url.as_ref().map(|_| "[REDACTED]"))
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("database", &self.database)
            .field("max_connections", &self.max_connections)
            .finish()
    }
}

/// Session cookie options
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CookieOptions {
    /// Key for the cookie signature
    pub secret: String,
    pub expires: Option<DateTime<Utc>>,
    /// Seconds
    pub max_age: Option<i64>,
    pub secure: Option<bool>,
    pub path: Option<String>,
    pub domain: Option<String>,
    pub same_site: Option<SameSite>,
    pub partitioned: Option<bool>,
}

impl CookieOptions {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            expires: None,
            max_age: None,
            secure: None,
            path: None,
            domain: None,
            same_site: None,
            partitioned: None,
        }
    }
}

impl fmt::Debug for CookieOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CookieOptions")
            .field("secret", &"[REDACTED]")
            .field("expires", &self.expires)
            .field("max_age", &self.max_age)
            .field("secure", &self.secure)
            .field("path", &self.path)
            .field("domain", &self.domain)
            .field("same_site", &self.same_site)
            .field("partitioned", &self.partitioned)
            .finish()
    }
}

impl AuthOptions {
    /// Parse options from untyped JSON
    ///
    /// Unknown top-level keys and non-object nested sections are rejected
    /// with `ERR_INVALID_OPTS`.
    pub fn from_value(value: Value) -> AuthResult<Self> {
        let Value::Object(map) = &value else {
            return Err(AuthError::with_message(
                ErrorCode::InvalidOpts,
                "Plugin options must be an object",
            ));
        };

        for (key, entry) in map {
            if !ALLOWED_KEYS.contains(&key.as_str()) {
                return Err(AuthError::with_message(
                    ErrorCode::InvalidOpts,
                    format!("Unknown option {key}"),
                ));
            }
            if OBJECT_KEYS.contains(&key.as_str()) && !entry.is_object() {
                return Err(AuthError::with_message(
                    ErrorCode::InvalidOpts,
                    format!("Property {key} must be an object"),
                ));
            }
        }

        serde_json::from_value(value).map_err(|e| {
            let message = e.to_string();
            AuthError::with_message(ErrorCode::InvalidOpts, message).with_source(e)
        })
    }

    pub fn from_json_str(raw: &str) -> AuthResult<Self> {
        let value: Value = serde_json::from_str(raw).map_err(|e| {
            let message = e.to_string();
            AuthError::with_message(ErrorCode::InvalidOpts, message).with_source(e)
        })?;
        Self::from_value(value)
    }
}

// ============================================================================
// Resolved configuration
// ============================================================================

/// Resolved plugin configuration (immutable after startup)
#[derive(Clone)]
pub struct AuthConfig {
    /// Mount point of the auth routes, without trailing slash
    pub route_prefix: String,
    pub jwt_secret: String,
    /// `None` only when a repository is supplied directly
    pub database: Option<DatabaseOptions>,
    /// Attributes of the session cookie (always HttpOnly)
    pub cookie: CookieConfig,
    pub cookie_secret: Vec<u8>,
    /// `None` disables the expiry claim
    pub token_ttl: Option<Duration>,
    pub password_hash_cost: u32,
}

impl AuthConfig {
    /// Apply defaults to every omitted option and validate the result
    pub fn resolve(options: AuthOptions) -> AuthResult<Self> {
        let route_prefix = normalize_prefix(
            options
                .route_prefix
                .as_deref()
                .unwrap_or(DEFAULT_ROUTE_PREFIX),
        )?;

        let jwt_secret = options
            .jwt_secret
            .unwrap_or_else(|| DEFAULT_JWT_SECRET.to_string());
        if jwt_secret.is_empty() {
            return Err(AuthError::with_message(
                ErrorCode::InvalidOpts,
                "jwtSecret must not be empty",
            ));
        }
        if jwt_secret == DEFAULT_JWT_SECRET {
            tracing::warn!("Using the default JWT secret; set jwtSecret in production");
        }

        let cookie_options = options
            .cookie_options
            .unwrap_or_else(|| CookieOptions::new(DEFAULT_COOKIE_SECRET));
        if cookie_options.secret.is_empty() {
            return Err(AuthError::with_message(
                ErrorCode::InvalidOpts,
                "cookieOptions.secret must not be empty",
            ));
        }

        let cookie = CookieConfig {
            name: SESSION_COOKIE_NAME.to_string(),
            secure: cookie_options.secure.unwrap_or(true),
            http_only: true,
            same_site: cookie_options.same_site.unwrap_or(SameSite::Strict),
            path: cookie_options.path.unwrap_or_else(|| "/".to_string()),
            domain: cookie_options.domain,
            max_age_secs: cookie_options.max_age,
            expires: cookie_options.expires,
            partitioned: cookie_options.partitioned.unwrap_or(false),
        };

        let token_ttl = match options.token_expires_in {
            Some(0) => None,
            Some(secs) if secs > MAX_TOKEN_TTL_SECS => {
                return Err(AuthError::with_message(
                    ErrorCode::InvalidOpts,
                    format!("tokenExpiresIn must not exceed {MAX_TOKEN_TTL_SECS} seconds"),
                ));
            }
            Some(secs) => Some(Duration::from_secs(secs)),
            None => Some(DEFAULT_TOKEN_TTL),
        };

        let password_hash_cost = options.password_hash_cost.unwrap_or(DEFAULT_TIME_COST);
        if password_hash_cost == 0 {
            return Err(AuthError::with_message(
                ErrorCode::InvalidOpts,
                "passwordHashCost must be at least 1",
            ));
        }

        Ok(Self {
            route_prefix,
            jwt_secret,
            database: options.database_pool_connection,
            cookie,
            cookie_secret: cookie_options.secret.into_bytes(),
            token_ttl,
            password_hash_cost,
        })
    }

    /// Resolve from untyped JSON options
    pub fn from_value(value: Value) -> AuthResult<Self> {
        Self::resolve(AuthOptions::from_value(value)?)
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            route_prefix: DEFAULT_ROUTE_PREFIX.to_string(),
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
            database: None,
            cookie: CookieConfig {
                name: SESSION_COOKIE_NAME.to_string(),
                same_site: SameSite::Strict,
                ..CookieConfig::default()
            },
            cookie_secret: DEFAULT_COOKIE_SECRET.as_bytes().to_vec(),
            token_ttl: Some(DEFAULT_TOKEN_TTL),
            password_hash_cost: DEFAULT_TIME_COST,
        }
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("route_prefix", &self.route_prefix)
            .field("jwt_secret", &"[REDACTED]")
            .field("database", &self.database)
            .field("cookie", &self.cookie)
            .field("cookie_secret", &"[REDACTED]")
            .field("token_ttl", &self.token_ttl)
            .field("password_hash_cost", &self.password_hash_cost)
            .finish()
    }
}

/// `"/api/auth/"` -> `"/api/auth"`; `"/"` stays as is
fn normalize_prefix(prefix: &str) -> AuthResult<String> {
    if !prefix.starts_with('/') {
        return Err(AuthError::with_message(
            ErrorCode::InvalidOpts,
            "routePrefix must start with '/'",
        ));
    }

    let trimmed = prefix.trim_end_matches('/');
    if trimmed.is_empty() {
        Ok("/".to_string())
    } else {
        Ok(trimmed.to_string())
    }
}
