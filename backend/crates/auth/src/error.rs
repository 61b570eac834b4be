//! Auth Error Types
//!
//! The error taxonomy of the plugin. Every failure carries an [`ErrorCode`]
//! whose HTTP status is derived by an exhaustive match, and every failure
//! reaches the client through the same translator ([`AuthError::into_response`]
//! or [`handle_error`]), which is the only place producing wire-visible text.

use std::borrow::Cow;
use std::error::Error;
use std::fmt;
use std::str::FromStr;

use axum::response::{IntoResponse, Response};
use kernel::error::{envelope::ErrorResponse, kind::ErrorKind};
use platform::cookie::CookieError;
use platform::password::PasswordHashError;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

// ============================================================================
// Error codes
// ============================================================================

/// Stable taxonomy key sent to clients as `code`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Plugin options are malformed or contain unknown keys
    InvalidOpts,
    /// No database pool connection configured
    PoolConnMissing,
    /// Database rejected the configured credentials
    DbAccess,
    /// Unknown email or wrong password
    InvalidCredentials,
    /// Email or username already registered
    DuplicateEntry,
    /// Request body failed validation
    Validation,
    /// Session token failed verification
    Token,
    /// Signed cookie string absent
    MissingCookie,
    /// No usable session cookie
    Unauthorized,
    Internal,
    NotFound,
}

/// Result of [`ErrorCode::describe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorDescription {
    pub message: &'static str,
    pub status: u16,
}

impl ErrorCode {
    pub const ALL: [ErrorCode; 11] = [
        ErrorCode::InvalidOpts,
        ErrorCode::PoolConnMissing,
        ErrorCode::DbAccess,
        ErrorCode::InvalidCredentials,
        ErrorCode::DuplicateEntry,
        ErrorCode::Validation,
        ErrorCode::Token,
        ErrorCode::MissingCookie,
        ErrorCode::Unauthorized,
        ErrorCode::Internal,
        ErrorCode::NotFound,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InvalidOpts => "ERR_INVALID_OPTS",
            ErrorCode::PoolConnMissing => "ERR_POOL_CONN_MISSING",
            ErrorCode::DbAccess => "ERR_DB_ACCESS",
            ErrorCode::InvalidCredentials => "ERR_INVALID_CREDENTIALS",
            ErrorCode::DuplicateEntry => "ERR_DUPLICATE_ENTRY",
            ErrorCode::Validation => "ERR_VALIDATION",
            ErrorCode::Token => "ERR_TOKEN",
            ErrorCode::MissingCookie => "ERR_MISSING_COOKIE",
            ErrorCode::Unauthorized => "ERR_UNAUTH",
            ErrorCode::Internal => "ERR_INTERNAL",
            ErrorCode::NotFound => "ERR_NOT_FOUND",
        }
    }

    pub const fn default_message(&self) -> &'static str {
        match self {
            ErrorCode::InvalidOpts => "Plugin options are invalid",
            ErrorCode::PoolConnMissing => "Missing database pool connection",
            ErrorCode::DbAccess => "Wrong or missing database credentials",
            ErrorCode::InvalidCredentials => "Invalid credentials",
            ErrorCode::DuplicateEntry => "Duplicate entry [email or username must be unique]",
            ErrorCode::Validation => "Validation Error",
            ErrorCode::Token => "Invalid or expired token",
            ErrorCode::MissingCookie => "Signed cookie string must be provided",
            ErrorCode::Unauthorized => "Unauthorized",
            ErrorCode::Internal => "Internal Server Error",
            ErrorCode::NotFound => "Resource not found",
        }
    }

    /// HTTP classification of the code
    pub const fn kind(&self) -> ErrorKind {
        match self {
            ErrorCode::DuplicateEntry | ErrorCode::InvalidCredentials | ErrorCode::Validation => {
                ErrorKind::BadRequest
            }
            ErrorCode::Token | ErrorCode::Unauthorized => ErrorKind::Unauthorized,
            ErrorCode::NotFound => ErrorKind::NotFound,
            ErrorCode::InvalidOpts
            | ErrorCode::PoolConnMissing
            | ErrorCode::DbAccess
            | ErrorCode::MissingCookie
            | ErrorCode::Internal => ErrorKind::InternalServerError,
        }
    }

    pub const fn status_code(&self) -> u16 {
        self.kind().status_code()
    }

    /// Default message and status for this code
    pub const fn describe(&self) -> ErrorDescription {
        ErrorDescription {
            message: self.default_message(),
            status: self.status_code(),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when parsing a string that is not a taxonomy code
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown error code: {0}")]
pub struct UnknownErrorCode(pub String);

impl FromStr for ErrorCode {
    type Err = UnknownErrorCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ErrorCode::ALL
            .into_iter()
            .find(|code| code.as_str() == s)
            .ok_or_else(|| UnknownErrorCode(s.to_string()))
    }
}

// ============================================================================
// AuthError
// ============================================================================

/// Taxonomy error
///
/// Created where a failure is detected and propagated unchanged with `?`
/// until it reaches the translator.
///
/// ## Examples
/// ```rust
/// use auth_plugin::error::{AuthError, ErrorCode};
///
/// let err = AuthError::new(ErrorCode::DuplicateEntry);
/// assert_eq!(err.status_code(), 400);
/// assert_eq!(err.message(), "Duplicate entry [email or username must be unique]");
///
/// let err = AuthError::with_message(ErrorCode::Validation, "body/password is required");
/// assert_eq!(err.message(), "body/password is required");
/// ```
pub struct AuthError {
    code: ErrorCode,
    message: Cow<'static, str>,
    source: Option<Box<dyn Error + Send + Sync + 'static>>,
}

impl AuthError {
    /// Error with the default message for `code`
    #[inline]
    pub fn new(code: ErrorCode) -> Self {
        Self {
            code,
            message: Cow::Borrowed(code.default_message()),
            source: None,
        }
    }

    /// Error with a custom message
    #[inline]
    pub fn with_message(code: ErrorCode, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Attach the underlying cause (logged, never sent to clients)
    #[inline]
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    #[inline]
    pub fn invalid_credentials() -> Self {
        Self::new(ErrorCode::InvalidCredentials)
    }

    #[inline]
    pub fn duplicate_entry() -> Self {
        Self::new(ErrorCode::DuplicateEntry)
    }

    #[inline]
    pub fn unauthorized() -> Self {
        Self::new(ErrorCode::Unauthorized)
    }

    #[inline]
    pub fn token() -> Self {
        Self::new(ErrorCode::Token)
    }

    #[inline]
    pub fn validation(message: impl Into<Cow<'static, str>>) -> Self {
        Self::with_message(ErrorCode::Validation, message)
    }

    #[inline]
    pub fn internal(message: impl Into<Cow<'static, str>>) -> Self {
        Self::with_message(ErrorCode::Internal, message)
    }

    #[inline]
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.code.kind()
    }

    #[inline]
    pub fn status_code(&self) -> u16 {
        self.code.status_code()
    }

    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Message as sent to clients
    ///
    /// Server-side errors never expose their custom message.
    pub fn public_message(&self) -> &str {
        if self.kind().is_server_error() {
            self.code.default_message()
        } else {
            &self.message
        }
    }

    /// Build the wire response
    pub fn to_error_response(&self) -> ErrorResponse {
        ErrorResponse::new(
            self.kind(),
            self.code.as_str(),
            self.public_message().to_string(),
        )
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self.code {
            _ if self.kind().is_server_error() => match &self.source {
                Some(source) => {
                    tracing::error!(code = %self.code, message = %self.message, error = %source, "Auth server error")
                }
                None => tracing::error!(code = %self.code, message = %self.message, "Auth server error"),
            },
            ErrorCode::InvalidCredentials => {
                tracing::warn!("Invalid login attempt");
            }
            ErrorCode::Token => {
                tracing::warn!("Rejected session token");
            }
            _ => {
                tracing::debug!(code = %self.code, message = %self.message, "Auth error");
            }
        }
    }

    fn respond(&self) -> Response {
        self.log();
        self.to_error_response().into_response()
    }
}

impl fmt::Debug for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut builder = f.debug_struct("AuthError");
        builder.field("code", &self.code);
        builder.field("message", &self.message);
        if let Some(source) = &self.source {
            builder.field("source", source);
        }
        builder.finish()
    }
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl Error for AuthError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn Error + 'static))
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.respond()
    }
}

/// Boundary translator for arbitrary errors
///
/// A taxonomy error anywhere in the source chain is answered with its code;
/// anything else becomes a bare `ERR_INTERNAL` without detail.
pub fn handle_error(error: &(dyn Error + 'static)) -> Response {
    let mut current = Some(error);
    while let Some(err) = current {
        if let Some(auth_error) = err.downcast_ref::<AuthError>() {
            return auth_error.respond();
        }
        current = err.source();
    }

    tracing::error!(error = %error, "Unhandled error");
    AuthError::new(ErrorCode::Internal)
        .to_error_response()
        .into_response()
}

// ============================================================================
// Conversions
// ============================================================================

impl From<sqlx::Error> for AuthError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                AuthError::duplicate_entry().with_source(err)
            }
            sqlx::Error::Database(db_err)
                if matches!(db_err.code().as_deref(), Some("28P01" | "28000")) =>
            {
                AuthError::new(ErrorCode::DbAccess).with_source(err)
            }
            _ => AuthError::internal("Database error").with_source(err),
        }
    }
}

impl From<PasswordHashError> for AuthError {
    fn from(err: PasswordHashError) -> Self {
        AuthError::internal("Password hashing error").with_source(err)
    }
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        AuthError::token().with_source(err)
    }
}

impl From<CookieError> for AuthError {
    fn from(err: CookieError) -> Self {
        AuthError::unauthorized().with_source(err)
    }
}

impl From<tokio::task::JoinError> for AuthError {
    fn from(err: tokio::task::JoinError) -> Self {
        AuthError::internal("Background task failed").with_source(err)
    }
}
