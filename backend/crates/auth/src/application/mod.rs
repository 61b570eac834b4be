//! Application Layer
//!
//! Configuration, credential checks and session tokens.

pub mod config;
pub mod credentials;
pub mod token;

// Re-exports
pub use config::{AuthConfig, AuthOptions, CookieOptions, DatabaseOptions};
pub use credentials::{CredentialService, LoginInput, RegisterInput, RegisteredUser};
pub use token::TokenService;
