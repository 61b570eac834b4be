//! Presentation Layer
//!
//! HTTP handlers, DTOs, extractors, router, and middleware.

pub mod dto;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod router;

pub use extract::{CurrentUser, ValidatedJson};
pub use handlers::AuthAppState;
pub use middleware::{AuthGate, require_auth};
pub use router::AuthPlugin;
