//! Shared Kernel - Domain-crossing minimal core
//!
//! This crate contains the "smallest core" of the HTTP vocabulary:
//! - Error classification mapped to HTTP status codes
//! - The JSON response envelope shared by every endpoint
//!
//! **Design Principle**: Only include things that are "hard to change"
//! and have consistent meaning across all domains.

pub mod error {
    pub mod envelope;
    pub mod kind;
}
