//! Domain Layer
//!
//! Contains entities and the repository trait.

pub mod entity;
pub mod repository;

// Re-exports
pub use entity::{identity::SessionIdentity, user::{NewUser, User}};
pub use repository::UserRepository;
