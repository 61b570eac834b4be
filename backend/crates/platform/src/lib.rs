//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Cryptographic utilities (HMAC-SHA256, Base64, constant-time comparison)
//! - Password hashing (Argon2id behind a pluggable trait)
//! - Cookie management (signing, `Set-Cookie` building, extraction)

pub mod cookie;
pub mod crypto;
pub mod password;
