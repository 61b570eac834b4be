//! API DTOs (Data Transfer Objects)
//!
//! Request bodies declare their shape through [`BodySchema`]; the
//! [`ValidatedJson`](super::extract::ValidatedJson) extractor checks it
//! before deserializing.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::application::credentials::RegisteredUser;

// ============================================================================
// Body schema
// ============================================================================

/// Required string property of a request body
#[derive(Debug, Clone, Copy)]
pub struct StringField {
    pub name: &'static str,
    /// Minimum length in characters
    pub min_length: usize,
}

impl StringField {
    pub const fn required(name: &'static str) -> Self {
        Self {
            name,
            min_length: 0,
        }
    }

    pub const fn min_length(mut self, min_length: usize) -> Self {
        self.min_length = min_length;
        self
    }
}

/// JSON object body made only of required string properties
pub trait BodySchema: DeserializeOwned {
    const FIELDS: &'static [StringField];

    /// Check `body` against [`Self::FIELDS`]
    ///
    /// Reports the first violation: object type, then missing properties,
    /// then property type and length.
    fn validate(body: &Value) -> Result<(), String> {
        let Some(object) = body.as_object() else {
            return Err("body must be object".to_string());
        };

        if let Some(missing) = Self::FIELDS.iter().find(|f| !object.contains_key(f.name)) {
            return Err(format!(
                "body must have required property '{}'",
                missing.name
            ));
        }

        for field in Self::FIELDS {
            match object.get(field.name) {
                Some(Value::String(value)) => {
                    if value.chars().count() < field.min_length {
                        return Err(format!(
                            "body/{} must NOT have fewer than {} characters",
                            field.name, field.min_length
                        ));
                    }
                }
                _ => return Err(format!("body/{} must be string", field.name)),
            }
        }

        Ok(())
    }
}

// ============================================================================
// Register
// ============================================================================

/// Minimum password length accepted at registration
pub const PASSWORD_MIN_LENGTH: usize = 9;

/// POST /register body
#[derive(Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl BodySchema for RegisterRequest {
    const FIELDS: &'static [StringField] = &[
        StringField::required("username"),
        StringField::required("email"),
        StringField::required("password").min_length(PASSWORD_MIN_LENGTH),
    ];
}

/// Registered user payload (`data` of the 201 response)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegisteredUserDto {
    pub id: i64,
    pub email: String,
    pub username: String,
}

impl From<RegisteredUser> for RegisteredUserDto {
    fn from(user: RegisteredUser) -> Self {
        Self {
            id: user.id,
            email: user.email,
            username: user.username,
        }
    }
}

// ============================================================================
// Login
// ============================================================================

/// POST /login body
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl BodySchema for LoginRequest {
    const FIELDS: &'static [StringField] = &[
        StringField::required("email"),
        StringField::required("password"),
    ];
}
