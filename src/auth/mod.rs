pub mod extractors;
pub mod password;
pub mod token;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::models::user::UserView;

// Re-export necessary items
pub use extractors::AuthedUser;
pub use password::{hash_password, verify_password};
pub use token::{generate_token, verify_token, Claims};

/// Rejects passwords containing the literal word "password", in any casing.
pub(crate) fn password_content(value: &str) -> Result<(), ValidationError> {
    if value.to_lowercase().contains("password") {
        let mut error = ValidationError::new("password_content");
        error.message = Some("password cannot contain the word \"password\"".into());
        return Err(error);
    }
    Ok(())
}

/// Represents the payload for a user login request.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    pub password: String,
}

/// Represents the payload for a new user registration request.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Display name for the new account. Leading/trailing whitespace is
    /// trimmed before persisting.
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    /// Email address for the new account. Must be a well-formed address and
    /// unique across users.
    #[validate(email)]
    pub email: String,
    /// Optional age; defaults to 0 and must not be negative.
    #[validate(range(min = 0, message = "age must be a positive number"))]
    pub age: Option<i32>,
    /// Password for the new account. At least 7 characters and must not
    /// contain the word "password".
    #[validate(length(min = 7), custom = "password_content")]
    pub password: String,
}

/// Response body after a successful signup or login: the sanitized user plus
/// the freshly issued session token.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub user: UserView,
    pub token: String,
}
