// src/models/user.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'users' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: i64,

    /// Unique username.
    pub username: String,

    /// Unique email address.
    pub email: String,

    /// Argon2 password hash.
    /// Skipped during serialization to prevent leaking sensitive data.
    #[serde(skip)]
    pub password_hash: String,

    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Registration form body. Missing fields decode as empty and fail validation.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct RegisterForm {
    #[validate(length(
        min = 3,
        max = 120,
        message = "Username length must be between 3 and 120 characters."
    ))]
    pub username: String,
    #[validate(
        email(message = "Please enter a valid email address."),
        length(max = 120, message = "Email must be at most 120 characters.")
    )]
    pub email: String,
    #[validate(length(
        min = 4,
        max = 128,
        message = "Password length must be between 4 and 128 characters."
    ))]
    pub password: String,
}

/// Login form body.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct LoginForm {
    #[validate(length(min = 1, max = 120))]
    pub username: String,
    #[validate(length(min = 1, max = 128))]
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(username: &str, email: &str, password: &str) -> RegisterForm {
        RegisterForm {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn accepts_well_formed_registration() {
        assert!(form("asha", "asha@example.com", "password123").validate().is_ok());
    }

    #[test]
    fn rejects_short_username_and_bad_email() {
        assert!(form("yo", "asha@example.com", "password123").validate().is_err());
        assert!(form("asha", "not-an-email", "password123").validate().is_err());
        assert!(form("asha", "asha@example.com", "abc").validate().is_err());
    }
}
