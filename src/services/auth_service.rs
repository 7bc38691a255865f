//! Domain service for account registration, credential checks and password changes.
//!
//! Session handling lives at the HTTP layer; this service only answers whether a
//! set of credentials identifies an active user.

use thiserror::Error;

use crate::db::User;

/// Errors specific to authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Your account is inactive. Please contact support.")]
    Inactive,

    #[error("Current password is incorrect")]
    WrongPassword,

    #[error("User not found")]
    UserNotFound,

    #[error("{0}")]
    Validation(String),

    #[error("Username or email already exists")]
    Conflict,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for AuthError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

impl AuthError {
    /// Message safe to show to the person filling in the form
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Database(_) | Self::Internal(_) => {
                "An error occurred. Please try again.".to_string()
            }
            other => other.to_string(),
        }
    }
}

/// Registration form input.
#[derive(Debug, Clone, Default)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

/// Password change form input.
#[derive(Debug, Clone, Default)]
pub struct PasswordChange {
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

/// Domain service trait for authentication.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Creates a new account with a salted password hash.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Validation`] for empty fields or mismatched passwords
    /// and [`AuthError::Conflict`] if the username or email is taken.
    async fn register(&self, registration: Registration) -> Result<User, AuthError>;

    /// Verifies credentials and returns the user.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] for an unknown email or a wrong
    /// password, and [`AuthError::Inactive`] for a disabled account.
    async fn login(&self, email: &str, password: &str) -> Result<User, AuthError>;

    /// Loads the user a session points at.
    async fn get_user(&self, user_id: i32) -> Result<Option<User>, AuthError>;

    /// Replaces the stored hash after checking the current password.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::WrongPassword`] if the current password does not verify
    /// and [`AuthError::Validation`] for empty or mismatched new passwords.
    async fn change_password(&self, user_id: i32, change: PasswordChange)
    -> Result<(), AuthError>;
}
