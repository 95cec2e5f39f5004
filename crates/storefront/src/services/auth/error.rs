//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during signup and login.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Role string is not one of the known roles.
    #[error("Invalid role specified.")]
    InvalidRole(#[from] chaldal_core::RoleError),

    /// Invalid email format.
    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] chaldal_core::EmailError),

    /// Invalid phone number.
    #[error("Invalid phone: {0}")]
    InvalidPhone(#[from] chaldal_core::PhoneError),

    /// Missing or blank full name.
    #[error("Full name is required")]
    MissingName,

    /// Full name longer than the column allows.
    #[error("Full name must be at most {max} characters")]
    NameTooLong { max: usize },

    /// Password too weak or invalid.
    #[error("{0}")]
    WeakPassword(String),

    /// Unknown address label.
    #[error("Invalid address label: {0}")]
    InvalidLabel(String),

    /// Email or phone already registered.
    #[error("Email or Phone already exists")]
    UserAlreadyExists,

    /// No person with this email.
    #[error("User not found")]
    UserNotFound,

    /// Wrong password.
    #[error("Invalid Password")]
    InvalidCredentials,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}

impl AuthError {
    /// Whether the caller sent bad input (as opposed to a server failure).
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        !matches!(self, Self::Repository(_) | Self::PasswordHash)
    }
}
