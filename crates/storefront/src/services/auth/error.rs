//! Authentication error types.

use thiserror::Error;

use super::tokens::TokenError;
use crate::db::StoreError;

/// Errors that can occur during signup and login.
#[derive(Debug, Error)]
pub enum AuthError {
    /// A signup field failed validation.
    #[error("{0}")]
    Validation(String),

    /// Wrong email or wrong password.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The email is already registered.
    #[error("user already exists")]
    UserAlreadyExists,

    /// The phone number is already registered.
    #[error("phone number already in use")]
    PhoneInUse,

    /// An admin login was attempted with a non-admin account.
    #[error("access denied: admin privileges required")]
    NotAdmin,

    /// Token issuance failed.
    #[error("token error: {0}")]
    Token(#[from] TokenError),

    /// Store error.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}
