use thiserror::Error;

use crate::token::TokenError;
use crate::validate::FieldErrors;

/// Business errors for auth workflows
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("validation failed: {0}")]
    Validation(FieldErrors),
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("user not found")]
    UserNotFound,
    #[error("email already taken")]
    Conflict,
    #[error(transparent)]
    Token(#[from] TokenError),
    #[error("hashing error: {0}")]
    Hash(String),
    #[error("repository error: {0}")]
    Repository(String),
}

impl AuthError {
    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            AuthError::Validation(_) => 1001,
            AuthError::Conflict => 1002,
            AuthError::UserNotFound => 1003,
            AuthError::InvalidCredentials => 1004,
            AuthError::Hash(_) => 1101,
            AuthError::Token(_) => 1102,
            AuthError::Repository(_) => 1200,
        }
    }
}
