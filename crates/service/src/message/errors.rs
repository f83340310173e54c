use thiserror::Error;

use crate::token::TokenError;
use crate::validate::FieldErrors;

/// Business errors for message workflows
#[derive(Debug, Error)]
pub enum MessageError {
    #[error("validation failed: {0}")]
    Validation(FieldErrors),
    #[error("message not found")]
    NotFound,
    #[error("caller is not the sender of this message")]
    Forbidden,
    #[error(transparent)]
    Token(#[from] TokenError),
    #[error("repository error: {0}")]
    Repository(String),
}
