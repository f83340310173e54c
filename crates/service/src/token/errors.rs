use thiserror::Error;

/// Verify-style failures for bearer tokens.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TokenError {
    #[error("token not provided")]
    Missing,
    #[error("token is invalid")]
    Malformed,
    #[error("token has expired")]
    Expired,
    #[error("token has been revoked")]
    Revoked,
    #[error("could not create token: {0}")]
    Creation(String),
    #[error("revocation store error: {0}")]
    Store(String),
}
