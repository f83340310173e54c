use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

use service::auth::AuthError;
use service::message::MessageError;
use service::token::TokenError;
use service::validate::FieldErrors;

/// HTTP-facing error mapping the service taxonomy onto status codes and the
/// JSON shapes the API promises.
#[derive(Debug)]
pub enum ApiError {
    /// 422 with the bare field -> messages map as the body.
    Validation(FieldErrors),
    /// 401 `{"error": "Invalid credentials"}` for failed logins.
    InvalidCredentials,
    /// 401 `{"message": ...}` for token failures.
    Unauthenticated(&'static str),
    /// 403 `{"error": "Unauthorized"}` for ownership violations.
    Forbidden,
    /// 404 `{"error": ...}` when the referenced entity truly does not exist.
    NotFound(&'static str),
    /// 500; the detail is logged, not leaked.
    Internal(String),
}

fn token_message(e: &TokenError) -> &'static str {
    match e {
        TokenError::Missing => "Token not provided",
        TokenError::Malformed => "Token is invalid",
        TokenError::Expired => "Token has expired",
        TokenError::Revoked => "The token has been blacklisted",
        TokenError::Creation(_) | TokenError::Store(_) => "Could not process token",
    }
}

impl From<TokenError> for ApiError {
    fn from(e: TokenError) -> Self {
        match e {
            TokenError::Creation(msg) | TokenError::Store(msg) => ApiError::Internal(msg),
            other => ApiError::Unauthenticated(token_message(&other)),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::Validation(errors) => ApiError::Validation(errors),
            AuthError::InvalidCredentials => ApiError::InvalidCredentials,
            AuthError::UserNotFound => ApiError::NotFound("User not found"),
            AuthError::Conflict => ApiError::Validation(FieldErrors::single(
                "email",
                "The email has already been taken.",
            )),
            AuthError::Token(t) => t.into(),
            AuthError::Hash(msg) | AuthError::Repository(msg) => ApiError::Internal(msg),
        }
    }
}

impl From<MessageError> for ApiError {
    fn from(e: MessageError) -> Self {
        match e {
            MessageError::Validation(errors) => ApiError::Validation(errors),
            MessageError::NotFound => ApiError::NotFound("Message not found"),
            MessageError::Forbidden => ApiError::Forbidden,
            MessageError::Token(t) => t.into(),
            MessageError::Repository(msg) => ApiError::Internal(msg),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(errors) => {
                (StatusCode::UNPROCESSABLE_ENTITY, Json(errors)).into_response()
            }
            ApiError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                Json(json!({"error": "Invalid credentials"})),
            )
                .into_response(),
            ApiError::Unauthenticated(msg) => {
                (StatusCode::UNAUTHORIZED, Json(json!({"message": msg}))).into_response()
            }
            ApiError::Forbidden => {
                (StatusCode::FORBIDDEN, Json(json!({"error": "Unauthorized"}))).into_response()
            }
            ApiError::NotFound(msg) => {
                (StatusCode::NOT_FOUND, Json(json!({"error": msg}))).into_response()
            }
            ApiError::Internal(msg) => {
                error!(error = %msg, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({"error": "Server error"})),
                )
                    .into_response()
            }
        }
    }
}
