use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde_json::{json, Value};

use service::auth::domain::{LoginInput, RegisterInput, UpdateProfileInput};
use service::auth::repository::UserRepository;
use service::message::repository::MessageRepository;
use service::token::store::RevocationStore;

use crate::errors::ApiError;
use crate::routes::{bearer_token, AppState};

pub async fn register<R, S, M>(
    State(state): State<AppState<R, S, M>>,
    Json(input): Json<RegisterInput>,
) -> Result<(StatusCode, Json<Value>), ApiError>
where
    R: UserRepository + 'static,
    S: RevocationStore + 'static,
    M: MessageRepository + 'static,
{
    let session = state.auth.register(input).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "User registered successfully",
            "user": session.user,
            "token": session.token,
        })),
    ))
}

pub async fn login<R, S, M>(
    State(state): State<AppState<R, S, M>>,
    Json(input): Json<LoginInput>,
) -> Result<Json<Value>, ApiError>
where
    R: UserRepository + 'static,
    S: RevocationStore + 'static,
    M: MessageRepository + 'static,
{
    let session = state.auth.login(input).await?;
    Ok(Json(json!({
        "message": "Login successful",
        "user": session.user,
        "token": session.token,
    })))
}

pub async fn logout<R, S, M>(
    State(state): State<AppState<R, S, M>>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError>
where
    R: UserRepository + 'static,
    S: RevocationStore + 'static,
    M: MessageRepository + 'static,
{
    let token = bearer_token(&headers);
    state.auth.logout(token.as_deref()).await?;
    Ok(Json(json!({"message": "User logged out successfully"})))
}

pub async fn profile<R, S, M>(
    State(state): State<AppState<R, S, M>>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError>
where
    R: UserRepository + 'static,
    S: RevocationStore + 'static,
    M: MessageRepository + 'static,
{
    let token = bearer_token(&headers);
    let user = state.auth.profile(token.as_deref()).await?;
    Ok(Json(json!({"user": user})))
}

pub async fn update_profile<R, S, M>(
    State(state): State<AppState<R, S, M>>,
    headers: HeaderMap,
    Json(input): Json<UpdateProfileInput>,
) -> Result<Json<Value>, ApiError>
where
    R: UserRepository + 'static,
    S: RevocationStore + 'static,
    M: MessageRepository + 'static,
{
    let token = bearer_token(&headers);
    let user = state.auth.update_profile(token.as_deref(), input).await?;
    Ok(Json(json!({
        "message": "Profile updated successfully",
        "user": user,
    })))
}
