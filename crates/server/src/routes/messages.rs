use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde_json::{json, Map, Value};
use uuid::Uuid;

use service::auth::repository::UserRepository;
use service::message::domain::{SendMessageInput, UpdateMessageInput};
use service::message::repository::MessageRepository;
use service::token::store::RevocationStore;

use crate::errors::ApiError;
use crate::routes::{bearer_token, AppState};

/// Conversation with a contact, grouped by sender display name. Messages in
/// each group keep their creation order.
pub async fn conversation<R, S, M>(
    State(state): State<AppState<R, S, M>>,
    Path(contact_id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError>
where
    R: UserRepository + 'static,
    S: RevocationStore + 'static,
    M: MessageRepository + 'static,
{
    let token = bearer_token(&headers);
    let entries = state.messages.conversation(token.as_deref(), contact_id).await?;

    let mut grouped = Map::new();
    for entry in entries {
        let bucket = grouped
            .entry(entry.sender_name.clone())
            .or_insert_with(|| Value::Array(Vec::new()));
        if let Value::Array(items) = bucket {
            items.push(json!({
                "id": entry.id,
                "body": entry.body,
                "created_at": entry.created_at,
            }));
        }
    }
    Ok(Json(Value::Object(grouped)))
}

pub async fn send<R, S, M>(
    State(state): State<AppState<R, S, M>>,
    headers: HeaderMap,
    Json(input): Json<SendMessageInput>,
) -> Result<(StatusCode, Json<Value>), ApiError>
where
    R: UserRepository + 'static,
    S: RevocationStore + 'static,
    M: MessageRepository + 'static,
{
    let token = bearer_token(&headers);
    let message = state.messages.send(token.as_deref(), input).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Message sent successfully",
            "data": message,
        })),
    ))
}

pub async fn update<R, S, M>(
    State(state): State<AppState<R, S, M>>,
    Path(message_id): Path<Uuid>,
    headers: HeaderMap,
    Json(input): Json<UpdateMessageInput>,
) -> Result<Json<Value>, ApiError>
where
    R: UserRepository + 'static,
    S: RevocationStore + 'static,
    M: MessageRepository + 'static,
{
    let token = bearer_token(&headers);
    let message = state.messages.update(token.as_deref(), message_id, input).await?;
    Ok(Json(json!({
        "message": "Message updated successfully",
        "data": message,
    })))
}

pub async fn remove<R, S, M>(
    State(state): State<AppState<R, S, M>>,
    Path(message_id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError>
where
    R: UserRepository + 'static,
    S: RevocationStore + 'static,
    M: MessageRepository + 'static,
{
    let token = bearer_token(&headers);
    state.messages.delete(token.as_deref(), message_id).await?;
    Ok(Json(json!({"message": "Message deleted successfully"})))
}
