use std::sync::Arc;

use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use common::types::Health;
use service::auth::repository::UserRepository;
use service::auth::AuthService;
use service::message::repository::MessageRepository;
use service::message::MessageService;
use service::token::store::RevocationStore;

pub mod auth;
pub mod messages;

/// Shared handler state. Generic over the repository traits so the tests can
/// drive the real HTTP surface against the in-memory mocks.
pub struct AppState<R, S, M>
where
    R: UserRepository,
    S: RevocationStore,
    M: MessageRepository,
{
    pub auth: Arc<AuthService<R, S>>,
    pub messages: Arc<MessageService<M, R, S>>,
}

impl<R, S, M> Clone for AppState<R, S, M>
where
    R: UserRepository,
    S: RevocationStore,
    M: MessageRepository,
{
    fn clone(&self) -> Self {
        Self { auth: Arc::clone(&self.auth), messages: Arc::clone(&self.messages) }
    }
}

/// Bearer token from the Authorization header, if present.
///
/// The token is handed explicitly to each service call; there is no ambient
/// authenticated-user context.
pub(crate) fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// Build the full application router: public auth endpoints plus the
/// token-protected profile and messaging API.
pub fn build_router<R, S, M>(cors: CorsLayer, state: AppState<R, S, M>) -> Router
where
    R: UserRepository + 'static,
    S: RevocationStore + 'static,
    M: MessageRepository + 'static,
{
    let public: Router<AppState<R, S, M>> = Router::new()
        .route("/health", get(health))
        .route("/register", post(auth::register::<R, S, M>))
        .route("/login", post(auth::login::<R, S, M>));

    let protected: Router<AppState<R, S, M>> = Router::new()
        .route("/logout", post(auth::logout::<R, S, M>))
        .route(
            "/users/me",
            get(auth::profile::<R, S, M>).put(auth::update_profile::<R, S, M>),
        )
        .route("/messages", post(messages::send::<R, S, M>))
        .route(
            "/messages/:id",
            get(messages::conversation::<R, S, M>)
                .put(messages::update::<R, S, M>)
                .delete(messages::remove::<R, S, M>),
        );

    public
        .merge(protected)
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::HeaderValue;

    #[test]
    fn bearer_token_extraction() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc.def.ghi"));
        assert_eq!(bearer_token(&headers).as_deref(), Some("abc.def.ghi"));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic dXNlcg=="));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(bearer_token(&headers), None);
    }
}
