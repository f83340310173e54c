use std::sync::Arc;

use tracing::{info, instrument};
use uuid::Uuid;

use super::domain::{
    ConversationMessage, MessageRecord, SendMessageInput, UpdateMessageInput,
};
use super::errors::MessageError;
use super::repository::MessageRepository;
use crate::auth::errors::AuthError;
use crate::auth::repository::UserRepository;
use crate::token::store::RevocationStore;
use crate::token::TokenService;
use crate::validate::{required, validate_body, FieldErrors};

/// Message business service independent of the web framework.
///
/// Every operation resolves the caller from the presented token first; the
/// ownership rule for mutations is caller id == message sender, nothing else.
pub struct MessageService<M: MessageRepository, R: UserRepository, S: RevocationStore> {
    messages: Arc<M>,
    users: Arc<R>,
    tokens: Arc<TokenService<S>>,
}

fn user_err(e: AuthError) -> MessageError {
    MessageError::Repository(e.to_string())
}

impl<M: MessageRepository, R: UserRepository, S: RevocationStore> MessageService<M, R, S> {
    pub fn new(messages: Arc<M>, users: Arc<R>, tokens: Arc<TokenService<S>>) -> Self {
        Self { messages, users, tokens }
    }

    /// All messages between the caller and `contact_id` in either direction,
    /// oldest first, each labelled with the sender's display name.
    #[instrument(skip(self, token))]
    pub async fn conversation(
        &self,
        token: Option<&str>,
        contact_id: Uuid,
    ) -> Result<Vec<ConversationMessage>, MessageError> {
        let caller_id = self.tokens.verify(token).await?;
        let caller_name = self
            .users
            .find_by_id(caller_id)
            .await
            .map_err(user_err)?
            .map(|u| u.name)
            .unwrap_or_else(|| caller_id.to_string());
        let contact_name = self
            .users
            .find_by_id(contact_id)
            .await
            .map_err(user_err)?
            .map(|u| u.name)
            .unwrap_or_else(|| contact_id.to_string());

        let rows = self.messages.list_between(caller_id, contact_id).await?;
        Ok(rows
            .into_iter()
            .map(|m| {
                let sender_name = if m.sender == caller_id {
                    caller_name.clone()
                } else {
                    contact_name.clone()
                };
                ConversationMessage {
                    id: m.id,
                    body: m.body,
                    sender: m.sender,
                    sender_name,
                    created_at: m.created_at,
                }
            })
            .collect())
    }

    /// Persist a new message from the caller to `input.receiver`.
    #[instrument(skip(self, token, input))]
    pub async fn send(
        &self,
        token: Option<&str>,
        input: SendMessageInput,
    ) -> Result<MessageRecord, MessageError> {
        let caller_id = self.tokens.verify(token).await?;

        let mut errors = FieldErrors::new();
        let body = required(&mut errors, "body", input.body.as_deref(), validate_body);
        let receiver = match input.receiver.as_deref() {
            None => {
                errors.add("receiver", "The receiver field is required.");
                None
            }
            Some(raw) => match Uuid::parse_str(raw.trim()) {
                Err(_) => {
                    errors.add("receiver", "The selected receiver is invalid.");
                    None
                }
                Ok(id) => match self.users.find_by_id(id).await.map_err(user_err)? {
                    None => {
                        errors.add("receiver", "The selected receiver is invalid.");
                        None
                    }
                    Some(user) => Some(user.id),
                },
            },
        };
        if !errors.is_empty() {
            return Err(MessageError::Validation(errors));
        }
        let (Some(receiver), Some(body)) = (receiver, body) else {
            return Err(MessageError::Validation(errors));
        };

        let message = self.messages.insert(caller_id, receiver, &body).await?;
        info!(message_id = %message.id, sender = %caller_id, receiver = %receiver, "message_sent");
        Ok(message)
    }

    /// Replace the body of a message the caller sent.
    ///
    /// Check order: existence, then ownership, then body validation.
    #[instrument(skip(self, token, input))]
    pub async fn update(
        &self,
        token: Option<&str>,
        message_id: Uuid,
        input: UpdateMessageInput,
    ) -> Result<MessageRecord, MessageError> {
        let caller_id = self.tokens.verify(token).await?;
        let existing = self
            .messages
            .find_by_id(message_id)
            .await?
            .ok_or(MessageError::NotFound)?;
        if existing.sender != caller_id {
            return Err(MessageError::Forbidden);
        }

        let mut errors = FieldErrors::new();
        let body = required(&mut errors, "body", input.body.as_deref(), validate_body);
        if !errors.is_empty() {
            return Err(MessageError::Validation(errors));
        }
        let Some(body) = body else {
            return Err(MessageError::Validation(errors));
        };

        let updated = self.messages.update_body(message_id, &body).await?;
        info!(message_id = %message_id, sender = %caller_id, "message_updated");
        Ok(updated)
    }

    /// Delete a message the caller sent.
    #[instrument(skip(self, token))]
    pub async fn delete(&self, token: Option<&str>, message_id: Uuid) -> Result<(), MessageError> {
        let caller_id = self.tokens.verify(token).await?;
        let existing = self
            .messages
            .find_by_id(message_id)
            .await?
            .ok_or(MessageError::NotFound)?;
        if existing.sender != caller_id {
            return Err(MessageError::Forbidden);
        }

        self.messages.delete(message_id).await?;
        info!(message_id = %message_id, sender = %caller_id, "message_deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::domain::{AuthUser, NewUser};
    use crate::auth::repository::mock::MockUserRepository;
    use crate::message::repository::mock::MockMessageRepository;
    use crate::token::store::mock::MockRevocationStore;
    use crate::token::{TokenConfig, TokenError};
    use models::user::MaritalStatus;

    struct Fixture {
        users: Arc<MockUserRepository>,
        tokens: Arc<TokenService<MockRevocationStore>>,
        svc: MessageService<MockMessageRepository, MockUserRepository, MockRevocationStore>,
    }

    fn fixture() -> Fixture {
        let users = Arc::new(MockUserRepository::default());
        let tokens = Arc::new(TokenService::new(
            Arc::new(MockRevocationStore::default()),
            TokenConfig { secret: "test-secret".into(), ttl_secs: 3600 },
        ));
        let svc = MessageService::new(
            Arc::new(MockMessageRepository::default()),
            Arc::clone(&users),
            Arc::clone(&tokens),
        );
        Fixture { users, tokens, svc }
    }

    async fn add_user(fx: &Fixture, name: &str, email: &str) -> AuthUser {
        fx.users
            .insert(NewUser {
                name: name.into(),
                email: email.into(),
                password_hash: "$argon2id$fake".into(),
                address: "1 Test Lane".into(),
                gender: true,
                marital_status: MaritalStatus::Single,
            })
            .await
            .unwrap()
    }

    fn token_for(fx: &Fixture, user: &AuthUser) -> String {
        fx.tokens.issue(user.id).unwrap().token
    }

    fn send_input(receiver: &AuthUser, body: &str) -> SendMessageInput {
        SendMessageInput { receiver: Some(receiver.id.to_string()), body: Some(body.into()) }
    }

    #[tokio::test]
    async fn send_persists_with_caller_as_sender() {
        let fx = fixture();
        let alice = add_user(&fx, "Alice", "alice@example.com").await;
        let bob = add_user(&fx, "Bob", "bob@example.com").await;
        let token = token_for(&fx, &alice);

        let message = fx.svc.send(Some(&token), send_input(&bob, "Hello there!")).await.unwrap();
        assert_eq!(message.sender, alice.id);
        assert_eq!(message.receiver, bob.id);
        assert_eq!(message.body, "Hello there!");
    }

    #[tokio::test]
    async fn send_requires_valid_token() {
        let fx = fixture();
        let bob = add_user(&fx, "Bob", "bob@example.com").await;
        let err = fx.svc.send(None, send_input(&bob, "hi")).await.unwrap_err();
        assert!(matches!(err, MessageError::Token(TokenError::Missing)));
    }

    #[tokio::test]
    async fn send_validates_body_and_receiver() {
        let fx = fixture();
        let alice = add_user(&fx, "Alice", "alice@example.com").await;
        let token = token_for(&fx, &alice);

        let err = fx
            .svc
            .send(
                Some(&token),
                SendMessageInput { receiver: Some(Uuid::new_v4().to_string()), body: Some("".into()) },
            )
            .await
            .unwrap_err();
        let MessageError::Validation(errors) = err else { panic!("expected validation") };
        assert!(errors.contains("body"));
        assert!(errors.contains("receiver"));

        let err = fx
            .svc
            .send(
                Some(&token),
                SendMessageInput { receiver: Some("not-a-uuid".into()), body: Some("hi".into()) },
            )
            .await
            .unwrap_err();
        let MessageError::Validation(errors) = err else { panic!("expected validation") };
        assert!(errors.contains("receiver"));
    }

    #[tokio::test]
    async fn conversation_is_bidirectional_ordered_and_scoped() {
        let fx = fixture();
        let alice = add_user(&fx, "Alice", "alice@example.com").await;
        let bob = add_user(&fx, "Bob", "bob@example.com").await;
        let carol = add_user(&fx, "Carol", "carol@example.com").await;
        let alice_token = token_for(&fx, &alice);
        let bob_token = token_for(&fx, &bob);

        fx.svc.send(Some(&alice_token), send_input(&bob, "one")).await.unwrap();
        fx.svc.send(Some(&bob_token), send_input(&alice, "two")).await.unwrap();
        fx.svc.send(Some(&alice_token), send_input(&bob, "three")).await.unwrap();
        // Noise outside the pair
        fx.svc.send(Some(&alice_token), send_input(&carol, "other thread")).await.unwrap();

        let conversation = fx.svc.conversation(Some(&alice_token), bob.id).await.unwrap();
        let bodies: Vec<&str> = conversation.iter().map(|m| m.body.as_str()).collect();
        assert_eq!(bodies, ["one", "two", "three"]);
        let names: Vec<&str> = conversation.iter().map(|m| m.sender_name.as_str()).collect();
        assert_eq!(names, ["Alice", "Bob", "Alice"]);

        // Same thread seen from the other side
        let conversation = fx.svc.conversation(Some(&bob_token), alice.id).await.unwrap();
        assert_eq!(conversation.len(), 3);
    }

    #[tokio::test]
    async fn conversation_with_stranger_is_empty() {
        let fx = fixture();
        let alice = add_user(&fx, "Alice", "alice@example.com").await;
        let token = token_for(&fx, &alice);
        let conversation = fx.svc.conversation(Some(&token), Uuid::new_v4()).await.unwrap();
        assert!(conversation.is_empty());
    }

    #[tokio::test]
    async fn update_enforces_sender_ownership() {
        let fx = fixture();
        let alice = add_user(&fx, "Alice", "alice@example.com").await;
        let bob = add_user(&fx, "Bob", "bob@example.com").await;
        let alice_token = token_for(&fx, &alice);
        let bob_token = token_for(&fx, &bob);

        let message = fx.svc.send(Some(&alice_token), send_input(&bob, "hi")).await.unwrap();

        // The receiver may not mutate
        let err = fx
            .svc
            .update(
                Some(&bob_token),
                message.id,
                UpdateMessageInput { body: Some("hijacked".into()) },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, MessageError::Forbidden));

        // The sender may
        let updated = fx
            .svc
            .update(
                Some(&alice_token),
                message.id,
                UpdateMessageInput { body: Some("hello".into()) },
            )
            .await
            .unwrap();
        assert_eq!(updated.body, "hello");
        assert!(updated.updated_at >= message.updated_at);
    }

    #[tokio::test]
    async fn update_missing_message_is_not_found() {
        let fx = fixture();
        let alice = add_user(&fx, "Alice", "alice@example.com").await;
        let token = token_for(&fx, &alice);
        let err = fx
            .svc
            .update(Some(&token), Uuid::new_v4(), UpdateMessageInput { body: Some("x".into()) })
            .await
            .unwrap_err();
        assert!(matches!(err, MessageError::NotFound));
    }

    #[tokio::test]
    async fn update_rejects_empty_body_for_the_sender() {
        let fx = fixture();
        let alice = add_user(&fx, "Alice", "alice@example.com").await;
        let bob = add_user(&fx, "Bob", "bob@example.com").await;
        let token = token_for(&fx, &alice);
        let message = fx.svc.send(Some(&token), send_input(&bob, "hi")).await.unwrap();

        let err = fx
            .svc
            .update(Some(&token), message.id, UpdateMessageInput { body: Some("   ".into()) })
            .await
            .unwrap_err();
        let MessageError::Validation(errors) = err else { panic!("expected validation") };
        assert!(errors.contains("body"));
    }

    #[tokio::test]
    async fn delete_enforces_ownership_and_removes_from_conversation() {
        let fx = fixture();
        let alice = add_user(&fx, "Alice", "alice@example.com").await;
        let bob = add_user(&fx, "Bob", "bob@example.com").await;
        let alice_token = token_for(&fx, &alice);
        let bob_token = token_for(&fx, &bob);

        let message = fx.svc.send(Some(&alice_token), send_input(&bob, "hi")).await.unwrap();

        let err = fx.svc.delete(Some(&bob_token), message.id).await.unwrap_err();
        assert!(matches!(err, MessageError::Forbidden));

        fx.svc.delete(Some(&alice_token), message.id).await.unwrap();
        let conversation = fx.svc.conversation(Some(&alice_token), bob.id).await.unwrap();
        assert!(conversation.is_empty());

        // Gone means gone
        let err = fx.svc.delete(Some(&alice_token), message.id).await.unwrap_err();
        assert!(matches!(err, MessageError::NotFound));
    }

    #[tokio::test]
    async fn revoked_token_is_rejected_everywhere() {
        let fx = fixture();
        let alice = add_user(&fx, "Alice", "alice@example.com").await;
        let bob = add_user(&fx, "Bob", "bob@example.com").await;
        let token = token_for(&fx, &alice);

        fx.tokens.revoke(Some(&token)).await.unwrap();
        let err = fx.svc.send(Some(&token), send_input(&bob, "hi")).await.unwrap_err();
        assert!(matches!(err, MessageError::Token(TokenError::Revoked)));
        let err = fx.svc.conversation(Some(&token), bob.id).await.unwrap_err();
        assert!(matches!(err, MessageError::Token(TokenError::Revoked)));
    }
}
