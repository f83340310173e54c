use async_trait::async_trait;
use uuid::Uuid;

use super::domain::MessageRecord;
use super::errors::MessageError;

/// Repository abstraction for message persistence.
#[async_trait]
pub trait MessageRepository: Send + Sync {
    async fn insert(
        &self,
        sender: Uuid,
        receiver: Uuid,
        body: &str,
    ) -> Result<MessageRecord, MessageError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<MessageRecord>, MessageError>;

    /// Body-only mutation; refreshes `updated_at`.
    async fn update_body(&self, id: Uuid, body: &str) -> Result<MessageRecord, MessageError>;

    async fn delete(&self, id: Uuid) -> Result<(), MessageError>;

    /// Every message between `a` and `b` in either direction, oldest first.
    async fn list_between(&self, a: Uuid, b: Uuid) -> Result<Vec<MessageRecord>, MessageError>;
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use chrono::Utc;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct MockMessageRepository {
        messages: Mutex<Vec<MessageRecord>>, // insertion order preserved
    }

    #[async_trait]
    impl MessageRepository for MockMessageRepository {
        async fn insert(
            &self,
            sender: Uuid,
            receiver: Uuid,
            body: &str,
        ) -> Result<MessageRecord, MessageError> {
            let now = Utc::now().fixed_offset();
            let record = MessageRecord {
                id: Uuid::new_v4(),
                body: body.to_string(),
                sender,
                receiver,
                created_at: now,
                updated_at: now,
            };
            self.messages.lock().unwrap().push(record.clone());
            Ok(record)
        }

        async fn find_by_id(&self, id: Uuid) -> Result<Option<MessageRecord>, MessageError> {
            let messages = self.messages.lock().unwrap();
            Ok(messages.iter().find(|m| m.id == id).cloned())
        }

        async fn update_body(&self, id: Uuid, body: &str) -> Result<MessageRecord, MessageError> {
            let mut messages = self.messages.lock().unwrap();
            let record = messages
                .iter_mut()
                .find(|m| m.id == id)
                .ok_or(MessageError::NotFound)?;
            record.body = body.to_string();
            record.updated_at = Utc::now().fixed_offset();
            Ok(record.clone())
        }

        async fn delete(&self, id: Uuid) -> Result<(), MessageError> {
            let mut messages = self.messages.lock().unwrap();
            let before = messages.len();
            messages.retain(|m| m.id != id);
            if messages.len() == before {
                return Err(MessageError::NotFound);
            }
            Ok(())
        }

        async fn list_between(&self, a: Uuid, b: Uuid) -> Result<Vec<MessageRecord>, MessageError> {
            let messages = self.messages.lock().unwrap();
            let mut result: Vec<MessageRecord> = messages
                .iter()
                .filter(|m| {
                    (m.sender == a && m.receiver == b) || (m.sender == b && m.receiver == a)
                })
                .cloned()
                .collect();
            // Stable sort keeps insertion order for equal timestamps
            result.sort_by_key(|m| m.created_at);
            Ok(result)
        }
    }
}
