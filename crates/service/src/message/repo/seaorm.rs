use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use uuid::Uuid;

use crate::message::domain::MessageRecord;
use crate::message::errors::MessageError;
use crate::message::repository::MessageRepository;
use models::message;

pub struct SeaOrmMessageRepository {
    pub db: DatabaseConnection,
}

fn to_domain(m: message::Model) -> MessageRecord {
    MessageRecord {
        id: m.id,
        body: m.body,
        sender: m.sender,
        receiver: m.receiver,
        created_at: m.created_at,
        updated_at: m.updated_at,
    }
}

#[async_trait]
impl MessageRepository for SeaOrmMessageRepository {
    async fn insert(
        &self,
        sender: Uuid,
        receiver: Uuid,
        body: &str,
    ) -> Result<MessageRecord, MessageError> {
        let created = message::create(&self.db, sender, receiver, body)
            .await
            .map_err(|e| MessageError::Repository(e.to_string()))?;
        Ok(to_domain(created))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<MessageRecord>, MessageError> {
        let found = message::find_by_id(&self.db, id)
            .await
            .map_err(|e| MessageError::Repository(e.to_string()))?;
        Ok(found.map(to_domain))
    }

    async fn update_body(&self, id: Uuid, body: &str) -> Result<MessageRecord, MessageError> {
        let found = message::find_by_id(&self.db, id)
            .await
            .map_err(|e| MessageError::Repository(e.to_string()))?
            .ok_or(MessageError::NotFound)?;
        let mut am: message::ActiveModel = found.into();
        am.body = Set(body.to_string());
        am.updated_at = Set(Utc::now().into());
        let updated = am
            .update(&self.db)
            .await
            .map_err(|e| MessageError::Repository(e.to_string()))?;
        Ok(to_domain(updated))
    }

    async fn delete(&self, id: Uuid) -> Result<(), MessageError> {
        message::delete(&self.db, id)
            .await
            .map_err(|e| MessageError::Repository(e.to_string()))
    }

    async fn list_between(&self, a: Uuid, b: Uuid) -> Result<Vec<MessageRecord>, MessageError> {
        let rows = message::list_between(&self.db, a, b)
            .await
            .map_err(|e| MessageError::Repository(e.to_string()))?;
        Ok(rows.into_iter().map(to_domain).collect())
    }
}
