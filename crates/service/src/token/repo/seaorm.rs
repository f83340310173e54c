use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::token::errors::TokenError;
use crate::token::store::RevocationStore;

pub struct SeaOrmRevocationStore {
    pub db: DatabaseConnection,
}

#[async_trait]
impl RevocationStore for SeaOrmRevocationStore {
    async fn insert(
        &self,
        jti: Uuid,
        user_id: Uuid,
        revoked_at: DateTime<FixedOffset>,
        expires_at: DateTime<FixedOffset>,
    ) -> Result<(), TokenError> {
        models::revoked_token::insert_ignore(&self.db, jti, user_id, revoked_at, expires_at)
            .await
            .map_err(|e| TokenError::Store(e.to_string()))
    }

    async fn contains(&self, jti: Uuid) -> Result<bool, TokenError> {
        models::revoked_token::contains(&self.db, jti)
            .await
            .map_err(|e| TokenError::Store(e.to_string()))
    }

    async fn purge_expired(&self, now: DateTime<FixedOffset>) -> Result<u64, TokenError> {
        models::revoked_token::purge_expired(&self.db, now)
            .await
            .map_err(|e| TokenError::Store(e.to_string()))
    }
}
