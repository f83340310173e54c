use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use uuid::Uuid;

use super::errors::TokenError;

/// Durable set of revoked token identifiers.
///
/// Entries must survive at least until `expires_at`, at which point the token
/// is dead on its own and the marker may be purged.
#[async_trait]
pub trait RevocationStore: Send + Sync {
    /// Record `jti` as revoked. Idempotent under concurrent revokers.
    async fn insert(
        &self,
        jti: Uuid,
        user_id: Uuid,
        revoked_at: DateTime<FixedOffset>,
        expires_at: DateTime<FixedOffset>,
    ) -> Result<(), TokenError>;

    async fn contains(&self, jti: Uuid) -> Result<bool, TokenError>;

    /// Drop markers for tokens that have expired on their own; returns the
    /// number of markers removed.
    async fn purge_expired(&self, now: DateTime<FixedOffset>) -> Result<u64, TokenError>;
}

/// Simple in-memory store for tests and doc examples.
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct MockRevocationStore {
        revoked: Mutex<HashMap<Uuid, DateTime<FixedOffset>>>, // jti -> expires_at
    }

    #[async_trait]
    impl RevocationStore for MockRevocationStore {
        async fn insert(
            &self,
            jti: Uuid,
            _user_id: Uuid,
            _revoked_at: DateTime<FixedOffset>,
            expires_at: DateTime<FixedOffset>,
        ) -> Result<(), TokenError> {
            self.revoked.lock().unwrap().insert(jti, expires_at);
            Ok(())
        }

        async fn contains(&self, jti: Uuid) -> Result<bool, TokenError> {
            Ok(self.revoked.lock().unwrap().contains_key(&jti))
        }

        async fn purge_expired(&self, now: DateTime<FixedOffset>) -> Result<u64, TokenError> {
            let mut revoked = self.revoked.lock().unwrap();
            let before = revoked.len();
            revoked.retain(|_, expires_at| *expires_at >= now);
            Ok((before - revoked.len()) as u64)
        }
    }
}
