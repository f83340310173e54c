use std::sync::Arc;

use chrono::{DateTime, Duration, FixedOffset, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use super::errors::TokenError;
use super::store::RevocationStore;

/// Claim set signed into each bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Bound user id.
    pub sub: String,
    /// Unique token id used as the revocation key.
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Clone)]
pub struct TokenConfig {
    pub secret: String,
    pub ttl_secs: i64,
}

#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub jti: Uuid,
    pub expires_at: DateTime<FixedOffset>,
}

/// Issues, verifies and revokes bearer tokens against a revocation store.
pub struct TokenService<S: RevocationStore> {
    store: Arc<S>,
    cfg: TokenConfig,
}

impl<S: RevocationStore> TokenService<S> {
    pub fn new(store: Arc<S>, cfg: TokenConfig) -> Self {
        Self { store, cfg }
    }

    /// Issue a fresh token bound to `user_id`, expiring after the configured
    /// TTL. A user may hold any number of simultaneously valid tokens.
    pub fn issue(&self, user_id: Uuid) -> Result<IssuedToken, TokenError> {
        let now = Utc::now();
        let jti = Uuid::new_v4();
        let expires_at = now + Duration::seconds(self.cfg.ttl_secs);
        let claims = Claims {
            sub: user_id.to_string(),
            jti: jti.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.cfg.secret.as_bytes()),
        )
        .map_err(|e| TokenError::Creation(e.to_string()))?;
        debug!(user_id = %user_id, jti = %jti, "token_issued");
        Ok(IssuedToken { token, jti, expires_at: expires_at.fixed_offset() })
    }

    fn decode(&self, token: Option<&str>) -> Result<Claims, TokenError> {
        let raw = match token {
            Some(t) if !t.trim().is_empty() => t,
            _ => return Err(TokenError::Missing),
        };
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        let data = decode::<Claims>(
            raw,
            &DecodingKey::from_secret(self.cfg.secret.as_bytes()),
            &validation,
        )
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Malformed,
        })?;
        Ok(data.claims)
    }

    /// Resolve the caller behind a bearer token.
    ///
    /// Revocation is checked on every call, not just at issuance, so a
    /// logged-out token fails here immediately.
    pub async fn verify(&self, token: Option<&str>) -> Result<Uuid, TokenError> {
        let claims = self.decode(token)?;
        let jti = Uuid::parse_str(&claims.jti).map_err(|_| TokenError::Malformed)?;
        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| TokenError::Malformed)?;
        if self.store.contains(jti).await? {
            return Err(TokenError::Revoked);
        }
        Ok(user_id)
    }

    /// Revoke a token. The token must still be valid; revoking an already
    /// revoked or expired token fails with the matching verify-style error.
    ///
    /// The marker is inserted idempotently and keeps the token's own expiry,
    /// so purging can never let a revoked token resurface within its TTL.
    #[instrument(skip(self, token))]
    pub async fn revoke(&self, token: Option<&str>) -> Result<(), TokenError> {
        let claims = self.decode(token)?;
        let jti = Uuid::parse_str(&claims.jti).map_err(|_| TokenError::Malformed)?;
        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| TokenError::Malformed)?;
        if self.store.contains(jti).await? {
            return Err(TokenError::Revoked);
        }
        let expires_at = DateTime::from_timestamp(claims.exp, 0)
            .ok_or(TokenError::Malformed)?
            .fixed_offset();
        self.store
            .insert(jti, user_id, Utc::now().fixed_offset(), expires_at)
            .await?;
        info!(user_id = %user_id, jti = %jti, "token_revoked");
        // Housekeeping; the revocation itself is already durable
        if let Err(e) = self.store.purge_expired(Utc::now().fixed_offset()).await {
            debug!(error = %e, "revocation purge failed");
        }
        Ok(())
    }
}
