use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set, SqlErr};
use uuid::Uuid;

use crate::auth::domain::{AuthUser, NewUser, UserChanges};
use crate::auth::errors::AuthError;
use crate::auth::repository::UserRepository;
use models::errors::ModelError;
use models::user;

pub struct SeaOrmUserRepository {
    pub db: DatabaseConnection,
}

fn to_domain(m: user::Model) -> AuthUser {
    AuthUser {
        id: m.id,
        name: m.name,
        email: m.email,
        address: m.address,
        gender: m.gender,
        marital_status: m.marital_status,
        created_at: m.created_at,
        updated_at: m.updated_at,
    }
}

#[async_trait]
impl UserRepository for SeaOrmUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<AuthUser>, AuthError> {
        let found = user::find_by_id(&self.db, id)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))?;
        Ok(found.map(to_domain))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<AuthUser>, AuthError> {
        let found = user::find_by_email(&self.db, email)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))?;
        Ok(found.map(to_domain))
    }

    async fn password_hash(&self, user_id: Uuid) -> Result<Option<String>, AuthError> {
        let found = user::find_by_id(&self.db, user_id)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))?;
        Ok(found.map(|m| m.password_hash))
    }

    async fn email_in_use(&self, email: &str, exclude: Option<Uuid>) -> Result<bool, AuthError> {
        user::email_in_use(&self.db, email, exclude)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))
    }

    async fn insert(&self, new_user: NewUser) -> Result<AuthUser, AuthError> {
        let created = user::create(
            &self.db,
            &new_user.name,
            &new_user.email,
            &new_user.password_hash,
            &new_user.address,
            new_user.gender,
            new_user.marital_status,
        )
        .await
        .map_err(|e| match e {
            ModelError::Conflict(_) => AuthError::Conflict,
            other => AuthError::Repository(other.to_string()),
        })?;
        Ok(to_domain(created))
    }

    async fn update(&self, id: Uuid, changes: UserChanges) -> Result<AuthUser, AuthError> {
        let found = user::find_by_id(&self.db, id)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))?
            .ok_or(AuthError::UserNotFound)?;
        if changes.is_empty() {
            return Ok(to_domain(found));
        }
        let mut am: user::ActiveModel = found.into();
        if let Some(name) = changes.name {
            am.name = Set(name);
        }
        if let Some(email) = changes.email {
            am.email = Set(email);
        }
        if let Some(password_hash) = changes.password_hash {
            am.password_hash = Set(password_hash);
        }
        if let Some(address) = changes.address {
            am.address = Set(address);
        }
        if let Some(gender) = changes.gender {
            am.gender = Set(gender);
        }
        if let Some(marital_status) = changes.marital_status {
            am.marital_status = Set(marital_status);
        }
        am.updated_at = Set(Utc::now().into());
        let updated = am.update(&self.db).await.map_err(|e| match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => AuthError::Conflict,
            _ => AuthError::Repository(e.to_string()),
        })?;
        Ok(to_domain(updated))
    }
}
