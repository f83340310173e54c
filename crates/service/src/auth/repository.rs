use async_trait::async_trait;
use uuid::Uuid;

use super::domain::{AuthUser, NewUser, UserChanges};
use super::errors::AuthError;

/// Repository abstraction for user persistence.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<AuthUser>, AuthError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<AuthUser>, AuthError>;

    /// Stored password hash for a user, if any.
    async fn password_hash(&self, user_id: Uuid) -> Result<Option<String>, AuthError>;

    /// True when `email` is held by a row other than `exclude`.
    async fn email_in_use(&self, email: &str, exclude: Option<Uuid>) -> Result<bool, AuthError>;

    /// Fails with [`AuthError::Conflict`] when the unique email constraint trips.
    async fn insert(&self, user: NewUser) -> Result<AuthUser, AuthError>;

    /// Persists only the supplied fields; refreshes `updated_at` when any
    /// field actually changes.
    async fn update(&self, id: Uuid, changes: UserChanges) -> Result<AuthUser, AuthError>;
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use chrono::Utc;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct MockUserRepository {
        users: Mutex<HashMap<Uuid, (AuthUser, String)>>, // id -> (user, password_hash)
    }

    #[async_trait]
    impl UserRepository for MockUserRepository {
        async fn find_by_id(&self, id: Uuid) -> Result<Option<AuthUser>, AuthError> {
            let users = self.users.lock().unwrap();
            Ok(users.get(&id).map(|(u, _)| u.clone()))
        }

        async fn find_by_email(&self, email: &str) -> Result<Option<AuthUser>, AuthError> {
            let users = self.users.lock().unwrap();
            Ok(users.values().find(|(u, _)| u.email == email).map(|(u, _)| u.clone()))
        }

        async fn password_hash(&self, user_id: Uuid) -> Result<Option<String>, AuthError> {
            let users = self.users.lock().unwrap();
            Ok(users.get(&user_id).map(|(_, hash)| hash.clone()))
        }

        async fn email_in_use(&self, email: &str, exclude: Option<Uuid>) -> Result<bool, AuthError> {
            let users = self.users.lock().unwrap();
            Ok(users
                .values()
                .any(|(u, _)| u.email == email && Some(u.id) != exclude))
        }

        async fn insert(&self, user: NewUser) -> Result<AuthUser, AuthError> {
            let mut users = self.users.lock().unwrap();
            if users.values().any(|(u, _)| u.email == user.email) {
                return Err(AuthError::Conflict);
            }
            let now = Utc::now().fixed_offset();
            let created = AuthUser {
                id: Uuid::new_v4(),
                name: user.name,
                email: user.email,
                address: user.address,
                gender: user.gender,
                marital_status: user.marital_status,
                created_at: now,
                updated_at: now,
            };
            users.insert(created.id, (created.clone(), user.password_hash));
            Ok(created)
        }

        async fn update(&self, id: Uuid, changes: UserChanges) -> Result<AuthUser, AuthError> {
            let mut users = self.users.lock().unwrap();
            if let Some(email) = &changes.email {
                if users.values().any(|(u, _)| u.email == *email && u.id != id) {
                    return Err(AuthError::Conflict);
                }
            }
            let (user, hash) = users.get_mut(&id).ok_or(AuthError::UserNotFound)?;
            if changes.is_empty() {
                return Ok(user.clone());
            }
            if let Some(name) = changes.name {
                user.name = name;
            }
            if let Some(email) = changes.email {
                user.email = email;
            }
            if let Some(password_hash) = changes.password_hash {
                *hash = password_hash;
            }
            if let Some(address) = changes.address {
                user.address = address;
            }
            if let Some(gender) = changes.gender {
                user.gender = gender;
            }
            if let Some(marital_status) = changes.marital_status {
                user.marital_status = marital_status;
            }
            user.updated_at = Utc::now().fixed_offset();
            Ok(user.clone())
        }
    }
}
