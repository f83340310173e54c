use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use models::user::MaritalStatus;

/// Registration input as it arrives off the wire. Fields stay optional so
/// validation can report missing values instead of failing deserialization.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterInput {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub password_confirmation: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    /// Accepts bool, 0/1 or true/false word forms.
    #[serde(default)]
    pub gender: Option<serde_json::Value>,
    #[serde(default)]
    pub marital_status: Option<String>,
}

/// Login input
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginInput {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Partial profile update; absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProfileInput {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub password_confirmation: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub gender: Option<serde_json::Value>,
    #[serde(default)]
    pub marital_status: Option<String>,
}

/// Domain user (business view); the password hash never leaves the repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub address: String,
    pub gender: bool,
    pub marital_status: MaritalStatus,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: DateTime<FixedOffset>,
}

/// Validated insert payload; the password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub address: String,
    pub gender: bool,
    pub marital_status: MaritalStatus,
}

/// Validated partial update; `None` fields are not persisted.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub address: Option<String>,
    pub gender: Option<bool>,
    pub marital_status: Option<MaritalStatus>,
}

impl UserChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.password_hash.is_none()
            && self.address.is_none()
            && self.gender.is_none()
            && self.marital_status.is_none()
    }
}

/// Login/registration result.
#[derive(Debug, Clone, Serialize)]
pub struct AuthSession {
    pub user: AuthUser,
    pub token: String,
}
