use chrono::Utc;
use sea_orm::sea_query::StringLen;
use sea_orm::{entity::prelude::*, DatabaseConnection, QuerySelect, Set, SqlErr};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ModelError;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub address: String,
    pub gender: bool,
    pub marital_status: MaritalStatus,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

/// Marital status values accepted by registration and profile updates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum MaritalStatus {
    #[sea_orm(string_value = "single")]
    Single,
    #[sea_orm(string_value = "married")]
    Married,
    #[sea_orm(string_value = "divorced")]
    Divorced,
    #[sea_orm(string_value = "widowed")]
    Widowed,
}

impl MaritalStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "single" => Some(Self::Single),
            "married" => Some(Self::Married),
            "divorced" => Some(Self::Divorced),
            "widowed" => Some(Self::Widowed),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Married => "married",
            Self::Divorced => "divorced",
            Self::Widowed => "widowed",
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match *self {}
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub async fn create(
    db: &DatabaseConnection,
    name: &str,
    email: &str,
    password_hash: &str,
    address: &str,
    gender: bool,
    marital_status: MaritalStatus,
) -> Result<Model, ModelError> {
    if name.trim().is_empty() {
        return Err(ModelError::Validation("name required".into()));
    }
    if !email.contains('@') {
        return Err(ModelError::Validation("invalid email".into()));
    }
    if password_hash.trim().is_empty() {
        return Err(ModelError::Validation("password hash required".into()));
    }
    let now = Utc::now().into();
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        email: Set(email.to_string()),
        password_hash: Set(password_hash.to_string()),
        address: Set(address.to_string()),
        gender: Set(gender),
        marital_status: Set(marital_status),
        created_at: Set(now),
        updated_at: Set(now),
    };
    am.insert(db).await.map_err(|e| match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => ModelError::Conflict("email already taken".into()),
        _ => ModelError::Db(e.to_string()),
    })
}

pub async fn find_by_id(db: &DatabaseConnection, id: Uuid) -> Result<Option<Model>, ModelError> {
    Entity::find_by_id(id).one(db).await.map_err(|e| ModelError::Db(e.to_string()))
}

pub async fn find_by_email(db: &DatabaseConnection, email: &str) -> Result<Option<Model>, ModelError> {
    Entity::find()
        .filter(Column::Email.eq(email))
        .one(db)
        .await
        .map_err(|e| ModelError::Db(e.to_string()))
}

/// True when another row (excluding `exclude`, if given) already holds `email`.
pub async fn email_in_use(
    db: &DatabaseConnection,
    email: &str,
    exclude: Option<Uuid>,
) -> Result<bool, ModelError> {
    let mut query = Entity::find().filter(Column::Email.eq(email));
    if let Some(id) = exclude {
        query = query.filter(Column::Id.ne(id));
    }
    let found = query
        .limit(1)
        .one(db)
        .await
        .map_err(|e| ModelError::Db(e.to_string()))?;
    Ok(found.is_some())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marital_status_round_trip() {
        for s in ["single", "married", "divorced", "widowed"] {
            assert_eq!(MaritalStatus::parse(s).unwrap().as_str(), s);
        }
        assert!(MaritalStatus::parse("complicated").is_none());
    }
}
