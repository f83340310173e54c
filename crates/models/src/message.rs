use chrono::Utc;
use sea_orm::{entity::prelude::*, Condition, DatabaseConnection, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ModelError;
use crate::user;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "message")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(column_type = "Text")]
    pub body: String,
    pub sender: Uuid,
    pub receiver: Uuid,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Sender,
    Receiver,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Sender => Entity::belongs_to(user::Entity)
                .from(Column::Sender)
                .to(user::Column::Id)
                .into(),
            Relation::Receiver => Entity::belongs_to(user::Entity)
                .from(Column::Receiver)
                .to(user::Column::Id)
                .into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub async fn create(
    db: &DatabaseConnection,
    sender: Uuid,
    receiver: Uuid,
    body: &str,
) -> Result<Model, ModelError> {
    if body.trim().is_empty() {
        return Err(ModelError::Validation("body required".into()));
    }
    let now = Utc::now().into();
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        body: Set(body.to_string()),
        sender: Set(sender),
        receiver: Set(receiver),
        created_at: Set(now),
        updated_at: Set(now),
    };
    am.insert(db).await.map_err(|e| ModelError::Db(e.to_string()))
}

pub async fn find_by_id(db: &DatabaseConnection, id: Uuid) -> Result<Option<Model>, ModelError> {
    Entity::find_by_id(id).one(db).await.map_err(|e| ModelError::Db(e.to_string()))
}

pub async fn delete(db: &DatabaseConnection, id: Uuid) -> Result<(), ModelError> {
    Entity::delete_by_id(id)
        .exec(db)
        .await
        .map_err(|e| ModelError::Db(e.to_string()))?;
    Ok(())
}

/// Every message exchanged between `a` and `b`, oldest first.
pub async fn list_between(
    db: &DatabaseConnection,
    a: Uuid,
    b: Uuid,
) -> Result<Vec<Model>, ModelError> {
    Entity::find()
        .filter(
            Condition::any()
                .add(Condition::all().add(Column::Sender.eq(a)).add(Column::Receiver.eq(b)))
                .add(Condition::all().add(Column::Sender.eq(b)).add(Column::Receiver.eq(a))),
        )
        .order_by_asc(Column::CreatedAt)
        .all(db)
        .await
        .map_err(|e| ModelError::Db(e.to_string()))
}
