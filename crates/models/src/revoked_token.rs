use sea_orm::sea_query::OnConflict;
use sea_orm::{entity::prelude::*, DatabaseConnection, DbErr, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ModelError;
use crate::user;

/// Revocation marker for a bearer token. Rows are kept until the token's own
/// expiry has passed, so a revoked token can never be presented successfully
/// again within its natural lifetime.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "revoked_token")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub jti: Uuid,
    pub user_id: Uuid,
    pub revoked_at: DateTimeWithTimeZone,
    pub expires_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    User,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::User => Entity::belongs_to(user::Entity)
                .from(Column::UserId)
                .to(user::Column::Id)
                .into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Idempotent insert: concurrent revokers of the same token all succeed.
pub async fn insert_ignore(
    db: &DatabaseConnection,
    jti: Uuid,
    user_id: Uuid,
    revoked_at: DateTimeWithTimeZone,
    expires_at: DateTimeWithTimeZone,
) -> Result<(), ModelError> {
    let am = ActiveModel {
        jti: Set(jti),
        user_id: Set(user_id),
        revoked_at: Set(revoked_at),
        expires_at: Set(expires_at),
    };
    match Entity::insert(am)
        .on_conflict(OnConflict::column(Column::Jti).do_nothing().to_owned())
        .exec(db)
        .await
    {
        Ok(_) => Ok(()),
        // DO NOTHING inserted zero rows: the marker already exists
        Err(DbErr::RecordNotInserted) => Ok(()),
        Err(e) => Err(ModelError::Db(e.to_string())),
    }
}

pub async fn contains(db: &DatabaseConnection, jti: Uuid) -> Result<bool, ModelError> {
    let found = Entity::find_by_id(jti)
        .one(db)
        .await
        .map_err(|e| ModelError::Db(e.to_string()))?;
    Ok(found.is_some())
}

/// Drop markers whose tokens have expired on their own; returns rows removed.
pub async fn purge_expired(
    db: &DatabaseConnection,
    now: DateTimeWithTimeZone,
) -> Result<u64, ModelError> {
    let res = Entity::delete_many()
        .filter(Column::ExpiresAt.lt(now))
        .exec(db)
        .await
        .map_err(|e| ModelError::Db(e.to_string()))?;
    Ok(res.rows_affected)
}
