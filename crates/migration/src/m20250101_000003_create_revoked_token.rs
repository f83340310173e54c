//! Create `revoked_token` table backing logout.
//!
//! Keyed by the token's jti claim; `expires_at` mirrors the token's own
//! expiry so purging can never resurrect a revoked token.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(RevokedToken::Table)
                    .if_not_exists()
                    .col(uuid(RevokedToken::Jti).primary_key())
                    .col(uuid(RevokedToken::UserId).not_null())
                    .col(timestamp_with_time_zone(RevokedToken::RevokedAt).not_null())
                    .col(timestamp_with_time_zone(RevokedToken::ExpiresAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_revoked_token_user")
                            .from(RevokedToken::Table, RevokedToken::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(RevokedToken::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum RevokedToken { Table, Jti, UserId, RevokedAt, ExpiresAt }

#[derive(DeriveIden)]
enum User { Table, Id }
