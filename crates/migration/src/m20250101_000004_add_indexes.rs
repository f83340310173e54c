use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Message: conversation scans filter on both endpoints
        manager
            .create_index(
                Index::create()
                    .name("idx_message_sender")
                    .table(Message::Table)
                    .col(Message::Sender)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_message_receiver")
                    .table(Message::Table)
                    .col(Message::Receiver)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_message_created_at")
                    .table(Message::Table)
                    .col(Message::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // RevokedToken: purge filters on expiry
        manager
            .create_index(
                Index::create()
                    .name("idx_revoked_token_expires_at")
                    .table(RevokedToken::Table)
                    .col(RevokedToken::ExpiresAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_message_sender").table(Message::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_message_receiver").table(Message::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_message_created_at").table(Message::Table).to_owned())
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx_revoked_token_expires_at")
                    .table(RevokedToken::Table)
                    .to_owned(),
            )
            .await
    }
}

#[derive(DeriveIden)]
enum Message { Table, Sender, Receiver, CreatedAt }

#[derive(DeriveIden)]
enum RevokedToken { Table, ExpiresAt }
