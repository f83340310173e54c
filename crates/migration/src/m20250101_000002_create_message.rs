//! Create `message` table with sender/receiver FKs to `user`.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Message::Table)
                    .if_not_exists()
                    .col(uuid(Message::Id).primary_key())
                    .col(text(Message::Body).not_null())
                    .col(uuid(Message::Sender).not_null())
                    .col(uuid(Message::Receiver).not_null())
                    .col(timestamp_with_time_zone(Message::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Message::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_message_sender")
                            .from(Message::Table, Message::Sender)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_message_receiver")
                            .from(Message::Table, Message::Receiver)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Message::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Message { Table, Id, Body, Sender, Receiver, CreatedAt, UpdatedAt }

#[derive(DeriveIden)]
enum User { Table, Id }
