//! Create ai_chat_history table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AiChatHistory::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(AiChatHistory::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(AiChatHistory::UserId).uuid().not_null())
                    .col(ColumnDef::new(AiChatHistory::Question).text().not_null())
                    .col(ColumnDef::new(AiChatHistory::Response).text().not_null())
                    .col(
                        ColumnDef::new(AiChatHistory::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_ai_chat_history_user_created")
                    .table(AiChatHistory::Table)
                    .col(AiChatHistory::UserId)
                    .col(AiChatHistory::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AiChatHistory::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum AiChatHistory {
    Table,
    Id,
    UserId,
    Question,
    Response,
    CreatedAt,
}
