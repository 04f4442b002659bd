//! Create suspicious_entities table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SuspiciousEntities::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SuspiciousEntities::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SuspiciousEntities::UserId).uuid().not_null())
                    .col(
                        ColumnDef::new(SuspiciousEntities::EntityType)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SuspiciousEntities::EntityValue)
                            .string_len(2048)
                            .not_null(),
                    )
                    .col(ColumnDef::new(SuspiciousEntities::Description).text().not_null())
                    .col(
                        ColumnDef::new(SuspiciousEntities::EvidenceFiles)
                            .json_binary()
                            .not_null()
                            .default(Expr::cust("'[]'::jsonb")),
                    )
                    .col(
                        ColumnDef::new(SuspiciousEntities::ThreatLevel)
                            .string_len(16)
                            .not_null()
                            .default("medium"),
                    )
                    .col(
                        ColumnDef::new(SuspiciousEntities::Status)
                            .string_len(32)
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(SuspiciousEntities::AdminNotes).text())
                    .col(
                        ColumnDef::new(SuspiciousEntities::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(SuspiciousEntities::UpdatedAt)
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
                    .name("idx_suspicious_entities_user_created")
                    .table(SuspiciousEntities::Table)
                    .col(SuspiciousEntities::UserId)
                    .col(SuspiciousEntities::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_suspicious_entities_status")
                    .table(SuspiciousEntities::Table)
                    .col(SuspiciousEntities::Status)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SuspiciousEntities::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum SuspiciousEntities {
    Table,
    Id,
    UserId,
    EntityType,
    EntityValue,
    Description,
    EvidenceFiles,
    ThreatLevel,
    Status,
    AdminNotes,
    CreatedAt,
    UpdatedAt,
}
