//! Create grievance_reports table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(GrievanceReports::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(GrievanceReports::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(GrievanceReports::UserId).uuid().not_null())
                    .col(ColumnDef::new(GrievanceReports::Title).string_len(512).not_null())
                    .col(
                        ColumnDef::new(GrievanceReports::ComplaintCategory)
                            .string_len(128)
                            .not_null(),
                    )
                    .col(ColumnDef::new(GrievanceReports::Subcategory).string_len(128))
                    .col(ColumnDef::new(GrievanceReports::Description).text().not_null())
                    .col(ColumnDef::new(GrievanceReports::Location).string_len(512).not_null())
                    .col(
                        ColumnDef::new(GrievanceReports::EvidenceFiles)
                            .json_binary()
                            .not_null()
                            .default(Expr::cust("'[]'::jsonb")),
                    )
                    .col(
                        ColumnDef::new(GrievanceReports::PriorityLevel)
                            .string_len(16)
                            .not_null()
                            .default("medium"),
                    )
                    .col(
                        ColumnDef::new(GrievanceReports::Status)
                            .string_len(32)
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(GrievanceReports::AdminNotes).text())
                    .col(
                        ColumnDef::new(GrievanceReports::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(GrievanceReports::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: (user_id, created_at) for the per-user list
        manager
            .create_index(
                Index::create()
                    .name("idx_grievance_reports_user_created")
                    .table(GrievanceReports::Table)
                    .col(GrievanceReports::UserId)
                    .col(GrievanceReports::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_grievance_reports_status")
                    .table(GrievanceReports::Table)
                    .col(GrievanceReports::Status)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(GrievanceReports::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum GrievanceReports {
    Table,
    Id,
    UserId,
    Title,
    ComplaintCategory,
    Subcategory,
    Description,
    Location,
    EvidenceFiles,
    PriorityLevel,
    Status,
    AdminNotes,
    CreatedAt,
    UpdatedAt,
}
