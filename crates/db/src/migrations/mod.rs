//! Database migrations.
//!
//! Schema migrations for the portal tables.

#![allow(missing_docs)]

use sea_orm_migration::prelude::*;

mod m20250601_000001_create_profiles_table;
mod m20250601_000002_create_user_roles_table;
mod m20250601_000003_create_grievance_reports_table;
mod m20250601_000004_create_suspicious_entities_table;
mod m20250601_000005_create_ai_chat_history_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250601_000001_create_profiles_table::Migration),
            Box::new(m20250601_000002_create_user_roles_table::Migration),
            Box::new(m20250601_000003_create_grievance_reports_table::Migration),
            Box::new(m20250601_000004_create_suspicious_entities_table::Migration),
            Box::new(m20250601_000005_create_ai_chat_history_table::Migration),
        ]
    }
}
