//! Database entities.

#![allow(missing_docs)]

pub mod ai_chat_history;
pub mod grievance_report;
pub mod profile;
pub mod report_status;
pub mod suspicious_entity;
pub mod user_role;

pub use ai_chat_history::Entity as AiChatHistory;
pub use grievance_report::Entity as GrievanceReport;
pub use profile::Entity as Profile;
pub use report_status::{ReportStatus, Severity};
pub use suspicious_entity::Entity as SuspiciousEntity;
pub use user_role::{AppRole, Entity as UserRole};
