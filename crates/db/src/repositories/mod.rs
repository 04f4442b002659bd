//! Database repositories.

mod chat_history;
mod grievance_report;
mod profile;
mod suspicious_entity;
mod user_role;

pub use chat_history::ChatHistoryRepository;
pub use grievance_report::GrievanceReportRepository;
pub use profile::ProfileRepository;
pub use suspicious_entity::SuspiciousEntityRepository;
pub use user_role::UserRoleRepository;
