//! Business logic services.

#![allow(missing_docs)]

pub mod admin;
pub mod assistant;
pub mod auth;
pub mod chat;
pub mod events;
pub mod evidence;
pub mod identity;
pub mod profile;
pub mod report;
pub mod unified_report;

pub use admin::{
    AdminService, AdminStats, MonthlyCount, UpdateReportInput, UserSummary, compute_stats,
};
pub use assistant::{Assistant, AssistantService, CannedAssistant, ProcessAssistant};
pub use auth::{AuthService, SendOtpInput, SignInInput, SignUpInput, VerifyOtpInput};
pub use chat::{ChatInput, ChatService};
pub use events::{ChangeAction, ReportChange, ReportEvents};
pub use evidence::{EvidenceService, FileUpload};
pub use identity::{
    AuthSession, GoTrueClient, IdentityProvider, IdentityProviderService, IdentityUser,
    SignUpRequest,
};
pub use profile::{ProfileService, UpdateProfileInput};
pub use report::{CreateGrievanceInput, CreateSuspiciousInput, ReportService};
pub use unified_report::{AdminReport, ReportKind, ReporterProfile, UnifiedReport};
