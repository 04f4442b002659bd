//! Report submission and listing.

use std::collections::HashMap;

use chrono::Utc;
use cybersecure_common::{AppError, AppResult, IdGenerator};
use cybersecure_db::{
    entities::{
        ReportStatus, Severity, grievance_report, report_status::evidence_paths,
        suspicious_entity,
    },
    repositories::{GrievanceReportRepository, ProfileRepository, SuspiciousEntityRepository},
};
use sea_orm::{IntoActiveModel, Set};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use super::{
    events::{ChangeAction, ReportChange, ReportEvents},
    unified_report::{AdminReport, ReportKind, ReporterProfile, UnifiedReport, merge_newest_first},
};

/// Input for filing a grievance report.
///
/// Required fields are optional here so a missing one produces the
/// domain message instead of a deserialization error.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CreateGrievanceInput {
    #[validate(length(max = 512))]
    pub title: Option<String>,
    #[validate(length(max = 128))]
    pub complaint_category: Option<String>,
    #[validate(length(max = 128))]
    pub subcategory: Option<String>,
    #[validate(length(max = 20000))]
    pub description: Option<String>,
    #[validate(length(max = 512))]
    pub location: Option<String>,
    pub evidence_files: Option<Vec<String>>,
    pub priority_level: Option<String>,
}

/// Input for filing a suspicious-entity report.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CreateSuspiciousInput {
    #[validate(length(max = 64))]
    pub entity_type: Option<String>,
    #[validate(length(max = 2048))]
    pub entity_value: Option<String>,
    #[validate(length(max = 20000))]
    pub description: Option<String>,
    pub evidence_files: Option<Vec<String>>,
    pub threat_level: Option<String>,
}

/// Report service.
#[derive(Clone)]
pub struct ReportService {
    grievance_repo: GrievanceReportRepository,
    suspicious_repo: SuspiciousEntityRepository,
    profile_repo: ProfileRepository,
    events: ReportEvents,
    id_gen: IdGenerator,
}

/// A present, non-blank field.
fn required(value: Option<&String>) -> Option<&str> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty())
}

/// Parse an optional severity, defaulting to medium.
fn parse_severity(value: Option<&str>) -> AppResult<Severity> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(Severity::default()),
        Some(v) => v.parse().map_err(AppError::BadRequest),
    }
}

impl ReportService {
    /// Create a new report service.
    #[must_use]
    pub const fn new(
        grievance_repo: GrievanceReportRepository,
        suspicious_repo: SuspiciousEntityRepository,
        profile_repo: ProfileRepository,
        events: ReportEvents,
    ) -> Self {
        Self {
            grievance_repo,
            suspicious_repo,
            profile_repo,
            events,
            id_gen: IdGenerator::new(),
        }
    }

    /// The change feed reports are announced on.
    #[must_use]
    pub const fn events(&self) -> &ReportEvents {
        &self.events
    }

    /// File a grievance report.
    pub async fn create_grievance(
        &self,
        user_id: Uuid,
        input: CreateGrievanceInput,
    ) -> AppResult<grievance_report::Model> {
        input.validate()?;

        let (Some(title), Some(category), Some(description), Some(location)) = (
            required(input.title.as_ref()),
            required(input.complaint_category.as_ref()),
            required(input.description.as_ref()),
            required(input.location.as_ref()),
        ) else {
            return Err(AppError::BadRequest(
                "Title, complaint category, description, and location are required".to_string(),
            ));
        };
        let priority = parse_severity(input.priority_level.as_deref())?;

        let now = Utc::now();
        let model = grievance_report::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(user_id),
            title: Set(title.to_string()),
            complaint_category: Set(category.to_string()),
            subcategory: Set(input.subcategory.filter(|s| !s.trim().is_empty())),
            description: Set(description.to_string()),
            location: Set(location.to_string()),
            evidence_files: Set(serde_json::json!(input.evidence_files.unwrap_or_default())),
            priority_level: Set(priority),
            status: Set(ReportStatus::Pending),
            admin_notes: Set(None),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        let report = self.grievance_repo.create(model).await?;
        tracing::info!(user_id = %user_id, report_id = %report.id, kind = "grievance", "Report created");
        self.announce(ReportKind::Grievance, report.id, user_id, ChangeAction::Created);
        Ok(report)
    }

    /// File a suspicious-entity report.
    pub async fn create_suspicious(
        &self,
        user_id: Uuid,
        input: CreateSuspiciousInput,
    ) -> AppResult<suspicious_entity::Model> {
        input.validate()?;

        let (Some(entity_type), Some(entity_value), Some(description)) = (
            required(input.entity_type.as_ref()),
            required(input.entity_value.as_ref()),
            required(input.description.as_ref()),
        ) else {
            return Err(AppError::BadRequest(
                "Entity type, entity value, and description are required".to_string(),
            ));
        };
        let threat = parse_severity(input.threat_level.as_deref())?;

        let now = Utc::now();
        let model = suspicious_entity::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(user_id),
            entity_type: Set(entity_type.to_string()),
            entity_value: Set(entity_value.to_string()),
            description: Set(description.to_string()),
            evidence_files: Set(serde_json::json!(input.evidence_files.unwrap_or_default())),
            threat_level: Set(threat),
            status: Set(ReportStatus::Pending),
            admin_notes: Set(None),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        let report = self.suspicious_repo.create(model).await?;
        tracing::info!(user_id = %user_id, report_id = %report.id, kind = "suspicious", "Report created");
        self.announce(ReportKind::Suspicious, report.id, user_id, ChangeAction::Created);
        Ok(report)
    }

    /// A user's grievance reports, newest first.
    pub async fn list_grievances(&self, user_id: Uuid) -> AppResult<Vec<grievance_report::Model>> {
        self.grievance_repo.find_by_user(user_id).await
    }

    /// A user's suspicious-entity reports, newest first.
    pub async fn list_suspicious(
        &self,
        user_id: Uuid,
    ) -> AppResult<Vec<suspicious_entity::Model>> {
        self.suspicious_repo.find_by_user(user_id).await
    }

    /// Both kinds of a user's reports in the unified shape.
    pub async fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<UnifiedReport>> {
        let grievances = self.grievance_repo.find_by_user(user_id).await?;
        let suspicious = self.suspicious_repo.find_by_user(user_id).await?;
        Ok(merge_newest_first(grievances, suspicious))
    }

    /// Every report of every user in the unified shape.
    pub async fn list_all(&self) -> AppResult<Vec<UnifiedReport>> {
        let grievances = self.grievance_repo.find_all().await?;
        let suspicious = self.suspicious_repo.find_all().await?;
        Ok(merge_newest_first(grievances, suspicious))
    }

    /// Every report joined with its reporter's profile.
    ///
    /// Reports whose owner has no profile are left out.
    pub async fn list_all_with_profiles(&self) -> AppResult<Vec<AdminReport>> {
        let reports = self.list_all().await?;

        let mut user_ids: Vec<Uuid> = reports.iter().map(|r| r.user_id).collect();
        user_ids.sort_unstable();
        user_ids.dedup();

        let profiles: HashMap<Uuid, ReporterProfile> = self
            .profile_repo
            .find_by_user_ids(&user_ids)
            .await?
            .iter()
            .map(|p| (p.user_id, ReporterProfile::from(p)))
            .collect();

        Ok(reports
            .into_iter()
            .filter_map(|report| {
                let user_profile = profiles.get(&report.user_id)?.clone();
                Some(AdminReport {
                    report,
                    user_profile,
                })
            })
            .collect())
    }

    /// Fetch one report in the unified shape.
    pub async fn get(&self, kind: ReportKind, id: Uuid) -> AppResult<UnifiedReport> {
        Ok(match kind {
            ReportKind::Grievance => self.grievance_repo.get_by_id(id).await?.into(),
            ReportKind::Suspicious => self.suspicious_repo.get_by_id(id).await?.into(),
        })
    }

    /// Fetch one report, requiring that `user_id` owns it.
    ///
    /// Reports of other users look the same as missing ones.
    pub async fn get_owned(
        &self,
        kind: ReportKind,
        id: Uuid,
        user_id: Uuid,
    ) -> AppResult<UnifiedReport> {
        match self.get(kind, id).await {
            Ok(report) if report.user_id == user_id => Ok(report),
            Ok(_) | Err(AppError::NotFound(_)) => {
                Err(AppError::NotFound("Report not found".to_string()))
            }
            Err(e) => Err(e),
        }
    }

    /// Append storage paths to a report's evidence list.
    pub async fn append_evidence(
        &self,
        kind: ReportKind,
        id: Uuid,
        paths: &[String],
    ) -> AppResult<UnifiedReport> {
        let now = Utc::now();
        let report: UnifiedReport = match kind {
            ReportKind::Grievance => {
                let existing = self.grievance_repo.get_by_id(id).await?;
                let mut files = evidence_paths(&existing.evidence_files);
                files.extend_from_slice(paths);
                let mut active = existing.into_active_model();
                active.evidence_files = Set(serde_json::json!(files));
                active.updated_at = Set(now.into());
                self.grievance_repo.update(active).await?.into()
            }
            ReportKind::Suspicious => {
                let existing = self.suspicious_repo.get_by_id(id).await?;
                let mut files = evidence_paths(&existing.evidence_files);
                files.extend_from_slice(paths);
                let mut active = existing.into_active_model();
                active.evidence_files = Set(serde_json::json!(files));
                active.updated_at = Set(now.into());
                self.suspicious_repo.update(active).await?.into()
            }
        };

        self.announce(kind, report.id, report.user_id, ChangeAction::Updated);
        Ok(report)
    }

    /// Set status and/or admin notes on a report.
    ///
    /// Status changes must follow [`ReportStatus::can_transition_to`].
    pub async fn update_review(
        &self,
        kind: ReportKind,
        id: Uuid,
        status: Option<ReportStatus>,
        admin_notes: Option<Option<String>>,
    ) -> AppResult<UnifiedReport> {
        let now = Utc::now();
        let report: UnifiedReport = match kind {
            ReportKind::Grievance => {
                let existing = self.grievance_repo.get_by_id(id).await?;
                check_transition(existing.status, status)?;
                let mut active = existing.into_active_model();
                if let Some(status) = status {
                    active.status = Set(status);
                }
                if let Some(notes) = admin_notes {
                    active.admin_notes = Set(notes);
                }
                active.updated_at = Set(now.into());
                self.grievance_repo.update(active).await?.into()
            }
            ReportKind::Suspicious => {
                let existing = self.suspicious_repo.get_by_id(id).await?;
                check_transition(existing.status, status)?;
                let mut active = existing.into_active_model();
                if let Some(status) = status {
                    active.status = Set(status);
                }
                if let Some(notes) = admin_notes {
                    active.admin_notes = Set(notes);
                }
                active.updated_at = Set(now.into());
                self.suspicious_repo.update(active).await?.into()
            }
        };

        tracing::info!(
            report_id = %report.id,
            kind = %kind,
            status = %report.status,
            "Report reviewed"
        );
        self.announce(kind, report.id, report.user_id, ChangeAction::Updated);
        Ok(report)
    }

    fn announce(&self, kind: ReportKind, report_id: Uuid, user_id: Uuid, action: ChangeAction) {
        self.events.publish(ReportChange::Report {
            kind,
            report_id,
            user_id,
            action,
        });
    }
}

fn check_transition(current: ReportStatus, next: Option<ReportStatus>) -> AppResult<()> {
    match next {
        Some(next) if !current.can_transition_to(next) => Err(AppError::BadRequest(format!(
            "Cannot change status from {current} to {next}"
        ))),
        _ => Ok(()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Duration;
    use cybersecure_db::entities::profile;
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
    use serde_json::json;
    use std::sync::Arc;

    fn service(db: DatabaseConnection) -> ReportService {
        let db = Arc::new(db);
        ReportService::new(
            GrievanceReportRepository::new(db.clone()),
            SuspiciousEntityRepository::new(db.clone()),
            ProfileRepository::new(db),
            ReportEvents::new(),
        )
    }

    fn grievance(user_id: Uuid, minutes_ago: i64) -> grievance_report::Model {
        let at = Utc::now() - Duration::minutes(minutes_ago);
        grievance_report::Model {
            id: Uuid::new_v4(),
            user_id,
            title: "Sextortion email".to_string(),
            complaint_category: "cyber_harassment".to_string(),
            subcategory: None,
            description: "Threatening email".to_string(),
            location: "Chennai".to_string(),
            evidence_files: json!([]),
            priority_level: Severity::Medium,
            status: ReportStatus::Pending,
            admin_notes: None,
            created_at: at.into(),
            updated_at: at.into(),
        }
    }

    fn suspicious(user_id: Uuid, minutes_ago: i64) -> suspicious_entity::Model {
        let at = Utc::now() - Duration::minutes(minutes_ago);
        suspicious_entity::Model {
            id: Uuid::new_v4(),
            user_id,
            entity_type: "upi_id".to_string(),
            entity_value: "refund@okbank".to_string(),
            description: "Asked to scan a QR for a refund".to_string(),
            evidence_files: json!(["a/b.png"]),
            threat_level: Severity::High,
            status: ReportStatus::Pending,
            admin_notes: None,
            created_at: at.into(),
            updated_at: at.into(),
        }
    }

    fn profile_of(user_id: Uuid) -> profile::Model {
        profile::Model {
            id: Uuid::new_v4(),
            user_id,
            full_name: "Ravi".to_string(),
            phone_number: None,
            organization: None,
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_create_grievance_requires_fields() {
        let svc = service(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let input = CreateGrievanceInput {
            title: Some("Phishing".to_string()),
            complaint_category: Some("phishing".to_string()),
            description: Some("   ".to_string()),
            location: None,
            ..Default::default()
        };

        let err = svc.create_grievance(Uuid::new_v4(), input).await.unwrap_err();
        match err {
            AppError::BadRequest(msg) => assert_eq!(
                msg,
                "Title, complaint category, description, and location are required"
            ),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_create_suspicious_requires_fields() {
        let svc = service(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let err = svc
            .create_suspicious(Uuid::new_v4(), CreateSuspiciousInput::default())
            .await
            .unwrap_err();

        assert!(
            matches!(err, AppError::BadRequest(msg) if msg == "Entity type, entity value, and description are required")
        );
    }

    #[tokio::test]
    async fn test_create_rejects_unknown_severity() {
        let svc = service(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let input = CreateSuspiciousInput {
            entity_type: Some("website".to_string()),
            entity_value: Some("bad.example".to_string()),
            description: Some("Fake login page".to_string()),
            threat_level: Some("urgent".to_string()),
            ..Default::default()
        };

        let err = svc.create_suspicious(Uuid::new_v4(), input).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(msg) if msg.contains("urgent")));
    }

    #[tokio::test]
    async fn test_create_grievance_defaults_and_announces() {
        let user_id = Uuid::new_v4();
        let row = grievance(user_id, 0);
        let svc = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[row.clone()]])
                .into_connection(),
        );
        let mut rx = svc.events().subscribe();

        let input = CreateGrievanceInput {
            title: Some(row.title.clone()),
            complaint_category: Some(row.complaint_category.clone()),
            description: Some(row.description.clone()),
            location: Some(row.location.clone()),
            ..Default::default()
        };
        let created = svc.create_grievance(user_id, input).await.unwrap();

        assert_eq!(created.priority_level, Severity::Medium);
        let change = rx.try_recv().unwrap();
        assert!(matches!(
            change,
            ReportChange::Report {
                kind: ReportKind::Grievance,
                action: ChangeAction::Created,
                ..
            }
        ));
        assert_eq!(change.user_id(), user_id);
    }

    #[tokio::test]
    async fn test_list_for_user_merges_only_that_user() {
        let user_id = Uuid::new_v4();
        let svc = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[grievance(user_id, 20)]])
                .append_query_results([[suspicious(user_id, 5)]])
                .into_connection(),
        );

        let reports = svc.list_for_user(user_id).await.unwrap();

        assert_eq!(reports.len(), 2);
        assert!(reports.iter().all(|r| r.user_id == user_id));
        assert_eq!(reports[0].kind, ReportKind::Suspicious);
        assert_eq!(reports[0].title, "Suspicious upi id: refund@okbank");
    }

    #[tokio::test]
    async fn test_admin_list_is_union_inner_joined_with_profiles() {
        let with_profile = Uuid::new_v4();
        let without_profile = Uuid::new_v4();
        let svc = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[grievance(with_profile, 3), grievance(without_profile, 2)]])
                .append_query_results([[suspicious(with_profile, 1)]])
                .append_query_results([[profile_of(with_profile)]])
                .into_connection(),
        );

        let reports = svc.list_all_with_profiles().await.unwrap();

        assert_eq!(reports.len(), 2);
        assert!(reports.iter().all(|r| r.report.user_id == with_profile));
        assert_eq!(reports[0].user_profile.full_name, "Ravi");
    }

    #[tokio::test]
    async fn test_get_owned_hides_other_users_reports() {
        let row = grievance(Uuid::new_v4(), 0);
        let svc = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[row.clone()]])
                .into_connection(),
        );

        let err = svc
            .get_owned(ReportKind::Grievance, row.id, Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_update_review_resolves_report() {
        let row = grievance(Uuid::new_v4(), 10);
        let mut resolved = row.clone();
        resolved.status = ReportStatus::Resolved;
        resolved.admin_notes = Some("Refund issued".to_string());

        let svc = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[row.clone()]])
                .append_query_results([[resolved.clone()]])
                .into_connection(),
        );

        let report = svc
            .update_review(
                ReportKind::Grievance,
                row.id,
                Some(ReportStatus::Resolved),
                Some(Some("Refund issued".to_string())),
            )
            .await
            .unwrap();

        assert_eq!(report.status, ReportStatus::Resolved);
        assert_eq!(report.admin_notes.as_deref(), Some("Refund issued"));
    }

    #[tokio::test]
    async fn test_update_review_rejects_reopening_to_pending() {
        let mut row = suspicious(Uuid::new_v4(), 10);
        row.status = ReportStatus::Rejected;

        let svc = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[row.clone()]])
                .into_connection(),
        );

        let err = svc
            .update_review(ReportKind::Suspicious, row.id, Some(ReportStatus::Pending), None)
            .await
            .unwrap_err();
        assert!(
            matches!(err, AppError::BadRequest(msg) if msg == "Cannot change status from rejected to pending")
        );
    }

    #[tokio::test]
    async fn test_append_evidence_keeps_existing_paths() {
        let row = suspicious(Uuid::new_v4(), 0);
        let mut patched = row.clone();
        patched.evidence_files = json!(["a/b.png", "u/suspicious/r/1-0.pdf"]);

        let svc = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[row.clone()]])
                .append_query_results([[patched]])
                .into_connection(),
        );

        let report = svc
            .append_evidence(
                ReportKind::Suspicious,
                row.id,
                &["u/suspicious/r/1-0.pdf".to_string()],
            )
            .await
            .unwrap();

        assert_eq!(report.file_urls, vec!["a/b.png", "u/suspicious/r/1-0.pdf"]);
    }
}
