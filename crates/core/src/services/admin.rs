//! Admin service.
//!
//! Report review, the user directory and dashboard statistics. Callers
//! must have passed [`AuthService::require_admin`](super::auth::AuthService::require_admin).

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, Utc};
use cybersecure_common::{AppError, AppResult, IdGenerator};
use cybersecure_db::{
    entities::{AppRole, ReportStatus, Severity, profile, user_role},
    repositories::{ProfileRepository, UserRoleRepository},
};
use sea_orm::{Iterable, Set};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use super::{
    events::ReportChange,
    report::ReportService,
    unified_report::{AdminReport, ReportKind, UnifiedReport},
};

/// Number of months shown in the trend, current month included.
const TREND_MONTHS: i32 = 6;

/// Review update for one report.
///
/// `admin_notes: null` clears the notes; leaving the field out keeps them.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateReportInput {
    pub status: Option<String>,
    #[serde(default, deserialize_with = "present_or_null")]
    pub admin_notes: Option<Option<String>>,
}

fn present_or_null<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

/// A registered user as shown in the admin directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserSummary {
    pub user_id: Uuid,
    pub full_name: String,
    pub phone_number: Option<String>,
    pub organization: Option<String>,
    pub created_at: DateTime<FixedOffset>,
    pub reports_count: usize,
    pub is_admin: bool,
}

/// Reports and sign-ups in one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyCount {
    /// e.g. `Mar 2026`.
    pub month: String,
    pub reports: usize,
    pub users: usize,
}

/// Dashboard statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdminStats {
    pub total_reports: usize,
    pub total_users: usize,
    pub active_reporters: usize,
    pub by_status: BTreeMap<&'static str, usize>,
    pub by_type: BTreeMap<&'static str, usize>,
    pub by_severity: BTreeMap<&'static str, usize>,
    pub monthly: Vec<MonthlyCount>,
    /// Percentage of reports in `resolved`, one decimal.
    pub resolution_rate: f64,
}

/// Compute dashboard statistics.
///
/// Every status, type and severity appears in its breakdown, zero or not.
#[must_use]
pub fn compute_stats(
    reports: &[UnifiedReport],
    profiles: &[profile::Model],
    now: DateTime<Utc>,
) -> AdminStats {
    let mut by_status: BTreeMap<&'static str, usize> =
        ReportStatus::iter().map(|s| (s.as_str(), 0)).collect();
    let mut by_type: BTreeMap<&'static str, usize> = [ReportKind::Grievance, ReportKind::Suspicious]
        .into_iter()
        .map(|k| (k.as_str(), 0))
        .collect();
    let mut by_severity: BTreeMap<&'static str, usize> =
        Severity::iter().map(|s| (s.as_str(), 0)).collect();

    for report in reports {
        *by_status.entry(report.status.as_str()).or_default() += 1;
        *by_type.entry(report.kind.as_str()).or_default() += 1;
        *by_severity.entry(report.severity.as_str()).or_default() += 1;
    }

    let active_reporters = reports
        .iter()
        .map(|r| r.user_id)
        .collect::<HashSet<_>>()
        .len();

    let resolved = by_status
        .get(ReportStatus::Resolved.as_str())
        .copied()
        .unwrap_or(0);
    let resolution_rate = if reports.is_empty() {
        0.0
    } else {
        (resolved as f64 / reports.len() as f64 * 1000.0).round() / 10.0
    };

    let monthly = (0..TREND_MONTHS)
        .rev()
        .map(|back| {
            let (year, month) = month_before(now, back);
            let in_month = |at: &DateTime<FixedOffset>| {
                let at = at.with_timezone(&Utc);
                at.year() == year && at.month() == month
            };
            MonthlyCount {
                month: NaiveDate::from_ymd_opt(year, month, 1)
                    .map(|d| d.format("%b %Y").to_string())
                    .unwrap_or_default(),
                reports: reports.iter().filter(|r| in_month(&r.created_at)).count(),
                users: profiles.iter().filter(|p| in_month(&p.created_at)).count(),
            }
        })
        .collect();

    AdminStats {
        total_reports: reports.len(),
        total_users: profiles.len(),
        active_reporters,
        by_status,
        by_type,
        by_severity,
        monthly,
        resolution_rate,
    }
}

/// `(year, month)` of the calendar month `back` months before `now`.
fn month_before(now: DateTime<Utc>, back: i32) -> (i32, u32) {
    let index = now.year() * 12 + now.month0() as i32 - back;
    (index.div_euclid(12), index.rem_euclid(12) as u32 + 1)
}

/// Admin service.
#[derive(Clone)]
pub struct AdminService {
    reports: ReportService,
    profile_repo: ProfileRepository,
    role_repo: UserRoleRepository,
    id_gen: IdGenerator,
}

impl AdminService {
    /// Create a new admin service.
    #[must_use]
    pub const fn new(
        reports: ReportService,
        profile_repo: ProfileRepository,
        role_repo: UserRoleRepository,
    ) -> Self {
        Self {
            reports,
            profile_repo,
            role_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Every report with its reporter's profile, newest first.
    pub async fn list_reports(&self) -> AppResult<Vec<AdminReport>> {
        self.reports.list_all_with_profiles().await
    }

    /// Change the status and/or notes of a report.
    pub async fn update_report(
        &self,
        kind: ReportKind,
        id: Uuid,
        input: UpdateReportInput,
    ) -> AppResult<UnifiedReport> {
        let status = input
            .status
            .as_deref()
            .map(str::parse::<ReportStatus>)
            .transpose()
            .map_err(AppError::BadRequest)?;

        if status.is_none() && input.admin_notes.is_none() {
            return Err(AppError::BadRequest(
                "Nothing to update: provide status or admin_notes".to_string(),
            ));
        }

        self.reports
            .update_review(kind, id, status, input.admin_notes)
            .await
    }

    /// Every profile with report counts and admin flags.
    pub async fn list_users(&self) -> AppResult<Vec<UserSummary>> {
        let profiles = self.profile_repo.find_all().await?;
        let reports = self.reports.list_all().await?;
        let admins: HashSet<Uuid> = self
            .role_repo
            .find_user_ids_with_role(AppRole::Admin)
            .await?
            .into_iter()
            .collect();

        let mut counts: HashMap<Uuid, usize> = HashMap::new();
        for report in &reports {
            *counts.entry(report.user_id).or_default() += 1;
        }

        Ok(profiles
            .into_iter()
            .map(|p| UserSummary {
                reports_count: counts.get(&p.user_id).copied().unwrap_or(0),
                is_admin: admins.contains(&p.user_id),
                user_id: p.user_id,
                full_name: p.full_name,
                phone_number: p.phone_number,
                organization: p.organization,
                created_at: p.created_at,
            })
            .collect())
    }

    /// Delete a user's profile. The identity account is left alone.
    ///
    /// Their reports drop out of the admin list, so admin feeds are ticked.
    pub async fn delete_user_profile(&self, user_id: Uuid) -> AppResult<()> {
        if !self.profile_repo.delete_by_user_id(user_id).await? {
            return Err(AppError::NotFound("Profile not found".to_string()));
        }
        tracing::info!(user_id = %user_id, "Profile deleted by admin");
        self.reports
            .events()
            .publish(ReportChange::OwnerRemoved { user_id });
        Ok(())
    }

    /// Grant the admin role. Granting it twice is a no-op.
    pub async fn grant_admin(&self, user_id: Uuid) -> AppResult<()> {
        self.role_repo
            .grant(user_role::ActiveModel {
                id: Set(self.id_gen.generate()),
                user_id: Set(user_id),
                role: Set(AppRole::Admin),
                created_at: Set(Utc::now().into()),
            })
            .await?;
        tracing::info!(user_id = %user_id, "Admin role granted");
        Ok(())
    }

    /// Dashboard statistics over the admin report list.
    pub async fn stats(&self) -> AppResult<AdminStats> {
        let reports: Vec<UnifiedReport> = self
            .list_reports()
            .await?
            .into_iter()
            .map(|r| r.report)
            .collect();
        let profiles = self.profile_repo.find_all().await?;
        Ok(compute_stats(&reports, &profiles, Utc::now()))
    }
}
