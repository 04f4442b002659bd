//! Unified report view model.
//!
//! Grievance reports and suspicious-entity reports live in separate tables.
//! Clients see both through one shape, merged and sorted newest first.

use std::{fmt, str::FromStr};

use chrono::{DateTime, FixedOffset};
use cybersecure_common::AppError;
use cybersecure_db::entities::{
    ReportStatus, Severity, grievance_report, profile, report_status::evidence_paths,
    suspicious_entity,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which table a report comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportKind {
    Grievance,
    Suspicious,
}

impl ReportKind {
    /// Wire name, also used as a storage path segment.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Grievance => "grievance",
            Self::Suspicious => "suspicious",
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "grievance" => Ok(Self::Grievance),
            "suspicious" => Ok(Self::Suspicious),
            other => Err(AppError::BadRequest(format!("Unknown report type: {other}"))),
        }
    }
}

/// A report of either kind in the common client shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnifiedReport {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(rename = "type")]
    pub kind: ReportKind,
    pub title: String,
    pub description: String,
    /// `complaint_category` or `entity_type`.
    pub category: String,
    /// `priority_level` or `threat_level`.
    pub severity: Severity,
    /// `evidence_files`.
    pub file_urls: Vec<String>,
    pub status: ReportStatus,
    pub admin_notes: Option<String>,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: DateTime<FixedOffset>,
}

/// Title shown for a suspicious-entity report.
///
/// `("phone_number", "+1 555")` becomes `Suspicious phone number: +1 555`.
#[must_use]
pub fn suspicious_title(entity_type: &str, entity_value: &str) -> String {
    format!(
        "Suspicious {}: {entity_value}",
        entity_type.replace('_', " ")
    )
}

impl From<grievance_report::Model> for UnifiedReport {
    fn from(report: grievance_report::Model) -> Self {
        Self {
            file_urls: evidence_paths(&report.evidence_files),
            id: report.id,
            user_id: report.user_id,
            kind: ReportKind::Grievance,
            title: report.title,
            description: report.description,
            category: report.complaint_category,
            severity: report.priority_level,
            status: report.status,
            admin_notes: report.admin_notes,
            created_at: report.created_at,
            updated_at: report.updated_at,
        }
    }
}

impl From<suspicious_entity::Model> for UnifiedReport {
    fn from(report: suspicious_entity::Model) -> Self {
        Self {
            title: suspicious_title(&report.entity_type, &report.entity_value),
            file_urls: evidence_paths(&report.evidence_files),
            id: report.id,
            user_id: report.user_id,
            kind: ReportKind::Suspicious,
            description: report.description,
            category: report.entity_type,
            severity: report.threat_level,
            status: report.status,
            admin_notes: report.admin_notes,
            created_at: report.created_at,
            updated_at: report.updated_at,
        }
    }
}

/// Map both lists to the unified shape and sort newest first.
#[must_use]
pub fn merge_newest_first(
    grievances: Vec<grievance_report::Model>,
    suspicious: Vec<suspicious_entity::Model>,
) -> Vec<UnifiedReport> {
    let mut merged: Vec<UnifiedReport> = grievances
        .into_iter()
        .map(UnifiedReport::from)
        .chain(suspicious.into_iter().map(UnifiedReport::from))
        .collect();
    merged.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    merged
}

/// Reporter details attached to admin views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReporterProfile {
    pub full_name: String,
    pub phone_number: Option<String>,
    pub organization: Option<String>,
}

impl From<&profile::Model> for ReporterProfile {
    fn from(profile: &profile::Model) -> Self {
        Self {
            full_name: profile.full_name.clone(),
            phone_number: profile.phone_number.clone(),
            organization: profile.organization.clone(),
        }
    }
}

/// A unified report joined with its reporter's profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdminReport {
    #[serde(flatten)]
    pub report: UnifiedReport,
    pub user_profile: ReporterProfile,
}
