//! Status and severity shared by both report tables.

use std::{fmt, str::FromStr};

use sea_orm::{Iterable, entity::prelude::*};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a report.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    EnumIter,
    DeriveActiveEnum,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    #[sea_orm(string_value = "pending")]
    #[default]
    Pending,
    #[sea_orm(string_value = "under_review")]
    UnderReview,
    #[sea_orm(string_value = "investigating")]
    Investigating,
    #[sea_orm(string_value = "resolved")]
    Resolved,
    #[sea_orm(string_value = "verified")]
    Verified,
    #[sea_orm(string_value = "rejected")]
    Rejected,
    #[sea_orm(string_value = "false_positive")]
    FalsePositive,
}

impl ReportStatus {
    /// Wire name of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::UnderReview => "under_review",
            Self::Investigating => "investigating",
            Self::Resolved => "resolved",
            Self::Verified => "verified",
            Self::Rejected => "rejected",
            Self::FalsePositive => "false_positive",
        }
    }

    /// Whether the report has reached a closing decision.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Resolved | Self::Verified | Self::Rejected | Self::FalsePositive
        )
    }

    /// Whether an administrator may move a report from `self` to `next`.
    ///
    /// Pending reports may go anywhere. Open reports may not return to
    /// pending. Closed reports may only be reopened for review. Re-applying
    /// the current status is always allowed so notes can be edited alone.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        if self == next {
            return true;
        }
        match self {
            Self::Pending => true,
            Self::UnderReview | Self::Investigating => !matches!(next, Self::Pending),
            Self::Resolved | Self::Verified | Self::Rejected | Self::FalsePositive => {
                matches!(next, Self::UnderReview)
            }
        }
    }
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("Invalid status: {s}"))
    }
}

/// Severity of a report (`priority_level` / `threat_level`).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    EnumIter,
    DeriveActiveEnum,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    #[sea_orm(string_value = "low")]
    Low,
    #[sea_orm(string_value = "medium")]
    #[default]
    Medium,
    #[sea_orm(string_value = "high")]
    High,
    #[sea_orm(string_value = "critical")]
    Critical,
}

impl Severity {
    /// Wire name of the severity.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::iter()
            .find(|severity| severity.as_str() == s)
            .ok_or_else(|| format!("Invalid severity: {s}"))
    }
}

/// Decode an `evidence_files` JSON column into storage paths.
///
/// Anything that is not an array of strings decodes as empty.
#[must_use]
pub fn evidence_paths(value: &Json) -> Vec<String> {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.as_str().map(ToString::to_string))
                .collect()
        })
        .unwrap_or_default()
}
