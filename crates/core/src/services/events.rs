//! Report change feed.
//!
//! Every report insert, update, and evidence patch is announced here, as is
//! the removal of a reporter's profile (which drops their reports from the
//! admin list). Subscribers treat each event as a tick and re-fetch their
//! full list.

use tokio::sync::broadcast;
use uuid::Uuid;

use super::unified_report::ReportKind;

/// Capacity of the change channel. Lagging subscribers skip ahead.
const CHANNEL_CAPACITY: usize = 256;

/// What happened to a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeAction {
    Created,
    Updated,
}

/// A change that alters some report list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportChange {
    /// One report row was written.
    Report {
        kind: ReportKind,
        report_id: Uuid,
        /// Owner of the report.
        user_id: Uuid,
        action: ChangeAction,
    },
    /// A reporter's profile was deleted.
    OwnerRemoved { user_id: Uuid },
}

impl ReportChange {
    /// The user whose reports are affected.
    #[must_use]
    pub const fn user_id(&self) -> Uuid {
        match self {
            Self::Report { user_id, .. } | Self::OwnerRemoved { user_id } => *user_id,
        }
    }
}

/// Broadcast hub for report changes.
#[derive(Clone)]
pub struct ReportEvents {
    tx: broadcast::Sender<ReportChange>,
}

impl Default for ReportEvents {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportEvents {
    /// Create a new hub.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    /// Subscribe to future changes.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ReportChange> {
        self.tx.subscribe()
    }

    /// Announce a change. Having no subscribers is not an error.
    pub fn publish(&self, change: ReportChange) {
        let receivers = self.tx.send(change.clone()).unwrap_or(0);
        match change {
            ReportChange::Report {
                kind,
                report_id,
                user_id,
                action,
            } => tracing::debug!(
                kind = %kind,
                report_id = %report_id,
                user_id = %user_id,
                action = ?action,
                receivers,
                "Published report change"
            ),
            ReportChange::OwnerRemoved { user_id } => tracing::debug!(
                user_id = %user_id,
                receivers,
                "Published reporter removal"
            ),
        }
    }
}
