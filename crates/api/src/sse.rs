//! Server-Sent Events for the report feed.
//!
//! A stream opens with a `reports` event holding the full list. Every later
//! change that concerns the subscriber triggers a complete re-fetch. Events
//! are ticks, never patches, so a lagging subscriber loses nothing.

#![allow(missing_docs)]

use std::{convert::Infallible, time::Duration};

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, KeepAliveStream, Sse},
};
use cybersecure_common::AppResult;
use cybersecure_core::ReportChange;
use futures::{
    StreamExt,
    future,
    stream::{self, Stream},
};
use serde_json::json;
use tokio_stream::wrappers::{BroadcastStream, errors::BroadcastStreamRecvError};
use uuid::Uuid;

use crate::{
    extractors::{AdminUser, AuthUser},
    middleware::AppState,
};

/// Which reports a stream follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feed {
    /// One user's own reports.
    User(Uuid),
    /// Every report, joined with profiles.
    Admin,
}

impl Feed {
    /// Whether a change should trigger a re-fetch.
    #[must_use]
    pub fn concerns(self, change: &ReportChange) -> bool {
        match self {
            Self::User(user_id) => change.user_id() == user_id,
            Self::Admin => true,
        }
    }

    async fn snapshot(self, state: &AppState) -> AppResult<serde_json::Value> {
        Ok(match self {
            Self::User(user_id) => {
                json!({ "reports": state.report_service.list_for_user(user_id).await? })
            }
            Self::Admin => json!({ "reports": state.admin_service.list_reports().await? }),
        })
    }
}

async fn snapshot_event(state: &AppState, feed: Feed) -> Event {
    match feed.snapshot(state).await {
        Ok(body) => Event::default()
            .event("reports")
            .json_data(&body)
            .unwrap_or_else(|_| Event::default().event("error").data("serialization failed")),
        Err(e) => {
            tracing::error!(feed = ?feed, error = %e, "Report feed fetch failed");
            Event::default().event("error").data(e.public_message())
        }
    }
}

/// Build the event stream for a feed.
///
/// The subscription is taken before the first fetch so no change between
/// the two is missed.
pub fn report_stream(
    state: AppState,
    feed: Feed,
) -> impl Stream<Item = Result<Event, Infallible>> {
    let rx = state.report_service.events().subscribe();

    let ticks = BroadcastStream::new(rx)
        .filter(move |item| {
            let wanted = match item {
                Ok(change) => feed.concerns(change),
                Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "Report feed subscriber lagged");
                    true
                }
            };
            future::ready(wanted)
        })
        .map(|_| ());

    stream::once(future::ready(()))
        .chain(ticks)
        .then(move |()| {
            let state = state.clone();
            async move { Ok(snapshot_event(&state, feed).await) }
        })
}

fn sse<S>(stream: S) -> Sse<KeepAliveStream<S>>
where
    S: Stream<Item = Result<Event, Infallible>> + Send + 'static,
{
    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(30))
            .text("ping"),
    )
}

/// The caller's reports, live.
pub async fn user_reports(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> Sse<KeepAliveStream<impl Stream<Item = Result<Event, Infallible>>>> {
    tracing::debug!(user_id = %user.id, "Report stream opened");
    sse(report_stream(state, Feed::User(user.id)))
}

/// Every report, live. Admin only.
pub async fn admin_reports(
    AdminUser(user): AdminUser,
    State(state): State<AppState>,
) -> Sse<KeepAliveStream<impl Stream<Item = Result<Event, Infallible>>>> {
    tracing::debug!(user_id = %user.id, "Admin report stream opened");
    sse(report_stream(state, Feed::Admin))
}
