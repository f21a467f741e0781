//! CalendarClient trait and the upsert operation.
//!
//! This module defines the [`CalendarClient`] trait, the write-side
//! abstraction over the destination calendar, and [`upsert`], which turns
//! the "insert, and on conflict update" contract into a single call.

use std::future::Future;
use std::pin::Pin;

use coursesync_core::TargetEvent;
use tracing::debug;

use crate::error::{ProviderError, ProviderResult};
use crate::retry::RetryPolicy;

/// Information about a calendar.
#[derive(Debug, Clone)]
pub struct CalendarInfo {
    /// Unique identifier for the calendar.
    pub id: String,
    /// Human-readable name of the calendar.
    pub name: String,
    /// Whether this is the primary calendar.
    pub is_primary: bool,
    /// The timezone of the calendar (IANA identifier).
    pub timezone: Option<String>,
}

impl CalendarInfo {
    /// Creates a new CalendarInfo with the given ID and name.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            is_primary: false,
            timezone: None,
        }
    }

    /// Builder method to mark as primary.
    pub fn with_primary(mut self, is_primary: bool) -> Self {
        self.is_primary = is_primary;
        self
    }

    /// Builder method to set timezone.
    pub fn with_timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = Some(timezone.into());
        self
    }
}

/// A boxed future for async trait methods.
///
/// Boxed futures keep the traits object-safe so the sync loop can hold
/// `&dyn CalendarClient` and tests can swap in fakes.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Write access to the destination calendar.
///
/// Implementations signal "an event with this id already exists" with a
/// [`ProviderErrorCode::Conflict`](crate::ProviderErrorCode::Conflict) error
/// from [`insert`](CalendarClient::insert).
pub trait CalendarClient: Send + Sync {
    /// Returns the backend name (e.g. "google:default").
    fn name(&self) -> &str;

    /// Creates `event` in `calendar_id`, using `event.id` as its identifier.
    fn insert<'a>(
        &'a self,
        calendar_id: &'a str,
        event: &'a TargetEvent,
    ) -> BoxFuture<'a, ProviderResult<()>>;

    /// Replaces the event `event_id` in `calendar_id` with `event`.
    fn update<'a>(
        &'a self,
        calendar_id: &'a str,
        event_id: &'a str,
        event: &'a TargetEvent,
    ) -> BoxFuture<'a, ProviderResult<()>>;

    /// Lists the calendars the account can see.
    fn list_calendars(&self) -> BoxFuture<'_, ProviderResult<Vec<CalendarInfo>>>;
}

/// What an upsert did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// The event did not exist and was created.
    Created,
    /// The event existed and was replaced.
    Updated,
}

/// Which step of an upsert failed.
#[derive(Debug, thiserror::Error)]
pub enum UpsertError {
    /// Insert failed with something other than a conflict.
    #[error("insert failed: {0}")]
    InsertFailed(#[source] ProviderError),
    /// Insert hit a conflict and the follow-up update failed.
    #[error("update failed: {0}")]
    UpdateFailed(#[source] ProviderError),
}

impl UpsertError {
    /// Returns the underlying provider error.
    pub fn provider_error(&self) -> &ProviderError {
        match self {
            Self::InsertFailed(err) | Self::UpdateFailed(err) => err,
        }
    }
}

/// Creates `event`, or replaces it if its id is already taken.
///
/// Both steps use the same body and the same id (`event.id`). Transient
/// failures of either step are retried according to `retry`; a conflict is
/// never retried, it moves on to the update step.
pub async fn upsert(
    client: &dyn CalendarClient,
    calendar_id: &str,
    event: &TargetEvent,
    retry: &RetryPolicy,
) -> Result<UpsertOutcome, UpsertError> {
    match retry.run(|| client.insert(calendar_id, event)).await {
        Ok(()) => Ok(UpsertOutcome::Created),
        Err(err) if err.is_conflict() => {
            debug!(event_id = %event.id, "event exists, updating");
            retry
                .run(|| client.update(calendar_id, &event.id, event))
                .await
                .map(|()| UpsertOutcome::Updated)
                .map_err(UpsertError::UpdateFailed)
        }
        Err(err) => Err(UpsertError::InsertFailed(err)),
    }
}
