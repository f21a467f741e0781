//! Outcome of a sync run.

use std::fmt;

use serde::Serialize;

/// What happened to one configured source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SourceStatus {
    /// The feed was fetched and parsed; `events` is the number of VEVENTs.
    Synced { events: usize },
    /// The feed could not be fetched or parsed.
    Skipped { reason: String },
}

/// Per-source entry of a [`SyncReport`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceReport {
    pub name: String,
    #[serde(flatten)]
    pub status: SourceStatus,
}

/// The step at which an event failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStage {
    Transform,
    Insert,
    Update,
}

impl fmt::Display for FailureStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transform => write!(f, "transform"),
            Self::Insert => write!(f, "insert"),
            Self::Update => write!(f, "update"),
        }
    }
}

/// One event that could not be synced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventFailure {
    pub source: String,
    pub title: String,
    pub stage: FailureStage,
    pub message: String,
}

/// Counters and failure records of a sync run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// Events inserted.
    pub created: usize,
    /// Events that already existed and were replaced.
    pub updated: usize,
    /// Bodies printed instead of written (dry run).
    pub previewed: usize,
    /// Sources in configured order.
    pub sources: Vec<SourceReport>,
    /// Events that failed, in processing order.
    pub failures: Vec<EventFailure>,
    /// Why the run stopped early, if it did.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aborted: Option<String>,
}

impl SyncReport {
    pub(crate) fn source_synced(&mut self, name: &str, events: usize) {
        self.sources.push(SourceReport {
            name: name.to_string(),
            status: SourceStatus::Synced { events },
        });
    }

    pub(crate) fn source_skipped(&mut self, name: &str, reason: impl Into<String>) {
        self.sources.push(SourceReport {
            name: name.to_string(),
            status: SourceStatus::Skipped {
                reason: reason.into(),
            },
        });
    }

    pub(crate) fn event_failed(
        &mut self,
        source: &str,
        title: &str,
        stage: FailureStage,
        message: impl Into<String>,
    ) {
        self.failures.push(EventFailure {
            source: source.to_string(),
            title: title.to_string(),
            stage,
            message: message.into(),
        });
    }

    /// Number of sources that were skipped.
    pub fn skipped_sources(&self) -> usize {
        self.sources
            .iter()
            .filter(|s| matches!(s.status, SourceStatus::Skipped { .. }))
            .count()
    }

    /// Returns true if any source was skipped, any event failed, or the run stopped early.
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty() || self.skipped_sources() > 0 || self.aborted.is_some()
    }
}

impl fmt::Display for SyncReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total = self.sources.len();
        write!(
            f,
            "{} source{}: ",
            total,
            if total == 1 { "" } else { "s" }
        )?;
        if self.previewed > 0 {
            write!(f, "{} previewed", self.previewed)?;
        } else {
            write!(f, "{} created, {} updated", self.created, self.updated)?;
        }
        write!(f, ", {} failed", self.failures.len())?;

        let skipped = self.skipped_sources();
        if skipped > 0 {
            write!(f, ", {} skipped", skipped)?;
        }
        if let Some(reason) = &self.aborted {
            write!(f, " (aborted: {})", reason)?;
        }
        Ok(())
    }
}
