//! The sync run: fetch every feed, transform its events, upsert them.
//!
//! Everything is sequential: one source, one event, one request at a time.
//! Failures are contained at the narrowest level that makes sense. A feed
//! that cannot be fetched or parsed skips that source, an event that cannot
//! be transformed or written skips that event. Only a rejected authorization
//! ends the run early, since every later write would fail the same way.

mod pacer;
mod report;

use std::collections::HashMap;
use std::time::Duration;

use chrono_tz::Tz;
use coursesync_core::{CalendarSource, CourseTagExtractor, EventTransformer, SourceEvent};
use coursesync_providers::{
    CalendarClient, FeedFetcher, ProviderErrorCode, RetryPolicy, UpsertError, UpsertOutcome,
    parse_ics_content, upsert,
};
use tracing::{debug, error, info, warn};

use crate::error::ClientResult;

pub use pacer::Pacer;
pub use report::{EventFailure, FailureStage, SourceReport, SourceStatus, SyncReport};

/// Settings of a sync run.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Feeds, processed in this order.
    pub sources: Vec<CalendarSource>,
    /// Destination calendar.
    pub calendar_id: String,
    /// Destination timezone.
    pub timezone: Tz,
    /// Subject abbreviations recognised in course tags.
    pub subjects: Vec<String>,
    /// Subject to color id.
    pub colors: HashMap<String, String>,
    /// Minimum pause between calendar writes.
    pub pacing: Duration,
    /// Retry policy for calendar writes.
    pub retry: RetryPolicy,
}

/// Runs one sync pass.
///
/// Without a calendar client the run is a dry run: bodies are printed as
/// JSON instead of written.
pub struct Syncer<'a> {
    config: SyncConfig,
    transformer: EventTransformer,
    fetcher: &'a dyn FeedFetcher,
    client: Option<&'a dyn CalendarClient>,
}

impl<'a> Syncer<'a> {
    /// Creates a syncer.
    pub fn new(
        config: SyncConfig,
        fetcher: &'a dyn FeedFetcher,
        client: Option<&'a dyn CalendarClient>,
    ) -> ClientResult<Self> {
        let extractor = CourseTagExtractor::new(&config.subjects)?;
        let transformer =
            EventTransformer::new(extractor, config.timezone).with_colors(config.colors.clone());

        Ok(Self {
            config,
            transformer,
            fetcher,
            client,
        })
    }

    /// Returns true if nothing will be written.
    pub fn is_dry_run(&self) -> bool {
        self.client.is_none()
    }

    /// Syncs every source in order.
    ///
    /// When the destination rejects the authorization the run stops and the
    /// report so far is returned with [`SyncReport::aborted`] set.
    pub async fn run(&self) -> SyncReport {
        let mut report = SyncReport::default();
        let mut pacer = Pacer::new(self.config.pacing);

        info!(
            sources = self.config.sources.len(),
            calendar = %self.config.calendar_id,
            dry_run = self.is_dry_run(),
            "starting sync"
        );

        for source in &self.config.sources {
            println!("Fetching {}...", source.name);

            let events = match self.load_source(source).await {
                Ok(events) => events,
                Err(reason) => {
                    report.source_skipped(&source.name, reason);
                    continue;
                }
            };
            report.source_synced(&source.name, events.len());

            for event in &events {
                if let Err(reason) = self.sync_event(source, event, &mut pacer, &mut report).await {
                    report.aborted = Some(reason);
                    return report;
                }
            }
        }

        info!(
            created = report.created,
            updated = report.updated,
            failed = report.failures.len(),
            skipped_sources = report.skipped_sources(),
            "sync finished"
        );
        report
    }

    async fn load_source(&self, source: &CalendarSource) -> Result<Vec<SourceEvent>, String> {
        let body = self.fetcher.fetch(source).await.map_err(|err| {
            warn!(source = %source.name, error = %err, "Failed to fetch {}", source.name);
            err.to_string()
        })?;

        let events = parse_ics_content(&body).map_err(|err| {
            warn!(source = %source.name, error = %err, "Failed to parse {}", source.name);
            err.to_string()
        })?;

        debug!(source = %source.name, events = events.len(), "feed parsed");
        Ok(events)
    }

    async fn sync_event(
        &self,
        source: &CalendarSource,
        event: &SourceEvent,
        pacer: &mut Pacer,
        report: &mut SyncReport,
    ) -> Result<(), String> {
        let title = event.display_title();

        let body = match self.transformer.transform(event, &source.name) {
            Ok(body) => body,
            Err(err) => {
                warn!(source = %source.name, title, error = %err, "skipping event");
                report.event_failed(&source.name, title, FailureStage::Transform, err.to_string());
                return Ok(());
            }
        };

        let Some(client) = self.client else {
            match serde_json::to_string_pretty(&body) {
                Ok(json) => {
                    println!("{}", json);
                    report.previewed += 1;
                }
                Err(err) => {
                    report.event_failed(&source.name, title, FailureStage::Transform, err.to_string())
                }
            }
            return Ok(());
        };

        pacer.wait().await;

        match upsert(client, &self.config.calendar_id, &body, &self.config.retry).await {
            Ok(UpsertOutcome::Created) => {
                println!("Created: {}", body.summary);
                report.created += 1;
            }
            Ok(UpsertOutcome::Updated) => {
                println!("Updated: {}", body.summary);
                report.updated += 1;
            }
            Err(err) if err.provider_error().code() == ProviderErrorCode::AuthenticationFailed => {
                error!(source = %source.name, title, error = %err, "authorization rejected, aborting sync");
                return Err(err.provider_error().to_string());
            }
            Err(err) => {
                let stage = match err {
                    UpsertError::InsertFailed(_) => FailureStage::Insert,
                    UpsertError::UpdateFailed(_) => FailureStage::Update,
                };
                warn!(
                    source = %source.name,
                    title = %body.summary,
                    event_id = %body.id,
                    error = %err,
                    "failed to sync event"
                );
                report.event_failed(&source.name, &body.summary, stage, err.to_string());
            }
        }
        Ok(())
    }
}
