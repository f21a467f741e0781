//! The `sync` command.

use std::path::Path;

use coursesync_providers::HttpFeedFetcher;

use crate::cli::SyncArgs;
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::sync::{SyncReport, Syncer};

/// Runs a sync pass and prints its summary.
///
/// `config_path` is the file `config` was loaded from, used in hints.
pub async fn run(config: &ClientConfig, config_path: &Path, args: &SyncArgs) -> ClientResult<()> {
    let sync_config = config.sync_config(&args.sources)?;
    if sync_config.sources.is_empty() {
        return Err(ClientError::Config(format!(
            "no sources configured, add a [[sources]] entry to {}",
            config_path.display()
        )));
    }

    let fetcher = HttpFeedFetcher::new(config.feed_timeout())?;

    let report = if args.dry_run {
        Syncer::new(sync_config, &fetcher, None)?.run().await
    } else {
        write_to_calendar(config, config_path, sync_config, &fetcher).await?
    };

    println!();
    println!("{}", report);
    for failure in &report.failures {
        println!(
            "  {} / {}: {} failed: {}",
            failure.source, failure.title, failure.stage, failure.message
        );
    }

    if let Some(reason) = &report.aborted {
        return Err(ClientError::AuthRequired(format!(
            "{}, run 'coursesync auth google' and sync again",
            reason
        )));
    }
    if args.fail_on_error && report.has_failures() {
        return Err(ClientError::SyncFailed(
            report.failures.len() + report.skipped_sources(),
        ));
    }
    Ok(())
}

#[cfg(feature = "google")]
async fn write_to_calendar(
    config: &ClientConfig,
    config_path: &Path,
    sync_config: crate::sync::SyncConfig,
    fetcher: &HttpFeedFetcher,
) -> ClientResult<SyncReport> {
    let calendar = super::google_calendar(config, config_path)?;
    Ok(Syncer::new(sync_config, fetcher, Some(&calendar))?.run().await)
}

#[cfg(not(feature = "google"))]
async fn write_to_calendar(
    _config: &ClientConfig,
    _config_path: &Path,
    _sync_config: crate::sync::SyncConfig,
    _fetcher: &HttpFeedFetcher,
) -> ClientResult<SyncReport> {
    Err(ClientError::Config(
        "built without a calendar backend, only --dry-run is available".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use coursesync_core::CalendarSource;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[tokio::test]
    async fn empty_source_list_is_a_config_error() {
        let config_path = Path::new("/tmp/coursesync-test/custom.toml");
        let err = run(&ClientConfig::default(), config_path, &SyncArgs::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Config(_)));
        assert!(err.to_string().contains("/tmp/coursesync-test/custom.toml"));
    }

    #[tokio::test]
    async fn fail_on_error_turns_skipped_source_into_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let config = ClientConfig {
            sources: vec![CalendarSource::new("Teams", format!("{}/feed.ics", server.uri()))],
            pacing_ms: 0,
            ..Default::default()
        };

        let lenient = SyncArgs {
            dry_run: true,
            ..Default::default()
        };
        assert!(run(&config, Path::new("config.toml"), &lenient).await.is_ok());

        let strict = SyncArgs {
            dry_run: true,
            fail_on_error: true,
            ..Default::default()
        };
        assert!(matches!(
            run(&config, Path::new("config.toml"), &strict).await,
            Err(ClientError::SyncFailed(1))
        ));
    }
}
