//! Subcommand implementations.

#[cfg(feature = "google")]
pub mod auth;
#[cfg(feature = "google")]
pub mod calendars;
pub mod config;
pub mod sync;

#[cfg(feature = "google")]
use std::path::Path;

#[cfg(feature = "google")]
use coursesync_providers::google::GoogleCalendar;

#[cfg(feature = "google")]
use crate::config::ClientConfig;
#[cfg(feature = "google")]
use crate::error::{ClientError, ClientResult};

/// Opens the configured Google calendar, requiring a stored authorization.
#[cfg(feature = "google")]
pub(crate) fn google_calendar(
    config: &ClientConfig,
    config_path: &Path,
) -> ClientResult<GoogleCalendar> {
    let settings = config.google.as_ref().ok_or_else(|| {
        ClientError::Config(format!(
            "no [google] section in {}, run 'coursesync auth google' first",
            config_path.display()
        ))
    })?;
    let google_config = settings
        .to_provider_config()
        .map_err(|e| ClientError::Config(format!("{} ({})", e, config_path.display())))?;
    let calendar = GoogleCalendar::new(google_config)?;

    if !calendar.is_authenticated() {
        return Err(ClientError::AuthRequired(
            "no usable Google token, run 'coursesync auth google'".to_string(),
        ));
    }
    Ok(calendar)
}
