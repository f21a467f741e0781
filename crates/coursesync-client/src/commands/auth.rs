//! The `auth` command.

use std::path::{Path, PathBuf};

use coursesync_providers::CalendarClient;
use coursesync_providers::google::{GoogleCalendar, OAuthCredentials};
use tracing::{info, warn};

use crate::config::{ClientConfig, GoogleSettings};
use crate::error::{ClientError, ClientResult};

/// Authorizes coursesync to write to Google Calendar.
///
/// Credentials come from CLI flags, a `--credentials-file`, or the
/// `[google]` table of `config_path`. Credentials given on the command line
/// are written back to `config_path` so later syncs find them.
pub async fn google(
    client_id: Option<String>,
    client_secret: Option<String>,
    credentials_file: Option<PathBuf>,
    force: bool,
    config: &ClientConfig,
    config_path: &Path,
) -> ClientResult<()> {
    let (final_client_id, final_client_secret, source) = resolve_google_credentials(
        client_id,
        client_secret,
        credentials_file,
        config.google.as_ref(),
        config_path,
    )?;

    let settings = GoogleSettings {
        client_id: Some(final_client_id.clone()),
        client_secret: Some(final_client_secret.clone()),
        ..config.google.clone().unwrap_or_default()
    };
    let google_config = settings.to_provider_config().map_err(|e| {
        ClientError::Config(format!("invalid Google credentials: {}", e))
    })?;
    let calendar = GoogleCalendar::new(google_config)?;

    if calendar.is_authenticated() && !calendar.needs_reauth() && !force {
        save_credentials_to_config(config_path, &final_client_id, &final_client_secret, source);
        println!("Already authorized with Google Calendar.");
        println!("Use --force to authorize again.");
        return Ok(());
    }

    println!("Starting Google Calendar authorization...");
    println!();
    println!("A browser window will open for you to grant access.");
    println!("If the browser doesn't open, copy the URL printed below.");
    println!();

    calendar.authorize().await?;
    save_credentials_to_config(config_path, &final_client_id, &final_client_secret, source);

    let calendars = calendar.list_calendars().await?;
    info!(calendars = calendars.len(), "Google authorization verified");

    let target_visible = config.calendar_id == "primary"
        || calendars.iter().any(|c| c.id == config.calendar_id);
    if !target_visible {
        warn!(calendar_id = %config.calendar_id, "configured calendar_id is not visible to this account");
    }

    println!();
    println!("Authorization successful!");
    println!("{} calendar(s) visible to this account.", calendars.len());
    println!("Run 'coursesync calendars' to pick a calendar_id, then 'coursesync sync'.");

    Ok(())
}

/// Where the credentials were resolved from.
#[derive(Debug, Clone, Copy, PartialEq)]
enum CredentialSource {
    /// From CLI flags or --credentials-file
    Cli,
    /// From config.toml, already persisted
    Config,
}

/// Writes credentials to the `[google]` table of `config_path`.
///
/// Only credentials from the command line are written, the rest of the
/// file is kept as is. Failures are logged, not returned: the token is
/// already stored at this point.
fn save_credentials_to_config(
    config_path: &Path,
    client_id: &str,
    client_secret: &str,
    source: CredentialSource,
) {
    if source == CredentialSource::Config {
        return;
    }

    match write_google_table(config_path, client_id, client_secret) {
        Ok(()) => {
            info!(path = %config_path.display(), "credentials saved");
            println!("Credentials saved to {}", config_path.display());
        }
        Err(e) => warn!(
            path = %config_path.display(),
            "could not save credentials: {}", e
        ),
    }
}

fn write_google_table(config_path: &Path, client_id: &str, client_secret: &str) -> ClientResult<()> {
    let content = if config_path.exists() {
        std::fs::read_to_string(config_path)?
    } else {
        String::new()
    };

    let mut doc = content.parse::<toml_edit::DocumentMut>().map_err(|e| {
        ClientError::Config(format!("could not parse {}: {}", config_path.display(), e))
    })?;

    if !doc.contains_key("google") {
        doc["google"] = toml_edit::Item::Table(toml_edit::Table::new());
    }
    let google = doc["google"].as_table_mut().ok_or_else(|| {
        ClientError::Config(format!("'google' in {} is not a table", config_path.display()))
    })?;
    google["client_id"] = toml_edit::value(client_id);
    google["client_secret"] = toml_edit::value(client_secret);

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(config_path, doc.to_string())?;
    Ok(())
}

/// Resolves Google credentials.
///
/// Priority (highest to lowest):
/// 1. `--client-id` + `--client-secret`
/// 2. `--credentials-file` (Google Cloud Console JSON)
/// 3. `[google]` in config.toml, with secret references resolved
fn resolve_google_credentials(
    cli_client_id: Option<String>,
    cli_client_secret: Option<String>,
    cli_credentials_file: Option<PathBuf>,
    config_google: Option<&GoogleSettings>,
    config_path: &Path,
) -> ClientResult<(String, String, CredentialSource)> {
    if let (Some(id), Some(secret)) = (&cli_client_id, &cli_client_secret) {
        return Ok((id.clone(), secret.clone(), CredentialSource::Cli));
    }

    if let Some(ref path) = cli_credentials_file {
        let creds = OAuthCredentials::from_file(path).map_err(|e| {
            ClientError::Config(format!(
                "failed to load credentials from {}: {}",
                path.display(),
                e
            ))
        })?;
        return Ok((creds.client_id, creds.client_secret, CredentialSource::Cli));
    }

    if cli_client_id.is_some() || cli_client_secret.is_some() {
        return Err(ClientError::Config(
            "both --client-id and --client-secret are required when providing credentials directly"
                .to_string(),
        ));
    }

    if let Some(google) = config_google
        && google.client_id.is_some()
        && google.client_secret.is_some()
    {
        let creds = google.resolve_credentials().map_err(|e| {
            ClientError::Config(format!(
                "failed to resolve Google credentials from config: {}",
                e
            ))
        })?;
        return Ok((creds.client_id, creds.client_secret, CredentialSource::Config));
    }

    Err(ClientError::Config(format!(
        "Google credentials are required. Provide via:\n  \
         - client_id + client_secret in the [google] table of {}\n  \
         - --client-id and --client-secret flags\n  \
         - --credentials-file flag (path to Google Cloud Console JSON)\n  \
         - GOOGLE_CLIENT_ID and GOOGLE_CLIENT_SECRET env vars",
        config_path.display()
    )))
}
