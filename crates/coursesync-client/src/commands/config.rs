//! The `config` command.

use std::path::Path;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::secret;

/// Prints the effective configuration as TOML, with secrets redacted.
pub fn dump(config: &ClientConfig, config_path: &Path) -> ClientResult<()> {
    let toml_str = toml::to_string_pretty(&redacted(config))
        .map_err(|e| ClientError::Config(format!("failed to serialize config: {}", e)))?;
    println!("# config.toml ({})", config_path.display());
    println!("{}", toml_str);
    Ok(())
}

fn redacted(config: &ClientConfig) -> ClientConfig {
    let mut config = config.clone();
    if let Some(google) = config.google.as_mut() {
        google.client_secret = google.client_secret.as_deref().map(secret::redact);
    }
    config
}

/// Validates the configuration without touching the network.
pub fn validate(config: &ClientConfig, config_path: &Path) -> ClientResult<()> {
    config.validate()?;

    #[cfg(feature = "google")]
    if let Some(ref google) = config.google
        && (google.client_id.is_some() || google.client_secret.is_some())
    {
        google.to_provider_config().map_err(|e| {
            ClientError::Config(format!(
                "invalid Google credentials in {}: {}",
                config_path.display(),
                e
            ))
        })?;
        println!("Google credentials are valid.");
    }

    if config.sources.is_empty() {
        println!("No sources configured in {}.", config_path.display());
    }
    println!(
        "Configuration is valid: {} source(s), timezone {}, calendar {}.",
        config.sources.len(),
        config.timezone,
        config.calendar_id
    );
    Ok(())
}

/// Prints the configuration file path.
pub fn path(config_path: &Path) -> ClientResult<()> {
    println!("config: {}", config_path.display());
    Ok(())
}
