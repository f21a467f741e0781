//! Client configuration.
//!
//! All settings live in a single `config.toml`, by default at
//! `~/.config/coursesync/config.toml`:
//!
//! ```toml
//! timezone = "America/Chicago"
//! calendar_id = "primary"
//!
//! [[sources]]
//! name = "eLearning"
//! url = "https://elearning.example.edu/calendar.ics"
//!
//! [colors]
//! CS = "9"
//!
//! [google]
//! client_id = "env::GOOGLE_CLIENT_ID"
//! client_secret = "pass::google/coursesync"
//! ```
//!
//! Credential values support secret references, see [`crate::secret`].

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono_tz::Tz;
use coursesync_core::{CalendarSource, DEFAULT_SUBJECTS};
use coursesync_providers::RetryPolicy;
use coursesync_providers::retry::DEFAULT_BASE_DELAY;
use serde::{Deserialize, Serialize};

use crate::error::{ClientError, ClientResult};
use crate::sync::SyncConfig;

/// Default destination timezone.
pub const DEFAULT_TIMEZONE: &str = "America/Chicago";

/// Default pause between calendar writes, in milliseconds.
pub const DEFAULT_PACING_MS: u64 = 200;

/// Configuration for the coursesync client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Feeds to pull from, in sync order.
    pub sources: Vec<CalendarSource>,

    /// IANA timezone events are written in.
    pub timezone: String,

    /// Subject abbreviations recognised in course tags.
    pub subjects: Vec<String>,

    /// Destination calendar.
    pub calendar_id: String,

    /// Minimum pause between calendar writes, in milliseconds. `0` disables pacing.
    pub pacing_ms: u64,

    /// Retries for transient calendar write failures.
    pub max_retries: u32,

    /// Feed download timeout, in seconds.
    pub feed_timeout_secs: u64,

    /// Subject to Google color id ("1" to "11").
    pub colors: BTreeMap<String, String>,

    /// Google Calendar settings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub google: Option<GoogleSettings>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            sources: Vec::new(),
            timezone: DEFAULT_TIMEZONE.to_string(),
            subjects: DEFAULT_SUBJECTS.iter().map(|s| s.to_string()).collect(),
            calendar_id: "primary".to_string(),
            pacing_ms: DEFAULT_PACING_MS,
            max_retries: coursesync_providers::retry::DEFAULT_MAX_RETRIES,
            feed_timeout_secs: 30,
            colors: BTreeMap::new(),
            google: None,
        }
    }
}

impl ClientConfig {
    /// Loads `path`, or the default file when `path` is `None`.
    ///
    /// A missing default file yields the defaults; a missing explicit file
    /// is an error.
    pub fn load(path: Option<&Path>) -> ClientResult<Self> {
        match path {
            Some(path) => Self::load_from(path),
            None => {
                let path = Self::default_path();
                if path.exists() {
                    Self::load_from(&path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> ClientResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ClientError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        toml::from_str(&content).map_err(|e| {
            ClientError::Config(format!("failed to parse {}: {}", path.display(), e))
        })
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        Self::default_config_dir().join("config.toml")
    }

    /// Returns the default configuration directory.
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("coursesync")
    }

    /// Parses the configured timezone.
    pub fn timezone(&self) -> ClientResult<Tz> {
        self.timezone.parse::<Tz>().map_err(|_| {
            ClientError::Config(format!("unknown timezone '{}'", self.timezone))
        })
    }

    /// Checks everything that can be checked without network access.
    pub fn validate(&self) -> ClientResult<()> {
        self.timezone()?;

        if self.calendar_id.trim().is_empty() {
            return Err(ClientError::Config("calendar_id must not be empty".to_string()));
        }

        let mut names = std::collections::HashSet::new();
        for source in &self.sources {
            if source.name.trim().is_empty() {
                return Err(ClientError::Config(format!(
                    "source with url '{}' has no name",
                    source.url
                )));
            }
            if !names.insert(source.name.as_str()) {
                return Err(ClientError::Config(format!(
                    "duplicate source name '{}'",
                    source.name
                )));
            }
            feed_url(&source.url).map_err(|e| {
                ClientError::Config(format!("source '{}': {}", source.name, e))
            })?;
        }

        for (subject, color) in &self.colors {
            let valid = color.parse::<u8>().is_ok_and(|c| (1..=11).contains(&c));
            if !valid {
                return Err(ClientError::Config(format!(
                    "color for '{}' must be a Google color id from 1 to 11, got '{}'",
                    subject, color
                )));
            }
        }

        coursesync_core::CourseTagExtractor::new(&self.subjects)?;
        Ok(())
    }

    /// Builds the sync settings, keeping only sources named in `only` when it is non-empty.
    pub fn sync_config(&self, only: &[String]) -> ClientResult<SyncConfig> {
        self.validate()?;

        let sources = self
            .sources
            .iter()
            .filter(|s| only.is_empty() || only.iter().any(|name| name == &s.name))
            .map(|s| Ok(CalendarSource::new(&s.name, feed_url(&s.url)?.to_string())))
            .collect::<Result<Vec<_>, String>>()
            .map_err(ClientError::Config)?;

        if let Some(unknown) = only
            .iter()
            .find(|name| !self.sources.iter().any(|s| &s.name == *name))
        {
            return Err(ClientError::Config(format!("no source named '{}'", unknown)));
        }

        Ok(SyncConfig {
            sources,
            calendar_id: self.calendar_id.clone(),
            timezone: self.timezone()?,
            subjects: self.subjects.clone(),
            colors: self
                .colors
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect::<HashMap<_, _>>(),
            pacing: Duration::from_millis(self.pacing_ms),
            retry: RetryPolicy::new(self.max_retries, DEFAULT_BASE_DELAY),
        })
    }

    /// Feed download timeout.
    pub fn feed_timeout(&self) -> Duration {
        Duration::from_secs(self.feed_timeout_secs)
    }
}

/// Parses a feed URL, mapping `webcal://` to `https://`.
fn feed_url(raw: &str) -> Result<url::Url, String> {
    let raw = raw.trim();
    let normalized = match raw.strip_prefix("webcal://") {
        Some(rest) => format!("https://{}", rest),
        None => raw.to_string(),
    };
    let url = url::Url::parse(&normalized).map_err(|e| format!("invalid url '{}': {}", raw, e))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(format!("unsupported url scheme '{}'", other)),
    }
}

/// Google Calendar settings.
///
/// `client_id` and `client_secret` support secret references (`pass::…`, `env::…`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct GoogleSettings {
    /// OAuth client ID.
    pub client_id: Option<String>,

    /// OAuth client secret.
    pub client_secret: Option<String>,

    /// Account label; selects the default token file.
    pub account: Option<String>,

    /// Token file location.
    pub token_path: Option<PathBuf>,
}

impl GoogleSettings {
    /// Builds the Google client configuration, resolving secret references.
    #[cfg(feature = "google")]
    pub fn to_provider_config(&self) -> Result<coursesync_providers::google::GoogleConfig, String> {
        use coursesync_providers::google::GoogleConfig;

        let credentials = self.resolve_credentials()?;
        credentials.validate().map_err(|e| e.to_string())?;

        let mut config = GoogleConfig::new(credentials);
        if let Some(account) = &self.account {
            config = config.with_account_name(account);
        }
        if let Some(path) = &self.token_path {
            config = config.with_token_path(path);
        }
        Ok(config)
    }

    /// Resolves the client id and secret.
    #[cfg(feature = "google")]
    pub(crate) fn resolve_credentials(
        &self,
    ) -> Result<coursesync_providers::google::OAuthCredentials, String> {
        use coursesync_providers::google::OAuthCredentials;

        let raw_id = self.client_id.as_deref().ok_or_else(|| {
            "Google credentials not found. Add to the config file:\n  \
             [google]\n  \
             client_id = \"YOUR_ID.apps.googleusercontent.com\"\n  \
             client_secret = \"YOUR_SECRET\"\n\n  \
             Or run: coursesync auth google --credentials-file <path>"
                .to_string()
        })?;
        let raw_secret = self
            .client_secret
            .as_deref()
            .ok_or_else(|| "client_secret is missing from the [google] table".to_string())?;

        let client_id = crate::secret::resolve(raw_id)
            .map_err(|e| format!("failed to resolve client_id: {}", e))?;
        let client_secret = crate::secret::resolve(raw_secret)
            .map_err(|e| format!("failed to resolve client_secret: {}", e))?;

        Ok(OAuthCredentials::new(client_id, client_secret))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = r#"
timezone = "America/New_York"
calendar_id = "school@group.calendar.google.com"
pacing_ms = 0
max_retries = 4
subjects = ["CS", "EE"]

[[sources]]
name = "eLearning"
url = "https://elearning.example.edu/feed.ics"

[[sources]]
name = "Teams"
url = "webcal://outlook.example.com/owa/calendar.ics"

[colors]
CS = "9"

[google]
client_id = "toml-id.apps.googleusercontent.com"
client_secret = "toml-secret"
account = "school"
"#;

    #[test]
    fn defaults() {
        let config: ClientConfig = toml::from_str("").unwrap();
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.timezone, "America/Chicago");
        assert_eq!(config.calendar_id, "primary");
        assert_eq!(config.pacing_ms, 200);
        assert_eq!(config.max_retries, 2);
        assert_eq!(config.subjects.len(), 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn parses_full_file() {
        let config: ClientConfig = toml::from_str(FULL).unwrap();
        assert_eq!(config.sources.len(), 2);
        assert_eq!(config.sources[1].name, "Teams");
        assert_eq!(config.colors.get("CS").map(String::as_str), Some("9"));
        assert_eq!(config.google.as_ref().unwrap().account.as_deref(), Some("school"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn sync_config_is_built_from_file() {
        let config: ClientConfig = toml::from_str(FULL).unwrap();
        let sync = config.sync_config(&[]).unwrap();

        assert_eq!(sync.timezone, chrono_tz::America::New_York);
        assert_eq!(sync.calendar_id, "school@group.calendar.google.com");
        assert_eq!(sync.pacing, Duration::ZERO);
        assert_eq!(sync.retry.max_retries(), 4);
        assert_eq!(sync.sources[1].url, "https://outlook.example.com/owa/calendar.ics");
    }

    #[test]
    fn sync_config_filters_sources() {
        let config: ClientConfig = toml::from_str(FULL).unwrap();
        let sync = config.sync_config(&["Teams".to_string()]).unwrap();
        assert_eq!(sync.sources.len(), 1);
        assert_eq!(sync.sources[0].name, "Teams");

        assert!(config.sync_config(&["Canvas".to_string()]).is_err());
    }

    #[test]
    fn rejects_unknown_timezone() {
        let config = ClientConfig {
            timezone: "Central Standard Time".to_string(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ClientError::Config(_))));
    }

    #[test]
    fn rejects_bad_sources() {
        let mut config = ClientConfig::default();
        config.sources = vec![CalendarSource::new("A", "ftp://example.com/a.ics")];
        assert!(config.validate().is_err());

        config.sources = vec![CalendarSource::new("", "https://example.com/a.ics")];
        assert!(config.validate().is_err());

        config.sources = vec![
            CalendarSource::new("A", "https://example.com/a.ics"),
            CalendarSource::new("A", "https://example.com/b.ics"),
        ];
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_bad_colors() {
        let mut config = ClientConfig::default();
        config.colors.insert("CS".to_string(), "12".to_string());
        assert!(config.validate().is_err());
        config.colors.insert("CS".to_string(), "blue".to_string());
        assert!(config.validate().is_err());
        config.colors.insert("CS".to_string(), "11".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn load_missing_explicit_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert!(ClientConfig::load(Some(&dir.path().join("missing.toml"))).is_err());
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, FULL).unwrap();
        let config = ClientConfig::load(Some(&path)).unwrap();
        assert_eq!(config.timezone, "America/New_York");
    }

    #[test]
    #[cfg(feature = "google")]
    fn resolve_credentials_plain_text() {
        let settings = GoogleSettings {
            client_id: Some("test-id.apps.googleusercontent.com".to_string()),
            client_secret: Some("test-secret".to_string()),
            ..Default::default()
        };
        let creds = settings.resolve_credentials().unwrap();
        assert_eq!(creds.client_id, "test-id.apps.googleusercontent.com");
        assert_eq!(creds.client_secret, "test-secret");
    }

    #[test]
    #[cfg(feature = "google")]
    fn resolve_credentials_env_reference() {
        unsafe {
            std::env::set_var("_CS_TEST_CLIENT_ID", "env-id.apps.googleusercontent.com");
            std::env::set_var("_CS_TEST_CLIENT_SECRET", "env-secret");
        }
        let settings = GoogleSettings {
            client_id: Some("env::_CS_TEST_CLIENT_ID".to_string()),
            client_secret: Some("env::_CS_TEST_CLIENT_SECRET".to_string()),
            ..Default::default()
        };
        let creds = settings.resolve_credentials().unwrap();
        assert_eq!(creds.client_id, "env-id.apps.googleusercontent.com");
        assert_eq!(creds.client_secret, "env-secret");
        unsafe {
            std::env::remove_var("_CS_TEST_CLIENT_ID");
            std::env::remove_var("_CS_TEST_CLIENT_SECRET");
        }
    }

    #[test]
    #[cfg(feature = "google")]
    fn resolve_credentials_missing_values() {
        let only_secret = GoogleSettings {
            client_secret: Some("secret".to_string()),
            ..Default::default()
        };
        assert!(only_secret.resolve_credentials().unwrap_err().contains("credentials not found"));

        let only_id = GoogleSettings {
            client_id: Some("id.apps.googleusercontent.com".to_string()),
            ..Default::default()
        };
        assert!(only_id.resolve_credentials().unwrap_err().contains("client_secret"));
    }

    #[test]
    #[cfg(feature = "google")]
    fn provider_config_uses_account_and_token_path() {
        let settings = GoogleSettings {
            client_id: Some("test.apps.googleusercontent.com".to_string()),
            client_secret: Some("secret".to_string()),
            account: Some("school".to_string()),
            token_path: Some(PathBuf::from("/tmp/cs-token.json")),
        };
        let config = settings.to_provider_config().unwrap();
        assert_eq!(config.provider_name(), "google:school");
        assert_eq!(config.token_path, PathBuf::from("/tmp/cs-token.json"));
    }
}
