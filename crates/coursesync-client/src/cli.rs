//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use coursesync_core::{TracingConfig, TracingOutputFormat};
use tracing::Level;

/// coursesync - Course feeds into your Google Calendar
#[derive(Debug, Parser)]
#[command(name = "coursesync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, env = "COURSESYNC_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v', global = true)]
    pub debug: bool,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Compact, global = true)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    /// Returns the logging setup for the selected format and verbosity.
    ///
    /// JSON output is meant for scheduled runs and carries timestamps and
    /// targets; the other formats stay terse.
    pub fn tracing_config(&self) -> TracingConfig {
        let level = if self.debug { Level::DEBUG } else { Level::WARN };
        match self.log_format {
            LogFormat::Json => TracingConfig::unattended().with_level(level),
            format if self.debug => TracingConfig::cli_debug().with_format(format.into()),
            format => TracingConfig::cli().with_level(level).with_format(format.into()),
        }
    }
}

/// Log output formats selectable on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Multi-line, human-readable
    Pretty,
    /// One line per event
    Compact,
    /// One JSON object per line
    Json,
}

impl From<LogFormat> for TracingOutputFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Pretty => TracingOutputFormat::Pretty,
            LogFormat::Compact => TracingOutputFormat::Compact,
            LogFormat::Json => TracingOutputFormat::Json,
        }
    }
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sync every configured feed into the destination calendar (default)
    Sync(SyncArgs),

    /// Authentication commands
    Auth {
        #[command(subcommand)]
        provider: AuthProvider,
    },

    /// List the calendars the authorized account can write to
    #[cfg(feature = "google")]
    Calendars,

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Options of the `sync` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct SyncArgs {
    /// Fetch and transform only; print the event bodies instead of writing them
    #[arg(long)]
    pub dry_run: bool,

    /// Exit with a non-zero status if any source or event failed
    #[arg(long)]
    pub fail_on_error: bool,

    /// Only sync the named source (can be repeated)
    #[arg(long = "source", short, action = clap::ArgAction::Append)]
    pub sources: Vec<String>,
}

/// Authentication providers.
#[derive(Debug, Subcommand)]
pub enum AuthProvider {
    /// Authorize access to Google Calendar
    #[cfg(feature = "google")]
    Google {
        /// OAuth client ID (from Google Cloud Console)
        #[arg(long, env = "GOOGLE_CLIENT_ID")]
        client_id: Option<String>,

        /// OAuth client secret (from Google Cloud Console)
        #[arg(long, env = "GOOGLE_CLIENT_SECRET")]
        client_secret: Option<String>,

        /// Path to Google Cloud Console credentials JSON file
        ///
        /// The file downloaded from the OAuth 2.0 credentials page.
        /// Alternative to --client-id and --client-secret.
        #[arg(long, env = "GOOGLE_CREDENTIALS_FILE")]
        credentials_file: Option<PathBuf>,

        /// Authorize again even if a token is already stored
        #[arg(long, short)]
        force: bool,
    },
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Dump current configuration, with secrets redacted
    Dump,

    /// Validate configuration
    Validate,

    /// Show configuration file path
    Path,
}
