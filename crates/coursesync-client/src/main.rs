//! coursesync CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use tracing::error;

use coursesync_client::cli::{AuthProvider, Cli, Command, ConfigAction, SyncArgs};
use coursesync_client::commands;
use coursesync_client::config::ClientConfig;
use coursesync_client::error::{ClientError, ClientResult};
use coursesync_core::init_tracing;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_tracing(cli.tracing_config()) {
        eprintln!("warning: {}", e);
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(ClientError::SyncFailed(count)) => {
            error!(failures = count, "sync finished with failures");
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> ClientResult<()> {
    let config = ClientConfig::load(cli.config.as_deref())?;
    let config_path = cli.config.clone().unwrap_or_else(ClientConfig::default_path);

    match cli.command {
        None => commands::sync::run(&config, &config_path, &SyncArgs::default()).await,
        Some(Command::Sync(args)) => commands::sync::run(&config, &config_path, &args).await,
        Some(Command::Auth { provider }) => match provider {
            #[cfg(feature = "google")]
            AuthProvider::Google {
                client_id,
                client_secret,
                credentials_file,
                force,
            } => {
                commands::auth::google(
                    client_id,
                    client_secret,
                    credentials_file,
                    force,
                    &config,
                    &config_path,
                )
                .await
            }
        },
        #[cfg(feature = "google")]
        Some(Command::Calendars) => commands::calendars::list(&config, &config_path).await,
        Some(Command::Config { action }) => match action {
            ConfigAction::Dump => commands::config::dump(&config, &config_path),
            ConfigAction::Validate => commands::config::validate(&config, &config_path),
            ConfigAction::Path => commands::config::path(&config_path),
        },
    }
}
