//! Fundraiser CLI - command-line access to the fundraising backend

mod commands;
mod config;
mod logging;
mod navigator;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use commands::{CommandContext, Commands};
use std::time::Duration;
use tracing::{Level, error, info};

#[derive(Parser)]
#[command(name = "fundraiser")]
#[command(about = "Sign in, browse campaigns and donate from the terminal")]
#[command(version)]
struct Cli {
    /// Set logging level
    #[arg(short = 'l', long, global = true, default_value = "info")]
    log_level: LogLevel,

    /// Data directory for session, configuration and logs
    #[arg(short = 'd', long, global = true, env = "FUNDRAISER_STATE_DIR")]
    data_dir: Option<std::path::PathBuf>,

    /// Timeout for the whole command in seconds (0 = no timeout)
    #[arg(short = 't', long, global = true, default_value = "30")]
    timeout: u64,

    /// Disable file logging (only log to stderr)
    #[arg(long, global = true)]
    no_file_log: bool,

    /// Backend origin, overriding the configuration file
    #[arg(short = 'u', long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let data_dir = config::resolve_data_dir(cli.data_dir.clone());
    logging::init_logging(cli.log_level.clone().into(), &data_dir, cli.no_file_log)?;

    info!("Starting fundraiser CLI");

    let context = CommandContext {
        data_dir,
        base_url: cli.base_url.clone(),
    };

    // Execute command with optional timeout
    if cli.timeout == 0 {
        match cli.command.execute(context).await {
            Ok(()) => {
                info!("Command completed successfully");
            }
            Err(e) => {
                error!("Command failed: {e:#}");
                std::process::exit(1);
            }
        }
    } else {
        let timeout_duration = Duration::from_secs(cli.timeout);
        match tokio::time::timeout(timeout_duration, cli.command.execute(context)).await {
            Ok(Ok(())) => {
                info!("Command completed successfully");
            }
            Ok(Err(e)) => {
                error!("Command failed: {e:#}");
                std::process::exit(1);
            }
            Err(_) => {
                error!("Command timed out after {} seconds", cli.timeout);
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

#[derive(Clone, Debug, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for Level {
    fn from(log_level: LogLevel) -> Self {
        match log_level {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "fundraiser",
            "status",
            "--base-url",
            "https://example.org",
            "--no-file-log",
        ])
        .unwrap();
        assert_eq!(cli.base_url.as_deref(), Some("https://example.org"));
        assert!(cli.no_file_log);
        assert!(matches!(cli.command, Commands::Status));
    }
}
