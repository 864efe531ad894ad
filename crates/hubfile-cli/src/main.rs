//! hubfile CLI - Command-line interface for hubfile
//!
//! Provides commands for:
//! - Uploading a file to blob storage through the IoT hub
//! - Inspecting the effective configuration

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::warn;
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

use commands::{config::ConfigCommand, upload::UploadCommand};
use output::OutputFormat;

#[derive(Debug, Parser)]
#[command(name = "hubfile", version, about = "Upload device files through an IoT hub")]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Verbose output (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Use alternate config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Upload a file to blob storage
    Upload(UploadCommand),
    /// View configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

/// Log filter for the given `-v` count, falling back to the configured level
fn log_filter(verbose: u8, configured: &str) -> &str {
    match verbose {
        0 => configured,
        1 => "debug",
        _ => "trace",
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let loaded = commands::load_config(cli.config.as_deref())?;

    // Setup tracing
    let filter = log_filter(cli.verbose, &loaded.config.logging.level);
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Some(reason) = &loaded.fallback_reason {
        warn!(
            config_path = %loaded.path.display(),
            error = %reason,
            "Ignoring unreadable configuration file, using defaults"
        );
    }

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Human
    };

    match cli.command {
        Commands::Upload(cmd) => cmd.execute(format, &loaded.config).await,
        Commands::Config(cmd) => cmd.execute(format, &loaded.path, &loaded.config).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_upload_with_defaults() {
        let cli = Cli::try_parse_from(["hubfile", "upload", "data.bin"]).unwrap();
        assert!(!cli.json);
        assert_eq!(cli.verbose, 0);
        match cli.command {
            Commands::Upload(cmd) => {
                assert_eq!(cmd.file, PathBuf::from("data.bin"));
                assert!(cmd.blob_name.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "hubfile",
            "upload",
            "data.bin",
            "--blob-name",
            "logs/data.bin",
            "--json",
            "-vv",
            "--config",
            "/etc/hubfile.yaml",
        ])
        .unwrap();
        assert!(cli.json);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.config, Some(PathBuf::from("/etc/hubfile.yaml")));
        match cli.command {
            Commands::Upload(cmd) => assert_eq!(cmd.blob_name.as_deref(), Some("logs/data.bin")),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_config_show() {
        let cli = Cli::try_parse_from(["hubfile", "config", "show"]).unwrap();
        assert!(matches!(cli.command, Commands::Config(ConfigCommand::Show)));
    }

    #[test]
    fn test_upload_requires_file() {
        assert!(Cli::try_parse_from(["hubfile", "upload"]).is_err());
    }

    #[test]
    fn test_log_filter() {
        assert_eq!(log_filter(0, "warn"), "warn");
        assert_eq!(log_filter(1, "warn"), "debug");
        assert_eq!(log_filter(3, "warn"), "trace");
    }
}
