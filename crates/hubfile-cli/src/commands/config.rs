//! Config command - View the hubfile configuration

use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Subcommand;
use hubfile_core::config::Config;
use tracing::info;

use crate::output::{get_formatter, OutputFormat};

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Display the effective configuration and any validation errors
    Show,
}

impl ConfigCommand {
    /// Execute the config command
    pub async fn execute(
        &self,
        format: OutputFormat,
        config_path: &Path,
        config: &Config,
    ) -> Result<ExitCode> {
        match self {
            ConfigCommand::Show => self.execute_show(format, config_path, config).await,
        }
    }

    async fn execute_show(
        &self,
        format: OutputFormat,
        config_path: &Path,
        config: &Config,
    ) -> Result<ExitCode> {
        let formatter = get_formatter(format);
        let shown = redacted(config);
        let errors = config.validate();

        info!(config_path = %config_path.display(), "Showing configuration");

        if matches!(format, OutputFormat::Json) {
            let error_strings: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            let json = serde_json::json!({
                "config_path": config_path.display().to_string(),
                "config": serde_json::to_value(&shown)
                    .context("Failed to serialize configuration to JSON")?,
                "valid": errors.is_empty(),
                "errors": error_strings,
            });
            formatter.print_json(&json);
        } else {
            formatter.success(&format!("Configuration ({})", config_path.display()));
            formatter.info("");

            let yaml = serde_yaml::to_string(&shown)
                .context("Failed to serialize configuration to YAML")?;
            for line in yaml.lines() {
                formatter.info(line);
            }

            if !errors.is_empty() {
                formatter.info("");
                formatter.error(&format!(
                    "Configuration has {} error{}:",
                    errors.len(),
                    if errors.len() == 1 { "" } else { "s" }
                ));
                for error in &errors {
                    formatter.info(&format!("  {} - {}", error.field, error.message));
                }
            }
        }

        Ok(if errors.is_empty() {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        })
    }
}

/// Copy of `config` with the device SAS token masked
fn redacted(config: &Config) -> Config {
    let mut shown = config.clone();
    if shown.hub.sas_token.is_some() {
        shown.hub.sas_token = Some("<redacted>".to_string());
    }
    shown
}
