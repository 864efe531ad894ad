//! Upload command - Send one file to the hub's storage
//!
//! Provides the `hubfile upload` CLI command which:
//! 1. Validates the hub configuration
//! 2. Wires the hub adapters into the upload use case
//! 3. Waits for the session to finish and prints its report

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use hubfile_core::config::Config;
use hubfile_core::usecases::{UploadTimeouts, UploadToBlobUseCase};
use hubfile_iothub::client::HubClient;
use hubfile_iothub::credential::HubCredentialClient;
use hubfile_iothub::notify::HubNotifyClient;
use hubfile_iothub::storage::HttpBlobUploader;
use tracing::{debug, info};

use crate::output::{get_formatter, OutputFormat};

/// Upload a file to blob storage through the hub
#[derive(Debug, Args)]
pub struct UploadCommand {
    /// File to upload
    pub file: PathBuf,

    /// Destination blob name (defaults to the file name)
    #[arg(long)]
    pub blob_name: Option<String>,
}

impl UploadCommand {
    /// Execute the upload command
    pub async fn execute(&self, format: OutputFormat, config: &Config) -> Result<ExitCode> {
        let formatter = get_formatter(format);

        let errors = config.validate();
        if !errors.is_empty() {
            formatter.error("Configuration is invalid; run 'hubfile config show' for details");
            for error in &errors {
                formatter.info(&format!("  {} - {}", error.field, error.message));
            }
            return Ok(ExitCode::FAILURE);
        }

        let blob_name = match &self.blob_name {
            Some(name) => name.clone(),
            None => default_blob_name(&self.file)?,
        };

        let client = Arc::new(HubClient::from_config(&config.hub));
        let use_case = UploadToBlobUseCase::new(
            Arc::new(HubCredentialClient::new(client.clone())),
            Arc::new(HttpBlobUploader::new()),
            Arc::new(HubNotifyClient::new(client)),
        )
        .with_timeouts(UploadTimeouts::from(&config.upload));

        info!(file = %self.file.display(), blob_name = %blob_name, "Starting upload");

        let ticket = use_case
            .upload_file_to_blob(
                &blob_name,
                &self.file,
                |report, ()| {
                    debug!(
                        session_id = %report.session_id(),
                        success = report.success(),
                        "Completion callback fired"
                    );
                },
                (),
            )
            .with_context(|| format!("Cannot upload {}", self.file.display()))?;

        let report = ticket
            .wait()
            .await
            .context("Upload session ended without a report")?;

        formatter.report(&report);

        Ok(if report.success() {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        })
    }
}

/// The file name component of `path`
fn default_blob_name(path: &Path) -> Result<String> {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .with_context(|| format!("{} has no file name; pass --blob-name", path.display()))
}
