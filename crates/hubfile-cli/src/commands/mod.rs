//! CLI subcommands

pub mod config;
pub mod upload;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use hubfile_core::config::Config;

/// Configuration the subcommands run with, and where it came from
#[derive(Debug)]
pub struct LoadedConfig {
    pub path: PathBuf,
    pub config: Config,
    /// Why the file at `path` was ignored in favour of defaults
    pub fallback_reason: Option<String>,
}

/// Loads the configuration the subcommands run with
///
/// An explicit `--config` path must exist and parse. Without one, the
/// default location is tried and defaults are used if it is missing or
/// unreadable.
pub fn load_config(explicit: Option<&Path>) -> Result<LoadedConfig> {
    match explicit {
        Some(path) => {
            let config = Config::load(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
            Ok(LoadedConfig {
                path: path.to_path_buf(),
                config,
                fallback_reason: None,
            })
        }
        None => Ok(load_or_default(Config::default_path())),
    }
}

/// Loads `path`, falling back to defaults and recording why
///
/// A missing file is the normal first-run case and records nothing.
fn load_or_default(path: PathBuf) -> LoadedConfig {
    if !path.exists() {
        return LoadedConfig {
            path,
            config: Config::default(),
            fallback_reason: None,
        };
    }

    match Config::load(&path) {
        Ok(config) => LoadedConfig {
            path,
            config,
            fallback_reason: None,
        },
        Err(e) => LoadedConfig {
            fallback_reason: Some(format!("{e:#}")),
            path,
            config: Config::default(),
        },
    }
}
