//! CLI subcommands
//!
//! Each subcommand loads the configuration exactly as the gateway does at
//! startup and then reports on it.

pub mod check;
pub mod show;

use crate::{ConfigLoader, Settings, error::format_error};
use anyhow::Result;
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize logging to stderr
///
/// Precedence:
/// 1. CLI --verbose flag -> debug level
/// 2. RUST_LOG environment variable
/// 3. Default: warn
pub fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Resolve the config file and load settings
///
/// Config path: CLI arg > OPTOLINK_CONFIG > default location.
pub fn load_settings(config: Option<&str>) -> Result<Settings> {
    let config_path = match config {
        Some(config) => Some(PathBuf::from(config)),
        None => ConfigLoader::get_config_path(),
    };

    ConfigLoader::new()
        .load(config_path.as_deref())
        .map_err(|e| anyhow::anyhow!(format_error(&e)))
}
