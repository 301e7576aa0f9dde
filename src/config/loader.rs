//! Configuration loading utilities
//!
//! Provides helper functions for loading configuration from the environment
//! and an optional file, with proper error handling and validation.

use super::env::{EnvSource, ProcessEnv, vars};
use crate::{Result, config::Settings};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Directory name under the platform config dir
const CONFIG_DIR_NAME: &str = "optolink-splitter";
const CONFIG_FILE_NAME: &str = "config.toml";

/// Configuration loader with multiple source support
#[derive(Debug)]
pub struct ConfigLoader {
    /// Default settings
    defaults: Settings,
}

impl ConfigLoader {
    /// Create new configuration loader
    pub fn new() -> Self {
        Self {
            defaults: Settings::default(),
        }
    }

    /// Get the config file path from OPTOLINK_CONFIG or the default location
    ///
    /// Priority:
    /// 1. OPTOLINK_CONFIG environment variable
    /// 2. ~/.config/optolink-splitter/config.toml (or platform equivalent)
    pub fn get_config_path() -> Option<PathBuf> {
        Self::config_path_from(&ProcessEnv)
    }

    /// Same as [`ConfigLoader::get_config_path`] with an explicit environment
    pub fn config_path_from<E: EnvSource + ?Sized>(env: &E) -> Option<PathBuf> {
        if let Ok(config_path) = env.var(vars::OPTOLINK_CONFIG) {
            let path = PathBuf::from(config_path);
            if path.exists() {
                debug!("Using config file from OPTOLINK_CONFIG: {:?}", path);
                return Some(path);
            } else {
                warn!("OPTOLINK_CONFIG points to non-existent file: {:?}", path);
            }
        }

        if let Some(config_dir) = dirs::config_dir() {
            let default_path = config_dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME);
            if default_path.exists() {
                debug!("Using default config file: {:?}", default_path);
                return Some(default_path);
            }
        }

        debug!("No config file found");
        None
    }

    /// Load configuration with precedence order:
    /// 1. Environment variables (highest priority)
    /// 2. Configuration file, when one is given
    /// 3. Default values (lowest priority)
    pub fn load(&self, config_file: Option<&Path>) -> Result<Settings> {
        self.load_with_env(config_file, &ProcessEnv)
    }

    /// [`ConfigLoader::load`] against an explicit environment
    pub fn load_with_env<E: EnvSource + ?Sized>(
        &self,
        config_file: Option<&Path>,
        env: &E,
    ) -> Result<Settings> {
        let mut settings = self.defaults.clone();

        if let Some(path) = config_file {
            if path.exists() {
                info!("Loading configuration from file: {:?}", path);
                settings = Settings::from_file(path)?;
            } else {
                warn!("Configuration file not found: {:?}, using defaults", path);
            }
        }

        debug!("Applying environment variable overrides");
        settings = settings.merge_with_env(env)?;

        settings.validate()?;

        info!(
            "Configuration loaded: {} poll items, interval {}s",
            settings.polling.items.len(),
            settings.polling.interval
        );
        debug!("Final configuration: {:?}", settings);

        Ok(settings)
    }

    /// Load once and wrap for sharing between the gateway's components
    pub fn load_shared(&self, config_file: Option<&Path>) -> Result<Arc<Settings>> {
        self.load(config_file).map(Arc::new)
    }

    /// Get default configuration
    pub fn defaults(&self) -> &Settings {
        &self.defaults
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
