//! Configuration management for appmgmt
//!
//! This module provides a layered configuration system that loads settings from:
//! 1. Default values (embedded in structs)
//! 2. TOML configuration file
//! 3. Environment variables (highest priority)
//!
//! Platform inputs (`BLUEMIX_APP_MGMT_ENABLE`, `VCAP_APPLICATION`, `PORT`) are
//! captured separately in [`PlatformEnv`].
//!
//! # Usage
//!
//! ```no_run
//! use appmgmt::config::{Config, PlatformEnv};
//!
//! let config = Config::load().expect("Failed to load configuration");
//! let platform = PlatformEnv::from_env();
//! println!("Handlers directory: {}", config.layout.handlers_path().display());
//! ```
//!
//! # Environment Variables
//!
//! Configuration can be overridden using environment variables with the pattern:
//! `APPMGMT__<section>__<key>`
//!
//! Examples:
//! - `APPMGMT__LAYOUT__APP_DIR=/home/vcap/app`
//! - `APPMGMT__LAUNCH__SHELL=/bin/bash`
//!
//! # Configuration File
//!
//! By default, the configuration is loaded from
//! `/home/vcap/app/.app-management/appmgmt.toml`.
//! This can be overridden using the `APPMGMT_CONFIG` environment variable.

mod models;
mod platform;
mod sources;
mod validation;

pub use models::{Config, LaunchConfig, LayoutConfig};
pub use platform::{APPLICATION_VAR, ENABLE_VAR, PORT_VAR, PlatformEnv, PlatformError};
pub use validation::ValidationError;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Configuration validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Failed to render configuration: {0}")]
    Render(#[from] toml::ser::Error),
}

impl Config {
    /// Load configuration from all sources (file + environment)
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables (`APPMGMT__*`)
    /// 2. TOML file (default: `/home/vcap/app/.app-management/appmgmt.toml`)
    /// 3. Default values
    pub fn load() -> Result<Self, ConfigError> {
        let config = sources::load()?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: std::path::PathBuf) -> Result<Self, ConfigError> {
        let config = sources::load_from_sources(path)?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Effective configuration as TOML
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}
