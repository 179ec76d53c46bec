use thiserror::Error;

use super::launcher::LaunchError;
use super::status::StatusError;
use crate::config::{ConfigError, PlatformError};

/// Failures that abort the boot sequence.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Platform environment is incomplete: {0}")]
    Platform(#[from] PlatformError),

    #[error("Cannot record proxy state: {0}")]
    Status(#[from] StatusError),

    #[error(transparent)]
    Launch(#[from] LaunchError),
}

pub type Result<T> = std::result::Result<T, StartupError>;
