//! Platform-supplied inputs, captured once at boot.

use serde::Deserialize;
use std::env;
use thiserror::Error;

pub const ENABLE_VAR: &str = "BLUEMIX_APP_MGMT_ENABLE";
pub const APPLICATION_VAR: &str = "VCAP_APPLICATION";
pub const PORT_VAR: &str = "PORT";

#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("Required environment variable {0} is not set")]
    MissingEnv(&'static str),

    #[error("Environment variable {var} is not a valid application descriptor: {source}")]
    InvalidApplication {
        var: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Snapshot of the environment values the orchestrator consumes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlatformEnv {
    pub enable: Option<String>,
    pub application: Option<String>,
    pub port: Option<String>,
}

/// The subset of the platform application descriptor we read.
#[derive(Debug, Clone, Deserialize)]
struct ApplicationDescriptor {
    instance_index: u32,
}

impl PlatformEnv {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            enable: lookup(ENABLE_VAR),
            application: lookup(APPLICATION_VAR),
            port: lookup(PORT_VAR),
        }
    }

    /// Index of this instance; 0 is the primary.
    pub fn instance_index(&self) -> Result<u32, PlatformError> {
        let raw = self
            .application
            .as_deref()
            .ok_or(PlatformError::MissingEnv(APPLICATION_VAR))?;

        let descriptor: ApplicationDescriptor =
            serde_json::from_str(raw).map_err(|source| PlatformError::InvalidApplication {
                var: APPLICATION_VAR,
                source,
            })?;

        Ok(descriptor.instance_index)
    }

    pub fn port(&self) -> Result<&str, PlatformError> {
        self.port
            .as_deref()
            .filter(|port| !port.trim().is_empty())
            .ok_or(PlatformError::MissingEnv(PORT_VAR))
    }
}
