use std::path::{Path, PathBuf};
use thiserror::Error;

/// Per-handler manifest failures. These never abort a registry scan.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("Error loading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Error loading {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Error loading {}: manifest must be a JSON object", path.display())]
    NotAnObject { path: PathBuf },

    #[error("Error loading {}: '{key}' must be a boolean, got {value}", path.display())]
    InvalidFlag {
        path: PathBuf,
        key: &'static str,
        value: serde_json::Value,
    },
}

impl ManifestError {
    pub fn path(&self) -> &Path {
        match self {
            ManifestError::Io { path, .. }
            | ManifestError::Parse { path, .. }
            | ManifestError::NotAnObject { path }
            | ManifestError::InvalidFlag { path, .. } => path.as_path(),
        }
    }
}

/// Invalid per-handler user configuration.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Configuration value in environment variable {var} has invalid syntax: {source}")]
    Syntax {
        var: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Configuration value in environment variable {var} is not valid: {raw}")]
    NotAMapping { var: String, raw: String },
}
