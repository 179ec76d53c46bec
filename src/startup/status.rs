use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const PROXY_ENABLED: &str = "proxy_enabled";

#[derive(Debug, Error)]
pub enum StatusError {
    #[error("Failed to read status document {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Status document {} is not valid JSON: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Status document {} must contain a JSON object", path.display())]
    NotAnObject { path: PathBuf },

    #[error("Failed to write status document {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// The management status file shared with the proxy agent.
///
/// It is created at install time; a missing or corrupt file means a broken
/// install and every operation fails.
#[derive(Debug, Clone)]
pub struct StatusDocument {
    path: PathBuf,
}

impl StatusDocument {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn read(&self) -> Result<Map<String, Value>, StatusError> {
        let contents = fs::read_to_string(&self.path).map_err(|source| StatusError::Read {
            path: self.path.clone(),
            source,
        })?;

        match serde_json::from_str(&contents) {
            Ok(Value::Object(fields)) => Ok(fields),
            Ok(_) => Err(StatusError::NotAnObject {
                path: self.path.clone(),
            }),
            Err(source) => Err(StatusError::Parse {
                path: self.path.clone(),
                source,
            }),
        }
    }

    /// Read-modify-write of a single key.
    pub fn set(&self, key: &str, value: Value) -> Result<(), StatusError> {
        let mut fields = self.read()?;
        fields.insert(key.to_string(), value);

        let rendered = Value::Object(fields).to_string();
        fs::write(&self.path, rendered).map_err(|source| StatusError::Write {
            path: self.path.clone(),
            source,
        })
    }

    /// The proxy agent reads this flag as the string `"true"`.
    pub fn mark_proxy_enabled(&self) -> Result<(), StatusError> {
        self.set(PROXY_ENABLED, Value::String("true".to_string()))
    }
}
