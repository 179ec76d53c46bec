//! User-supplied configuration for individual handlers.
//!
//! A handler named `shell` reads a YAML mapping from
//! `BLUEMIX_APP_MGMT_SHELL`. Handler scripts call this through
//! `appmgmt handler-config <name>`.

use serde_yaml::{Mapping, Value};
use tracing::error;

use super::error::SettingsError;

const ENV_PREFIX: &str = "BLUEMIX_APP_MGMT_";

pub fn environment_variable_name(handler: &str) -> String {
    format!("{ENV_PREFIX}{}", handler.to_uppercase())
}

/// Parse the handler's configuration variable.
///
/// An unset variable is an empty mapping, not an error.
pub fn try_handler_settings<F>(handler: &str, lookup: F) -> Result<Mapping, SettingsError>
where
    F: Fn(&str) -> Option<String>,
{
    let var = environment_variable_name(handler);
    let Some(raw) = lookup(&var) else {
        return Ok(Mapping::new());
    };

    match serde_yaml::from_str::<Value>(&raw) {
        Ok(Value::Mapping(mapping)) => Ok(mapping),
        Ok(_) => Err(SettingsError::NotAMapping {
            var,
            raw: raw.trim().to_string(),
        }),
        Err(source) => Err(SettingsError::Syntax { var, source }),
    }
}

/// Like [`try_handler_settings`] but logs failures and falls back to an
/// empty mapping.
pub fn handler_settings<F>(handler: &str, lookup: F) -> Mapping
where
    F: Fn(&str) -> Option<String>,
{
    try_handler_settings(handler, lookup).unwrap_or_else(|e| {
        error!("{e}");
        Mapping::new()
    })
}
