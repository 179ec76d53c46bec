use super::models::Config;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Setting '{field}' must not be empty")]
    EmptySetting { field: &'static str },

    #[error("Setting '{field}' must be a single path component, got '{value}'")]
    NotAComponent { field: &'static str, value: String },

    #[error("Application directory must be absolute: {path}")]
    RelativeAppDir { path: String },
}

/// Validate the entire configuration
pub fn validate(config: &Config) -> Result<(), ValidationError> {
    validate_layout(config)?;
    validate_launch(config)?;
    Ok(())
}

fn validate_layout(config: &Config) -> Result<(), ValidationError> {
    let layout = &config.layout;

    if !layout.app_dir.is_absolute() {
        return Err(ValidationError::RelativeAppDir {
            path: layout.app_dir.display().to_string(),
        });
    }

    non_empty("layout.handler_type", &layout.handler_type)?;
    non_empty("layout.manifest_file", &layout.manifest_file)?;
    non_empty("layout.handler_script", &layout.handler_script)?;
    non_empty(
        "layout.status_file",
        &layout.status_file.to_string_lossy(),
    )?;

    single_component("layout.handler_type", &layout.handler_type)?;
    single_component("layout.manifest_file", &layout.manifest_file)?;

    Ok(())
}

fn validate_launch(config: &Config) -> Result<(), ValidationError> {
    non_empty("launch.shell", &config.launch.shell)?;
    non_empty("launch.runtime_command", &config.launch.runtime_command)?;
    non_empty("launch.proxy_command", &config.launch.proxy_command)?;
    Ok(())
}

fn non_empty(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::EmptySetting { field });
    }
    Ok(())
}

fn single_component(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.contains('/') {
        return Err(ValidationError::NotAComponent {
            field,
            value: value.to_string(),
        });
    }
    Ok(())
}
