use std::convert::Infallible;
use tracing::{info, warn};

use super::decision::{Decision, decide};
use super::error::Result;
use super::executor::Executor;
use super::launcher::ProcessLauncher;
use super::requested::RequestedHandlers;
use crate::config::{Config, PlatformEnv};
use crate::handlers::HandlerRegistry;

/// Compute the boot decision from configuration and platform inputs.
///
/// The handlers directory is only scanned when something was requested.
pub fn plan(config: &Config, platform: &PlatformEnv) -> Result<Decision> {
    let requested = RequestedHandlers::parse(platform.enable.as_deref());
    info!("App Management handlers: {requested}");

    if requested.is_empty() {
        return Ok(Decision::no_handlers(requested));
    }

    let registry = HandlerRegistry::load(
        &config.layout.handlers_path(),
        &config.layout.handler_layout(),
    );
    let decision = decide(requested, &registry, platform)?;

    let validation = &decision.validation;
    if !validation.invalid.is_empty() {
        warn!(
            "Ignoring unrecognized App Management utilities: {}",
            validation.invalid.join(", ")
        );
    }
    info!(
        state = ?decision.state,
        "Activating App Management utilities: {}",
        validation.valid.join(", ")
    );

    Ok(decision)
}

/// Decide and launch. Returns only if the boot failed.
pub async fn boot(
    config: &Config,
    platform: &PlatformEnv,
    launcher: &dyn ProcessLauncher,
) -> Result<Infallible> {
    let decision = plan(config, platform)?;
    Executor::new(config, platform, launcher)
        .execute(&decision)
        .await
}
