//! The boot decision, computed without touching processes or files.

use serde::Serialize;

use super::requested::RequestedHandlers;
use crate::config::{PlatformEnv, PlatformError};
use crate::handlers::{Executions, HandlerRegistry, Validation};

/// Which startup path a boot takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StartupState {
    /// Nothing requested: start the runtime directly.
    NoHandlers,
    /// Run handlers, then the runtime.
    HandlersNoProxy,
    /// Primary instance: run handlers, then the proxy in front of the runtime.
    HandlersProxyPrimary,
    /// Secondary instance of a proxied app: behave like an unmanaged instance.
    HandlersProxySecondary,
}

/// The process that replaces the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Launch {
    Runtime,
    Proxy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Decision {
    pub state: StartupState,
    pub requested: RequestedHandlers,
    pub validation: Validation,
    /// Handlers to run before the terminal launch; empty when none may run.
    pub executions: Executions,
    pub persist_proxy_flag: bool,
    pub launch: Launch,
}

impl Decision {
    /// Boot with nothing requested. The registry is never consulted.
    pub fn no_handlers(requested: RequestedHandlers) -> Self {
        Self {
            state: StartupState::NoHandlers,
            requested,
            validation: Validation::default(),
            executions: Executions::default(),
            persist_proxy_flag: false,
            launch: Launch::Runtime,
        }
    }
}

/// Decide how to boot for a non-empty request.
///
/// The instance index is only read when a proxy is required, so a missing
/// application descriptor is an error on that path alone.
pub fn decide(
    requested: RequestedHandlers,
    registry: &HandlerRegistry,
    platform: &PlatformEnv,
) -> Result<Decision, PlatformError> {
    if requested.is_empty() {
        return Ok(Decision::no_handlers(requested));
    }

    let validation = registry.validate(requested.names());

    if !registry.proxy_required(&validation.valid) {
        let executions = registry.partition(&validation.valid);
        return Ok(Decision {
            state: StartupState::HandlersNoProxy,
            requested,
            validation,
            executions,
            persist_proxy_flag: false,
            launch: Launch::Runtime,
        });
    }

    if platform.instance_index()? != 0 {
        return Ok(Decision {
            state: StartupState::HandlersProxySecondary,
            requested,
            validation,
            executions: Executions::default(),
            persist_proxy_flag: false,
            launch: Launch::Runtime,
        });
    }

    let executions = registry.partition(&validation.valid);
    Ok(Decision {
        state: StartupState::HandlersProxyPrimary,
        requested,
        validation,
        executions,
        persist_proxy_flag: true,
        launch: Launch::Proxy,
    })
}
