use std::convert::Infallible;
use std::path::Path;
use tracing::{info, warn};

use super::decision::{Decision, Launch};
use super::error::Result;
use super::launcher::{CommandStatus, LaunchError, ProcessLauncher, ShellCommand};
use super::status::StatusDocument;
use crate::config::{Config, PlatformEnv};
use crate::handlers::HandlerDescriptor;

/// Result of starting one synchronous handler.
#[derive(Debug)]
pub struct HandlerOutcome {
    pub handler: String,
    pub result: std::result::Result<CommandStatus, LaunchError>,
}

impl HandlerOutcome {
    pub fn succeeded(&self) -> bool {
        matches!(&self.result, Ok(status) if status.success())
    }
}

/// Per-handler outcomes of a synchronous group, in execution order.
#[derive(Debug, Default)]
pub struct GroupReport {
    pub outcomes: Vec<HandlerOutcome>,
}

impl GroupReport {
    pub fn failures(&self) -> impl Iterator<Item = &HandlerOutcome> {
        self.outcomes.iter().filter(|outcome| !outcome.succeeded())
    }

    pub fn all_succeeded(&self) -> bool {
        self.failures().next().is_none()
    }
}

fn start_line(handler: &HandlerDescriptor) -> String {
    handler.start_command().display().to_string()
}

/// Run each handler to completion, in order.
///
/// A failing handler never prevents the next one from being attempted. There
/// is no timeout: a handler that hangs holds up the rest of the boot.
pub async fn run_sync_group<L>(
    launcher: &L,
    handlers: &[HandlerDescriptor],
    working_dir: &Path,
) -> GroupReport
where
    L: ProcessLauncher + ?Sized,
{
    let mut report = GroupReport::default();

    for handler in handlers {
        let command = ShellCommand::new(start_line(handler), working_dir);
        let result = launcher.run_blocking(&command).await;

        match &result {
            Ok(status) if status.success() => {}
            Ok(status) => warn!(
                handler = handler.name(),
                code = ?status.code,
                "Handler exited unsuccessfully"
            ),
            Err(e) => warn!(handler = handler.name(), error = %e, "Handler could not be started"),
        }

        report.outcomes.push(HandlerOutcome {
            handler: handler.name().to_string(),
            result,
        });
    }

    report
}

/// Start all background handlers as one detached sequence.
pub async fn spawn_background_group<L>(
    launcher: &L,
    handlers: &[HandlerDescriptor],
    working_dir: &Path,
) -> std::result::Result<(), LaunchError>
where
    L: ProcessLauncher + ?Sized,
{
    match ShellCommand::sequence(handlers.iter().map(start_line), working_dir) {
        Some(command) => launcher.spawn_detached(&command).await,
        None => Ok(()),
    }
}

/// Carries out a [`Decision`].
pub struct Executor<'a> {
    config: &'a Config,
    platform: &'a PlatformEnv,
    launcher: &'a dyn ProcessLauncher,
}

impl<'a> Executor<'a> {
    pub fn new(
        config: &'a Config,
        platform: &'a PlatformEnv,
        launcher: &'a dyn ProcessLauncher,
    ) -> Self {
        Self {
            config,
            platform,
            launcher,
        }
    }

    pub fn terminal_command(&self, launch: Launch) -> Result<ShellCommand> {
        let launch_config = &self.config.launch;
        let line = match launch {
            Launch::Runtime => {
                format!("{} {}", launch_config.runtime_command, self.platform.port()?)
            }
            Launch::Proxy => launch_config.proxy_command.clone(),
        };
        Ok(ShellCommand::new(line, &self.config.layout.app_dir))
    }

    /// Run handlers, persist state, then replace this process.
    ///
    /// Every precondition of the terminal launch is checked before any
    /// handler runs. Returns only on failure.
    pub async fn execute(&self, decision: &Decision) -> Result<Infallible> {
        let terminal = self.terminal_command(decision.launch)?;
        let app_dir = &self.config.layout.app_dir;

        let report = run_sync_group(self.launcher, &decision.executions.sync, app_dir).await;
        if !report.all_succeeded() {
            warn!(
                failed = report.failures().count(),
                total = report.outcomes.len(),
                "Some handlers did not start cleanly"
            );
        }

        if let Err(e) =
            spawn_background_group(self.launcher, &decision.executions.background, app_dir).await
        {
            warn!(error = %e, "Background handlers could not be started");
        }

        if decision.persist_proxy_flag {
            StatusDocument::new(self.config.layout.status_path()).mark_proxy_enabled()?;
        }

        match decision.launch {
            Launch::Proxy => info!("Starting proxy agent"),
            Launch::Runtime => info!("Starting runtime"),
        }

        Err(self.launcher.replace(&terminal).into())
    }
}
