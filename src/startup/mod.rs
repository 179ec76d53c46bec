//! Boot-time orchestration.
//!
//! One pass per container boot: parse the requested handler set, consult the
//! [`HandlerRegistry`](crate::handlers::HandlerRegistry), decide between the
//! four [`StartupState`]s and finish by replacing this process with either
//! the application runtime or the proxy agent.
//!
//! [`decide`] is pure; all process and file effects live in [`Executor`]
//! behind the [`ProcessLauncher`] trait.

mod decision;
mod engine;
mod error;
mod executor;
mod launcher;
mod requested;
mod status;

pub use decision::{Decision, Launch, StartupState, decide};
pub use engine::{boot, plan};
pub use error::{Result, StartupError};
pub use executor::{
    Executor, GroupReport, HandlerOutcome, run_sync_group, spawn_background_group,
};
pub use launcher::{
    CommandStatus, LaunchError, ProcessLauncher, SEQUENCE_SEPARATOR, ShellCommand,
    SystemLauncher,
};
pub use requested::{DELIMITER, RequestedHandlers};
pub use status::{PROXY_ENABLED, StatusDocument, StatusError};
