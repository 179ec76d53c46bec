//! Installed handler discovery.
//!
//! Handlers are optional utilities (remote shell, console, debugger) shipped
//! under `.app-management/handlers/start-<name>/`, each described by an
//! `info.json` manifest.
//!
//! ## Key Components
//!
//! - [`HandlerManifest`] - Parsed manifest with tri-state policy flags
//! - [`HandlerDescriptor`] - Resolved, immutable view of one handler
//! - [`HandlerRegistry`] - Name-keyed registry with validation, proxy
//!   aggregation and sync/background partitioning
//! - [`handler_settings`] - Per-handler YAML configuration from the environment
//!
//! ## Example
//!
//! ```rust,ignore
//! use appmgmt::handlers::{HandlerLayout, HandlerRegistry};
//!
//! let registry = HandlerRegistry::load(&handlers_dir, &HandlerLayout::default());
//! let validation = registry.validate(&requested);
//! let proxy = registry.proxy_required(&validation.valid);
//! let executions = registry.partition(&validation.valid);
//! ```

mod descriptor;
mod error;
mod registry;
mod settings;

pub use descriptor::{Flag, HandlerDescriptor, HandlerManifest};
pub use error::{ManifestError, SettingsError};
pub use registry::{
    Executions, HandlerLayout, HandlerRegistry, NO_PROXY, ScanReport, Validation,
};
pub use settings::{environment_variable_name, handler_settings, try_handler_settings};
