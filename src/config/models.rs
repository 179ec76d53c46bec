use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::handlers::HandlerLayout;

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub layout: LayoutConfig,
    #[serde(default)]
    pub launch: LaunchConfig,
}

/// Where the application and its management files live
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LayoutConfig {
    #[serde(default = "default_app_dir")]
    pub app_dir: PathBuf,
    /// Relative to `app_dir`
    #[serde(default = "default_mgmt_dir")]
    pub mgmt_dir: PathBuf,
    /// Relative to `mgmt_dir`
    #[serde(default = "default_handlers_dir")]
    pub handlers_dir: PathBuf,
    #[serde(default = "default_handler_type")]
    pub handler_type: String,
    #[serde(default = "default_manifest_file")]
    pub manifest_file: String,
    #[serde(default = "default_handler_script")]
    pub handler_script: String,
    /// Relative to `mgmt_dir`
    #[serde(default = "default_status_file")]
    pub status_file: PathBuf,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            app_dir: default_app_dir(),
            mgmt_dir: default_mgmt_dir(),
            handlers_dir: default_handlers_dir(),
            handler_type: default_handler_type(),
            manifest_file: default_manifest_file(),
            handler_script: default_handler_script(),
            status_file: default_status_file(),
        }
    }
}

impl LayoutConfig {
    pub fn mgmt_path(&self) -> PathBuf {
        self.app_dir.join(&self.mgmt_dir)
    }

    pub fn handlers_path(&self) -> PathBuf {
        self.mgmt_path().join(&self.handlers_dir)
    }

    pub fn status_path(&self) -> PathBuf {
        self.mgmt_path().join(&self.status_file)
    }

    pub fn handler_layout(&self) -> HandlerLayout {
        HandlerLayout {
            handler_type: self.handler_type.clone(),
            manifest_file: self.manifest_file.clone(),
            handler_script: self.handler_script.clone(),
        }
    }
}

fn default_app_dir() -> PathBuf {
    PathBuf::from("/home/vcap/app")
}

fn default_mgmt_dir() -> PathBuf {
    PathBuf::from(".app-management")
}

fn default_handlers_dir() -> PathBuf {
    PathBuf::from("handlers")
}

fn default_handler_type() -> String {
    "start".to_string()
}

fn default_manifest_file() -> String {
    "info.json".to_string()
}

fn default_handler_script() -> String {
    "run".to_string()
}

fn default_status_file() -> PathBuf {
    PathBuf::from("app_mgmt_info.json")
}

/// Commands used to start processes. Relative paths resolve against `app_dir`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LaunchConfig {
    #[serde(default = "default_shell")]
    pub shell: String,
    /// Receives the platform `PORT` as its only argument
    #[serde(default = "default_runtime_command")]
    pub runtime_command: String,
    #[serde(default = "default_proxy_command")]
    pub proxy_command: String,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            shell: default_shell(),
            runtime_command: default_runtime_command(),
            proxy_command: default_proxy_command(),
        }
    }
}

fn default_shell() -> String {
    "/bin/sh".to_string()
}

fn default_runtime_command() -> String {
    ".app-management/scripts/start".to_string()
}

fn default_proxy_command() -> String {
    ".app-management/bin/proxyAgent".to_string()
}
