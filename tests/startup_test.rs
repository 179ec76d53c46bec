use async_trait::async_trait;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::TempDir;

use appmgmt::config::{Config, PlatformEnv};
use appmgmt::handlers::{HandlerLayout, HandlerRegistry};
use appmgmt::startup::{
    self, CommandStatus, LaunchError, ProcessLauncher, ShellCommand, StartupError, StartupState,
    SystemLauncher,
};

/// Records every launch; `replace` fails so control comes back to the test.
#[derive(Default)]
struct RecordingLauncher {
    blocking: Mutex<Vec<ShellCommand>>,
    detached: Mutex<Vec<ShellCommand>>,
    replaced: Mutex<Vec<ShellCommand>>,
}

impl RecordingLauncher {
    fn blocking_lines(&self) -> Vec<String> {
        lines(&self.blocking)
    }

    fn detached_lines(&self) -> Vec<String> {
        lines(&self.detached)
    }

    fn replaced_lines(&self) -> Vec<String> {
        lines(&self.replaced)
    }
}

fn lines(calls: &Mutex<Vec<ShellCommand>>) -> Vec<String> {
    calls
        .lock()
        .unwrap()
        .iter()
        .map(|command| command.line.clone())
        .collect()
}

#[async_trait]
impl ProcessLauncher for RecordingLauncher {
    async fn run_blocking(&self, command: &ShellCommand) -> Result<CommandStatus, LaunchError> {
        self.blocking.lock().unwrap().push(command.clone());
        Ok(CommandStatus { code: Some(0) })
    }

    async fn spawn_detached(&self, command: &ShellCommand) -> Result<(), LaunchError> {
        self.detached.lock().unwrap().push(command.clone());
        Ok(())
    }

    fn replace(&self, command: &ShellCommand) -> LaunchError {
        self.replaced.lock().unwrap().push(command.clone());
        LaunchError::Replace {
            line: command.line.clone(),
            source: std::io::Error::other("recorded"),
        }
    }
}

/// An application directory with installed handlers and a status document.
struct TestApp {
    _temp_dir: TempDir,
    config: Config,
}

impl TestApp {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let mut config = Config::default();
        config.layout.app_dir = temp_dir.path().to_path_buf();

        fs::create_dir_all(config.layout.handlers_path()).unwrap();
        fs::write(config.layout.status_path(), r#"{"proxy_enabled": "false"}"#).unwrap();

        let app = Self {
            _temp_dir: temp_dir,
            config,
        };
        app.install("console", r#"{"proxy_required": true, "background": false}"#, "");
        app.install("shell", r#"{"proxy_required": true, "background": true}"#, "");
        app.install("noproxy", r#"{"public": "true", "proxy_required": false}"#, "");
        app.install("hidden", r#"{"public": false}"#, "");
        app
    }

    fn install(&self, name: &str, manifest: &str, script: &str) {
        let dir = self.config.layout.handlers_path().join(format!("start-{name}"));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("info.json"), manifest).unwrap();
        fs::write(dir.join("run"), script).unwrap();
    }

    fn start_line(&self, name: &str) -> String {
        self.config
            .layout
            .handlers_path()
            .join(format!("start-{name}"))
            .join("run")
            .display()
            .to_string()
    }

    fn status(&self) -> Value {
        serde_json::from_str(&fs::read_to_string(self.config.layout.status_path()).unwrap())
            .unwrap()
    }

    fn app_dir(&self) -> PathBuf {
        self.config.layout.app_dir.clone()
    }
}

fn platform(enable: Option<&str>, instance_index: Option<u32>) -> PlatformEnv {
    PlatformEnv {
        enable: enable.map(str::to_string),
        application: instance_index.map(|index| {
            format!(r#"{{"application_name": "demo", "instance_index": {index}}}"#)
        }),
        port: Some("8080".to_string()),
    }
}

fn recorded_replace(result: startup::Result<std::convert::Infallible>) {
    assert!(matches!(
        result,
        Err(StartupError::Launch(LaunchError::Replace { .. }))
    ));
}

#[tokio::test]
async fn test_no_handlers_starts_runtime_directly() {
    let app = TestApp::new();
    let launcher = RecordingLauncher::default();

    recorded_replace(startup::boot(&app.config, &platform(None, None), &launcher).await);

    assert!(launcher.blocking_lines().is_empty());
    assert!(launcher.detached_lines().is_empty());
    assert_eq!(
        launcher.replaced_lines(),
        vec![".app-management/scripts/start 8080"]
    );
    assert_eq!(
        launcher.replaced.lock().unwrap()[0].working_dir,
        app.app_dir()
    );
    assert_eq!(app.status()["proxy_enabled"], "false");
}

#[tokio::test]
async fn test_primary_instance_runs_handlers_and_proxy() {
    let app = TestApp::new();
    let launcher = RecordingLauncher::default();
    let platform = platform(Some("Console+shell+bogus"), Some(0));

    let decision = startup::plan(&app.config, &platform).unwrap();
    assert_eq!(decision.state, StartupState::HandlersProxyPrimary);
    assert_eq!(decision.validation.invalid, vec!["bogus"]);

    recorded_replace(startup::boot(&app.config, &platform, &launcher).await);

    assert_eq!(launcher.blocking_lines(), vec![app.start_line("console")]);
    assert_eq!(launcher.detached_lines(), vec![app.start_line("shell")]);
    assert_eq!(
        launcher.replaced_lines(),
        vec![".app-management/bin/proxyAgent"]
    );
    assert_eq!(app.status()["proxy_enabled"], "true");
}

#[tokio::test]
async fn test_secondary_instance_behaves_unmanaged() {
    let app = TestApp::new();
    let launcher = RecordingLauncher::default();

    recorded_replace(
        startup::boot(&app.config, &platform(Some("console+shell"), Some(1)), &launcher).await,
    );

    assert!(launcher.blocking_lines().is_empty());
    assert!(launcher.detached_lines().is_empty());
    assert_eq!(
        launcher.replaced_lines(),
        vec![".app-management/scripts/start 8080"]
    );
    assert_eq!(app.status()["proxy_enabled"], "false");
}

#[tokio::test]
async fn test_noproxy_runs_handlers_then_runtime() {
    let app = TestApp::new();
    let launcher = RecordingLauncher::default();

    recorded_replace(
        startup::boot(
            &app.config,
            &platform(Some("console+shell+noproxy"), None),
            &launcher,
        )
        .await,
    );

    assert_eq!(
        launcher.blocking_lines(),
        vec![app.start_line("console"), app.start_line("noproxy")]
    );
    assert_eq!(launcher.detached_lines(), vec![app.start_line("shell")]);
    assert_eq!(
        launcher.replaced_lines(),
        vec![".app-management/scripts/start 8080"]
    );
    assert_eq!(app.status()["proxy_enabled"], "false");
}

#[tokio::test]
async fn test_hidden_and_unknown_handlers_fall_back_to_runtime() {
    let app = TestApp::new();
    let launcher = RecordingLauncher::default();
    let platform = platform(Some("hidden+unknown"), None);

    let decision = startup::plan(&app.config, &platform).unwrap();
    assert!(decision.validation.valid.is_empty());
    assert_eq!(decision.validation.invalid, vec!["hidden", "unknown"]);

    recorded_replace(startup::boot(&app.config, &platform, &launcher).await);

    assert!(launcher.blocking_lines().is_empty());
    assert_eq!(
        launcher.replaced_lines(),
        vec![".app-management/scripts/start 8080"]
    );
}

#[tokio::test]
async fn test_missing_status_document_aborts_before_proxy() {
    let app = TestApp::new();
    fs::remove_file(app.config.layout.status_path()).unwrap();
    let launcher = RecordingLauncher::default();

    let result = startup::boot(&app.config, &platform(Some("console"), Some(0)), &launcher).await;

    assert!(matches!(result, Err(StartupError::Status(_))));
    assert!(launcher.replaced_lines().is_empty());
}

#[tokio::test]
async fn test_missing_instance_index_is_fatal_when_proxy_required() {
    let app = TestApp::new();
    let launcher = RecordingLauncher::default();

    let result = startup::boot(&app.config, &platform(Some("console"), None), &launcher).await;

    assert!(matches!(result, Err(StartupError::Platform(_))));
    assert!(launcher.blocking_lines().is_empty());
    assert!(launcher.replaced_lines().is_empty());
}

#[tokio::test]
async fn test_missing_port_fails_before_handlers_run() {
    let app = TestApp::new();
    let launcher = RecordingLauncher::default();
    let mut platform = platform(Some("console+noproxy"), None);
    platform.port = None;

    let result = startup::boot(&app.config, &platform, &launcher).await;

    assert!(matches!(result, Err(StartupError::Platform(_))));
    assert!(launcher.blocking_lines().is_empty());
    assert!(launcher.replaced_lines().is_empty());
}

#[tokio::test]
async fn test_malformed_manifest_does_not_block_other_handlers() {
    let app = TestApp::new();
    app.install("broken", r#"{"invalid:"json"}"#, "");

    let report = HandlerRegistry::scan(&app.config.layout.handlers_path(), &HandlerLayout::default());
    assert_eq!(report.rejected.len(), 1);
    assert!(report.registry.has_handler("console"));
    assert!(!report.registry.has_handler("broken"));
    assert!(!report.registry.has_handler("hidden"));

    let decision = startup::plan(&app.config, &platform(Some("broken+noproxy"), None)).unwrap();
    assert_eq!(decision.validation.valid, vec!["noproxy"]);
    assert_eq!(decision.validation.invalid, vec!["broken"]);
}

#[tokio::test]
async fn test_sync_handlers_run_regardless_of_failures() {
    let app = TestApp::new();
    let marker = app.app_dir().join("second-ran");
    app.install("first", r#"{"proxy_required": false}"#, "#!/bin/sh\nexit 1\n");
    app.install(
        "second",
        r#"{"proxy_required": false}"#,
        &format!("#!/bin/sh\ntouch '{}'\n", marker.display()),
    );

    let registry = HandlerRegistry::load(&app.config.layout.handlers_path(), &HandlerLayout::default());
    let executions = registry.partition(&["first", "second"]);
    let launcher = SystemLauncher::new("/bin/sh");

    // Scripts are invoked through `sh <path>` since the test files are not executable.
    let report = startup::run_sync_group(&ShellPrefix(&launcher), &executions.sync, &app.app_dir()).await;

    assert_eq!(report.outcomes.len(), 2);
    assert!(!report.outcomes[0].succeeded());
    assert!(report.outcomes[1].succeeded());
    assert!(Path::new(&marker).exists());
}

/// Prefixes each command with `sh` so non-executable scripts can run.
struct ShellPrefix<'a>(&'a SystemLauncher);

#[async_trait]
impl<'a> ProcessLauncher for ShellPrefix<'a> {
    async fn run_blocking(&self, command: &ShellCommand) -> Result<CommandStatus, LaunchError> {
        let prefixed = ShellCommand::new(format!("sh {}", command.line), &command.working_dir);
        self.0.run_blocking(&prefixed).await
    }

    async fn spawn_detached(&self, command: &ShellCommand) -> Result<(), LaunchError> {
        let prefixed = ShellCommand::new(format!("sh {}", command.line), &command.working_dir);
        self.0.spawn_detached(&prefixed).await
    }

    fn replace(&self, command: &ShellCommand) -> LaunchError {
        self.0.replace(command)
    }
}
