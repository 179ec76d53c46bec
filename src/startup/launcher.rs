use async_trait::async_trait;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

/// Separator for sequential commands that run regardless of earlier failures.
pub const SEQUENCE_SEPARATOR: &str = " ; ";

#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("Failed to run '{line}': {source}")]
    Spawn {
        line: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to start '{line}' in place of the orchestrator: {source}")]
    Replace {
        line: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Process replacement is not supported on this platform")]
    Unsupported,
}

/// A command line run through the configured shell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShellCommand {
    pub line: String,
    pub working_dir: PathBuf,
}

impl ShellCommand {
    pub fn new(line: impl Into<String>, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            line: line.into(),
            working_dir: working_dir.into(),
        }
    }

    /// Join parts with [`SEQUENCE_SEPARATOR`]. `None` when there are no parts.
    pub fn sequence<I, S>(parts: I, working_dir: &Path) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let parts: Vec<String> = parts
            .into_iter()
            .map(|part| part.as_ref().to_string())
            .collect();
        if parts.is_empty() {
            return None;
        }
        Some(Self::new(parts.join(SEQUENCE_SEPARATOR), working_dir))
    }
}

/// Exit state of a finished command. `code` is `None` when killed by a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandStatus {
    pub code: Option<i32>,
}

impl CommandStatus {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

impl From<std::process::ExitStatus> for CommandStatus {
    fn from(status: std::process::ExitStatus) -> Self {
        Self {
            code: status.code(),
        }
    }
}

/// Operating-system process primitives used by the startup sequence.
#[async_trait]
pub trait ProcessLauncher: Send + Sync {
    /// Run to completion and report the exit state.
    async fn run_blocking(&self, command: &ShellCommand) -> Result<CommandStatus, LaunchError>;

    /// Start without waiting; the outcome is never observed. The started
    /// process must not remain a child of the caller.
    async fn spawn_detached(&self, command: &ShellCommand) -> Result<(), LaunchError>;

    /// Replace the current process image. Returns only on failure.
    fn replace(&self, command: &ShellCommand) -> LaunchError;
}

/// [`ProcessLauncher`] backed by `<shell> -c <line>`.
#[derive(Debug, Clone)]
pub struct SystemLauncher {
    shell: String,
}

impl SystemLauncher {
    pub fn new(shell: impl Into<String>) -> Self {
        Self {
            shell: shell.into(),
        }
    }

    fn command(&self, command: &ShellCommand) -> Command {
        let mut cmd = Command::new(&self.shell);
        cmd.arg("-c")
            .arg(&command.line)
            .current_dir(&command.working_dir);
        cmd
    }
}

#[async_trait]
impl ProcessLauncher for SystemLauncher {
    async fn run_blocking(&self, command: &ShellCommand) -> Result<CommandStatus, LaunchError> {
        debug!(line = %command.line, dir = %command.working_dir.display(), "Running command");

        let status = self
            .command(command)
            .status()
            .await
            .map_err(|source| LaunchError::Spawn {
                line: command.line.clone(),
                source,
            })?;

        Ok(status.into())
    }

    async fn spawn_detached(&self, command: &ShellCommand) -> Result<(), LaunchError> {
        debug!(line = %command.line, dir = %command.working_dir.display(), "Spawning detached command");

        // The wrapper shell exits as soon as the group is backgrounded, so the
        // group is reparented away from this process and its successor.
        let wrapped = ShellCommand::new(format!("( {} ) &", command.line), &command.working_dir);
        let status: CommandStatus = self
            .command(&wrapped)
            .stdin(Stdio::null())
            .status()
            .await
            .map_err(|source| LaunchError::Spawn {
                line: command.line.clone(),
                source,
            })?
            .into();

        if !status.success() {
            return Err(LaunchError::Spawn {
                line: command.line.clone(),
                source: std::io::Error::other(format!(
                    "background wrapper exited with {:?}",
                    status.code
                )),
            });
        }

        Ok(())
    }

    #[cfg(unix)]
    fn replace(&self, command: &ShellCommand) -> LaunchError {
        use std::os::unix::process::CommandExt;

        debug!(line = %command.line, dir = %command.working_dir.display(), "Replacing process");

        // `exec` inside the shell keeps the final program on our pid.
        let source = std::process::Command::new(&self.shell)
            .arg("-c")
            .arg(format!("exec {}", command.line))
            .current_dir(&command.working_dir)
            .exec();

        LaunchError::Replace {
            line: command.line.clone(),
            source,
        }
    }

    #[cfg(not(unix))]
    fn replace(&self, _command: &ShellCommand) -> LaunchError {
        LaunchError::Unsupported
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn test_sequence_joins_with_separator() {
        let dir = Path::new("/app");
        let command = ShellCommand::sequence(["./a", "./b"], dir).unwrap();
        assert_eq!(command.line, "./a ; ./b");
        assert_eq!(command.working_dir, dir);

        let single = ShellCommand::sequence(["./a"], dir).unwrap();
        assert_eq!(single.line, "./a");

        let empty: [&str; 0] = [];
        assert!(ShellCommand::sequence(empty, dir).is_none());
    }

    #[tokio::test]
    async fn test_run_blocking_reports_exit_code() {
        let temp_dir = TempDir::new().unwrap();
        let launcher = SystemLauncher::new("/bin/sh");

        let ok = launcher
            .run_blocking(&ShellCommand::new("touch marker", temp_dir.path()))
            .await
            .unwrap();
        assert!(ok.success());
        assert!(temp_dir.path().join("marker").exists());

        let failed = launcher
            .run_blocking(&ShellCommand::new("exit 3", temp_dir.path()))
            .await
            .unwrap();
        assert_eq!(failed.code, Some(3));
        assert!(!failed.success());
    }

    #[tokio::test]
    async fn test_run_blocking_missing_shell() {
        let temp_dir = TempDir::new().unwrap();
        let launcher = SystemLauncher::new("/nonexistent/shell");

        let result = launcher
            .run_blocking(&ShellCommand::new("true", temp_dir.path()))
            .await;
        assert!(matches!(result.unwrap_err(), LaunchError::Spawn { .. }));
    }

    #[tokio::test]
    async fn test_spawn_detached_does_not_wait() {
        let temp_dir = TempDir::new().unwrap();
        let launcher = SystemLauncher::new("/bin/sh");

        launcher
            .spawn_detached(&ShellCommand::new("sleep 0.2 ; touch done", temp_dir.path()))
            .await
            .unwrap();
        assert!(!temp_dir.path().join("done").exists());

        let mut finished = false;
        for _ in 0..50 {
            tokio::time::sleep(Duration::from_millis(100)).await;
            if fs::metadata(temp_dir.path().join("done")).is_ok() {
                finished = true;
                break;
            }
        }
        assert!(finished);
    }

    /// Parent pid from `/proc/<pid>/stat`.
    #[cfg(target_os = "linux")]
    fn parent_pid(pid: u32) -> u32 {
        let stat = fs::read_to_string(format!("/proc/{pid}/stat")).unwrap();
        let after_name = &stat[stat.rfind(')').unwrap() + 1..];
        after_name.split_whitespace().nth(1).unwrap().parse().unwrap()
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn test_spawn_detached_is_not_our_child() {
        let temp_dir = TempDir::new().unwrap();
        let launcher = SystemLauncher::new("/bin/sh");
        let pid_file = temp_dir.path().join("group.pid");

        // The inner shell reports its parent, which is the group process.
        launcher
            .spawn_detached(&ShellCommand::new(
                "sh -c 'echo $PPID' > group.pid.tmp && mv group.pid.tmp group.pid ; sleep 2",
                temp_dir.path(),
            ))
            .await
            .unwrap();

        let mut group_pid = None;
        for _ in 0..50 {
            if let Ok(contents) = fs::read_to_string(&pid_file) {
                group_pid = contents.trim().parse::<u32>().ok();
                break;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }

        let group_pid = group_pid.unwrap();
        assert_ne!(parent_pid(group_pid), std::process::id());
    }
}
