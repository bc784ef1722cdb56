//! External command execution.
//!
//! `CommandRunner` never fails: a non-zero exit, stderr output or even a spawn
//! failure all come back as a `CommandResult`. Callers decide what the output means.

use async_trait::async_trait;
use tokio::process::Command;

/// Exit code reported when the process could not be started or was killed by a signal.
pub const NO_EXIT_CODE: i32 = -1;

/// Captured output of one external command.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandResult {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl CommandResult {
    pub fn succeeded(&self) -> bool {
        self.exit_code == 0
    }
}

/// Executes shell command lines.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, command_line: &str) -> CommandResult;
}

/// Production runner that spawns `sh -c <command_line>`.
#[derive(Debug, Clone, Default)]
pub struct ShellRunner;

impl ShellRunner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandRunner for ShellRunner {
    async fn run(&self, command_line: &str) -> CommandResult {
        tracing::debug!(command = %command_line, "running command");

        let output = match Command::new("sh").arg("-c").arg(command_line).output().await {
            Ok(output) => output,
            Err(e) => {
                tracing::error!(command = %command_line, error = %e, "failed to spawn command");
                return CommandResult {
                    stdout: String::new(),
                    stderr: e.to_string(),
                    exit_code: NO_EXIT_CODE,
                };
            }
        };

        let result = CommandResult {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code: output.status.code().unwrap_or(NO_EXIT_CODE),
        };

        if !result.succeeded() {
            tracing::warn!(
                command = %command_line,
                exit_code = result.exit_code,
                stderr = %result.stderr.trim(),
                "command exited abnormally"
            );
        }

        result
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_captures_stdout() {
        let result = ShellRunner::new().run("echo hello").await;
        assert_eq!(result.stdout, "hello\n");
        assert!(result.stderr.is_empty());
        assert!(result.succeeded());
    }

    #[tokio::test]
    async fn test_nonzero_exit_is_not_an_error() {
        let result = ShellRunner::new()
            .run("echo partial; echo broken >&2; exit 3")
            .await;
        assert_eq!(result.stdout, "partial\n");
        assert_eq!(result.stderr, "broken\n");
        assert_eq!(result.exit_code, 3);
        assert!(!result.succeeded());
    }

    #[tokio::test]
    async fn test_missing_binary_reports_through_result() {
        let result = ShellRunner::new()
            .run("definitely-not-a-real-binary-gpu-wakeup")
            .await;
        assert!(result.stdout.is_empty());
        assert!(!result.stderr.is_empty());
        assert_eq!(result.exit_code, 127);
    }
}
