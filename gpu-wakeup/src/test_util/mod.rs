//! Test doubles and fixtures shared by unit and integration tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::config::{
    AuthConfig, CommandsConfig, Config, InstancesConfig, LoggingConfig, ServerConfig,
};
use crate::exec::{CommandResult, CommandRunner};
use crate::notify::{Notification, Notifier, NotifierHandle, NotifyError};
use crate::AppState;

pub const TEST_SECRET: &str = "correct";

/// Runner that records every command line and replays canned results.
///
/// Queued results are returned in order; once exhausted, the fallback is returned.
pub struct RecordingRunner {
    commands: Mutex<Vec<String>>,
    queued: Mutex<VecDeque<CommandResult>>,
    fallback: CommandResult,
}

impl RecordingRunner {
    pub fn with_stdout(stdout: &str) -> Self {
        Self {
            commands: Mutex::new(Vec::new()),
            queued: Mutex::new(VecDeque::new()),
            fallback: CommandResult {
                stdout: stdout.to_string(),
                ..Default::default()
            },
        }
    }

    pub fn with_results(results: Vec<CommandResult>) -> Self {
        Self {
            commands: Mutex::new(Vec::new()),
            queued: Mutex::new(results.into()),
            fallback: CommandResult::default(),
        }
    }

    pub fn commands(&self) -> Vec<String> {
        self.commands.lock().unwrap().clone()
    }
}

#[async_trait]
impl CommandRunner for RecordingRunner {
    async fn run(&self, command_line: &str) -> CommandResult {
        self.commands.lock().unwrap().push(command_line.to_string());
        self.queued
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone())
    }
}

/// Runner that waits before handing each command to a `RecordingRunner`.
pub struct SlowRunner {
    inner: Arc<RecordingRunner>,
    delay: Duration,
}

impl SlowRunner {
    pub fn new(inner: Arc<RecordingRunner>, delay: Duration) -> Self {
        Self { inner, delay }
    }
}

#[async_trait]
impl CommandRunner for SlowRunner {
    async fn run(&self, command_line: &str) -> CommandResult {
        tokio::time::sleep(self.delay).await;
        self.inner.run(command_line).await
    }
}

/// Notifier that forwards every notification to a channel.
pub struct RecordingNotifier {
    tx: mpsc::UnboundedSender<Notification>,
}

impl RecordingNotifier {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        let _ = self.tx.send(notification.clone());
        Ok(())
    }
}

/// Notifier whose every delivery fails.
pub struct FailingNotifier;

#[async_trait]
impl Notifier for FailingNotifier {
    async fn send(&self, _notification: &Notification) -> Result<(), NotifyError> {
        Err(NotifyError::Transport("connection refused".to_string()))
    }
}

/// Notifier that hangs for `delay` before succeeding, like a stalled webhook.
pub struct HangingNotifier {
    pub delay: Duration,
}

#[async_trait]
impl Notifier for HangingNotifier {
    async fn send(&self, _notification: &Notification) -> Result<(), NotifyError> {
        tokio::time::sleep(self.delay).await;
        Ok(())
    }
}

pub fn test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 3001,
        },
        auth: AuthConfig {
            secret: TEST_SECRET.to_string(),
            quiet_paths: vec!["/favicon.ico".to_string()],
            client_ip_header: "x-real-ip".to_string(),
        },
        instances: InstancesConfig {
            from: 1,
            to: 4,
            container_prefix: "hufs0".to_string(),
        },
        commands: CommandsConfig::default(),
        push: None,
        logging: LoggingConfig {
            level: "debug".to_string(),
        },
    }
}

/// Application state over the given doubles, using `test_config()`.
pub fn create_test_state(
    runner: Arc<dyn CommandRunner>,
    notifier: Arc<dyn Notifier>,
) -> Arc<AppState> {
    let state = AppState::new(test_config(), runner, NotifierHandle::new(notifier))
        .expect("test config is valid");
    Arc::new(state)
}
