//! Best-effort notifications about gateway activity.
//!
//! Delivery failures are logged and dropped. `NotifierHandle::dispatch` runs the
//! send on its own task so a slow or dead webhook never holds up a response.

mod push;

pub use push::PushNotifier;

use std::sync::Arc;

use async_trait::async_trait;
use tokio::task::JoinHandle;

use crate::config::PushConfig;

/// A human-readable event to deliver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub body: String,
    /// Notification type; the notifier's default channel when `None`.
    pub kind: Option<String>,
    pub open_screen: bool,
}

impl Notification {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            kind: None,
            open_screen: true,
        }
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    pub fn with_open_screen(mut self, open_screen: bool) -> Self {
        self.open_screen = open_screen;
        self
    }
}

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("push request failed: {0}")]
    Transport(String),

    #[error("push rejected with status {status}: {message}")]
    Rejected { status: u16, message: String },
}

/// A notification backend.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError>;
}

/// Notifier used when no push target is configured.
#[derive(Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        tracing::info!(
            title = %notification.title,
            body = %notification.body,
            "notification (no push target configured)"
        );
        Ok(())
    }
}

/// Cloneable handle that sends notifications on detached tasks.
#[derive(Clone)]
pub struct NotifierHandle {
    notifier: Arc<dyn Notifier>,
}

impl NotifierHandle {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self { notifier }
    }

    /// Pick the backend for `push`: the webhook if configured, the log otherwise.
    pub fn from_config(push: Option<&PushConfig>) -> Result<Self, NotifyError> {
        let notifier: Arc<dyn Notifier> = match push {
            Some(push) => Arc::new(PushNotifier::new(push)?),
            None => Arc::new(LogNotifier),
        };
        Ok(Self::new(notifier))
    }

    /// Send `notification` in the background. Errors are logged, never returned.
    pub fn dispatch(&self, notification: Notification) -> JoinHandle<()> {
        let notifier = self.notifier.clone();
        tokio::spawn(async move {
            if let Err(e) = notifier.send(&notification).await {
                tracing::error!(
                    title = %notification.title,
                    error = %e,
                    "failed to deliver notification"
                );
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{FailingNotifier, RecordingNotifier};

    #[test]
    fn test_notification_defaults() {
        let n = Notification::new("title", "body");
        assert_eq!(n.kind, None);
        assert!(n.open_screen);

        let n = n.with_kind("custom").with_open_screen(false);
        assert_eq!(n.kind.as_deref(), Some("custom"));
        assert!(!n.open_screen);
    }

    #[tokio::test]
    async fn test_dispatch_delivers() {
        let (notifier, mut rx) = RecordingNotifier::new();
        let handle = NotifierHandle::new(Arc::new(notifier));

        handle.dispatch(Notification::new("hello", "world")).await.unwrap();

        let received = rx.recv().await.unwrap();
        assert_eq!(received.title, "hello");
        assert_eq!(received.body, "world");
    }

    #[tokio::test]
    async fn test_dispatch_swallows_errors() {
        let handle = NotifierHandle::new(Arc::new(FailingNotifier));
        // The task must complete normally even though the send failed.
        handle.dispatch(Notification::new("t", "b")).await.unwrap();
    }

    #[tokio::test]
    async fn test_log_notifier_always_succeeds() {
        assert!(LogNotifier.send(&Notification::new("t", "b")).await.is_ok());
    }
}
