//! Push webhook notifier.

use std::time::Duration;

use async_trait::async_trait;
use gpu_wakeup_common::{PushIdentity, PushRejection, PushRequest};
use reqwest::{Client, StatusCode};

use super::{Notification, Notifier, NotifyError};
use crate::config::PushConfig;

/// Delivers notifications through the push webhook.
pub struct PushNotifier {
    http_client: Client,
    endpoint: String,
    identity: PushIdentity,
    channel: String,
    max_body_chars: usize,
}

impl PushNotifier {
    pub fn new(config: &PushConfig) -> Result<Self, NotifyError> {
        let http_client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| NotifyError::Transport(e.to_string()))?;

        Ok(Self {
            http_client,
            endpoint: config.endpoint.clone(),
            identity: config.identity(),
            channel: config.channel.clone(),
            max_body_chars: config.max_body_chars,
        })
    }

    fn build_request(&self, notification: &Notification) -> PushRequest {
        let kind = notification.kind.as_deref().unwrap_or(&self.channel);
        PushRequest::new(
            &self.identity,
            kind,
            &notification.title,
            &notification.body,
            notification.open_screen,
            self.max_body_chars,
        )
    }
}

#[async_trait]
impl Notifier for PushNotifier {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        let request = self.build_request(notification);

        tracing::debug!("Sending push notification to {}", self.endpoint);

        let response = self
            .http_client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| NotifyError::Transport(e.to_string()))?;

        let status = response.status();
        if status != StatusCode::OK {
            let rejection: PushRejection = response.json().await.unwrap_or_default();
            let message = rejection.message.unwrap_or_else(|| {
                status.canonical_reason().unwrap_or("unknown status").to_string()
            });
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        Ok(())
    }
}
