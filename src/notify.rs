//! Best-effort operator notifications.
//!
//! Alerts are advisory: a failed delivery is logged and swallowed, never
//! propagated, so a dead notification channel cannot take down position
//! management.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

const LINE_NOTIFY_URL: &str = "https://notify-api.line.me/api/notify";
const NOTIFY_TIMEOUT: Duration = Duration::from_secs(5);

/// Sink for operator alerts on unrecoverable errors.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Deliver a message, best effort.
    async fn notify(&self, message: &str);
}

/// Sends alerts through the LINE Notify API with a bearer token.
pub struct LineNotify {
    http: Client,
    token: String,
}

impl LineNotify {
    pub fn new(token: impl Into<String>) -> Self {
        let http = Client::builder()
            .timeout(NOTIFY_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            http,
            token: token.into(),
        }
    }
}

#[async_trait]
impl NotificationSink for LineNotify {
    async fn notify(&self, message: &str) {
        let result = self
            .http
            .post(LINE_NOTIFY_URL)
            .bearer_auth(&self.token)
            .form(&[("message", message)])
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {
                debug!("Notification delivered");
            }
            Ok(response) => {
                warn!(status = %response.status(), "Notification rejected");
            }
            Err(e) => {
                warn!(error = %e, "Failed to deliver notification");
            }
        }
    }
}

/// Sink used when no notification channel is configured.
pub struct NoopSink;

#[async_trait]
impl NotificationSink for NoopSink {
    async fn notify(&self, message: &str) {
        debug!(message = message, "Notification channel not configured");
    }
}

/// Build a sink from the optional LINE token.
pub fn from_token(token: Option<String>) -> Box<dyn NotificationSink> {
    match token {
        Some(token) if !token.is_empty() => Box::new(LineNotify::new(token)),
        _ => Box::new(NoopSink),
    }
}
