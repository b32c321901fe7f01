use async_trait::async_trait;
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::config::NotifyConfig;
use crate::database::models::{NewNotification, Notification};
use crate::database::{DatabaseError, Repository};

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("failed to store notification: {0}")]
    Store(#[from] DatabaseError),

    #[error("push delivery failed: {0}")]
    Push(String),

    #[error("invalid push configuration: {0}")]
    Config(String),
}

/// Delivers a notification to one user.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notification: NewNotification) -> Result<(), NotifyError>;
}

/// Persists notifications for the in-app inbox and optionally pushes them to a webhook.
pub struct DispatchNotifier {
    repo: Arc<dyn Repository>,
    push: Option<WebhookPush>,
}

impl DispatchNotifier {
    pub fn new(repo: Arc<dyn Repository>, config: &NotifyConfig) -> Result<Self, NotifyError> {
        let push = match &config.webhook_url {
            Some(url) => Some(WebhookPush::new(url, Duration::from_secs(config.timeout_secs))?),
            None => None,
        };
        Ok(Self { repo, push })
    }
}

#[async_trait]
impl Notifier for DispatchNotifier {
    async fn notify(&self, notification: NewNotification) -> Result<(), NotifyError> {
        let stored = self.repo.create_notification(notification).await?;
        if let Some(push) = &self.push {
            push.send(&stored).await?;
        }
        Ok(())
    }
}

/// JSON POST of each stored notification to an external push dispatcher.
pub struct WebhookPush {
    client: reqwest::Client,
    url: url::Url,
}

impl WebhookPush {
    pub fn new(url: &str, timeout: Duration) -> Result<Self, NotifyError> {
        let url = url::Url::parse(url).map_err(|e| NotifyError::Config(format!("{}: {}", url, e)))?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| NotifyError::Config(e.to_string()))?;
        Ok(Self { client, url })
    }

    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        self.client
            .post(self.url.clone())
            .json(notification)
            .send()
            .await
            .and_then(|resp| resp.error_for_status())
            .map_err(|e| NotifyError::Push(e.to_string()))?;
        Ok(())
    }
}

/// Outcome of a best-effort fan-out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Delivery {
    pub attempted: usize,
    pub failed: usize,
}

impl Delivery {
    pub fn all_delivered(&self) -> bool {
        self.failed == 0
    }
}

/// Send every notification concurrently. Failures are logged and counted, never returned.
pub async fn notify_best_effort(notifier: &dyn Notifier, notifications: Vec<NewNotification>) -> Delivery {
    let attempted = notifications.len();
    let results = join_all(notifications.into_iter().map(|n| async move {
        let user_id = n.user_id;
        let kind = n.kind;
        (user_id, kind, notifier.notify(n).await)
    }))
    .await;

    let mut failed = 0;
    for (user_id, kind, result) in results {
        if let Err(e) = result {
            failed += 1;
            tracing::warn!(%user_id, ?kind, "Notification delivery failed: {}", e);
        }
    }

    Delivery { attempted, failed }
}
