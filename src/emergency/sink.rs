//! Alert delivery backends

use std::time::Duration;

use async_trait::async_trait;

use super::AlertRecord;
use crate::{Error, Result};

/// Destination for staff alerts
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Deliver an alert
    ///
    /// # Errors
    ///
    /// Returns error if the alert could not be delivered
    async fn publish(&self, alert: &AlertRecord) -> Result<()>;

    /// Sink name, for logs
    fn name(&self) -> &'static str;
}

/// Writes alerts to the log only
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

#[async_trait]
impl NotificationSink for LogSink {
    async fn publish(&self, alert: &AlertRecord) -> Result<()> {
        let record = serde_json::to_string(alert)?;
        tracing::warn!(alert = %record, "alert sent to staff");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "log"
    }
}

/// POSTs alerts as JSON to a staff dashboard webhook
#[derive(Debug, Clone)]
pub struct WebhookSink {
    client: reqwest::Client,
    url: String,
}

impl WebhookSink {
    /// Create a webhook sink
    ///
    /// # Errors
    ///
    /// Returns error if the URL is empty or the HTTP client cannot be built
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let url = url.into();
        if url.trim().is_empty() {
            return Err(Error::Config("alert webhook URL is empty".to_string()));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self { client, url })
    }
}

#[async_trait]
impl NotificationSink for WebhookSink {
    async fn publish(&self, alert: &AlertRecord) -> Result<()> {
        let response = self
            .client
            .post(&self.url)
            .json(alert)
            .send()
            .await
            .map_err(|e| Error::Notification(format!("alert webhook unreachable: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Notification(format!(
                "alert webhook rejected alert {status}: {body}"
            )));
        }

        tracing::debug!(url = %self.url, "alert delivered to webhook");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "webhook"
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::emergency::LocationInfo;

    #[tokio::test]
    async fn log_sink_accepts_alerts() {
        let alert = AlertRecord::new(&LocationInfo::default(), Utc::now());
        assert!(LogSink.publish(&alert).await.is_ok());
    }

    #[test]
    fn webhook_requires_url() {
        assert!(matches!(WebhookSink::new(" "), Err(Error::Config(_))));
    }
}
