//! Webhook channel - per-camera HTTP endpoint notification
//!
//! One POST per event carrying the serialized notification record.

use crate::error::Result;
use crate::records::NotificationRecord;
use crate::settings::WebhookSettings;
use std::time::Duration;

/// Webhook dispatch adapter
pub struct WebhookChannel {
    client: reqwest::Client,
}

impl WebhookChannel {
    /// Create new channel
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client");

        Self { client }
    }

    /// POST the notification to the camera's endpoint, if configured.
    ///
    /// Unconfigured cameras and malformed endpoints skip with a log;
    /// transport failures surface as errors for the supervisor.
    pub async fn dispatch(
        &self,
        record: &NotificationRecord,
        settings: &WebhookSettings,
    ) -> Result<()> {
        if !settings.active {
            return Ok(());
        }

        let endpoint = match settings.cameras.get(&record.camera_id) {
            Some(camera) if !camera.endpoint.trim().is_empty() => camera.endpoint.clone(),
            _ => return Ok(()),
        };

        let url = match reqwest::Url::parse(&endpoint) {
            Ok(url) => url,
            Err(_) => {
                tracing::warn!(
                    camera_id = %record.camera_id,
                    endpoint = %endpoint,
                    "Webhook endpoint is not a valid URL"
                );
                return Ok(());
            }
        };

        tracing::debug!(camera_id = %record.camera_id, endpoint = %endpoint, "Triggering webhook");

        let resp = self.client.post(url).json(record).send().await?;
        resp.error_for_status()?;

        tracing::debug!(camera_id = %record.camera_id, endpoint = %endpoint, "Webhook payload sent");

        Ok(())
    }
}

impl Default for WebhookChannel {
    fn default() -> Self {
        Self::new()
    }
}
