//! HTTP adapter for the label detection backend
//!
//! Posts the JPEG buffer as multipart form data to `<endpoint>/v1/labels`
//! and expects `{"labels": [{"name": ..., "confidence": ...}]}` back.

use super::{DetectedLabel, LabelDetector};
use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use std::time::Duration;

/// Label service response body
#[derive(Debug, Deserialize)]
struct LabelResponse {
    #[serde(default)]
    labels: Vec<DetectedLabel>,
}

/// HTTP label detection client
pub struct HttpLabelDetector {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpLabelDetector {
    /// Create new client; the endpoint must be a valid absolute URL
    pub fn new(endpoint: &str, api_key: Option<String>) -> Result<Self> {
        let url = reqwest::Url::parse(endpoint).map_err(|e| {
            Error::Config(format!("Invalid detection endpoint '{}': {}", endpoint, e))
        })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client");

        Ok(Self {
            client,
            base_url: url.as_str().trim_end_matches('/').to_string(),
            api_key,
        })
    }

    /// Get base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl LabelDetector for HttpLabelDetector {
    async fn detect_labels(&self, image: &[u8]) -> Result<Vec<DetectedLabel>> {
        let url = format!("{}/v1/labels", self.base_url);

        let form = Form::new().part(
            "image",
            Part::bytes(image.to_vec())
                .file_name("snapshot.jpg")
                .mime_str("image/jpeg")?,
        );

        let mut request = self.client.post(&url).multipart(form);
        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key);
        }

        let resp = request.send().await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Detection(format!(
                "Label service returned {}: {}",
                status, body
            )));
        }

        let result: LabelResponse = resp.json().await?;
        Ok(result.labels)
    }
}
