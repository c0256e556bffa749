//! Detection filter - label-based motion validation
//!
//! ## Responsibilities
//!
//! - Decide whether an admitted event survives image-label filtering
//! - Backend contract (`LabelDetector`) + HTTP adapter
//!
//! A camera without detection configuration passes unfiltered. A configured
//! camera passes only when the backend reports a label that is both in the
//! configured list and above the confidence threshold. A backend failure is
//! treated exactly like "no matching label": the event is dropped. The two
//! cases are logged differently but are indistinguishable to the caller.

mod client;

pub use client::HttpLabelDetector;

use crate::error::Result;
use crate::settings::DetectionSettings;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A label reported by the detection backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectedLabel {
    pub name: String,
    /// Percent, 0-100
    pub confidence: f32,
}

/// Label detection backend
#[async_trait]
pub trait LabelDetector: Send + Sync {
    async fn detect_labels(&self, image: &[u8]) -> Result<Vec<DetectedLabel>>;
}

/// Filter outcome
#[derive(Debug, Clone, PartialEq)]
pub enum FilterVerdict {
    /// Detection not configured for this camera, or no backend available
    Unfiltered,
    /// Qualifying labels found, names in the backend's casing
    Matched(Vec<String>),
    /// No qualifying label, or the backend failed
    Rejected,
}

/// DetectionFilter instance
pub struct DetectionFilter {
    detector: Option<Arc<dyn LabelDetector>>,
}

impl DetectionFilter {
    /// Create new filter; None disables detection globally
    pub fn new(detector: Option<Arc<dyn LabelDetector>>) -> Self {
        Self { detector }
    }

    pub fn has_detector(&self) -> bool {
        self.detector.is_some()
    }

    /// Evaluate an image against the camera's detection configuration
    pub async fn evaluate(
        &self,
        camera_id: &str,
        image: &[u8],
        settings: &DetectionSettings,
    ) -> FilterVerdict {
        let config = match settings.cameras.get(camera_id) {
            Some(config) if config.active => config,
            _ => return FilterVerdict::Unfiltered,
        };

        let detector = match &self.detector {
            Some(detector) => detector,
            None => return FilterVerdict::Unfiltered,
        };

        tracing::debug!(
            camera_id = %camera_id,
            labels = ?config.labels,
            "Analyzing image for configured labels"
        );

        match detector.detect_labels(image).await {
            Ok(labels) => {
                let matched: Vec<String> = labels
                    .iter()
                    .filter(|label| {
                        config.labels.contains(&label.name.to_lowercase())
                            && label.confidence >= config.confidence
                    })
                    .map(|label| label.name.clone())
                    .collect();

                if matched.is_empty() {
                    tracing::debug!(
                        camera_id = %camera_id,
                        min_confidence = config.confidence,
                        "No configured label detected"
                    );
                    FilterVerdict::Rejected
                } else {
                    tracing::debug!(camera_id = %camera_id, matched = ?matched, "Labels detected");
                    FilterVerdict::Matched(matched)
                }
            }
            Err(e) => {
                tracing::error!(camera_id = %camera_id, error = %e, "Image analysis failed");
                FilterVerdict::Rejected
            }
        }
    }
}
