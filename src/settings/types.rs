//! Settings data types
//!
//! Typed view of the settings document. Every section has a `Default` so a
//! partial document deserializes into a complete structure.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

/// Root settings document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub general: GeneralSettings,
    #[serde(default)]
    pub recordings: RecordingSettings,
    #[serde(default)]
    pub notifications: NotificationSettings,
    #[serde(default)]
    pub detection: DetectionSettings,
    #[serde(default)]
    pub webhook: WebhookSettings,
    #[serde(default)]
    pub telegram: TelegramSettings,
    #[serde(default)]
    pub webpush: WebpushSettings,
}

/// General section (presence handling)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralSettings {
    /// While true, only excluded cameras pass the motion gate
    #[serde(default)]
    pub at_home: bool,
    /// Camera ids exempt from the at-home suppression
    #[serde(default)]
    pub exclude: Vec<String>,
}

/// Recording output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordingOutput {
    Snapshot,
    Video,
}

impl Default for RecordingOutput {
    fn default() -> Self {
        Self::Snapshot
    }
}

/// Recordings section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordingSettings {
    #[serde(default)]
    pub active: bool,
    /// Media directory, also referenced by the messaging channel
    #[serde(default = "default_recording_path")]
    pub path: String,
    /// Video duration in seconds
    #[serde(default = "default_recording_timer")]
    pub timer_sec: u64,
    #[serde(default)]
    pub output: RecordingOutput,
    /// Recording record TTL; 0 or non-numeric disables expiry
    #[serde(default, deserialize_with = "lenient_ttl")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remove_after_sec: Option<u64>,
}

impl Default for RecordingSettings {
    fn default() -> Self {
        Self {
            active: false,
            path: default_recording_path(),
            timer_sec: default_recording_timer(),
            output: RecordingOutput::default(),
            remove_after_sec: None,
        }
    }
}

fn default_recording_path() -> String {
    "./recordings".to_string()
}

fn default_recording_timer() -> u64 {
    10
}

/// Notifications section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotificationSettings {
    /// Notification record TTL; 0 or non-numeric disables expiry
    #[serde(default, deserialize_with = "lenient_ttl")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clear_timer_sec: Option<u64>,
}

/// Detection section (image label filtering)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DetectionSettings {
    /// Label service base URL; unset disables detection globally
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Per-camera filter configuration
    #[serde(default)]
    pub cameras: HashMap<String, CameraDetection>,
}

/// Per-camera detection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraDetection {
    #[serde(default)]
    pub active: bool,
    /// Lowercased label names admitted by the filter
    #[serde(default)]
    pub labels: Vec<String>,
    /// Minimum confidence (percent) for a label to count
    #[serde(default = "default_confidence")]
    pub confidence: f32,
}

impl Default for CameraDetection {
    fn default() -> Self {
        Self {
            active: false,
            labels: Vec::new(),
            confidence: default_confidence(),
        }
    }
}

fn default_confidence() -> f32 {
    90.0
}

/// Webhook section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WebhookSettings {
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub cameras: HashMap<String, WebhookCamera>,
}

/// Per-camera webhook endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WebhookCamera {
    #[serde(default)]
    pub endpoint: String,
}

/// Messaging content mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessagingMode {
    Text,
    Snapshot,
    Video,
}

impl Default for MessagingMode {
    fn default() -> Self {
        Self::Text
    }
}

/// Telegram section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TelegramSettings {
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub chat_id: String,
    /// Message template; `@` is replaced with the camera id
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub motion_text: Option<String>,
    #[serde(default)]
    pub cameras: HashMap<String, TelegramCamera>,
}

/// Per-camera messaging mode
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TelegramCamera {
    #[serde(default)]
    pub mode: MessagingMode,
}

/// Web push section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WebpushSettings {
    #[serde(default)]
    pub public_key: String,
    #[serde(default)]
    pub private_key: String,
    /// Stored browser subscription; cleared when the transport reports it gone
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscription: Option<PushSubscription>,
}

/// Push subscription (endpoint + auth keys)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushSubscription {
    pub endpoint: String,
    pub keys: SubscriptionKeys,
}

/// Push subscription keys
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionKeys {
    pub p256dh: String,
    pub auth: String,
}

/// Lenient TTL parsing: accepts a non-negative integer or a string with a
/// leading integer part; anything else becomes None. The UI historically
/// wrote these fields as strings.
fn lenient_ttl<'de, D>(deserializer: D) -> std::result::Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;

    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_u64(),
        Some(serde_json::Value::String(s)) => {
            let digits: String = s.trim().chars().take_while(|c| c.is_ascii_digit()).collect();
            digits.parse::<u64>().ok()
        }
        _ => None,
    })
}
