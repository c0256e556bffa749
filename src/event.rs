//! Motion event and correlation types
//!
//! ## Responsibilities
//!
//! - Raw trigger representation (motion / doorbell)
//! - Correlation context shared by the notification and recording records
//! - Token and timestamp generation

use chrono::Local;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Trigger type reported by the camera accessory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Motion,
    Doorbell,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Motion => "motion",
            EventKind::Doorbell => "doorbell",
        }
    }
}

/// Raw trigger from a camera accessory. Ephemeral, never persisted.
#[derive(Debug, Clone)]
pub struct MotionEvent {
    pub camera_id: String,
    pub kind: EventKind,
    /// false signals the end of a motion phase; only active events enter the pipeline
    pub active: bool,
}

impl MotionEvent {
    pub fn new(camera_id: impl Into<String>, kind: EventKind, active: bool) -> Self {
        Self {
            camera_id: camera_id.into(),
            kind,
            active,
        }
    }
}

/// Capture time in both human-readable and epoch form
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventTime {
    /// Local time, "DD.MM.YYYY, HH:mm:ss"
    pub formatted: String,
    /// Epoch seconds
    pub epoch: i64,
}

impl EventTime {
    /// Capture the current local time
    pub fn now() -> Self {
        let now = Local::now();
        Self {
            formatted: now.format("%d.%m.%Y, %H:%M:%S").to_string(),
            epoch: now.timestamp(),
        }
    }
}

/// Context created once per admitted event and shared by the record pair.
/// Immutable after creation; the token ties on-disk media to log entries.
#[derive(Debug, Clone)]
pub struct CorrelationContext {
    /// Opaque unique hex token, doubles as the record id and media file stem
    pub token: String,
    pub time: EventTime,
    /// Whether a recording session was granted for this event
    pub will_record: bool,
}

impl CorrelationContext {
    /// Create a fresh context with a random token and the current time
    pub fn create(will_record: bool) -> Self {
        Self {
            token: Uuid::new_v4().simple().to_string(),
            time: EventTime::now(),
            will_record,
        }
    }
}
