//! Record store - notification and recording entries
//!
//! ## Responsibilities
//!
//! - Hold the notification/recording record pair produced per admitted event
//! - Serve lookups for channel adapters and hosts
//! - Provide the deletion target for the expiry scheduler
//!
//! Both collections are in-memory, keyed by the correlation token.

use crate::event::EventKind;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Notification entry; serialized as-is for webhook and push payloads
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationRecord {
    /// Correlation token
    pub id: String,
    pub camera_id: String,
    pub kind: EventKind,
    /// Local time, "DD.MM.YYYY, HH:mm:ss"
    pub time: String,
    /// Epoch seconds
    pub timestamp: i64,
    /// Matched detection labels, None when the event ran unfiltered
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
}

/// Recording entry; `file_name` points at the stored media
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordingRecord {
    /// Correlation token, shared with the paired notification
    pub id: String,
    pub camera_id: String,
    pub kind: EventKind,
    pub time: String,
    pub timestamp: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
    /// "<id>.mp4" when the configured output is Video, else "<id>.jpeg"
    pub file_name: String,
}

/// RecordStore instance
#[derive(Default)]
pub struct RecordStore {
    notifications: RwLock<HashMap<String, NotificationRecord>>,
    recordings: RwLock<HashMap<String, RecordingRecord>>,
}

impl RecordStore {
    /// Create new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a notification record
    pub async fn insert_notification(&self, record: NotificationRecord) {
        let mut notifications = self.notifications.write().await;
        notifications.insert(record.id.clone(), record);
    }

    /// Add a recording record
    pub async fn insert_recording(&self, record: RecordingRecord) {
        let mut recordings = self.recordings.write().await;
        recordings.insert(record.id.clone(), record);
    }

    pub async fn get_notification(&self, id: &str) -> Option<NotificationRecord> {
        self.notifications.read().await.get(id).cloned()
    }

    pub async fn get_recording(&self, id: &str) -> Option<RecordingRecord> {
        self.recordings.read().await.get(id).cloned()
    }

    /// Remove a notification record (expiry path)
    pub async fn remove_notification(&self, id: &str) -> Option<NotificationRecord> {
        let removed = self.notifications.write().await.remove(id);
        if removed.is_some() {
            tracing::debug!(id = %id, "Notification record removed");
        }
        removed
    }

    /// Remove a recording record (expiry path)
    pub async fn remove_recording(&self, id: &str) -> Option<RecordingRecord> {
        let removed = self.recordings.write().await.remove(id);
        if removed.is_some() {
            tracing::debug!(id = %id, "Recording record removed");
        }
        removed
    }

    pub async fn notification_count(&self) -> usize {
        self.notifications.read().await.len()
    }

    pub async fn recording_count(&self) -> usize {
        self.recordings.read().await.len()
    }

    /// Notifications, newest first
    pub async fn list_notifications(&self) -> Vec<NotificationRecord> {
        let mut records: Vec<_> = self.notifications.read().await.values().cloned().collect();
        records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        records
    }

    /// Recordings, newest first
    pub async fn list_recordings(&self) -> Vec<RecordingRecord> {
        let mut records: Vec<_> = self.recordings.read().await.values().cloned().collect();
        records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        records
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notification(id: &str, timestamp: i64) -> NotificationRecord {
        NotificationRecord {
            id: id.to_string(),
            camera_id: "cam-001".to_string(),
            kind: EventKind::Motion,
            time: "01.01.2026, 12:00:00".to_string(),
            timestamp,
            labels: None,
        }
    }

    #[tokio::test]
    async fn test_insert_get_remove() {
        let store = RecordStore::new();

        store.insert_notification(notification("abc", 100)).await;
        assert_eq!(store.notification_count().await, 1);
        assert!(store.get_notification("abc").await.is_some());

        let removed = store.remove_notification("abc").await;
        assert!(removed.is_some());
        assert!(store.get_notification("abc").await.is_none());

        // Second removal is a no-op
        assert!(store.remove_notification("abc").await.is_none());
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let store = RecordStore::new();

        store.insert_notification(notification("old", 100)).await;
        store.insert_notification(notification("new", 300)).await;
        store.insert_notification(notification("mid", 200)).await;

        let listed = store.list_notifications().await;
        let ids: Vec<_> = listed.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["new", "mid", "old"]);
    }

    #[tokio::test]
    async fn test_collections_independent() {
        let store = RecordStore::new();

        store.insert_notification(notification("abc", 100)).await;
        store
            .insert_recording(RecordingRecord {
                id: "abc".to_string(),
                camera_id: "cam-001".to_string(),
                kind: EventKind::Motion,
                time: "01.01.2026, 12:00:00".to_string(),
                timestamp: 100,
                labels: None,
                file_name: "abc.mp4".to_string(),
            })
            .await;

        store.remove_notification("abc").await;
        assert_eq!(store.notification_count().await, 0);
        assert_eq!(store.recording_count().await, 1);
    }
}
