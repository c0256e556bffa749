//! Expiry scheduling for notification and recording records
//!
//! ## Responsibilities
//!
//! - Scheduling contract (`ExpiryScheduler`) for hosts with their own timer
//!   infrastructure
//! - Default timer implementation: one task per scheduled id, removal from
//!   the record store when the TTL elapses
//!
//! Notification and recording timers are independent; re-scheduling an id
//! replaces its pending timer.

use crate::records::RecordStore;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// Scheduling contract used by the coordinator
#[async_trait]
pub trait ExpiryScheduler: Send + Sync {
    /// Remove the notification record after `ttl_secs`
    async fn schedule_notification_expiry(&self, id: &str, ttl_secs: u64);

    /// Remove the recording record after `ttl_secs`
    async fn schedule_recording_expiry(&self, id: &str, ttl_secs: u64);

    /// Drop a pending notification timer (manual deletion)
    async fn cancel_notification(&self, id: &str);

    /// Drop a pending recording timer (manual deletion)
    async fn cancel_recording(&self, id: &str);
}

type TimerMap = Arc<Mutex<HashMap<String, JoinHandle<()>>>>;

/// Which store collection a timer targets
#[derive(Clone, Copy)]
enum RecordClass {
    Notification,
    Recording,
}

/// Timer-based scheduler backed by the record store
pub struct TimerExpiry {
    store: Arc<RecordStore>,
    notification_timers: TimerMap,
    recording_timers: TimerMap,
}

impl TimerExpiry {
    /// Create new scheduler over a store
    pub fn new(store: Arc<RecordStore>) -> Self {
        Self {
            store,
            notification_timers: Arc::new(Mutex::new(HashMap::new())),
            recording_timers: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    async fn schedule_removal(&self, timers: &TimerMap, id: &str, ttl_secs: u64, class: RecordClass) {
        if ttl_secs == 0 {
            return;
        }

        let store = self.store.clone();
        let map = timers.clone();
        let owned_id = id.to_string();

        let handle = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(ttl_secs)).await;
            match class {
                RecordClass::Notification => {
                    store.remove_notification(&owned_id).await;
                }
                RecordClass::Recording => {
                    store.remove_recording(&owned_id).await;
                }
            }
            map.lock().await.remove(&owned_id);
        });

        let mut map = timers.lock().await;
        if let Some(previous) = map.insert(id.to_string(), handle) {
            previous.abort();
        }
        tracing::debug!(id = %id, ttl_secs, "Expiry scheduled");
    }

    async fn cancel(timers: &TimerMap, id: &str) {
        if let Some(handle) = timers.lock().await.remove(id) {
            handle.abort();
            tracing::debug!(id = %id, "Expiry cancelled");
        }
    }

    /// Pending notification timers (debug aid)
    pub async fn notification_timer_count(&self) -> usize {
        self.notification_timers.lock().await.len()
    }

    /// Pending recording timers (debug aid)
    pub async fn recording_timer_count(&self) -> usize {
        self.recording_timers.lock().await.len()
    }
}

#[async_trait]
impl ExpiryScheduler for TimerExpiry {
    async fn schedule_notification_expiry(&self, id: &str, ttl_secs: u64) {
        self.schedule_removal(&self.notification_timers, id, ttl_secs, RecordClass::Notification)
            .await;
    }

    async fn schedule_recording_expiry(&self, id: &str, ttl_secs: u64) {
        self.schedule_removal(&self.recording_timers, id, ttl_secs, RecordClass::Recording)
            .await;
    }

    async fn cancel_notification(&self, id: &str) {
        Self::cancel(&self.notification_timers, id).await;
    }

    async fn cancel_recording(&self, id: &str) {
        Self::cancel(&self.recording_timers, id).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventKind;
    use crate::records::{NotificationRecord, RecordingRecord};

    fn notification(id: &str) -> NotificationRecord {
        NotificationRecord {
            id: id.to_string(),
            camera_id: "cam-001".to_string(),
            kind: EventKind::Motion,
            time: "01.01.2026, 12:00:00".to_string(),
            timestamp: 100,
            labels: None,
        }
    }

    fn recording(id: &str) -> RecordingRecord {
        RecordingRecord {
            id: id.to_string(),
            camera_id: "cam-001".to_string(),
            kind: EventKind::Motion,
            time: "01.01.2026, 12:00:00".to_string(),
            timestamp: 100,
            labels: None,
            file_name: format!("{}.jpeg", id),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_notification_removed_after_ttl() {
        let store = Arc::new(RecordStore::new());
        let expiry = TimerExpiry::new(store.clone());

        store.insert_notification(notification("abc")).await;
        expiry.schedule_notification_expiry("abc", 60).await;

        tokio::time::sleep(Duration::from_secs(59)).await;
        assert!(store.get_notification("abc").await.is_some());

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(store.get_notification("abc").await.is_none());
        assert_eq!(expiry.notification_timer_count().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_independent_ttls() {
        let store = Arc::new(RecordStore::new());
        let expiry = TimerExpiry::new(store.clone());

        store.insert_notification(notification("abc")).await;
        store.insert_recording(recording("abc")).await;
        expiry.schedule_notification_expiry("abc", 30).await;
        expiry.schedule_recording_expiry("abc", 300).await;

        tokio::time::sleep(Duration::from_secs(31)).await;
        assert!(store.get_notification("abc").await.is_none());
        assert!(store.get_recording("abc").await.is_some());

        tokio::time::sleep(Duration::from_secs(270)).await;
        assert!(store.get_recording("abc").await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_ttl_schedules_nothing() {
        let store = Arc::new(RecordStore::new());
        let expiry = TimerExpiry::new(store.clone());

        store.insert_notification(notification("abc")).await;
        expiry.schedule_notification_expiry("abc", 0).await;

        assert_eq!(expiry.notification_timer_count().await, 0);
        tokio::time::sleep(Duration::from_secs(3600)).await;
        assert!(store.get_notification("abc").await.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_prevents_removal() {
        let store = Arc::new(RecordStore::new());
        let expiry = TimerExpiry::new(store.clone());

        store.insert_notification(notification("abc")).await;
        expiry.schedule_notification_expiry("abc", 60).await;
        expiry.cancel_notification("abc").await;

        tokio::time::sleep(Duration::from_secs(120)).await;
        assert!(store.get_notification("abc").await.is_some());
        assert_eq!(expiry.notification_timer_count().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reschedule_replaces_timer() {
        let store = Arc::new(RecordStore::new());
        let expiry = TimerExpiry::new(store.clone());

        store.insert_notification(notification("abc")).await;
        expiry.schedule_notification_expiry("abc", 600).await;
        expiry.schedule_notification_expiry("abc", 30).await;
        assert_eq!(expiry.notification_timer_count().await, 1);

        tokio::time::sleep(Duration::from_secs(31)).await;
        assert!(store.get_notification("abc").await.is_none());
    }
}
