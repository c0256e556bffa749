//! Correlation coordinator
//!
//! Creates the notification/recording record pair for an admitted event.
//! Both records share the correlation token and capture time; their
//! lifetimes are independent (separate TTLs, separate expiry timers).

use crate::event::{CorrelationContext, MotionEvent};
use crate::expiry::ExpiryScheduler;
use crate::records::{NotificationRecord, RecordStore, RecordingRecord};
use crate::session_registry::SessionRegistry;
use crate::settings::{RecordingOutput, Settings};
use std::sync::Arc;

/// The record pair produced for one admitted event
#[derive(Debug, Clone)]
pub struct CorrelatedRecords {
    pub notification: NotificationRecord,
    pub recording: RecordingRecord,
    /// Recording session grant for this event
    pub will_record: bool,
}

/// Coordinator instance
pub struct Coordinator {
    registry: Arc<SessionRegistry>,
    records: Arc<RecordStore>,
    expiry: Arc<dyn ExpiryScheduler>,
}

impl Coordinator {
    /// Create new coordinator
    pub fn new(
        registry: Arc<SessionRegistry>,
        records: Arc<RecordStore>,
        expiry: Arc<dyn ExpiryScheduler>,
    ) -> Self {
        Self {
            registry,
            records,
            expiry,
        }
    }

    /// Build and store the record pair, schedule expiry per settings
    pub async fn correlate(
        &self,
        event: &MotionEvent,
        labels: Option<Vec<String>>,
        settings: &Settings,
    ) -> CorrelatedRecords {
        let will_record = self.registry.request_session(&event.camera_id).await;
        let context = CorrelationContext::create(will_record);

        tracing::debug!(
            camera_id = %event.camera_id,
            token = %context.token,
            will_record,
            "Correlation context created"
        );

        let file_name = match settings.recordings.output {
            RecordingOutput::Video => format!("{}.mp4", context.token),
            RecordingOutput::Snapshot => format!("{}.jpeg", context.token),
        };

        let notification = NotificationRecord {
            id: context.token.clone(),
            camera_id: event.camera_id.clone(),
            kind: event.kind,
            time: context.time.formatted.clone(),
            timestamp: context.time.epoch,
            labels: labels.clone(),
        };

        let recording = RecordingRecord {
            id: context.token.clone(),
            camera_id: event.camera_id.clone(),
            kind: event.kind,
            time: context.time.formatted.clone(),
            timestamp: context.time.epoch,
            labels,
            file_name,
        };

        self.records.insert_notification(notification.clone()).await;
        self.records.insert_recording(recording.clone()).await;

        if let Some(ttl) = settings.notifications.clear_timer_sec {
            if ttl > 0 {
                self.expiry
                    .schedule_notification_expiry(&context.token, ttl)
                    .await;
            }
        }

        if let Some(ttl) = settings.recordings.remove_after_sec {
            if ttl > 0 {
                self.expiry
                    .schedule_recording_expiry(&context.token, ttl)
                    .await;
            }
        }

        CorrelatedRecords {
            notification,
            recording,
            will_record,
        }
    }
}
