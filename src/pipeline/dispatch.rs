//! Dispatch orchestrator
//!
//! Fans one admitted event out to storage, broadcast and the notification
//! channels. The two branches order their sends differently:
//!
//! - recording: messaging first (raw frame as preview), then snapshot +
//!   video persistence, session release, broadcast and push
//! - not recording: snapshot persistence first, broadcast and push, then
//!   messaging referencing the stored file
//!
//! Webhook and push run as supervised detached tasks; messaging is awaited
//! behind its own error boundary. Only persistence failures abort the
//! remaining dispatch, and the session is released even then.

use crate::broadcast::Broadcaster;
use crate::channels::{
    ChannelKind, DispatchSupervisor, MessagingChannel, PushChannel, WebhookChannel,
};
use crate::error::Result;
use crate::media::Recorder;
use crate::pipeline::CorrelatedRecords;
use crate::session_registry::SessionRegistry;
use crate::settings::Settings;
use std::sync::Arc;

/// Dispatcher instance
pub struct Dispatcher {
    recorder: Arc<dyn Recorder>,
    broadcaster: Arc<dyn Broadcaster>,
    registry: Arc<SessionRegistry>,
    webhook: Arc<WebhookChannel>,
    messaging: Arc<MessagingChannel>,
    push: Arc<PushChannel>,
    supervisor: DispatchSupervisor,
}

impl Dispatcher {
    /// Create new dispatcher
    pub fn new(
        recorder: Arc<dyn Recorder>,
        broadcaster: Arc<dyn Broadcaster>,
        registry: Arc<SessionRegistry>,
        webhook: Arc<WebhookChannel>,
        messaging: Arc<MessagingChannel>,
        push: Arc<PushChannel>,
        supervisor: DispatchSupervisor,
    ) -> Self {
        Self {
            recorder,
            broadcaster,
            registry,
            webhook,
            messaging,
            push,
            supervisor,
        }
    }

    /// Fan out one admitted event
    pub async fn dispatch(
        &self,
        records: &CorrelatedRecords,
        snapshot: Vec<u8>,
        settings: &Settings,
    ) -> Result<()> {
        let camera_id = records.notification.camera_id.clone();

        self.spawn_webhook(records, settings);

        if records.will_record {
            // Messaging sees the raw frame before the video lands on disk
            if let Err(e) = self
                .messaging
                .dispatch(&records.notification, settings, true, Some(&snapshot))
                .await
            {
                tracing::error!(camera_id = %camera_id, error = %e, "Messaging dispatch failed");
            }

            let persisted = self.persist_recording(records, &snapshot, settings).await;
            self.registry.close_session(&camera_id).await;
            persisted?;

            self.broadcast_and_push(records).await;
        } else {
            self.recorder
                .store_snapshot(
                    &camera_id,
                    &records.recording,
                    &snapshot,
                    &settings.recordings.path,
                    false,
                )
                .await?;

            self.broadcast_and_push(records).await;

            if let Err(e) = self
                .messaging
                .dispatch(&records.notification, settings, false, None)
                .await
            {
                tracing::error!(camera_id = %camera_id, error = %e, "Messaging dispatch failed");
            }
        }

        Ok(())
    }

    /// Snapshot (intermediate) + video persistence for a granted session
    async fn persist_recording(
        &self,
        records: &CorrelatedRecords,
        snapshot: &[u8],
        settings: &Settings,
    ) -> Result<()> {
        let camera_id = &records.notification.camera_id;
        let path = &settings.recordings.path;

        self.recorder
            .store_snapshot(camera_id, &records.recording, snapshot, path, true)
            .await?;
        self.recorder
            .store_video(camera_id, &records.recording, path, settings.recordings.timer_sec)
            .await?;

        Ok(())
    }

    fn spawn_webhook(&self, records: &CorrelatedRecords, settings: &Settings) {
        let webhook = self.webhook.clone();
        let record = records.notification.clone();
        let webhook_settings = settings.webhook.clone();
        let supervisor = self.supervisor.clone();

        tokio::spawn(async move {
            let result = webhook.dispatch(&record, &webhook_settings).await;
            supervisor.report(ChannelKind::Webhook, &record.camera_id, result);
        });
    }

    async fn broadcast_and_push(&self, records: &CorrelatedRecords) {
        self.broadcaster
            .broadcast("notification", &records.notification)
            .await;
        self.broadcaster.append_log(&records.notification).await;

        let push = self.push.clone();
        let record = records.notification.clone();
        let supervisor = self.supervisor.clone();

        tokio::spawn(async move {
            let result = push.dispatch(&record).await;
            supervisor.report(ChannelKind::Push, &record.camera_id, result);
        });
    }
}
