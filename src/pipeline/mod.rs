//! Motion pipeline - gate, filter, correlate, dispatch
//!
//! ## Responsibilities
//!
//! - Entry point for camera motion/doorbell triggers
//! - Admission (motion gate) and label filtering
//! - Correlated record creation with independent expiry
//! - Channel fan-out with per-channel failure isolation
//!
//! Events are processed independently and may run concurrently; the only
//! cross-event coordination points are the session registry, the messaging
//! connection cache and the push key handoff.

mod coordinator;
mod dispatch;

pub use coordinator::{CorrelatedRecords, Coordinator};
pub use dispatch::Dispatcher;

use crate::broadcast::Broadcaster;
use crate::channels::{
    DispatchSupervisor, MessagingChannel, MessagingTransport, PushChannel, PushTransport,
    WebhookChannel,
};
use crate::detection::{DetectionFilter, FilterVerdict, HttpLabelDetector, LabelDetector};
use crate::error::Result;
use crate::event::MotionEvent;
use crate::expiry::{ExpiryScheduler, TimerExpiry};
use crate::media::Recorder;
use crate::motion_gate::{self, GateDecision, GateRejection};
use crate::records::RecordStore;
use crate::session_registry::SessionRegistry;
use crate::settings::{DetectionSettings, SettingsStore};
use std::sync::Arc;

/// Why an event produced no dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Trigger reported the end of a motion phase
    Inactive,
    /// At-home suppression and the camera is not excluded
    AtHome,
    /// No qualifying label (or the detection backend failed)
    NoMatch,
}

impl From<GateRejection> for SkipReason {
    fn from(rejection: GateRejection) -> Self {
        match rejection {
            GateRejection::Inactive => SkipReason::Inactive,
            GateRejection::AtHome => SkipReason::AtHome,
        }
    }
}

/// Pipeline outcome for one trigger
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Event fanned out; the token identifies the record pair
    Dispatched { token: String, recorded: bool },
    /// Event dropped before any records or sends
    Skipped(SkipReason),
}

/// MotionPipeline instance
pub struct MotionPipeline {
    settings: Arc<SettingsStore>,
    recorder: Arc<dyn Recorder>,
    records: Arc<RecordStore>,
    registry: Arc<SessionRegistry>,
    filter: DetectionFilter,
    coordinator: Coordinator,
    dispatcher: Dispatcher,
}

impl MotionPipeline {
    /// Create new pipeline; the label detector is built from the settings
    /// document (an invalid endpoint downgrades detection to unavailable)
    pub async fn new(
        settings: Arc<SettingsStore>,
        recorder: Arc<dyn Recorder>,
        broadcaster: Arc<dyn Broadcaster>,
        messaging: Arc<dyn MessagingTransport>,
        push: Arc<dyn PushTransport>,
    ) -> Self {
        let detector = build_detector(&settings.snapshot().await.detection);
        let records = Arc::new(RecordStore::new());
        let expiry: Arc<dyn ExpiryScheduler> = Arc::new(TimerExpiry::new(records.clone()));

        Self::with_components(
            settings,
            recorder,
            broadcaster,
            messaging,
            push,
            detector,
            records,
            expiry,
        )
    }

    /// Create new pipeline from explicit components (custom detector,
    /// record store or expiry scheduler)
    pub fn with_components(
        settings: Arc<SettingsStore>,
        recorder: Arc<dyn Recorder>,
        broadcaster: Arc<dyn Broadcaster>,
        messaging: Arc<dyn MessagingTransport>,
        push: Arc<dyn PushTransport>,
        detector: Option<Arc<dyn LabelDetector>>,
        records: Arc<RecordStore>,
        expiry: Arc<dyn ExpiryScheduler>,
    ) -> Self {
        let registry = Arc::new(SessionRegistry::new(settings.clone()));
        let filter = DetectionFilter::new(detector);

        let coordinator = Coordinator::new(registry.clone(), records.clone(), expiry);

        let webhook = Arc::new(WebhookChannel::new());
        let messaging = Arc::new(MessagingChannel::new(messaging));
        let push = Arc::new(PushChannel::new(push, settings.clone()));

        let dispatcher = Dispatcher::new(
            recorder.clone(),
            broadcaster,
            registry.clone(),
            webhook,
            messaging,
            push,
            DispatchSupervisor::new(),
        );

        Self {
            settings,
            recorder,
            records,
            registry,
            filter,
            coordinator,
            dispatcher,
        }
    }

    /// Handle one trigger end to end
    pub async fn handle_motion(&self, event: &MotionEvent) -> Result<Outcome> {
        let settings = self.settings.snapshot().await;

        match motion_gate::evaluate(event, &settings.general) {
            GateDecision::Admitted => {}
            GateDecision::Rejected(rejection) => {
                tracing::debug!(
                    camera_id = %event.camera_id,
                    reason = rejection.as_str(),
                    "Skip motion trigger"
                );
                return Ok(Outcome::Skipped(rejection.into()));
            }
        }

        tracing::debug!(
            camera_id = %event.camera_id,
            kind = event.kind.as_str(),
            "New motion alert"
        );

        let snapshot = self.recorder.capture_snapshot(&event.camera_id).await?;

        let labels = match self
            .filter
            .evaluate(&event.camera_id, &snapshot, &settings.detection)
            .await
        {
            FilterVerdict::Unfiltered => None,
            FilterVerdict::Matched(labels) => Some(labels),
            FilterVerdict::Rejected => {
                tracing::debug!(
                    camera_id = %event.camera_id,
                    "Skip storing movement - configured label not detected"
                );
                return Ok(Outcome::Skipped(SkipReason::NoMatch));
            }
        };

        let records = self.coordinator.correlate(event, labels, &settings).await;
        self.dispatcher.dispatch(&records, snapshot, &settings).await?;

        Ok(Outcome::Dispatched {
            token: records.notification.id.clone(),
            recorded: records.will_record,
        })
    }

    /// Record store (host queries, expiry target)
    pub fn records(&self) -> &Arc<RecordStore> {
        &self.records
    }

    /// Session registry (host-side session introspection)
    pub fn registry(&self) -> &Arc<SessionRegistry> {
        &self.registry
    }

    /// Whether a label detection backend is wired in
    pub fn detection_available(&self) -> bool {
        self.filter.has_detector()
    }
}

/// Build the HTTP label detector from settings. A missing endpoint means
/// detection is off; an invalid one logs and downgrades to off.
fn build_detector(settings: &DetectionSettings) -> Option<Arc<dyn LabelDetector>> {
    match &settings.endpoint {
        Some(endpoint) if !endpoint.trim().is_empty() => {
            match HttpLabelDetector::new(endpoint, settings.api_key.clone()) {
                Ok(detector) => Some(Arc::new(detector)),
                Err(e) => {
                    tracing::error!(error = %e, "Label detection disabled");
                    None
                }
            }
        }
        _ => None,
    }
}
