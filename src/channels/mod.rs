//! Notification channels
//!
//! ## Responsibilities
//!
//! - Channel adapters (webhook, messaging, push) with their content rules
//! - Supervision of detached dispatch tasks
//!
//! Channels are isolated from each other and from the pipeline: a failing
//! channel is logged and never aborts event handling.

mod messaging;
mod push;
mod webhook;

pub use messaging::{
    MediaSource, MessagingChannel, MessagingConnection, MessagingCredentials, MessagingTransport,
    OutboundMessage,
};
pub use push::{PushChannel, PushSendError, PushTransport};
pub use webhook::WebhookChannel;

use crate::error::Result;
use std::sync::{Arc, OnceLock};
use tokio::sync::mpsc;

/// Outbound channel identity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelKind {
    Webhook,
    Messaging,
    Push,
}

impl ChannelKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChannelKind::Webhook => "webhook",
            ChannelKind::Messaging => "messaging",
            ChannelKind::Push => "push",
        }
    }
}

/// Outcome of a detached channel dispatch
struct ChannelReport {
    channel: ChannelKind,
    camera_id: String,
    result: Result<()>,
}

/// Collects outcomes of fire-and-forget dispatch tasks into one logging
/// drain. The drain task is spawned from the first report, so construction
/// needs no running runtime; reports do. All clones share one drain, which
/// ends when the last clone is dropped.
#[derive(Clone)]
pub struct DispatchSupervisor {
    drain: Arc<OnceLock<mpsc::UnboundedSender<ChannelReport>>>,
}

impl DispatchSupervisor {
    /// Create new supervisor; no task is spawned until the first report
    pub fn new() -> Self {
        Self {
            drain: Arc::new(OnceLock::new()),
        }
    }

    fn sender(&self) -> &mpsc::UnboundedSender<ChannelReport> {
        self.drain.get_or_init(|| {
            let (tx, mut rx) = mpsc::unbounded_channel::<ChannelReport>();

            tokio::spawn(async move {
                while let Some(report) = rx.recv().await {
                    match &report.result {
                        Ok(()) => {
                            tracing::debug!(
                                channel = report.channel.as_str(),
                                camera_id = %report.camera_id,
                                "Channel dispatch completed"
                            );
                        }
                        Err(e) => {
                            tracing::error!(
                                channel = report.channel.as_str(),
                                camera_id = %report.camera_id,
                                error = %e,
                                "Channel dispatch failed"
                            );
                        }
                    }
                }
            });

            tx
        })
    }

    /// Report a dispatch outcome
    pub fn report(&self, channel: ChannelKind, camera_id: &str, result: Result<()>) {
        let _ = self.sender().send(ChannelReport {
            channel,
            camera_id: camera_id.to_string(),
            result,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_construction_outside_runtime() {
        // Nothing is spawned until the first report
        let supervisor = DispatchSupervisor::new();
        let clone = supervisor.clone();
        drop(clone);
        drop(supervisor);
    }

    #[tokio::test]
    async fn test_reports_accepted_after_failures() {
        let supervisor = DispatchSupervisor::new();

        supervisor.report(ChannelKind::Webhook, "cam-001", Ok(()));
        supervisor.report(
            ChannelKind::Push,
            "cam-001",
            Err(Error::Push("boom".to_string())),
        );
        supervisor.report(ChannelKind::Messaging, "cam-002", Ok(()));

        // Drain keeps consuming; nothing panics and later reports still land
        tokio::task::yield_now().await;
        supervisor.report(ChannelKind::Webhook, "cam-002", Ok(()));
    }
}
