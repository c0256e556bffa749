//! Push channel - web push delivery
//!
//! The signing key pair is handed to the transport exactly once per
//! process. A transport-reported "gone" subscription is removed through
//! the settings store (keys stay); every other failure is logged by the
//! dispatch supervisor.

use crate::error::{Error, Result};
use crate::records::NotificationRecord;
use crate::settings::{PushSubscription, SettingsStore};
use async_trait::async_trait;
use serde_json::json;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Transport-level send failure
#[derive(Debug, thiserror::Error)]
pub enum PushSendError {
    /// Subscription permanently invalid (HTTP 410 class)
    #[error("subscription gone")]
    Gone,
    /// Any other transport failure
    #[error("{0}")]
    Other(String),
}

/// Web push transport collaborator
#[async_trait]
pub trait PushTransport: Send + Sync {
    /// Receive the signing key pair; called once per process
    async fn set_keys(&self, public_key: &str, private_key: &str);

    /// Deliver the payload to a subscription
    async fn send(
        &self,
        subscription: &PushSubscription,
        payload: serde_json::Value,
    ) -> std::result::Result<(), PushSendError>;
}

/// Push dispatch adapter
pub struct PushChannel {
    transport: Arc<dyn PushTransport>,
    settings: Arc<SettingsStore>,
    keys_handed_over: AtomicBool,
}

impl PushChannel {
    /// Create new channel
    pub fn new(transport: Arc<dyn PushTransport>, settings: Arc<SettingsStore>) -> Self {
        Self {
            transport,
            settings,
            keys_handed_over: AtomicBool::new(false),
        }
    }

    /// Send the notification to the stored subscription, if any
    pub async fn dispatch(&self, record: &NotificationRecord) -> Result<()> {
        let webpush = self.settings.snapshot().await.webpush;

        if !self.keys_handed_over.swap(true, Ordering::SeqCst) {
            self.transport
                .set_keys(&webpush.public_key, &webpush.private_key)
                .await;
        }

        let subscription = match webpush.subscription {
            Some(subscription) => subscription,
            None => return Ok(()),
        };

        let mut payload = serde_json::to_value(record)?;
        if let serde_json::Value::Object(map) = &mut payload {
            map.insert(
                "detect_info".to_string(),
                json!("detected a new movement on"),
            );
        }

        tracing::debug!(camera_id = %record.camera_id, "Sending web push notification");

        match self.transport.send(&subscription, payload).await {
            Ok(()) => Ok(()),
            Err(PushSendError::Gone) => {
                tracing::debug!(
                    camera_id = %record.camera_id,
                    "Push grant changed - removing subscription"
                );
                if let Err(e) = self.settings.clear_push_subscription().await {
                    tracing::error!(error = %e, "Failed to persist subscription removal");
                }
                Ok(())
            }
            Err(PushSendError::Other(message)) => Err(Error::Push(message)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventKind;
    use crate::settings::{Settings, SubscriptionKeys};
    use std::sync::Mutex as StdMutex;

    #[derive(Clone, Copy)]
    enum SendBehavior {
        Succeed,
        Gone,
        Fail,
    }

    struct MockTransport {
        behavior: SendBehavior,
        key_calls: Arc<StdMutex<Vec<(String, String)>>>,
        sent: Arc<StdMutex<Vec<serde_json::Value>>>,
    }

    impl MockTransport {
        fn new(behavior: SendBehavior) -> Self {
            Self {
                behavior,
                key_calls: Arc::new(StdMutex::new(Vec::new())),
                sent: Arc::new(StdMutex::new(Vec::new())),
            }
        }
    }

    #[async_trait]
    impl PushTransport for MockTransport {
        async fn set_keys(&self, public_key: &str, private_key: &str) {
            self.key_calls
                .lock()
                .unwrap()
                .push((public_key.to_string(), private_key.to_string()));
        }

        async fn send(
            &self,
            _subscription: &PushSubscription,
            payload: serde_json::Value,
        ) -> std::result::Result<(), PushSendError> {
            self.sent.lock().unwrap().push(payload);
            match self.behavior {
                SendBehavior::Succeed => Ok(()),
                SendBehavior::Gone => Err(PushSendError::Gone),
                SendBehavior::Fail => Err(PushSendError::Other("let's not".to_string())),
            }
        }
    }

    fn settings_with_subscription() -> Settings {
        let mut settings = Settings::default();
        settings.webpush.public_key = "pub".to_string();
        settings.webpush.private_key = "priv".to_string();
        settings.webpush.subscription = Some(PushSubscription {
            endpoint: "https://push.example/sub".to_string(),
            keys: SubscriptionKeys {
                p256dh: "p".to_string(),
                auth: "a".to_string(),
            },
        });
        settings
    }

    fn record() -> NotificationRecord {
        NotificationRecord {
            id: "abc123".to_string(),
            camera_id: "front".to_string(),
            kind: EventKind::Doorbell,
            time: "01.01.2026, 12:00:00".to_string(),
            timestamp: 100,
            labels: Some(vec!["Human".to_string()]),
        }
    }

    #[tokio::test]
    async fn test_keys_handed_over_once() {
        let transport = Arc::new(MockTransport::new(SendBehavior::Succeed));
        let settings = Arc::new(SettingsStore::in_memory(settings_with_subscription()));
        let channel = PushChannel::new(transport.clone(), settings);

        channel.dispatch(&record()).await.unwrap();
        channel.dispatch(&record()).await.unwrap();

        let key_calls = transport.key_calls.lock().unwrap();
        assert_eq!(*key_calls, vec![("pub".to_string(), "priv".to_string())]);
    }

    #[tokio::test]
    async fn test_no_subscription_no_send() {
        let transport = Arc::new(MockTransport::new(SendBehavior::Succeed));
        let settings = Arc::new(SettingsStore::in_memory(Settings::default()));
        let channel = PushChannel::new(transport.clone(), settings);

        channel.dispatch(&record()).await.unwrap();

        assert!(transport.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_payload_carries_record_and_detect_info() {
        let transport = Arc::new(MockTransport::new(SendBehavior::Succeed));
        let settings = Arc::new(SettingsStore::in_memory(settings_with_subscription()));
        let channel = PushChannel::new(transport.clone(), settings);

        channel.dispatch(&record()).await.unwrap();

        let sent = transport.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0]["id"], "abc123");
        assert_eq!(sent[0]["kind"], "doorbell");
        assert_eq!(sent[0]["detect_info"], "detected a new movement on");
    }

    #[tokio::test]
    async fn test_gone_clears_subscription_keeps_keys() {
        let transport = Arc::new(MockTransport::new(SendBehavior::Gone));
        let settings = Arc::new(SettingsStore::in_memory(settings_with_subscription()));
        let channel = PushChannel::new(transport, settings.clone());

        let result = channel.dispatch(&record()).await;
        assert!(result.is_ok());

        let snapshot = settings.snapshot().await;
        assert!(snapshot.webpush.subscription.is_none());
        assert_eq!(snapshot.webpush.public_key, "pub");
        assert_eq!(snapshot.webpush.private_key, "priv");
    }

    #[tokio::test]
    async fn test_other_failure_surfaces_error() {
        let transport = Arc::new(MockTransport::new(SendBehavior::Fail));
        let settings = Arc::new(SettingsStore::in_memory(settings_with_subscription()));
        let channel = PushChannel::new(transport, settings.clone());

        let result = channel.dispatch(&record()).await;
        assert!(matches!(result, Err(Error::Push(_))));

        // Subscription untouched by transient failures
        assert!(settings.snapshot().await.webpush.subscription.is_some());
    }
}
