//! Messaging channel - bot delivery with per-camera content rules
//!
//! ## Send rules
//!
//! - Text mode always sends the templated text
//! - Snapshot mode sends a photo only when a recording session was granted
//! - Video mode sends a video only when granted and the output is Video
//!
//! A raw preview buffer (supplied before the video exists on disk) is used
//! for the granted-Snapshot case; every other media send references the
//! stored file path.
//!
//! The channel keeps at most one live connection, keyed by the configured
//! credential pair. A credential change stops the cached connection and
//! starts a fresh one before sending.

use crate::error::{Error, Result};
use crate::records::NotificationRecord;
use crate::settings::{MessagingMode, RecordingOutput, Settings};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Credential pair identifying a connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessagingCredentials {
    pub token: String,
    pub chat_id: String,
}

/// Media payload source
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaSource {
    /// In-memory JPEG, used before the recording lands on disk
    Buffer(Vec<u8>),
    /// Stored media path
    Path(String),
}

/// Message handed to the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundMessage {
    Text { text: String },
    Photo { caption: String, source: MediaSource },
    Video { caption: String, source: MediaSource },
}

/// Bot transport (connection factory)
#[async_trait]
pub trait MessagingTransport: Send + Sync {
    async fn start(
        &self,
        credentials: &MessagingCredentials,
    ) -> Result<Box<dyn MessagingConnection>>;
}

/// Live bot connection
#[async_trait]
pub trait MessagingConnection: Send + Sync {
    async fn send(&self, message: OutboundMessage) -> Result<()>;
    async fn stop(&self);
}

struct CachedConnection {
    credentials: MessagingCredentials,
    connection: Box<dyn MessagingConnection>,
}

/// Messaging dispatch adapter
pub struct MessagingChannel {
    transport: Arc<dyn MessagingTransport>,
    cached: Mutex<Option<CachedConnection>>,
}

impl MessagingChannel {
    /// Create new channel over a transport
    pub fn new(transport: Arc<dyn MessagingTransport>) -> Self {
        Self {
            transport,
            cached: Mutex::new(None),
        }
    }

    /// Send the notification according to the camera's mode.
    ///
    /// `session_granted` is the recording grant for this event; `preview`
    /// carries the raw snapshot when dispatch happens before storage.
    pub async fn dispatch(
        &self,
        record: &NotificationRecord,
        settings: &Settings,
        session_granted: bool,
        preview: Option<&[u8]>,
    ) -> Result<()> {
        let telegram = &settings.telegram;

        let mode = match telegram.cameras.get(&record.camera_id) {
            Some(camera) => camera.mode,
            None => {
                tracing::debug!(camera_id = %record.camera_id, "No messaging mode configured");
                return Ok(());
            }
        };

        let output = settings.recordings.output;
        let sendable = match mode {
            MessagingMode::Text => true,
            MessagingMode::Snapshot => session_granted,
            MessagingMode::Video => session_granted && output == RecordingOutput::Video,
        };

        if !sendable {
            tracing::debug!(
                camera_id = %record.camera_id,
                mode = ?mode,
                session_granted,
                "Messaging send conditions not met"
            );
            return Ok(());
        }

        if !telegram.active || telegram.token.is_empty() || telegram.chat_id.is_empty() {
            tracing::debug!(camera_id = %record.camera_id, "Messaging inactive or missing credentials");
            return Ok(());
        }

        let credentials = MessagingCredentials {
            token: telegram.token.clone(),
            chat_id: telegram.chat_id.clone(),
        };

        let text = motion_text(telegram.motion_text.as_deref(), &record.camera_id);

        let message = match mode {
            MessagingMode::Text => OutboundMessage::Text { text },
            MessagingMode::Snapshot => {
                let source = match preview {
                    Some(buffer) => MediaSource::Buffer(buffer.to_vec()),
                    None => MediaSource::Path(photo_path(
                        &settings.recordings.path,
                        &record.id,
                        output,
                    )),
                };
                OutboundMessage::Photo {
                    caption: text,
                    source,
                }
            }
            MessagingMode::Video => OutboundMessage::Video {
                caption: text,
                source: MediaSource::Path(format!(
                    "{}/{}.mp4",
                    settings.recordings.path, record.id
                )),
            },
        };

        let mut cached = self.cached.lock().await;

        let stale = match cached.as_ref() {
            Some(existing) => existing.credentials != credentials,
            None => false,
        };

        if stale {
            if let Some(existing) = cached.take() {
                tracing::debug!("Messaging credentials changed - restarting connection");
                existing.connection.stop().await;
            }
        }

        if cached.is_none() {
            let connection = self.transport.start(&credentials).await?;
            *cached = Some(CachedConnection {
                credentials,
                connection,
            });
        }

        let connection = match cached.as_ref() {
            Some(cached) => &cached.connection,
            None => return Err(Error::Messaging("connection unavailable".to_string())),
        };

        connection.send(message).await?;

        tracing::debug!(camera_id = %record.camera_id, mode = ?mode, "Messaging notification sent");

        Ok(())
    }
}

/// Resolve the message text: a template containing `@` has its first `@`
/// replaced by the camera id, anything else falls back to the default.
fn motion_text(template: Option<&str>, camera_id: &str) -> String {
    match template {
        Some(template) if !template.is_empty() && template.contains('@') => {
            template.replacen('@', camera_id, 1)
        }
        _ => format!("{}: New motion detected!", camera_id),
    }
}

/// Photo file for a notification: a recorded video claims "<id>.mp4", so
/// its companion snapshot lives at "<id>@2.jpeg"
fn photo_path(path: &str, id: &str, output: RecordingOutput) -> String {
    if output == RecordingOutput::Video {
        format!("{}/{}@2.jpeg", path, id)
    } else {
        format!("{}/{}.jpeg", path, id)
    }
}
