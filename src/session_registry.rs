//! SessionRegistry - Recording session admission
//!
//! ## Purpose
//!
//! - At most one active recording session per camera
//! - Fail closed while recording is globally disabled
//! - Grant doubles as the "produce a video for this event" decision
//!
//! Grant/check/release are atomic under a single mutex over the active set;
//! this is the only mutual-exclusion point in the crate.

use crate::settings::SettingsStore;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Mutex;

/// SessionRegistry instance
pub struct SessionRegistry {
    settings: Arc<SettingsStore>,
    /// Camera ids with a recording in flight
    active: Mutex<HashSet<String>>,
}

impl SessionRegistry {
    /// Create new registry
    pub fn new(settings: Arc<SettingsStore>) -> Self {
        Self {
            settings,
            active: Mutex::new(HashSet::new()),
        }
    }

    /// Request a recording session for a camera
    ///
    /// - false while recording is disabled in settings
    /// - false while a session for this camera is already active
    /// - true marks the session active until `close_session`
    pub async fn request_session(&self, camera_id: &str) -> bool {
        let recording_active = self.settings.snapshot().await.recordings.active;

        let mut active = self.active.lock().await;

        if !recording_active {
            tracing::debug!(camera_id = %camera_id, "Session denied - recording disabled");
            return false;
        }

        if active.contains(camera_id) {
            tracing::debug!(camera_id = %camera_id, "Session denied - recording already running");
            return false;
        }

        active.insert(camera_id.to_string());
        tracing::debug!(camera_id = %camera_id, "Recording session granted");
        true
    }

    /// Release a camera's session. Idempotent.
    pub async fn close_session(&self, camera_id: &str) {
        let mut active = self.active.lock().await;
        if active.remove(camera_id) {
            tracing::debug!(camera_id = %camera_id, "Recording session released");
        }
    }

    /// Number of sessions in flight (debug aid)
    pub async fn active_count(&self) -> usize {
        self.active.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;

    fn registry(recording_active: bool) -> SessionRegistry {
        let mut settings = Settings::default();
        settings.recordings.active = recording_active;
        SessionRegistry::new(Arc::new(SettingsStore::in_memory(settings)))
    }

    #[tokio::test]
    async fn test_grant_then_deny_same_camera() {
        let registry = registry(true);

        assert!(registry.request_session("cam-001").await);
        assert!(!registry.request_session("cam-001").await);
    }

    #[tokio::test]
    async fn test_release_allows_new_grant() {
        let registry = registry(true);

        assert!(registry.request_session("cam-001").await);
        registry.close_session("cam-001").await;
        assert!(registry.request_session("cam-001").await);
    }

    #[tokio::test]
    async fn test_different_cameras_independent() {
        let registry = registry(true);

        assert!(registry.request_session("cam-001").await);
        assert!(registry.request_session("cam-002").await);
        assert_eq!(registry.active_count().await, 2);
    }

    #[tokio::test]
    async fn test_disabled_recording_never_grants() {
        let registry = registry(false);

        assert!(!registry.request_session("cam-001").await);
        assert_eq!(registry.active_count().await, 0);
    }

    #[tokio::test]
    async fn test_close_idempotent() {
        let registry = registry(true);

        registry.close_session("cam-001").await;
        assert!(registry.request_session("cam-001").await);
        registry.close_session("cam-001").await;
        registry.close_session("cam-001").await;
        assert_eq!(registry.active_count().await, 0);
    }

    #[tokio::test]
    async fn test_concurrent_requests_single_grant() {
        let registry = Arc::new(registry(true));

        let mut handles = Vec::new();
        for _ in 0..16 {
            let registry = registry.clone();
            handles.push(tokio::spawn(
                async move { registry.request_session("cam-001").await },
            ));
        }

        let mut granted = 0;
        for handle in handles {
            if handle.await.unwrap() {
                granted += 1;
            }
        }

        assert_eq!(granted, 1);
        assert_eq!(registry.active_count().await, 1);
    }
}
