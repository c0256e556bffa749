//! SettingsStore - Typed configuration document
//!
//! ## Responsibilities
//!
//! - Load the settings document from a JSON file
//! - Serve cheap cloned snapshots for the read path
//! - Persist the single mutation the pipeline performs (push subscription
//!   removal)
//!
//! All pipeline reads go through `snapshot()`; no component keeps its own
//! parsed copy of the document.

mod types;

pub use types::*;

use crate::error::{Error, Result};
use std::path::PathBuf;
use tokio::sync::RwLock;

/// SettingsStore instance
pub struct SettingsStore {
    /// Backing file; None for in-memory stores
    path: Option<PathBuf>,
    cache: RwLock<Settings>,
}

impl SettingsStore {
    /// Load settings from a JSON file
    pub async fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let raw = tokio::fs::read_to_string(&path).await?;
        let settings: Settings = serde_json::from_str(&raw).map_err(|e| {
            Error::Config(format!(
                "Failed to parse settings file {}: {}",
                path.display(),
                e
            ))
        })?;

        tracing::info!(path = %path.display(), "Settings loaded");

        Ok(Self {
            path: Some(path),
            cache: RwLock::new(settings),
        })
    }

    /// Create a store without file backing (tests, embedding)
    pub fn in_memory(settings: Settings) -> Self {
        Self {
            path: None,
            cache: RwLock::new(settings),
        }
    }

    /// Cloned view of the whole document
    pub async fn snapshot(&self) -> Settings {
        self.cache.read().await.clone()
    }

    /// Drop the stored push subscription, keeping both signing keys.
    /// Persists to the backing file when one exists.
    pub async fn clear_push_subscription(&self) -> Result<()> {
        let snapshot = {
            let mut cache = self.cache.write().await;
            cache.webpush.subscription = None;
            cache.clone()
        };

        if let Some(path) = &self.path {
            let json = serde_json::to_string_pretty(&snapshot)?;
            tokio::fs::write(path, json).await?;
            tracing::debug!(path = %path.display(), "Settings persisted after subscription removal");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

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

    #[tokio::test]
    async fn test_in_memory_snapshot() {
        let mut settings = Settings::default();
        settings.general.at_home = true;
        let store = SettingsStore::in_memory(settings);

        let snapshot = store.snapshot().await;
        assert!(snapshot.general.at_home);
    }

    #[tokio::test]
    async fn test_clear_subscription_keeps_keys() {
        let store = SettingsStore::in_memory(settings_with_subscription());

        store.clear_push_subscription().await.unwrap();

        let snapshot = store.snapshot().await;
        assert!(snapshot.webpush.subscription.is_none());
        assert_eq!(snapshot.webpush.public_key, "pub");
        assert_eq!(snapshot.webpush.private_key, "priv");
    }

    #[tokio::test]
    async fn test_load_and_persist_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let json = serde_json::to_string_pretty(&settings_with_subscription()).unwrap();
        std::fs::write(&path, json).unwrap();

        let store = SettingsStore::load(&path).await.unwrap();
        store.clear_push_subscription().await.unwrap();

        // Reload from disk: subscription gone, keys intact
        let reloaded = SettingsStore::load(&path).await.unwrap();
        let snapshot = reloaded.snapshot().await;
        assert!(snapshot.webpush.subscription.is_none());
        assert_eq!(snapshot.webpush.public_key, "pub");
        assert_eq!(snapshot.webpush.private_key, "priv");
    }

    #[tokio::test]
    async fn test_load_rejects_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{ not json").unwrap();

        let result = SettingsStore::load(&path).await;
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
