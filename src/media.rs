//! Recorder contract - capture and media persistence
//!
//! Implemented by the host's capture engine (ffmpeg wrapper or similar).
//! The pipeline never touches media bytes beyond passing the snapshot
//! buffer around; encoding, container handling and disk layout belong to
//! the implementation.

use crate::error::Result;
use crate::records::RecordingRecord;
use async_trait::async_trait;

/// Capture and persistence collaborator
#[async_trait]
pub trait Recorder: Send + Sync {
    /// Grab a JPEG snapshot from the camera's stream
    async fn capture_snapshot(&self, camera_id: &str) -> Result<Vec<u8>>;

    /// Write the snapshot under `<path>/<record id>.jpeg`.
    ///
    /// `intermediate` marks the write that happens before a video: the
    /// final-form snapshot for a recorded event is produced as part of
    /// `store_video`.
    async fn store_snapshot(
        &self,
        camera_id: &str,
        record: &RecordingRecord,
        buffer: &[u8],
        path: &str,
        intermediate: bool,
    ) -> Result<()>;

    /// Record and write `<path>/<record id>.mp4`, blocking until the
    /// recording completes
    async fn store_video(
        &self,
        camera_id: &str,
        record: &RecordingRecord,
        path: &str,
        duration_secs: u64,
    ) -> Result<()>;
}
