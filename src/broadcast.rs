//! Broadcaster contract - realtime distribution
//!
//! Implemented by the host's socket layer. Delivery is best effort; the
//! pipeline neither retries nor observes failures here.

use crate::records::NotificationRecord;
use async_trait::async_trait;

/// Realtime broadcast collaborator
#[async_trait]
pub trait Broadcaster: Send + Sync {
    /// Emit the record to connected clients under an event name
    async fn broadcast(&self, event: &str, record: &NotificationRecord);

    /// Append the record to the host's notification log
    async fn append_log(&self, record: &NotificationRecord);
}
