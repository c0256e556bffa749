//! alertpipe - Camera motion event pipeline
//!
//! Turns camera motion/doorbell triggers into stored evidence and operator
//! notifications.
//!
//! ## Architecture (8 Components)
//!
//! 1. SettingsStore - Typed configuration document
//! 2. MotionGate - Presence-aware admission
//! 3. DetectionFilter - Image label filtering + HTTP backend adapter
//! 4. SessionRegistry - One recording session per camera
//! 5. Coordinator - Correlated record pair + expiry scheduling
//! 6. RecordStore / TimerExpiry - Record lifetime management
//! 7. Dispatcher - Branch-ordered fan-out with failure isolation
//! 8. Channels - Webhook / messaging / push adapters
//!
//! ## Design Principles
//!
//! - Capture, broadcast and transport engines stay behind traits
//! - Channel failures never abort event handling
//! - One mutual-exclusion point (the session registry)

pub mod broadcast;
pub mod channels;
pub mod detection;
pub mod error;
pub mod event;
pub mod expiry;
pub mod media;
pub mod motion_gate;
pub mod pipeline;
pub mod records;
pub mod session_registry;
pub mod settings;

pub use error::{Error, Result};
pub use event::{EventKind, MotionEvent};
pub use pipeline::{MotionPipeline, Outcome, SkipReason};
