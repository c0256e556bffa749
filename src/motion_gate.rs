//! Motion Gate
//!
//! Admission decision for raw camera triggers. While nobody is home every
//! active event passes; while at home only excluded cameras pass. Inactive
//! events (motion phase ending) never enter the pipeline.
//!
//! Pure decision, no side effects; the caller logs the reason.

use crate::event::MotionEvent;
use crate::settings::GeneralSettings;

/// Gate outcome
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    Admitted,
    Rejected(GateRejection),
}

/// Why an event was kept out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateRejection {
    /// Trigger reported the end of a motion phase
    Inactive,
    /// At-home suppression and the camera is not excluded
    AtHome,
}

impl GateRejection {
    pub fn as_str(&self) -> &'static str {
        match self {
            GateRejection::Inactive => "inactive",
            GateRejection::AtHome => "at_home",
        }
    }
}

/// Decide whether an event enters the pipeline
pub fn evaluate(event: &MotionEvent, general: &GeneralSettings) -> GateDecision {
    if !event.active {
        return GateDecision::Rejected(GateRejection::Inactive);
    }

    if general.at_home && !general.exclude.contains(&event.camera_id) {
        return GateDecision::Rejected(GateRejection::AtHome);
    }

    GateDecision::Admitted
}
