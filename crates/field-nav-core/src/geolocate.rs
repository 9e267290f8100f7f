//! Device location types and the stream contract
//!
//! The engine never polls hardware. The shell owns a [`LocationStream`],
//! drains it each frame and forwards fixes and failures as engine events;
//! the engine only keeps the latest state for the HUD and the overlay.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One position report from the stream
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationFix {
    pub lat: f64,
    pub lng: f64,
    pub accuracy_m: f64,
}

/// Geolocation failures, recovered locally (fix cleared, advisory shown)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LocationError {
    #[error("location permission denied")]
    PermissionDenied,
    #[error("location unavailable")]
    Unavailable,
    #[error("location request timed out")]
    Timeout,
}

/// Engine-side view of the watch
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum LocationState {
    #[default]
    Off,
    /// Watch started, no fix yet
    Watching,
    Fix(LocationFix),
    Failed(LocationError),
}

impl LocationState {
    pub fn fix(&self) -> Option<LocationFix> {
        match self {
            LocationState::Fix(fix) => Some(*fix),
            _ => None,
        }
    }

    pub fn is_watching(&self) -> bool {
        matches!(self, LocationState::Watching | LocationState::Fix(_))
    }
}

/// Subscribable position source. Start/stop are idempotent; `poll` is drained
/// by the frame loop and returns at most one update per call. A failed stream
/// stays stoppable and restartable.
pub trait LocationStream {
    fn start(&mut self);
    fn stop(&mut self);
    fn poll(&mut self) -> Option<Result<LocationFix, LocationError>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_exposes_fix_only_when_present() {
        let fix = LocationFix { lat: 51.5, lng: -0.09, accuracy_m: 12.0 };
        assert_eq!(LocationState::Fix(fix).fix(), Some(fix));
        assert_eq!(LocationState::Watching.fix(), None);
        assert_eq!(LocationState::Failed(LocationError::Timeout).fix(), None);
        assert_eq!(LocationState::Off.fix(), None);
    }

    #[test]
    fn test_watching_covers_fix_state() {
        let fix = LocationFix { lat: 0.0, lng: 0.0, accuracy_m: 5.0 };
        assert!(LocationState::Watching.is_watching());
        assert!(LocationState::Fix(fix).is_watching());
        assert!(!LocationState::Off.is_watching());
        assert!(!LocationState::Failed(LocationError::Unavailable).is_watching());
    }
}
