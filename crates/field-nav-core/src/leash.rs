//! Soft leash keeping the viewport near the selection centroid
//!
//! The leash never clamps motion at a boundary. When a debounced trigger finds
//! the center more than the leash radius from the anchor, the viewport is
//! snapped back to the exact centroid of the selection. Debouncing lives in
//! the engine's timer table; this controller only makes the distance decision
//! and issues the pan.

use crate::geometry::{LatLng, haversine_distance_m};
use crate::selection::AreaSelection;
use crate::viewport::ViewportSurface;

/// Debounce window for viewport idle / drag-end triggers
pub const LEASH_DEBOUNCE_MS: u64 = 100;

#[derive(Debug, Clone, PartialEq)]
pub struct LeashController {
    anchor: LatLng,
    radius_m: f64,
    armed: bool,
    corrections: u64,
    last_distance_m: f64,
}

impl LeashController {
    pub fn new(anchor: LatLng, radius_m: f64) -> Self {
        Self {
            anchor,
            radius_m,
            armed: false,
            corrections: 0,
            last_distance_m: 0.0,
        }
    }

    pub fn from_selection(selection: &AreaSelection) -> Self {
        Self::new(selection.anchor(), selection.leash_radius_m())
    }

    /// Honor idle/drag-end triggers. Armed only while in Map mode.
    pub fn arm(&mut self) {
        self.armed = true;
    }

    pub fn disarm(&mut self) {
        self.armed = false;
    }

    pub fn armed(&self) -> bool {
        self.armed
    }

    pub fn anchor(&self) -> LatLng {
        self.anchor
    }

    pub fn radius_m(&self) -> f64 {
        self.radius_m
    }

    /// Corrections issued since construction (diagnostics)
    pub fn corrections(&self) -> u64 {
        self.corrections
    }

    /// Center-to-anchor distance measured at the last enforcement
    pub fn last_distance_m(&self) -> f64 {
        self.last_distance_m
    }

    /// Check the viewport center against the radius and snap back if it
    /// drifted out. Returns true when a correction was issued. Idempotent:
    /// a center within the radius produces no motion.
    pub fn enforce(&mut self, viewport: &mut dyn ViewportSurface) -> bool {
        if !self.armed {
            return false;
        }

        let distance = haversine_distance_m(viewport.center(), self.anchor);
        self.last_distance_m = distance;

        if distance > self.radius_m {
            tracing::debug!(
                "Leash correction: center drifted {:.0} m from anchor (radius {:.0} m)",
                distance,
                self.radius_m
            );
            viewport.pan_to(self.anchor);
            self.corrections += 1;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::GeoBounds;
    use crate::viewport::RecordingViewport;

    fn armed_leash() -> LeashController {
        let selection = AreaSelection::new(GeoBounds::new(10.0, 0.0, 10.0, 0.0));
        let mut leash = LeashController::from_selection(&selection);
        leash.arm();
        leash
    }

    #[test]
    fn test_no_pan_within_radius() {
        let mut leash = armed_leash();
        let mut vp = RecordingViewport::at(leash.anchor());

        assert!(!leash.enforce(&mut vp));
        assert_eq!(vp.pan_count(), 0);
        assert_eq!(leash.corrections(), 0);
    }

    #[test]
    fn test_snaps_to_anchor_beyond_radius() {
        let mut leash = armed_leash();
        // The 10x10 degree leash radius is ~3500 km; 60 degrees away is well out
        let mut vp = RecordingViewport::at(LatLng::new(5.0, 65.0));

        assert!(leash.enforce(&mut vp));
        assert_eq!(vp.pan_count(), 1);
        // Snap to the exact centroid, not the nearest legal point
        assert_eq!(vp.center, leash.anchor());
        assert_eq!(leash.corrections(), 1);
    }

    #[test]
    fn test_enforce_is_idempotent() {
        let mut leash = armed_leash();
        let mut vp = RecordingViewport::at(LatLng::new(5.0, 65.0));

        assert!(leash.enforce(&mut vp));
        // Center is back at the anchor now; further checks do nothing
        assert!(!leash.enforce(&mut vp));
        assert!(!leash.enforce(&mut vp));
        assert_eq!(vp.pan_count(), 1);
        assert_eq!(leash.corrections(), 1);
    }

    #[test]
    fn test_disarmed_leash_never_pans() {
        let mut leash = armed_leash();
        leash.disarm();
        let mut vp = RecordingViewport::at(LatLng::new(5.0, 65.0));

        assert!(!leash.enforce(&mut vp));
        assert_eq!(vp.pan_count(), 0);
    }

    #[test]
    fn test_last_distance_reported() {
        let mut leash = armed_leash();
        let mut vp = RecordingViewport::at(leash.anchor());
        leash.enforce(&mut vp);
        assert!(leash.last_distance_m() < 1.0);
    }
}
