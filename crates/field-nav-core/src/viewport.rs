//! Abstract control surface for the map viewport
//!
//! The engine never talks to a mapping SDK directly. Everything it needs from
//! the map is behind this narrow trait: one production adapter wraps the real
//! widget, and tests substitute [`RecordingViewport`]. Gesture and lifecycle
//! callbacks of the underlying SDK do not appear here; the shell translates
//! them into engine events instead.

use crate::geometry::{GeoBounds, LatLng};

/// Minimal viewport operations the engine relies on.
///
/// All mutations are synchronous; the engine is single-threaded and callers
/// must not issue conflicting commands within one tick (a leash snap racing a
/// fresh user drag is a known soft spot, see DESIGN.md).
pub trait ViewportSurface {
    fn center(&self) -> LatLng;
    fn set_center(&mut self, center: LatLng);

    fn zoom(&self) -> f64;
    fn set_zoom(&mut self, zoom: f64);

    /// Heading in degrees, [0, 360)
    fn heading(&self) -> f64;
    fn set_heading(&mut self, heading: f64);

    /// Tilt in degrees from nadir
    fn tilt(&self) -> f64;
    fn set_tilt(&mut self, tilt: f64);

    /// Animate or jump the center to `target` (leash corrections use this)
    fn pan_to(&mut self, target: LatLng);

    /// Center and zoom so `bounds` is fully visible with `padding_px` of
    /// margin on each side
    fn fit_bounds(&mut self, bounds: GeoBounds, padding_px: f32);

    /// Constrain the zoom range; `None` restores the surface defaults
    fn set_zoom_limits(&mut self, limits: Option<(f64, f64)>);

    /// Whether the surface can actually render heading/tilt. Surfaced in the
    /// diagnostics snapshot; the engine tracks heading and tilt either way.
    fn supports_rotation(&self) -> bool;
}

/// Test double that applies commands to plain fields and records them
#[cfg(test)]
#[derive(Debug, Clone, PartialEq)]
pub enum ViewportCommand {
    SetCenter(LatLng),
    SetZoom(f64),
    SetHeading(f64),
    SetTilt(f64),
    PanTo(LatLng),
    FitBounds(GeoBounds, f32),
    SetZoomLimits(Option<(f64, f64)>),
}

#[cfg(test)]
#[derive(Debug)]
pub struct RecordingViewport {
    pub center: LatLng,
    pub zoom: f64,
    pub heading: f64,
    pub tilt: f64,
    pub zoom_limits: Option<(f64, f64)>,
    pub rotation_capable: bool,
    pub commands: Vec<ViewportCommand>,
}

#[cfg(test)]
impl Default for RecordingViewport {
    fn default() -> Self {
        Self {
            center: LatLng::new(0.0, 0.0),
            zoom: 15.0,
            heading: 0.0,
            tilt: 0.0,
            zoom_limits: None,
            rotation_capable: true,
            commands: Vec::new(),
        }
    }
}

#[cfg(test)]
impl RecordingViewport {
    pub fn at(center: LatLng) -> Self {
        Self {
            center,
            ..Self::default()
        }
    }

    pub fn pan_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, ViewportCommand::PanTo(_)))
            .count()
    }

    pub fn clear_commands(&mut self) {
        self.commands.clear();
    }
}

#[cfg(test)]
impl ViewportSurface for RecordingViewport {
    fn center(&self) -> LatLng {
        self.center
    }

    fn set_center(&mut self, center: LatLng) {
        self.center = center;
        self.commands.push(ViewportCommand::SetCenter(center));
    }

    fn zoom(&self) -> f64 {
        self.zoom
    }

    fn set_zoom(&mut self, zoom: f64) {
        self.zoom = zoom;
        self.commands.push(ViewportCommand::SetZoom(zoom));
    }

    fn heading(&self) -> f64 {
        self.heading
    }

    fn set_heading(&mut self, heading: f64) {
        self.heading = heading;
        self.commands.push(ViewportCommand::SetHeading(heading));
    }

    fn tilt(&self) -> f64 {
        self.tilt
    }

    fn set_tilt(&mut self, tilt: f64) {
        self.tilt = tilt;
        self.commands.push(ViewportCommand::SetTilt(tilt));
    }

    fn pan_to(&mut self, target: LatLng) {
        self.center = target;
        self.commands.push(ViewportCommand::PanTo(target));
    }

    fn fit_bounds(&mut self, bounds: GeoBounds, padding_px: f32) {
        self.center = bounds.center();
        self.commands
            .push(ViewportCommand::FitBounds(bounds, padding_px));
    }

    fn set_zoom_limits(&mut self, limits: Option<(f64, f64)>) {
        self.zoom_limits = limits;
        self.commands.push(ViewportCommand::SetZoomLimits(limits));
    }

    fn supports_rotation(&self) -> bool {
        self.rotation_capable
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_viewport_applies_and_records() {
        let mut vp = RecordingViewport::default();
        vp.pan_to(LatLng::new(5.0, 5.0));
        vp.set_zoom(12.0);

        assert_eq!(vp.center, LatLng::new(5.0, 5.0));
        assert_eq!(vp.zoom, 12.0);
        assert_eq!(vp.pan_count(), 1);
        assert_eq!(vp.commands.len(), 2);
    }

    #[test]
    fn test_fit_bounds_centers_on_bounds() {
        let mut vp = RecordingViewport::default();
        vp.fit_bounds(GeoBounds::new(10.0, 0.0, 10.0, 0.0), 48.0);
        assert_eq!(vp.center, LatLng::new(5.0, 5.0));
    }
}
