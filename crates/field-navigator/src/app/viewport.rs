//! Viewport adapter over the walkers map state
//!
//! `walkers::MapMemory` understands center and zoom but has no heading, tilt,
//! or zoom-limit concepts, so this adapter tracks those itself: heading and
//! tilt feed the overlay/HUD rendering, and zoom limits are enforced by
//! clamping every zoom mutation. The slippy map cannot rotate, which the
//! adapter reports through `supports_rotation`.

use field_nav_core::{DEFAULT_CENTER, DEFAULT_ZOOM, GeoBounds, LatLng, ViewportSurface};
use walkers::{MapMemory, Position};

pub fn to_position(p: LatLng) -> Position {
    walkers::lat_lon(p.lat, p.lng)
}

pub fn from_position(p: Position) -> LatLng {
    LatLng::new(p.y(), p.x())
}

/// Zoom range walkers accepts; engine-imposed limits clamp within this.
const SURFACE_ZOOM_RANGE: (f64, f64) = (1.0, 19.0);

pub struct MapViewport {
    memory: MapMemory,
    /// Reported center while the map is not detached from "my position"
    home: LatLng,
    heading: f64,
    tilt: f64,
    zoom_limits: Option<(f64, f64)>,
}

impl MapViewport {
    pub fn new() -> Self {
        let mut memory = MapMemory::default();
        let _ = memory.set_zoom(DEFAULT_ZOOM);
        Self {
            memory,
            home: DEFAULT_CENTER,
            heading: 0.0,
            tilt: 0.0,
            zoom_limits: None,
        }
    }

    /// Mutable access for the map widget itself; user gestures land here
    pub fn memory_mut(&mut self) -> &mut MapMemory {
        &mut self.memory
    }

    fn clamp_zoom(&self, zoom: f64) -> f64 {
        let (lo, hi) = self.zoom_limits.unwrap_or(SURFACE_ZOOM_RANGE);
        zoom.clamp(lo.max(SURFACE_ZOOM_RANGE.0), hi.min(SURFACE_ZOOM_RANGE.1))
    }
}

impl Default for MapViewport {
    fn default() -> Self {
        Self::new()
    }
}

/// Nominal viewport dimension for translating padding into a zoom backoff;
/// walkers does not expose the widget size at this layer.
const NOMINAL_VIEWPORT_PX: f32 = 800.0;

/// Zoom level that fits the given span of degrees into a typical viewport,
/// backed off so `padding_px` of margin remains on each side.
fn zoom_for_span(span_deg: f64, padding_px: f32) -> f64 {
    if span_deg <= 0.0 {
        return DEFAULT_ZOOM;
    }
    let usable = (NOMINAL_VIEWPORT_PX - 2.0 * padding_px.max(0.0)).max(1.0);
    let backoff = f64::from(NOMINAL_VIEWPORT_PX / usable).log2();
    (4.0 * 360.0 / span_deg).log2() - backoff
}

impl ViewportSurface for MapViewport {
    fn center(&self) -> LatLng {
        self.memory.detached().map(from_position).unwrap_or(self.home)
    }

    fn set_center(&mut self, center: LatLng) {
        self.memory.center_at(to_position(center));
    }

    fn zoom(&self) -> f64 {
        self.memory.zoom()
    }

    fn set_zoom(&mut self, zoom: f64) {
        let clamped = self.clamp_zoom(zoom);
        if self.memory.set_zoom(clamped).is_err() {
            tracing::debug!("Rejected zoom level {clamped}");
        }
    }

    fn heading(&self) -> f64 {
        self.heading
    }

    fn set_heading(&mut self, heading: f64) {
        self.heading = heading.rem_euclid(360.0);
    }

    fn tilt(&self) -> f64 {
        self.tilt
    }

    fn set_tilt(&mut self, tilt: f64) {
        self.tilt = tilt;
    }

    fn pan_to(&mut self, target: LatLng) {
        self.memory.center_at(to_position(target));
    }

    fn fit_bounds(&mut self, bounds: GeoBounds, padding_px: f32) {
        let span = bounds.lat_span().max(bounds.lng_span());
        self.memory.center_at(to_position(bounds.center()));
        let zoom = self.clamp_zoom(zoom_for_span(span, padding_px));
        if self.memory.set_zoom(zoom).is_err() {
            tracing::debug!("Rejected fit zoom level {zoom}");
        }
        tracing::trace!("Fit to {:?} at zoom {:.1}", bounds, zoom);
    }

    fn set_zoom_limits(&mut self, limits: Option<(f64, f64)>) {
        self.zoom_limits = limits;
        let current = self.memory.zoom();
        let clamped = self.clamp_zoom(current);
        if clamped != current {
            let _ = self.memory.set_zoom(clamped);
        }
    }

    fn supports_rotation(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pan_to_detaches_and_reports_center() {
        let mut viewport = MapViewport::new();
        assert_eq!(viewport.center(), DEFAULT_CENTER);

        viewport.pan_to(LatLng::new(5.0, 5.0));
        assert_eq!(viewport.center(), LatLng::new(5.0, 5.0));
    }

    #[test]
    fn test_zoom_respects_engine_limits() {
        let mut viewport = MapViewport::new();
        viewport.set_zoom_limits(Some((3.0, 10.0)));

        viewport.set_zoom(22.0);
        assert_eq!(viewport.zoom(), 10.0);

        viewport.set_zoom(1.0);
        assert_eq!(viewport.zoom(), 3.0);

        // Removing limits restores the surface range
        viewport.set_zoom_limits(None);
        viewport.set_zoom(15.0);
        assert_eq!(viewport.zoom(), 15.0);
    }

    #[test]
    fn test_setting_limits_clamps_the_current_zoom() {
        let mut viewport = MapViewport::new();
        viewport.set_zoom(18.0);
        viewport.set_zoom_limits(Some((2.0, 12.0)));
        assert_eq!(viewport.zoom(), 12.0);
    }

    #[test]
    fn test_fit_bounds_centers_on_the_selection() {
        let mut viewport = MapViewport::new();
        viewport.fit_bounds(GeoBounds::new(10.0, 0.0, 10.0, 0.0), 48.0);
        assert_eq!(viewport.center(), LatLng::new(5.0, 5.0));
        // A 10-degree span lands well below world zoom and above street zoom
        assert!(viewport.zoom() > 4.0 && viewport.zoom() < 10.0);
    }

    #[test]
    fn test_heading_wraps_into_range() {
        let mut viewport = MapViewport::new();
        viewport.set_heading(-90.0);
        assert_eq!(viewport.heading(), 270.0);
        assert!(!viewport.supports_rotation());
    }

    #[test]
    fn test_zoom_for_span_is_monotonic() {
        assert!(zoom_for_span(1.0, 48.0) > zoom_for_span(10.0, 48.0));
        assert!(zoom_for_span(10.0, 48.0) > zoom_for_span(180.0, 48.0));
        assert_eq!(zoom_for_span(0.0, 48.0), DEFAULT_ZOOM);
    }

    #[test]
    fn test_more_padding_backs_the_zoom_off_further() {
        assert!(zoom_for_span(10.0, 150.0) < zoom_for_span(10.0, 48.0));
        // Degenerate padding never inverts the zoom direction
        assert!(zoom_for_span(10.0, 10_000.0) < zoom_for_span(10.0, 0.0));
    }
}
