//! The selected area and everything derived from it
//!
//! Viewable bounds, context frame, mask rectangles and leash parameters are
//! all functions of the selected rectangle. Computing them together in one
//! constructor means they can never drift apart when the selection changes.

use crate::geometry::{
    self, GeoBounds, LatLng, context_frame, context_mask, leash_radius_m, viewable_bounds,
};

/// A normalized selection rectangle with its derived data
#[derive(Debug, Clone, PartialEq)]
pub struct AreaSelection {
    selected: GeoBounds,
    viewable: GeoBounds,
    frame: GeoBounds,
    mask: [GeoBounds; 4],
    anchor: LatLng,
    leash_radius_m: f64,
}

impl AreaSelection {
    /// Build a selection from a raw drawn rectangle.
    ///
    /// The input is normalized first (flipped edges swapped, antimeridian
    /// crossings logged), then all derived rectangles are computed.
    pub fn new(raw: GeoBounds) -> Self {
        let selected = raw.normalize();
        Self {
            selected,
            viewable: viewable_bounds(selected),
            frame: context_frame(selected),
            mask: context_mask(selected),
            anchor: selected.center(),
            leash_radius_m: leash_radius_m(selected),
        }
    }

    pub fn selected(&self) -> GeoBounds {
        self.selected
    }

    pub fn viewable(&self) -> GeoBounds {
        self.viewable
    }

    pub fn frame(&self) -> GeoBounds {
        self.frame
    }

    pub fn mask(&self) -> [GeoBounds; 4] {
        self.mask
    }

    /// Leash anchor: the exact centroid of the selection
    pub fn anchor(&self) -> LatLng {
        self.anchor
    }

    pub fn leash_radius_m(&self) -> f64 {
        self.leash_radius_m
    }

    /// Rotation-invariant containment test against the selection rectangle
    pub fn contains(&self, point: LatLng) -> bool {
        self.selected.contains(point)
    }

    /// Distance from a point to the leash anchor in meters
    pub fn distance_to_anchor_m(&self, point: LatLng) -> f64 {
        geometry::haversine_distance_m(point, self.anchor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_normalizes_raw_input() {
        let sel = AreaSelection::new(GeoBounds::new(0.0, 10.0, 0.0, 10.0));
        assert_eq!(sel.selected(), GeoBounds::new(10.0, 0.0, 10.0, 0.0));
    }

    #[test]
    fn test_derived_data_is_consistent() {
        let sel = AreaSelection::new(GeoBounds::new(10.0, 0.0, 10.0, 0.0));
        assert_eq!(sel.viewable(), viewable_bounds(sel.selected()));
        assert_eq!(sel.frame(), context_frame(sel.selected()));
        assert_eq!(sel.mask(), context_mask(sel.selected()));
        assert_eq!(sel.leash_radius_m(), leash_radius_m(sel.selected()));
        let anchor = sel.anchor();
        assert!((anchor.lat - 5.0).abs() < 1e-9);
        assert!((anchor.lng - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_contains_uses_selected_rectangle_not_frame() {
        let sel = AreaSelection::new(GeoBounds::new(10.0, 0.0, 10.0, 0.0));
        // Inside the frame expansion but outside the selection proper
        assert!(!sel.contains(LatLng::new(10.5, 5.0)));
        assert!(sel.contains(LatLng::new(9.9, 5.0)));
    }

    #[test]
    fn test_distance_to_anchor() {
        let sel = AreaSelection::new(GeoBounds::new(10.0, 0.0, 10.0, 0.0));
        assert!(sel.distance_to_anchor_m(sel.anchor()).abs() < 1e-9);
        assert!(sel.distance_to_anchor_m(LatLng::new(0.0, 0.0)) > 100_000.0);
    }
}
