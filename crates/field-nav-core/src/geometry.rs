//! Coordinate types and pure bounds math for the dual-zone constraint engine
//!
//! All angles are WGS84 degrees, all distances meters. Every function here is
//! total for normalized rectangle input and side-effect-free except for
//! diagnostic logging.

use geo::{Contains, Coord, Rect};
use serde::{Deserialize, Serialize};

/// World limits used when clamping derived rectangles
pub const MAX_LATITUDE_DEG: f64 = 85.0;
pub const MAX_LONGITUDE_DEG: f64 = 180.0;

/// Mean Earth radius for great-circle distances
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Per-side expansion when deriving the viewable bounds (50% per side,
/// doubling the linear extent of the selection on each axis)
pub const VIEWABLE_EXPAND_RATIO: f64 = 0.5;

/// Per-side expansion when deriving the context frame (15% total)
pub const FRAME_EXPAND_RATIO: f64 = 0.075;

/// Leash radius = geodesic NE-SW diagonal of the selection times this factor.
/// Tunable; values in 2.0..=2.75 keep the leash loose enough to browse the
/// viewable bounds without escaping them.
pub const LEASH_RADIUS_FACTOR: f64 = 2.25;

/// A WGS84 position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Axis-aligned geographic rectangle in degrees
///
/// The edges are named rather than min/max because everything upstream of the
/// engine (draw tool, persistence, routing display) speaks north/south/east/
/// west. Normalized bounds satisfy `north >= south` and `east >= west`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

impl GeoBounds {
    pub fn new(north: f64, south: f64, east: f64, west: f64) -> Self {
        Self {
            north,
            south,
            east,
            west,
        }
    }

    /// Swap edges as needed so that north >= south and east >= west.
    ///
    /// An original east < west signals a selection crossing the antimeridian.
    /// That case is logged and the edges are swapped anyway: downstream math
    /// stays total but is not meaningful near the date line, which is
    /// explicitly unsupported.
    pub fn normalize(self) -> GeoBounds {
        let mut b = self;
        if b.south > b.north {
            std::mem::swap(&mut b.north, &mut b.south);
        }
        if b.east < b.west {
            tracing::warn!(
                "Selection east ({:.4}) < west ({:.4}): likely antimeridian crossing, \
                 which is unsupported; swapping edges",
                b.east,
                b.west
            );
            std::mem::swap(&mut b.east, &mut b.west);
        }
        b
    }

    /// Geographic center of the rectangle
    pub fn center(&self) -> LatLng {
        let c = self.to_rect().center();
        LatLng::new(c.y, c.x)
    }

    pub fn lat_span(&self) -> f64 {
        self.north - self.south
    }

    pub fn lng_span(&self) -> f64 {
        self.east - self.west
    }

    pub fn northeast(&self) -> LatLng {
        LatLng::new(self.north, self.east)
    }

    pub fn southwest(&self) -> LatLng {
        LatLng::new(self.south, self.west)
    }

    /// Whether a point lies inside the rectangle.
    ///
    /// Geographic containment, independent of any viewport heading. Points
    /// exactly on the boundary count as outside.
    pub fn contains(&self, point: LatLng) -> bool {
        self.to_rect().contains(&Coord {
            x: point.lng,
            y: point.lat,
        })
    }

    /// Convert to a `geo::Rect` with x = longitude, y = latitude
    pub fn to_rect(&self) -> Rect<f64> {
        Rect::new(
            Coord {
                x: self.west,
                y: self.south,
            },
            Coord {
                x: self.east,
                y: self.north,
            },
        )
    }

    pub fn from_rect(rect: Rect<f64>) -> GeoBounds {
        GeoBounds {
            north: rect.max().y,
            south: rect.min().y,
            east: rect.max().x,
            west: rect.min().x,
        }
    }

    /// Rectangle area in square degrees (zero for degenerate bands)
    pub fn area_deg2(&self) -> f64 {
        self.lat_span() * self.lng_span()
    }

    fn clamped_to_world(self) -> GeoBounds {
        GeoBounds {
            north: self.north.clamp(-MAX_LATITUDE_DEG, MAX_LATITUDE_DEG),
            south: self.south.clamp(-MAX_LATITUDE_DEG, MAX_LATITUDE_DEG),
            east: self.east.clamp(-MAX_LONGITUDE_DEG, MAX_LONGITUDE_DEG),
            west: self.west.clamp(-MAX_LONGITUDE_DEG, MAX_LONGITUDE_DEG),
        }
    }

    fn expanded(self, ratio: f64) -> GeoBounds {
        let lat_pad = self.lat_span() * ratio;
        let lng_pad = self.lng_span() * ratio;
        GeoBounds {
            north: self.north + lat_pad,
            south: self.south - lat_pad,
            east: self.east + lng_pad,
            west: self.west - lng_pad,
        }
        .clamped_to_world()
    }
}

/// The full world rectangle in clamped coordinates
pub fn world_bounds() -> GeoBounds {
    GeoBounds {
        north: MAX_LATITUDE_DEG,
        south: -MAX_LATITUDE_DEG,
        east: MAX_LONGITUDE_DEG,
        west: -MAX_LONGITUDE_DEG,
    }
}

/// Bounds the user is allowed to browse in Map mode: the selection expanded
/// by 50% per side on each axis, clamped to world limits.
pub fn viewable_bounds(selected: GeoBounds) -> GeoBounds {
    selected.expanded(VIEWABLE_EXPAND_RATIO)
}

/// The context frame drawn around the selection: 7.5% expansion per side,
/// clamped to world limits. The visual mask covers everything outside it.
pub fn context_frame(selected: GeoBounds) -> GeoBounds {
    selected.expanded(FRAME_EXPAND_RATIO)
}

/// Four rectangles that tile the world outside the context frame.
///
/// Order: top band, bottom band, left band, right band. The top and bottom
/// bands run the full world width; the side bands cover exactly the frame's
/// latitude span. Together they cover world-minus-frame with no gaps and no
/// overlaps. Bands collapse to zero area when the frame touches a world edge.
pub fn context_mask(selected: GeoBounds) -> [GeoBounds; 4] {
    let frame = context_frame(selected);
    [
        GeoBounds::new(MAX_LATITUDE_DEG, frame.north, MAX_LONGITUDE_DEG, -MAX_LONGITUDE_DEG),
        GeoBounds::new(frame.south, -MAX_LATITUDE_DEG, MAX_LONGITUDE_DEG, -MAX_LONGITUDE_DEG),
        GeoBounds::new(frame.north, frame.south, frame.west, -MAX_LONGITUDE_DEG),
        GeoBounds::new(frame.north, frame.south, MAX_LONGITUDE_DEG, frame.east),
    ]
}

/// Great-circle distance between two positions in meters
pub fn haversine_distance_m(a: LatLng, b: LatLng) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let delta_lat = (b.lat - a.lat).to_radians();
    let delta_lng = (b.lng - a.lng).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lng / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_M * c
}

/// Leash radius for a selection: geodesic distance between its northeast and
/// southwest corners, scaled by [`LEASH_RADIUS_FACTOR`].
pub fn leash_radius_m(selected: GeoBounds) -> f64 {
    haversine_distance_m(selected.northeast(), selected.southwest()) * LEASH_RADIUS_FACTOR
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ten_degree_selection() -> GeoBounds {
        GeoBounds::new(10.0, 0.0, 10.0, 0.0)
    }

    #[test]
    fn test_normalize_swaps_flipped_edges() {
        let flipped = GeoBounds::new(0.0, 10.0, 0.0, 10.0);
        let b = flipped.normalize();
        assert!(b.north >= b.south);
        assert!(b.east >= b.west);
        assert_eq!(b, ten_degree_selection());
    }

    #[test]
    fn test_normalize_is_identity_for_normalized_input() {
        let b = ten_degree_selection();
        assert_eq!(b.normalize(), b);
    }

    #[test]
    fn test_normalize_holds_for_assorted_rectangles() {
        let cases = [
            GeoBounds::new(5.0, -5.0, 20.0, -20.0),
            GeoBounds::new(-5.0, 5.0, -20.0, 20.0),
            GeoBounds::new(51.6, 51.4, 0.1, -0.3),
            GeoBounds::new(-80.0, 80.0, 179.0, -179.0),
            GeoBounds::new(0.0, 0.0, 0.0, 0.0),
        ];
        for case in cases {
            let b = case.normalize();
            assert!(b.north >= b.south, "north < south for {case:?}");
            assert!(b.east >= b.west, "east < west for {case:?}");
        }
    }

    #[test]
    fn test_center_and_spans() {
        let b = ten_degree_selection();
        let c = b.center();
        assert!((c.lat - 5.0).abs() < 1e-9);
        assert!((c.lng - 5.0).abs() < 1e-9);
        assert!((b.lat_span() - 10.0).abs() < 1e-9);
        assert!((b.lng_span() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_contains_interior_and_exterior() {
        let b = ten_degree_selection();
        assert!(b.contains(LatLng::new(5.0, 5.0)));
        assert!(!b.contains(LatLng::new(11.0, 5.0)));
        assert!(!b.contains(LatLng::new(5.0, -1.0)));
        assert!(!b.contains(LatLng::new(-0.1, 10.1)));
    }

    #[test]
    fn test_viewable_bounds_expands_and_contains_selection() {
        let b = ten_degree_selection();
        let v = viewable_bounds(b);
        assert!((v.north - 15.0).abs() < 1e-9);
        assert!((v.south - -5.0).abs() < 1e-9);
        assert!((v.east - 15.0).abs() < 1e-9);
        assert!((v.west - -5.0).abs() < 1e-9);
        // Output always contains the input
        assert!(v.north >= b.north && v.south <= b.south);
        assert!(v.east >= b.east && v.west <= b.west);
    }

    #[test]
    fn test_viewable_bounds_clamps_to_world() {
        let near_pole = GeoBounds::new(84.0, 40.0, 170.0, 100.0);
        let v = viewable_bounds(near_pole);
        assert!(v.north <= MAX_LATITUDE_DEG);
        assert!(v.south >= -MAX_LATITUDE_DEG);
        assert!(v.east <= MAX_LONGITUDE_DEG);
        assert!(v.west >= -MAX_LONGITUDE_DEG);
        // Still contains the selection
        assert!(v.north >= near_pole.north && v.west <= near_pole.west);
    }

    #[test]
    fn test_context_frame_ten_degree_scenario() {
        // 7.5% of a 10-degree span is 0.75 degrees per side
        let frame = context_frame(ten_degree_selection());
        assert!((frame.north - 10.75).abs() < 1e-9);
        assert!((frame.south - -0.75).abs() < 1e-9);
        assert!((frame.east - 10.75).abs() < 1e-9);
        assert!((frame.west - -0.75).abs() < 1e-9);
    }

    #[test]
    fn test_mask_tiles_world_minus_frame() {
        let selections = [
            ten_degree_selection(),
            GeoBounds::new(51.6, 51.4, 0.1, -0.3),
            GeoBounds::new(84.9, -84.9, 179.9, -179.9),
            GeoBounds::new(-10.0, -40.0, -60.0, -100.0),
        ];
        for selected in selections {
            let frame = context_frame(selected);
            let mask = context_mask(selected);
            let band_area: f64 = mask.iter().map(|b| b.area_deg2()).sum();
            let expected = world_bounds().area_deg2() - frame.area_deg2();
            assert!(
                (band_area - expected).abs() < 1e-6,
                "mask bands do not tile world minus frame for {selected:?}: \
                 got {band_area}, expected {expected}"
            );
        }
    }

    #[test]
    fn test_mask_bands_do_not_overlap() {
        let mask = context_mask(ten_degree_selection());
        for (i, a) in mask.iter().enumerate() {
            for b in mask.iter().skip(i + 1) {
                let overlap_lat = a.south.max(b.south) < a.north.min(b.north);
                let overlap_lng = a.west.max(b.west) < a.east.min(b.east);
                assert!(
                    !(overlap_lat && overlap_lng),
                    "bands {a:?} and {b:?} overlap"
                );
            }
        }
    }

    #[test]
    fn test_mask_bands_exclude_frame_interior() {
        let selected = ten_degree_selection();
        let frame = context_frame(selected);
        let center = frame.center();
        for band in context_mask(selected) {
            assert!(!band.contains(center));
        }
    }

    #[test]
    fn test_haversine_known_distance() {
        // London to Paris is roughly 344 km
        let london = LatLng::new(51.5074, -0.1278);
        let paris = LatLng::new(48.8566, 2.3522);
        let d = haversine_distance_m(london, paris);
        assert!((d - 344_000.0).abs() < 5_000.0, "got {d}");
    }

    #[test]
    fn test_haversine_zero_for_same_point() {
        let p = LatLng::new(51.5, -0.1);
        assert!(haversine_distance_m(p, p).abs() < 1e-9);
    }

    #[test]
    fn test_leash_radius_ten_degree_scenario() {
        let selected = ten_degree_selection();
        let diagonal = haversine_distance_m(LatLng::new(0.0, 0.0), LatLng::new(10.0, 10.0));
        let radius = leash_radius_m(selected);
        assert!((radius - diagonal * 2.25).abs() < 1e-6);
        // Sanity: a 10x10 degree diagonal is on the order of 1500 km
        assert!(radius > 2_000_000.0 && radius < 5_000_000.0);
    }

    #[test]
    fn test_leash_factor_within_design_range() {
        assert!((2.0..=2.75).contains(&LEASH_RADIUS_FACTOR));
    }

    #[test]
    fn test_rect_roundtrip() {
        let b = GeoBounds::new(51.6, 51.4, 0.1, -0.3);
        assert_eq!(GeoBounds::from_rect(b.to_rect()), b);
    }
}
