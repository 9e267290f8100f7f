//! Walking-directions bookkeeping
//!
//! The builder owns the ordered waypoint list and the derived route. Route
//! computation itself is asynchronous and lives outside the engine: every
//! mutation that leaves two or more waypoints emits a [`RouteRequest`] tagged
//! with the current generation, and responses are applied back through
//! [`DirectionsBuilder::apply_outcome`]. A response carrying a stale
//! generation is discarded silently so that a route arriving after the list
//! changed can never repopulate it.

use crate::geometry::LatLng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Meters per statute mile
pub const METERS_PER_MILE: f64 = 1609.344;

/// One clicked point, labeled by insertion order (A, B, ... Z, AA, AB, ...)
#[derive(Debug, Clone, PartialEq)]
pub struct Waypoint {
    pub label: String,
    pub point: LatLng,
}

/// A routing-service request for the full current path, walking profile.
///
/// First point is the origin, last the destination, interior points are
/// ordered stopovers (never reordered by the service).
#[derive(Debug, Clone, PartialEq)]
pub struct RouteRequest {
    pub generation: u64,
    pub origin: LatLng,
    pub stopovers: Vec<LatLng>,
    pub destination: LatLng,
}

/// A computed route: the polyline to draw plus per-leg distances
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteResult {
    pub path: Vec<LatLng>,
    pub leg_meters: Vec<f64>,
    pub total_meters: f64,
}

/// Typed routing failures, recovered locally (route cleared, advisory shown)
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RouteError {
    #[error("no walking route found between the selected points")]
    NoRoute,
    #[error("routing quota exceeded")]
    QuotaExceeded,
    #[error("routing request was denied")]
    PermissionDenied,
    #[error("malformed routing request: {0}")]
    Malformed(String),
}

#[derive(Debug, Default)]
pub struct DirectionsBuilder {
    waypoints: Vec<Waypoint>,
    route: Option<RouteResult>,
    pending: bool,
    generation: u64,
}

impl DirectionsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    pub fn route(&self) -> Option<&RouteResult> {
        self.route.as_ref()
    }

    /// Whether a route request is in flight for the current generation
    pub fn pending(&self) -> bool {
        self.pending
    }

    pub fn total_meters(&self) -> Option<f64> {
        self.route.as_ref().map(|r| r.total_meters)
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// Append a waypoint. Returns a route request when the path now has at
    /// least two points.
    pub fn append(&mut self, point: LatLng) -> Option<RouteRequest> {
        let label = waypoint_label(self.waypoints.len());
        tracing::debug!("Waypoint {} added at ({:.5}, {:.5})", label, point.lat, point.lng);
        self.waypoints.push(Waypoint { label, point });
        self.request_after_mutation()
    }

    /// Remove the last waypoint. Returns a new route request when at least two
    /// points remain; otherwise the route is cleared.
    pub fn undo(&mut self) -> Option<RouteRequest> {
        if self.waypoints.pop().is_none() {
            return None;
        }
        self.request_after_mutation()
    }

    /// Drop every waypoint and the route
    pub fn clear(&mut self) {
        self.waypoints.clear();
        self.route = None;
        self.pending = false;
        self.generation += 1;
    }

    /// Apply a routing completion. Outcomes for any generation other than the
    /// current one are discarded.
    pub fn apply_outcome(
        &mut self,
        generation: u64,
        outcome: Result<RouteResult, RouteError>,
    ) -> Option<RouteError> {
        if generation != self.generation {
            tracing::debug!(
                "Dropping stale route outcome (generation {generation}, current {})",
                self.generation
            );
            return None;
        }
        self.pending = false;
        match outcome {
            Ok(result) => {
                self.route = Some(result);
                None
            }
            Err(err) => {
                // Never display a stale route after a failed recalculation
                self.route = None;
                Some(err)
            }
        }
    }

    /// Human-readable total distance, or None while no route exists
    pub fn distance_display(&self) -> Option<String> {
        self.total_meters().map(format_distance_display)
    }

    fn request_after_mutation(&mut self) -> Option<RouteRequest> {
        self.generation += 1;
        if self.waypoints.len() < 2 {
            self.route = None;
            self.pending = false;
            return None;
        }
        self.pending = true;
        let points: Vec<LatLng> = self.waypoints.iter().map(|w| w.point).collect();
        Some(RouteRequest {
            generation: self.generation,
            origin: points[0],
            stopovers: points[1..points.len() - 1].to_vec(),
            destination: points[points.len() - 1],
        })
    }
}

/// Spreadsheet-style label for a zero-based insertion index: A..Z, AA, AB, ...
pub fn waypoint_label(index: usize) -> String {
    let mut n = index + 1;
    let mut label = String::new();
    while n > 0 {
        n -= 1;
        label.insert(0, (b'A' + (n % 26) as u8) as char);
        n /= 26;
    }
    label
}

/// Total distance in kilometers and miles, with adaptive precision per unit:
/// two decimals below 10 units, one decimal at or above.
pub fn format_distance_display(total_meters: f64) -> String {
    let km = total_meters / 1000.0;
    let mi = total_meters / METERS_PER_MILE;
    format!("{} km ({} mi)", format_adaptive(km), format_adaptive(mi))
}

fn format_adaptive(value: f64) -> String {
    if value < 10.0 {
        format!("{value:.2}")
    } else {
        format!("{value:.1}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(lat: f64, lng: f64) -> LatLng {
        LatLng::new(lat, lng)
    }

    #[test]
    fn test_labels_follow_spreadsheet_order() {
        assert_eq!(waypoint_label(0), "A");
        assert_eq!(waypoint_label(1), "B");
        assert_eq!(waypoint_label(25), "Z");
        assert_eq!(waypoint_label(26), "AA");
        assert_eq!(waypoint_label(27), "AB");
        assert_eq!(waypoint_label(51), "AZ");
        assert_eq!(waypoint_label(52), "BA");
        assert_eq!(waypoint_label(701), "ZZ");
        assert_eq!(waypoint_label(702), "AAA");
    }

    #[test]
    fn test_single_point_produces_no_request() {
        let mut directions = DirectionsBuilder::new();
        assert!(directions.append(p(0.0, 0.0)).is_none());
        assert_eq!(directions.waypoints().len(), 1);
        assert!(!directions.pending());
    }

    #[test]
    fn test_two_points_request_origin_and_destination() {
        let mut directions = DirectionsBuilder::new();
        directions.append(p(0.0, 0.0));
        let request = directions.append(p(0.0, 1.0)).unwrap();

        assert_eq!(request.origin, p(0.0, 0.0));
        assert_eq!(request.destination, p(0.0, 1.0));
        assert!(request.stopovers.is_empty());
        assert!(directions.pending());
    }

    #[test]
    fn test_third_point_makes_second_a_stopover() {
        let mut directions = DirectionsBuilder::new();
        directions.append(p(0.0, 0.0));
        directions.append(p(0.0, 1.0));
        let request = directions.append(p(1.0, 1.0)).unwrap();

        assert_eq!(request.origin, p(0.0, 0.0));
        assert_eq!(request.stopovers, vec![p(0.0, 1.0)]);
        assert_eq!(request.destination, p(1.0, 1.0));
    }

    #[test]
    fn test_outcome_for_current_generation_is_applied() {
        let mut directions = DirectionsBuilder::new();
        directions.append(p(0.0, 0.0));
        let request = directions.append(p(0.0, 1.0)).unwrap();

        let result = RouteResult {
            path: vec![p(0.0, 0.0), p(0.0, 1.0)],
            leg_meters: vec![111_000.0],
            total_meters: 111_000.0,
        };
        let err = directions.apply_outcome(request.generation, Ok(result.clone()));
        assert!(err.is_none());
        assert_eq!(directions.route(), Some(&result));
        assert!(!directions.pending());
    }

    #[test]
    fn test_stale_outcome_is_discarded() {
        let mut directions = DirectionsBuilder::new();
        directions.append(p(0.0, 0.0));
        let stale = directions.append(p(0.0, 1.0)).unwrap();
        // The list changed again before the response arrived
        directions.clear();

        let result = RouteResult {
            path: vec![p(0.0, 0.0), p(0.0, 1.0)],
            leg_meters: vec![111_000.0],
            total_meters: 111_000.0,
        };
        directions.apply_outcome(stale.generation, Ok(result));
        assert!(directions.route().is_none());
        assert!(directions.is_empty());
    }

    #[test]
    fn test_failure_clears_previous_route() {
        let mut directions = DirectionsBuilder::new();
        directions.append(p(0.0, 0.0));
        let first = directions.append(p(0.0, 1.0)).unwrap();
        directions.apply_outcome(
            first.generation,
            Ok(RouteResult {
                path: vec![p(0.0, 0.0), p(0.0, 1.0)],
                leg_meters: vec![111_000.0],
                total_meters: 111_000.0,
            }),
        );

        let second = directions.append(p(1.0, 1.0)).unwrap();
        let err = directions.apply_outcome(second.generation, Err(RouteError::NoRoute));
        assert_eq!(err, Some(RouteError::NoRoute));
        assert!(directions.route().is_none());
        assert!(directions.distance_display().is_none());
    }

    #[test]
    fn test_undo_below_two_points_clears_route() {
        let mut directions = DirectionsBuilder::new();
        directions.append(p(0.0, 0.0));
        let request = directions.append(p(0.0, 1.0)).unwrap();
        directions.apply_outcome(
            request.generation,
            Ok(RouteResult {
                path: vec![p(0.0, 0.0), p(0.0, 1.0)],
                leg_meters: vec![111_000.0],
                total_meters: 111_000.0,
            }),
        );

        assert!(directions.undo().is_none());
        assert_eq!(directions.waypoints().len(), 1);
        assert!(directions.route().is_none());
    }

    #[test]
    fn test_undo_with_three_points_requests_again() {
        let mut directions = DirectionsBuilder::new();
        directions.append(p(0.0, 0.0));
        directions.append(p(0.0, 1.0));
        directions.append(p(1.0, 1.0));

        let request = directions.undo().unwrap();
        assert_eq!(request.origin, p(0.0, 0.0));
        assert_eq!(request.destination, p(0.0, 1.0));
        assert!(request.stopovers.is_empty());
    }

    #[test]
    fn test_distance_display_precision() {
        // Below 10 units: two decimals; at or above: one decimal
        assert_eq!(format_distance_display(9_994.0), "9.99 km (6.21 mi)");
        assert_eq!(format_distance_display(10_000.0), "10.0 km (6.21 mi)");
        assert_eq!(format_distance_display(3_420.0), "3.42 km (2.13 mi)");
        // Kilometers cross the threshold before miles do
        assert_eq!(format_distance_display(12_300.0), "12.3 km (7.64 mi)");
        // Miles at one decimal once past ten
        assert_eq!(format_distance_display(20_000.0), "20.0 km (12.4 mi)");
    }
}
