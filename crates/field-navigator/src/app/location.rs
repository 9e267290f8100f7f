//! Simulated geolocation stream for desktop
//!
//! Desktop machines rarely expose a positioning service, so the production
//! adapter synthesizes a slow drift around the default center at a ~1 s
//! cadence. `--simulate-location-failure` makes the first poll fail instead,
//! exercising the advisory path; the stream stays restartable afterwards.

use field_nav_core::{DEFAULT_CENTER, LatLng, LocationError, LocationFix, LocationStream};
use instant::Instant;
use std::f64::consts::TAU;
use std::time::Duration;

const FIX_CADENCE: Duration = Duration::from_secs(1);
/// Drift amplitude in degrees (roughly 45 m at the equator)
const DRIFT_DEG: f64 = 0.0004;

pub struct SimulatedLocation {
    active: bool,
    fail: bool,
    failed: bool,
    base: LatLng,
    started: Option<Instant>,
    last_emit: Option<Instant>,
}

impl SimulatedLocation {
    pub fn new(fail: bool) -> Self {
        Self {
            active: false,
            fail,
            failed: false,
            base: DEFAULT_CENTER,
            started: None,
            last_emit: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    fn poll_at(&mut self, now: Instant) -> Option<Result<LocationFix, LocationError>> {
        if !self.active {
            return None;
        }

        if self.fail {
            if self.failed {
                return None;
            }
            self.failed = true;
            self.active = false;
            return Some(Err(LocationError::PermissionDenied));
        }

        if let Some(last) = self.last_emit {
            if now.duration_since(last) < FIX_CADENCE {
                return None;
            }
        }
        self.last_emit = Some(now);

        // Slow circular walk around the base point
        let t = self
            .started
            .map_or(0.0, |s| now.duration_since(s).as_secs_f64());
        let phase = t / 30.0 * TAU;
        Some(Ok(LocationFix {
            lat: self.base.lat + DRIFT_DEG * phase.sin(),
            lng: self.base.lng + DRIFT_DEG * phase.cos(),
            accuracy_m: 12.0 + 6.0 * (t / 7.0).sin().abs(),
        }))
    }
}

impl LocationStream for SimulatedLocation {
    fn start(&mut self) {
        tracing::info!("Starting simulated location watch");
        self.active = true;
        self.failed = false;
        self.started = Some(Instant::now());
        self.last_emit = None;
    }

    fn stop(&mut self) {
        tracing::info!("Stopping simulated location watch");
        self.active = false;
    }

    fn poll(&mut self) -> Option<Result<LocationFix, LocationError>> {
        self.poll_at(Instant::now())
    }
}
