//! The dual-zone navigation engine
//!
//! One explicit state struct owns everything the map view mutates: mode,
//! selection, heading/tilt, leash, rotation gesture, directions and the
//! advisory notice. The shell feeds it [`NavEvent`]s plus a `now` instant,
//! polls due timers through [`NavEngine::tick`], and renders from the
//! read-only [`NavSnapshot`]. The engine talks to the map only through the
//! [`ViewportSurface`] trait, so every transition is testable against a fake.

use crate::directions::{DirectionsBuilder, RouteError, RouteRequest, RouteResult, Waypoint};
use crate::geolocate::{LocationError, LocationFix, LocationState};
use crate::geometry::{GeoBounds, LatLng};
use crate::handles::{TimerPurpose, TimerTable};
use crate::leash::{LEASH_DEBOUNCE_MS, LeashController};
use crate::persist::{self, KeyValueStore, PersistedView};
use crate::rotation::{RotationController, ScreenPoint, TILT_AERIAL_DEG, tilt_for_selection};
use crate::selection::AreaSelection;
use crate::viewport::ViewportSurface;
use instant::Instant;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default viewport when nothing is selected (London)
pub const DEFAULT_CENTER: LatLng = LatLng { lat: 51.505, lng: -0.09 };
pub const DEFAULT_ZOOM: f64 = 15.0;

/// Padding around the selection when fitting the viewport to it
pub const FIT_PADDING_PX: f32 = 48.0;

/// Delay between the fit-to-selection animation and Map-mode entry
pub const MODE_TRANSITION_SETTLE_MS: u64 = 350;

/// Advisory notices dismiss themselves after this long
pub const NOTICE_AUTO_CLEAR_MS: u64 = 4000;

/// Zoom range while leashed. Wide on purpose: the constraint is the leash,
/// not a viewport zoom lock.
pub const MAP_MODE_ZOOM_LIMITS: (f64, f64) = (1.0, 22.0);

/// The two navigation regimes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NavMode {
    /// Unrestricted world browsing
    #[default]
    Global,
    /// Leashed to the selected area, mask visible outside the context frame
    Map,
}

/// A transient user-facing message (replaces the previous one, auto-clears)
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub title: String,
    pub detail: String,
}

/// Everything the shell can tell the engine
#[derive(Debug, Clone, PartialEq)]
pub enum NavEvent {
    /// The draw tool was armed (advisory only; the tool itself is app-side)
    DrawArmed,
    /// A rectangle-draw gesture completed
    RectangleDrawn { bounds: GeoBounds },
    /// Primary click on the map at an unprojected position
    MapClick { point: LatLng },
    /// Viewport movement settled
    ViewportIdle,
    /// A pan drag ended
    DragEnd,
    /// Recenter on the selection, reset heading, force Map mode
    ResetView,
    /// Clear the selection and every restriction
    ResetBounds,
    /// Remove the last directions waypoint
    UndoWaypoint,
    /// Drop all waypoints and the route
    ClearRoute,
    RotatePress { pointer: ScreenPoint, view_center: ScreenPoint },
    RotateMove { pointer: ScreenPoint },
    RotateRelease,
    /// The shell started or stopped the geolocation watch
    LocationWatch { active: bool },
    LocationUpdate(LocationFix),
    LocationFailed(LocationError),
    DismissNotice,
}

/// Read-only leash diagnostics
#[derive(Debug, Clone, PartialEq)]
pub struct LeashSnapshot {
    pub armed: bool,
    pub anchor: LatLng,
    pub radius_m: f64,
    pub corrections: u64,
    pub last_distance_m: f64,
}

/// Read-only directions state
#[derive(Debug, Clone, PartialEq)]
pub struct DirectionsSnapshot {
    pub waypoints: Vec<Waypoint>,
    pub route: Option<RouteResult>,
    pub total_meters: Option<f64>,
    pub distance_display: Option<String>,
    pub pending: bool,
}

/// What the rendering layer sees. Built per frame; never a mutation path.
#[derive(Debug, Clone, PartialEq)]
pub struct NavSnapshot {
    pub mode: NavMode,
    pub heading: f64,
    pub tilt: f64,
    pub rotation_capable: bool,
    pub context_menu_suppressed: bool,
    pub selected_area: Option<GeoBounds>,
    pub viewable_bounds: Option<GeoBounds>,
    pub context_frame: Option<GeoBounds>,
    /// Present only while the mask is visible (Map mode)
    pub mask: Option<[GeoBounds; 4]>,
    pub leash: Option<LeashSnapshot>,
    pub directions: DirectionsSnapshot,
    pub location: LocationState,
    pub notice: Option<Notice>,
}

pub struct NavEngine {
    mode: NavMode,
    selection: Option<AreaSelection>,
    leash: Option<LeashController>,
    rotation: RotationController,
    directions: DirectionsBuilder,
    timers: TimerTable,
    heading: f64,
    tilt: f64,
    mask_visible: bool,
    location: LocationState,
    notice: Option<Notice>,
    rotation_capable: bool,
    persist_dirty: bool,
}

impl Default for NavEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[profiling::all_functions]
impl NavEngine {
    pub fn new() -> Self {
        Self {
            mode: NavMode::Global,
            selection: None,
            leash: None,
            rotation: RotationController::new(),
            directions: DirectionsBuilder::new(),
            timers: TimerTable::new(),
            heading: 0.0,
            tilt: 0.0,
            mask_visible: false,
            location: LocationState::Off,
            notice: None,
            rotation_capable: false,
            persist_dirty: false,
        }
    }

    /// Rebuild the engine from a persisted view. The mode restores to Map only
    /// when a selected area was restored with it; tilt is never read from
    /// storage, only recomputed from selection presence.
    pub fn restore(store: &dyn KeyValueStore) -> Self {
        let mut engine = Self::new();
        if let Some(view) = persist::load_view(store) {
            if let Some(bounds) = view.selected_area {
                let selection = AreaSelection::new(bounds);
                engine.leash = Some(LeashController::from_selection(&selection));
                engine.selection = Some(selection);
                if view.mode == NavMode::Map {
                    engine.mode = NavMode::Map;
                    engine.mask_visible = true;
                    if let Some(leash) = engine.leash.as_mut() {
                        leash.arm();
                    }
                }
            }
            engine.heading = view.heading.rem_euclid(360.0);
            tracing::info!(
                "Restored persisted view: mode {:?}, selection {}",
                engine.mode,
                engine.selection.is_some()
            );
        }
        engine.tilt = tilt_for_selection(engine.selection.is_some());
        engine
    }

    /// Push the engine's restored state onto a freshly created viewport.
    /// Called once by the shell after construction.
    pub fn apply_to_viewport(&mut self, viewport: &mut dyn ViewportSurface) {
        self.rotation_capable = viewport.supports_rotation();
        viewport.set_heading(self.heading);
        viewport.set_tilt(self.tilt);
        if self.mode == NavMode::Map {
            viewport.set_zoom_limits(Some(MAP_MODE_ZOOM_LIMITS));
        }
        match &self.selection {
            Some(selection) => viewport.fit_bounds(selection.selected(), FIT_PADDING_PX),
            None => {
                viewport.pan_to(DEFAULT_CENTER);
                viewport.set_zoom(DEFAULT_ZOOM);
            }
        }
    }

    /// Apply one event. Returns a route request when a directions mutation
    /// left two or more waypoints; the shell dispatches it to the routing
    /// service and feeds the completion back via [`Self::apply_route_outcome`].
    pub fn handle_event(
        &mut self,
        event: NavEvent,
        viewport: &mut dyn ViewportSurface,
        now: Instant,
    ) -> Option<RouteRequest> {
        match event {
            NavEvent::DrawArmed => {
                self.post_notice("Draw Your Area", "Tap and drag to define the map boundaries.", now);
                None
            }
            NavEvent::RectangleDrawn { bounds } => {
                let selection = AreaSelection::new(bounds);
                tracing::info!("Area selected: {:?}", selection.selected());
                self.leash = Some(LeashController::from_selection(&selection));
                // Old waypoints may lie outside the new area
                self.directions.clear();
                self.tilt = TILT_AERIAL_DEG;
                viewport.set_tilt(self.tilt);
                viewport.fit_bounds(selection.selected(), FIT_PADDING_PX);
                self.selection = Some(selection);
                self.timers.schedule(
                    TimerPurpose::ModeTransition,
                    Duration::from_millis(MODE_TRANSITION_SETTLE_MS),
                    now,
                );
                self.persist_dirty = true;
                self.post_notice("Area Defined", "Map boundaries have been set and saved.", now);
                None
            }
            NavEvent::MapClick { point } => {
                let Some(selection) = &self.selection else {
                    return None;
                };
                if selection.contains(point) {
                    self.enter_map(viewport);
                    self.directions.append(point)
                } else {
                    self.enter_global(viewport);
                    None
                }
            }
            NavEvent::ViewportIdle => {
                if self.leash_armed() {
                    self.timers.schedule(
                        TimerPurpose::LeashIdle,
                        Duration::from_millis(LEASH_DEBOUNCE_MS),
                        now,
                    );
                }
                None
            }
            NavEvent::DragEnd => {
                if self.leash_armed() {
                    self.timers.schedule(
                        TimerPurpose::LeashDragEnd,
                        Duration::from_millis(LEASH_DEBOUNCE_MS),
                        now,
                    );
                }
                None
            }
            NavEvent::ResetView => {
                let Some(selection) = &self.selection else {
                    return None;
                };
                viewport.fit_bounds(selection.selected(), FIT_PADDING_PX);
                self.heading = 0.0;
                viewport.set_heading(0.0);
                self.tilt = TILT_AERIAL_DEG;
                viewport.set_tilt(self.tilt);
                self.enter_map(viewport);
                None
            }
            NavEvent::ResetBounds => {
                tracing::info!("Resetting bounds: back to Global mode, no restrictions");
                self.selection = None;
                self.leash = None;
                self.directions.clear();
                self.timers.cancel_all();
                self.mode = NavMode::Global;
                self.mask_visible = false;
                self.heading = 0.0;
                self.tilt = 0.0;
                viewport.set_heading(0.0);
                viewport.set_tilt(0.0);
                viewport.set_zoom_limits(None);
                viewport.pan_to(DEFAULT_CENTER);
                viewport.set_zoom(DEFAULT_ZOOM);
                self.persist_dirty = true;
                self.post_notice("Boundaries Reset", "Map is now unrestricted.", now);
                None
            }
            NavEvent::UndoWaypoint => self.directions.undo(),
            NavEvent::ClearRoute => {
                self.directions.clear();
                None
            }
            NavEvent::RotatePress { pointer, view_center } => {
                self.rotation.press(pointer, view_center, self.heading);
                None
            }
            NavEvent::RotateMove { pointer } => {
                if let Some(heading) = self.rotation.movement(pointer) {
                    self.heading = heading;
                    viewport.set_heading(heading);
                    // The surface may have reset tilt during the gesture
                    if self.selection.is_some() && (viewport.tilt() - TILT_AERIAL_DEG).abs() > 1e-9 {
                        viewport.set_tilt(TILT_AERIAL_DEG);
                    }
                }
                None
            }
            NavEvent::RotateRelease => {
                if self.rotation.release() {
                    self.persist_dirty = true;
                }
                None
            }
            NavEvent::LocationWatch { active } => {
                self.location = if active { LocationState::Watching } else { LocationState::Off };
                None
            }
            NavEvent::LocationUpdate(fix) => {
                self.location = LocationState::Fix(fix);
                None
            }
            NavEvent::LocationFailed(err) => {
                self.location = LocationState::Failed(err);
                self.post_notice("Location Error", &err.to_string(), now);
                None
            }
            NavEvent::DismissNotice => {
                self.notice = None;
                self.timers.cancel(TimerPurpose::MaskAutoClear);
                None
            }
        }
    }

    /// Dispatch every timer whose deadline passed. Called once per frame.
    pub fn tick(&mut self, viewport: &mut dyn ViewportSurface, now: Instant) {
        for purpose in self.timers.take_due(now) {
            match purpose {
                TimerPurpose::LeashIdle | TimerPurpose::LeashDragEnd => {
                    if self.mode == NavMode::Map {
                        if let Some(leash) = self.leash.as_mut() {
                            leash.enforce(viewport);
                        }
                    }
                }
                TimerPurpose::MaskAutoClear => self.notice = None,
                TimerPurpose::ModeTransition => self.enter_map(viewport),
            }
        }
    }

    /// Apply a routing completion; a failure clears the route and surfaces an
    /// advisory, stale generations are discarded inside the builder.
    pub fn apply_route_outcome(
        &mut self,
        generation: u64,
        outcome: Result<RouteResult, RouteError>,
        now: Instant,
    ) {
        if let Some(err) = self.directions.apply_outcome(generation, outcome) {
            tracing::warn!("Route request failed: {err}");
            self.post_notice("Route Error", &err.to_string(), now);
        }
    }

    /// Write the persisted view through when something changed since the last
    /// flush. Cheap no-op otherwise; safe to call every frame and on save.
    pub fn flush_persistence(&mut self, store: &mut dyn KeyValueStore) {
        if !self.persist_dirty {
            return;
        }
        self.persist_dirty = false;
        let view = self.persisted_view();
        if view == PersistedView::default() {
            persist::clear_view(store);
        } else {
            persist::save_view(store, &view);
        }
    }

    pub fn persisted_view(&self) -> PersistedView {
        PersistedView {
            selected_area: self.selection.as_ref().map(|s| s.selected()),
            viewable_bounds: self.selection.as_ref().map(|s| s.viewable()),
            mode: self.mode,
            heading: self.heading,
        }
    }

    pub fn snapshot(&self) -> NavSnapshot {
        NavSnapshot {
            mode: self.mode,
            heading: self.heading,
            tilt: self.tilt,
            rotation_capable: self.rotation_capable,
            context_menu_suppressed: self.rotation.context_menu_suppressed(),
            selected_area: self.selection.as_ref().map(|s| s.selected()),
            viewable_bounds: self.selection.as_ref().map(|s| s.viewable()),
            context_frame: self.selection.as_ref().map(|s| s.frame()),
            mask: if self.mask_visible {
                self.selection.as_ref().map(|s| s.mask())
            } else {
                None
            },
            leash: self.leash.as_ref().map(|leash| LeashSnapshot {
                armed: leash.armed(),
                anchor: leash.anchor(),
                radius_m: leash.radius_m(),
                corrections: leash.corrections(),
                last_distance_m: leash.last_distance_m(),
            }),
            directions: DirectionsSnapshot {
                waypoints: self.directions.waypoints().to_vec(),
                route: self.directions.route().cloned(),
                total_meters: self.directions.total_meters(),
                distance_display: self.directions.distance_display(),
                pending: self.directions.pending(),
            },
            location: self.location,
            notice: self.notice.clone(),
        }
    }

    pub fn mode(&self) -> NavMode {
        self.mode
    }

    pub fn has_selection(&self) -> bool {
        self.selection.is_some()
    }

    /// Whether any deadline is pending; the shell keeps repainting while so
    pub fn has_pending_timers(&self) -> bool {
        self.timers.pending_count() > 0
    }

    fn leash_armed(&self) -> bool {
        self.mode == NavMode::Map && self.leash.as_ref().is_some_and(|l| l.armed())
    }

    fn enter_map(&mut self, viewport: &mut dyn ViewportSurface) {
        self.timers.cancel(TimerPurpose::ModeTransition);
        if self.mode != NavMode::Map {
            tracing::info!("Entering Map mode");
        }
        self.mode = NavMode::Map;
        self.mask_visible = true;
        if let Some(leash) = self.leash.as_mut() {
            leash.arm();
        }
        viewport.set_zoom_limits(Some(MAP_MODE_ZOOM_LIMITS));
        if self.selection.is_some() {
            self.tilt = TILT_AERIAL_DEG;
            if (viewport.tilt() - TILT_AERIAL_DEG).abs() > 1e-9 {
                viewport.set_tilt(TILT_AERIAL_DEG);
            }
        }
        self.persist_dirty = true;
    }

    fn enter_global(&mut self, viewport: &mut dyn ViewportSurface) {
        if self.mode != NavMode::Global {
            tracing::info!("Entering Global mode");
        }
        self.mode = NavMode::Global;
        self.mask_visible = false;
        if let Some(leash) = self.leash.as_mut() {
            leash.disarm();
        }
        self.timers.cancel(TimerPurpose::LeashIdle);
        self.timers.cancel(TimerPurpose::LeashDragEnd);
        viewport.set_zoom_limits(None);
        self.persist_dirty = true;
    }

    fn post_notice(&mut self, title: &str, detail: &str, now: Instant) {
        self.notice = Some(Notice { title: title.to_string(), detail: detail.to_string() });
        self.timers.schedule(
            TimerPurpose::MaskAutoClear,
            Duration::from_millis(NOTICE_AUTO_CLEAR_MS),
            now,
        );
    }
}
