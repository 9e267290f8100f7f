//! Field Nav Core - Dual-Zone Map Navigation Engine
//!
//! This library implements the constraint engine behind the field navigator:
//! a map that runs unrestricted until the user draws a working area, then
//! switches between two regimes around that area. The engine is pure state
//! plus geometry; it renders nothing and performs no I/O beyond the storage
//! and viewport traits the shell hands it.
//!
//! # Architecture
//!
//! - **[`GeoBounds`] / [`AreaSelection`]**: the drawn rectangle and every
//!   rectangle derived from it (viewable bounds, context frame, mask bands)
//! - **[`NavEngine`]**: the mode state machine; consumes [`NavEvent`]s,
//!   drives a [`ViewportSurface`], exposes a read-only [`NavSnapshot`]
//! - **[`LeashController`]**: debounced snap-back to the area centroid
//! - **[`DirectionsBuilder`]**: waypoint path with generation-tagged
//!   asynchronous route outcomes
//! - **[`KeyValueStore`]**: persistence seam for the selected view

mod directions;
mod engine;
mod geolocate;
mod geometry;
mod handles;
mod leash;
mod persist;
mod rotation;
mod selection;
mod viewport;

pub use directions::{
    DirectionsBuilder, METERS_PER_MILE, RouteError, RouteRequest, RouteResult, Waypoint,
    format_distance_display, waypoint_label,
};
pub use engine::{
    DEFAULT_CENTER, DEFAULT_ZOOM, DirectionsSnapshot, FIT_PADDING_PX, LeashSnapshot,
    MAP_MODE_ZOOM_LIMITS, MODE_TRANSITION_SETTLE_MS, NOTICE_AUTO_CLEAR_MS, NavEngine, NavEvent,
    NavMode, NavSnapshot, Notice,
};
pub use geolocate::{LocationError, LocationFix, LocationState, LocationStream};
pub use geometry::{
    EARTH_RADIUS_M, FRAME_EXPAND_RATIO, GeoBounds, LEASH_RADIUS_FACTOR, LatLng, MAX_LATITUDE_DEG,
    MAX_LONGITUDE_DEG, VIEWABLE_EXPAND_RATIO, haversine_distance_m,
};
pub use leash::{LEASH_DEBOUNCE_MS, LeashController};
pub use persist::{
    KeyValueStore, MemoryStore, PersistedView, StoreError, StoreResult, VIEW_STORAGE_KEY,
};
pub use rotation::{RotationController, ScreenPoint, TILT_AERIAL_DEG, tilt_for_selection};
pub use selection::AreaSelection;
pub use viewport::ViewportSurface;
