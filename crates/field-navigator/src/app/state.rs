//! App-side UI state: init phases, tile providers, panel toggles

/// Startup phases. The map renders only once the tile credential resolved.
pub enum InitPhase {
    /// Credential resolution in flight
    Resolving,
    /// Tiles created, map running
    Ready,
    /// Terminal configuration error; nothing else renders
    Failed(String),
}

/// Available map tile providers
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TilesProvider {
    OpenStreetMap,
    /// Keyed satellite imagery (needs the resolved credential)
    Aerial,
}

impl TilesProvider {
    pub fn all() -> &'static [Self] {
        &[Self::OpenStreetMap, Self::Aerial]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::OpenStreetMap => "OpenStreetMap",
            Self::Aerial => "Aerial",
        }
    }

    pub fn attribution(&self) -> &'static str {
        match self {
            Self::OpenStreetMap => "© OpenStreetMap contributors",
            Self::Aerial => "© MapTiler © OpenStreetMap contributors",
        }
    }
}

/// UI settings adjustable at runtime
pub struct UiSettings {
    /// Whether the control panel is open
    pub panel_open: bool,

    /// Diagnostics HUD visibility
    pub show_hud: bool,

    /// Map tiles provider
    pub tiles_provider: TilesProvider,

    /// Whether the location watch is running
    pub location_on: bool,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            panel_open: true,
            show_hud: false,
            tiles_provider: TilesProvider::OpenStreetMap,
            location_on: false,
        }
    }
}

/// One frame's worth of control-panel interactions, applied by the frame loop
#[derive(Default)]
pub struct PanelActions {
    pub arm_draw: bool,
    pub reset_view: bool,
    pub reset_bounds: bool,
    pub undo_waypoint: bool,
    pub clear_route: bool,
    /// Some(true) to start the location watch, Some(false) to stop it
    pub toggle_location: Option<bool>,
    pub zoom_delta: f64,
}
