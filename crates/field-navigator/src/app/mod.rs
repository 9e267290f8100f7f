//! Application module
//!
//! The frame loop wires the navigation engine to the walkers map:
//! - control-panel interactions and map gestures become `NavEvent`s
//! - due timers are dispatched through `engine.tick`
//! - route and credential completions arrive from tokio tasks via shared
//!   queues and are drained here
//! - the engine's snapshot drives every overlay and panel

mod draw;
mod keys;
mod location;
mod plugin;
mod routing;
pub(crate) mod settings;
mod state;
mod storage;
mod ui_panels;
mod viewport;

use crate::app::draw::{DrawState, DrawToolPlugin};
use crate::app::keys::KeySlot;
use crate::app::location::SimulatedLocation;
use crate::app::plugin::{FrameInput, GestureProbe, NavOverlayPlugin};
use crate::app::routing::{OsrmClient, RouteOutcomes};
use crate::app::settings::Settings;
use crate::app::state::{InitPhase, PanelActions, TilesProvider, UiSettings};
use crate::app::storage::{EframeStore, FileStore, ViewStore};
use crate::app::viewport::{MapViewport, to_position};
use eframe::egui;
use field_nav_core::{
    DEFAULT_CENTER, LatLng, LocationStream, NavEngine, NavEvent, ViewportSurface,
    haversine_distance_m,
};
use instant::Instant;
use std::sync::Arc;
use walkers::{
    HttpTiles, Map, TileId,
    sources::{Attribution, OpenStreetMap, TileSource},
};

/// Keyed satellite imagery source
pub struct AerialTiles {
    key: String,
}

impl TileSource for AerialTiles {
    fn tile_url(&self, tile_id: TileId) -> String {
        format!(
            "https://api.maptiler.com/maps/satellite/{}/{}/{}.jpg?key={}",
            tile_id.zoom, tile_id.x, tile_id.y, self.key
        )
    }

    fn attribution(&self) -> Attribution {
        Attribution {
            text: "© MapTiler © OpenStreetMap contributors",
            url: "https://www.maptiler.com/",
            logo_light: None,
            logo_dark: None,
        }
    }

    fn max_zoom(&self) -> u8 {
        19
    }
}

struct TileSet {
    osm: HttpTiles,
    aerial: HttpTiles,
}

/// How far the center may jitter between frames and still count as settled
const IDLE_EPSILON_M: f64 = 0.5;

/// Main application structure
pub struct FieldNavigatorApp {
    engine: NavEngine,
    viewport: MapViewport,
    store: ViewStore,
    ui_settings: UiSettings,

    phase: InitPhase,
    key_slot: KeySlot,
    /// Created once the credential resolves
    tiles: Option<TileSet>,

    routing: Arc<OsrmClient>,
    route_outcomes: RouteOutcomes,
    runtime: tokio::runtime::Handle,

    draw_state: Arc<std::sync::RwLock<DrawState>>,
    frame_input: Arc<std::sync::RwLock<FrameInput>>,
    location: SimulatedLocation,

    /// Viewport-idle detection across frames
    prev_center: Option<LatLng>,
    center_moving: bool,
}

impl FieldNavigatorApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let settings = Settings::from_cli();

        let store = match &settings.state_file {
            Some(path) => match FileStore::open(path.clone()) {
                Ok(file_store) => ViewStore::File(file_store),
                Err(e) => {
                    tracing::warn!("State file unusable ({e}), falling back to app storage");
                    ViewStore::Eframe(EframeStore::from_creation(cc.storage))
                }
            },
            None => ViewStore::Eframe(EframeStore::from_creation(cc.storage)),
        };

        let mut engine = if settings.ignore_persisted {
            tracing::info!("Ignoring persisted state (--ignore-persisted flag)");
            NavEngine::new()
        } else {
            NavEngine::restore(store.reader())
        };

        let mut viewport = MapViewport::new();
        engine.apply_to_viewport(&mut viewport);

        let runtime = tokio::runtime::Handle::current();
        let key_slot: KeySlot = Arc::new(tokio::sync::RwLock::new(None));
        keys::spawn_resolution(
            &runtime,
            keys::http_client(),
            settings.clone(),
            key_slot.clone(),
            cc.egui_ctx.clone(),
        );

        Self {
            engine,
            viewport,
            store,
            ui_settings: UiSettings::default(),
            phase: InitPhase::Resolving,
            key_slot,
            tiles: None,
            routing: Arc::new(OsrmClient::new(settings.routing_url.clone())),
            route_outcomes: Arc::new(tokio::sync::RwLock::new(Vec::new())),
            runtime,
            draw_state: Arc::new(std::sync::RwLock::new(DrawState::default())),
            frame_input: Arc::new(std::sync::RwLock::new(FrameInput::default())),
            location: SimulatedLocation::new(settings.simulate_location_failure),
            prev_center: None,
            center_moving: false,
        }
    }

    /// Advance the init phases. Returns true once the map can render.
    fn poll_init(&mut self, ctx: &egui::Context) -> bool {
        if matches!(self.phase, InitPhase::Ready) {
            return true;
        }
        if let InitPhase::Failed(message) = &self.phase {
            ui_panels::error_panel(ctx, message);
            return false;
        }

        let resolved = self
            .key_slot
            .try_write()
            .ok()
            .and_then(|mut slot| slot.take());
        match resolved {
            Some(Ok(key)) => {
                tracing::info!("Map credential resolved, creating tile sources");
                self.tiles = Some(TileSet {
                    osm: HttpTiles::new(OpenStreetMap, ctx.clone()),
                    aerial: HttpTiles::new(AerialTiles { key }, ctx.clone()),
                });
                self.phase = InitPhase::Ready;
                true
            }
            Some(Err(e)) => {
                let message = e.to_string();
                ui_panels::error_panel(ctx, &message);
                self.phase = InitPhase::Failed(message);
                false
            }
            None => {
                ui_panels::loading_panel(ctx);
                ctx.request_repaint_after(std::time::Duration::from_millis(100));
                false
            }
        }
    }

    /// Feed one event through the engine, dispatching any route request it
    /// produces to the routing task.
    fn dispatch(&mut self, event: NavEvent, ctx: &egui::Context, now: Instant) {
        if let Some(request) = self.engine.handle_event(event, &mut self.viewport, now) {
            routing::spawn_route(
                &self.runtime,
                self.routing.clone(),
                request,
                self.route_outcomes.clone(),
                ctx.clone(),
            );
        }
    }

    fn apply_panel_actions(&mut self, actions: &PanelActions, ctx: &egui::Context, now: Instant) {
        if actions.arm_draw {
            if let Ok(mut draw) = self.draw_state.write() {
                draw.arm();
            }
            self.dispatch(NavEvent::DrawArmed, ctx, now);
        }
        if actions.reset_view {
            self.dispatch(NavEvent::ResetView, ctx, now);
        }
        if actions.reset_bounds {
            self.dispatch(NavEvent::ResetBounds, ctx, now);
        }
        if actions.undo_waypoint {
            self.dispatch(NavEvent::UndoWaypoint, ctx, now);
        }
        if actions.clear_route {
            self.dispatch(NavEvent::ClearRoute, ctx, now);
        }
        if let Some(active) = actions.toggle_location {
            self.ui_settings.location_on = active;
            if active {
                self.location.start();
            } else {
                self.location.stop();
            }
            self.dispatch(NavEvent::LocationWatch { active }, ctx, now);
        }
        if actions.zoom_delta != 0.0 {
            let zoom = self.viewport.zoom() + actions.zoom_delta;
            self.viewport.set_zoom(zoom);
        }
    }

    /// Synthesize `ViewportIdle` on the moving-to-settled transition
    fn detect_idle(&mut self, center: LatLng, ctx: &egui::Context, now: Instant) {
        let moved = self
            .prev_center
            .is_some_and(|prev| haversine_distance_m(prev, center) > IDLE_EPSILON_M);
        if moved {
            self.center_moving = true;
        } else if self.center_moving {
            self.center_moving = false;
            self.dispatch(NavEvent::ViewportIdle, ctx, now);
        }
        self.prev_center = Some(center);
    }
}

#[profiling::all_functions]
impl eframe::App for FieldNavigatorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if !self.poll_init(ctx) {
            return;
        }

        let now = Instant::now();
        let snapshot = self.engine.snapshot();

        let mut actions = PanelActions::default();
        ui_panels::control_panel(ctx, &mut self.ui_settings, &snapshot, &mut actions);
        self.apply_panel_actions(&actions, ctx, now);

        // Capture values the map closure needs
        let draw_active = self
            .draw_state
            .read()
            .map(|d| d.is_armed())
            .unwrap_or(false);
        let menu_suppressed = snapshot.context_menu_suppressed;
        let has_selection = snapshot.selected_area.is_some();
        let has_waypoints = !snapshot.directions.waypoints.is_empty();
        let mut menu_actions = PanelActions::default();
        let provider = self.ui_settings.tiles_provider;
        let attribution_text = provider.attribution();
        let overlay = NavOverlayPlugin::from_snapshot(&snapshot);
        let draw_plugin = DrawToolPlugin::new(self.draw_state.clone());
        let probe = GestureProbe::new(self.frame_input.clone(), draw_active);

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                profiling::scope!("map_panel");

                let Some(tile_set) = self.tiles.as_mut() else {
                    return;
                };
                let tiles: &mut HttpTiles = match provider {
                    TilesProvider::OpenStreetMap => &mut tile_set.osm,
                    TilesProvider::Aerial => &mut tile_set.aerial,
                };

                let map = Map::new(
                    Some(tiles),
                    self.viewport.memory_mut(),
                    to_position(DEFAULT_CENTER),
                )
                .with_plugin(overlay)
                .with_plugin(draw_plugin)
                .with_plugin(probe);

                let map_response = ui.add(map);

                // A secondary-button drag rotates; while that gesture is live
                // the release must not pop the menu
                if !menu_suppressed {
                    map_response.context_menu(|ui| {
                        if ui
                            .add_enabled(has_selection, egui::Button::new("Reset view"))
                            .clicked()
                        {
                            menu_actions.reset_view = true;
                            ui.close();
                        }
                        if ui
                            .add_enabled(has_waypoints, egui::Button::new("Clear route"))
                            .clicked()
                        {
                            menu_actions.clear_route = true;
                            ui.close();
                        }
                    });
                }

                ui_panels::panel_toggle_button(ui, &mut self.ui_settings);

                let painter = ui.painter();
                let screen_rect = ui.max_rect();
                painter.text(
                    screen_rect.center_bottom() + egui::vec2(0.0, -5.0),
                    egui::Align2::CENTER_BOTTOM,
                    attribution_text,
                    egui::FontId::proportional(10.0),
                    egui::Color32::from_black_alpha(180),
                );
            });

        self.apply_panel_actions(&menu_actions, ctx, now);

        if ui_panels::advisory_banner(ctx, &snapshot) {
            self.dispatch(NavEvent::DismissNotice, ctx, now);
        }
        if self.ui_settings.show_hud {
            ui_panels::hud_overlay(ctx, &snapshot);
        }

        // A completed draw gesture becomes the new working area
        let completed = self
            .draw_state
            .write()
            .ok()
            .and_then(|mut draw| draw.take_completed());
        if let Some(bounds) = completed {
            self.dispatch(NavEvent::RectangleDrawn { bounds }, ctx, now);
        }

        // Map gestures captured by the probe this frame
        let input = self
            .frame_input
            .read()
            .map(|g| g.clone())
            .unwrap_or_default();
        if let Some((pointer, view_center)) = input.rotate_press {
            self.dispatch(NavEvent::RotatePress { pointer, view_center }, ctx, now);
        }
        if let Some(pointer) = input.rotate_move {
            self.dispatch(NavEvent::RotateMove { pointer }, ctx, now);
        }
        if input.rotate_released {
            self.dispatch(NavEvent::RotateRelease, ctx, now);
        }
        if let Some(point) = input.click {
            self.dispatch(NavEvent::MapClick { point }, ctx, now);
        }
        if input.primary_drag_ended {
            self.dispatch(NavEvent::DragEnd, ctx, now);
        }
        if let Some(center) = input.center {
            self.detect_idle(center, ctx, now);
        }

        // Due timers (leash checks, mode transition, notice auto-clear)
        self.engine.tick(&mut self.viewport, now);

        // Route completions from tokio tasks
        let outcomes: Vec<_> = self
            .route_outcomes
            .try_write()
            .map(|mut queue| queue.drain(..).collect())
            .unwrap_or_default();
        for (generation, result) in outcomes {
            self.engine.apply_route_outcome(generation, result, now);
        }

        // Location stream
        while let Some(update) = self.location.poll() {
            match update {
                Ok(fix) => self.dispatch(NavEvent::LocationUpdate(fix), ctx, now),
                Err(e) => {
                    self.ui_settings.location_on = false;
                    self.dispatch(NavEvent::LocationFailed(e), ctx, now);
                }
            }
        }

        self.engine.flush_persistence(self.store.writer());

        // Keep frames coming while deadlines or the watch are pending
        if self.engine.has_pending_timers() || self.location.is_active() {
            ctx.request_repaint_after(std::time::Duration::from_millis(50));
        }
    }

    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        self.engine.flush_persistence(self.store.writer());
        if let ViewStore::Eframe(mirror) = &self.store {
            mirror.write_through(storage);
            tracing::debug!("Saved view on exit");
        }
    }
}
