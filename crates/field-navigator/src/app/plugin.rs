//! Walkers plugins: navigation overlay rendering and gesture capture
//!
//! [`NavOverlayPlugin`] paints everything the engine snapshot describes: the
//! mask bands outside the context frame, the selection outline, labeled
//! waypoints, the route polyline, and the location fix. [`GestureProbe`]
//! records the pointer interactions that need the projector (clicks and
//! secondary-button rotation drags) into shared state the frame loop turns
//! into engine events.

use crate::app::viewport::{from_position, to_position};
use egui::{Color32, PointerButton, Pos2, Stroke, StrokeKind};
use field_nav_core::{
    GeoBounds, LatLng, LocationFix, NavSnapshot, ScreenPoint, Waypoint, haversine_distance_m,
};
use std::sync::{Arc, RwLock};
use walkers::{Plugin, Projector};

const MASK_COLOR: Color32 = Color32::from_black_alpha(140);
const SELECTION_COLOR: Color32 = Color32::from_rgb(70, 130, 220);
const ROUTE_COLOR: Color32 = Color32::from_rgb(30, 100, 200);
const WAYPOINT_RADIUS: f32 = 10.0;
const LOCATION_COLOR: Color32 = Color32::from_rgb(60, 120, 255);

pub struct NavOverlayPlugin {
    mask: Option<[GeoBounds; 4]>,
    selected: Option<GeoBounds>,
    waypoints: Vec<Waypoint>,
    route_path: Vec<LatLng>,
    location: Option<LocationFix>,
}

impl NavOverlayPlugin {
    pub fn from_snapshot(snapshot: &NavSnapshot) -> Self {
        Self {
            mask: snapshot.mask,
            selected: snapshot.selected_area,
            waypoints: snapshot.directions.waypoints.clone(),
            route_path: snapshot
                .directions
                .route
                .as_ref()
                .map(|r| r.path.clone())
                .unwrap_or_default(),
            location: snapshot.location.fix(),
        }
    }
}

fn project_point(projector: &Projector, point: LatLng) -> Pos2 {
    let v = projector.project(to_position(point));
    Pos2::new(v.x, v.y)
}

fn project_bounds(projector: &Projector, bounds: GeoBounds) -> egui::Rect {
    let nw = project_point(projector, LatLng::new(bounds.north, bounds.west));
    let se = project_point(projector, LatLng::new(bounds.south, bounds.east));
    egui::Rect::from_two_pos(nw, se)
}

/// Screen pixels per meter at a position, measured by projecting a short
/// northward baseline.
fn pixels_per_meter(projector: &Projector, at: LatLng) -> f32 {
    let probe = LatLng::new(at.lat + 0.001, at.lng);
    let meters = haversine_distance_m(at, probe);
    if meters <= 0.0 {
        return 0.0;
    }
    let a = project_point(projector, at);
    let b = project_point(projector, probe);
    a.distance(b) / meters as f32
}

impl Plugin for NavOverlayPlugin {
    fn run(
        self: Box<Self>,
        ui: &mut egui::Ui,
        _response: &egui::Response,
        projector: &Projector,
        _map_memory: &walkers::MapMemory,
    ) {
        profiling::scope!("NavOverlayPlugin::run");

        let painter = ui.painter();

        if let Some(mask) = &self.mask {
            for band in mask {
                painter.rect_filled(project_bounds(projector, *band), 0.0, MASK_COLOR);
            }
        }

        if let Some(selected) = self.selected {
            painter.rect_stroke(
                project_bounds(projector, selected),
                0.0,
                Stroke::new(2.0, SELECTION_COLOR),
                StrokeKind::Middle,
            );
        }

        if self.route_path.len() >= 2 {
            let screen_points: Vec<Pos2> = self
                .route_path
                .iter()
                .map(|p| project_point(projector, *p))
                .collect();
            painter.add(egui::Shape::line(screen_points, Stroke::new(3.0, ROUTE_COLOR)));
        }

        for waypoint in &self.waypoints {
            let center = project_point(projector, waypoint.point);
            painter.circle_filled(center, WAYPOINT_RADIUS, SELECTION_COLOR);
            painter.text(
                center,
                egui::Align2::CENTER_CENTER,
                &waypoint.label,
                egui::FontId::proportional(12.0),
                Color32::WHITE,
            );
        }

        if let Some(fix) = self.location {
            let point = LatLng::new(fix.lat, fix.lng);
            let center = project_point(projector, point);
            let accuracy_px = fix.accuracy_m as f32 * pixels_per_meter(projector, point);
            if accuracy_px > 1.0 {
                painter.circle_filled(center, accuracy_px, LOCATION_COLOR.gamma_multiply(0.15));
                painter.circle_stroke(center, accuracy_px, Stroke::new(1.0, LOCATION_COLOR));
            }
            painter.circle_filled(center, 5.0, LOCATION_COLOR);
            painter.circle_stroke(center, 5.0, Stroke::new(1.5, Color32::WHITE));
        }
    }
}

/// Pointer interactions captured during one frame of the map widget
#[derive(Default, Clone)]
pub struct FrameInput {
    /// Current viewport center, unprojected
    pub center: Option<LatLng>,
    /// Primary click (not a drag) at an unprojected position
    pub click: Option<LatLng>,
    pub primary_drag_ended: bool,
    /// Secondary press: pointer position and view center in screen space
    pub rotate_press: Option<(ScreenPoint, ScreenPoint)>,
    pub rotate_move: Option<ScreenPoint>,
    pub rotate_released: bool,
}

pub struct GestureProbe {
    input: Arc<RwLock<FrameInput>>,
    /// While the draw tool owns the primary button, clicks and drags
    /// must not leak through as navigation gestures
    draw_active: bool,
}

impl GestureProbe {
    pub fn new(input: Arc<RwLock<FrameInput>>, draw_active: bool) -> Self {
        Self { input, draw_active }
    }
}

fn screen_point(pos: Pos2) -> ScreenPoint {
    ScreenPoint::new(pos.x, pos.y)
}

impl Plugin for GestureProbe {
    fn run(
        self: Box<Self>,
        _ui: &mut egui::Ui,
        response: &egui::Response,
        projector: &Projector,
        _map_memory: &walkers::MapMemory,
    ) {
        let mut captured = FrameInput::default();

        let rect = response.rect;
        captured.center = Some(from_position(
            projector.unproject(rect.center().to_vec2()),
        ));

        if !self.draw_active {
            if response.clicked() {
                if let Some(pos) = response.interact_pointer_pos() {
                    captured.click = Some(from_position(projector.unproject(pos.to_vec2())));
                }
            }
            captured.primary_drag_ended = response.drag_stopped_by(PointerButton::Primary);
        }

        if response.drag_started_by(PointerButton::Secondary) {
            if let Some(pos) = response.interact_pointer_pos() {
                captured.rotate_press = Some((screen_point(pos), screen_point(rect.center())));
            }
        }
        if response.dragged_by(PointerButton::Secondary) {
            if let Some(pos) = response.interact_pointer_pos() {
                captured.rotate_move = Some(screen_point(pos));
            }
        }
        captured.rotate_released = response.drag_stopped_by(PointerButton::Secondary);

        if let Ok(mut input) = self.input.write() {
            *input = captured;
        }
    }
}
