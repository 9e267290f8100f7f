//! Rectangle draw tool
//!
//! Armed from the control panel; while armed, a primary-button drag rubber-
//! bands a rectangle over the map. Releasing completes the gesture: the drawn
//! corners become a `GeoBounds` the frame loop forwards to the engine. State
//! is shared with the plugin through an `Arc<RwLock>` because walkers plugins
//! are consumed by value each frame.

use crate::app::viewport::from_position;
use egui::{Color32, PointerButton, Stroke, StrokeKind};
use field_nav_core::{GeoBounds, LatLng};
use std::sync::{Arc, RwLock};
use walkers::{Plugin, Projector};

const DRAW_STROKE_WIDTH: f32 = 2.0;
const DRAW_COLOR: Color32 = Color32::from_rgb(255, 0, 0);
/// 15% opacity fill while dragging
const DRAW_FILL_ALPHA: u8 = 38;

#[derive(Default)]
pub struct DrawState {
    armed: bool,
    anchor: Option<LatLng>,
    cursor: Option<LatLng>,
    completed: Option<GeoBounds>,
}

impl DrawState {
    pub fn arm(&mut self) {
        self.armed = true;
        self.anchor = None;
        self.cursor = None;
    }

    pub fn disarm(&mut self) {
        self.armed = false;
        self.anchor = None;
        self.cursor = None;
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn take_completed(&mut self) -> Option<GeoBounds> {
        self.completed.take()
    }
}

pub struct DrawToolPlugin {
    state: Arc<RwLock<DrawState>>,
}

impl DrawToolPlugin {
    pub fn new(state: Arc<RwLock<DrawState>>) -> Self {
        Self { state }
    }
}

fn bounds_from_corners(a: LatLng, b: LatLng) -> GeoBounds {
    GeoBounds::new(
        a.lat.max(b.lat),
        a.lat.min(b.lat),
        a.lng.max(b.lng),
        a.lng.min(b.lng),
    )
}

impl Plugin for DrawToolPlugin {
    fn run(
        self: Box<Self>,
        ui: &mut egui::Ui,
        response: &egui::Response,
        projector: &Projector,
        _map_memory: &walkers::MapMemory,
    ) {
        let Ok(mut state) = self.state.write() else {
            return;
        };
        if !state.armed {
            return;
        }

        if response.drag_started_by(PointerButton::Primary) {
            if let Some(pos) = response.interact_pointer_pos() {
                state.anchor = Some(from_position(projector.unproject(pos.to_vec2())));
            }
        }

        if state.anchor.is_some() && response.dragged_by(PointerButton::Primary) {
            if let Some(pos) = response.interact_pointer_pos() {
                state.cursor = Some(from_position(projector.unproject(pos.to_vec2())));
            }
        }

        // Rubber band
        if let (Some(anchor), Some(cursor)) = (state.anchor, state.cursor) {
            let a = projector.project(crate::app::viewport::to_position(anchor));
            let b = projector.project(crate::app::viewport::to_position(cursor));
            let rect = egui::Rect::from_two_pos(
                egui::Pos2::new(a.x, a.y),
                egui::Pos2::new(b.x, b.y),
            );
            let painter = ui.painter();
            painter.rect_filled(
                rect,
                0.0,
                Color32::from_rgba_unmultiplied(
                    DRAW_COLOR.r(),
                    DRAW_COLOR.g(),
                    DRAW_COLOR.b(),
                    DRAW_FILL_ALPHA,
                ),
            );
            painter.rect_stroke(
                rect,
                0.0,
                Stroke::new(DRAW_STROKE_WIDTH, DRAW_COLOR),
                StrokeKind::Middle,
            );
        }

        if response.drag_stopped_by(PointerButton::Primary) {
            if let (Some(anchor), Some(cursor)) = (state.anchor, state.cursor) {
                let bounds = bounds_from_corners(anchor, cursor);
                tracing::info!("Draw gesture completed: {:?}", bounds);
                state.completed = Some(bounds);
            }
            state.disarm();
        }
    }
}
