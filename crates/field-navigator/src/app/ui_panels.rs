//! UI panels: control panel, diagnostics HUD, advisory banner, init screens

use crate::app::state::{PanelActions, TilesProvider, UiSettings};
use egui::{Color32, RichText, Ui};
use field_nav_core::{NavMode, NavSnapshot};

/// Full-window spinner while the tile credential resolves
pub fn loading_panel(ctx: &egui::Context) {
    egui::CentralPanel::default().show(ctx, |ui| {
        ui.centered_and_justified(|ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(ui.available_height() * 0.4);
                ui.spinner();
                ui.label(RichText::new("Loading field map…").heading());
            });
        });
    });
}

/// Blocking error screen; nothing else renders behind it
pub fn error_panel(ctx: &egui::Context, message: &str) {
    egui::CentralPanel::default().show(ctx, |ui| {
        ui.vertical_centered(|ui| {
            ui.add_space(ui.available_height() * 0.4);
            ui.label(
                RichText::new("Map load error")
                    .heading()
                    .color(Color32::RED),
            );
            ui.add_space(8.0);
            ui.label(message);
        });
    });
}

/// The collapsible control panel on the right
pub fn control_panel(
    ctx: &egui::Context,
    ui_settings: &mut UiSettings,
    snapshot: &NavSnapshot,
    actions: &mut PanelActions,
) {
    if !ui_settings.panel_open {
        return;
    }

    egui::SidePanel::right("control_panel")
        .default_width(260.0)
        .min_width(220.0)
        .resizable(true)
        .show(ctx, |ui| {
            ui.heading("Field Navigator");
            ui.separator();

            render_area_section(ui, snapshot, actions);
            ui.add_space(8.0);
            ui.separator();

            render_directions_section(ui, snapshot, actions);
            ui.add_space(8.0);
            ui.separator();

            render_view_section(ui, ui_settings, snapshot, actions);
        });
}

fn render_area_section(ui: &mut Ui, snapshot: &NavSnapshot, actions: &mut PanelActions) {
    ui.label(RichText::new("Working area").strong());
    ui.add_space(4.0);

    let draw_label = if snapshot.selected_area.is_some() {
        "✏ Redefine Area"
    } else {
        "✏ Draw Area"
    };
    if ui.button(draw_label).clicked() {
        actions.arm_draw = true;
    }

    ui.horizontal(|ui| {
        if ui
            .add_enabled(snapshot.selected_area.is_some(), egui::Button::new("🎯 Reset View"))
            .clicked()
        {
            actions.reset_view = true;
        }
        if ui
            .add_enabled(
                snapshot.selected_area.is_some(),
                egui::Button::new("🗑 Reset Boundaries"),
            )
            .clicked()
        {
            actions.reset_bounds = true;
        }
    });

    let mode_text = match snapshot.mode {
        NavMode::Global => "Global (unrestricted)",
        NavMode::Map => "Map (leashed to area)",
    };
    ui.label(format!("Mode: {mode_text}"));
}

fn render_directions_section(ui: &mut Ui, snapshot: &NavSnapshot, actions: &mut PanelActions) {
    ui.label(RichText::new("Walking directions").strong());
    ui.add_space(4.0);

    let has_waypoints = !snapshot.directions.waypoints.is_empty();
    ui.horizontal(|ui| {
        if ui
            .add_enabled(has_waypoints, egui::Button::new("↩ Undo Waypoint"))
            .clicked()
        {
            actions.undo_waypoint = true;
        }
        if ui
            .add_enabled(has_waypoints, egui::Button::new("🗑 Clear Route"))
            .clicked()
        {
            actions.clear_route = true;
        }
    });

    ui.label(format!("Waypoints: {}", snapshot.directions.waypoints.len()));
    if let Some(display) = &snapshot.directions.distance_display {
        ui.label(format!("Distance: {display}"));
    }
    if snapshot.directions.pending {
        ui.horizontal(|ui| {
            ui.spinner();
            ui.label("Routing…");
        });
    }
    if snapshot.mode == NavMode::Map && !has_waypoints {
        ui.label(
            RichText::new("Click inside the area to add waypoints")
                .small()
                .weak(),
        );
    }
}

fn render_view_section(
    ui: &mut Ui,
    ui_settings: &mut UiSettings,
    snapshot: &NavSnapshot,
    actions: &mut PanelActions,
) {
    ui.label(RichText::new("View").strong());
    ui.add_space(4.0);

    egui::ComboBox::from_label("Tiles")
        .selected_text(ui_settings.tiles_provider.name())
        .show_ui(ui, |ui| {
            for provider in TilesProvider::all() {
                ui.selectable_value(&mut ui_settings.tiles_provider, *provider, provider.name());
            }
        });

    ui.horizontal(|ui| {
        if ui.button("➕ Zoom in").clicked() {
            actions.zoom_delta = 1.0;
        }
        if ui.button("➖ Zoom out").clicked() {
            actions.zoom_delta = -1.0;
        }
    });

    // Heading readout; secondary-button drag on the map rotates
    ui.horizontal(|ui| {
        ui.label(format!("Heading: {:.0}°", snapshot.heading));
        if snapshot.selected_area.is_some() && snapshot.heading != 0.0 {
            if ui.button("⬆ North").on_hover_text("Recenter and face north").clicked() {
                actions.reset_view = true;
            }
        }
    });

    let location_label = if ui_settings.location_on {
        "📡 Stop locating"
    } else {
        "📡 Locate Me"
    };
    if ui.button(location_label).clicked() {
        actions.toggle_location = Some(!ui_settings.location_on);
    }

    ui.checkbox(&mut ui_settings.show_hud, "Diagnostics HUD");
}

/// Small overlay button that opens/closes the control panel
pub fn panel_toggle_button(ui: &mut Ui, ui_settings: &mut UiSettings) {
    let button_size = egui::vec2(40.0, 40.0);
    let margin = 10.0;

    let rect = ui.max_rect();
    let button_pos = rect.right_top() + egui::vec2(-button_size.x - margin, margin);
    let button_rect = egui::Rect::from_min_size(button_pos, button_size);

    let response = ui.allocate_rect(button_rect, egui::Sense::click());
    if response.clicked() {
        ui_settings.panel_open = !ui_settings.panel_open;
    }

    let bg_color = if response.hovered() {
        ui.visuals().widgets.hovered.bg_fill
    } else {
        ui.visuals().widgets.inactive.bg_fill
    };
    ui.painter().rect_filled(button_rect, 5.0, bg_color);

    let icon = if ui_settings.panel_open { "✕" } else { "☰" };
    ui.painter().text(
        button_rect.center(),
        egui::Align2::CENTER_CENTER,
        icon,
        egui::FontId::proportional(20.0),
        ui.visuals().text_color(),
    );
}

/// Diagnostics HUD: everything the snapshot exposes, in one grid
pub fn hud_overlay(ctx: &egui::Context, snapshot: &NavSnapshot) {
    egui::Window::new("Diagnostics")
        .anchor(egui::Align2::LEFT_TOP, egui::vec2(10.0, 10.0))
        .collapsible(true)
        .resizable(false)
        .show(ctx, |ui| {
            egui::Grid::new("hud_grid").num_columns(2).show(ui, |ui| {
                ui.label("Mode");
                ui.label(format!("{:?}", snapshot.mode));
                ui.end_row();

                ui.label("Heading / tilt");
                ui.label(format!("{:.1}° / {:.0}°", snapshot.heading, snapshot.tilt));
                ui.end_row();

                ui.label("Surface rotation");
                ui.label(if snapshot.rotation_capable { "yes" } else { "no" });
                ui.end_row();

                ui.label("Mask");
                ui.label(if snapshot.mask.is_some() { "visible" } else { "hidden" });
                ui.end_row();

                ui.label("Leash");
                match &snapshot.leash {
                    Some(leash) => {
                        ui.label(format!(
                            "{} · r {:.0} m · {} corrections",
                            if leash.armed { "armed" } else { "idle" },
                            leash.radius_m,
                            leash.corrections
                        ));
                    }
                    None => {
                        ui.label("none");
                    }
                }
                ui.end_row();

                ui.label("Waypoints");
                ui.label(format!("{}", snapshot.directions.waypoints.len()));
                ui.end_row();

                ui.label("Distance");
                ui.label(
                    snapshot
                        .directions
                        .distance_display
                        .as_deref()
                        .unwrap_or("—"),
                );
                ui.end_row();

                ui.label("Location");
                ui.label(format!("{:?}", snapshot.location));
                ui.end_row();

                ui.label("Notice");
                ui.label(
                    snapshot
                        .notice
                        .as_ref()
                        .map(|n| n.title.as_str())
                        .unwrap_or("—"),
                );
                ui.end_row();
            });
        });
}

/// Transient advisory at the top of the map. Returns true when dismissed.
pub fn advisory_banner(ctx: &egui::Context, snapshot: &NavSnapshot) -> bool {
    let Some(notice) = &snapshot.notice else {
        return false;
    };

    let mut dismissed = false;
    egui::Window::new("advisory")
        .title_bar(false)
        .anchor(egui::Align2::CENTER_TOP, egui::vec2(0.0, 12.0))
        .resizable(false)
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.vertical(|ui| {
                    ui.label(RichText::new(&notice.title).strong());
                    ui.label(&notice.detail);
                });
                if ui.button("✕").clicked() {
                    dismissed = true;
                }
            });
        });
    dismissed
}
