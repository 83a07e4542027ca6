use eframe::egui;

use crate::state::AppState;
use crate::types::StateColors;
use crate::ui::{UiAction, list};

use egui::{Color32, Vec2};

/// Render the left sidebar with apps list and refresh button.
pub fn show(ctx: &egui::Context, state: &AppState, actions: &mut Vec<UiAction>) {
    egui::SidePanel::left("sidebar")
        .resizable(false)
        .exact_width(320.0)
        .show(ctx, |ui| {
            ui.add_space(4.0);
            // Header row: Applications label on left, Refresh button on right
            let loading = state.is_loading();
            ui.horizontal(|ui| {
                ui.set_height(32.0);
                ui.label(egui::RichText::new("APPLICATIONS").strong().size(16.0));

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.add_enabled(!loading, egui::Button::new("Refresh")).clicked() {
                        actions.push(UiAction::Refresh);
                    }
                    if loading {
                        ui.spinner();
                    }
                });
            });
            ui.separator();

            if loading && state.apps().is_empty() {
                ui.centered_and_justified(|ui| {
                    ui.label("Loading installed apps…");
                });
                return;
            }
            if let Some(err) = state.load_error() {
                ui.colored_label(Color32::from_rgb(200, 70, 70), format!("⚠ Load failed: {}", err));
                ui.label("Check the device connection and press Refresh.");
                return;
            }

            egui::ScrollArea::vertical().show(ui, |ui| {
                let selected_id = state.selected();
                for app in state.apps() {
                    let full_width = ui.available_width();
                    let resp = list::list_item(
                        ui,
                        app,
                        Vec2::new(full_width, 44.0),
                        selected_id == Some(app.package_id.as_str()),
                        StateColors {
                            default: Color32::from_rgb(247, 248, 250),
                            hover: Color32::WHITE,
                            selected: Some(Color32::from_rgb(200, 230, 201)),
                        },
                    );
                    if resp.clicked() {
                        actions.push(UiAction::Select(app.package_id.clone()));
                    }
                }
            });
        });
}
