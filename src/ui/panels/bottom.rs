use crate::state::AppState;
use crate::style::MUTED_TEXT;
use eframe::egui;

/// Render the bottom status bar: app count and the latest transient message.
pub fn show(ctx: &egui::Context, state: &AppState) {
    egui::TopBottomPanel::bottom("bottom_status")
        .resizable(false)
        .show(ctx, |ui| {
            let mut status = format!("Applications: {}", state.apps().len());
            if state.is_loading() {
                status.push_str("  •  loading…");
            }
            if state.is_sharing() {
                status.push_str("  •  sharing…");
            }
            if let Some(toast) = state.latest_toast() {
                status.push_str("  •  ");
                status.push_str(&toast.text);
            }

            ui.horizontal(|ui| {
                ui.set_height(28.0);
                ui.centered_and_justified(|ui| {
                    ui.label(egui::RichText::new(status).color(MUTED_TEXT).monospace());
                });
            });
        });
}
