use crate::state::{AppState, DetailView};
use crate::style::ACCENT;
use crate::types::AppDetail;
use crate::ui::UiAction;
use eframe::egui;

/// Render the central panel with the selected app's details and the share action.
pub fn show(ctx: &egui::Context, state: &AppState, actions: &mut Vec<UiAction>) {
    egui::CentralPanel::default().show(ctx, |ui| match state.detail() {
        DetailView::Empty => {
            ui.centered_and_justified(|ui| {
                ui.label("Select an application from the left to see details.");
            });
        }
        DetailView::Loading(package_id) => {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label(format!("Reading {}…", package_id));
            });
        }
        DetailView::Failed { message, .. } => {
            ui.horizontal(|ui| {
                ui.colored_label(egui::Color32::from_rgb(200, 70, 70), format!("⚠ {}", message));
                ui.with_layout(egui::Layout::right_to_left(egui::Align::TOP), |ui| {
                    if ui.button("Close").clicked() {
                        actions.push(UiAction::CloseDetail);
                    }
                });
            });
        }
        DetailView::Loaded(detail) => show_detail(ui, detail, state.is_sharing(), actions),
    });
}

fn show_detail(ui: &mut egui::Ui, detail: &AppDetail, sharing: bool, actions: &mut Vec<UiAction>) {
    let app = &detail.record;
    ui.horizontal(|ui| {
        ui.vertical(|ui| {
            ui.heading(egui::RichText::new(&app.label).strong().size(20.0));
            ui.label(app.package_id.as_str());
        });
        ui.with_layout(egui::Layout::right_to_left(egui::Align::TOP), |ui| {
            if ui.button("Close").clicked() {
                actions.push(UiAction::CloseDetail);
            }
            // Share button is replaced by a spinner while an export runs
            if sharing {
                ui.spinner();
            } else if ui
                .add(
                    egui::Button::new(egui::RichText::new("⤴ Share APK").color(egui::Color32::WHITE))
                        .fill(ACCENT),
                )
                .clicked()
            {
                actions.push(UiAction::Share);
            }
        });
    });

    ui.add_space(6.0);
    ui.separator();
    ui.add_space(6.0);

    egui::Grid::new("detail_grid")
        .num_columns(2)
        .spacing([24.0, 8.0])
        .striped(true)
        .show(ui, |ui| {
            let row = |ui: &mut egui::Ui, key: &str, value: String| {
                ui.label(egui::RichText::new(key).strong());
                ui.label(value);
                ui.end_row();
            };
            row(ui, "Label", app.label.clone());
            row(ui, "Package", app.package_id.clone());
            row(ui, "Version", format!("{} ({})", app.version_name, app.version_code));
            row(ui, "Size", format!("{} ({} bytes)", detail.size_display(), detail.size));
            row(ui, "Installer", detail.installer_path.display().to_string());
            row(ui, "Data dir", detail.data_dir.display().to_string());
            row(ui, "UID", detail.uid.to_string());
        });
}
