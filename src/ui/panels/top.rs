use eframe::egui;

use crate::style::MUTED_TEXT;

/// Render the top header panel.
pub fn show(ctx: &egui::Context, device: Option<&str>) {
    egui::TopBottomPanel::top("top").show(ctx, |ui| {
        ui.add_space(8.0);
        ui.horizontal(|ui| {
            ui.heading(format!("📦 APK Share v{}", env!("CARGO_PKG_VERSION")));
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let device = device.unwrap_or("default device");
                ui.label(egui::RichText::new(format!("adb: {}", device)).color(MUTED_TEXT));
            });
        });
        ui.add_space(6.0);
    });
}
