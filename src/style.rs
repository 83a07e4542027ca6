//! Material-inspired light theme for egui components.

use eframe::{egui, epaint};

pub const ACCENT: epaint::Color32 = epaint::Color32::from_rgb(61, 220, 132); // Android green
pub const MUTED_TEXT: epaint::Color32 = epaint::Color32::from_rgb(110, 112, 124);

/// Apply a Material-like light theme to the current egui Context.
pub fn set_material_style(ctx: &egui::Context) {
    use egui::Visuals;

    let mut visuals = Visuals::light();
    visuals.window_fill = epaint::Color32::from_rgb(250, 250, 250);
    visuals.panel_fill = epaint::Color32::from_rgb(255, 255, 255);
    visuals.selection.bg_fill = epaint::Color32::from_rgb(232, 245, 233);
    visuals.widgets.active.bg_fill = epaint::Color32::from_rgb(27, 94, 32);
    visuals.widgets.active.fg_stroke = epaint::Stroke::new(1.0, epaint::Color32::WHITE);
    visuals.widgets.hovered.bg_fill = epaint::Color32::from_rgb(241, 248, 233);
    visuals.widgets.noninteractive.bg_fill = epaint::Color32::from_rgb(255, 255, 255);
    ctx.set_visuals(visuals);

    let mut style = (*ctx.style()).clone();
    style.spacing.item_spacing = egui::vec2(8.0, 6.0);
    style.spacing.button_padding = egui::vec2(10.0, 4.0);
    ctx.set_style(style);
}

/// Fill colour for a monogram icon of the given hue (0..=250).
pub fn icon_color(hue: u8) -> epaint::Color32 {
    let h = hue as f32 / 251.0;
    epaint::Color32::from(epaint::Hsva::new(h, 0.45, 0.75, 1.0))
}
