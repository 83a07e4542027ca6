use crate::style::{MUTED_TEXT, icon_color};
use crate::types::{AppRecord, StateColors};
use eframe::emath::{Align2, Vec2};
use eframe::epaint::{Color32, FontId, StrokeKind};
use egui::{Response, Sense, Ui};

/// Two-line list row: monogram icon, label, then package id and version.
pub fn list_item(
    ui: &mut Ui,
    app: &AppRecord,
    size: Vec2,
    selected: bool,
    colors: StateColors,
) -> Response {
    let (rect, response) = ui.allocate_exact_size(size, Sense::click());

    if ui.is_rect_visible(rect) {
        let mut visuals = ui.style().interact_selectable(&response, selected);

        // Override background color based on state
        let bg_color = if selected {
            colors.selected.unwrap_or(visuals.bg_fill)
        } else if response.hovered() {
            colors.hover
        } else {
            colors.default
        };

        visuals.bg_fill = bg_color;

        let border_radius = 4.0;
        ui.painter().rect_filled(rect, border_radius, visuals.bg_fill);
        ui.painter()
            .rect_stroke(rect, border_radius, visuals.bg_stroke, StrokeKind::Middle);

        // Icon
        let radius = (size.y * 0.5 - 6.0).max(6.0);
        let center = rect.left_center() + Vec2::new(8.0 + radius, 0.0);
        ui.painter().circle_filled(center, radius, icon_color(app.icon.hue()));
        ui.painter().text(
            center,
            Align2::CENTER_CENTER,
            app.icon.glyph(),
            FontId::proportional(radius),
            Color32::WHITE,
        );

        // Label over package id and version
        let text_x = center.x + radius + 10.0;
        ui.painter().text(
            egui::pos2(text_x, rect.center().y - 2.0),
            Align2::LEFT_BOTTOM,
            &app.label,
            FontId::proportional(14.0),
            visuals.text_color(),
        );
        ui.painter().text(
            egui::pos2(text_x, rect.center().y + 2.0),
            Align2::LEFT_TOP,
            format!("{}  •  {} ({})", app.package_id, app.version_name, app.version_code),
            FontId::proportional(11.0),
            MUTED_TEXT,
        );
    }

    response.on_hover_text(app.package_id.as_str())
}
