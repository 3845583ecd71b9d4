use eframe::egui;

use crate::tools::ToolMode;

/// Icon + label toggle for one pointer tool.
pub struct ToolButton {
    pub tool: ToolMode,
    pub icon: &'static str,
    pub selected: bool,
}

impl ToolButton {
    pub fn new(tool: ToolMode, icon: &'static str, selected: bool) -> Self {
        Self {
            tool,
            icon,
            selected,
        }
    }

    pub fn show(&self, ui: &mut egui::Ui) -> egui::Response {
        let size = egui::vec2(88.0, 28.0);
        let (rect, response) = ui.allocate_exact_size(size, egui::Sense::click());
        let response = response.on_hover_text(format!("{} tool", self.tool.label()));

        if ui.is_rect_visible(rect) {
            let visuals = ui.visuals();
            let (fill, text_color) = if self.selected {
                (visuals.selection.bg_fill, visuals.selection.stroke.color)
            } else {
                let widget = ui.style().interact(&response);
                (widget.weak_bg_fill, widget.text_color())
            };
            let painter = ui.painter();
            painter.rect_filled(rect, 6.0, fill);

            let icon_center = egui::pos2(rect.left() + 16.0, rect.center().y);
            painter.text(
                icon_center,
                egui::Align2::CENTER_CENTER,
                self.icon,
                egui::FontId::proportional(16.0),
                text_color,
            );
            painter.text(
                egui::pos2(rect.left() + 30.0, rect.center().y),
                egui::Align2::LEFT_CENTER,
                self.tool.label(),
                egui::FontId::proportional(14.0),
                text_color,
            );
        }

        response
    }
}
