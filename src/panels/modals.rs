use egui::color_picker::{Alpha, color_edit_button_srgba};

use crate::DesignBoardApp;

pub fn text_modal(app: &mut DesignBoardApp, ctx: &egui::Context) {
    if !app.show_text_modal {
        return;
    }
    let mut add = false;
    let mut cancel = false;

    egui::Window::new("Add text")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
        .show(ctx, |ui| {
            let response = ui.add(egui::TextEdit::singleline(&mut app.text_input).hint_text("Text"));
            if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                add = true;
            }
            ui.horizontal(|ui| {
                ui.label("Color");
                color_edit_button_srgba(ui, &mut app.tool_settings_mut().text_color, Alpha::Opaque);
            });
            ui.horizontal(|ui| {
                if ui
                    .add_enabled(!app.text_input.trim().is_empty(), egui::Button::new("Add"))
                    .clicked()
                {
                    add = true;
                }
                if ui.button("Cancel").clicked() {
                    cancel = true;
                }
            });
        });

    if add {
        app.add_text();
    } else if cancel {
        app.text_input.clear();
        app.show_text_modal = false;
    }
}

/// Confirmation prompt for a finished crop drag.
pub fn crop_modal(app: &mut DesignBoardApp, ctx: &egui::Context) {
    let Some(label) = app.controller().pending_crop().map(|pending| pending.size_label()) else {
        return;
    };
    let mut confirm = false;
    let mut cancel = false;

    egui::Window::new("Crop")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_BOTTOM, egui::vec2(0.0, -24.0))
        .show(ctx, |ui| {
            ui.label(format!("Crop to {label}?"));
            ui.horizontal(|ui| {
                confirm = ui.button("Confirm").clicked();
                cancel = ui.button("Cancel").clicked();
            });
        });

    if confirm {
        app.confirm_crop(ctx);
    } else if cancel {
        app.cancel_crop();
    }
}
