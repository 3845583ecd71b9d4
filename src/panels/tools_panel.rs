use egui::color_picker::{Alpha, color_edit_button_srgba};

use crate::DesignBoardApp;
use crate::command::{Command, LayerDirection};
use crate::components::ToolButton;
use crate::element::factory::ShapeKind;
use crate::element::{ElementType, Fill};
use crate::tools::ToolMode;

pub fn tools_panel(app: &mut DesignBoardApp, ctx: &egui::Context) {
    egui::SidePanel::left("tools_panel")
        .resizable(false)
        .default_width(220.0)
        .show(ctx, |ui| {
            ui.heading(format!("Design board: {}", app.product_name()));
            ui.small("Del = delete | Ctrl+D = duplicate | Ctrl+Z = undo");
            ui.separator();

            ui.horizontal(|ui| {
                for (tool, icon) in [(ToolMode::Select, "↖"), (ToolMode::Crop, "✂")] {
                    let selected = app.controller().tool() == tool;
                    if ToolButton::new(tool, icon, selected).show(ui).clicked() {
                        log::info!("Tool selected from UI: {}", tool.label());
                        app.set_tool(tool);
                    }
                }
            });
            ui.separator();

            add_section(app, ui);
            ui.separator();
            colors_section(app, ui);
            ui.separator();
            selection_section(app, ui, ctx);
            ui.separator();

            ui.horizontal(|ui| {
                if ui
                    .add_enabled(app.model().can_undo(), egui::Button::new("Undo"))
                    .clicked()
                {
                    app.execute(Command::Undo);
                }
                ui.label(format!(
                    "Step {} / {}",
                    app.model().history_index() + 1,
                    app.model().history_len()
                ));
            });

            ui.horizontal(|ui| {
                if ui.button("−").clicked() {
                    app.zoom_out();
                }
                ui.label(format!("{:.0}%", app.zoom() * 100.0));
                if ui.button("+").clicked() {
                    app.zoom_in();
                }
            });
            ui.separator();

            if ui.button("Export PNG").clicked() {
                app.export(ctx);
            }
            if app.running_jobs() > 0 {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label("Working…");
                });
            }
            if let Some(status) = &app.status {
                ui.label(status);
            }
        });
}

fn add_section(app: &mut DesignBoardApp, ui: &mut egui::Ui) {
    ui.label("Add");
    ui.horizontal_wrapped(|ui| {
        if ui.button("Text…").clicked() {
            app.show_text_modal = true;
        }
        if ui.button("Product…").clicked() {
            app.show_search = !app.show_search;
        }
        for shape in ShapeKind::ALL {
            if ui.button(shape.label()).clicked() {
                app.add_shape(shape);
            }
        }
    });
}

fn colors_section(app: &mut DesignBoardApp, ui: &mut egui::Ui) {
    let settings = app.tool_settings_mut();
    ui.horizontal(|ui| {
        ui.label("Stroke");
        color_edit_button_srgba(ui, &mut settings.shape_color, Alpha::Opaque);
    });
    ui.horizontal(|ui| {
        ui.label("Fill");
        let mut transparent = settings.shape_fill == Fill::Transparent;
        if ui.checkbox(&mut transparent, "none").changed() {
            settings.shape_fill = if transparent {
                Fill::Transparent
            } else {
                Fill::Solid(settings.fill_picker_color())
            };
        }
        if !transparent {
            let mut color = settings.fill_picker_color();
            if color_edit_button_srgba(ui, &mut color, Alpha::Opaque).changed() {
                settings.shape_fill = Fill::Solid(color);
            }
        }
    });
    ui.horizontal(|ui| {
        ui.label("Text");
        color_edit_button_srgba(ui, &mut settings.text_color, Alpha::Opaque);
    });
}

fn selection_section(app: &mut DesignBoardApp, ui: &mut egui::Ui, ctx: &egui::Context) {
    let Some(selected) = app.model().selected_element() else {
        ui.weak("Nothing selected");
        return;
    };
    let element_id = selected.id.clone();
    let element_type = selected.element_type();
    let is_base = element_id.is_base_product();
    let mut opacity = selected.opacity;

    ui.label(format!("Selected: {}", element_type.as_str()));
    ui.horizontal(|ui| {
        if ui.button("Smaller").clicked() {
            app.resize_selected(false);
        }
        if ui.button("Larger").clicked() {
            app.resize_selected(true);
        }
        if ui.button("Rotate").clicked() {
            app.rotate_selected();
        }
        if ui.button("Flip").clicked() {
            app.on_selected(|element_id| Command::Flip { element_id });
        }
    });
    ui.horizontal(|ui| {
        if ui.button("Layer up").clicked() {
            app.move_selected_layer(LayerDirection::Up);
        }
        if ui.button("Layer down").clicked() {
            app.move_selected_layer(LayerDirection::Down);
        }
    });

    ui.horizontal(|ui| {
        ui.label("Opacity");
        let response = ui.add(egui::Slider::new(&mut opacity, 0..=100).suffix("%"));
        if response.changed() {
            app.execute(Command::SetOpacity {
                element_id: element_id.clone(),
                opacity,
            });
        }
        // Slider ticks are transient; the gesture commits once
        if response.drag_stopped() || (response.changed() && !response.dragged()) {
            app.execute(Command::Commit);
        }
    });

    ui.horizontal(|ui| {
        if ui.button("Duplicate").clicked() {
            app.execute(Command::Duplicate {
                element_id: element_id.clone(),
            });
        }
        if ui.add_enabled(!is_base, egui::Button::new("Delete")).clicked() {
            app.execute(Command::Delete {
                element_id: element_id.clone(),
            });
        }
    });
    if element_type == ElementType::Image && ui.button("Remove background").clicked() {
        app.remove_background(ctx);
    }
}
