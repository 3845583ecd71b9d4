use crate::DesignBoardApp;
use crate::search::SearchStatus;

/// Product picker. Typing is debounced by the search session; clicking a
/// hit with an image adds it to the board.
pub fn search_panel(app: &mut DesignBoardApp, ctx: &egui::Context) {
    let snapshot = app.search().snapshot();
    let mut query = snapshot.query.clone();
    let mut open = app.show_search;
    let mut picked = None;

    egui::Window::new("Add product")
        .open(&mut open)
        .collapsible(false)
        .default_width(280.0)
        .show(ctx, |ui| {
            let response = ui.add(egui::TextEdit::singleline(&mut query).hint_text("Search products"));
            if response.changed() {
                app.set_search_query(&query);
            }

            match &snapshot.status {
                SearchStatus::Idle => {}
                SearchStatus::Loading => {
                    ui.horizontal(|ui| {
                        ui.spinner();
                        ui.label("Searching…");
                    });
                }
                SearchStatus::Failed(message) => {
                    ui.colored_label(ui.visuals().error_fg_color, message);
                }
                SearchStatus::Ready if snapshot.results.is_empty() => {
                    ui.weak("No products found");
                }
                SearchStatus::Ready => {}
            }

            egui::ScrollArea::vertical().max_height(360.0).show(ui, |ui| {
                for hit in &snapshot.results {
                    let selectable = hit.is_selectable();
                    let label = if selectable {
                        hit.name.clone()
                    } else {
                        format!("{} (no image)", hit.name)
                    };
                    if ui.add_enabled(selectable, egui::Button::new(label)).clicked() {
                        picked = Some(hit.clone());
                    }
                }
            });
        });

    if let Some(hit) = picked {
        app.add_product(&hit, ctx);
    } else if !open {
        app.show_search = false;
    }
}
