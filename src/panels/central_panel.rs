use crate::DesignBoardApp;

pub fn central_panel(app: &mut DesignBoardApp, ctx: &egui::Context) {
    egui::CentralPanel::default().show(ctx, |ui| {
        egui::ScrollArea::both().show(ui, |ui| {
            let size = app.canvas_size() * app.zoom();
            // Claims the drag so the scroll area doesn't pan under an element move
            let (canvas_rect, _response) = ui.allocate_exact_size(size, egui::Sense::click_and_drag());

            app.handle_input(ctx, canvas_rect);

            let painter = ui.painter_at(canvas_rect);
            app.paint_canvas(&painter, canvas_rect);
        });
    });
}
