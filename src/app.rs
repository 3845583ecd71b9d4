use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use egui::{Color32, Vec2};
use futures::future::BoxFuture;
use log::{error, warn};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::command::{Command, LayerDirection};
use crate::config::BoardConfig;
use crate::element::factory::{self, ShapeKind};
use crate::element::{ElementId, ImageSource, RESIZE_STEP, ROTATION_STEP};
use crate::error::BoardResult;
use crate::geometry::Viewport;
use crate::input::InputHandler;
use crate::panels;
use crate::raster::{BackgroundJob, BackgroundResult, CropResult, ImageLoader};
use crate::renderer::view::Overlay;
use crate::renderer::{CanvasView, ExportedImage, Exporter};
use crate::search::{ProductHit, ProductSearch, SearchSession};
use crate::state::EditorModel;
use crate::tools::{InteractionController, ToolMode, ToolSettings};
use crate::util::time;

/// Receives each finished export.
pub type SaveCallback = Box<dyn FnMut(&ExportedImage) + Send>;

/// UI preferences restored between runs. The design itself is not saved.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub tools: ToolSettings,
    pub zoom: f32,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            tools: ToolSettings::default(),
            zoom: 1.0,
        }
    }
}

/// Result of background work, applied on the UI thread.
enum JobOutcome {
    Background(BoardResult<BackgroundResult>),
    Crop(BoardResult<CropResult>),
    Export(BoardResult<ExportedImage>),
    ProductImage {
        src: ImageSource,
        natural_size: Option<Vec2>,
    },
}

pub struct DesignBoardApp {
    config: BoardConfig,
    product_name: String,
    model: EditorModel,
    prefs: Preferences,
    controller: InteractionController,
    input: InputHandler,
    view: CanvasView,
    loader: Arc<dyn ImageLoader>,
    exporter: Exporter,
    search: SearchSession,
    jobs: Arc<Mutex<Vec<JobOutcome>>>,
    running_jobs: usize,
    on_save: Option<SaveCallback>,
    save_dir: Option<PathBuf>,

    pub(crate) show_search: bool,
    pub(crate) show_text_modal: bool,
    pub(crate) text_input: String,
    pub(crate) status: Option<String>,
}

impl DesignBoardApp {
    pub fn new(
        config: BoardConfig,
        product_image: ImageSource,
        product_name: impl Into<String>,
        loader: Arc<dyn ImageLoader>,
        search: Arc<dyn ProductSearch>,
    ) -> BoardResult<Self> {
        config.validate()?;
        let exporter = Exporter::new(loader.clone(), &config)?;
        let search = SearchSession::new(search, &config.search);
        Ok(Self {
            product_name: product_name.into(),
            model: EditorModel::open(product_image),
            prefs: Preferences::default(),
            controller: InteractionController::new(),
            input: InputHandler::new(),
            view: CanvasView::new(loader.clone()),
            loader,
            exporter,
            search,
            jobs: Arc::new(Mutex::new(Vec::new())),
            running_jobs: 0,
            on_save: None,
            save_dir: None,
            show_search: false,
            show_text_modal: false,
            text_input: String::new(),
            status: None,
            config,
        })
    }

    pub fn with_preferences(mut self, prefs: Preferences) -> Self {
        self.prefs = prefs;
        self.prefs.zoom = self.config.zoom.clamp(self.prefs.zoom);
        self
    }

    pub fn on_save(mut self, callback: SaveCallback) -> Self {
        self.on_save = Some(callback);
        self
    }

    /// Exports are also written here as `design-<product>-<millis>.png`.
    pub fn save_to(mut self, dir: PathBuf) -> Self {
        self.save_dir = Some(dir);
        self
    }

    pub fn model(&self) -> &EditorModel {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut EditorModel {
        &mut self.model
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    pub fn product_name(&self) -> &str {
        &self.product_name
    }

    pub fn preferences(&self) -> &Preferences {
        &self.prefs
    }

    pub fn tool_settings_mut(&mut self) -> &mut ToolSettings {
        &mut self.prefs.tools
    }

    pub fn controller(&self) -> &InteractionController {
        &self.controller
    }

    pub fn search(&self) -> &SearchSession {
        &self.search
    }

    pub fn running_jobs(&self) -> usize {
        self.running_jobs
    }

    pub fn zoom(&self) -> f32 {
        self.prefs.zoom
    }

    pub fn zoom_in(&mut self) {
        self.prefs.zoom = self.config.zoom.zoom_in(self.prefs.zoom);
    }

    pub fn zoom_out(&mut self) {
        self.prefs.zoom = self.config.zoom.zoom_out(self.prefs.zoom);
    }

    pub fn canvas_size(&self) -> Vec2 {
        Vec2::new(self.config.canvas.width as f32, self.config.canvas.height as f32)
    }

    pub fn set_tool(&mut self, tool: ToolMode) {
        self.controller.set_tool(tool);
    }

    pub fn execute(&mut self, command: Command) -> bool {
        command.execute(&mut self.model)
    }

    pub fn selected_id(&self) -> Option<ElementId> {
        self.model.selected_id().cloned()
    }

    /// Runs `make` against the selected element, if any.
    pub fn on_selected(&mut self, make: impl FnOnce(ElementId) -> Command) -> bool {
        match self.selected_id() {
            Some(id) => self.execute(make(id)),
            None => false,
        }
    }

    pub fn resize_selected(&mut self, grow: bool) -> bool {
        let delta = if grow { RESIZE_STEP } else { -RESIZE_STEP };
        self.on_selected(|element_id| Command::Resize { element_id, delta })
    }

    pub fn rotate_selected(&mut self) -> bool {
        self.on_selected(|element_id| Command::Rotate {
            element_id,
            degrees: ROTATION_STEP,
        })
    }

    pub fn move_selected_layer(&mut self, direction: LayerDirection) -> bool {
        self.on_selected(|element_id| Command::MoveLayer {
            element_id,
            direction,
        })
    }

    pub fn add_shape(&mut self, shape: ShapeKind) -> bool {
        let settings = self.prefs.tools;
        self.execute(Command::AddShape {
            shape,
            position: factory::jittered_shape_origin(),
            color: settings.shape_color,
            fill: settings.shape_fill,
        })
    }

    /// Adds the text typed into the modal. Blank text is ignored and keeps
    /// the modal open.
    pub fn add_text(&mut self) -> bool {
        let added = self.execute(Command::AddText {
            content: self.text_input.clone(),
            color: self.prefs.tools.text_color,
        });
        if added {
            self.text_input.clear();
            self.show_text_modal = false;
        }
        added
    }

    pub fn text_color(&self) -> Color32 {
        self.prefs.tools.text_color
    }

    fn spawn_job<T: Send + 'static>(
        &mut self,
        ctx: &egui::Context,
        future: BoxFuture<'static, T>,
        wrap: impl FnOnce(T) -> JobOutcome + Send + 'static,
    ) {
        self.running_jobs += 1;
        let jobs = self.jobs.clone();
        let ctx = ctx.clone();
        std::thread::spawn(move || {
            let outcome = wrap(futures::executor::block_on(future));
            jobs.lock().push(outcome);
            ctx.request_repaint();
        });
    }

    pub fn remove_background(&mut self, ctx: &egui::Context) {
        let Some(element) = self.model.selected_element() else {
            return;
        };
        match BackgroundJob::new(element, self.config.raster.background_threshold) {
            Ok(job) => {
                let future = job.run(self.loader.as_ref());
                self.spawn_job(ctx, future, JobOutcome::Background);
            }
            Err(e) => warn!("{}", e),
        }
    }

    pub fn confirm_crop(&mut self, ctx: &egui::Context) {
        if let Some(job) = self.controller.confirm_crop(&self.model) {
            let future = job.run(self.loader.as_ref());
            self.spawn_job(ctx, future, JobOutcome::Crop);
        }
    }

    pub fn cancel_crop(&mut self) {
        self.controller.cancel_crop();
    }

    pub fn export(&mut self, ctx: &egui::Context) {
        self.status = Some("Exporting…".to_owned());
        let future = self.exporter.export(self.model.elements());
        self.spawn_job(ctx, future, JobOutcome::Export);
    }

    /// Adds a search hit to the board once its bitmap size is known. Hits
    /// without an image are ignored.
    pub fn add_product(&mut self, hit: &ProductHit, ctx: &egui::Context) {
        let Some(src) = hit.image_source() else {
            return;
        };
        self.show_search = false;
        let future = self.loader.load(&src);
        self.spawn_job(ctx, future, move |loaded| JobOutcome::ProductImage {
            natural_size: loaded
                .ok()
                .map(|image| Vec2::new(image.width() as f32, image.height() as f32)),
            src,
        });
    }

    pub fn set_search_query(&mut self, query: &str) {
        self.search.set_query(query, Instant::now());
    }

    fn poll_search(&mut self, ctx: &egui::Context) {
        let now = Instant::now();
        if let Some(request) = self.search.poll(now) {
            let ctx = ctx.clone();
            self.search.spawn(request, move || ctx.request_repaint());
        }
        if let Some(deadline) = self.search.next_deadline() {
            ctx.request_repaint_after(deadline.saturating_duration_since(now));
        }
    }

    /// Applies finished background work to the model.
    pub fn drain_jobs(&mut self) {
        let finished: Vec<JobOutcome> = std::mem::take(&mut *self.jobs.lock());
        for outcome in finished {
            self.running_jobs = self.running_jobs.saturating_sub(1);
            match outcome {
                JobOutcome::Background(Ok(result)) => {
                    result.apply(&mut self.model);
                }
                JobOutcome::Background(Err(e)) => error!("Background removal failed: {}", e),
                JobOutcome::Crop(Ok(result)) => {
                    result.apply(&mut self.model);
                }
                JobOutcome::Crop(Err(e)) => error!("Crop failed: {}", e),
                JobOutcome::Export(Ok(image)) => self.deliver_export(image),
                JobOutcome::Export(Err(e)) => {
                    error!("Export failed: {}", e);
                    self.status = Some(format!("Export failed: {e}"));
                }
                JobOutcome::ProductImage { src, natural_size } => {
                    self.execute(Command::AddProductImage { src, natural_size });
                }
            }
        }
    }

    fn deliver_export(&mut self, image: ExportedImage) {
        if let Some(callback) = &mut self.on_save {
            callback(&image);
        }
        self.status = Some("Design exported".to_owned());
        if let Some(dir) = &self.save_dir {
            let path = dir.join(time::export_file_name(&self.product_name, time::timestamp_millis()));
            if let Err(e) = image.save(&path) {
                error!("Could not write {}: {}", path.display(), e);
                self.status = Some(format!("Could not save export: {e}"));
            }
        }
    }

    /// Routes this frame's input through the interaction controller.
    pub(crate) fn handle_input(&mut self, ctx: &egui::Context, canvas_rect: egui::Rect) {
        self.input.set_canvas_rect(canvas_rect);
        let viewport = Viewport::new(canvas_rect.min, self.prefs.zoom);
        for event in self.input.process_input(ctx) {
            self.controller.handle_event(&mut self.model, &event, viewport);
        }
    }

    pub(crate) fn paint_canvas(&mut self, painter: &egui::Painter, canvas_rect: egui::Rect) {
        let viewport = Viewport::new(canvas_rect.min, self.prefs.zoom);
        let overlay = Overlay {
            selected: self.model.selected_id().cloned(),
            crop_rect: self.controller.crop_preview(),
        };
        let background = self.config.export.background_color();
        self.view.paint(
            painter,
            viewport,
            self.canvas_size(),
            background,
            self.model.elements(),
            &overlay,
        );
    }

    /// One frame of UI. Split from [`eframe::App::update`] so it can run
    /// against a bare `egui::Context`.
    pub fn ui(&mut self, ctx: &egui::Context) {
        self.drain_jobs();
        self.poll_search(ctx);

        panels::tools_panel(self, ctx);
        if self.show_search {
            panels::search_panel(self, ctx);
        }
        panels::central_panel(self, ctx);
        panels::text_modal(self, ctx);
        panels::crop_modal(self, ctx);
    }
}

impl eframe::App for DesignBoardApp {
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, eframe::APP_KEY, &self.prefs);
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.ui(ctx);
    }
}
