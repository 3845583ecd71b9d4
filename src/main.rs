#![warn(clippy::all, rust_2018_idioms)]

use std::sync::Arc;

use design_board::app::Preferences;
use design_board::element::ImageSource;
use design_board::raster::SourceLoader;
use design_board::search::HttpProductSearch;
use design_board::{BoardConfig, DesignBoardApp};

const USAGE: &str = "usage: design-board <product-image> [product-name]";

fn main() -> eframe::Result {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let Some(product_image) = args.next() else {
        eprintln!("{USAGE}");
        std::process::exit(2);
    };
    let product_name = args.next().unwrap_or_else(|| "product".to_owned());
    let config = BoardConfig::from_env();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([config.canvas.width as f32 + 320.0, config.canvas.height as f32 + 80.0])
            .with_title("Design board"),
        ..Default::default()
    };

    eframe::run_native(
        "design-board",
        options,
        Box::new(move |cc| {
            let loader = Arc::new(SourceLoader::new(config.raster.timeout())?);
            let search = Arc::new(HttpProductSearch::new(&config.search)?);
            let prefs: Preferences = cc
                .storage
                .and_then(|storage| eframe::get_value(storage, eframe::APP_KEY))
                .unwrap_or_default();

            let mut app = DesignBoardApp::new(
                config,
                ImageSource::url(product_image),
                product_name,
                loader,
                search,
            )?
            .with_preferences(prefs);
            if let Ok(dir) = std::env::current_dir() {
                app = app.save_to(dir);
            }
            log::info!("Design board ready for {}", app.product_name());
            Ok(Box::new(app))
        }),
    )
}
