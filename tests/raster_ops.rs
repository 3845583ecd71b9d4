mod common;

use std::time::Duration;

use common::{MemoryLoader, PRODUCT_URL, solid};
use design_board::element::{ElementId, ImageSource};
use design_board::raster::{
    BackgroundJob, CropJob, ImageLoader, SourceLoader, encode_png, png_data_url,
};
use design_board::state::EditorModel;
use design_board::BoardError;
use egui::{Rect, pos2, vec2};
use futures::executor::block_on;
use image::Rgba;

fn product_board() -> (EditorModel, MemoryLoader) {
    let mut photo = solid(400, 300, [255, 255, 255, 255]);
    for x in 100..300 {
        for y in 50..250 {
            photo.put_pixel(x, y, Rgba([30, 60, 90, 255]));
        }
    }
    let loader = MemoryLoader::new().with(PRODUCT_URL, photo);
    (EditorModel::open(ImageSource::url(PRODUCT_URL)), loader)
}

#[test]
fn test_crop_adds_one_element_and_keeps_original() {
    let (mut model, loader) = product_board();
    let original = model.base_product().unwrap().clone();

    let drag = Rect::from_min_size(pos2(120.0, 110.0), vec2(100.0, 80.0));
    let job = CropJob::new(&original, drag).unwrap();
    let result = block_on(job.run(&loader)).unwrap();
    let id = result.apply(&mut model);

    assert_eq!(model.len(), 2);
    let cropped = model.find_element_by_id(&id).unwrap();
    assert!((cropped.size().x - 100.0).abs() <= 1.0);
    assert!((cropped.size().y - 80.0).abs() <= 1.0);
    assert_eq!(cropped.position, pos2(120.0, 110.0));
    assert_eq!(cropped.opacity, 100);
    assert_eq!(cropped.z_index, 1);

    let base = model.base_product().unwrap();
    assert_eq!(base.rect(), original.rect());
    assert_eq!(base.src(), original.src());
    assert_eq!(model.history_index(), 1);

    let Some(ImageSource::Raster(pixels)) = cropped.src() else {
        panic!("crop should produce an in-memory raster");
    };
    assert_eq!(pixels.dimensions(), (100, 80));
}

#[test]
fn test_crop_is_clipped_to_target() {
    let (model, _) = product_board();
    let base = model.base_product().unwrap();
    // Overhangs the bottom-right corner at (450, 350)
    let drag = Rect::from_min_max(pos2(400.0, 320.0), pos2(600.0, 500.0));
    let job = CropJob::new(base, drag).unwrap();
    assert_eq!(job.region().canvas, Rect::from_min_max(pos2(400.0, 320.0), pos2(450.0, 350.0)));
}

#[test]
fn test_crop_scales_to_natural_pixels() {
    let loader = MemoryLoader::new().with(PRODUCT_URL, solid(800, 600, [0, 0, 0, 255]));
    let mut model = EditorModel::open(ImageSource::url(PRODUCT_URL));
    let base = model.base_product().unwrap().clone();

    let drag = Rect::from_min_size(pos2(50.0, 50.0), vec2(100.0, 80.0));
    let result = block_on(CropJob::new(&base, drag).unwrap().run(&loader)).unwrap();
    let id = result.apply(&mut model);

    let cropped = model.find_element_by_id(&id).unwrap();
    let Some(ImageSource::Raster(pixels)) = cropped.src() else {
        panic!("crop should produce an in-memory raster");
    };
    assert_eq!(pixels.dimensions(), (200, 160));
    assert_eq!(cropped.size(), vec2(100.0, 80.0));
}

#[test]
fn test_background_removal_keys_white() {
    let (mut model, loader) = product_board();
    let base = model.base_product().unwrap();
    let result = block_on(BackgroundJob::new(base, 240).unwrap().run(&loader)).unwrap();
    assert!(result.apply(&mut model));

    let base = model.base_product().unwrap();
    assert_eq!(base.original_src(), Some(&ImageSource::url(PRODUCT_URL)));
    let Some(ImageSource::Raster(keyed)) = base.src() else {
        panic!("background removal should replace src with a raster");
    };
    assert_eq!(keyed.get_pixel(0, 0)[3], 0);
    assert_eq!(keyed.get_pixel(150, 100), &Rgba([30, 60, 90, 255]));
    assert_eq!(model.history_index(), 1);

    model.undo();
    assert_eq!(model.base_product().unwrap().src(), Some(&ImageSource::url(PRODUCT_URL)));
}

#[test]
fn test_background_result_for_deleted_element_is_dropped() {
    let (mut model, loader) = product_board();
    design_board::Command::Duplicate {
        element_id: ElementId::base_product(),
    }
    .execute(&mut model);
    let copy = model.selected_element().unwrap().clone();
    let job = BackgroundJob::new(&copy, 240).unwrap();
    model.delete_element(&copy.id);

    let index = model.history_index();
    let result = block_on(job.run(&loader)).unwrap();
    assert!(!result.apply(&mut model));
    assert_eq!(model.history_index(), index);
}

#[test]
fn test_failed_load_surfaces_error() {
    let loader = MemoryLoader::new();
    let model = EditorModel::open(ImageSource::url("https://shop.example/missing.png"));
    let job = BackgroundJob::new(model.base_product().unwrap(), 240).unwrap();
    let err = block_on(job.run(&loader)).unwrap_err();
    assert!(matches!(err, BoardError::ImageLoad { .. }));
}

#[test]
fn test_source_loader_reads_data_urls_and_files() {
    let loader = SourceLoader::new(Duration::from_secs(1)).unwrap();
    let png = encode_png(&solid(3, 2, [1, 2, 3, 255])).unwrap();

    let from_data = block_on(loader.load(&ImageSource::url(png_data_url(&png)))).unwrap();
    assert_eq!(from_data.dimensions(), (3, 2));

    let path = std::env::temp_dir().join(format!("design-board-{}.png", std::process::id()));
    std::fs::write(&path, &png).unwrap();
    let source = ImageSource::url(path.to_string_lossy());
    let from_file = block_on(loader.load(&source)).unwrap();
    assert_eq!(from_file.get_pixel(0, 0), &Rgba([1, 2, 3, 255]));
    assert!(loader.cached(&source).is_some());
    std::fs::remove_file(&path).unwrap();

    let missing = block_on(loader.load(&ImageSource::url(path.to_string_lossy())));
    // Served from cache even after the file is gone
    assert!(missing.is_ok());
}
