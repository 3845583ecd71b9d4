mod common;

use std::sync::Arc;

use common::{MemoryLoader, PRODUCT_URL, solid};
use design_board::command::Command;
use design_board::element::factory::ShapeKind;
use design_board::element::{ElementId, ElementPatch, Fill, ImageSource};
use design_board::renderer::{ExportedImage, Exporter};
use design_board::state::EditorModel;
use design_board::BoardConfig;
use egui::{Color32, pos2};
use futures::executor::block_on;
use image::{Rgba, RgbaImage};

const RED: [u8; 4] = [255, 0, 0, 255];
const BLUE: [u8; 4] = [0, 0, 255, 255];

fn exporter(loader: MemoryLoader) -> Exporter {
    Exporter::new(Arc::new(loader), &BoardConfig::default()).unwrap()
}

fn decode(exported: &ExportedImage) -> RgbaImage {
    image::load_from_memory(&exported.png).unwrap().to_rgba8()
}

fn add_rectangle(model: &mut EditorModel, x: f32, y: f32, fill: Color32) -> ElementId {
    Command::AddShape {
        shape: ShapeKind::Rectangle,
        position: pos2(x, y),
        color: Color32::BLACK,
        fill: Fill::Solid(fill),
    }
    .execute(model);
    model.selected_id().cloned().unwrap()
}

#[test]
fn test_export_is_canvas_sized_png() {
    let model = EditorModel::open(ImageSource::url(PRODUCT_URL));
    let loader = MemoryLoader::new().with(PRODUCT_URL, solid(400, 300, RED));
    let exported = block_on(exporter(loader).export(model.elements())).unwrap();

    assert_eq!((exported.width, exported.height), (800, 600));
    assert!(exported.to_data_url().starts_with("data:image/png;base64,"));
    let pixels = decode(&exported);
    assert_eq!(pixels.dimensions(), (800, 600));
    assert_eq!(pixels.get_pixel(10, 10), &Rgba([255, 255, 255, 255]));
    assert_eq!(pixels.get_pixel(250, 200), &Rgba(RED));
}

#[test]
fn test_higher_z_paints_on_top() {
    let mut model = EditorModel::open(ImageSource::url(PRODUCT_URL));
    let loader = Arc::new(MemoryLoader::new().with(PRODUCT_URL, solid(400, 300, RED)));
    let exporter = Exporter::new(loader, &BoardConfig::default()).unwrap();
    add_rectangle(&mut model, 100.0, 100.0, Color32::from_rgb(0, 255, 0));

    let pixels = decode(&block_on(exporter.export(model.elements())).unwrap());
    assert_eq!(pixels.get_pixel(150, 130), &Rgba([0, 255, 0, 255]));

    model.update_element(&ElementId::base_product(), ElementPatch::default().z_index(5));
    let pixels = decode(&block_on(exporter.export(model.elements())).unwrap());
    assert_eq!(pixels.get_pixel(150, 130), &Rgba(RED));
}

#[test]
fn test_failed_image_is_skipped() {
    let mut model = EditorModel::open(ImageSource::url("https://shop.example/gone.png"));
    add_rectangle(&mut model, 500.0, 400.0, Color32::from_rgb(0, 0, 255));

    let exported = block_on(exporter(MemoryLoader::new()).export(model.elements())).unwrap();
    let pixels = decode(&exported);
    assert_eq!(pixels.get_pixel(250, 200), &Rgba([255, 255, 255, 255]));
    assert_eq!(pixels.get_pixel(550, 430), &Rgba(BLUE));
}

#[test]
fn test_opacity_blends_with_background() {
    let mut model = EditorModel::open(ImageSource::url(PRODUCT_URL));
    model.update_element(&ElementId::base_product(), ElementPatch::default().opacity(50));
    let loader = MemoryLoader::new().with(PRODUCT_URL, solid(400, 300, RED));

    let pixels = decode(&block_on(exporter(loader).export(model.elements())).unwrap());
    let [r, g, b, a] = pixels.get_pixel(250, 200).0;
    assert_eq!((r, a), (255, 255));
    assert!((i32::from(g) - 128).abs() <= 2, "g = {g}");
    assert!((i32::from(b) - 128).abs() <= 2, "b = {b}");
}

#[test]
fn test_flip_mirrors_image() {
    let mut photo = solid(400, 300, RED);
    for x in 200..400 {
        for y in 0..300 {
            photo.put_pixel(x, y, Rgba(BLUE));
        }
    }
    let mut model = EditorModel::open(ImageSource::url(PRODUCT_URL));
    Command::Flip {
        element_id: ElementId::base_product(),
    }
    .execute(&mut model);

    let loader = MemoryLoader::new().with(PRODUCT_URL, photo);
    let pixels = decode(&block_on(exporter(loader).export(model.elements())).unwrap());
    assert_eq!(pixels.get_pixel(60, 200), &Rgba(BLUE));
    assert_eq!(pixels.get_pixel(440, 200), &Rgba(RED));
}

#[test]
fn test_export_does_not_touch_history() {
    let model = EditorModel::open(ImageSource::url(PRODUCT_URL));
    let before = model.elements().to_vec();
    let loader = MemoryLoader::new().with(PRODUCT_URL, solid(400, 300, RED));
    block_on(exporter(loader).export(model.elements())).unwrap();
    assert_eq!(model.elements(), before.as_slice());
    assert_eq!(model.history_index(), 0);
}

fn dark_pixels(pixels: &RgbaImage, xs: std::ops::Range<u32>, ys: std::ops::Range<u32>) -> usize {
    ys.flat_map(|y| xs.clone().map(move |x| (x, y)))
        .filter(|&(x, y)| {
            let [r, g, b, _] = pixels.get_pixel(x, y).0;
            r < 128 && g < 128 && b < 128
        })
        .count()
}

#[test]
fn test_text_is_drawn_with_bundled_font() {
    // Unknown product url leaves the canvas white behind the text
    let mut model = EditorModel::open(ImageSource::url("https://shop.example/gone.png"));
    Command::AddText {
        content: "SALE".to_owned(),
        color: Color32::BLACK,
    }
    .execute(&mut model);

    let pixels = decode(&block_on(exporter(MemoryLoader::new()).export(model.elements())).unwrap());
    assert!(dark_pixels(&pixels, 250..320, 250..285) > 20, "text missing from export");
    assert_eq!(dark_pixels(&pixels, 0..800, 0..240), 0);
}

#[test]
fn test_hebrew_text_is_drawn() {
    let mut model = EditorModel::open(ImageSource::url("https://shop.example/gone.png"));
    Command::AddText {
        content: "מבצע".to_owned(),
        color: Color32::BLACK,
    }
    .execute(&mut model);

    let pixels = decode(&block_on(exporter(MemoryLoader::new()).export(model.elements())).unwrap());
    assert!(dark_pixels(&pixels, 250..320, 250..285) > 20, "hebrew text missing from export");
}

#[test]
fn test_rotation_turns_about_center() {
    let mut model = EditorModel::open(ImageSource::url("https://shop.example/gone.png"));
    // 100x60 box centered on (550, 130)
    let id = add_rectangle(&mut model, 500.0, 100.0, Color32::from_rgb(0, 0, 255));
    let exporter = exporter(MemoryLoader::new());

    let pixels = decode(&block_on(exporter.export(model.elements())).unwrap());
    assert_eq!(pixels.get_pixel(505, 130), &Rgba(BLUE));
    assert_eq!(pixels.get_pixel(550, 90), &Rgba([255, 255, 255, 255]));

    model.update_element(&id, ElementPatch::default().rotation(90.0));
    let pixels = decode(&block_on(exporter.export(model.elements())).unwrap());
    // Now spans x 520..580, y 80..180
    assert_eq!(pixels.get_pixel(550, 130), &Rgba(BLUE));
    assert_eq!(pixels.get_pixel(550, 90), &Rgba(BLUE));
    assert_eq!(pixels.get_pixel(550, 170), &Rgba(BLUE));
    assert_eq!(pixels.get_pixel(505, 130), &Rgba([255, 255, 255, 255]));
    assert_eq!(pixels.get_pixel(590, 130), &Rgba([255, 255, 255, 255]));
}
