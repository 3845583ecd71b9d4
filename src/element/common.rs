use egui::{Pos2, Vec2};

// Floors that keep elements from becoming invisible
pub const MIN_ELEMENT_SIZE: f32 = 30.0;
pub const MIN_FONT_SIZE: f32 = 10.0;

// Smallest crop rectangle (either side) that produces a new element
pub const MIN_CROP_SIZE: f32 = 10.0;

pub const DEFAULT_FONT_SIZE: f32 = 24.0;
pub const DEFAULT_OPACITY: u8 = 100;

pub const ROTATION_STEP: f32 = 15.0;
pub const RESIZE_STEP: f32 = 20.0;
pub const DUPLICATE_OFFSET: Vec2 = Vec2::new(20.0, 20.0);

pub const RECTANGLE_SIZE: Vec2 = Vec2::new(100.0, 60.0);
pub const CIRCLE_DIAMETER: f32 = 80.0;
pub const ARROW_LENGTH: f32 = 100.0;
pub const LINE_LENGTH: f32 = 150.0;

pub const BASE_PRODUCT_POSITION: Pos2 = Pos2::new(50.0, 50.0);
pub const BASE_PRODUCT_SIZE: Vec2 = Vec2::new(400.0, 300.0);

pub const PRODUCT_IMAGE_POSITION: Pos2 = Pos2::new(200.0, 150.0);
pub const PRODUCT_IMAGE_SIZE: f32 = 200.0;

pub const TEXT_POSITION: Pos2 = Pos2::new(250.0, 250.0);
pub const SHAPE_ORIGIN: Pos2 = Pos2::new(250.0, 250.0);
pub const SHAPE_JITTER: f32 = 100.0;

// Drawing metrics shared by the interactive view and the export surface
pub const STROKE_WIDTH: f32 = 2.0;
pub const ARROW_BOX_HEIGHT: f32 = 24.0;
pub const LINE_BOX_HEIGHT: f32 = 4.0;
pub const ARROW_HEAD_LENGTH: f32 = 15.0;
pub const ARROW_HEAD_HALF_WIDTH: f32 = 8.0;

// Text has no font metrics in the model; boxes are estimated from these
const TEXT_ADVANCE_FACTOR: f32 = 0.6;
const TEXT_LINE_FACTOR: f32 = 1.2;

/// Estimated box for a run of text, used for hit testing and rotation centers.
pub fn text_box_size(content: &str, font_size: f32) -> Vec2 {
    let chars = content.chars().count().max(1) as f32;
    Vec2::new(
        chars * font_size * TEXT_ADVANCE_FACTOR,
        font_size * TEXT_LINE_FACTOR,
    )
}
