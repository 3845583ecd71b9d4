use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use egui::{Color32, Pos2, Rect, Vec2};
use image::RgbaImage;

mod common;
pub mod color;
pub mod factory;

pub use color::Fill;
pub use common::*;

/// Id of the seed product image present for the whole editing session.
pub const BASE_PRODUCT_ID: &str = "base-product";

/// Stable element identifier. Generated once at creation and never reused.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(String);

impl ElementId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn base_product() -> Self {
        Self(BASE_PRODUCT_ID.to_owned())
    }

    pub fn is_base_product(&self) -> bool {
        self.0 == BASE_PRODUCT_ID
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ElementId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ElementId({})", self.0)
    }
}

/// Pixels produced in-process, tagged with an id minted when they were made.
///
/// The id outlives the allocation, so a cache entry for a dropped raster can
/// never be mistaken for a new one.
#[derive(Clone)]
pub struct RasterImage {
    id: uuid::Uuid,
    pixels: Arc<RgbaImage>,
}

impl RasterImage {
    pub fn new(image: RgbaImage) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            pixels: Arc::new(image),
        }
    }

    pub fn id(&self) -> uuid::Uuid {
        self.id
    }

    pub fn pixels(&self) -> Arc<RgbaImage> {
        self.pixels.clone()
    }
}

impl Deref for RasterImage {
    type Target = RgbaImage;

    fn deref(&self) -> &RgbaImage {
        &self.pixels
    }
}

impl PartialEq for RasterImage {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

/// Where an image element gets its pixels from.
///
/// `Url` covers remote URLs, `data:` URLs and local file paths; `Raster`
/// holds pixels produced in-process (background removal, crop). Rasters are
/// reference counted so history snapshots share them instead of copying.
#[derive(Clone)]
pub enum ImageSource {
    Url(String),
    Raster(RasterImage),
}

impl ImageSource {
    pub fn url(url: impl Into<String>) -> Self {
        Self::Url(url.into())
    }

    pub fn from_raster(image: RgbaImage) -> Self {
        Self::Raster(RasterImage::new(image))
    }

    /// Key used by bitmap and texture caches.
    pub fn cache_key(&self) -> String {
        match self {
            Self::Url(url) => url.clone(),
            Self::Raster(raster) => format!("raster:{}", raster.id()),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Url(url) if url.trim().is_empty())
    }
}

impl PartialEq for ImageSource {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Url(a), Self::Url(b)) => a == b,
            (Self::Raster(a), Self::Raster(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Debug for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Url(url) if url.len() > 64 => {
                let cut = url.char_indices().nth(64).map_or(url.len(), |(i, _)| i);
                write!(f, "Url({}…)", &url[..cut])
            }
            Self::Url(url) => write!(f, "Url({url})"),
            Self::Raster(image) => write!(f, "Raster({}x{})", image.width(), image.height()),
        }
    }
}

/// The closed set of element types. Behavior dispatches on this tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementType {
    Image,
    Text,
    Arrow,
    Line,
    Rectangle,
    Circle,
}

impl ElementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ElementType::Image => "image",
            ElementType::Text => "text",
            ElementType::Arrow => "arrow",
            ElementType::Line => "line",
            ElementType::Rectangle => "rectangle",
            ElementType::Circle => "circle",
        }
    }
}

/// Type-specific data. Each variant only carries the fields that mean
/// something for it: text is sized by its content, lines and arrows only by
/// their length, circles by a single diameter.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementKind {
    Image {
        src: ImageSource,
        original_src: ImageSource,
        size: Vec2,
    },
    Text {
        content: String,
        font_size: f32,
    },
    Arrow {
        length: f32,
    },
    Line {
        length: f32,
    },
    Rectangle {
        size: Vec2,
        fill: Fill,
    },
    Circle {
        diameter: f32,
        fill: Fill,
    },
}

impl ElementKind {
    pub fn element_type(&self) -> ElementType {
        match self {
            ElementKind::Image { .. } => ElementType::Image,
            ElementKind::Text { .. } => ElementType::Text,
            ElementKind::Arrow { .. } => ElementType::Arrow,
            ElementKind::Line { .. } => ElementType::Line,
            ElementKind::Rectangle { .. } => ElementType::Rectangle,
            ElementKind::Circle { .. } => ElementType::Circle,
        }
    }
}

/// One visual object on the board. Coordinates are canvas-space (unzoomed).
#[derive(Debug, Clone, PartialEq)]
pub struct DesignElement {
    pub id: ElementId,
    pub position: Pos2,
    /// Degrees in `[0, 360)`, applied about the bounding-box center.
    pub rotation: f32,
    pub flip_x: bool,
    /// 0..=100
    pub opacity: u8,
    pub z_index: i32,
    pub color: Color32,
    pub kind: ElementKind,
}

impl DesignElement {
    pub fn element_type(&self) -> ElementType {
        self.kind.element_type()
    }

    pub fn is_image(&self) -> bool {
        matches!(self.kind, ElementKind::Image { .. })
    }

    /// Size of the unrotated bounding box.
    pub fn size(&self) -> Vec2 {
        match &self.kind {
            ElementKind::Image { size, .. } | ElementKind::Rectangle { size, .. } => *size,
            ElementKind::Text { content, font_size } => text_box_size(content, *font_size),
            ElementKind::Arrow { length } => Vec2::new(*length, ARROW_BOX_HEIGHT),
            ElementKind::Line { length } => Vec2::new(*length, LINE_BOX_HEIGHT),
            ElementKind::Circle { diameter, .. } => Vec2::splat(*diameter),
        }
    }

    /// Unrotated bounding box in canvas space.
    pub fn rect(&self) -> Rect {
        Rect::from_min_size(self.position, self.size())
    }

    pub fn center(&self) -> Pos2 {
        self.rect().center()
    }

    /// Stored width: image/rectangle width, circle diameter, arrow/line length.
    pub fn width(&self) -> Option<f32> {
        match &self.kind {
            ElementKind::Image { size, .. } | ElementKind::Rectangle { size, .. } => Some(size.x),
            ElementKind::Circle { diameter, .. } => Some(*diameter),
            ElementKind::Arrow { length } | ElementKind::Line { length } => Some(*length),
            ElementKind::Text { .. } => None,
        }
    }

    pub fn height(&self) -> Option<f32> {
        match &self.kind {
            ElementKind::Image { size, .. } | ElementKind::Rectangle { size, .. } => Some(size.y),
            ElementKind::Circle { diameter, .. } => Some(*diameter),
            _ => None,
        }
    }

    pub fn content(&self) -> Option<&str> {
        match &self.kind {
            ElementKind::Text { content, .. } => Some(content),
            _ => None,
        }
    }

    pub fn font_size(&self) -> Option<f32> {
        match &self.kind {
            ElementKind::Text { font_size, .. } => Some(*font_size),
            _ => None,
        }
    }

    pub fn src(&self) -> Option<&ImageSource> {
        match &self.kind {
            ElementKind::Image { src, .. } => Some(src),
            _ => None,
        }
    }

    pub fn original_src(&self) -> Option<&ImageSource> {
        match &self.kind {
            ElementKind::Image { original_src, .. } => Some(original_src),
            _ => None,
        }
    }

    pub fn fill(&self) -> Option<Fill> {
        match &self.kind {
            ElementKind::Rectangle { fill, .. } | ElementKind::Circle { fill, .. } => Some(*fill),
            _ => None,
        }
    }

    /// Render-time alpha multiplier in `0.0..=1.0`.
    pub fn alpha(&self) -> f32 {
        f32::from(self.opacity.min(100)) / 100.0
    }
}

/// Shallow patch merged into an element by [`crate::state::EditorModel::update_element`].
///
/// Fields that have no meaning for the target type are ignored, so a patch
/// can never turn an element into an invalid shape.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElementPatch {
    pub position: Option<Pos2>,
    pub rotation: Option<f32>,
    pub flip_x: Option<bool>,
    pub opacity: Option<u8>,
    pub z_index: Option<i32>,
    pub color: Option<Color32>,
    pub fill: Option<Fill>,
    pub width: Option<f32>,
    pub height: Option<f32>,
    pub content: Option<String>,
    pub font_size: Option<f32>,
    pub src: Option<ImageSource>,
}

impl ElementPatch {
    pub fn position(mut self, position: Pos2) -> Self {
        self.position = Some(position);
        self
    }

    pub fn rotation(mut self, degrees: f32) -> Self {
        self.rotation = Some(degrees);
        self
    }

    pub fn flip_x(mut self, flip: bool) -> Self {
        self.flip_x = Some(flip);
        self
    }

    pub fn opacity(mut self, opacity: u8) -> Self {
        self.opacity = Some(opacity);
        self
    }

    pub fn z_index(mut self, z_index: i32) -> Self {
        self.z_index = Some(z_index);
        self
    }

    pub fn color(mut self, color: Color32) -> Self {
        self.color = Some(color);
        self
    }

    pub fn fill(mut self, fill: Fill) -> Self {
        self.fill = Some(fill);
        self
    }

    pub fn size(mut self, width: f32, height: f32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn width(mut self, width: f32) -> Self {
        self.width = Some(width);
        self
    }

    pub fn font_size(mut self, font_size: f32) -> Self {
        self.font_size = Some(font_size);
        self
    }

    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn src(mut self, src: ImageSource) -> Self {
        self.src = Some(src);
        self
    }

    pub fn apply(self, element: &mut DesignElement) {
        if let Some(position) = self.position {
            element.position = position;
        }
        if let Some(rotation) = self.rotation {
            element.rotation = normalize_rotation(rotation);
        }
        if let Some(flip_x) = self.flip_x {
            element.flip_x = flip_x;
        }
        if let Some(opacity) = self.opacity {
            element.opacity = opacity.min(100);
        }
        if let Some(z_index) = self.z_index {
            element.z_index = z_index;
        }
        if let Some(color) = self.color {
            element.color = color;
        }

        match &mut element.kind {
            ElementKind::Image { src, size, .. } => {
                if let Some(width) = self.width {
                    size.x = width;
                }
                if let Some(height) = self.height {
                    size.y = height;
                }
                if let Some(new_src) = self.src {
                    *src = new_src;
                }
            }
            ElementKind::Text { content, font_size } => {
                if let Some(new_content) = self.content {
                    *content = new_content;
                }
                if let Some(new_size) = self.font_size {
                    *font_size = new_size;
                }
            }
            ElementKind::Arrow { length } | ElementKind::Line { length } => {
                if let Some(width) = self.width {
                    *length = width;
                }
            }
            ElementKind::Rectangle { size, fill } => {
                if let Some(width) = self.width {
                    size.x = width;
                }
                if let Some(height) = self.height {
                    size.y = height;
                }
                if let Some(new_fill) = self.fill {
                    *fill = new_fill;
                }
            }
            ElementKind::Circle { diameter, fill } => {
                if let Some(width) = self.width {
                    *diameter = width;
                }
                if let Some(new_fill) = self.fill {
                    *fill = new_fill;
                }
            }
        }
    }
}

/// Wraps degrees into `[0, 360)`.
pub fn normalize_rotation(degrees: f32) -> f32 {
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}
