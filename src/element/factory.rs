//! Type-specific defaults for new elements.
//!
//! Factories return an [`ElementDraft`]; the model assigns the id and the
//! default z-index when the draft is added.

use egui::{Color32, Pos2, Vec2};

use super::common::*;
use super::{DesignElement, ElementId, ElementKind, Fill, ImageSource};

/// An element that has not been inserted yet.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementDraft {
    pub kind: ElementKind,
    pub position: Pos2,
    pub color: Color32,
    pub rotation: f32,
    pub flip_x: bool,
    pub opacity: Option<u8>,
    pub z_index: Option<i32>,
}

impl ElementDraft {
    pub fn new(kind: ElementKind, position: Pos2) -> Self {
        Self {
            kind,
            position,
            color: Color32::BLACK,
            rotation: 0.0,
            flip_x: false,
            opacity: None,
            z_index: None,
        }
    }

    pub fn at(mut self, position: Pos2) -> Self {
        self.position = position;
        self
    }

    pub fn with_color(mut self, color: Color32) -> Self {
        self.color = color;
        self
    }

    pub fn with_z_index(mut self, z_index: i32) -> Self {
        self.z_index = Some(z_index);
        self
    }

    pub fn with_opacity(mut self, opacity: u8) -> Self {
        self.opacity = Some(opacity.min(100));
        self
    }

    pub(crate) fn build(self, id: ElementId, default_z_index: i32) -> DesignElement {
        DesignElement {
            id,
            position: self.position,
            rotation: super::normalize_rotation(self.rotation),
            flip_x: self.flip_x,
            opacity: self.opacity.unwrap_or(DEFAULT_OPACITY),
            z_index: self.z_index.unwrap_or(default_z_index),
            color: self.color,
            kind: self.kind,
        }
    }
}

/// Shapes that can be added from the toolbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    Arrow,
    Line,
    Rectangle,
    Circle,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 4] = [
        ShapeKind::Arrow,
        ShapeKind::Line,
        ShapeKind::Rectangle,
        ShapeKind::Circle,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ShapeKind::Arrow => "Arrow",
            ShapeKind::Line => "Line",
            ShapeKind::Rectangle => "Rectangle",
            ShapeKind::Circle => "Circle",
        }
    }
}

/// The seed element: product photo at (50, 50), 400×300, below everything.
pub fn base_product(src: ImageSource) -> DesignElement {
    DesignElement {
        id: ElementId::base_product(),
        position: BASE_PRODUCT_POSITION,
        rotation: 0.0,
        flip_x: false,
        opacity: DEFAULT_OPACITY,
        z_index: 0,
        color: Color32::BLACK,
        kind: ElementKind::Image {
            original_src: src.clone(),
            src,
            size: BASE_PRODUCT_SIZE,
        },
    }
}

pub fn create_image(src: ImageSource, position: Pos2, size: Vec2) -> ElementDraft {
    ElementDraft::new(
        ElementKind::Image {
            original_src: src.clone(),
            src,
            size,
        },
        position,
    )
}

/// Image picked from product search. When the natural size is known the
/// longest side is fitted to the default box so the aspect ratio survives.
pub fn product_image(src: ImageSource, natural_size: Option<Vec2>) -> ElementDraft {
    let size = natural_size
        .filter(|s| s.x > 0.0 && s.y > 0.0)
        .map(|s| s * (PRODUCT_IMAGE_SIZE / s.x.max(s.y)))
        .unwrap_or(Vec2::splat(PRODUCT_IMAGE_SIZE));
    create_image(src, PRODUCT_IMAGE_POSITION, size)
}

/// Text element, or `None` for empty/whitespace content.
pub fn create_text(content: &str, color: Color32) -> Option<ElementDraft> {
    if content.trim().is_empty() {
        return None;
    }
    let kind = ElementKind::Text {
        content: content.to_owned(),
        font_size: DEFAULT_FONT_SIZE,
    };
    Some(ElementDraft::new(kind, TEXT_POSITION).with_color(color))
}

pub fn create_shape(shape: ShapeKind, position: Pos2, color: Color32, fill: Fill) -> ElementDraft {
    let kind = match shape {
        ShapeKind::Arrow => ElementKind::Arrow {
            length: ARROW_LENGTH,
        },
        ShapeKind::Line => ElementKind::Line {
            length: LINE_LENGTH,
        },
        ShapeKind::Rectangle => ElementKind::Rectangle {
            size: RECTANGLE_SIZE,
            fill,
        },
        ShapeKind::Circle => ElementKind::Circle {
            diameter: CIRCLE_DIAMETER,
            fill,
        },
    };
    ElementDraft::new(kind, position).with_color(color)
}

/// Shape origin with a random offset so repeated adds don't stack exactly.
pub fn jittered_shape_origin() -> Pos2 {
    SHAPE_ORIGIN + Vec2::new(
        rand::random::<f32>() * SHAPE_JITTER,
        rand::random::<f32>() * SHAPE_JITTER,
    )
}
