//! Drawing for the interactive view and the export surface.
//!
//! Both paths paint the same [`Primitive`]s in the same order, so the
//! exported PNG matches what is on screen.

pub mod export;
pub mod texture_manager;
pub mod view;

use std::borrow::Cow;

use egui::{Color32, Pos2, Vec2};

use crate::element::{
    ARROW_HEAD_HALF_WIDTH, ARROW_HEAD_LENGTH, DesignElement, ElementKind, STROKE_WIDTH,
};
use crate::geometry::ElementTransform;

pub use export::{ExportedImage, Exporter};
pub use texture_manager::TextureManager;
pub use view::CanvasView;

// The arrow shaft stops short of the tip so it does not poke through the head
const ARROW_SHAFT_INSET: f32 = 10.0;

/// Elements sorted by ascending z-index. The sort is stable, so ties keep
/// insertion order and later elements paint on top.
pub fn paint_order(elements: &[DesignElement]) -> Vec<&DesignElement> {
    let mut ordered: Vec<&DesignElement> = elements.iter().collect();
    ordered.sort_by_key(|element| element.z_index);
    ordered
}

fn is_rtl(ch: char) -> bool {
    matches!(ch, '\u{0590}'..='\u{08FF}' | '\u{FB1D}'..='\u{FDFF}' | '\u{FE70}'..='\u{FEFF}')
}

/// Reorders text containing Hebrew or Arabic into left-to-right drawing
/// order: right-to-left runs are reversed, and when the first strong
/// character is right-to-left the runs themselves are reversed too.
/// Neutral characters stay with the run before them.
pub fn visual_order(text: &str) -> Cow<'_, str> {
    if !text.chars().any(is_rtl) {
        return Cow::Borrowed(text);
    }

    let mut runs: Vec<(bool, Vec<char>)> = Vec::new();
    for ch in text.chars() {
        let direction = if is_rtl(ch) {
            Some(true)
        } else if ch.is_alphanumeric() {
            Some(false)
        } else {
            None
        };
        let extends_run = match (direction, runs.last()) {
            (_, None) => false,
            (None, Some(_)) => true,
            (Some(rtl), Some((current, _))) => *current == rtl,
        };
        match runs.last_mut() {
            Some((_, chars)) if extends_run => chars.push(ch),
            _ => runs.push((direction.unwrap_or(false), vec![ch])),
        }
    }

    if text.chars().find(|ch| ch.is_alphanumeric()).is_some_and(is_rtl) {
        runs.reverse();
    }
    runs.into_iter()
        .flat_map(|(rtl, mut chars)| {
            if rtl {
                chars.reverse();
            }
            chars
        })
        .collect::<String>()
        .into()
}

/// Vector geometry of a shape element, already rotated and flipped into
/// canvas space.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Segment {
        from: Pos2,
        to: Pos2,
        width: f32,
        color: Color32,
    },
    Polygon {
        points: Vec<Pos2>,
        fill: Option<Color32>,
        stroke: Option<Color32>,
    },
    Circle {
        center: Pos2,
        radius: f32,
        fill: Option<Color32>,
        stroke: Color32,
    },
}

/// Primitives for arrows, lines, rectangles and circles. Images and text
/// are drawn by each path directly and yield nothing here.
pub fn shape_primitives(element: &DesignElement) -> Vec<Primitive> {
    let transform = ElementTransform::for_element(element);
    let rect = element.rect();
    let color = element.color;
    let mid_y = rect.center().y;

    match &element.kind {
        ElementKind::Line { length } => vec![Primitive::Segment {
            from: transform.apply(Pos2::new(rect.min.x, mid_y)),
            to: transform.apply(Pos2::new(rect.min.x + length, mid_y)),
            width: STROKE_WIDTH,
            color,
        }],
        ElementKind::Arrow { length } => {
            let tip = Pos2::new(rect.min.x + length, mid_y);
            let base = tip - Vec2::new(ARROW_HEAD_LENGTH, 0.0);
            vec![
                Primitive::Segment {
                    from: transform.apply(Pos2::new(rect.min.x, mid_y)),
                    to: transform.apply(tip - Vec2::new(ARROW_SHAFT_INSET, 0.0)),
                    width: STROKE_WIDTH,
                    color,
                },
                Primitive::Polygon {
                    points: vec![
                        transform.apply(tip),
                        transform.apply(base - Vec2::new(0.0, ARROW_HEAD_HALF_WIDTH)),
                        transform.apply(base + Vec2::new(0.0, ARROW_HEAD_HALF_WIDTH)),
                    ],
                    fill: Some(color),
                    stroke: None,
                },
            ]
        }
        ElementKind::Rectangle { fill, .. } => vec![Primitive::Polygon {
            points: vec![
                transform.apply(rect.left_top()),
                transform.apply(rect.right_top()),
                transform.apply(rect.right_bottom()),
                transform.apply(rect.left_bottom()),
            ],
            fill: fill.color(),
            stroke: Some(color),
        }],
        ElementKind::Circle { diameter, fill } => vec![Primitive::Circle {
            center: transform.apply(rect.min + Vec2::splat(diameter / 2.0)),
            radius: diameter / 2.0,
            fill: fill.color(),
            stroke: color,
        }],
        ElementKind::Image { .. } | ElementKind::Text { .. } => Vec::new(),
    }
}
