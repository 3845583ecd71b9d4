//! Coordinate conversion and element transforms.
//!
//! Everything stored in the model is canvas-space: logical units that do not
//! change with zoom. Screen positions are divided by the zoom factor on the
//! way in and multiplied on the way out.

pub mod hit_testing;

use egui::{Pos2, Rect, Vec2};

use crate::element::{DesignElement, MIN_CROP_SIZE};

pub use hit_testing::{hit_test, selection_handles, topmost_element_at};

/// Converts a pointer position to canvas space.
pub fn screen_to_canvas(pointer: Pos2, canvas_origin: Pos2, zoom: f32) -> Pos2 {
    let zoom = sanitize_zoom(zoom);
    Pos2::new(
        (pointer.x - canvas_origin.x) / zoom,
        (pointer.y - canvas_origin.y) / zoom,
    )
}

pub fn canvas_to_screen(point: Pos2, canvas_origin: Pos2, zoom: f32) -> Pos2 {
    let zoom = sanitize_zoom(zoom);
    canvas_origin + point.to_vec2() * zoom
}

pub fn canvas_rect_to_screen(rect: Rect, canvas_origin: Pos2, zoom: f32) -> Rect {
    Rect::from_min_max(
        canvas_to_screen(rect.min, canvas_origin, zoom),
        canvas_to_screen(rect.max, canvas_origin, zoom),
    )
}

/// Where the canvas sits on screen and how far it is zoomed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub origin: Pos2,
    pub zoom: f32,
}

impl Viewport {
    pub fn new(origin: Pos2, zoom: f32) -> Self {
        Self { origin, zoom }
    }

    pub fn to_canvas(&self, pointer: Pos2) -> Pos2 {
        screen_to_canvas(pointer, self.origin, self.zoom)
    }

    pub fn to_screen(&self, point: Pos2) -> Pos2 {
        canvas_to_screen(point, self.origin, self.zoom)
    }

    pub fn rect_to_screen(&self, rect: Rect) -> Rect {
        canvas_rect_to_screen(rect, self.origin, self.zoom)
    }

    /// Canvas-space length as drawn on screen.
    pub fn scale(&self, length: f32) -> f32 {
        length * sanitize_zoom(self.zoom)
    }
}

fn sanitize_zoom(zoom: f32) -> f32 {
    if zoom.is_finite() && zoom > f32::EPSILON {
        zoom
    } else {
        1.0
    }
}

/// Rectangle spanned by two drag points, whatever their order.
pub fn normalized_rect(a: Pos2, b: Pos2) -> Rect {
    Rect::from_two_pos(a, b)
}

/// Rotation (about the bounding-box center) plus horizontal mirror.
///
/// `apply` maps a point of the unrotated element box to where it is drawn;
/// `invert` maps a drawn point back into the unrotated box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementTransform {
    pub center: Pos2,
    pub rotation_radians: f32,
    pub flip_x: bool,
}

impl ElementTransform {
    pub fn for_element(element: &DesignElement) -> Self {
        Self {
            center: element.center(),
            rotation_radians: element.rotation.to_radians(),
            flip_x: element.flip_x,
        }
    }

    pub fn is_identity(&self) -> bool {
        self.rotation_radians == 0.0 && !self.flip_x
    }

    pub fn apply(&self, point: Pos2) -> Pos2 {
        let mut d = point - self.center;
        if self.flip_x {
            d.x = -d.x;
        }
        self.center + rotate(d, self.rotation_radians)
    }

    pub fn invert(&self, point: Pos2) -> Pos2 {
        let mut d = rotate(point - self.center, -self.rotation_radians);
        if self.flip_x {
            d.x = -d.x;
        }
        self.center + d
    }
}

fn rotate(v: Vec2, radians: f32) -> Vec2 {
    let (sin, cos) = radians.sin_cos();
    Vec2::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
}

/// Crop rectangle after intersecting the drag with the target's box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropRegion {
    /// Region in canvas space; the new element is placed here.
    pub canvas: Rect,
    /// Same region relative to the target's top-left corner.
    pub local: Rect,
}

impl CropRegion {
    /// Intersects `drag` with `target`. Degenerate results (either side under
    /// the minimum crop size) yield `None`.
    pub fn new(target: Rect, drag: Rect) -> Option<Self> {
        let canvas = target.intersect(drag);
        if !is_crop_large_enough(canvas) {
            return None;
        }
        Some(Self {
            canvas,
            local: canvas.translate(-target.min.to_vec2()),
        })
    }

    /// Maps the local region into bitmap pixels using `natural / display`.
    /// The result is clamped to the bitmap and is at least 1×1.
    pub fn source_pixels(&self, display_size: Vec2, natural: [u32; 2]) -> PixelRect {
        let [natural_w, natural_h] = natural;
        let scale_x = natural_w as f32 / display_size.x.max(f32::EPSILON);
        let scale_y = natural_h as f32 / display_size.y.max(f32::EPSILON);

        let x = ((self.local.min.x * scale_x).round().max(0.0) as u32).min(natural_w.saturating_sub(1));
        let y = ((self.local.min.y * scale_y).round().max(0.0) as u32).min(natural_h.saturating_sub(1));
        let width = ((self.local.width() * scale_x).round() as u32)
            .clamp(1, natural_w.saturating_sub(x).max(1));
        let height = ((self.local.height() * scale_y).round() as u32)
            .clamp(1, natural_h.saturating_sub(y).max(1));

        PixelRect { x, y, width, height }
    }
}

pub fn is_crop_large_enough(rect: Rect) -> bool {
    rect.is_positive() && rect.width() >= MIN_CROP_SIZE && rect.height() >= MIN_CROP_SIZE
}

/// Integer rectangle in bitmap pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::pos2;

    fn approx(a: Pos2, b: Pos2) -> bool {
        (a - b).length() < 1e-3
    }

    #[test]
    fn test_screen_canvas_roundtrip_with_zoom() {
        let origin = pos2(100.0, 40.0);
        let canvas = screen_to_canvas(pos2(300.0, 240.0), origin, 2.0);
        assert_eq!(canvas, pos2(100.0, 100.0));
        assert_eq!(canvas_to_screen(canvas, origin, 2.0), pos2(300.0, 240.0));
    }

    #[test]
    fn test_zero_zoom_falls_back_to_identity() {
        assert_eq!(screen_to_canvas(pos2(10.0, 10.0), Pos2::ZERO, 0.0), pos2(10.0, 10.0));
    }

    #[test]
    fn test_transform_invert_undoes_apply() {
        let transform = ElementTransform {
            center: pos2(50.0, 50.0),
            rotation_radians: 37f32.to_radians(),
            flip_x: true,
        };
        let p = pos2(80.0, 20.0);
        assert!(approx(transform.invert(transform.apply(p)), p));
    }

    #[test]
    fn test_quarter_turn_about_center() {
        let transform = ElementTransform {
            center: pos2(0.0, 0.0),
            rotation_radians: 90f32.to_radians(),
            flip_x: false,
        };
        assert!(approx(transform.apply(pos2(10.0, 0.0)), pos2(0.0, 10.0)));
    }

    #[test]
    fn test_crop_region_intersects_target() {
        let target = Rect::from_min_size(pos2(50.0, 50.0), Vec2::new(400.0, 300.0));
        let drag = normalized_rect(pos2(400.0, 300.0), pos2(500.0, 380.0));
        let region = CropRegion::new(target, drag).unwrap();

        assert_eq!(region.canvas, Rect::from_min_max(pos2(400.0, 300.0), pos2(450.0, 350.0)));
        assert_eq!(region.local.min, pos2(350.0, 250.0));
    }

    #[test]
    fn test_degenerate_crop_rejected() {
        let target = Rect::from_min_size(Pos2::ZERO, Vec2::new(100.0, 100.0));
        assert!(CropRegion::new(target, Rect::from_min_size(pos2(5.0, 5.0), Vec2::new(9.0, 50.0))).is_none());
        assert!(CropRegion::new(target, Rect::from_min_size(pos2(200.0, 200.0), Vec2::new(50.0, 50.0))).is_none());
    }

    #[test]
    fn test_source_pixels_scale_to_natural_size() {
        let target = Rect::from_min_size(Pos2::ZERO, Vec2::new(400.0, 300.0));
        let region = CropRegion::new(target, Rect::from_min_size(pos2(100.0, 60.0), Vec2::new(100.0, 80.0))).unwrap();
        let px = region.source_pixels(Vec2::new(400.0, 300.0), [800, 600]);

        assert_eq!(px, PixelRect { x: 200, y: 120, width: 200, height: 160 });
    }
}
