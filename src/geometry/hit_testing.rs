use egui::{Pos2, Rect};

use super::ElementTransform;
use crate::element::DesignElement;
use crate::renderer::paint_order;

pub const HANDLE_RADIUS: f32 = 8.0;

/// True when `pos` (canvas space) lies on the element as drawn, honouring
/// rotation and flip.
pub fn hit_test(element: &DesignElement, pos: Pos2) -> bool {
    let local = ElementTransform::for_element(element).invert(pos);
    element.rect().contains(local)
}

/// The element painted on top at `pos`, if any.
pub fn topmost_element_at(elements: &[DesignElement], pos: Pos2) -> Option<&DesignElement> {
    paint_order(elements)
        .into_iter()
        .rev()
        .find(|element| hit_test(element, pos))
}

/// Corner positions of the drawn (rotated) element box, clockwise from the
/// top-left of the unrotated box.
pub fn transformed_corners(element: &DesignElement) -> [Pos2; 4] {
    let rect = element.rect();
    let transform = ElementTransform::for_element(element);
    [
        transform.apply(rect.left_top()),
        transform.apply(rect.right_top()),
        transform.apply(rect.right_bottom()),
        transform.apply(rect.left_bottom()),
    ]
}

/// Selection handle rects drawn at the four corners of an image element.
pub fn selection_handles(element: &DesignElement) -> Vec<Rect> {
    if !element.is_image() {
        return Vec::new();
    }
    transformed_corners(element)
        .into_iter()
        .map(|corner| Rect::from_center_size(corner, egui::Vec2::splat(HANDLE_RADIUS * 2.0)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{ElementId, ElementKind, Fill};
    use egui::{Color32, Vec2, pos2};

    fn rect_element(id: &str, pos: Pos2, size: Vec2, z: i32) -> DesignElement {
        DesignElement {
            id: ElementId::from(id),
            position: pos,
            rotation: 0.0,
            flip_x: false,
            opacity: 100,
            z_index: z,
            color: Color32::BLACK,
            kind: ElementKind::Rectangle {
                size,
                fill: Fill::Transparent,
            },
        }
    }

    #[test]
    fn test_rotated_hit_test() {
        // 200x20 bar centered at (100, 10); rotated 90° it becomes vertical
        let mut bar = rect_element("bar", pos2(0.0, 0.0), Vec2::new(200.0, 20.0), 1);
        assert!(hit_test(&bar, pos2(190.0, 10.0)));
        assert!(!hit_test(&bar, pos2(100.0, 90.0)));

        bar.rotation = 90.0;
        assert!(!hit_test(&bar, pos2(190.0, 10.0)));
        assert!(hit_test(&bar, pos2(100.0, 90.0)));
    }

    #[test]
    fn test_topmost_prefers_higher_z() {
        let elements = vec![
            rect_element("top", pos2(0.0, 0.0), Vec2::splat(100.0), 5),
            rect_element("bottom", pos2(0.0, 0.0), Vec2::splat(100.0), 1),
        ];
        let hit = topmost_element_at(&elements, pos2(50.0, 50.0)).unwrap();
        assert_eq!(hit.id.as_str(), "top");
        assert!(topmost_element_at(&elements, pos2(150.0, 50.0)).is_none());
    }

    #[test]
    fn test_ties_resolve_to_later_insertion() {
        let elements = vec![
            rect_element("first", pos2(0.0, 0.0), Vec2::splat(100.0), 2),
            rect_element("second", pos2(0.0, 0.0), Vec2::splat(100.0), 2),
        ];
        let hit = topmost_element_at(&elements, pos2(10.0, 10.0)).unwrap();
        assert_eq!(hit.id.as_str(), "second");
    }

    #[test]
    fn test_handles_only_for_images() {
        let shape = rect_element("r", Pos2::ZERO, Vec2::splat(50.0), 0);
        assert!(selection_handles(&shape).is_empty());
    }
}
