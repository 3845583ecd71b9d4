use egui::{Color32, Pos2, Vec2};
use log::info;

use crate::element::factory::{self, ShapeKind};
use crate::element::{
    DesignElement, ElementId, ElementKind, ElementPatch, Fill, ImageSource, MIN_ELEMENT_SIZE, MIN_FONT_SIZE,
    normalize_rotation,
};
use crate::state::EditorModel;

/// Direction for layer reordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerDirection {
    Up,
    Down,
}

/// User-invocable board actions.
///
/// Discrete actions commit to history when they change something.
/// `SetOpacity` is the exception: slider ticks are transient and the host
/// sends `Commit` when the gesture ends.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    AddText {
        content: String,
        color: Color32,
    },
    AddShape {
        shape: ShapeKind,
        position: Pos2,
        color: Color32,
        fill: Fill,
    },
    AddProductImage {
        src: ImageSource,
        natural_size: Option<Vec2>,
    },
    Resize {
        element_id: ElementId,
        delta: f32,
    },
    Rotate {
        element_id: ElementId,
        degrees: f32,
    },
    Flip {
        element_id: ElementId,
    },
    SetOpacity {
        element_id: ElementId,
        opacity: u8,
    },
    MoveLayer {
        element_id: ElementId,
        direction: LayerDirection,
    },
    Delete {
        element_id: ElementId,
    },
    Duplicate {
        element_id: ElementId,
    },
    Undo,
    Commit,
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::AddText { .. } => "Add Text",
            Command::AddShape { .. } => "Add Shape",
            Command::AddProductImage { .. } => "Add Product Image",
            Command::Resize { .. } => "Resize",
            Command::Rotate { .. } => "Rotate",
            Command::Flip { .. } => "Flip",
            Command::SetOpacity { .. } => "Set Opacity",
            Command::MoveLayer { .. } => "Move Layer",
            Command::Delete { .. } => "Delete",
            Command::Duplicate { .. } => "Duplicate",
            Command::Undo => "Undo",
            Command::Commit => "Commit",
        }
    }

    /// Returns true if the command is committed to history on success
    pub fn commits(&self) -> bool {
        !matches!(self, Command::SetOpacity { .. } | Command::Undo)
    }

    /// Applies the command. Returns whether the board changed; invalid input
    /// and unknown ids are silently ignored.
    pub fn execute(self, model: &mut EditorModel) -> bool {
        let name = self.name();
        let changed = match self {
            Command::AddText { content, color } => match factory::create_text(&content, color) {
                Some(draft) => {
                    model.add_element(draft);
                    model.commit();
                    true
                }
                None => false,
            },
            Command::AddShape {
                shape,
                position,
                color,
                fill,
            } => {
                model.add_element(factory::create_shape(shape, position, color, fill));
                model.commit();
                true
            }
            Command::AddProductImage { src, natural_size } => {
                if src.is_empty() {
                    false
                } else {
                    model.add_element(factory::product_image(src, natural_size));
                    model.commit();
                    true
                }
            }
            Command::Resize { element_id, delta } => {
                settle_with(model, &element_id, |element| resize(element, delta))
            }
            Command::Rotate {
                element_id,
                degrees,
            } => settle_with(model, &element_id, |element| rotate(element, degrees)),
            Command::Flip { element_id } => {
                settle_with(model, &element_id, |element| element.flip_x = !element.flip_x)
            }
            Command::SetOpacity {
                element_id,
                opacity,
            } => model.update_element(&element_id, ElementPatch::default().opacity(opacity)),
            Command::MoveLayer {
                element_id,
                direction,
            } => settle_with(model, &element_id, |element| move_layer(element, direction)),
            Command::Delete { element_id } => model.delete_element(&element_id),
            Command::Duplicate { element_id } => model.duplicate_element(&element_id).is_some(),
            Command::Undo => model.undo(),
            Command::Commit => {
                model.commit();
                true
            }
        };
        if changed {
            info!("Executed command: {}", name);
        }
        changed
    }
}

/// Mutates one element in place and commits if it exists.
fn settle_with(
    model: &mut EditorModel,
    element_id: &ElementId,
    mutate: impl FnOnce(&mut DesignElement),
) -> bool {
    if !model.modify_element(element_id, mutate) {
        return false;
    }
    model.commit();
    true
}

/// Applies a signed size delta with per-type semantics and floors.
///
/// Images and rectangles keep their aspect ratio, circles stay round, text
/// scales its font by `delta / 5`, arrows and lines change length.
pub fn resize(element: &mut DesignElement, delta: f32) {
    match &mut element.kind {
        ElementKind::Image { size, .. } | ElementKind::Rectangle { size, .. } => {
            let ratio = if size.y > 0.0 { size.x / size.y } else { 1.0 };
            size.x = (size.x + delta).max(MIN_ELEMENT_SIZE);
            size.y = (size.y + delta / ratio).max(MIN_ELEMENT_SIZE);
        }
        ElementKind::Circle { diameter, .. } => {
            *diameter = (*diameter + delta).max(MIN_ELEMENT_SIZE);
        }
        ElementKind::Text { font_size, .. } => {
            *font_size = (*font_size + delta / 5.0).max(MIN_FONT_SIZE);
        }
        ElementKind::Arrow { length } | ElementKind::Line { length } => {
            *length = (*length + delta).max(MIN_ELEMENT_SIZE);
        }
    }
}

pub fn rotate(element: &mut DesignElement, degrees: f32) {
    element.rotation = normalize_rotation(element.rotation + degrees);
}

/// Shifts z-index by one, floored at 0. Siblings are not renumbered.
pub fn move_layer(element: &mut DesignElement, direction: LayerDirection) {
    element.z_index = match direction {
        LayerDirection::Up => element.z_index + 1,
        LayerDirection::Down => (element.z_index - 1).max(0),
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::ElementId;
    use egui::pos2;

    fn element(kind: ElementKind) -> DesignElement {
        DesignElement {
            id: ElementId::from("e"),
            position: pos2(0.0, 0.0),
            rotation: 0.0,
            flip_x: false,
            opacity: 100,
            z_index: 0,
            color: Color32::BLACK,
            kind,
        }
    }

    #[test]
    fn test_resize_preserves_aspect_ratio() {
        let mut image = element(ElementKind::Rectangle {
            size: Vec2::new(100.0, 50.0),
            fill: Fill::Transparent,
        });
        resize(&mut image, 20.0);
        assert_eq!(image.size(), Vec2::new(120.0, 60.0));
    }

    #[test]
    fn test_text_resize_scales_font() {
        let mut text = element(ElementKind::Text {
            content: "hi".into(),
            font_size: 24.0,
        });
        resize(&mut text, 20.0);
        assert_eq!(text.font_size(), Some(28.0));
    }

    #[test]
    fn test_layer_down_floors_at_zero() {
        let mut e = element(ElementKind::Line { length: 150.0 });
        move_layer(&mut e, LayerDirection::Down);
        assert_eq!(e.z_index, 0);
        move_layer(&mut e, LayerDirection::Up);
        assert_eq!(e.z_index, 1);
    }

    #[test]
    fn test_rotate_wraps() {
        let mut e = element(ElementKind::Arrow { length: 100.0 });
        rotate(&mut e, 350.0);
        rotate(&mut e, 15.0);
        assert_eq!(e.rotation, 5.0);
    }
}
