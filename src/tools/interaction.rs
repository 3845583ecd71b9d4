use egui::{Pos2, Rect, Vec2};
use log::debug;

use super::ToolMode;
use crate::command::Command;
use crate::element::{ElementId, ElementPatch};
use crate::geometry::{CropRegion, Viewport, normalized_rect, topmost_element_at};
use crate::input::{InputEvent, Shortcut};
use crate::raster::CropJob;
use crate::state::EditorModel;

/// Pointer gesture in progress.
#[derive(Debug, Clone, PartialEq)]
pub enum DragState {
    Idle,
    DraggingElement {
        element_id: ElementId,
        /// Pointer minus element origin at press time
        offset: Vec2,
        moved: bool,
    },
    DrawingCropRect {
        target: ElementId,
        start: Pos2,
        end: Pos2,
    },
}

/// A crop drag that is large enough and waits for confirmation.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingCrop {
    pub target: ElementId,
    pub drag: Rect,
    pub region: CropRegion,
}

impl PendingCrop {
    /// Region size for the confirmation prompt, e.g. `100 × 80`.
    pub fn size_label(&self) -> String {
        let size = self.region.canvas.size();
        format!("{} × {}", size.x.round(), size.y.round())
    }
}

/// Turns pointer and keyboard input into model mutations.
///
/// All positions it receives from [`InputEvent`]s are screen space and are
/// converted to canvas space through the viewport before touching the
/// model.
#[derive(Debug, Clone)]
pub struct InteractionController {
    tool: ToolMode,
    state: DragState,
    pending_crop: Option<PendingCrop>,
}

impl Default for InteractionController {
    fn default() -> Self {
        Self::new()
    }
}

impl InteractionController {
    pub fn new() -> Self {
        Self {
            tool: ToolMode::Select,
            state: DragState::Idle,
            pending_crop: None,
        }
    }

    pub fn tool(&self) -> ToolMode {
        self.tool
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    /// Switching tools abandons any crop in progress.
    pub fn set_tool(&mut self, tool: ToolMode) {
        if self.tool != tool {
            debug!("Tool mode {:?} -> {:?}", self.tool, tool);
        }
        self.tool = tool;
        if matches!(self.state, DragState::DrawingCropRect { .. }) {
            self.state = DragState::Idle;
        }
        self.pending_crop = None;
    }

    /// Live crop rectangle while drawing, or the one awaiting confirmation.
    pub fn crop_preview(&self) -> Option<Rect> {
        match &self.state {
            DragState::DrawingCropRect { start, end, .. } => Some(normalized_rect(*start, *end)),
            _ => self.pending_crop.as_ref().map(|pending| pending.region.canvas),
        }
    }

    pub fn pending_crop(&self) -> Option<&PendingCrop> {
        self.pending_crop.as_ref()
    }

    /// Feeds one input event. Returns whether the model changed.
    pub fn handle_event(&mut self, model: &mut EditorModel, event: &InputEvent, viewport: Viewport) -> bool {
        match event {
            InputEvent::PointerDown { position, button } if *button == egui::PointerButton::Primary => {
                self.pointer_down(model, viewport.to_canvas(*position));
                true
            }
            InputEvent::PointerMove {
                position,
                primary_down,
            } => *primary_down && self.pointer_move(model, viewport.to_canvas(*position)),
            InputEvent::PointerUp { position, button } if *button == egui::PointerButton::Primary => {
                self.pointer_up(model, viewport.to_canvas(*position))
            }
            InputEvent::Shortcut(shortcut) => self.shortcut(model, *shortcut),
            _ => false,
        }
    }

    /// Press at a canvas position. Selects the topmost element under the
    /// pointer, or clears the selection over empty canvas.
    pub fn pointer_down(&mut self, model: &mut EditorModel, pos: Pos2) {
        if self.pending_crop.is_some() {
            return;
        }
        let Some(element) = topmost_element_at(model.elements(), pos) else {
            model.clear_selection();
            self.state = DragState::Idle;
            return;
        };
        let element_id = element.id.clone();
        let origin = element.position;
        let is_image = element.is_image();
        model.select(Some(&element_id));

        self.state = if self.tool == ToolMode::Crop && is_image {
            DragState::DrawingCropRect {
                target: element_id,
                start: pos,
                end: pos,
            }
        } else {
            DragState::DraggingElement {
                element_id,
                offset: pos - origin,
                moved: false,
            }
        };
    }

    /// Drag update. Element moves are transient until release.
    pub fn pointer_move(&mut self, model: &mut EditorModel, pos: Pos2) -> bool {
        match &mut self.state {
            DragState::DraggingElement {
                element_id,
                offset,
                moved,
            } => {
                let changed = model.update_element(element_id, ElementPatch::default().position(pos - *offset));
                *moved |= changed;
                changed
            }
            DragState::DrawingCropRect { end, .. } => {
                *end = pos;
                false
            }
            DragState::Idle => false,
        }
    }

    /// Release. A drag that moved commits once; a crop drag that is large
    /// enough becomes a pending crop.
    pub fn pointer_up(&mut self, model: &mut EditorModel, pos: Pos2) -> bool {
        match std::mem::replace(&mut self.state, DragState::Idle) {
            DragState::DraggingElement { element_id, moved, .. } => {
                if moved {
                    model.commit();
                    debug!("Moved {}", element_id);
                }
                moved
            }
            DragState::DrawingCropRect { target, start, .. } => {
                let drag = normalized_rect(start, pos);
                let region = model
                    .find_element_by_id(&target)
                    .and_then(|element| CropRegion::new(element.rect(), drag));
                match region {
                    Some(region) => {
                        self.pending_crop = Some(PendingCrop { target, drag, region });
                    }
                    None => debug!("Crop region too small, discarded"),
                }
                false
            }
            DragState::Idle => false,
        }
    }

    /// Confirms the pending crop and returns to the select tool. `None` if
    /// nothing was pending or the target has gone.
    pub fn confirm_crop(&mut self, model: &EditorModel) -> Option<CropJob> {
        let pending = self.pending_crop.take()?;
        self.tool = ToolMode::Select;
        let element = model.find_element_by_id(&pending.target)?;
        CropJob::new(element, pending.drag)
    }

    pub fn cancel_crop(&mut self) {
        self.pending_crop = None;
        if matches!(self.state, DragState::DrawingCropRect { .. }) {
            self.state = DragState::Idle;
        }
    }

    pub fn shortcut(&mut self, model: &mut EditorModel, shortcut: Shortcut) -> bool {
        match shortcut {
            Shortcut::DeleteSelected => match model.selected_id().cloned() {
                Some(element_id) => Command::Delete { element_id }.execute(model),
                None => false,
            },
            Shortcut::Cancel => {
                model.clear_selection();
                self.tool = ToolMode::Select;
                self.state = DragState::Idle;
                self.pending_crop = None;
                false
            }
            Shortcut::Undo => {
                self.state = DragState::Idle;
                Command::Undo.execute(model)
            }
            Shortcut::DuplicateSelected => match model.selected_id().cloned() {
                Some(element_id) => Command::Duplicate { element_id }.execute(model),
                None => false,
            },
        }
    }
}
