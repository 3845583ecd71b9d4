use egui::{Context, Key, Modifiers, PointerButton, Pos2, Rect};

/// Board-wide keyboard bindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortcut {
    /// Delete or Backspace
    DeleteSelected,
    /// Escape: clear selection, back to select, drop any crop
    Cancel,
    /// Ctrl/Cmd+Z
    Undo,
    /// Ctrl/Cmd+D
    DuplicateSelected,
}

/// Maps a key press to a board shortcut.
pub fn shortcut_for(key: Key, modifiers: Modifiers) -> Option<Shortcut> {
    let command = modifiers.command || modifiers.ctrl || modifiers.mac_cmd;
    match key {
        Key::Delete | Key::Backspace => Some(Shortcut::DeleteSelected),
        Key::Escape => Some(Shortcut::Cancel),
        Key::Z if command => Some(Shortcut::Undo),
        Key::D if command => Some(Shortcut::DuplicateSelected),
        _ => None,
    }
}

/// Input events the board reacts to. Positions are in screen space.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    PointerDown { position: Pos2, button: PointerButton },
    PointerMove { position: Pos2, primary_down: bool },
    PointerUp { position: Pos2, button: PointerButton },
    Shortcut(Shortcut),
}

/// Turns raw egui input into [`InputEvent`]s for the canvas.
///
/// Presses only count when they start over the canvas; moves and releases
/// are always reported so a drag that leaves the canvas still ends.
#[derive(Debug, Default)]
pub struct InputHandler {
    last_pointer_pos: Option<Pos2>,
    canvas_rect: Option<Rect>,
}

impl InputHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_canvas_rect(&mut self, rect: Rect) {
        self.canvas_rect = Some(rect);
    }

    fn over_canvas(&self, pos: Pos2) -> bool {
        self.canvas_rect.is_some_and(|rect| rect.contains(pos))
    }

    /// Collects this frame's events. Keyboard shortcuts are skipped while a
    /// text field has focus, so Backspace edits text instead of deleting.
    pub fn process_input(&mut self, ctx: &Context) -> Vec<InputEvent> {
        let keyboard = !ctx.wants_keyboard_input();
        let mut events = Vec::new();

        ctx.input(|input| {
            let pos = input.pointer.interact_pos().or(input.pointer.hover_pos());

            if input.pointer.button_pressed(PointerButton::Primary) {
                if let Some(pos) = pos.filter(|p| self.over_canvas(*p)) {
                    events.push(InputEvent::PointerDown {
                        position: pos,
                        button: PointerButton::Primary,
                    });
                }
            }

            if let Some(pos) = pos {
                if Some(pos) != self.last_pointer_pos {
                    events.push(InputEvent::PointerMove {
                        position: pos,
                        primary_down: input.pointer.primary_down(),
                    });
                }
                self.last_pointer_pos = Some(pos);
            }

            if input.pointer.button_released(PointerButton::Primary) {
                if let Some(pos) = pos.or(self.last_pointer_pos) {
                    events.push(InputEvent::PointerUp {
                        position: pos,
                        button: PointerButton::Primary,
                    });
                }
            }

            if keyboard {
                for event in &input.events {
                    if let egui::Event::Key {
                        key,
                        pressed: true,
                        modifiers,
                        ..
                    } = event
                    {
                        if let Some(shortcut) = shortcut_for(*key, *modifiers) {
                            events.push(InputEvent::Shortcut(shortcut));
                        }
                    }
                }
            }
        });

        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shortcut_bindings() {
        assert_eq!(shortcut_for(Key::Backspace, Modifiers::NONE), Some(Shortcut::DeleteSelected));
        assert_eq!(shortcut_for(Key::Delete, Modifiers::NONE), Some(Shortcut::DeleteSelected));
        assert_eq!(shortcut_for(Key::Escape, Modifiers::NONE), Some(Shortcut::Cancel));
        assert_eq!(shortcut_for(Key::Z, Modifiers::COMMAND), Some(Shortcut::Undo));
        assert_eq!(shortcut_for(Key::D, Modifiers::CTRL), Some(Shortcut::DuplicateSelected));
        assert_eq!(shortcut_for(Key::Z, Modifiers::NONE), None);
        assert_eq!(shortcut_for(Key::D, Modifiers::SHIFT), None);
    }

    #[test]
    fn test_press_outside_canvas_is_ignored() {
        let ctx = Context::default();
        let mut handler = InputHandler::new();
        handler.set_canvas_rect(Rect::from_min_size(Pos2::new(100.0, 100.0), egui::vec2(50.0, 50.0)));

        let mut input = egui::RawInput::default();
        input.events.push(egui::Event::PointerMoved(Pos2::new(10.0, 10.0)));
        input.events.push(egui::Event::PointerButton {
            pos: Pos2::new(10.0, 10.0),
            button: PointerButton::Primary,
            pressed: true,
            modifiers: Modifiers::NONE,
        });

        let mut events = Vec::new();
        let _ = ctx.run(input, |ctx| events = handler.process_input(ctx));
        assert!(events.iter().all(|e| !matches!(e, InputEvent::PointerDown { .. })));
    }
}
