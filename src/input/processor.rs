//! Converts raw platform events into engine commands.
//!
//! The `InputProcessor` owns all transient input state (pointer tracking,
//! click-vs-drag detection) and the key-binding map. It is the only thing
//! that sits between raw window events and the engine's
//! [`execute`](crate::XrayEngine::execute) method.

use glam::Vec2;

use super::event::{InputEvent, MouseButton};
use super::mouse::{ClickResult, InputState};
use crate::engine::command::EngineCommand;
use crate::options::KeybindingOptions;

/// Converts raw window events into [`EngineCommand`]s.
///
/// # Usage
///
/// ```ignore
/// for cmd in input_processor.handle_event(event) {
///     engine.execute(cmd);
/// }
///
/// if let Some(cmd) = input_processor.handle_key_press("Space") {
///     engine.execute(cmd);
/// }
/// ```
pub struct InputProcessor {
    /// Pointer tracking and click/drag state.
    state: InputState,
    /// Whether the primary mouse button is currently held.
    mouse_pressed: bool,
    /// Key string → action mapping.
    key_bindings: KeybindingOptions,
}

impl InputProcessor {
    /// Create a new processor with default key bindings.
    #[must_use]
    pub fn new() -> Self {
        Self::with_key_bindings(KeybindingOptions::default())
    }

    /// Create a processor with custom key bindings.
    #[must_use]
    pub fn with_key_bindings(key_bindings: KeybindingOptions) -> Self {
        Self {
            state: InputState::new(),
            mouse_pressed: false,
            key_bindings,
        }
    }

    /// Current cursor position in logical pixels.
    #[must_use]
    pub fn mouse_pos(&self) -> Vec2 {
        self.state.mouse_pos
    }

    /// Whether the primary mouse button is pressed.
    #[must_use]
    pub fn mouse_pressed(&self) -> bool {
        self.mouse_pressed
    }

    /// Replace the key bindings.
    pub fn set_key_bindings(&mut self, key_bindings: KeybindingOptions) {
        self.key_bindings = key_bindings;
    }

    /// Look up a key press and return the corresponding command, if bound.
    #[must_use]
    pub fn handle_key_press(&self, key: &str) -> Option<EngineCommand> {
        self.key_bindings.lookup(key).map(|action| action.to_command())
    }

    /// Process a raw input event into zero or more commands.
    pub fn handle_event(&mut self, event: InputEvent) -> Vec<EngineCommand> {
        match event {
            InputEvent::CursorMoved { x, y } => self.handle_cursor_moved(x, y),
            InputEvent::MouseButton { button, pressed } => self
                .handle_mouse_button(button, pressed)
                .into_iter()
                .collect(),
            InputEvent::Scroll { delta } => {
                vec![EngineCommand::Zoom { delta }]
            }
        }
    }

    /// Cursor moved: always feeds the reveal pointer; rotates the camera
    /// while dragging.
    fn handle_cursor_moved(&mut self, x: f32, y: f32) -> Vec<EngineCommand> {
        let delta = self.state.handle_mouse_position(Vec2::new(x, y));
        let mut commands = vec![EngineCommand::PointerMoved { x, y }];
        if self.mouse_pressed && self.state.is_dragging() {
            commands.push(EngineCommand::RotateCamera { delta });
        }
        commands
    }

    /// Mouse button press/release; a release without a drag is a click.
    fn handle_mouse_button(
        &mut self,
        button: MouseButton,
        pressed: bool,
    ) -> Option<EngineCommand> {
        if button != MouseButton::Left {
            return None;
        }

        if pressed {
            self.state.handle_mouse_down();
            self.mouse_pressed = true;
            return None;
        }

        self.mouse_pressed = false;
        match self.state.process_mouse_up() {
            ClickResult::NoAction => None,
            ClickResult::Click { position } => Some(EngineCommand::Click {
                x: position.x,
                y: position.y,
            }),
        }
    }
}

impl Default for InputProcessor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::AnatomyContext;

    fn press(processor: &mut InputProcessor, pressed: bool) -> Vec<EngineCommand> {
        processor.handle_event(InputEvent::MouseButton {
            button: MouseButton::Left,
            pressed,
        })
    }

    #[test]
    fn cursor_moves_always_reach_the_pointer() {
        let mut processor = InputProcessor::new();
        let cmds =
            processor.handle_event(InputEvent::CursorMoved { x: 5.0, y: 6.0 });
        assert_eq!(cmds, vec![EngineCommand::PointerMoved { x: 5.0, y: 6.0 }]);
    }

    #[test]
    fn click_without_drag() {
        let mut processor = InputProcessor::new();
        let _ = processor
            .handle_event(InputEvent::CursorMoved { x: 40.0, y: 30.0 });
        assert!(press(&mut processor, true).is_empty());
        let cmds = press(&mut processor, false);
        assert_eq!(cmds, vec![EngineCommand::Click { x: 40.0, y: 30.0 }]);
    }

    #[test]
    fn drag_rotates_and_suppresses_click() {
        let mut processor = InputProcessor::new();
        let _ = press(&mut processor, true);
        let cmds = processor
            .handle_event(InputEvent::CursorMoved { x: 30.0, y: 0.0 });
        assert!(cmds.iter().any(|c| matches!(c, EngineCommand::RotateCamera { .. })));
        assert!(press(&mut processor, false).is_empty());
    }

    #[test]
    fn right_button_is_ignored() {
        let mut processor = InputProcessor::new();
        let cmds = processor.handle_event(InputEvent::MouseButton {
            button: MouseButton::Right,
            pressed: false,
        });
        assert!(cmds.is_empty());
    }

    #[test]
    fn default_key_bindings() {
        let processor = InputProcessor::new();
        assert_eq!(
            processor.handle_key_press("Space"),
            Some(EngineCommand::ToggleExpand)
        );
        assert_eq!(
            processor.handle_key_press("Digit3"),
            Some(EngineCommand::SwitchContext {
                context: AnatomyContext::FullBody
            })
        );
        assert_eq!(processor.handle_key_press("KeyZ"), None);
    }
}
