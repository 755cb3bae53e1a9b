use glam::Vec2;

/// Pointer travel (logical pixels) after which a press becomes a drag.
const DRAG_THRESHOLD: f32 = 4.0;

/// Result of processing a mouse-up event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum ClickResult {
    /// The press turned into a drag; nothing to pick.
    NoAction,
    /// A press and release without significant movement.
    Click {
        /// Release position in logical pixels.
        position: Vec2,
    },
}

/// Tracks pointer position and click-vs-drag state.
pub(crate) struct InputState {
    pub(crate) mouse_pos: Vec2,
    press_pos: Option<Vec2>,
    is_dragging: bool,
}

impl InputState {
    pub(crate) fn new() -> Self {
        Self {
            mouse_pos: Vec2::ZERO,
            press_pos: None,
            is_dragging: false,
        }
    }

    /// Record the press position.
    pub(crate) fn handle_mouse_down(&mut self) {
        self.press_pos = Some(self.mouse_pos);
        self.is_dragging = false;
    }

    /// Update the cursor and return the movement since the last update.
    /// Marks the press as a drag once it has travelled far enough.
    pub(crate) fn handle_mouse_position(&mut self, position: Vec2) -> Vec2 {
        let delta = position - self.mouse_pos;
        self.mouse_pos = position;
        if let Some(press) = self.press_pos {
            if position.distance(press) > DRAG_THRESHOLD {
                self.is_dragging = true;
            }
        }
        delta
    }

    /// Whether the current press has become a drag.
    pub(crate) fn is_dragging(&self) -> bool {
        self.is_dragging
    }

    /// Finish the press.
    pub(crate) fn process_mouse_up(&mut self) -> ClickResult {
        let was_pressed = self.press_pos.take().is_some();
        let was_dragging = std::mem::replace(&mut self.is_dragging, false);
        if !was_pressed || was_dragging {
            return ClickResult::NoAction;
        }
        ClickResult::Click {
            position: self.mouse_pos,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_jitter_is_still_a_click() {
        let mut state = InputState::new();
        let _ = state.handle_mouse_position(Vec2::new(10.0, 10.0));
        state.handle_mouse_down();
        let _ = state.handle_mouse_position(Vec2::new(11.0, 12.0));
        assert_eq!(
            state.process_mouse_up(),
            ClickResult::Click {
                position: Vec2::new(11.0, 12.0)
            }
        );
    }

    #[test]
    fn drag_suppresses_click() {
        let mut state = InputState::new();
        state.handle_mouse_down();
        let _ = state.handle_mouse_position(Vec2::new(50.0, 0.0));
        assert!(state.is_dragging());
        assert_eq!(state.process_mouse_up(), ClickResult::NoAction);
    }

    #[test]
    fn release_without_press_does_nothing() {
        let mut state = InputState::new();
        assert_eq!(state.process_mouse_up(), ClickResult::NoAction);
    }
}
