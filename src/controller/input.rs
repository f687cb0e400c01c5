/// Platform-agnostic input handling system
use std::collections::HashSet;

use glam::Vec2;

use crate::model::InputIntent;

/// Platform-independent input events
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    // Keyboard events
    KeyDown(String),
    KeyUp(String),

    // Pointer events
    PointerDrag { dx: f32, dy: f32 },
    Wheel { delta_y: f32 },

    // Window events
    FocusLost,
}

/// Single characters are stored lowercase so a key released with a different
/// modifier state than it was pressed with still clears
pub fn normalize_key(key: &str) -> String {
    let mut chars = key.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => c.to_lowercase().collect(),
        _ => key.to_owned(),
    }
}

/// Held keys plus pointer deltas accumulated since the last frame.
/// Keys are sampled every frame; deltas are consumed once.
#[derive(Debug, Default)]
pub struct InputState {
    pub pressed_keys: HashSet<String>,
    pub drag_delta: Vec2,
    pub wheel_delta: f32,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process an input event and update state
    pub fn process_event(&mut self, event: &InputEvent) {
        match event {
            InputEvent::KeyDown(key) => {
                self.pressed_keys.insert(normalize_key(key));
            }
            InputEvent::KeyUp(key) => {
                self.pressed_keys.remove(&normalize_key(key));
            }
            InputEvent::PointerDrag { dx, dy } => {
                let d = Vec2::new(*dx, *dy);
                if d.is_finite() {
                    self.drag_delta += d;
                } else {
                    tracing::warn!(?d, "dropping non-finite pointer delta");
                }
            }
            InputEvent::Wheel { delta_y } => {
                if delta_y.is_finite() {
                    self.wheel_delta += delta_y;
                } else {
                    tracing::warn!(delta_y, "dropping non-finite wheel delta");
                }
            }
            InputEvent::FocusLost => {
                self.clear_keys();
            }
        }
    }

    pub fn is_key_pressed(&self, key: &str) -> bool {
        self.pressed_keys.contains(&normalize_key(key))
    }

    pub fn clear_keys(&mut self) {
        self.pressed_keys.clear();
    }

    pub fn clear(&mut self) {
        self.clear_keys();
        self.drag_delta = Vec2::ZERO;
        self.wheel_delta = 0.0;
    }

    pub fn consume_drag(&mut self) -> Vec2 {
        std::mem::take(&mut self.drag_delta)
    }

    pub fn consume_wheel(&mut self) -> f32 {
        std::mem::take(&mut self.wheel_delta)
    }
}

/// Key mapping configuration
#[derive(Debug, Clone)]
pub struct KeyBindings {
    pub forward: String,
    pub backward: String,
    pub left: String,
    pub right: String,
    pub jump: String,
    pub sprint: String,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            forward: "w".to_string(),
            backward: "s".to_string(),
            left: "a".to_string(),
            right: "d".to_string(),
            jump: " ".to_string(),
            sprint: "Shift".to_string(),
        }
    }
}

/// Turns held keys into a per-frame `InputIntent`
#[derive(Debug, Clone)]
pub struct InputProcessor {
    bindings: KeyBindings,
    jump_was_held: bool,
}

impl Default for InputProcessor {
    fn default() -> Self {
        Self::new(KeyBindings::default())
    }
}

impl InputProcessor {
    pub fn new(bindings: KeyBindings) -> Self {
        Self { bindings, jump_was_held: false }
    }

    fn held(&self, input: &InputState, binding: &str, alt: &str) -> bool {
        input.is_key_pressed(binding) || input.is_key_pressed(alt)
    }

    pub fn is_moving_forward(&self, input: &InputState) -> bool {
        self.held(input, &self.bindings.forward, "ArrowUp")
    }

    pub fn is_moving_backward(&self, input: &InputState) -> bool {
        self.held(input, &self.bindings.backward, "ArrowDown")
    }

    pub fn is_moving_left(&self, input: &InputState) -> bool {
        self.held(input, &self.bindings.left, "ArrowLeft")
    }

    pub fn is_moving_right(&self, input: &InputState) -> bool {
        self.held(input, &self.bindings.right, "ArrowRight")
    }

    pub fn is_jumping(&self, input: &InputState) -> bool {
        self.held(input, &self.bindings.jump, "Space")
    }

    pub fn is_sprinting(&self, input: &InputState) -> bool {
        input.is_key_pressed(&self.bindings.sprint)
    }

    /// Sum signed axis contributions; opposite keys cancel. Left un-normalized.
    pub fn direction(&self, input: &InputState) -> Vec2 {
        let mut dir = Vec2::ZERO;
        if self.is_moving_forward(input) {
            dir.y += 1.0;
        }
        if self.is_moving_backward(input) {
            dir.y -= 1.0;
        }
        if self.is_moving_right(input) {
            dir.x += 1.0;
        }
        if self.is_moving_left(input) {
            dir.x -= 1.0;
        }
        dir
    }

    /// Build this frame's intent; jump fires only on the frame the key goes down
    pub fn intent(&mut self, input: &InputState) -> InputIntent {
        let jump_held = self.is_jumping(input);
        let jump = jump_held && !self.jump_was_held;
        self.jump_was_held = jump_held;
        InputIntent {
            direction: self.direction(input),
            sprint: self.is_sprinting(input),
            jump,
        }
    }

    pub fn reset(&mut self) {
        self.jump_was_held = false;
    }
}

#[cfg(target_arch = "wasm32")]
pub mod wasm {
    use super::*;
    use web_sys::{Event, KeyboardEvent, MouseEvent};

    pub fn keyboard_event_to_input(e: &KeyboardEvent, is_down: bool) -> InputEvent {
        let key = e.key();
        if is_down {
            InputEvent::KeyDown(key)
        } else {
            InputEvent::KeyUp(key)
        }
    }

    pub fn mouse_drag_to_input(e: &MouseEvent) -> InputEvent {
        InputEvent::PointerDrag {
            dx: e.movement_x() as f32,
            dy: e.movement_y() as f32,
        }
    }

    pub fn mouse_wheel_to_input(e: &Event) -> Option<InputEvent> {
        let js_val = wasm_bindgen::JsValue::from(e.clone());
        if let Ok(delta_y) = js_sys::Reflect::get(&js_val, &wasm_bindgen::JsValue::from_str("deltaY")) {
            if let Some(dy) = delta_y.as_f64() {
                return Some(InputEvent::Wheel { delta_y: dy as f32 });
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn held(keys: &[&str]) -> InputState {
        let mut input = InputState::new();
        for k in keys {
            input.process_event(&InputEvent::KeyDown(k.to_string()));
        }
        input
    }

    #[test]
    fn test_direction_sums_axes() {
        let p = InputProcessor::default();
        assert_eq!(p.direction(&held(&["w"])), Vec2::new(0.0, 1.0));
        assert_eq!(p.direction(&held(&["w", "d"])), Vec2::new(1.0, 1.0));
        assert_eq!(p.direction(&held(&["a", "d"])), Vec2::ZERO);
        assert_eq!(p.direction(&held(&["ArrowDown", "ArrowLeft"])), Vec2::new(-1.0, -1.0));
        assert_eq!(p.direction(&held(&["W"])), Vec2::new(0.0, 1.0));
    }

    #[test]
    fn test_jump_is_edge_triggered() {
        let mut p = InputProcessor::default();
        let mut input = held(&[" "]);
        assert!(p.intent(&input).jump);
        assert!(!p.intent(&input).jump, "holding must not re-fire");
        input.process_event(&InputEvent::KeyUp(" ".into()));
        assert!(!p.intent(&input).jump);
        input.process_event(&InputEvent::KeyDown(" ".into()));
        assert!(p.intent(&input).jump);
    }

    #[test]
    fn test_keys_are_sampled_not_consumed() {
        let mut p = InputProcessor::default();
        let input = held(&["w", "Shift"]);
        for _ in 0..3 {
            let intent = p.intent(&input);
            assert!(intent.sprint);
            assert_eq!(intent.direction, Vec2::Y);
        }
    }

    #[test]
    fn test_deltas_accumulate_and_consume_once() {
        let mut input = InputState::new();
        input.process_event(&InputEvent::PointerDrag { dx: 2.0, dy: 1.0 });
        input.process_event(&InputEvent::PointerDrag { dx: 3.0, dy: -1.0 });
        input.process_event(&InputEvent::PointerDrag { dx: f32::NAN, dy: 0.0 });
        input.process_event(&InputEvent::Wheel { delta_y: 100.0 });
        assert_eq!(input.consume_drag(), Vec2::new(5.0, 0.0));
        assert_eq!(input.consume_drag(), Vec2::ZERO);
        assert_eq!(input.consume_wheel(), 100.0);
        assert_eq!(input.consume_wheel(), 0.0);
    }

    #[test]
    fn test_shifted_press_cleared_by_plain_release() {
        let p = InputProcessor::default();
        let mut input = held(&["Shift", "W"]);
        assert_eq!(p.direction(&input), Vec2::Y);
        input.process_event(&InputEvent::KeyUp("Shift".into()));
        input.process_event(&InputEvent::KeyUp("w".into()));
        assert_eq!(p.direction(&input), Vec2::ZERO);
        assert_eq!(input.pressed_keys.len(), 0);
    }

    #[test]
    fn test_normalize_key_keeps_named_keys() {
        assert_eq!(normalize_key("W"), "w");
        assert_eq!(normalize_key(" "), " ");
        assert_eq!(normalize_key("Shift"), "Shift");
        assert_eq!(normalize_key("ArrowUp"), "ArrowUp");
    }

    #[test]
    fn test_focus_lost_releases_keys() {
        let mut input = held(&["w", "Shift"]);
        input.process_event(&InputEvent::FocusLost);
        assert!(input.pressed_keys.is_empty());
    }
}
