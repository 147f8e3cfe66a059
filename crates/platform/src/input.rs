//! Held-key tracking for camera movement.

use corelib::camera::MoveInput;
use winit::keyboard::KeyCode;

#[derive(Clone, Copy, Debug, Default)]
pub struct InputState {
    keys: MoveInput,
}

impl InputState {
    /// Returns `false` for keys that do not drive the camera.
    pub fn set_key(&mut self, code: KeyCode, pressed: bool) -> bool {
        let slot = match code {
            KeyCode::KeyW => &mut self.keys.forward,
            KeyCode::KeyS => &mut self.keys.back,
            KeyCode::KeyA => &mut self.keys.left,
            KeyCode::KeyD => &mut self.keys.right,
            KeyCode::Space => &mut self.keys.up,
            KeyCode::ShiftLeft => &mut self.keys.down,
            _ => return false,
        };
        *slot = pressed;
        true
    }

    pub fn movement(&self) -> MoveInput {
        self.keys
    }

    /// Forget held keys, e.g. when focus is lost mid-press.
    pub fn clear(&mut self) {
        self.keys = MoveInput::default();
    }
}

/// Digit keys `1`..`9` toggle the visibility of scene objects `0`..`8`.
pub fn visibility_toggle(code: KeyCode) -> Option<u32> {
    let slot = match code {
        KeyCode::Digit1 => 0,
        KeyCode::Digit2 => 1,
        KeyCode::Digit3 => 2,
        KeyCode::Digit4 => 3,
        KeyCode::Digit5 => 4,
        KeyCode::Digit6 => 5,
        KeyCode::Digit7 => 6,
        KeyCode::Digit8 => 7,
        KeyCode::Digit9 => 8,
        _ => return None,
    };
    Some(slot)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wasd_space_shift_map_to_axes() {
        let mut input = InputState::default();
        assert!(input.set_key(KeyCode::KeyW, true));
        assert!(input.set_key(KeyCode::ShiftLeft, true));
        assert!(!input.set_key(KeyCode::KeyQ, true));

        let m = input.movement();
        assert!(m.forward && m.down);
        assert!(!m.back && !m.left && !m.right && !m.up);

        input.set_key(KeyCode::KeyW, false);
        assert!(!input.movement().forward);
    }

    #[test]
    fn digits_select_objects() {
        assert_eq!(visibility_toggle(KeyCode::Digit1), Some(0));
        assert_eq!(visibility_toggle(KeyCode::Digit9), Some(8));
        assert_eq!(visibility_toggle(KeyCode::Digit0), None);
        assert_eq!(visibility_toggle(KeyCode::KeyW), None);
    }

    #[test]
    fn clear_releases_everything() {
        let mut input = InputState::default();
        input.set_key(KeyCode::KeyA, true);
        input.set_key(KeyCode::Space, true);
        input.clear();
        assert!(!input.movement().any());
    }
}
