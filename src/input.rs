// Global pointer and hotkey sampling through device_query, so the toggles
// work while some other application has focus. The overlay window itself
// never takes focus, which is why window-local key events are not enough.

use device_query::{DeviceQuery, DeviceState, Keycode};

use crate::types::Point;

/// Polls the OS for the pointer position and the currently-down keys.
pub struct GlobalInput {
    device: DeviceState,
}

impl GlobalInput {
    pub fn new() -> Self {
        Self {
            device: DeviceState::new(),
        }
    }

    /// Pointer position in global screen coordinates.
    pub fn pointer(&self) -> Point {
        let (x, y) = self.device.get_mouse().coords;
        Point::new(x as f32, y as f32)
    }

    /// Every key currently held down.
    pub fn keys(&self) -> Vec<Keycode> {
        self.device.get_keys()
    }
}

impl Default for GlobalInput {
    fn default() -> Self {
        Self::new()
    }
}

/// Turns a held key into a single firing on the press transition, since
/// polling sees the same key as down for many ticks in a row.
#[derive(Default)]
pub struct EdgeLatch {
    was_down: bool,
}

impl EdgeLatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// True exactly once per press.
    pub fn rising(&mut self, down: bool) -> bool {
        let fired = down && !self.was_down;
        self.was_down = down;
        fired
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edge_latch_fires_once_per_press() {
        let mut latch = EdgeLatch::new();
        let held = [false, true, true, true, false, false, true];
        let fired: Vec<bool> = held.iter().map(|&d| latch.rising(d)).collect();
        assert_eq!(fired, vec![false, true, false, false, false, false, true]);
    }

    #[test]
    fn test_edge_latch_starts_quiet() {
        let mut latch = EdgeLatch::new();
        assert!(!latch.rising(false));
    }
}
