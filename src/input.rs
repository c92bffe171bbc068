//! Per-tick input snapshot.
//!
//! The simulation never reads the keyboard directly.  The front-end copies
//! held keys into an [`InputState`] once per frame (see
//! [`crate::plugin::keyboard_to_input_system`]) and passes it by reference
//! into every update, so tests can drive the ship with a hand-built state.

use bevy::math::Vec2;
use bevy::prelude::Resource;
use std::collections::HashMap;

/// Logical controls understood by the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Control {
    Up,
    Down,
    Left,
    Right,
    /// Hold for overdrive ("droplet" mode).
    Overdrive,
    /// Hold to show direction indicators.
    Scan,
    /// Release while the gear cue is lit to shift up.
    GearUp,
    ZoomIn,
    ZoomOut,
}

/// Map of currently held controls.  Absent entries read as "not held".
#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub struct InputState {
    held: HashMap<Control, bool>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a state where exactly `controls` are held.
    pub fn holding(controls: &[Control]) -> Self {
        let mut state = Self::default();
        for &control in controls {
            state.press(control);
        }
        state
    }

    pub fn set(&mut self, control: Control, held: bool) {
        self.held.insert(control, held);
    }

    pub fn press(&mut self, control: Control) {
        self.set(control, true);
    }

    pub fn release(&mut self, control: Control) {
        self.set(control, false);
    }

    pub fn is_held(&self, control: Control) -> bool {
        self.held.get(&control).copied().unwrap_or(false)
    }

    /// Forget every control (all read as released).
    pub fn clear(&mut self) {
        self.held.clear();
    }

    /// Raw thrust direction: one unit per held axis key, y-down.
    ///
    /// Not normalised, so diagonal input is `√2` long.
    pub fn thrust_axis(&self) -> Vec2 {
        let mut axis = Vec2::ZERO;
        if self.is_held(Control::Up) {
            axis.y -= 1.0;
        }
        if self.is_held(Control::Down) {
            axis.y += 1.0;
        }
        if self.is_held(Control::Left) {
            axis.x -= 1.0;
        }
        if self.is_held(Control::Right) {
            axis.x += 1.0;
        }
        axis
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_controls_read_as_released() {
        let input = InputState::new();
        assert!(!input.is_held(Control::Overdrive));
        assert_eq!(input.thrust_axis(), Vec2::ZERO);
    }

    #[test]
    fn explicit_false_reads_as_released() {
        let mut input = InputState::holding(&[Control::Scan]);
        input.release(Control::Scan);
        assert!(!input.is_held(Control::Scan));
    }

    #[test]
    fn up_is_negative_y() {
        let input = InputState::holding(&[Control::Up]);
        assert_eq!(input.thrust_axis(), Vec2::new(0.0, -1.0));
    }

    #[test]
    fn opposite_keys_cancel() {
        let input = InputState::holding(&[Control::Left, Control::Right, Control::Down]);
        assert_eq!(input.thrust_axis(), Vec2::new(0.0, 1.0));
    }
}
