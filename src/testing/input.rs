//! Scripted input injection for tests

use bevy::prelude::*;

use super::parser::FrameInput;
use crate::helpers::heading_vector;
use crate::input::PlayerInput;
use crate::tank::AimInput;

/// Piecewise-constant player input keyed by frame
#[derive(Debug, Default)]
pub struct ScriptedInputs {
    /// Sorted by frame
    entries: Vec<FrameInput>,
    pub max_frame: u64,
}

impl ScriptedInputs {
    pub fn from_inputs(inputs: &[FrameInput]) -> Self {
        let mut entries = inputs.to_vec();
        entries.sort_by_key(|e| e.frame);
        let max_frame = entries.last().map(|e| e.frame).unwrap_or(0);
        Self { entries, max_frame }
    }

    pub fn set_max_frame(&mut self, frame: u64) {
        self.max_frame = self.max_frame.max(frame);
    }

    /// The entry in effect at `frame`, if any has started
    pub fn active_at(&self, frame: u64) -> Option<&FrameInput> {
        let idx = self.entries.partition_point(|e| e.frame <= frame);
        idx.checked_sub(1).map(|i| &self.entries[i])
    }

    /// Write the input for `frame` into the player's input buffer
    pub fn apply(&self, frame: u64, input: &mut PlayerInput) {
        let Some(entry) = self.active_at(frame) else {
            input.throttle = 0.0;
            input.steer = 0.0;
            input.aim = AimInput::Hold;
            input.fire_held = false;
            return;
        };
        input.throttle = entry.throttle.clamp(-1.0, 1.0);
        input.steer = entry.steer.clamp(-1.0, 1.0);
        input.fire_held = entry.fire;
        input.aim = if let Some([x, y]) = entry.aim_at {
            AimInput::Point(Vec2::new(x, y))
        } else if let Some(angle) = entry.aim_angle {
            AimInput::Direction(heading_vector(angle.to_radians()))
        } else if let Some(rate) = entry.aim_rotate {
            AimInput::Rotate(rate)
        } else {
            AimInput::Hold
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(frame: u64, throttle: f32) -> FrameInput {
        FrameInput {
            frame,
            throttle,
            ..Default::default()
        }
    }

    #[test]
    fn test_input_holds_until_next_entry() {
        let scripted = ScriptedInputs::from_inputs(&[entry(30, -1.0), entry(10, 1.0)]);
        assert_eq!(scripted.max_frame, 30);
        assert!(scripted.active_at(5).is_none());
        assert_eq!(scripted.active_at(10).unwrap().throttle, 1.0);
        assert_eq!(scripted.active_at(29).unwrap().throttle, 1.0);
        assert_eq!(scripted.active_at(30).unwrap().throttle, -1.0);
        assert_eq!(scripted.active_at(500).unwrap().throttle, -1.0);
    }

    #[test]
    fn test_aim_precedence() {
        let scripted = ScriptedInputs::from_inputs(&[FrameInput {
            frame: 0,
            aim_at: Some([10.0, 20.0]),
            aim_angle: Some(90.0),
            fire: true,
            ..Default::default()
        }]);
        let mut input = PlayerInput::default();
        scripted.apply(0, &mut input);
        assert_eq!(input.aim, AimInput::Point(Vec2::new(10.0, 20.0)));
        assert!(input.fire_held);
    }
}
