use crate::module::{common::Pose, sensor::Orientation};

/// Proportional gain applied to the measured tilt.
pub const STABILIZER_GAIN: f32 = 0.5;

/// Last commanded intent of the caller.
///
/// Corrections are always computed from this, never from the previous
/// corrected output, so they do not accumulate across steps.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct StabilizerState {
    pub target_pitch: f32,
    pub target_yaw: f32,
}

impl StabilizerState {
    pub fn target(&self) -> Pose {
        Pose::pitch_yaw(self.target_pitch, self.target_yaw)
    }

    /// Counter-rotates the target by the measured tilt: pitch corrects pitch,
    /// roll is absorbed by the yaw axis since there is no roll servo.
    pub fn correct(&self, orientation: Orientation) -> Pose {
        let correction_pitch = -orientation.pitch * STABILIZER_GAIN;
        let correction_yaw = -orientation.roll * STABILIZER_GAIN;

        Pose::pitch_yaw(
            self.target_pitch + correction_pitch,
            self.target_yaw + correction_yaw,
        )
    }
}
