//! Pose and range types shared by both gimbals.

pub const PITCH_RANGE: AxisRange = AxisRange::new(-90.0, 90.0);
pub const ROLL_RANGE: AxisRange = AxisRange::new(-90.0, 90.0);
pub const YAW_RANGE: AxisRange = AxisRange::new(-180.0, 180.0);

/// Closed interval of valid degrees for one axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisRange {
    pub min: f32,
    pub max: f32,
}

impl AxisRange {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub fn clamp(&self, v: f32) -> f32 {
        v.max(self.min).min(self.max)
    }

    pub fn contains(&self, v: f32) -> bool {
        (self.min..=self.max).contains(&v)
    }
}

/// Orientation request in degrees.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Pose {
    pub pitch: f32,
    pub roll: f32,
    pub yaw: f32,
}

impl Pose {
    pub const fn new(pitch: f32, roll: f32, yaw: f32) -> Self {
        Self { pitch, roll, yaw }
    }

    /// Two-axis pose, roll stays at 0.
    pub const fn pitch_yaw(pitch: f32, yaw: f32) -> Self {
        Self {
            pitch,
            roll: 0.0,
            yaw,
        }
    }

    pub fn clamped(&self) -> Self {
        Self {
            pitch: PITCH_RANGE.clamp(self.pitch),
            roll: ROLL_RANGE.clamp(self.roll),
            yaw: YAW_RANGE.clamp(self.yaw),
        }
    }
}

/// Per-axis rotation speed.
///
/// Degrees per second for the serial gimbal, percent of full speed in
/// `[-100, 100]` for the spotlight, whose roll component is ignored.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct SpeedCommand {
    pub pitch_speed: f32,
    pub roll_speed: f32,
    pub yaw_speed: f32,
}

impl SpeedCommand {
    pub const fn new(pitch_speed: f32, roll_speed: f32, yaw_speed: f32) -> Self {
        Self {
            pitch_speed,
            roll_speed,
            yaw_speed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pose_clamped() {
        let pose = Pose::new(120.0, -150.0, 200.0).clamped();
        assert_eq!(pose, Pose::new(90.0, -90.0, 180.0));

        let inside = Pose::new(12.5, -3.0, -179.0);
        assert_eq!(inside.clamped(), inside);
    }

    #[test]
    fn test_axis_range() {
        assert!(YAW_RANGE.contains(-180.0));
        assert!(!PITCH_RANGE.contains(90.5));
        assert_eq!(PITCH_RANGE.clamp(-91.0), -90.0);
    }
}
