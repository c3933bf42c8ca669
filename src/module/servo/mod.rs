//! Pulse-width mapping for continuous-rotation servos.
//!
//! A continuous servo turns at a speed set by the pulse width and has no
//! notion of absolute position. [`ServoChannel::angle_to_pulse`] therefore
//! yields a pseudo-position: holding a pulse away from center keeps the servo
//! turning, so the result is only a bounded directional bias.

use crate::{module::common::AxisRange, util::unit_convertor};

pub const SERVO_MIN_PULSE: u16 = 1000;
pub const SERVO_MAX_PULSE: u16 = 2000;
pub const SERVO_CENTER_PULSE: u16 = 1500;

/// Written once at teardown to stop the PWM output.
pub const PULSE_DISABLED: u16 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServoChannel {
    pub pin_id: u8,
    pub min_pulse_us: u16,
    pub max_pulse_us: u16,
    pub center_pulse_us: u16,
}

impl ServoChannel {
    pub const fn new(pin_id: u8) -> Self {
        Self {
            pin_id,
            min_pulse_us: SERVO_MIN_PULSE,
            max_pulse_us: SERVO_MAX_PULSE,
            center_pulse_us: SERVO_CENTER_PULSE,
        }
    }

    pub fn clamp_pulse(&self, pulse: i32) -> u16 {
        pulse.clamp(self.min_pulse_us as i32, self.max_pulse_us as i32) as u16
    }

    /// Linear map of `angle` over `[min_angle, max_angle]` onto the pulse range.
    ///
    /// The fractional microsecond is truncated. Angles outside the range and
    /// degenerate ranges stay within `[min_pulse_us, max_pulse_us]`.
    pub fn angle_to_pulse(&self, angle: f32, min_angle: f32, max_angle: f32) -> u16 {
        let span = max_angle - min_angle;
        if span.abs() <= f32::EPSILON || angle.is_nan() {
            return self.center_pulse_us;
        }

        let normalized = (AxisRange::new(min_angle, max_angle).clamp(angle) - min_angle) / span;
        let width = (self.max_pulse_us - self.min_pulse_us) as f32;
        self.clamp_pulse(self.min_pulse_us as i32 + (normalized * width) as i32)
    }

    /// `center + round(speed% * 5)`, speeds beyond ±100 saturate.
    pub fn speed_to_pulse(&self, speed_percent: f32) -> u16 {
        let offset = unit_convertor::SERVO_SPEED_CONVERTOR
            .val2proto(speed_percent)
            .unwrap_or(0);
        self.clamp_pulse(self.center_pulse_us as i32 + offset as i32)
    }
}
