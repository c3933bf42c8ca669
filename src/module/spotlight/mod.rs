//! Two-axis spotlight gimbal on continuous-rotation servos, with optional
//! inertial stabilization.
//!
//! Nothing here runs on its own: [`Spotlight::stabilize`] performs one
//! correction step and the caller decides the cadence.

use tracing::{debug, error, info, info_span, trace, warn, Span};

use crate::{
    module::{
        common::{Pose, PITCH_RANGE, YAW_RANGE},
        sensor::{NoSensor, Orientation, OrientationSensor},
        servo::{ServoChannel, PULSE_DISABLED},
    },
    transport::PwmOutput,
    Error, Result,
};

pub mod stabilizer;

use stabilizer::StabilizerState;

pub struct Spotlight<P, S = NoSensor>
where
    P: PwmOutput,
    S: OrientationSensor,
{
    pwm: P,
    pitch: ServoChannel,
    yaw: ServoChannel,
    sensor: Option<S>,
    use_stabilization: bool,
    initialized: bool,
    shut_down: bool,
    // set once any pulse has reached a channel
    pwm_active: bool,
    state: StabilizerState,
    pulses: (u16, u16),
    span: Span,
}

impl<P, S> Spotlight<P, S>
where
    P: PwmOutput,
    S: OrientationSensor,
{
    /// Stabilization is enabled iff a sensor is given.
    pub fn new(pwm: P, pitch: ServoChannel, yaw: ServoChannel, sensor: Option<S>) -> Self {
        let span = info_span!("spotlight_gimbal", pitch_pin = pitch.pin_id, yaw_pin = yaw.pin_id);
        Self {
            pwm,
            pitch,
            yaw,
            use_stabilization: sensor.is_some(),
            sensor,
            initialized: false,
            shut_down: false,
            pwm_active: false,
            state: StabilizerState::default(),
            pulses: (pitch.center_pulse_us, yaw.center_pulse_us),
            span,
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Centers both servos and brings up the sensor.
    ///
    /// A sensor that fails to come up disables stabilization instead of
    /// failing the gimbal.
    pub fn initialize(&mut self) -> Result<()> {
        if self.shut_down {
            return Err(Error::Other("spotlight gimbal already shut down".into()));
        }

        let (pitch_us, yaw_us) = (self.pitch.center_pulse_us, self.yaw.center_pulse_us);
        if let Err(e) = self.write_pulses(pitch_us, yaw_us) {
            error!(parent: &self.span, "failed to center servos: {}", e);
            return Err(e);
        }

        self.initialized = true;
        info!(
            parent: &self.span,
            "servos initialized on gpio {}, {}", self.pitch.pin_id, self.yaw.pin_id
        );

        if self.use_stabilization {
            if let Some(sensor) = self.sensor.as_mut() {
                match sensor.initialize().and_then(|_| sensor.calibrate()) {
                    Ok(()) => info!(parent: &self.span, "inertial sensor initialized and calibrated"),
                    Err(e) => {
                        warn!(parent: &self.span, "inertial sensor unavailable, stabilization disabled: {}", e);
                        self.use_stabilization = false;
                    }
                }
            }
        }

        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn stabilization_enabled(&self) -> bool {
        self.use_stabilization
    }

    pub fn target(&self) -> Pose {
        self.state.target()
    }

    /// Last pulse widths written to (pitch, yaw).
    pub fn current_pulses(&self) -> (u16, u16) {
        self.pulses
    }

    /// Pseudo-position command, see [`crate::module::servo`] for why this is
    /// only a directional bias. The clamped pose becomes the new target.
    pub fn set_position(&mut self, pitch: f32, yaw: f32) -> Result<()> {
        self.ensure_initialized("set position")?;

        let pose = Pose::pitch_yaw(pitch, yaw).clamped();
        self.apply_pose(pose)?;
        self.state = StabilizerState {
            target_pitch: pose.pitch,
            target_yaw: pose.yaw,
        };

        Ok(())
    }

    /// Speeds in percent of full speed, `0` stops the axis.
    pub fn set_speed(&mut self, pitch_speed: f32, yaw_speed: f32) -> Result<()> {
        self.ensure_initialized("set speed")?;

        let pitch_us = self.pitch.speed_to_pulse(pitch_speed);
        let yaw_us = self.yaw.speed_to_pulse(yaw_speed);
        self.write_pulses(pitch_us, yaw_us)?;
        debug!(parent: &self.span, pitch_speed, yaw_speed, pitch_us, yaw_us, "set speed");
        Ok(())
    }

    pub fn stop(&mut self) -> Result<()> {
        self.set_speed(0.0, 0.0)
    }

    pub fn center(&mut self) -> Result<()> {
        self.set_position(0.0, 0.0)
    }

    /// `None` unless the sensor has been brought up by `initialize` and is
    /// still open.
    pub fn get_orientation(&mut self) -> Option<Orientation> {
        if !self.initialized || !self.use_stabilization {
            return None;
        }

        self.sensor.as_mut().and_then(|sensor| sensor.get_orientation())
    }

    /// One correction step against the current target; returns the pose sent.
    ///
    /// On failure the target is unchanged and neither servo is moved.
    pub fn stabilize(&mut self) -> Result<Pose> {
        if !self.use_stabilization {
            return Err(Error::SensorUnavailable("stabilization disabled".into()));
        }

        self.ensure_initialized("stabilize")?;

        let orientation = self
            .get_orientation()
            .ok_or_else(|| Error::SensorUnavailable("no orientation sample".into()))?;

        let corrected = self.state.correct(orientation);
        if !PITCH_RANGE.contains(corrected.pitch) || !YAW_RANGE.contains(corrected.yaw) {
            debug!(parent: &self.span, "correction saturated at the axis limit");
        }

        let pose = corrected.clamped();
        self.apply_pose(pose)?;
        trace!(
            parent: &self.span,
            tilt_pitch = orientation.pitch,
            tilt_roll = orientation.roll,
            pitch = pose.pitch,
            yaw = pose.yaw,
            "stabilized"
        );

        Ok(pose)
    }

    /// Disables both PWM outputs and closes the sensor. Runs at most once.
    ///
    /// The outputs are disabled whenever a pulse was ever written, including
    /// after an `initialize` that failed halfway.
    pub fn shutdown(&mut self) -> Result<()> {
        if self.shut_down {
            return Ok(());
        }

        self.shut_down = true;
        self.initialized = false;
        self.use_stabilization = false;

        let mut res = Ok(());
        if self.pwm_active {
            self.pwm_active = false;
            let pitch = self.pwm.set_pulse_width(self.pitch.pin_id, PULSE_DISABLED);
            let yaw = self.pwm.set_pulse_width(self.yaw.pin_id, PULSE_DISABLED);
            res = pitch.and(yaw).map_err(Error::from);
            self.pulses = (PULSE_DISABLED, PULSE_DISABLED);
        }

        if let Some(sensor) = self.sensor.as_mut() {
            sensor.close();
        }

        match &res {
            Ok(()) => info!(parent: &self.span, "spotlight gimbal shut down"),
            Err(e) => error!(parent: &self.span, "error during shutdown: {}", e),
        }

        res
    }

    fn ensure_initialized(&self, op: &str) -> Result<()> {
        if self.initialized {
            return Ok(());
        }

        error!(parent: &self.span, "cannot {}: spotlight gimbal not initialized", op);
        Err(Error::NotConnected)
    }

    fn apply_pose(&mut self, pose: Pose) -> Result<()> {
        let pitch_us = self.pitch.angle_to_pulse(pose.pitch, PITCH_RANGE.min, PITCH_RANGE.max);
        let yaw_us = self.yaw.angle_to_pulse(pose.yaw, YAW_RANGE.min, YAW_RANGE.max);
        self.write_pulses(pitch_us, yaw_us)?;
        debug!(
            parent: &self.span,
            pitch = pose.pitch,
            yaw = pose.yaw,
            pitch_us,
            yaw_us,
            "set position"
        );

        Ok(())
    }

    // both axes or neither: a failed yaw write puts the previous pitch pulse back
    fn write_pulses(&mut self, pitch_us: u16, yaw_us: u16) -> Result<()> {
        self.pwm.set_pulse_width(self.pitch.pin_id, pitch_us)?;
        self.pwm_active = true;

        if let Err(e) = self.pwm.set_pulse_width(self.yaw.pin_id, yaw_us) {
            if let Err(restore) = self.pwm.set_pulse_width(self.pitch.pin_id, self.pulses.0) {
                warn!(parent: &self.span, "failed to restore pitch pulse: {}", restore);
            }

            return Err(e.into());
        }

        self.pulses = (pitch_us, yaw_us);
        Ok(())
    }
}

impl<P, S> Drop for Spotlight<P, S>
where
    P: PwmOutput,
    S: OrientationSensor,
{
    fn drop(&mut self) {
        let _ = self.shutdown();
    }
}
