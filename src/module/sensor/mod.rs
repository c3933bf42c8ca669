//! Inertial-sensor boundary. Register access and calibration offsets live in
//! the implementor; the gimbals only consume pitch/roll samples.

use crate::{Error, Result};

pub mod mpu6050;

/// Platform tilt in degrees.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Orientation {
    pub pitch: f32,
    pub roll: f32,
}

pub trait OrientationSensor {
    fn initialize(&mut self) -> Result<()>;

    fn calibrate(&mut self) -> Result<()>;

    /// Latest sample, `None` if the read failed.
    fn get_orientation(&mut self) -> Option<Orientation>;

    fn close(&mut self);
}

/// Placeholder for gimbals built without an inertial sensor.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoSensor;

impl OrientationSensor for NoSensor {
    fn initialize(&mut self) -> Result<()> {
        Err(Error::SensorUnavailable("no sensor fitted".into()))
    }

    fn calibrate(&mut self) -> Result<()> {
        Err(Error::SensorUnavailable("no sensor fitted".into()))
    }

    fn get_orientation(&mut self) -> Option<Orientation> {
        None
    }

    fn close(&mut self) {}
}
