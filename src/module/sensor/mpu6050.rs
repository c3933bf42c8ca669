//! MPU-6050 read as a tilt sensor: pitch and roll come straight from the
//! accelerometer's gravity vector, the gyro is left unused.

use std::io::Cursor;
use std::thread;
use std::time::Duration;

use byteorder::{ReadBytesExt, BE};
use tracing::{debug, info, info_span, warn, Span};

use super::{Orientation, OrientationSensor};
use crate::{transport::RegisterBus, Error, Result};

pub const MPU6050_ADDR: u16 = 0x68;

const REG_ACCEL_CONFIG: u8 = 0x1C;
const REG_ACCEL_XOUT_H: u8 = 0x3B;
const REG_PWR_MGMT_1: u8 = 0x6B;
const REG_WHO_AM_I: u8 = 0x75;

const WHO_AM_I_VALUE: u8 = 0x68;
// awake, clocked from the x gyro PLL
const PWR_MGMT_1_CLKSEL_PLL: u8 = 0x01;
const PWR_MGMT_1_SLEEP: u8 = 0x40;
const ACCEL_RANGE_2G: u8 = 0x00;

pub const CALIBRATION_SAMPLES: usize = 50;
const CALIBRATION_INTERVAL: Duration = Duration::from_millis(5);

/// Pitch and roll in degrees from a gravity vector. Any unit works, only the
/// ratios matter.
pub fn tilt_from_accel(ax: f32, ay: f32, az: f32) -> Orientation {
    Orientation {
        pitch: (-ax).atan2((ay * ay + az * az).sqrt()).to_degrees(),
        roll: ay.atan2(az).to_degrees(),
    }
}

pub struct Mpu6050<B: RegisterBus> {
    bus: B,
    offset: Orientation,
    sample_interval: Duration,
    initialized: bool,
    span: Span,
}

impl<B: RegisterBus> Mpu6050<B> {
    pub fn new(bus: B) -> Self {
        Self {
            bus,
            offset: Orientation::default(),
            sample_interval: CALIBRATION_INTERVAL,
            initialized: false,
            span: info_span!("mpu6050"),
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Pause between calibration samples.
    pub fn with_sample_interval(mut self, interval: Duration) -> Self {
        self.sample_interval = interval;
        self
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Level offset subtracted from every sample.
    pub fn offset(&self) -> Orientation {
        self.offset
    }

    fn read_tilt(&mut self) -> Result<Orientation> {
        let mut buf = [0u8; 6];
        self.bus.read_registers(REG_ACCEL_XOUT_H, &mut buf)?;

        let mut cur = Cursor::new(&buf[..]);
        let ax = cur.read_i16::<BE>()?;
        let ay = cur.read_i16::<BE>()?;
        let az = cur.read_i16::<BE>()?;

        Ok(tilt_from_accel(ax as f32, ay as f32, az as f32))
    }
}

impl<B: RegisterBus> OrientationSensor for Mpu6050<B> {
    fn initialize(&mut self) -> Result<()> {
        let mut who = [0u8];
        self.bus.read_registers(REG_WHO_AM_I, &mut who)?;
        if who[0] != WHO_AM_I_VALUE {
            return Err(Error::SensorUnavailable(
                format!("unexpected WHO_AM_I {:#04x}", who[0]).into(),
            ));
        }

        self.bus.write_register(REG_PWR_MGMT_1, PWR_MGMT_1_CLKSEL_PLL)?;
        self.bus.write_register(REG_ACCEL_CONFIG, ACCEL_RANGE_2G)?;
        self.initialized = true;

        info!(parent: &self.span, "mpu6050 awake");
        Ok(())
    }

    /// Averages a burst of samples into the level offset. The platform must
    /// be at rest and level while this runs.
    fn calibrate(&mut self) -> Result<()> {
        if !self.initialized {
            return Err(Error::SensorUnavailable("mpu6050 not initialized".into()));
        }

        let (mut pitch, mut roll) = (0.0, 0.0);
        for _ in 0..CALIBRATION_SAMPLES {
            let tilt = self.read_tilt()?;
            pitch += tilt.pitch;
            roll += tilt.roll;
            thread::sleep(self.sample_interval);
        }

        self.offset = Orientation {
            pitch: pitch / CALIBRATION_SAMPLES as f32,
            roll: roll / CALIBRATION_SAMPLES as f32,
        };

        debug!(
            parent: &self.span,
            pitch = self.offset.pitch,
            roll = self.offset.roll,
            "calibrated"
        );
        Ok(())
    }

    fn get_orientation(&mut self) -> Option<Orientation> {
        if !self.initialized {
            return None;
        }

        match self.read_tilt() {
            Ok(tilt) => Some(Orientation {
                pitch: tilt.pitch - self.offset.pitch,
                roll: tilt.roll - self.offset.roll,
            }),

            Err(e) => {
                warn!(parent: &self.span, "failed to read accelerometer: {}", e);
                None
            }
        }
    }

    fn close(&mut self) {
        if !self.initialized {
            return;
        }

        self.initialized = false;
        if let Err(e) = self.bus.write_register(REG_PWR_MGMT_1, PWR_MGMT_1_SLEEP) {
            warn!(parent: &self.span, "failed to put mpu6050 to sleep: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        module::{servo::ServoChannel, spotlight::Spotlight},
        transport::mock::{MockPwm, MockRegisterBus},
    };

    const ONE_G: i16 = 16384;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    fn device() -> (Mpu6050<MockRegisterBus>, MockRegisterBus) {
        let bus = MockRegisterBus::default();
        bus.set(REG_WHO_AM_I, WHO_AM_I_VALUE);
        bus.set_words(REG_ACCEL_XOUT_H, &[0, 0, ONE_G]);
        let sensor = Mpu6050::new(bus.clone()).with_sample_interval(Duration::ZERO);
        (sensor, bus)
    }

    #[test]
    fn test_tilt_from_accel() {
        assert_eq!(tilt_from_accel(0.0, 0.0, 1.0), Orientation::default());

        let nose_up = tilt_from_accel(-1.0, 0.0, 0.0);
        assert!(approx(nose_up.pitch, 90.0));

        let rolled = tilt_from_accel(0.0, 1.0, 1.0);
        assert!(approx(rolled.roll, 45.0));
        assert!(approx(rolled.pitch, 0.0));
    }

    #[test]
    fn test_initialize_wakes_device() {
        let (mut sensor, bus) = device();
        assert!(sensor.get_orientation().is_none());

        sensor.initialize().unwrap();
        assert!(sensor.is_initialized());
        assert_eq!(
            bus.log.borrow().writes,
            vec![
                (REG_PWR_MGMT_1, PWR_MGMT_1_CLKSEL_PLL),
                (REG_ACCEL_CONFIG, ACCEL_RANGE_2G)
            ]
        );
        assert_eq!(sensor.get_orientation(), Some(Orientation::default()));
    }

    #[test]
    fn test_wrong_device() {
        let (mut sensor, bus) = device();
        bus.set(REG_WHO_AM_I, 0x71);

        assert!(matches!(sensor.initialize(), Err(Error::SensorUnavailable(_))));
        assert!(bus.log.borrow().writes.is_empty());
        assert!(matches!(sensor.calibrate(), Err(Error::SensorUnavailable(_))));
    }

    #[test]
    fn test_calibrate_removes_mounting_offset() {
        let (mut sensor, bus) = device();
        bus.set_words(REG_ACCEL_XOUT_H, &[0, 8192, 8192]);
        sensor.initialize().unwrap();
        sensor.calibrate().unwrap();

        assert!(approx(sensor.offset().roll, 45.0));
        let level = sensor.get_orientation().unwrap();
        assert!(approx(level.roll, 0.0));
        assert!(approx(level.pitch, 0.0));

        bus.set_words(REG_ACCEL_XOUT_H, &[0, 0, ONE_G]);
        assert!(approx(sensor.get_orientation().unwrap().roll, -45.0));
    }

    #[test]
    fn test_read_failure() {
        let (mut sensor, bus) = device();
        sensor.initialize().unwrap();
        bus.log.borrow_mut().fail_read = true;

        assert!(sensor.get_orientation().is_none());
        assert!(sensor.calibrate().unwrap_err().is_transport());
    }

    #[test]
    fn test_close_sleeps_once() {
        let (mut sensor, bus) = device();
        sensor.initialize().unwrap();
        sensor.close();
        sensor.close();

        let log = bus.log.borrow();
        let sleeps = log
            .writes
            .iter()
            .filter(|w| **w == (REG_PWR_MGMT_1, PWR_MGMT_1_SLEEP))
            .count();
        assert_eq!(sleeps, 1);
        drop(log);
        assert!(sensor.get_orientation().is_none());
    }

    #[test]
    fn test_drives_spotlight_stabilization() {
        let (sensor, bus) = device();
        let pwm = MockPwm::default();
        let mut gimbal = Spotlight::new(
            pwm.clone(),
            ServoChannel::new(17),
            ServoChannel::new(27),
            Some(sensor),
        );
        gimbal.initialize().unwrap();
        assert!(gimbal.stabilization_enabled());

        // platform pitched nose up by 30 degrees after calibration
        bus.set_words(REG_ACCEL_XOUT_H, &[-8192, 0, 14189]);
        let pose = gimbal.stabilize().unwrap();
        assert!((pose.pitch + 15.0).abs() < 0.05);
        assert!(approx(pose.yaw, 0.0));

        drop(gimbal);
        assert!(bus
            .log
            .borrow()
            .writes
            .contains(&(REG_PWR_MGMT_1, PWR_MGMT_1_SLEEP)));
        assert_eq!(pwm.log.borrow().last(17), Some(0));
    }
}
