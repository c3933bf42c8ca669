//! In-memory transports and sensor for tests.

use std::cell::RefCell;
use std::collections::HashMap;
use std::io::{Error, ErrorKind, Result};
use std::rc::Rc;

use super::{PwmOutput, RegisterBus, SerialConnector, SerialPort, SerialSettings};
use crate::module::sensor::{Orientation, OrientationSensor};

#[derive(Debug, Default)]
pub struct SerialLog {
    pub opened_with: Option<SerialSettings>,
    pub frames: Vec<Vec<u8>>,
    pub rx: Vec<u8>,
    pub fail_open: bool,
    pub fail_write: bool,
    pub closed: usize,
}

impl SerialLog {
    pub fn written(&self) -> usize {
        self.frames.iter().map(Vec::len).sum()
    }
}

#[derive(Debug, Default, Clone)]
pub struct MockConnector {
    pub log: Rc<RefCell<SerialLog>>,
}

impl MockConnector {
    pub fn inject_rx(&self, data: &[u8]) {
        self.log.borrow_mut().rx.extend_from_slice(data);
    }
}

impl SerialConnector for MockConnector {
    type Port = MockSerial;

    fn open(&self, settings: &SerialSettings) -> Result<MockSerial> {
        let mut log = self.log.borrow_mut();
        if log.fail_open {
            return Err(Error::new(ErrorKind::NotFound, "no such port"));
        }

        log.opened_with = Some(settings.clone());
        Ok(MockSerial {
            log: self.log.clone(),
        })
    }
}

#[derive(Debug)]
pub struct MockSerial {
    log: Rc<RefCell<SerialLog>>,
}

impl SerialPort for MockSerial {
    fn write(&mut self, data: &[u8]) -> Result<()> {
        let mut log = self.log.borrow_mut();
        if log.fail_write {
            return Err(Error::new(ErrorKind::BrokenPipe, "write failed"));
        }

        log.frames.push(data.to_vec());
        Ok(())
    }

    fn bytes_available(&mut self) -> Result<usize> {
        Ok(self.log.borrow().rx.len())
    }

    fn read(&mut self, n: usize) -> Result<Vec<u8>> {
        let mut log = self.log.borrow_mut();
        let n = n.min(log.rx.len());
        Ok(log.rx.drain(..n).collect())
    }

    fn close(&mut self) -> Result<()> {
        self.log.borrow_mut().closed += 1;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct PwmLog {
    pub writes: Vec<(u8, u16)>,
    pub fail_channel: Option<u8>,
}

impl PwmLog {
    pub fn last(&self, channel: u8) -> Option<u16> {
        self.writes
            .iter()
            .rev()
            .find(|(c, _)| *c == channel)
            .map(|(_, us)| *us)
    }
}

#[derive(Debug, Default, Clone)]
pub struct MockPwm {
    pub log: Rc<RefCell<PwmLog>>,
}

impl PwmOutput for MockPwm {
    fn set_pulse_width(&mut self, channel: u8, micros: u16) -> Result<()> {
        let mut log = self.log.borrow_mut();
        if log.fail_channel == Some(channel) {
            return Err(Error::new(ErrorKind::Other, "pwm channel fault"));
        }

        log.writes.push((channel, micros));
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct SensorLog {
    pub orientation: Option<Orientation>,
    pub fail_init: bool,
    pub initialized: bool,
    pub calibrated: bool,
    pub closed: usize,
}

#[derive(Debug, Default, Clone)]
pub struct MockSensor {
    pub log: Rc<RefCell<SensorLog>>,
}

impl MockSensor {
    pub fn with_orientation(pitch: f32, roll: f32) -> Self {
        let sensor = Self::default();
        sensor.set_orientation(Some(Orientation { pitch, roll }));
        sensor
    }

    pub fn set_orientation(&self, orientation: Option<Orientation>) {
        self.log.borrow_mut().orientation = orientation;
    }
}

impl OrientationSensor for MockSensor {
    fn initialize(&mut self) -> crate::Result<()> {
        let mut log = self.log.borrow_mut();
        if log.fail_init {
            return Err(crate::Error::SensorUnavailable("no device on bus".into()));
        }

        log.initialized = true;
        Ok(())
    }

    fn calibrate(&mut self) -> crate::Result<()> {
        self.log.borrow_mut().calibrated = true;
        Ok(())
    }

    fn get_orientation(&mut self) -> Option<Orientation> {
        self.log.borrow().orientation
    }

    fn close(&mut self) {
        self.log.borrow_mut().closed += 1;
    }
}

#[derive(Debug, Default)]
pub struct RegisterLog {
    pub regs: HashMap<u8, u8>,
    pub writes: Vec<(u8, u8)>,
    pub fail_read: bool,
}

#[derive(Debug, Default, Clone)]
pub struct MockRegisterBus {
    pub log: Rc<RefCell<RegisterLog>>,
}

impl MockRegisterBus {
    pub fn set(&self, reg: u8, value: u8) {
        self.log.borrow_mut().regs.insert(reg, value);
    }

    /// Stores big-endian i16 words from `reg` upwards.
    pub fn set_words(&self, reg: u8, words: &[i16]) {
        for (i, word) in words.iter().enumerate() {
            let [hi, lo] = word.to_be_bytes();
            self.set(reg + 2 * i as u8, hi);
            self.set(reg + 2 * i as u8 + 1, lo);
        }
    }
}

impl RegisterBus for MockRegisterBus {
    fn write_register(&mut self, reg: u8, value: u8) -> Result<()> {
        let mut log = self.log.borrow_mut();
        log.writes.push((reg, value));
        log.regs.insert(reg, value);
        Ok(())
    }

    fn read_registers(&mut self, reg: u8, buf: &mut [u8]) -> Result<()> {
        let log = self.log.borrow();
        if log.fail_read {
            return Err(Error::new(ErrorKind::TimedOut, "i2c nack"));
        }

        for (i, b) in buf.iter_mut().enumerate() {
            *b = log.regs.get(&(reg + i as u8)).copied().unwrap_or(0);
        }

        Ok(())
    }
}
