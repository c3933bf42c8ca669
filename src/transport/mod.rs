use std::io::Result;
use std::time::Duration;

#[cfg(test)]
pub mod mock;
#[cfg(feature = "rpi")]
pub mod rpi;

pub const SERIAL_DATA_BITS: u8 = 8;
pub const SERIAL_STOP_BITS: u8 = 1;

/// Port settings. The frame shape is always 8N1 and cannot be changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialSettings {
    pub port: String,
    pub baud_rate: u32,
    pub timeout: Duration,
    data_bits: u8,
    stop_bits: u8,
}

impl SerialSettings {
    pub fn new(port: impl Into<String>, baud_rate: u32, timeout: Duration) -> Self {
        Self {
            port: port.into(),
            baud_rate,
            timeout,
            data_bits: SERIAL_DATA_BITS,
            stop_bits: SERIAL_STOP_BITS,
        }
    }

    pub fn data_bits(&self) -> u8 {
        self.data_bits
    }

    /// Always `false`, frames carry no parity bit.
    pub fn parity(&self) -> bool {
        false
    }

    pub fn stop_bits(&self) -> u8 {
        self.stop_bits
    }
}

pub trait SerialPort {
    fn write(&mut self, data: &[u8]) -> Result<()>;

    fn bytes_available(&mut self) -> Result<usize>;

    fn read(&mut self, n: usize) -> Result<Vec<u8>>;

    fn close(&mut self) -> Result<()>;
}

pub trait SerialConnector {
    type Port: SerialPort;

    fn open(&self, settings: &SerialSettings) -> Result<Self::Port>;
}

pub trait PwmOutput {
    /// Sets the high time of the servo signal on `channel`; `0` disables the output.
    fn set_pulse_width(&mut self, channel: u8, micros: u16) -> Result<()>;
}

/// Register-addressed device on an I2C bus.
pub trait RegisterBus {
    fn write_register(&mut self, reg: u8, value: u8) -> Result<()>;

    /// Reads `buf.len()` consecutive registers starting at `reg`.
    fn read_registers(&mut self, reg: u8, buf: &mut [u8]) -> Result<()>;
}
