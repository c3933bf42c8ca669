//! Raspberry Pi backends: the PL011/mini UART for the serial gimbal,
//! software PWM on GPIO pins for the continuous servos and the I2C bus for
//! the inertial sensor.

use std::collections::HashMap;
use std::io::{Error, ErrorKind, Result};
use std::time::Duration;

use rppal::{
    gpio::{Gpio, OutputPin},
    i2c::I2c,
    uart::{self, Uart},
};
use tracing::debug;

use super::{PwmOutput, RegisterBus, SerialConnector, SerialPort, SerialSettings};

// 50Hz servo frame
const SERVO_PERIOD: Duration = Duration::from_millis(20);

// VTIME is a u8 in deciseconds
const MAX_READ_TIMEOUT: Duration = Duration::from_millis(25_500);

fn to_io<E>(e: E) -> Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    Error::new(ErrorKind::Other, e)
}

#[derive(Debug, Default, Clone, Copy)]
pub struct RpiUartConnector;

impl SerialConnector for RpiUartConnector {
    type Port = RpiUart;

    fn open(&self, settings: &SerialSettings) -> Result<RpiUart> {
        let mut inner = Uart::with_path(
            &settings.port,
            settings.baud_rate,
            uart::Parity::None,
            settings.data_bits(),
            settings.stop_bits(),
        )
        .map_err(to_io)?;

        inner
            .set_read_mode(0, settings.timeout.min(MAX_READ_TIMEOUT))
            .map_err(to_io)?;
        inner.set_write_mode(true).map_err(to_io)?;

        debug!(port = %settings.port, baud = settings.baud_rate, "uart opened");
        Ok(RpiUart { inner: Some(inner) })
    }
}

pub struct RpiUart {
    inner: Option<Uart>,
}

impl RpiUart {
    fn inner(&mut self) -> Result<&mut Uart> {
        self.inner
            .as_mut()
            .ok_or_else(|| Error::new(ErrorKind::NotConnected, "uart closed"))
    }
}

impl SerialPort for RpiUart {
    fn write(&mut self, data: &[u8]) -> Result<()> {
        let written = self.inner()?.write(data).map_err(to_io)?;
        if written != data.len() {
            return Err(Error::new(
                ErrorKind::WriteZero,
                format!("short write: {} of {} bytes", written, data.len()),
            ));
        }

        Ok(())
    }

    fn bytes_available(&mut self) -> Result<usize> {
        self.inner()?.input_len().map_err(to_io)
    }

    fn read(&mut self, n: usize) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; n];
        let read = self.inner()?.read(&mut buf).map_err(to_io)?;
        buf.truncate(read);
        Ok(buf)
    }

    fn close(&mut self) -> Result<()> {
        // dropping the handle closes the device
        if let Some(inner) = self.inner.take() {
            inner.drain().map_err(to_io)?;
        }

        Ok(())
    }
}

/// Software PWM on BCM-numbered pins, one channel per pin.
pub struct RpiServoPwm {
    pins: HashMap<u8, OutputPin>,
}

impl RpiServoPwm {
    pub fn new(channels: &[u8]) -> Result<Self> {
        let gpio = Gpio::new().map_err(to_io)?;
        let mut pins = HashMap::with_capacity(channels.len());
        for &channel in channels {
            let pin = gpio.get(channel).map_err(to_io)?.into_output();
            pins.insert(channel, pin);
        }

        Ok(Self { pins })
    }
}

impl PwmOutput for RpiServoPwm {
    fn set_pulse_width(&mut self, channel: u8, micros: u16) -> Result<()> {
        let pin = self.pins.get_mut(&channel).ok_or_else(|| {
            Error::new(
                ErrorKind::InvalidInput,
                format!("gpio {} is not a servo channel", channel),
            )
        })?;

        if micros == 0 {
            pin.clear_pwm().map_err(to_io)?;
            pin.set_low();
            return Ok(());
        }

        pin.set_pwm(SERVO_PERIOD, Duration::from_micros(micros as u64))
            .map_err(to_io)
    }
}

/// One slave device on a hardware I2C bus.
pub struct RpiI2c {
    inner: I2c,
}

impl RpiI2c {
    pub fn new(bus: u8, address: u16) -> Result<Self> {
        let mut inner = I2c::with_bus(bus).map_err(to_io)?;
        inner.set_slave_address(address).map_err(to_io)?;

        debug!(bus, address, "i2c opened");
        Ok(Self { inner })
    }
}

impl RegisterBus for RpiI2c {
    fn write_register(&mut self, reg: u8, value: u8) -> Result<()> {
        self.inner.smbus_write_byte(reg, value).map_err(to_io)
    }

    fn read_registers(&mut self, reg: u8, buf: &mut [u8]) -> Result<()> {
        self.inner.write_read(&[reg], buf).map_err(to_io)
    }
}
