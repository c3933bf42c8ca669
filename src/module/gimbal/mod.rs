//! Three-axis camera gimbal on a serial link.

use std::thread;
use std::time::Duration;

use tracing::{debug, error, info, info_span, warn, Span};

use crate::{
    module::common::{Pose, SpeedCommand},
    proto::{pack_msg, unpack_resp, Message},
    transport::{SerialConnector, SerialPort, SerialSettings},
    Error, Result,
};

pub mod proto;
use proto::{
    cmd::{GetStatus, SetAngle, SetSpeed},
    status::{StatusReport, STATUS_PAYLOAD_SIZE},
};

/// How long `get_status` waits before polling for the reply.
pub const STATUS_REPLY_WAIT: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connected,
}

pub struct Gimbal<C: SerialConnector> {
    connector: C,
    settings: SerialSettings,
    port: Option<C::Port>,
    reply_wait: Duration,
    span: Span,
}

impl<C: SerialConnector> Gimbal<C> {
    pub fn new(connector: C, settings: SerialSettings) -> Self {
        let span = info_span!("camera_gimbal", port = %settings.port);
        Self {
            connector,
            settings,
            port: None,
            reply_wait: STATUS_REPLY_WAIT,
            span,
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn with_reply_wait(mut self, wait: Duration) -> Self {
        self.reply_wait = wait;
        self
    }

    pub fn settings(&self) -> &SerialSettings {
        &self.settings
    }

    pub fn state(&self) -> ConnectionState {
        if self.port.is_some() {
            ConnectionState::Connected
        } else {
            ConnectionState::Disconnected
        }
    }

    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    /// Opens the port as 8N1 at the configured baud rate.
    pub fn connect(&mut self) -> Result<()> {
        if self.is_connected() {
            debug!(parent: &self.span, "already connected");
            return Ok(());
        }

        match self.connector.open(&self.settings) {
            Ok(port) => {
                self.port = Some(port);
                info!(
                    parent: &self.span,
                    baud = self.settings.baud_rate,
                    "connected to {} at {} baud",
                    self.settings.port,
                    self.settings.baud_rate
                );
                Ok(())
            }

            Err(e) => {
                error!(parent: &self.span, "failed to connect: {}", e);
                Err(e.into())
            }
        }
    }

    /// No-op when already disconnected.
    pub fn disconnect(&mut self) {
        if let Some(mut port) = self.port.take() {
            if let Err(e) = port.close() {
                warn!(parent: &self.span, "error closing port: {}", e);
            }

            info!(parent: &self.span, "disconnected");
        }
    }

    /// Angles in degrees, clamped to pitch/roll ±90 and yaw ±180.
    pub fn set_angle(&mut self, pitch: f32, roll: f32, yaw: f32) -> Result<()> {
        let pose = Pose::new(pitch, roll, yaw).clamped();
        self.send("set angle", || SetAngle::from_pose(pose))?;
        debug!(
            parent: &self.span,
            pitch = pose.pitch,
            roll = pose.roll,
            yaw = pose.yaw,
            "set angles"
        );

        Ok(())
    }

    /// Speeds in degrees per second. Not clamped: only values that overflow
    /// the 16-bit wire field are rejected.
    pub fn set_speed(&mut self, pitch_speed: f32, roll_speed: f32, yaw_speed: f32) -> Result<()> {
        let speed = SpeedCommand::new(pitch_speed, roll_speed, yaw_speed);
        self.send("set speed", || SetSpeed::from_speed(speed))?;
        debug!(
            parent: &self.span,
            pitch_speed, roll_speed, yaw_speed, "set speeds"
        );

        Ok(())
    }

    pub fn center(&mut self) -> Result<()> {
        self.set_angle(0.0, 0.0, 0.0)
    }

    /// Best-effort status poll, `None` on any failure.
    pub fn get_status(&mut self) -> Option<StatusReport> {
        match self.request_status() {
            Ok(report) => Some(report),
            Err(e) => {
                warn!(parent: &self.span, "failed to get status: {}", e);
                None
            }
        }
    }

    /// Sends a status request, waits once for the reply window and decodes
    /// whatever has arrived by then.
    pub fn request_status(&mut self) -> Result<StatusReport> {
        self.send("get status", || Ok(GetStatus))?;
        thread::sleep(self.reply_wait);

        let port = self.port.as_mut().ok_or(Error::NotConnected)?;
        let available = port.bytes_available()?;
        if available == 0 {
            return Err(Error::NotEnoughData {
                want: STATUS_PAYLOAD_SIZE,
                got: 0,
                msg: Some("no status reply".into()),
            });
        }

        let reply = port.read(available)?;
        unpack_resp::<GetStatus>(&reply)
    }

    fn send<M, F>(&mut self, op: &str, build: F) -> Result<()>
    where
        M: Message,
        F: FnOnce() -> Result<M>,
    {
        let port = match self.port.as_mut() {
            Some(port) => port,
            None => {
                error!(parent: &self.span, "cannot {}: not connected", op);
                return Err(Error::NotConnected);
            }
        };

        let frame = build().and_then(|msg| pack_msg(&msg))?;
        if let Err(e) = port.write(&frame) {
            error!(parent: &self.span, "failed to {}: {}", op, e);
            return Err(e.into());
        }

        Ok(())
    }
}

impl<C: SerialConnector> Drop for Gimbal<C> {
    fn drop(&mut self) {
        self.disconnect();
    }
}
