//! System configuration, stored as JSON.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{module::servo::ServoChannel, transport::SerialSettings, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraGimbalConfig {
    pub serial_port: String,
    pub baudrate: u32,
    pub timeout_ms: u64,
}

impl Default for CameraGimbalConfig {
    fn default() -> Self {
        Self {
            serial_port: "/dev/ttyAMA0".into(),
            baudrate: 115_200,
            timeout_ms: 1000,
        }
    }
}

impl CameraGimbalConfig {
    pub fn serial_settings(&self) -> SerialSettings {
        SerialSettings::new(
            self.serial_port.clone(),
            self.baudrate,
            Duration::from_millis(self.timeout_ms),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpotlightGimbalConfig {
    pub pitch_pin: u8,
    pub yaw_pin: u8,
    pub i2c_address: u16,
    pub i2c_bus: u8,
    pub use_stabilization: bool,
    pub stabilize_interval_ms: u64,
}

impl Default for SpotlightGimbalConfig {
    fn default() -> Self {
        Self {
            pitch_pin: 17,
            yaw_pin: 27,
            i2c_address: 0x68,
            i2c_bus: 1,
            use_stabilization: true,
            stabilize_interval_ms: 20,
        }
    }
}

impl SpotlightGimbalConfig {
    pub fn pitch_channel(&self) -> ServoChannel {
        ServoChannel::new(self.pitch_pin)
    }

    pub fn yaw_channel(&self) -> ServoChannel {
        ServoChannel::new(self.yaw_pin)
    }

    pub fn stabilize_interval(&self) -> Duration {
        Duration::from_millis(self.stabilize_interval_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    pub camera_gimbal: CameraGimbalConfig,
    pub spotlight_gimbal: SpotlightGimbalConfig,
    pub log_level: String,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            camera_gimbal: CameraGimbalConfig::default(),
            spotlight_gimbal: SpotlightGimbalConfig::default(),
            log_level: "info".into(),
        }
    }
}

impl SystemConfig {
    /// Defaults if `path` does not exist.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let data = fs::read_to_string(path)?;
        Self::from_json(&data)
    }

    pub fn from_json(data: &str) -> Result<Self> {
        serde_json::from_str(data).map_err(From::from)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let data = serde_json::to_string_pretty(self)?;
        fs::write(path, data).map_err(From::from)
    }
}
