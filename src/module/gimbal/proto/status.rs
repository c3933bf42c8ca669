use std::io::Cursor;

use byteorder::{ReadBytesExt, LE};

use crate::{
    ensure_buf_size,
    proto::Deserialize,
    util::{macros::impl_num_enums, unit_convertor},
    Result,
};

// pitch, roll, yaw (i16), voltage in mV (u16), status code (u8)
pub const STATUS_PAYLOAD_SIZE: usize = 9;

impl_num_enums!(GimbalStatus, Ok = 0, Busy = 1, Fault = 2,);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatusReport {
    pub connected: bool,
    pub pitch: f32,
    pub roll: f32,
    pub yaw: f32,
    pub voltage: f32,
    pub status: GimbalStatus,
}

impl Deserialize for StatusReport {
    fn de(buf: &[u8]) -> Result<Self> {
        ensure_buf_size!(buf, STATUS_PAYLOAD_SIZE, "status reply");
        let mut reader = Cursor::new(buf);

        let pitch = unit_convertor::GIMBAL_PITCH_ANGLE_CONVERTOR.proto2val(reader.read_i16::<LE>()?);
        let roll = unit_convertor::GIMBAL_ROLL_ANGLE_CONVERTOR.proto2val(reader.read_i16::<LE>()?);
        let yaw = unit_convertor::GIMBAL_YAW_ANGLE_CONVERTOR.proto2val(reader.read_i16::<LE>()?);
        let voltage =
            unit_convertor::GIMBAL_VOLTAGE_CONVERTOR.proto2val_unsigned(reader.read_u16::<LE>()?);
        let status = reader.read_u8()?.try_into()?;

        Ok(StatusReport {
            connected: true,
            pitch,
            roll,
            yaw,
            voltage,
            status,
        })
    }
}
