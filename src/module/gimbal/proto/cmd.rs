use std::io::Write;

use byteorder::{WriteBytesExt, LE};

use super::{status::StatusReport, CMD_GET_STATUS, CMD_SET_ANGLE, CMD_SET_SPEED};
use crate::{
    module::common::{Pose, SpeedCommand},
    proto::{impl_cmd, impl_empty_ser, impl_msg, Serialize},
    util::unit_convertor,
    Result,
};

impl_msg!(SetAngle, CMD_SET_ANGLE);

/// Absolute angles in hundredths of a degree.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SetAngle {
    pub pitch: i16,
    pub roll: i16,
    pub yaw: i16,
}

impl SetAngle {
    /// Clamps each axis to its range before scaling.
    pub fn from_pose(pose: Pose) -> Result<Self> {
        Ok(Self {
            pitch: unit_convertor::GIMBAL_PITCH_ANGLE_CONVERTOR.val2proto(pose.pitch)?,
            roll: unit_convertor::GIMBAL_ROLL_ANGLE_CONVERTOR.val2proto(pose.roll)?,
            yaw: unit_convertor::GIMBAL_YAW_ANGLE_CONVERTOR.val2proto(pose.yaw)?,
        })
    }
}

impl Serialize for SetAngle {
    const SIZE_HINT: usize = 6;

    fn ser(&self, w: &mut impl Write) -> Result<()> {
        w.write_i16::<LE>(self.pitch)?;
        w.write_i16::<LE>(self.roll)?;
        w.write_i16::<LE>(self.yaw)?;
        Ok(())
    }
}

impl_msg!(SetSpeed, CMD_SET_SPEED);

/// Rotation speeds in tenths of a degree per second.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SetSpeed {
    pub pitch: i16,
    pub roll: i16,
    pub yaw: i16,
}

impl SetSpeed {
    pub fn from_speed(speed: SpeedCommand) -> Result<Self> {
        Ok(Self {
            pitch: unit_convertor::GIMBAL_SPEED_CONVERTOR.val2proto(speed.pitch_speed)?,
            roll: unit_convertor::GIMBAL_SPEED_CONVERTOR.val2proto(speed.roll_speed)?,
            yaw: unit_convertor::GIMBAL_SPEED_CONVERTOR.val2proto(speed.yaw_speed)?,
        })
    }
}

impl Serialize for SetSpeed {
    const SIZE_HINT: usize = 6;

    fn ser(&self, w: &mut impl Write) -> Result<()> {
        w.write_i16::<LE>(self.pitch)?;
        w.write_i16::<LE>(self.roll)?;
        w.write_i16::<LE>(self.yaw)?;
        Ok(())
    }
}

impl_cmd!(GetStatus, StatusReport, CMD_GET_STATUS);

#[derive(Debug, Default, Clone, Copy)]
pub struct GetStatus;

impl_empty_ser!(GetStatus);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proto::pack_msg;

    #[test]
    fn test_angle_frame() {
        let cmd = SetAngle::from_pose(Pose::new(12.34, -1.0, 180.0)).unwrap();
        assert_eq!(
            cmd,
            SetAngle {
                pitch: 1234,
                roll: -100,
                yaw: 18000
            }
        );

        let frame = pack_msg(&cmd).unwrap();
        assert_eq!(
            frame,
            vec![0xFA, 0x0E, 0xD2, 0x04, 0x9C, 0xFF, 0x50, 0x46]
        );
        assert_eq!(i16::from_le_bytes([frame[2], frame[3]]), 1234);
    }

    #[test]
    fn test_angle_frame_clamps() {
        let cmd = SetAngle::from_pose(Pose::new(120.0, -150.0, 200.0)).unwrap();
        assert_eq!(
            cmd,
            SetAngle {
                pitch: 9000,
                roll: -9000,
                yaw: 18000
            }
        );
    }

    #[test]
    fn test_speed_frame() {
        let cmd = SetSpeed::from_speed(SpeedCommand::new(10.0, -2.55, 0.0)).unwrap();
        assert_eq!(cmd.pitch, 100);
        assert_eq!(cmd.roll, -25);
        assert_eq!(cmd.yaw, 0);

        let frame = pack_msg(&cmd).unwrap();
        assert_eq!(frame, vec![0xFA, 0x0F, 0x64, 0x00, 0xE7, 0xFF, 0x00, 0x00]);
    }

    #[test]
    fn test_speed_out_of_field_range() {
        assert!(SetSpeed::from_speed(SpeedCommand::new(4000.0, 0.0, 0.0)).is_err());
    }

    #[test]
    fn test_status_request_frame() {
        assert_eq!(pack_msg(&GetStatus).unwrap(), vec![0xFA, 0x10]);
    }
}
