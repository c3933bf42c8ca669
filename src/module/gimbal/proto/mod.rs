pub mod cmd;
pub mod status;

pub const CMD_SET_ANGLE: u8 = 0x0E;
pub const CMD_SET_SPEED: u8 = 0x0F;
pub const CMD_GET_STATUS: u8 = 0x10;
