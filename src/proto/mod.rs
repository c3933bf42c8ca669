use std::io::Write;

use crate::{ensure_buf_size, Error, Result};

pub const FRAME_HEADER: u8 = 0xFA;
pub const FRAME_HEADER_SIZE: usize = 2;

pub trait Serialize {
    const SIZE_HINT: usize;

    fn ser(&self, w: &mut impl Write) -> Result<()>;
}

pub trait Deserialize: Sized {
    fn de(buf: &[u8]) -> Result<Self>;
}

pub trait Message: Serialize {
    const IDENT: u8;
}

/// Command: a request the gimbal answers with a reply carrying the same ident.
pub trait Command: Message {
    type Response: std::fmt::Debug + Deserialize;
}

pub fn pack_msg<M: Message>(msg: &M) -> Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(FRAME_HEADER_SIZE + M::SIZE_HINT);
    buf.push(FRAME_HEADER);
    buf.push(M::IDENT);
    msg.ser(&mut buf)?;
    Ok(buf)
}

/// Splits a frame into its ident and payload.
pub fn unpack_raw(buf: &[u8]) -> Result<(u8, &[u8])> {
    ensure_buf_size!(buf, FRAME_HEADER_SIZE, "frame header");
    if buf[0] != FRAME_HEADER {
        return Err(Error::InvalidData(
            format!("invalid frame header {:#04x}", buf[0]).into(),
        ));
    }

    Ok((buf[1], &buf[FRAME_HEADER_SIZE..]))
}

pub fn unpack_resp<C: Command>(buf: &[u8]) -> Result<C::Response> {
    let (ident, body) = unpack_raw(buf)?;
    if ident != C::IDENT {
        return Err(Error::InvalidData(
            format!("unexpected reply ident {:#04x}, want {:#04x}", ident, C::IDENT).into(),
        ));
    }

    C::Response::de(body)
}

macro_rules! impl_msg {
    ($name:ident, $ident:expr) => {
        impl $crate::proto::Message for $name {
            const IDENT: u8 = $ident;
        }
    };
}

macro_rules! impl_cmd {
    ($name:ident, $resp:ty, $ident:expr) => {
        $crate::proto::impl_msg!($name, $ident);

        impl $crate::proto::Command for $name {
            type Response = $resp;
        }
    };
}

macro_rules! impl_empty_ser {
    ($name:ty) => {
        impl $crate::proto::Serialize for $name {
            const SIZE_HINT: usize = 0;

            fn ser(&self, _w: &mut impl std::io::Write) -> $crate::Result<()> {
                Ok(())
            }
        }
    };
}

pub(crate) use impl_cmd;
pub(crate) use impl_empty_ser;
pub(crate) use impl_msg;
