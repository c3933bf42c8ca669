use std::borrow::Cow;
use std::fmt;

#[derive(Debug)]
pub enum Error {
    NotConnected,
    IO(std::io::Error),
    NotEnoughData {
        want: usize,
        got: usize,
        msg: Option<Cow<'static, str>>,
    },
    InvalidData(Cow<'static, str>),
    SensorUnavailable(Cow<'static, str>),
    Config(serde_json::Error),
    Other(Cow<'static, str>),
}

impl Error {
    /// Malformed or short input on the decode path.
    pub fn is_decode(&self) -> bool {
        matches!(self, Self::NotEnoughData { .. } | Self::InvalidData(_))
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, Self::IO(_))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotConnected => f.write_str("not connected"),
            Self::IO(e) => write!(f, "transport error: {}", e),
            Self::NotEnoughData { want, got, msg } => {
                write!(f, "not enough data: want {} bytes, got {}", want, got)?;
                if let Some(msg) = msg {
                    write!(f, " ({})", msg)?;
                }

                Ok(())
            }
            Self::InvalidData(msg) => write!(f, "invalid data: {}", msg),
            Self::SensorUnavailable(msg) => write!(f, "sensor unavailable: {}", msg),
            Self::Config(e) => write!(f, "config error: {}", e),
            Self::Other(msg) => f.write_str(msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::IO(e) => Some(e),
            Self::Config(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::IO(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Config(e)
    }
}

macro_rules! ensure_buf_size {
    ($buf:expr, $size:expr) => {
        if $buf.len() < $size {
            return Err($crate::Error::NotEnoughData {
                want: $size,
                got: $buf.len(),
                msg: None,
            });
        }
    };

    ($buf:expr, $size:expr, $msg:expr) => {
        if $buf.len() < $size {
            return Err($crate::Error::NotEnoughData {
                want: $size,
                got: $buf.len(),
                msg: Some($msg.into()),
            });
        }
    };
}

pub(crate) use ensure_buf_size;

#[cfg(test)]
mod tests {
    use super::*;

    fn check_len(buf: &[u8]) -> crate::Result<()> {
        ensure_buf_size!(buf, 4, "test frame");
        Ok(())
    }

    #[test]
    fn test_ensure_buf_size() {
        assert!(check_len(&[0; 4]).is_ok());

        let err = check_len(&[0; 2]).unwrap_err();
        assert!(err.is_decode());
        match err {
            Error::NotEnoughData { want, got, msg } => {
                assert_eq!(want, 4);
                assert_eq!(got, 2);
                assert_eq!(msg.as_deref(), Some("test frame"));
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_error_class() {
        let io: Error = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "gone").into();
        assert!(io.is_transport());
        assert!(!io.is_decode());
        assert!(!Error::NotConnected.is_transport());
        assert_eq!(Error::NotConnected.to_string(), "not connected");
    }
}
