use std::fmt;

use audiopus::ErrorCode;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionKind {
    Encoder,
    Decoder,
}

impl fmt::Display for SessionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionKind::Encoder => write!(f, "encoder"),
            SessionKind::Decoder => write!(f, "decoder"),
        }
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("Opus {0} is not initialized")]
    Uninitialized(SessionKind),

    #[error("Invalid parameter: {0}")]
    InvalidParam(String),

    #[error("Codec error: {0}")]
    Codec(audiopus::Error),

    #[error("Buffer too small for payload: {0}")]
    BufferTooSmall(audiopus::Error),
}

impl From<audiopus::Error> for Error {
    fn from(e: audiopus::Error) -> Self {
        match e {
            audiopus::Error::Opus(ErrorCode::BufferTooSmall) => Error::BufferTooSmall(e),
            _ => Error::Codec(e),
        }
    }
}

impl Error {
    /// Collapses the error onto libopus' negative status-code space, for
    /// callers that speak the raw C convention.
    pub fn status_code(&self) -> i32 {
        match self {
            Error::Uninitialized(_) => ErrorCode::InvalidState as i32,
            Error::InvalidParam(_) => ErrorCode::BadArgument as i32,
            Error::Codec(e) | Error::BufferTooSmall(e) => match e {
                audiopus::Error::Opus(code) => *code as i32,
                _ => ErrorCode::BadArgument as i32,
            },
        }
    }
}

pub type BlueVoiceResult<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uninitialized_status_code() {
        let err = Error::Uninitialized(SessionKind::Decoder);
        assert_eq!(err.status_code(), -6);
        assert_eq!(err.to_string(), "Opus decoder is not initialized");
    }

    #[test]
    fn test_invalid_param_status_code() {
        let err = Error::InvalidParam("channels must be 1 or 2, got 5".into());
        assert_eq!(err.status_code(), -1);
    }

    #[test]
    fn test_invalid_param_matches_codec_bad_argument_code() {
        let bridged = Error::InvalidParam("unsupported sample rate 44100 Hz".into());
        let native = Error::from(audiopus::Error::Opus(ErrorCode::BadArgument));
        assert_eq!(bridged.status_code(), native.status_code());
        assert_eq!(native.status_code(), -1);
    }

    #[test]
    fn test_codec_error_preserves_status_code() {
        let err = Error::from(audiopus::Error::Opus(ErrorCode::InvalidPacket));
        assert!(matches!(err, Error::Codec(_)));
        assert_eq!(err.status_code(), -4);
    }

    #[test]
    fn test_buffer_too_small_gets_its_own_variant() {
        let err = Error::from(audiopus::Error::Opus(ErrorCode::BufferTooSmall));
        assert!(matches!(err, Error::BufferTooSmall(_)));
        assert_eq!(err.status_code(), -2);
    }
}
