//! QUIC transport error codes (peer-sent `CONNECTION_CLOSE` frames, codes
//! 0x00-0x10), per spec.md §7 "Transport" and RFC 9000 §20.1.
//!
//! Peer `CONNECTION_CLOSE` codes are mapped 1:1 onto this enum (spec.md §7(d))
//! and latched onto the connection as its `pending_error`.

/// A QUIC transport error code, as carried in a `CONNECTION_CLOSE` frame.
#[derive(Debug, thiserror::Error, Clone, Copy, PartialEq, Eq)]
#[repr(u64)]
pub enum TransportError {
    #[error("no error")]
    NoError = 0x00,
    #[error("internal error")]
    InternalError = 0x01,
    #[error("connection refused")]
    ConnectionRefused = 0x02,
    #[error("flow control error")]
    FlowControlError = 0x03,
    #[error("stream limit error")]
    StreamLimitError = 0x04,
    #[error("stream state error")]
    StreamStateError = 0x05,
    #[error("final size error")]
    FinalSizeError = 0x06,
    #[error("frame encoding error")]
    FrameEncodingError = 0x07,
    #[error("transport parameter error")]
    TransportParameterError = 0x08,
    #[error("connection id limit error")]
    ConnectionIdLimitError = 0x09,
    #[error("protocol violation")]
    ProtocolViolation = 0x0a,
    #[error("invalid token")]
    InvalidToken = 0x0b,
    #[error("application error")]
    ApplicationError = 0x0c,
    #[error("crypto buffer exceeded")]
    CryptoBufferExceeded = 0x0d,
    #[error("key update error")]
    KeyUpdateError = 0x0e,
    #[error("aead limit reached")]
    AeadLimitReached = 0x0f,
    #[error("no viable path")]
    NoViablePath = 0x10,
}

impl TransportError {
    /// Maps a raw wire code, as reported through the QUIC engine's
    /// `on_conncloseframe` callback, onto this enum. Codes outside
    /// `0x00..=0x10` are not transport errors proper.
    #[must_use]
    pub fn from_code(code: u64) -> Option<Self> {
        Some(match code {
            0x00 => Self::NoError,
            0x01 => Self::InternalError,
            0x02 => Self::ConnectionRefused,
            0x03 => Self::FlowControlError,
            0x04 => Self::StreamLimitError,
            0x05 => Self::StreamStateError,
            0x06 => Self::FinalSizeError,
            0x07 => Self::FrameEncodingError,
            0x08 => Self::TransportParameterError,
            0x09 => Self::ConnectionIdLimitError,
            0x0a => Self::ProtocolViolation,
            0x0b => Self::InvalidToken,
            0x0c => Self::ApplicationError,
            0x0d => Self::CryptoBufferExceeded,
            0x0e => Self::KeyUpdateError,
            0x0f => Self::AeadLimitReached,
            0x10 => Self::NoViablePath,
            _ => return None,
        })
    }

    /// The wire code this variant was decoded from / encodes to.
    #[must_use]
    pub fn code(&self) -> u64 {
        *self as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_every_registered_code() {
        for code in 0x00u64..=0x10 {
            let err = TransportError::from_code(code).expect("registered code");
            assert_eq!(err.code(), code);
        }
    }

    #[test]
    fn unregistered_code_is_none() {
        assert!(TransportError::from_code(0x11).is_none());
        assert!(TransportError::from_code(u64::MAX).is_none());
    }

    #[test]
    fn s6_protocol_violation_maps_to_0x0a() {
        let err = TransportError::from_code(0x0a).unwrap();
        assert_eq!(err, TransportError::ProtocolViolation);
    }
}
