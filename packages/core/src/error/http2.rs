//! HTTP/2 protocol error codes, per RFC 9113 §7 and spec.md §7 "HTTP/2 protocol".
//!
//! Grounded on `original_source/include/http2/error.hpp`.

/// An HTTP/2 error code, as carried in `RST_STREAM`/`GOAWAY` frames.
#[derive(Debug, thiserror::Error, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum Http2Error {
    #[error("no error")]
    NoError = 0x0,
    #[error("protocol error")]
    ProtocolError = 0x1,
    #[error("internal error")]
    InternalError = 0x2,
    #[error("flow control error")]
    FlowControlError = 0x3,
    #[error("settings timeout")]
    SettingsTimeout = 0x4,
    #[error("stream closed")]
    StreamClosed = 0x5,
    #[error("frame size error")]
    FrameSizeError = 0x6,
    #[error("refused stream")]
    RefusedStream = 0x7,
    #[error("cancel")]
    Cancel = 0x8,
    #[error("compression error")]
    CompressionError = 0x9,
    #[error("connect error")]
    ConnectError = 0xa,
    #[error("enhance your calm")]
    EnhanceYourCalm = 0xb,
    #[error("inadequate security")]
    InadequateSecurity = 0xc,
    #[error("http/1.1 required")]
    Http1_1Required = 0xd,
}

impl Http2Error {
    #[must_use]
    pub fn from_code(code: u32) -> Option<Self> {
        Some(match code {
            0x0 => Self::NoError,
            0x1 => Self::ProtocolError,
            0x2 => Self::InternalError,
            0x3 => Self::FlowControlError,
            0x4 => Self::SettingsTimeout,
            0x5 => Self::StreamClosed,
            0x6 => Self::FrameSizeError,
            0x7 => Self::RefusedStream,
            0x8 => Self::Cancel,
            0x9 => Self::CompressionError,
            0xa => Self::ConnectError,
            0xb => Self::EnhanceYourCalm,
            0xc => Self::InadequateSecurity,
            0xd => Self::Http1_1Required,
            _ => return None,
        })
    }

    #[must_use]
    pub fn code(&self) -> u32 {
        *self as u32
    }
}
