//! HTTP/3 transport error codes (`H3_*`, 0x100-0x110) and QPACK codepoints
//! (0x200-0x202), per spec.md §7 "HTTP/3 transport" and RFC 9114 §8.1/RFC 9204.

#[derive(Debug, thiserror::Error, Clone, Copy, PartialEq, Eq)]
#[repr(u64)]
pub enum Http3Error {
    #[error("h3_no_error")]
    NoError = 0x100,
    #[error("h3_general_protocol_error")]
    GeneralProtocolError = 0x101,
    #[error("h3_internal_error")]
    InternalError = 0x102,
    #[error("h3_stream_creation_error")]
    StreamCreationError = 0x103,
    #[error("h3_closed_critical_stream")]
    ClosedCriticalStream = 0x104,
    #[error("h3_frame_unexpected")]
    FrameUnexpected = 0x105,
    #[error("h3_frame_error")]
    FrameError = 0x106,
    #[error("h3_excessive_load")]
    ExcessiveLoad = 0x107,
    #[error("h3_id_error")]
    IdError = 0x108,
    #[error("h3_settings_error")]
    SettingsError = 0x109,
    #[error("h3_missing_settings")]
    MissingSettings = 0x10a,
    #[error("h3_request_rejected")]
    RequestRejected = 0x10b,
    #[error("h3_request_cancelled")]
    RequestCancelled = 0x10c,
    #[error("h3_request_incomplete")]
    RequestIncomplete = 0x10d,
    #[error("h3_message_error")]
    MessageError = 0x10e,
    #[error("h3_connect_error")]
    ConnectError = 0x10f,
    #[error("h3_version_fallback")]
    VersionFallback = 0x110,
    #[error("qpack_decompression_failed")]
    QpackDecompressionFailed = 0x200,
    #[error("qpack_encoder_stream_error")]
    QpackEncoderStreamError = 0x201,
    #[error("qpack_decoder_stream_error")]
    QpackDecoderStreamError = 0x202,
    /// `on_conncloseframe(app_error=true, code)` where `code` falls outside
    /// the ranges above — decided in SPEC_FULL.md §12(b): exposed with the
    /// raw application code rather than dropped.
    #[error("application error 0x{0:x}")]
    Application(u64),
}

impl Http3Error {
    #[must_use]
    pub fn from_code(code: u64) -> Self {
        match code {
            0x100 => Self::NoError,
            0x101 => Self::GeneralProtocolError,
            0x102 => Self::InternalError,
            0x103 => Self::StreamCreationError,
            0x104 => Self::ClosedCriticalStream,
            0x105 => Self::FrameUnexpected,
            0x106 => Self::FrameError,
            0x107 => Self::ExcessiveLoad,
            0x108 => Self::IdError,
            0x109 => Self::SettingsError,
            0x10a => Self::MissingSettings,
            0x10b => Self::RequestRejected,
            0x10c => Self::RequestCancelled,
            0x10d => Self::RequestIncomplete,
            0x10e => Self::MessageError,
            0x10f => Self::ConnectError,
            0x110 => Self::VersionFallback,
            0x200 => Self::QpackDecompressionFailed,
            0x201 => Self::QpackEncoderStreamError,
            0x202 => Self::QpackDecoderStreamError,
            other => Self::Application(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unrecognized_app_error_carries_raw_code() {
        match Http3Error::from_code(0x42) {
            Http3Error::Application(code) => assert_eq!(code, 0x42),
            other => panic!("expected Application(0x42), got {other:?}"),
        }
    }

    #[test]
    fn registered_h3_and_qpack_codes_round_trip() {
        assert_eq!(Http3Error::from_code(0x100), Http3Error::NoError);
        assert_eq!(Http3Error::from_code(0x202), Http3Error::QpackDecoderStreamError);
    }
}
