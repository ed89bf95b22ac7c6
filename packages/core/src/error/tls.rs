//! TLS alert codes, per RFC 8446 §6 and spec.md §7 "TLS alerts".
//!
//! The TLS handshake itself is delegated to `rustls`/`quiche`'s embedded
//! BoringSSL (spec.md §1, "out of scope"); this enum only gives a stable
//! name to the alert byte those libraries report back through the engine's
//! handshake callback.

/// A standard RFC 8446 TLS alert description.
#[derive(Debug, thiserror::Error, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum TlsAlert {
    #[error("close_notify")]
    CloseNotify = 0,
    #[error("unexpected_message")]
    UnexpectedMessage = 10,
    #[error("bad_record_mac")]
    BadRecordMac = 20,
    #[error("record_overflow")]
    RecordOverflow = 22,
    #[error("handshake_failure")]
    HandshakeFailure = 40,
    #[error("bad_certificate")]
    BadCertificate = 42,
    #[error("unsupported_certificate")]
    UnsupportedCertificate = 43,
    #[error("certificate_revoked")]
    CertificateRevoked = 44,
    #[error("certificate_expired")]
    CertificateExpired = 45,
    #[error("certificate_unknown")]
    CertificateUnknown = 46,
    #[error("illegal_parameter")]
    IllegalParameter = 47,
    #[error("unknown_ca")]
    UnknownCa = 48,
    #[error("access_denied")]
    AccessDenied = 49,
    #[error("decode_error")]
    DecodeError = 50,
    #[error("decrypt_error")]
    DecryptError = 51,
    #[error("protocol_version")]
    ProtocolVersion = 70,
    #[error("insufficient_security")]
    InsufficientSecurity = 71,
    #[error("internal_error")]
    InternalError = 80,
    #[error("inappropriate_fallback")]
    InappropriateFallback = 86,
    #[error("user_canceled")]
    UserCanceled = 90,
    #[error("missing_extension")]
    MissingExtension = 109,
    #[error("unsupported_extension")]
    UnsupportedExtension = 110,
    #[error("unrecognized_name")]
    UnrecognizedName = 112,
    #[error("bad_certificate_status_response")]
    BadCertificateStatusResponse = 113,
    #[error("unknown_psk_identity")]
    UnknownPskIdentity = 115,
    #[error("certificate_required")]
    CertificateRequired = 116,
    #[error("no_application_protocol")]
    NoApplicationProtocol = 120,
    #[error("unrecognized alert code {0}")]
    Unknown(u8),
}

impl TlsAlert {
    #[must_use]
    pub fn from_code(code: u8) -> Self {
        match code {
            0 => Self::CloseNotify,
            10 => Self::UnexpectedMessage,
            20 => Self::BadRecordMac,
            22 => Self::RecordOverflow,
            40 => Self::HandshakeFailure,
            42 => Self::BadCertificate,
            43 => Self::UnsupportedCertificate,
            44 => Self::CertificateRevoked,
            45 => Self::CertificateExpired,
            46 => Self::CertificateUnknown,
            47 => Self::IllegalParameter,
            48 => Self::UnknownCa,
            49 => Self::AccessDenied,
            50 => Self::DecodeError,
            51 => Self::DecryptError,
            70 => Self::ProtocolVersion,
            71 => Self::InsufficientSecurity,
            80 => Self::InternalError,
            86 => Self::InappropriateFallback,
            90 => Self::UserCanceled,
            109 => Self::MissingExtension,
            110 => Self::UnsupportedExtension,
            112 => Self::UnrecognizedName,
            113 => Self::BadCertificateStatusResponse,
            115 => Self::UnknownPskIdentity,
            116 => Self::CertificateRequired,
            120 => Self::NoApplicationProtocol,
            other => Self::Unknown(other),
        }
    }
}
