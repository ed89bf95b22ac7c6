//! Namespaced error categories (spec.md §7) composed into one crate-level
//! [`Error`] enum, the way `quyc_client::error` composes `TlsError` and the
//! other category types into its own `Kind`/`Error` pair.

pub mod base64url;
pub mod global;
pub mod h3;
pub mod hpack;
pub mod http2;
pub mod quic;
pub mod tls;
pub mod transport;

pub use base64url::Base64UrlError;
pub use global::GlobalError;
pub use h3::Http3Error;
pub use hpack::HpackError;
pub use http2::Http2Error;
pub use quic::{QuicConnectionError, QuicStreamError};
pub use tls::TlsAlert;
pub use transport::TransportError;

/// The crate-level error type. Every fallible operation in `nexusq_core`
/// returns `Result<T, Error>`; codec-level functions instead return the
/// narrower `Result<T, HpackError>` / `Result<T, Base64UrlError>` etc.
/// directly (spec.md §7(a): "codec errors are returned in-place").
#[derive(Debug, thiserror::Error, Clone)]
pub enum Error {
    #[error(transparent)]
    Global(#[from] GlobalError),
    #[error(transparent)]
    Connection(#[from] QuicConnectionError),
    #[error(transparent)]
    Stream(#[from] QuicStreamError),
    #[error("peer closed the connection: {0}")]
    Transport(#[from] TransportError),
    #[error("tls alert: {0}")]
    Tls(#[from] TlsAlert),
    #[error(transparent)]
    Http2(#[from] Http2Error),
    #[error(transparent)]
    Hpack(#[from] HpackError),
    #[error(transparent)]
    Http3(#[from] Http3Error),
    #[error(transparent)]
    Base64Url(#[from] Base64UrlError),
    /// The operation was cancelled because its handle (or the connection/
    /// stream it belonged to) was dropped, and no more specific error was
    /// latched (spec.md §7(c), §5 "Cancellation").
    #[error("operation aborted")]
    OperationAborted,
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// `error_condition`-style abstract matching (spec.md §7(e)): lets
    /// callers check "was this a reset?" without caring whether it came
    /// from the QUIC or HTTP/2 path.
    #[must_use]
    pub fn is_connection_reset(&self) -> bool {
        match self {
            Self::Connection(e) => e.is_connection_reset(),
            Self::Transport(TransportError::NoError) => false,
            Self::Transport(_) => true,
            _ => false,
        }
    }

    #[must_use]
    pub fn is_connection_aborted(&self) -> bool {
        matches!(self, Self::Connection(e) if e.is_connection_aborted())
            || matches!(self, Self::OperationAborted)
    }

    #[must_use]
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Stream(e) if e.is_busy())
    }

    #[must_use]
    pub fn is_broken_pipe(&self) -> bool {
        matches!(self, Self::Stream(e) if e.is_broken_pipe())
    }

    #[must_use]
    pub fn is_end_of_stream(&self) -> bool {
        matches!(self, Self::Stream(QuicStreamError::EndOfStream))
    }
}
