//! QUIC connection- and stream-level error categories.
//!
//! Grounded on `original_source/include/nexus/quic/error.hpp`, which splits
//! `nexus::quic::errc` into connection-scoped and stream-scoped codes.

/// Connection-level QUIC errors (spec.md §7 "QUIC connection").
#[derive(Debug, thiserror::Error, Clone, Copy, PartialEq, Eq)]
pub enum QuicConnectionError {
    /// The connection was aborted locally, e.g. by dropping its handle.
    #[error("connection aborted")]
    Aborted,
    /// The peer reset the connection (stateless reset, or CONNECTION_CLOSE
    /// with no application-meaningful code).
    #[error("connection reset by peer")]
    Reset,
    /// The peer is shutting down gracefully (CONNECTION_CLOSE no_error after
    /// GOAWAY-equivalent signaling at the HTTP/3 layer).
    #[error("connection going away")]
    GoingAway,
    /// The idle timeout or handshake timeout fired.
    #[error("connection timed out")]
    TimedOut,
    /// The TLS handshake failed to complete.
    #[error("handshake failed")]
    HandshakeFailed,
}

/// Stream-level QUIC errors (spec.md §7 "QUIC stream").
#[derive(Debug, thiserror::Error, Clone, Copy, PartialEq, Eq)]
pub enum QuicStreamError {
    /// The stream was reset, locally or by the peer.
    #[error("stream reset")]
    Reset,
    /// Orderly end of stream (FIN). Not an error for `read_some` — callers
    /// observe this as `Ok(0)` with an `end_of_stream` marker, never as an
    /// `Err`; it is listed here only so waiter fail-forward can carry it
    /// uniformly with the other stream-scoped outcomes.
    #[error("end of stream")]
    EndOfStream,
    /// A second concurrent operation of the same kind was attempted on the
    /// stream (spec.md §4.2 "Contract", concurrency rule).
    #[error("stream busy: a conflicting operation is already pending")]
    Busy,
    /// A write was attempted after `shutdown(write)` closed the local write
    /// half (spec.md §4.2 "I/O semantics").
    #[error("broken pipe")]
    BrokenPipe,
}

impl QuicConnectionError {
    /// Matches `errc::connection_reset` for abstract comparison (spec.md §7(e)).
    #[must_use]
    pub fn is_connection_reset(&self) -> bool {
        matches!(self, Self::Reset)
    }

    /// Matches `errc::connection_aborted` for abstract comparison (spec.md §7(e)).
    #[must_use]
    pub fn is_connection_aborted(&self) -> bool {
        matches!(self, Self::Aborted | Self::GoingAway)
    }
}

impl QuicStreamError {
    /// Matches `errc::device_or_resource_busy` for abstract comparison.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Busy)
    }

    /// Matches `errc::broken_pipe` for abstract comparison.
    #[must_use]
    pub fn is_broken_pipe(&self) -> bool {
        matches!(self, Self::BrokenPipe)
    }
}
