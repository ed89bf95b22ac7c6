//! The callback surface the engine invokes while draining the QUIC state
//! machine's event queue (spec.md §4.4 item 2), translated from
//! `engine_impl.hpp`'s `on_connect`/`on_handshake`/`on_close`/
//! `on_new_stream`/`on_stream_read`/`on_stream_write`/`on_stream_close`/
//! `on_conncloseframe` methods into one trait the engine drives.

use std::net::SocketAddr;

use crate::error::Error;
use crate::wire::{ConnectionId, StreamId};

/// Implemented by whatever owns the connection/stream tables (the socket
/// facade in `packages/api`); the engine calls these as it drains quiche's
/// event queue, never holding the engine mutex across the call (spec.md
/// §4.4 "Concurrency contract": waiters are dispatched to the caller's
/// executor, not invoked under the engine mutex).
pub trait EngineCallbacks {
    /// A new incoming connection was accepted at the QUIC layer and is
    /// ready for the TLS handshake to begin.
    fn on_new_connection(&mut self, id: &ConnectionId, peer: SocketAddr);

    /// The handshake completed, successfully or not.
    fn on_handshake(&mut self, id: &ConnectionId, result: Result<(), Error>);

    /// The connection is fully closed and may be removed from all tables.
    fn on_connection_close(&mut self, id: &ConnectionId, result: Result<(), Error>);

    /// The peer opened a new stream.
    fn on_new_stream(&mut self, conn: &ConnectionId, stream: StreamId);

    /// New readable bytes (or FIN) are available on a stream.
    fn on_stream_read(&mut self, conn: &ConnectionId, stream: StreamId);

    /// The outbound window admitted more bytes; pending writers may proceed.
    fn on_stream_write(&mut self, conn: &ConnectionId, stream: StreamId);

    /// The stream is fully closed.
    fn on_stream_close(&mut self, conn: &ConnectionId, stream: StreamId, result: Result<(), Error>);

    /// The peer sent a `CONNECTION_CLOSE` frame. `app_error` distinguishes
    /// an application-layer code from a transport-layer one; mapping is
    /// spec.md §12(b): an `app_error` code outside the registered H3/QPACK
    /// ranges is exposed as `Http3Error::Application(code)` rather than
    /// dropped.
    fn on_conncloseframe(&mut self, conn: &ConnectionId, app_error: bool, code: u64);
}
