//! The `connection` facade (spec.md §4.3 "Contract"): `connect(stream)`,
//! `accept(stream)`, `remote_endpoint()`, `close()`.

use std::net::SocketAddr;
use std::time::Duration;

use nexusq_core::connection::ConnectionState;
use nexusq_core::error::{Error, Result};
use nexusq_core::wire::{ConnectionId, StreamId};

use crate::engine_handle::Shared;
use crate::stream::Stream;

/// A move-only handle to one QUIC connection (spec.md §5 "Shared
/// resources": "move-only and not themselves thread-safe").
pub struct Connection {
    pub(crate) id: ConnectionId,
    pub(crate) shared: Shared,
    pub(crate) remote: SocketAddr,
    next_stream_counter: u64,
}

impl Connection {
    pub(crate) fn new(id: ConnectionId, shared: Shared, remote: SocketAddr) -> Self {
        Connection { id, shared, remote, next_stream_counter: 0 }
    }

    #[must_use]
    pub fn remote_endpoint(&self) -> SocketAddr {
        self.remote
    }

    /// Opens a new outbound stream, suspending until the engine allocates a
    /// handle (spec.md §4.2 "Lifecycle": "`connect()` enqueues it into the
    /// connection's `connecting_streams`... when the handle is delivered
    /// the waiter completes and the stream moves to `open`").
    pub async fn stream_connect(&mut self) -> Result<Stream> {
        let local_id = StreamId::new(self.next_stream_counter * 4).expect("fits in 62 bits");
        self.next_stream_counter += 1;

        {
            let mut inner = self.shared.lock().await;
            match inner.connections.get_mut(&self.id) {
                Some(ConnectionState::Open(open)) => {
                    open.streams.connecting.insert(local_id, nexusq_core::stream::Stream::new(local_id));
                }
                _ => return Err(Error::OperationAborted),
            }
        }

        // Suspend until the engine's `on_new_stream`/handshake machinery
        // moves the handle from `connecting` to `open` (spec.md §4.2
        // "Lifecycle").
        drive_until(&self.shared, Duration::from_secs(30), |inner| match inner.connections.get_mut(&self.id) {
            Some(ConnectionState::Open(open)) if open.streams.connecting.contains_key(&local_id) => {
                open.streams.move_stream(local_id, |s| &mut s.connecting, |s| &mut s.open);
                Some(Ok(()))
            }
            Some(ConnectionState::Error { ec }) => Some(Err(ec.clone())),
            Some(ConnectionState::Closed) => Some(Err(Error::OperationAborted)),
            _ => None,
        })
        .await?;

        Ok(Stream::new(self.id.clone(), local_id, self.shared.clone()))
    }

    /// Accepts the next peer-initiated stream (spec.md §4.2 "Lifecycle":
    /// "An accepted stream is created by the engine's 'on new stream'
    /// callback, stored in `incoming_streams`; the first `accept` drains it
    /// into the application's handle").
    pub async fn stream_accept(&mut self) -> Result<Stream> {
        let id = drive_until(&self.shared, Duration::from_secs(30), |inner| {
            if let Some(ConnectionState::Open(open)) = inner.connections.get_mut(&self.id) {
                if let Some((stream_id, _)) = open.streams.incoming.first() {
                    let stream_id = *stream_id;
                    open.streams.move_stream(stream_id, |s| &mut s.incoming, |s| &mut s.open);
                    return Some(Ok(stream_id));
                }
            }
            None
        })
        .await?;
        Ok(Stream::new(self.id.clone(), id, self.shared.clone()))
    }

    /// Local `close()` (spec.md §4.3 state table: `open -> closing ->
    /// closed`).
    pub async fn close(&mut self) {
        let mut inner = self.shared.lock().await;
        if let Some(state) = inner.connections.get_mut(&self.id) {
            state.handle_closed();
        }
    }
}

/// Repeatedly locks `shared`, ticks the engine, and asks `check` whether
/// the awaited condition has been met, bounded by `timeout` (spec.md §5
/// "Suspension points": callers compose their own deadline around a
/// waiter-driven suspension).
pub(crate) async fn drive_until<F, T>(shared: &Shared, timeout: Duration, mut check: F) -> Result<T>
where
    F: FnMut(&mut crate::engine_handle::Inner) -> Option<Result<T>>,
{
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        {
            let mut inner = shared.lock().await;
            if let Some(result) = check(&mut inner) {
                return result;
            }
            let _ = inner.tick();
        }
        if tokio::time::Instant::now() >= deadline {
            return Err(Error::Connection(nexusq_core::error::QuicConnectionError::TimedOut));
        }
        tokio::task::yield_now().await;
    }
}
