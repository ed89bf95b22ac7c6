//! Glue between `nexusq_core::engine::Engine` (the raw QUIC pump) and the
//! connection/stream state machines it drives. This is the facade's
//! implementation of spec.md §4.4's "external callers acquire the engine
//! mutex to post work" — a single `Inner` instance, shared via
//! `Arc<tokio::sync::Mutex<_>>`, is the engine mutex.

use std::net::SocketAddr;
use std::sync::Arc;

use indexmap::IndexMap;
use nexusq_core::connection::ConnectionState;
use nexusq_core::engine::{Engine, EngineCallbacks};
use nexusq_core::error::Error;
use nexusq_core::wire::{ConnectionId, StreamId};
use tokio::sync::Mutex;

pub(crate) struct Inner {
    pub(crate) engine: Engine,
    pub(crate) connections: IndexMap<ConnectionId, ConnectionState>,
    /// Peer address of each connection still in `Accepting`, recorded off
    /// `on_new_connection` since the callback surface doesn't thread it any
    /// further (spec.md §4.3 "Accept queue"). Cleared once an `Acceptor`
    /// drains the id into an application-visible `Connection`.
    pub(crate) pending_remotes: IndexMap<ConnectionId, SocketAddr>,
}

pub(crate) type Shared = Arc<Mutex<Inner>>;

impl Inner {
    /// One engine tick, dispatching callbacks into `self.connections`
    /// (`engine_impl::process`, generalized across the disjoint
    /// `engine`/`connections` borrow).
    pub(crate) fn tick(&mut self) -> std::io::Result<()> {
        let Inner { engine, connections, pending_remotes } = self;
        let mut adapter = CallbackAdapter { connections, pending_remotes };
        engine.process(&mut adapter)
    }
}

struct CallbackAdapter<'a> {
    connections: &'a mut IndexMap<ConnectionId, ConnectionState>,
    pending_remotes: &'a mut IndexMap<ConnectionId, SocketAddr>,
}

impl EngineCallbacks for CallbackAdapter<'_> {
    fn on_new_connection(&mut self, id: &ConnectionId, peer: SocketAddr) {
        self.connections.entry(id.clone()).or_insert_with(ConnectionState::new_accepting);
        self.pending_remotes.insert(id.clone(), peer);
    }

    fn on_handshake(&mut self, id: &ConnectionId, result: Result<(), Error>) {
        if let Some(state) = self.connections.get_mut(id) {
            match result {
                Ok(()) => state.handle_accepted(),
                Err(err) => state.handle_error(err),
            }
        }
    }

    fn on_connection_close(&mut self, id: &ConnectionId, result: Result<(), Error>) {
        if let Some(state) = self.connections.get_mut(id) {
            if let Err(err) = result {
                state.handle_error(err);
            }
            state.handle_closed();
        }
    }

    fn on_new_stream(&mut self, conn: &ConnectionId, stream: StreamId) {
        if let Some(ConnectionState::Open(open)) = self.connections.get_mut(conn) {
            open.streams.incoming.entry(stream).or_insert_with(|| nexusq_core::stream::Stream::new(stream));
        }
    }

    fn on_stream_read(&mut self, conn: &ConnectionId, stream: StreamId) {
        if let Some(ConnectionState::Open(open)) = self.connections.get_mut(conn) {
            for table in open.streams.all_tables_mut() {
                if let Some(s) = table.get_mut(&stream) {
                    s.waiters.read.complete(Ok(0));
                    break;
                }
            }
        }
    }

    fn on_stream_write(&mut self, conn: &ConnectionId, stream: StreamId) {
        if let Some(ConnectionState::Open(open)) = self.connections.get_mut(conn) {
            for table in open.streams.all_tables_mut() {
                if let Some(s) = table.get_mut(&stream) {
                    s.waiters.write.complete(Ok(0));
                    break;
                }
            }
        }
    }

    fn on_stream_close(&mut self, conn: &ConnectionId, stream: StreamId, result: Result<(), Error>) {
        if let Some(ConnectionState::Open(open)) = self.connections.get_mut(conn) {
            for table in open.streams.all_tables_mut() {
                if let Some(s) = table.get_mut(&stream) {
                    if let Err(err) = &result {
                        s.waiters.fail_all(err.clone());
                    }
                    s.close();
                    break;
                }
            }
        }
    }

    fn on_conncloseframe(&mut self, conn: &ConnectionId, app_error: bool, code: u64) {
        if let Some(ConnectionState::Open(open)) = self.connections.get_mut(conn) {
            let err = if app_error {
                Error::Http3(nexusq_core::error::Http3Error::from_code(code))
            } else {
                match nexusq_core::error::TransportError::from_code(code) {
                    Some(t) => Error::Transport(t),
                    None => Error::Connection(nexusq_core::error::QuicConnectionError::Reset),
                }
            };
            open.pending_error.get_or_insert(err);
        }
    }
}
