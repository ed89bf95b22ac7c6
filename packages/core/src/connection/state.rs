//! Connection state machine, per spec.md §3 "Connection state" and §4.3
//! "State transitions". Grounded on
//! `original_source/include/nexus/quic/connection.hpp`'s state variant,
//! generalized to the `accepting/open/error/closed` tagged union spec.md
//! names explicitly, with insertion-ordered stream tables (`incoming`,
//! `connecting`, `accepting`, `open`, `closing`).

use indexmap::IndexMap;

use crate::error::Error;
use crate::stream::{Stream, Waiter, WaiterSlot};
use crate::wire::StreamId;

/// The five insertion-ordered stream tables a connection owns. "Every
/// stream pointer appears in exactly one table" (spec.md §3 invariant a).
#[derive(Default)]
pub struct StreamTables {
    pub incoming: IndexMap<StreamId, Stream>,
    pub connecting: IndexMap<StreamId, Stream>,
    pub accepting: IndexMap<StreamId, Stream>,
    pub open: IndexMap<StreamId, Stream>,
    pub closing: IndexMap<StreamId, Stream>,
}

impl StreamTables {
    /// Moves a stream between tables, preserving exactly-one-table
    /// membership. No-op if `id` isn't present in `from`.
    pub fn move_stream(
        &mut self,
        id: StreamId,
        from: impl FnOnce(&mut Self) -> &mut IndexMap<StreamId, Stream>,
        to: impl FnOnce(&mut Self) -> &mut IndexMap<StreamId, Stream>,
    ) {
        if let Some(stream) = from(self).shift_remove(&id) {
            to(self).insert(id, stream);
        }
    }

    /// Every stream table, for callers that need to search all of them
    /// (e.g. the engine callback adapter locating a stream by id without
    /// knowing which table currently holds it).
    pub fn all_tables_mut(&mut self) -> [&mut IndexMap<StreamId, Stream>; 5] {
        [&mut self.incoming, &mut self.connecting, &mut self.accepting, &mut self.open, &mut self.closing]
    }

    /// Fails every pending waiter on every stream across all tables
    /// exactly once (spec.md §8 invariant 6), used by the connection's
    /// waiter fail-forward rule.
    pub fn fail_all_stream_waiters(&mut self, err: &Error) {
        for table in self.all_tables_mut() {
            for stream in table.values_mut() {
                stream.waiters.fail_all(err.clone());
            }
        }
    }

    #[must_use]
    pub fn total_streams(&self) -> usize {
        self.incoming.len() + self.connecting.len() + self.accepting.len() + self.open.len() + self.closing.len()
    }
}

/// The "open" state's payload: a handle into the underlying QUIC state
/// machine, the stream tables, and a latched pending error (spec.md §3:
/// "open{handle, stream tables, pending_error}").
pub struct OpenConnection {
    pub streams: StreamTables,
    /// "A latched connection-level error delivered to all current and
    /// future waiters until the connection is destroyed" (GLOSSARY
    /// "Pending error"). Set once `error` is entered; `open` itself has no
    /// pending error yet.
    pub pending_error: Option<Error>,
    pub connect_waiters: Vec<WaiterSlot<()>>,
    pub accept_waiter: WaiterSlot<()>,
}

impl Default for OpenConnection {
    fn default() -> Self {
        OpenConnection {
            streams: StreamTables::default(),
            pending_error: None,
            connect_waiters: Vec::new(),
            accept_waiter: WaiterSlot::default(),
        }
    }
}

/// The connection-level tagged variant (spec.md §3 "Connection state").
pub enum ConnectionState {
    Accepting { waiter: WaiterSlot<()> },
    Open(OpenConnection),
    Error { ec: Error },
    Closed,
}

impl ConnectionState {
    #[must_use]
    pub fn new_accepting() -> Self {
        ConnectionState::Accepting { waiter: WaiterSlot::default() }
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        matches!(self, ConnectionState::Closed)
    }

    /// `accepting -> open` on `on_accept` (spec.md §4.3 state table),
    /// releasing the accept waiter.
    pub fn handle_accepted(&mut self) {
        if let ConnectionState::Accepting { waiter } = self {
            waiter.complete(Ok(()));
            *self = ConnectionState::Open(OpenConnection::default());
        }
    }

    /// `open -> error`, preserving whatever `pending_error` was already
    /// latched if one exists (spec.md §4.3 invariant b), then applying the
    /// waiter fail-forward rule (spec.md §4.3 "Waiter fail-forward rule").
    pub fn handle_error(&mut self, err: Error) {
        let latched = match self {
            ConnectionState::Open(open) => open.pending_error.clone().unwrap_or_else(|| err.clone()),
            _ => err.clone(),
        };
        if let ConnectionState::Open(open) = self {
            open.streams.fail_all_stream_waiters(&latched);
            for slot in &mut open.connect_waiters {
                slot.complete(Err(latched.clone()));
            }
            open.accept_waiter.complete(Err(latched.clone()));
        }
        if let ConnectionState::Accepting { waiter } = self {
            waiter.complete(Err(latched.clone()));
        }
        *self = ConnectionState::Error { ec: latched };
    }

    /// `open -> closed` or `error -> closed`: fails every residual waiter
    /// with the first non-generic error latched, or `operation_aborted` if
    /// none was (spec.md §4.3 invariant c).
    pub fn handle_closed(&mut self) {
        match self {
            ConnectionState::Open(open) => {
                let err = open.pending_error.clone().unwrap_or(Error::OperationAborted);
                open.streams.fail_all_stream_waiters(&err);
                for slot in &mut open.connect_waiters {
                    slot.complete(Err(err.clone()));
                }
                open.accept_waiter.complete(Err(err));
            }
            ConnectionState::Error { .. } | ConnectionState::Accepting { .. } => {}
            ConnectionState::Closed => return,
        }
        *self = ConnectionState::Closed;
    }

    /// Registers a new stream-connect waiter, usable only in `open`.
    pub fn add_connect_waiter(&mut self, waiter: Waiter<()>) -> crate::error::Result<()> {
        match self {
            ConnectionState::Open(open) => {
                let mut slot = WaiterSlot::default();
                slot.set(waiter)?;
                open.connect_waiters.push(slot);
                Ok(())
            }
            _ => {
                waiter.complete(Err(Error::OperationAborted));
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::Waiter;

    #[test]
    fn accepting_transitions_to_open_and_releases_waiter() {
        let mut state = ConnectionState::new_accepting();
        let (w, rx) = Waiter::<()>::new_async();
        if let ConnectionState::Accepting { waiter } = &mut state {
            waiter.set(w).unwrap();
        }
        state.handle_accepted();
        assert!(matches!(state, ConnectionState::Open(_)));
        drop(rx);
    }

    #[test]
    fn error_preserves_latched_pending_error_over_a_fresh_one() {
        let mut state = ConnectionState::Open(OpenConnection::default());
        if let ConnectionState::Open(open) = &mut state {
            open.pending_error = Some(Error::Connection(crate::error::QuicConnectionError::TimedOut));
        }
        state.handle_error(Error::OperationAborted);
        match state {
            ConnectionState::Error { ec } => {
                assert!(matches!(ec, Error::Connection(crate::error::QuicConnectionError::TimedOut)));
            }
            _ => panic!("expected Error state"),
        }
    }

    #[test]
    fn closed_fails_every_waiter_exactly_once() {
        let mut open = OpenConnection::default();
        let mut stream = Stream::new(crate::wire::StreamId::new(0).unwrap());
        let (w, rx) = Waiter::<usize>::new_async();
        stream.waiters.read.set(w).unwrap();
        open.streams.open.insert(stream.id, stream);
        let mut state = ConnectionState::Open(open);
        state.handle_closed();
        assert!(state.is_closed());
        let rt = tokio::runtime::Runtime::new().unwrap();
        let result = rt.block_on(rx).unwrap();
        assert!(matches!(result, Err(Error::OperationAborted)));
    }

    #[test]
    fn accept_queue_rejection_completes_waiter_with_aborted_when_not_open() {
        let mut state = ConnectionState::Closed;
        let (w, rx) = Waiter::<()>::new_async();
        state.add_connect_waiter(w).unwrap();
        let rt = tokio::runtime::Runtime::new().unwrap();
        assert!(matches!(rt.block_on(rx).unwrap(), Err(Error::OperationAborted)));
    }
}
