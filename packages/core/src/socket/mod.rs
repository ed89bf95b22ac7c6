//! UDP endpoint, incoming-connection queue, and connection tables
//! (spec.md §3 "Socket").

pub mod udp;

pub use udp::{InDatagram, IncomingRing, OutSpec, UdpSocket};

use indexmap::IndexMap;

use crate::connection::ConnectionState;
use crate::wire::ConnectionId;

/// The `accepting`/`open` connection tables, kept separate from the UDP
/// endpoint so they're testable without a live socket.
#[derive(Default)]
pub struct ConnectionTables {
    pub accepting: IndexMap<ConnectionId, ConnectionState>,
    pub open: IndexMap<ConnectionId, ConnectionState>,
}

impl ConnectionTables {
    /// Moves a connection from `accepting` to `open` on `on_accept`
    /// (spec.md §4.3 state table).
    pub fn promote_to_open(&mut self, id: &ConnectionId) {
        if let Some((id, mut state)) = self.accepting.shift_remove_entry(id) {
            state.handle_accepted();
            self.open.insert(id, state);
        }
    }

    /// Removes a connection from whichever table holds it, e.g. once
    /// `on_connection_close` has been delivered.
    pub fn remove(&mut self, id: &ConnectionId) -> Option<ConnectionState> {
        self.accepting.shift_remove(id).or_else(|| self.open.shift_remove(id))
    }
}

/// Owns a UDP endpoint, a bounded incoming-connection ring, and the
/// `accepting`/`open` connection tables (spec.md §3 "Socket").
pub struct Socket {
    pub udp: UdpSocket,
    pub incoming: IncomingRing<ConnectionId>,
    pub connections: ConnectionTables,
}

impl Socket {
    #[must_use]
    pub fn new(udp: UdpSocket, backlog: usize) -> Self {
        Socket { udp, incoming: IncomingRing::new(backlog), connections: ConnectionTables::default() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn promote_to_open_moves_entry_and_releases_waiter() {
        let mut tables = ConnectionTables::default();
        let id = ConnectionId::new(vec![1, 2, 3]).unwrap();
        tables.accepting.insert(id.clone(), ConnectionState::new_accepting());
        tables.promote_to_open(&id);
        assert!(tables.accepting.is_empty());
        assert!(matches!(tables.open.get(&id), Some(ConnectionState::Open(_))));
    }

    #[test]
    fn remove_finds_connection_in_either_table() {
        let mut tables = ConnectionTables::default();
        let id = ConnectionId::new(vec![9]).unwrap();
        tables.open.insert(id.clone(), ConnectionState::new_accepting());
        assert!(tables.remove(&id).is_some());
        assert!(tables.open.is_empty());
    }
}
