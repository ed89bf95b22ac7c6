//! The `acceptor` facade (spec.md §4.3 "Accept queue": "the first `accept`
//! drains it into the application's handle").

use std::time::Duration;

use nexusq_core::connection::ConnectionState;
use nexusq_core::error::{Error, Result};

use crate::connection::drive_until;
use crate::engine_handle::Shared;
use crate::Connection;

/// Drains newly-admitted connections off a [`crate::Server`]'s engine, in
/// the order the QUIC layer accepted them.
pub struct Acceptor {
    shared: Shared,
}

impl Acceptor {
    pub(crate) fn new(shared: Shared) -> Self {
        Acceptor { shared }
    }

    /// Suspends until a connection completes its handshake, or fails
    /// outright, returning the oldest pending one first (FIFO, spec.md §4.3
    /// "Accept queue").
    pub async fn accept(&self) -> Result<Connection> {
        let (id, remote) = drive_until(&self.shared, Duration::from_secs(3600), |inner| {
            let (id, _) = inner.pending_remotes.first()?;
            let id = id.clone();
            match inner.connections.get(&id) {
                Some(ConnectionState::Open(_)) => {
                    let remote = inner.pending_remotes.shift_remove(&id).expect("just looked up by first()");
                    Some(Ok((id, remote)))
                }
                Some(ConnectionState::Error { ec }) => {
                    let ec = ec.clone();
                    inner.pending_remotes.shift_remove(&id);
                    Some(Err(ec))
                }
                Some(ConnectionState::Closed) | None => {
                    inner.pending_remotes.shift_remove(&id);
                    Some(Err(Error::OperationAborted))
                }
                Some(ConnectionState::Accepting { .. }) => None,
            }
        })
        .await?;

        Ok(Connection::new(id, self.shared.clone(), remote))
    }
}
