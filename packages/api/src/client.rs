//! The `client` facade (spec.md §4.8 "External interfaces": "a client
//! engine opens outbound connections").

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use nexusq_core::connection::ConnectionState;
use nexusq_core::engine::Engine;
use nexusq_core::error::Result;
use nexusq_core::settings::Settings;
use nexusq_core::wire::ConnectionId;
use tokio::sync::Mutex;

use crate::connection::drive_until;
use crate::engine_handle::Inner;
use crate::Connection;

/// An engine bound to an ephemeral local port, dialing outbound connections
/// (spec.md §4.3 "Contract": `connect(stream)`).
pub struct Client {
    shared: crate::engine_handle::Shared,
    next_id: AtomicU64,
}

impl Client {
    /// Binds a client-side UDP socket and spins up its engine (spec.md §4.4
    /// "Construction"). The settings are used as-is; validate them first
    /// with [`nexusq_core::settings::check_client_settings`] if needed.
    pub fn new(settings: &Settings) -> Result<Self> {
        let engine = Engine::new_client(settings)?;
        let inner =
            Inner { engine, connections: indexmap::IndexMap::new(), pending_remotes: indexmap::IndexMap::new() };
        Ok(Client { shared: Arc::new(Mutex::new(inner)), next_id: AtomicU64::new(0) })
    }

    /// Dials `addr`, suspending until the handshake completes (spec.md §4.3
    /// state table: `accepting -> open`).
    pub async fn connect(&self, addr: SocketAddr, server_name: Option<&str>) -> Result<Connection> {
        let id = self.fresh_id();

        {
            let mut inner = self.shared.lock().await;
            inner.engine.connect(&id, addr, server_name)?;
            inner.connections.insert(id.clone(), ConnectionState::new_accepting());
        }

        drive_until(&self.shared, Duration::from_secs(30), |inner| match inner.connections.get(&id) {
            Some(ConnectionState::Open(_)) => Some(Ok(())),
            Some(ConnectionState::Error { ec }) => Some(Err(ec.clone())),
            Some(ConnectionState::Closed) => Some(Err(nexusq_core::error::Error::OperationAborted)),
            _ => None,
        })
        .await?;

        Ok(Connection::new(id, self.shared.clone(), addr))
    }

    fn fresh_id(&self) -> ConnectionId {
        let n = self.next_id.fetch_add(1, Ordering::Relaxed);
        ConnectionId::new(n.to_be_bytes().to_vec()).expect("8 bytes fits within the 20-byte connection id bound")
    }
}
