//! The `server` facade (spec.md §4.8 "External interfaces": "a server
//! engine listens and accepts inbound connections").

use std::net::SocketAddr;
use std::sync::Arc;

use nexusq_core::engine::Engine;
use nexusq_core::error::Result;
use nexusq_core::settings::Settings;
use tokio::sync::Mutex;

use crate::engine_handle::{Inner, Shared};
use crate::Acceptor;

/// An engine bound to a fixed local port, admitting inbound connections up
/// to `backlog` pending handshakes (spec.md §4.3 "Accept queue").
pub struct Server {
    shared: Shared,
}

impl Server {
    /// Binds `bind_addr` and spins up its engine. `backlog` bounds the
    /// number of connections mid-handshake before new ones are refused
    /// (spec.md §4.4 "Packet ingest", the backlog ring).
    pub fn new(settings: &Settings, bind_addr: SocketAddr, backlog: usize) -> Result<Self> {
        let engine = Engine::new_server(settings, bind_addr, backlog)?;
        let inner = Inner {
            engine,
            connections: indexmap::IndexMap::new(),
            pending_remotes: indexmap::IndexMap::new(),
        };
        Ok(Server { shared: Arc::new(Mutex::new(inner)) })
    }

    /// Returns an `Acceptor` drawing from this server's engine. Any number
    /// of acceptors may be created; each independently drains newly-open
    /// connections (spec.md §5 "Shared resources": the engine mutex
    /// serializes them).
    #[must_use]
    pub fn acceptor(&self) -> Acceptor {
        Acceptor::new(self.shared.clone())
    }
}
