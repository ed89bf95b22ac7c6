//! `nexusq`: the public client/server/acceptor facade over `nexusq_core`'s
//! QUIC/HTTP3 engine (spec.md §2 item 8 "Client / server / acceptor
//! facades").
//!
//! These types are thin, move-only wrappers: all protocol state lives in
//! `nexusq_core`, guarded by the engine's own mutex (spec.md §5 "Shared
//! resources"). Concurrent use of the same handle from two threads is
//! undefined, matching the core's concurrency contract.

pub mod acceptor;
pub mod client;
pub mod connection;
pub mod server;
pub mod stream;

pub use acceptor::Acceptor;
pub use client::Client;
pub use connection::Connection;
pub use server::Server;
pub use stream::Stream;

pub use nexusq_core::error::{Error, Result};
pub use nexusq_core::settings::{default_client_settings, default_server_settings, Settings, SettingsError};
pub use nexusq_core::stream::ShutdownHow;
