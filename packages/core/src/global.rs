//! Process-wide library initialization, an RAII guard mirroring
//! `nexus::quic::global::context` / `nexus::global::context`
//! (`include/nexus/global_init.hpp`, `include/nexus/quic/global_context.hpp`,
//! `src/quic/global.cc`) — SPEC_FULL.md §11 "`global_context`/`global_init`
//! RAII handle".

use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::GlobalError;

/// `init_flags` (spec.md §6 "External QUIC state machine contract":
/// `global_init(flags)` where `flags ∈ {client, server, client|server}` plus
/// an opt-in HTTP/3 flag).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InitFlags {
    pub client: bool,
    pub server: bool,
    pub http3: bool,
}

impl InitFlags {
    #[must_use]
    pub const fn client() -> Self {
        InitFlags { client: true, server: false, http3: false }
    }

    #[must_use]
    pub const fn server() -> Self {
        InitFlags { client: false, server: true, http3: false }
    }

    #[must_use]
    pub const fn client_server() -> Self {
        InitFlags { client: true, server: true, http3: false }
    }

    #[must_use]
    pub const fn with_http3(mut self) -> Self {
        self.http3 = true;
        self
    }
}

static GLOBAL_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// A move-only token representing successful global initialization; global
/// cleanup runs once, on drop (`context::~context`).
pub struct Context {
    flags: InitFlags,
    active: bool,
}

impl Context {
    /// `detail::init(flags)`. Only one `Context` may be live at a time,
    /// mirroring the original's process-wide `lsquic_global_init` call.
    pub fn init(flags: InitFlags) -> Result<Self, GlobalError> {
        if GLOBAL_INITIALIZED.swap(true, Ordering::SeqCst) {
            return Err(GlobalError::InitFailed);
        }
        tracing::debug!(?flags, "global QUIC/TLS library initialized");
        Ok(Context { flags, active: true })
    }

    #[must_use]
    pub fn flags(&self) -> InitFlags {
        self.flags
    }

    /// `context::shutdown()`: explicit early cleanup, idempotent with `Drop`.
    pub fn shutdown(&mut self) {
        if self.active {
            GLOBAL_INITIALIZED.store(false, Ordering::SeqCst);
            self.active = false;
            tracing::debug!("global QUIC/TLS library cleaned up");
        }
    }
}

impl Drop for Context {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// `nexus::global::init_client`.
pub fn init_client() -> Result<Context, GlobalError> {
    Context::init(InitFlags::client())
}

/// `nexus::global::init_server`.
pub fn init_server() -> Result<Context, GlobalError> {
    Context::init(InitFlags::server())
}

/// `nexus::global::init_client_server`.
pub fn init_client_server() -> Result<Context, GlobalError> {
    Context::init(InitFlags::client_server())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn second_concurrent_init_fails_until_first_is_dropped() {
        let first = init_client().unwrap();
        assert!(matches!(init_server(), Err(GlobalError::InitFailed)));
        drop(first);
        let second = init_server().unwrap();
        assert!(second.flags().server);
    }

    #[test]
    #[serial]
    fn explicit_shutdown_allows_reinitialization() {
        let mut ctx = init_client_server().unwrap();
        ctx.shutdown();
        let reinit = init_client().unwrap();
        drop(reinit);
    }
}
