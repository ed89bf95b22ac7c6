//! Process-wide / initialization errors.
//!
//! Mirrors `nexus::global::error` (`original_source/include/nexus/global/error.hpp`):
//! a single-variant category for failures that aren't scoped to any connection.

/// Errors raised before any connection exists, e.g. by [`crate::global::Context::init`].
#[derive(Debug, thiserror::Error, Clone, Copy, PartialEq, Eq)]
pub enum GlobalError {
    #[error("global QUIC/TLS library initialization failed")]
    InitFailed,
}
