//! Transport settings (spec.md §3 "Transport settings"). Grounded on
//! `original_source/include/nexus/quic/settings.hpp` +
//! `src/settings.cc`'s `default_client_settings`/`default_server_settings`/
//! `check_client_settings`/`check_server_settings`, translated from the
//! original's out-parameter-message `bool` into a `Result<(), SettingsError>`
//! (SPEC_FULL.md §10 "Configuration").

use std::time::Duration;

/// Quic transport settings used to initialize a client or server engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    /// Handshake timeout, resulting in `connection_error::timed_out`.
    pub handshake_timeout: Duration,
    /// Connection idle timeout, resulting in `connection_error::timed_out`.
    pub idle_timeout: Duration,
    /// Number of concurrent streams a peer is allowed to open per connection.
    pub max_streams_per_connection: u64,
    /// Amount of unread bytes a peer is allowed to send per connection.
    pub connection_flow_control_window: i64,
    /// Amount of unread bytes a peer is allowed to send on streams they initiate.
    pub incoming_stream_flow_control_window: i64,
    /// Amount of unread bytes a peer is allowed to send on streams we initiate.
    pub outgoing_stream_flow_control_window: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("handshake_timeout must be greater than zero")]
    ZeroHandshakeTimeout,
    #[error("idle_timeout must be greater than zero")]
    ZeroIdleTimeout,
    #[error("max_streams_per_connection must be greater than zero")]
    ZeroMaxStreams,
    #[error("flow control windows must be non-negative")]
    NegativeFlowControlWindow,
}

impl Settings {
    fn check(&self, is_server: bool) -> Result<(), SettingsError> {
        if self.handshake_timeout.is_zero() {
            return Err(SettingsError::ZeroHandshakeTimeout);
        }
        if self.idle_timeout.is_zero() {
            return Err(SettingsError::ZeroIdleTimeout);
        }
        if self.max_streams_per_connection == 0 {
            return Err(SettingsError::ZeroMaxStreams);
        }
        if self.connection_flow_control_window < 0
            || self.incoming_stream_flow_control_window < 0
            || self.outgoing_stream_flow_control_window < 0
        {
            return Err(SettingsError::NegativeFlowControlWindow);
        }
        let _ = is_server;
        Ok(())
    }
}

/// `default_client_settings()`.
#[must_use]
pub fn default_client_settings() -> Settings {
    Settings {
        handshake_timeout: Duration::from_secs(10),
        idle_timeout: Duration::from_secs(30),
        max_streams_per_connection: 100,
        connection_flow_control_window: 1 << 20,
        incoming_stream_flow_control_window: 65535,
        outgoing_stream_flow_control_window: 65535,
    }
}

/// `default_server_settings()`.
#[must_use]
pub fn default_server_settings() -> Settings {
    Settings { max_streams_per_connection: 1000, ..default_client_settings() }
}

/// `check_client_settings`.
pub fn check_client_settings(s: &Settings) -> Result<(), SettingsError> {
    s.check(false)
}

/// `check_server_settings`.
pub fn check_server_settings(s: &Settings) -> Result<(), SettingsError> {
    s.check(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_pass_validation() {
        check_client_settings(&default_client_settings()).unwrap();
        check_server_settings(&default_server_settings()).unwrap();
    }

    #[test]
    fn zero_idle_timeout_is_rejected() {
        let mut s = default_client_settings();
        s.idle_timeout = Duration::ZERO;
        assert_eq!(check_client_settings(&s), Err(SettingsError::ZeroIdleTimeout));
    }

    #[test]
    fn negative_flow_control_window_is_rejected() {
        let mut s = default_server_settings();
        s.connection_flow_control_window = -1;
        assert_eq!(check_server_settings(&s), Err(SettingsError::NegativeFlowControlWindow));
    }
}
