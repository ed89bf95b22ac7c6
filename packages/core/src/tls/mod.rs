//! Per-SNI certificate selection (spec.md §6 "TLS callbacks"). Grounded on
//! `original_source/include/nexus/quic/ssl.hpp`'s `certificate_provider` and
//! `include/nexus/quic/ssl_certificate_map.hpp`'s `certificate_map`
//! (SPEC_FULL.md §11 "`ssl_certificate_map`").

use std::collections::HashMap;
use std::sync::Arc;

use rustls::ServerConfig;

/// Selects a per-SNI TLS server context during the handshake. Returning
/// `None` rejects the client's handshake.
pub trait CertificateProvider: Send + Sync {
    fn get_certificate_for_name(&self, sni: &str) -> Option<Arc<ServerConfig>>;
}

/// Default `CertificateProvider`: an exact-match table from SNI hostname to
/// `rustls::ServerConfig` (`certificate_map`).
#[derive(Default)]
pub struct SniCertificateMap {
    certs: HashMap<String, Arc<ServerConfig>>,
}

impl SniCertificateMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, sni: impl Into<String>, config: Arc<ServerConfig>) {
        self.certs.insert(sni.into(), config);
    }
}

impl CertificateProvider for SniCertificateMap {
    fn get_certificate_for_name(&self, sni: &str) -> Option<Arc<ServerConfig>> {
        self.certs.get(sni).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustls::crypto::ring::default_provider;

    fn dummy_config() -> Arc<ServerConfig> {
        // A minimal, unauthenticated config is enough to exercise lookup;
        // a real deployment installs a resolver-backed config per name.
        Arc::new(
            ServerConfig::builder_with_provider(Arc::new(default_provider()))
                .with_safe_default_protocol_versions()
                .unwrap()
                .with_no_client_auth()
                .with_cert_resolver(Arc::new(NoCertResolver)),
        )
    }

    #[derive(Debug)]
    struct NoCertResolver;
    impl rustls::server::ResolvesServerCert for NoCertResolver {
        fn resolve(&self, _client_hello: rustls::server::ClientHello) -> Option<Arc<rustls::sign::CertifiedKey>> {
            None
        }
    }

    #[test]
    fn lookup_misses_return_none_and_reject_the_handshake() {
        let map = SniCertificateMap::new();
        assert!(map.get_certificate_for_name("example.com").is_none());
    }

    #[test]
    fn inserted_sni_is_found_by_exact_name() {
        let mut map = SniCertificateMap::new();
        map.insert("example.com", dummy_config());
        assert!(map.get_certificate_for_name("example.com").is_some());
        assert!(map.get_certificate_for_name("other.com").is_none());
    }
}
