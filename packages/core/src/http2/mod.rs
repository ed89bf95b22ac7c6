//! HTTP/2-over-TCP connection negotiation (spec.md §4.5).

pub mod negotiation;
pub mod preface;

pub use negotiation::{client_upgrade, prior_knowledge_accept, server_upgrade};
pub use preface::{read_preface, write_preface, CLIENT_CONNECTION_PREFACE};
