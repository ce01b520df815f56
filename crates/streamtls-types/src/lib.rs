#![forbid(unsafe_code)]
#![doc = "Shared types for the streamtls workspace."]

pub mod error;
pub mod phase;

pub use error::{MisuseError, ProtocolError, TlsError};
pub use phase::Phase;

/// The role of a TLS endpoint in the handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TlsRole {
    Client,
    Server,
}

impl std::fmt::Display for TlsRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TlsRole::Client => f.write_str("client"),
            TlsRole::Server => f.write_str("server"),
        }
    }
}
