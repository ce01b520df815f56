//! Error taxonomy for TLS stream operations.

use crate::Phase;

/// Errors raised by the TLS engine while processing records.
///
/// The driver that observes one of these latches it; every later step of that
/// driver returns the same error, and the owning stream becomes `Faulted`.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ProtocolError {
    #[error("handshake failed: {0}")]
    HandshakeFailed(String),
    #[error("bad record mac")]
    BadRecordMac,
    #[error("unexpected message: {0}")]
    UnexpectedMessage(String),
    #[error("certificate verification failed: {0}")]
    CertVerifyFailed(String),
    #[error("peer closed the transport during the handshake")]
    UnexpectedEof,
    #[error("incoming record exceeds the maximum record size")]
    RecordOverflow,
    #[error("internal engine error: {0}")]
    Internal(String),
}

/// API misuse: operations issued in a phase that does not admit them.
///
/// Distinct from [`ProtocolError`]: nothing went wrong on the wire, the
/// caller drove the stream outside its contract.
#[derive(Debug, Clone, thiserror::Error)]
pub enum MisuseError {
    #[error("cannot {op} in phase {phase}")]
    InvalidPhase { op: &'static str, phase: Phase },
    #[error("stream faulted: {0}")]
    StreamFaulted(String),
    #[error("a previous operation was cancelled mid-flight")]
    Interrupted,
    #[error("server hostname must be set before the handshake")]
    HostnameAfterHandshake,
}

/// Top-level error surfaced by stream operations.
#[derive(Debug, thiserror::Error)]
pub enum TlsError {
    /// Transport failure, propagated unchanged. Fatal to the TLS stream.
    #[error("transport error: {0}")]
    Transport(#[from] std::io::Error),
    /// Protocol failure raised by the engine. Latched sticky.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
    /// The transport closed without a close_notify from the peer.
    #[error("stream truncated before close_notify")]
    Truncated,
    /// The caller violated the stream's operation contract.
    #[error(transparent)]
    Misuse(#[from] MisuseError),
}

impl From<TlsError> for std::io::Error {
    fn from(err: TlsError) -> Self {
        use std::io::ErrorKind;
        match err {
            TlsError::Transport(io) => io,
            TlsError::Truncated => {
                std::io::Error::new(ErrorKind::UnexpectedEof, err.to_string())
            }
            TlsError::Protocol(_) => std::io::Error::new(ErrorKind::InvalidData, err.to_string()),
            TlsError::Misuse(_) => std::io::Error::other(err.to_string()),
        }
    }
}
