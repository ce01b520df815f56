//! Engine facade: the uniform contract over a TLS provider's record-layer
//! primitives.
//!
//! The mediator drives the provider as an opaque state machine over opaque
//! byte buffers. Each step is synchronous and CPU-only; all suspension
//! happens in the orchestrators around transport I/O.

use streamtls_types::{ProtocolError, TlsRole};

use crate::context::TlsContext;

/// Outcome status of a handshake step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    /// The engine needs more bytes from the transport.
    DataNeeded,
    /// The engine produced bytes that must be shipped to the peer.
    DataAvailable,
    /// The handshake is complete and the cipher context is established.
    Done,
}

/// Result of a single handshake step.
#[derive(Debug)]
pub struct HandshakeStep {
    pub status: StepStatus,
    /// Records to transmit before the engine is stepped again. May accompany
    /// any status, including `Done` (the final flight).
    pub output: Vec<u8>,
    /// Input bytes the engine consumed from the front of the buffer it was
    /// given. Consumed bytes are gone even when output is also produced.
    pub consumed: usize,
}

/// Result of a single encrypt step. Encryption is one-shot per plaintext
/// chunk; an engine never needs more data to seal a record.
#[derive(Debug)]
pub struct EncryptStep {
    /// Plaintext bytes folded into the produced record. May be less than the
    /// input length when the record size limit is hit.
    pub consumed: usize,
    pub ciphertext: Vec<u8>,
}

/// Result of a single decrypt step.
#[derive(Debug)]
pub enum DecryptStep {
    /// The accumulated ciphertext does not yet contain a complete record.
    DataNeeded,
    /// One record was decrypted. Trailing ciphertext beyond `consumed`
    /// belongs to the next record and stays with the caller.
    Record { consumed: usize, plaintext: Vec<u8> },
    /// The peer sent close_notify; the secure channel ended cleanly.
    PeerClosed { consumed: usize },
}

/// Uniform interface over a TLS provider.
///
/// An engine instance owns the provider's credentials and security-context
/// handles for exactly one connection: it is moved into a stream, never
/// cloned, and releases the handles when dropped. Credentials are acquired
/// lazily inside [`start`](TlsEngine::start) / the first handshake step.
///
/// Engines are reentrant across distinct instances; the provider's global
/// state is its own concern.
pub trait TlsEngine {
    /// Begin a handshake in the given role.
    ///
    /// `server_name` is the SNI hostname for client handshakes; servers
    /// ignore it. The context supplies the method selector, certificate and
    /// validation mode.
    fn start(
        &mut self,
        role: TlsRole,
        context: &TlsContext,
        server_name: Option<&str>,
    ) -> Result<(), ProtocolError>;

    /// Advance the handshake with the ciphertext accumulated so far.
    ///
    /// The first client step is called with empty input and yields the
    /// initial hello; the first server step reports `DataNeeded`. After a
    /// `DataNeeded` status the caller commits at least one fresh byte before
    /// stepping again.
    ///
    /// `Done` implies the cipher context is fully established. A client
    /// performing mutual TLS must have selected the context's certificate
    /// and presented it to the peer by then; the mediator performs no extra
    /// finalization call.
    fn handshake_step(&mut self, input: &[u8]) -> Result<HandshakeStep, ProtocolError>;

    /// Seal at most one record's worth of `plaintext`.
    fn encrypt_step(&mut self, plaintext: &[u8]) -> Result<EncryptStep, ProtocolError>;

    /// Try to open one record from the front of `input`.
    fn decrypt_step(&mut self, input: &[u8]) -> Result<DecryptStep, ProtocolError>;

    /// Produce the close_notify alert. Stateless beyond that.
    fn shutdown_step(&mut self) -> Result<Vec<u8>, ProtocolError>;
}
