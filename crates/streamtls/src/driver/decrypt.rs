//! Decrypt driver.

use streamtls_types::ProtocolError;

use crate::buffer::{IoBuffer, SecretBuffer};
use crate::engine::{DecryptStep, TlsEngine};

/// Status returned by a decrypt driver step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DecryptStatus {
    /// Read transport bytes into the input tail and commit them.
    DataNeeded,
    /// Plaintext is staged; drain it with `take_into`.
    DataAvailable,
    /// The peer sent close_notify. Benign end of stream.
    PeerClosed,
    /// The driver latched an error.
    Error,
}

/// Opens records and stages their plaintext for the caller.
///
/// Ciphertext that arrives fragmented accumulates in the input buffer until
/// the engine can open a complete record; trailing bytes that belong to the
/// next record stay at the front of the buffer for the next call. Staged
/// plaintext must be drained before any further transport read happens.
pub(crate) struct DecryptDriver {
    input: IoBuffer,
    staging: SecretBuffer,
    peer_closed: bool,
    error: Option<ProtocolError>,
}

impl DecryptDriver {
    pub(crate) fn new() -> Self {
        Self {
            input: IoBuffer::new(),
            staging: SecretBuffer::new(),
            peer_closed: false,
            error: None,
        }
    }

    pub(crate) fn step<E: TlsEngine>(&mut self, engine: &mut E) -> DecryptStatus {
        if self.error.is_some() {
            return DecryptStatus::Error;
        }
        if !self.staging.is_empty() {
            return DecryptStatus::DataAvailable;
        }
        if self.peer_closed {
            return DecryptStatus::PeerClosed;
        }

        loop {
            if self.input.is_empty() {
                return DecryptStatus::DataNeeded;
            }
            match engine.decrypt_step(self.input.filled()) {
                Ok(DecryptStep::DataNeeded) => {
                    if self.input.is_full() {
                        self.error = Some(ProtocolError::RecordOverflow);
                        return DecryptStatus::Error;
                    }
                    return DecryptStatus::DataNeeded;
                }
                Ok(DecryptStep::Record {
                    consumed,
                    plaintext,
                }) => {
                    self.input.consume(consumed);
                    // An empty record must not read as end-of-stream.
                    if plaintext.is_empty() {
                        continue;
                    }
                    self.staging.extend(&plaintext);
                    return DecryptStatus::DataAvailable;
                }
                Ok(DecryptStep::PeerClosed { consumed }) => {
                    self.input.consume(consumed);
                    self.peer_closed = true;
                    return DecryptStatus::PeerClosed;
                }
                Err(e) => {
                    self.error = Some(e);
                    return DecryptStatus::Error;
                }
            }
        }
    }

    /// Seed the input buffer with ciphertext that arrived coalesced behind
    /// the handshake.
    pub(crate) fn preload(&mut self, bytes: &[u8]) {
        self.input.extend(bytes);
    }

    pub(crate) fn writable_tail(&mut self) -> &mut [u8] {
        self.input.writable_tail()
    }

    pub(crate) fn commit_read(&mut self, n: usize) {
        self.input.commit(n);
    }

    pub(crate) fn take_into(&mut self, out: &mut [u8]) -> usize {
        self.staging.take_into(out)
    }

    pub(crate) fn last_error(&self) -> ProtocolError {
        self.error
            .clone()
            .unwrap_or_else(|| ProtocolError::Internal("decrypt driver has no error".into()))
    }
}
