//! Encrypt driver.

use streamtls_types::ProtocolError;

use super::DriverStatus;
use crate::engine::TlsEngine;

/// Seals one record per caller write.
///
/// A step invokes the engine's encrypt primitive exactly once and records
/// how much plaintext went into the produced record; the orchestrator must
/// ship the whole record before reporting success to the caller, otherwise
/// the peer's record stream desynchronizes.
pub(crate) struct EncryptDriver {
    ciphertext: Vec<u8>,
    flushed: usize,
    consumed: usize,
    error: Option<ProtocolError>,
}

impl EncryptDriver {
    pub(crate) fn new() -> Self {
        Self {
            ciphertext: Vec::new(),
            flushed: 0,
            consumed: 0,
            error: None,
        }
    }

    pub(crate) fn step<E: TlsEngine>(&mut self, engine: &mut E, plaintext: &[u8]) -> DriverStatus {
        if self.error.is_some() {
            return DriverStatus::Error;
        }
        match engine.encrypt_step(plaintext) {
            Ok(step) => {
                self.consumed = step.consumed;
                self.ciphertext = step.ciphertext;
                self.flushed = 0;
                DriverStatus::DataAvailable
            }
            Err(e) => {
                self.error = Some(e);
                DriverStatus::Error
            }
        }
    }

    pub(crate) fn pending_output(&self) -> &[u8] {
        &self.ciphertext[self.flushed..]
    }

    pub(crate) fn commit_written(&mut self, n: usize) {
        self.flushed = (self.flushed + n).min(self.ciphertext.len());
    }

    /// Plaintext bytes folded into the last sealed record.
    pub(crate) fn bytes_consumed(&self) -> usize {
        self.consumed
    }

    pub(crate) fn last_error(&self) -> ProtocolError {
        self.error
            .clone()
            .unwrap_or_else(|| ProtocolError::Internal("encrypt driver has no error".into()))
    }
}
