//! Handshake driver.

use streamtls_types::ProtocolError;

use super::DriverStatus;
use crate::buffer::IoBuffer;
use crate::engine::{StepStatus, TlsEngine};

/// Drives the TLS handshake as a restartable state machine.
///
/// The orchestrator loops [`step`](HandshakeDriver::step): on `DataNeeded`
/// it reads transport bytes into [`writable_tail`] and commits them with
/// [`commit_read`]; on `DataAvailable` it writes [`pending_output`] in full
/// and acknowledges with [`commit_written`]. Output produced together with
/// engine completion is flushed before `Done` surfaces.
///
/// [`writable_tail`]: HandshakeDriver::writable_tail
/// [`commit_read`]: HandshakeDriver::commit_read
/// [`pending_output`]: HandshakeDriver::pending_output
/// [`commit_written`]: HandshakeDriver::commit_written
pub(crate) struct HandshakeDriver {
    input: IoBuffer,
    output: Vec<u8>,
    flushed: usize,
    needs_input: bool,
    done: bool,
    error: Option<ProtocolError>,
}

impl HandshakeDriver {
    pub(crate) fn new() -> Self {
        Self {
            input: IoBuffer::new(),
            output: Vec::new(),
            flushed: 0,
            needs_input: false,
            done: false,
            error: None,
        }
    }

    pub(crate) fn step<E: TlsEngine>(&mut self, engine: &mut E) -> DriverStatus {
        if self.error.is_some() {
            return DriverStatus::Error;
        }
        if self.flushed < self.output.len() {
            return DriverStatus::DataAvailable;
        }
        if self.done {
            return DriverStatus::Done;
        }
        // The engine asked for input and none arrived yet: not steppable.
        if self.needs_input && self.input.is_empty() {
            return DriverStatus::DataNeeded;
        }

        match engine.handshake_step(self.input.filled()) {
            Ok(step) => {
                self.input.consume(step.consumed);
                self.needs_input = step.status == StepStatus::DataNeeded;
                if !step.output.is_empty() {
                    self.output = step.output;
                    self.flushed = 0;
                }
                match step.status {
                    StepStatus::Done => {
                        self.done = true;
                        if self.flushed < self.output.len() {
                            DriverStatus::DataAvailable
                        } else {
                            DriverStatus::Done
                        }
                    }
                    StepStatus::DataAvailable => DriverStatus::DataAvailable,
                    StepStatus::DataNeeded => {
                        // Output takes precedence: ship it, then come back
                        // for more input.
                        if self.flushed < self.output.len() {
                            DriverStatus::DataAvailable
                        } else if self.input.is_full() {
                            self.error = Some(ProtocolError::RecordOverflow);
                            DriverStatus::Error
                        } else {
                            DriverStatus::DataNeeded
                        }
                    }
                }
            }
            Err(e) => {
                self.error = Some(e);
                DriverStatus::Error
            }
        }
    }

    pub(crate) fn writable_tail(&mut self) -> &mut [u8] {
        self.input.writable_tail()
    }

    pub(crate) fn commit_read(&mut self, n: usize) {
        self.input.commit(n);
    }

    pub(crate) fn pending_output(&self) -> &[u8] {
        &self.output[self.flushed..]
    }

    pub(crate) fn commit_written(&mut self, n: usize) {
        self.flushed = (self.flushed + n).min(self.output.len());
    }

    /// Ciphertext that arrived coalesced behind the final handshake flight.
    /// It belongs to the decrypt driver once the handshake completes.
    pub(crate) fn take_leftover(&mut self) -> Vec<u8> {
        self.input.take()
    }

    pub(crate) fn last_error(&self) -> ProtocolError {
        self.error
            .clone()
            .unwrap_or_else(|| ProtocolError::Internal("handshake driver has no error".into()))
    }
}
