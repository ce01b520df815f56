//! Shutdown driver.

use streamtls_types::ProtocolError;

use super::DriverStatus;
use crate::engine::TlsEngine;

/// Emits the close_notify alert.
///
/// Only the emit phase is driven here; draining the peer's close_notify is
/// the caller's choice to keep reading after shutdown.
pub(crate) struct ShutdownDriver {
    output: Vec<u8>,
    flushed: usize,
    produced: bool,
    error: Option<ProtocolError>,
}

impl ShutdownDriver {
    pub(crate) fn new() -> Self {
        Self {
            output: Vec::new(),
            flushed: 0,
            produced: false,
            error: None,
        }
    }

    pub(crate) fn step<E: TlsEngine>(&mut self, engine: &mut E) -> DriverStatus {
        if self.error.is_some() {
            return DriverStatus::Error;
        }
        if self.produced {
            return if self.flushed < self.output.len() {
                DriverStatus::DataAvailable
            } else {
                DriverStatus::Done
            };
        }
        match engine.shutdown_step() {
            Ok(output) => {
                self.output = output;
                self.flushed = 0;
                self.produced = true;
                if self.output.is_empty() {
                    DriverStatus::Done
                } else {
                    DriverStatus::DataAvailable
                }
            }
            Err(e) => {
                self.error = Some(e);
                DriverStatus::Error
            }
        }
    }

    pub(crate) fn pending_output(&self) -> &[u8] {
        &self.output[self.flushed..]
    }

    pub(crate) fn commit_written(&mut self, n: usize) {
        self.flushed = (self.flushed + n).min(self.output.len());
    }

    pub(crate) fn last_error(&self) -> ProtocolError {
        self.error
            .clone()
            .unwrap_or_else(|| ProtocolError::Internal("shutdown driver has no error".into()))
    }
}
