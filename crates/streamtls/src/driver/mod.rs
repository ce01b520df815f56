//! Operation drivers: restartable state machines stepped by an orchestrator.
//!
//! Each driver owns its scratch buffers and converts one TLS operation into
//! a sequence of input/output byte exchanges with the transport. A step
//! never performs I/O itself; it reports what the orchestrator must do next.

pub(crate) mod decrypt;
pub(crate) mod encrypt;
pub(crate) mod handshake;
pub(crate) mod shutdown;

/// Status returned by a driver step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DriverStatus {
    /// Read transport bytes into the driver's input tail and commit them.
    DataNeeded,
    /// Flush the driver's pending output to the transport in full.
    DataAvailable,
    /// The operation completed. Idempotent on re-entry.
    Done,
    /// The driver latched an error; retrieve it with `last_error`.
    Error,
}
