//! Per-connection state shared between the blocking and async orchestrators.

use std::sync::Arc;

use streamtls_types::{MisuseError, Phase, ProtocolError, TlsError, TlsRole};
use tracing::debug;

use crate::context::TlsContext;
use crate::driver::decrypt::DecryptDriver;
use crate::driver::encrypt::EncryptDriver;
use crate::driver::handshake::HandshakeDriver;
use crate::driver::shutdown::ShutdownDriver;
use crate::engine::TlsEngine;

/// Outcome of the first shutdown attempt, latched so repeated calls replay it.
#[derive(Debug)]
pub(crate) enum ShutdownOutcome {
    Clean,
    Transport(std::io::ErrorKind, String),
    Protocol(ProtocolError),
}

/// Everything a stream owns besides its transport: the engine, the four
/// operation drivers, and the lifecycle bookkeeping. The blocking and async
/// orchestrators drive the same state machine; only the I/O differs.
pub(crate) struct ConnState<E> {
    pub(crate) engine: E,
    pub(crate) context: Arc<TlsContext>,
    pub(crate) server_name: Option<String>,
    pub(crate) phase: Phase,
    fault_reason: Option<String>,
    shutdown_outcome: Option<ShutdownOutcome>,
    pub(crate) handshake: HandshakeDriver,
    pub(crate) encrypt: EncryptDriver,
    pub(crate) decrypt: DecryptDriver,
    pub(crate) shutdown: ShutdownDriver,
}

impl<E: TlsEngine> ConnState<E> {
    pub(crate) fn new(context: Arc<TlsContext>, engine: E) -> Self {
        Self {
            engine,
            context,
            server_name: None,
            phase: Phase::Fresh,
            fault_reason: None,
            shutdown_outcome: None,
            handshake: HandshakeDriver::new(),
            encrypt: EncryptDriver::new(),
            decrypt: DecryptDriver::new(),
            shutdown: ShutdownDriver::new(),
        }
    }

    pub(crate) fn set_phase(&mut self, next: Phase) {
        debug_assert!(
            self.phase.can_advance_to(next),
            "phase {} cannot advance to {}",
            self.phase,
            next
        );
        self.phase = next;
    }

    /// Record a fatal error: the stream becomes `Faulted` and the reason is
    /// kept for sticky replay. Returns the error for propagation.
    pub(crate) fn fault(&mut self, err: TlsError) -> TlsError {
        if self.phase.can_advance_to(Phase::Faulted) {
            self.set_phase(Phase::Faulted);
        }
        if self.fault_reason.is_none() {
            self.fault_reason = Some(err.to_string());
        }
        debug!(error = %err, "tls stream faulted");
        err
    }

    /// The sticky error replayed by every operation on a faulted stream.
    pub(crate) fn fault_error(&self) -> TlsError {
        MisuseError::StreamFaulted(self.fault_reason.clone().unwrap_or_default()).into()
    }

    pub(crate) fn set_server_hostname(&mut self, name: String) -> Result<(), TlsError> {
        if self.phase != Phase::Fresh {
            return Err(MisuseError::HostnameAfterHandshake.into());
        }
        self.server_name = Some(name);
        Ok(())
    }

    /// Phase gate for `handshake`. `Ok(true)` means the handshake already
    /// completed and the call is an idempotent no-op.
    pub(crate) fn gate_handshake(&mut self) -> Result<bool, TlsError> {
        match self.phase {
            Phase::Fresh => Ok(false),
            Phase::Open => Ok(true),
            Phase::Faulted => Err(self.fault_error()),
            phase => Err(MisuseError::InvalidPhase {
                op: "handshake",
                phase,
            }
            .into()),
        }
    }

    pub(crate) fn begin_handshake(&mut self, role: TlsRole) -> Result<(), TlsError> {
        self.set_phase(Phase::Handshaking);
        let result = self
            .engine
            .start(role, &self.context, self.server_name.as_deref());
        result.map_err(|e| self.fault(e.into()))
    }

    /// Transfer handshake leftover to the decrypt driver and open the stream.
    pub(crate) fn finish_handshake(&mut self) {
        let leftover = self.handshake.take_leftover();
        self.decrypt.preload(&leftover);
        self.set_phase(Phase::Open);
        debug!("tls handshake complete");
    }

    pub(crate) fn gate_read(&mut self) -> Result<(), TlsError> {
        match self.phase {
            Phase::Open | Phase::Closing => Ok(()),
            Phase::Faulted => Err(self.fault_error()),
            phase => Err(MisuseError::InvalidPhase { op: "read", phase }.into()),
        }
    }

    pub(crate) fn gate_write(&mut self) -> Result<(), TlsError> {
        match self.phase {
            Phase::Open => Ok(()),
            Phase::Faulted => Err(self.fault_error()),
            phase => Err(MisuseError::InvalidPhase { op: "write", phase }.into()),
        }
    }

    /// Note a received close_notify: the peer is done sending.
    pub(crate) fn observe_peer_close(&mut self) {
        if self.phase == Phase::Open {
            self.set_phase(Phase::Closing);
            debug!("received close_notify");
        }
    }

    /// Phase gate for `shutdown`. `Ok(true)` means shutdown already ran and
    /// its latched outcome should be replayed.
    pub(crate) fn gate_shutdown(&mut self) -> Result<bool, TlsError> {
        match self.phase {
            Phase::Open | Phase::Closing => Ok(false),
            Phase::Closed => Ok(true),
            Phase::Faulted => Err(self.fault_error()),
            phase => Err(MisuseError::InvalidPhase {
                op: "shutdown",
                phase,
            }
            .into()),
        }
    }

    /// Latch the shutdown outcome and close the stream. The phase advances
    /// to `Closed` whether or not the close_notify write succeeded.
    pub(crate) fn finish_shutdown(&mut self, outcome: ShutdownOutcome) -> Result<(), TlsError> {
        self.set_phase(Phase::Closed);
        debug!("tls stream closed");
        self.shutdown_outcome = Some(outcome);
        self.replay_shutdown()
    }

    pub(crate) fn replay_shutdown(&self) -> Result<(), TlsError> {
        match &self.shutdown_outcome {
            None | Some(ShutdownOutcome::Clean) => Ok(()),
            Some(ShutdownOutcome::Transport(kind, msg)) => {
                Err(std::io::Error::new(*kind, msg.clone()).into())
            }
            Some(ShutdownOutcome::Protocol(e)) => Err(e.clone().into()),
        }
    }
}
