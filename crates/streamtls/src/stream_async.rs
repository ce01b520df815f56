//! Asynchronous TLS stream over an `AsyncRead + AsyncWrite` transport.

use std::sync::Arc;

use streamtls_types::{MisuseError, Phase, ProtocolError, TlsError, TlsRole};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::context::TlsContext;
use crate::driver::decrypt::DecryptStatus;
use crate::driver::DriverStatus;
use crate::engine::TlsEngine;
use crate::state::{ConnState, ShutdownOutcome};

/// A TLS stream whose operations suspend on transport I/O.
///
/// The same drivers as [`TlsStream`](crate::TlsStream) drive the operation
/// loops; only the orchestration differs: each transport read and write is a
/// suspension point, while engine steps stay synchronous and CPU-bound.
///
/// Operations are serialized by `&mut self`; issuing the next one only after
/// the previous completed is the caller's contract. Dropping an operation
/// future mid-flight cancels it: the TLS record stream cannot be resumed from
/// mid-record, so the next operation observes the interruption, faults the
/// stream, and fails with a cancellation error.
pub struct AsyncTlsStream<S, E> {
    transport: S,
    state: ConnState<E>,
    in_flight: bool,
}

impl<S: AsyncRead + AsyncWrite + Unpin, E: TlsEngine> AsyncTlsStream<S, E> {
    /// Create a stream over `transport` using a shared context and an engine
    /// owned exclusively by this stream.
    pub fn new(transport: S, context: Arc<TlsContext>, engine: E) -> Self {
        Self {
            transport,
            state: ConnState::new(context, engine),
            in_flight: false,
        }
    }

    /// Set the SNI hostname used for requesting and validating the server
    /// certificate. Client role only; must precede the handshake.
    pub fn set_server_hostname(&mut self, name: impl Into<String>) -> Result<(), TlsError> {
        self.state.set_server_hostname(name.into())
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    /// A reference to the underlying transport.
    pub fn get_ref(&self) -> &S {
        &self.transport
    }

    /// A mutable reference to the underlying transport. Bypassing TLS after
    /// the handshake desynchronizes the record stream.
    pub fn get_mut(&mut self) -> &mut S {
        &mut self.transport
    }

    /// Consume the stream, returning the underlying transport.
    pub fn into_inner(self) -> S {
        self.transport
    }

    /// Reject work on a stream whose previous operation future was dropped
    /// mid-flight: the record stream cannot be resumed from mid-record.
    fn check_interrupted(&mut self) -> Result<(), TlsError> {
        if self.in_flight {
            return Err(self.state.fault(MisuseError::Interrupted.into()));
        }
        Ok(())
    }

    /// Perform the TLS handshake. Idempotent once the stream is open.
    pub async fn handshake(&mut self, role: TlsRole) -> Result<(), TlsError> {
        self.check_interrupted()?;
        if self.state.gate_handshake()? {
            return Ok(());
        }
        self.in_flight = true;
        let result = self.handshake_inner(role).await;
        self.in_flight = false;
        result
    }

    async fn handshake_inner(&mut self, role: TlsRole) -> Result<(), TlsError> {
        self.state.begin_handshake(role)?;
        loop {
            match self.state.handshake.step(&mut self.state.engine) {
                DriverStatus::DataNeeded => {
                    let n = match self
                        .transport
                        .read(self.state.handshake.writable_tail())
                        .await
                    {
                        Ok(n) => n,
                        Err(e) => return Err(self.state.fault(e.into())),
                    };
                    if n == 0 {
                        return Err(self.state.fault(ProtocolError::UnexpectedEof.into()));
                    }
                    self.state.handshake.commit_read(n);
                }
                DriverStatus::DataAvailable => {
                    let len = self.state.handshake.pending_output().len();
                    if let Err(e) = self
                        .transport
                        .write_all(self.state.handshake.pending_output())
                        .await
                    {
                        return Err(self.state.fault(e.into()));
                    }
                    self.state.handshake.commit_written(len);
                }
                DriverStatus::Done => {
                    self.state.finish_handshake();
                    return Ok(());
                }
                DriverStatus::Error => {
                    let err = self.state.handshake.last_error();
                    return Err(self.state.fault(err.into()));
                }
            }
        }
    }

    /// Read some decrypted bytes into `buf`.
    ///
    /// Returns `Ok(0)` only for an empty `buf` or after the peer's
    /// close_notify (benign end of stream; the phase becomes `Closing`).
    pub async fn read(&mut self, buf: &mut [u8]) -> Result<usize, TlsError> {
        self.check_interrupted()?;
        self.state.gate_read()?;
        if buf.is_empty() {
            return Ok(0);
        }
        self.in_flight = true;
        let result = self.read_inner(buf).await;
        self.in_flight = false;
        result
    }

    async fn read_inner(&mut self, buf: &mut [u8]) -> Result<usize, TlsError> {
        loop {
            match self.state.decrypt.step(&mut self.state.engine) {
                DecryptStatus::DataAvailable => return Ok(self.state.decrypt.take_into(buf)),
                DecryptStatus::PeerClosed => {
                    self.state.observe_peer_close();
                    return Ok(0);
                }
                DecryptStatus::DataNeeded => {
                    let n = match self
                        .transport
                        .read(self.state.decrypt.writable_tail())
                        .await
                    {
                        Ok(n) => n,
                        Err(e) => return Err(self.state.fault(e.into())),
                    };
                    if n == 0 {
                        return Err(self.state.fault(TlsError::Truncated));
                    }
                    self.state.decrypt.commit_read(n);
                }
                DecryptStatus::Error => {
                    let err = self.state.decrypt.last_error();
                    return Err(self.state.fault(err.into()));
                }
            }
        }
    }

    /// Encrypt and send some of `buf`. Returns the number of plaintext bytes
    /// consumed, which may be less than `buf.len()`; the caller loops for
    /// the rest.
    pub async fn write(&mut self, buf: &[u8]) -> Result<usize, TlsError> {
        self.check_interrupted()?;
        self.state.gate_write()?;
        if buf.is_empty() {
            return Ok(0);
        }
        self.in_flight = true;
        let result = self.write_inner(buf).await;
        self.in_flight = false;
        result
    }

    async fn write_inner(&mut self, buf: &[u8]) -> Result<usize, TlsError> {
        match self.state.encrypt.step(&mut self.state.engine, buf) {
            DriverStatus::DataAvailable => {
                let len = self.state.encrypt.pending_output().len();
                if let Err(e) = self
                    .transport
                    .write_all(self.state.encrypt.pending_output())
                    .await
                {
                    // A partially transmitted record cannot be resumed.
                    return Err(self.state.fault(e.into()));
                }
                self.state.encrypt.commit_written(len);
                Ok(self.state.encrypt.bytes_consumed())
            }
            DriverStatus::Error => {
                let err = self.state.encrypt.last_error();
                Err(self.state.fault(err.into()))
            }
            DriverStatus::DataNeeded | DriverStatus::Done => {
                let err = ProtocolError::Internal("encrypt step produced no record".into());
                Err(self.state.fault(err.into()))
            }
        }
    }

    /// Emit close_notify and close the TLS channel. A failed close_notify
    /// write is returned but the phase still becomes `Closed`; repeated
    /// calls replay the first outcome.
    pub async fn shutdown(&mut self) -> Result<(), TlsError> {
        self.check_interrupted()?;
        if self.state.gate_shutdown()? {
            return self.state.replay_shutdown();
        }
        self.in_flight = true;
        let outcome = self.shutdown_inner().await;
        self.in_flight = false;
        self.state.finish_shutdown(outcome)
    }

    async fn shutdown_inner(&mut self) -> ShutdownOutcome {
        loop {
            match self.state.shutdown.step(&mut self.state.engine) {
                DriverStatus::DataAvailable => {
                    let len = self.state.shutdown.pending_output().len();
                    match self
                        .transport
                        .write_all(self.state.shutdown.pending_output())
                        .await
                    {
                        Ok(()) => self.state.shutdown.commit_written(len),
                        Err(e) => return ShutdownOutcome::Transport(e.kind(), e.to_string()),
                    }
                }
                DriverStatus::Done => return ShutdownOutcome::Clean,
                DriverStatus::Error => {
                    return ShutdownOutcome::Protocol(self.state.shutdown.last_error())
                }
                DriverStatus::DataNeeded => {
                    return ShutdownOutcome::Protocol(ProtocolError::Internal(
                        "shutdown step requested input".into(),
                    ))
                }
            }
        }
    }
}
