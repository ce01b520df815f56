//! Blocking TLS stream over a `Read + Write` transport.

use std::io::{self, Read, Write};
use std::sync::Arc;

use streamtls_types::{Phase, ProtocolError, TlsError, TlsRole};

use crate::context::TlsContext;
use crate::driver::decrypt::DecryptStatus;
use crate::driver::DriverStatus;
use crate::engine::TlsEngine;
use crate::state::{ConnState, ShutdownOutcome};

/// A TLS stream that blocks on transport I/O.
///
/// Wraps a transport and an engine; every operation loops the corresponding
/// driver, performing synchronous reads and writes as its status demands.
/// Not thread-safe: the caller serializes operations on one stream. Streams
/// over distinct transports run in parallel freely.
pub struct TlsStream<S, E> {
    transport: S,
    state: ConnState<E>,
}

impl<S: Read + Write, E: TlsEngine> TlsStream<S, E> {
    /// Create a stream over `transport` using a shared context and an engine
    /// owned exclusively by this stream.
    pub fn new(transport: S, context: Arc<TlsContext>, engine: E) -> Self {
        Self {
            transport,
            state: ConnState::new(context, engine),
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

    /// Perform the TLS handshake, blocking until it completes or fails.
    /// Idempotent once the stream is open.
    pub fn handshake(&mut self, role: TlsRole) -> Result<(), TlsError> {
        if self.state.gate_handshake()? {
            return Ok(());
        }
        self.state.begin_handshake(role)?;
        loop {
            match self.state.handshake.step(&mut self.state.engine) {
                DriverStatus::DataNeeded => {
                    let n = match self.transport.read(self.state.handshake.writable_tail()) {
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

    /// Read some decrypted bytes into `buf`, blocking until at least one
    /// byte is available, the peer closes, or an error occurs.
    ///
    /// Returns `Ok(0)` only for an empty `buf` or after the peer's
    /// close_notify (benign end of stream; the phase becomes `Closing`).
    pub fn read(&mut self, buf: &mut [u8]) -> Result<usize, TlsError> {
        self.state.gate_read()?;
        if buf.is_empty() {
            return Ok(0);
        }
        loop {
            match self.state.decrypt.step(&mut self.state.engine) {
                DecryptStatus::DataAvailable => return Ok(self.state.decrypt.take_into(buf)),
                DecryptStatus::PeerClosed => {
                    self.state.observe_peer_close();
                    return Ok(0);
                }
                DecryptStatus::DataNeeded => {
                    let n = match self.transport.read(self.state.decrypt.writable_tail()) {
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

    /// Encrypt and send some of `buf`, blocking until the sealed record is
    /// fully transmitted. Returns the number of plaintext bytes consumed,
    /// which may be less than `buf.len()`; the caller loops for the rest.
    pub fn write(&mut self, buf: &[u8]) -> Result<usize, TlsError> {
        self.state.gate_write()?;
        if buf.is_empty() {
            return Ok(0);
        }
        match self.state.encrypt.step(&mut self.state.engine, buf) {
            DriverStatus::DataAvailable => {
                let len = self.state.encrypt.pending_output().len();
                if let Err(e) = self.transport.write_all(self.state.encrypt.pending_output()) {
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

    /// Emit close_notify and close the TLS channel, blocking until the alert
    /// is transmitted. A failed close_notify write is returned but the phase
    /// still becomes `Closed`; repeated calls replay the first outcome.
    pub fn shutdown(&mut self) -> Result<(), TlsError> {
        if self.state.gate_shutdown()? {
            return self.state.replay_shutdown();
        }
        let outcome = loop {
            match self.state.shutdown.step(&mut self.state.engine) {
                DriverStatus::DataAvailable => {
                    let len = self.state.shutdown.pending_output().len();
                    match self
                        .transport
                        .write_all(self.state.shutdown.pending_output())
                    {
                        Ok(()) => self.state.shutdown.commit_written(len),
                        Err(e) => break ShutdownOutcome::Transport(e.kind(), e.to_string()),
                    }
                }
                DriverStatus::Done => break ShutdownOutcome::Clean,
                DriverStatus::Error => {
                    break ShutdownOutcome::Protocol(self.state.shutdown.last_error())
                }
                DriverStatus::DataNeeded => {
                    break ShutdownOutcome::Protocol(ProtocolError::Internal(
                        "shutdown step requested input".into(),
                    ))
                }
            }
        };
        self.state.finish_shutdown(outcome)
    }
}

impl<S: Read + Write, E: TlsEngine> Read for TlsStream<S, E> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        TlsStream::read(self, buf).map_err(Into::into)
    }
}

impl<S: Read + Write, E: TlsEngine> Write for TlsStream<S, E> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        TlsStream::write(self, buf).map_err(Into::into)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.transport.flush()
    }
}
