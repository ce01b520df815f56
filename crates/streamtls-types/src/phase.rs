//! Stream lifecycle phase.

use std::fmt;

/// Per-stream lifecycle phase.
///
/// Phases only move forward: `Fresh → Handshaking → Open → Closing → Closed`,
/// with `Faulted` absorbing every non-`Closed` phase. A `Faulted` stream
/// rejects all further operations with the sticky error that faulted it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No handshake attempted yet.
    Fresh,
    /// Handshake in progress.
    Handshaking,
    /// Handshake complete; reads and writes admitted.
    Open,
    /// Peer sent close_notify; reads drain, writes are rejected.
    Closing,
    /// close_notify emitted; the stream is done.
    Closed,
    /// A fatal error occurred; only destruction is legal.
    Faulted,
}

impl Phase {
    /// Whether no further phase transitions are possible.
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Closed | Phase::Faulted)
    }

    /// Whether `next` is a legal forward transition from `self`.
    pub fn can_advance_to(self, next: Phase) -> bool {
        use Phase::*;
        if self == next {
            return true;
        }
        match (self, next) {
            (Closed, _) | (Faulted, _) => false,
            (_, Faulted) => true,
            (Fresh, Handshaking)
            | (Handshaking, Open)
            | (Open, Closing)
            | (Open, Closed)
            | (Closing, Closed) => true,
            _ => false,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Fresh => "fresh",
            Phase::Handshaking => "handshaking",
            Phase::Open => "open",
            Phase::Closing => "closing",
            Phase::Closed => "closed",
            Phase::Faulted => "faulted",
        };
        f.write_str(name)
    }
}
