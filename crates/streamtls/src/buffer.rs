//! Scratch buffers owned by the operation drivers.

use zeroize::Zeroize;

/// Largest record the mediator will buffer: one maximum TLS plaintext
/// fragment plus framing and cipher expansion headroom.
pub(crate) const MAX_RECORD: usize = 16 * 1024 + 512;

/// Fixed-capacity input staging with an explicit committed length.
///
/// The orchestrator reads transport bytes into [`writable_tail`] and then
/// [`commit`]s the count; the driver hands the committed prefix to the
/// engine and [`consume`]s what the engine took. Unconsumed leftover moves
/// to the front so trailing ciphertext survives across calls.
///
/// [`writable_tail`]: IoBuffer::writable_tail
/// [`commit`]: IoBuffer::commit
/// [`consume`]: IoBuffer::consume
pub(crate) struct IoBuffer {
    data: Vec<u8>,
    len: usize,
}

impl IoBuffer {
    pub(crate) fn new() -> Self {
        Self {
            data: vec![0u8; MAX_RECORD],
            len: 0,
        }
    }

    pub(crate) fn writable_tail(&mut self) -> &mut [u8] {
        &mut self.data[self.len..]
    }

    pub(crate) fn commit(&mut self, n: usize) {
        debug_assert!(self.len + n <= self.data.len());
        self.len = (self.len + n).min(self.data.len());
    }

    pub(crate) fn filled(&self) -> &[u8] {
        &self.data[..self.len]
    }

    pub(crate) fn consume(&mut self, n: usize) {
        let n = n.min(self.len);
        self.data.copy_within(n..self.len, 0);
        self.len -= n;
    }

    pub(crate) fn extend(&mut self, bytes: &[u8]) {
        let tail = self.writable_tail();
        let n = bytes.len().min(tail.len());
        tail[..n].copy_from_slice(&bytes[..n]);
        self.commit(n);
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub(crate) fn is_full(&self) -> bool {
        self.len == self.data.len()
    }

    /// Drain all committed bytes.
    pub(crate) fn take(&mut self) -> Vec<u8> {
        let out = self.data[..self.len].to_vec();
        self.len = 0;
        out
    }
}

/// Decrypted-plaintext staging, zeroized on release.
pub(crate) struct SecretBuffer {
    data: Vec<u8>,
}

impl SecretBuffer {
    pub(crate) fn new() -> Self {
        Self { data: Vec::new() }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub(crate) fn extend(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }

    /// Copy up to `out.len()` staged bytes into `out` and drop them from the
    /// staging buffer. Returns the number of bytes copied.
    pub(crate) fn take_into(&mut self, out: &mut [u8]) -> usize {
        let n = out.len().min(self.data.len());
        out[..n].copy_from_slice(&self.data[..n]);
        self.data.drain(..n);
        n
    }
}

impl Drop for SecretBuffer {
    fn drop(&mut self) {
        self.data.zeroize();
    }
}
