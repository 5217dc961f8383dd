use bytes::{Bytes, BytesMut};
use tracing::trace;

/// Start-of-message marker. A pending buffer that does not begin with these
/// bytes is noise.
pub const HEADER: [u8; 3] = [0x01, 0xFF, 0x02];

const INITIAL_BUFFER_CAPACITY: usize = 256;

/// Append `new_bytes` to `pending`, discarding everything if the result does
/// not begin with [`HEADER`].
///
/// The check runs on every call. While fewer than `HEADER.len()` bytes have
/// accumulated, the buffer is kept only if it is a prefix of the header, so a
/// header split across reads survives and a stray byte does not poison the
/// next message. Returns `false` when the buffer was reset.
pub fn append(pending: &mut BytesMut, new_bytes: &[u8]) -> bool {
    pending.extend_from_slice(new_bytes);

    let checked = pending.len().min(HEADER.len());
    if pending[..checked] == HEADER[..checked] {
        return true;
    }

    trace!(discarded = pending.len(), "dropping bytes without header");
    pending.clear();
    false
}

/// Pending-message buffer for one direction.
#[derive(Debug)]
pub struct Framer {
    buf: BytesMut,
    max_len: Option<usize>,
}

impl Framer {
    /// Create an empty framer with no size cap.
    pub fn new() -> Self {
        Self {
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            max_len: None,
        }
    }

    /// Cap the pending buffer. Once it holds `max_len` bytes it is considered
    /// complete without waiting for the line to go quiet.
    pub fn with_max_len(mut self, max_len: Option<usize>) -> Self {
        self.max_len = max_len;
        self
    }

    /// Feed newly received bytes. Returns `false` if they were rejected as
    /// noise (and the buffer reset).
    pub fn push(&mut self, new_bytes: &[u8]) -> bool {
        append(&mut self.buf, new_bytes)
    }

    /// Snapshot the pending bytes and reset to empty.
    pub fn take(&mut self) -> Bytes {
        self.buf.split().freeze()
    }

    /// Drop the pending bytes.
    pub fn clear(&mut self) {
        self.buf.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether the buffer holds a full header (and so a real message start).
    pub fn has_header(&self) -> bool {
        self.buf.len() >= HEADER.len()
    }

    /// Whether the configured cap has been reached.
    pub fn is_full(&self) -> bool {
        self.max_len.is_some_and(|max| self.buf.len() >= max)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn max_len(&self) -> Option<usize> {
        self.max_len
    }
}

impl Default for Framer {
    fn default() -> Self {
        Self::new()
    }
}
