use std::collections::VecDeque;
use std::io::{Error, ErrorKind};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use bytes::Bytes;

use crate::error::{PortError, Result};
use crate::traits::Port;

#[derive(Debug, Default)]
struct MemoryState {
    inbound: VecDeque<u8>,
    written: Vec<u8>,
    fail_read: Option<ErrorKind>,
    fail_write: Option<ErrorKind>,
}

/// An in-process [`Port`] backed by shared queues.
///
/// Bytes injected through a [`MemoryHandle`] become available to the bridge;
/// bytes the bridge writes can be collected through the same handle.
#[derive(Debug, Clone)]
pub struct MemoryPort {
    name: String,
    state: Arc<Mutex<MemoryState>>,
}

/// Test-side view of a [`MemoryPort`].
#[derive(Debug, Clone)]
pub struct MemoryHandle {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryPort {
    /// Create a port and the handle that drives it.
    pub fn new(name: impl Into<String>) -> (Self, MemoryHandle) {
        let state = Arc::new(Mutex::new(MemoryState::default()));
        let port = Self {
            name: name.into(),
            state: Arc::clone(&state),
        };
        (port, MemoryHandle { state })
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        lock(&self.state)
    }
}

impl MemoryHandle {
    /// Make `bytes` available for the next read, as if they arrived on the wire.
    pub fn inject(&self, bytes: &[u8]) {
        lock(&self.state).inbound.extend(bytes.iter().copied());
    }

    /// Drain everything written to the port so far.
    pub fn take_written(&self) -> Vec<u8> {
        std::mem::take(&mut lock(&self.state).written)
    }

    /// Bytes injected but not yet read.
    pub fn pending_inbound(&self) -> usize {
        lock(&self.state).inbound.len()
    }

    /// Fail the next read with an I/O error of `kind`.
    pub fn fail_next_read(&self, kind: ErrorKind) {
        lock(&self.state).fail_read = Some(kind);
    }

    /// Fail the next write with an I/O error of `kind`.
    pub fn fail_next_write(&self, kind: ErrorKind) {
        lock(&self.state).fail_write = Some(kind);
    }
}

fn lock(state: &Mutex<MemoryState>) -> MutexGuard<'_, MemoryState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Port for MemoryPort {
    fn name(&self) -> &str {
        &self.name
    }

    fn available(&mut self) -> Result<usize> {
        Ok(self.state().inbound.len())
    }

    fn read_available(&mut self, count: usize) -> Result<Bytes> {
        let mut state = self.state();
        if let Some(kind) = state.fail_read.take() {
            return Err(PortError::Read {
                port: self.name.clone(),
                source: Error::from(kind),
            });
        }
        if state.inbound.len() < count {
            return Err(PortError::Read {
                port: self.name.clone(),
                source: Error::from(ErrorKind::TimedOut),
            });
        }
        let bytes: Vec<u8> = state.inbound.drain(..count).collect();
        Ok(Bytes::from(bytes))
    }

    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        let mut state = self.state();
        if let Some(kind) = state.fail_write.take() {
            return Err(PortError::Write {
                port: self.name.clone(),
                source: Error::from(kind),
            });
        }
        state.written.extend_from_slice(bytes);
        Ok(())
    }
}
