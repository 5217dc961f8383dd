use std::time::{Duration, Instant};

use bytes::Bytes;
use tracing::{debug, trace};

use crate::framer::Framer;

/// Where a direction is in the reassembly cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryState {
    /// Nothing pending.
    Idle,
    /// Bytes pending, waiting for the line to go quiet.
    Accumulating,
}

/// Decides when a message is complete by watching for silence.
///
/// Starts disarmed: until the first arrival is recorded the line is never
/// considered quiet, so a check at startup cannot fire.
#[derive(Debug, Clone)]
pub struct BoundaryDetector {
    quiet: Duration,
    last_activity: Option<Instant>,
}

impl BoundaryDetector {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            last_activity: None,
        }
    }

    /// Note that bytes arrived at `now`.
    pub fn record_activity(&mut self, now: Instant) {
        self.last_activity = Some(now);
    }

    /// True once strictly more than the quiet interval has passed since the
    /// last recorded arrival.
    pub fn is_quiet(&self, now: Instant) -> bool {
        match self.last_activity {
            Some(last) => now.saturating_duration_since(last) > self.quiet,
            None => false,
        }
    }

    /// Forget the last arrival.
    pub fn disarm(&mut self) {
        self.last_activity = None;
    }

    pub fn last_activity(&self) -> Option<Instant> {
        self.last_activity
    }

    pub fn quiet_interval(&self) -> Duration {
        self.quiet
    }
}

/// Reassembles one direction of traffic into messages.
#[derive(Debug)]
pub struct MessageAssembler {
    framer: Framer,
    detector: BoundaryDetector,
}

impl MessageAssembler {
    pub fn new(quiet: Duration) -> Self {
        Self::with_framer(Framer::new(), quiet)
    }

    pub fn with_framer(framer: Framer, quiet: Duration) -> Self {
        Self {
            framer,
            detector: BoundaryDetector::new(quiet),
        }
    }

    /// Feed bytes that arrived at `now`.
    ///
    /// The arrival time advances even when the bytes are rejected as noise.
    pub fn feed(&mut self, bytes: &[u8], now: Instant) {
        if bytes.is_empty() {
            return;
        }
        self.framer.push(bytes);
        self.detector.record_activity(now);
    }

    /// Return the pending message if it is complete at `now`.
    ///
    /// A message is complete when the buffer is non-empty and either the line
    /// has been quiet for longer than the interval or the framer's size cap
    /// was reached. A completed buffer shorter than the header can never be a
    /// message and is dropped instead of returned.
    pub fn poll(&mut self, now: Instant) -> Option<Bytes> {
        if self.framer.is_empty() {
            return None;
        }
        if !self.framer.is_full() && !self.detector.is_quiet(now) {
            return None;
        }

        let message = self.framer.take();
        self.detector.disarm();

        if message.len() < crate::framer::HEADER.len() {
            trace!(len = message.len(), "dropping truncated header at boundary");
            return None;
        }
        debug!(len = message.len(), "message complete");
        Some(message)
    }

    /// Drop whatever is pending without completing it.
    pub fn reset(&mut self) {
        self.framer.clear();
        self.detector.disarm();
    }

    pub fn state(&self) -> BoundaryState {
        if self.framer.is_empty() {
            BoundaryState::Idle
        } else {
            BoundaryState::Accumulating
        }
    }

    /// Bytes accumulated so far.
    pub fn pending(&self) -> &[u8] {
        self.framer.as_bytes()
    }

    pub fn detector(&self) -> &BoundaryDetector {
        &self.detector
    }
}
