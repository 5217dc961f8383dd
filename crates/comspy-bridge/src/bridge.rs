use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use bytes::Bytes;
use comspy_frame::{format_message, Framer, MessageAssembler};
use comspy_port::Port;
use tracing::{debug, info};

use crate::error::Result;
use crate::sink::LogSink;

/// Default pause after an iteration that moved no bytes.
pub const DEFAULT_IDLE_SLEEP: Duration = Duration::from_millis(1);

/// One of the two forwarding paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Bytes read from port A and written to port B.
    AToB,
    /// Bytes read from port B and written to port A.
    BToA,
}

impl Direction {
    pub const ALL: [Direction; 2] = [Direction::AToB, Direction::BToA];

    pub fn reverse(self) -> Self {
        match self {
            Direction::AToB => Direction::BToA,
            Direction::BToA => Direction::AToB,
        }
    }
}

/// Bridge behaviour independent of the ports themselves.
#[derive(Debug, Clone, PartialEq)]
pub struct BridgeConfig {
    /// Human-readable name of the device on port A.
    pub name_a: String,
    /// Human-readable name of the device on port B.
    pub name_b: String,
    /// Silence after which a pending message is complete.
    pub quiet_interval: Duration,
    /// Sleep after an iteration that moved no bytes. Zero spins.
    pub idle_sleep: Duration,
    /// Complete a message early once it reaches this many bytes.
    pub max_message_len: Option<usize>,
}

impl BridgeConfig {
    pub fn new(name_a: impl Into<String>, name_b: impl Into<String>, quiet: Duration) -> Self {
        Self {
            name_a: name_a.into(),
            name_b: name_b.into(),
            quiet_interval: quiet,
            idle_sleep: DEFAULT_IDLE_SLEEP,
            max_message_len: None,
        }
    }

    /// Log event name for a direction, e.g. `"PC -> Device"`.
    pub fn event_name(&self, direction: Direction) -> String {
        match direction {
            Direction::AToB => format!("{} -> {}", self.name_a, self.name_b),
            Direction::BToA => format!("{} -> {}", self.name_b, self.name_a),
        }
    }
}

/// What one iteration of the loop did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepReport {
    pub forwarded_a_to_b: usize,
    pub forwarded_b_to_a: usize,
    /// Messages written to the log.
    pub flushed: usize,
}

impl StepReport {
    /// Whether no bytes moved in either direction.
    pub fn is_idle(&self) -> bool {
        self.forwarded_a_to_b == 0 && self.forwarded_b_to_a == 0
    }
}

/// Forwards bytes between two ports and logs the messages they carry.
pub struct Bridge<A, B, S> {
    port_a: A,
    port_b: B,
    sink: S,
    config: BridgeConfig,
    a_to_b: MessageAssembler,
    b_to_a: MessageAssembler,
}

impl<A: Port, B: Port, S: LogSink> Bridge<A, B, S> {
    pub fn new(port_a: A, port_b: B, sink: S, config: BridgeConfig) -> Self {
        let assembler = || {
            let framer = Framer::new().with_max_len(config.max_message_len);
            MessageAssembler::with_framer(framer, config.quiet_interval)
        };
        let a_to_b = assembler();
        let b_to_a = assembler();
        Self {
            port_a,
            port_b,
            sink,
            config,
            a_to_b,
            b_to_a,
        }
    }

    /// Run one iteration at `now`: forward A to B, forward B to A, then flush
    /// whichever direction has gone quiet.
    pub fn step(&mut self, now: Instant) -> Result<StepReport> {
        let mut report = StepReport::default();

        let bytes = forward(&mut self.port_a, &mut self.port_b)?;
        report.forwarded_a_to_b = bytes.len();
        self.a_to_b.feed(&bytes, now);

        let bytes = forward(&mut self.port_b, &mut self.port_a)?;
        report.forwarded_b_to_a = bytes.len();
        self.b_to_a.feed(&bytes, now);

        for direction in Direction::ALL {
            if let Some(message) = self.assembler_mut(direction).poll(now) {
                self.emit(direction, &message)?;
                report.flushed += 1;
            }
        }

        Ok(report)
    }

    /// Loop until `running` is cleared.
    ///
    /// Messages still pending when the loop stops are dropped, not logged.
    /// Any port or log failure ends the loop with an error.
    pub fn run(&mut self, running: &AtomicBool) -> Result<()> {
        info!(
            port_a = %self.port_a.name(),
            port_b = %self.port_b.name(),
            quiet = ?self.config.quiet_interval,
            "bridge running"
        );

        while running.load(Ordering::SeqCst) {
            let report = self.step(Instant::now())?;
            if report.is_idle() && !self.config.idle_sleep.is_zero() {
                std::thread::sleep(self.config.idle_sleep);
            }
        }

        let dropped = self.a_to_b.pending().len() + self.b_to_a.pending().len();
        self.a_to_b.reset();
        self.b_to_a.reset();
        self.sink.flush()?;
        info!(dropped_bytes = dropped, "bridge stopped");
        Ok(())
    }

    fn emit(&mut self, direction: Direction, message: &Bytes) -> Result<()> {
        let event = self.config.event_name(direction);
        debug!(event = %event, len = message.len(), "logging message");
        let body = format_message(message);
        self.sink.record(&event, Some(body.as_str()))?;
        Ok(())
    }

    fn assembler_mut(&mut self, direction: Direction) -> &mut MessageAssembler {
        match direction {
            Direction::AToB => &mut self.a_to_b,
            Direction::BToA => &mut self.b_to_a,
        }
    }

    /// Reassembly state for a direction.
    pub fn assembler(&self, direction: Direction) -> &MessageAssembler {
        match direction {
            Direction::AToB => &self.a_to_b,
            Direction::BToA => &self.b_to_a,
        }
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Tear the bridge down, returning ports and sink.
    pub fn into_parts(self) -> (A, B, S) {
        (self.port_a, self.port_b, self.sink)
    }
}

/// Move whatever `from` has buffered to `to`, returning the bytes moved.
fn forward(from: &mut impl Port, to: &mut impl Port) -> Result<Bytes> {
    let count = from.available()?;
    if count == 0 {
        return Ok(Bytes::new());
    }
    let bytes = from.read_available(count)?;
    to.write(&bytes)?;
    Ok(bytes)
}
