//! Transparent two-port bridge with message logging.
//!
//! This is the "just works" layer. Hand it two [`Port`]s and a [`LogSink`]:
//! every byte from one port is written straight to the other, and each
//! direction's traffic is reassembled into messages that land in the log as
//! hex once the line goes quiet.
//!
//! [`Port`]: comspy_port::Port

pub mod bridge;
pub mod error;
pub mod sink;

pub use bridge::{Bridge, BridgeConfig, Direction, StepReport, DEFAULT_IDLE_SLEEP};
pub use error::{BridgeError, Result};
pub use sink::{format_line, EventLog, LogSink, SharedSink, TIMESTAMP_FORMAT};
