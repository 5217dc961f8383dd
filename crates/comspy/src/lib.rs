//! Transparent serial bridge that logs the messages passing between two devices.
//!
//! comspy sits between two serial devices, copies every byte from each side to
//! the other, and writes each reassembled message to a timestamped log.
//!
//! # Crate Structure
//!
//! - [`port`] — Port abstraction, serial and in-memory implementations
//! - [`frame`] — Header-synchronised reassembly and quiet-interval boundaries
//! - [`bridge`] — The forwarding loop and log sink

/// Re-export port types.
pub mod port {
    pub use comspy_port::*;
}

/// Re-export frame types.
pub mod frame {
    pub use comspy_frame::*;
}

/// Re-export bridge types.
pub mod bridge {
    pub use comspy_bridge::*;
}
