//! Message reassembly for a sniffed serial stream.
//!
//! The observed protocol has no length field. A message starts with the
//! 3-byte header `01 FF 02` and ends when the line has been quiet for a
//! configured interval. Per direction, this crate provides:
//! - [`Framer`]: accumulates bytes and drops anything not starting with [`HEADER`]
//! - [`BoundaryDetector`]: tracks the last arrival and decides when the line is quiet
//! - [`MessageAssembler`]: both of the above, yielding completed messages
//!
//! Nothing here performs I/O or reads the clock; callers pass `Instant`s in.

pub mod boundary;
pub mod codec;
pub mod framer;

pub use boundary::{BoundaryDetector, BoundaryState, MessageAssembler};
pub use codec::format_message;
pub use framer::{append, Framer, HEADER};
