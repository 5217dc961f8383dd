//! Byte-stream port abstraction.
//!
//! The bridge only needs three things from each side of the wire: how many
//! bytes are waiting, a bulk read of exactly that many, and a bulk write.
//! [`Port`] captures that contract. Two implementations live here:
//! - [`SerialLink`] over a real serial device (115200 8N1, no flow control)
//! - [`MemoryPort`], an in-process double driven through a [`MemoryHandle`]
//!
//! This is the lowest layer of comspy. Everything else builds on [`Port`].

pub mod error;
pub mod memory;
pub mod serial;
pub mod traits;

pub use error::{PortError, Result};
pub use memory::{MemoryHandle, MemoryPort};
pub use serial::{list_ports, PortInfo, SerialLink, SerialSettings, BAUD_RATE};
pub use traits::Port;
