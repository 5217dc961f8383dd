use bytes::Bytes;

use crate::error::Result;

/// A duplex byte stream bridged by comspy.
///
/// Both sides of the bridge are driven through this trait, so the bridge never
/// knows which physical device is on which side. Reads and writes may block up
/// to the port's configured timeout and fail rather than wait longer.
pub trait Port {
    /// Identifier used in diagnostics (typically the device path).
    fn name(&self) -> &str;

    /// Number of bytes that can be read right now without blocking.
    fn available(&mut self) -> Result<usize>;

    /// Read exactly `count` bytes.
    ///
    /// Callers pass the value just returned by [`Port::available`], so this
    /// normally completes without waiting. A timeout or I/O fault surfaces as
    /// [`PortError::Read`](crate::PortError::Read).
    fn read_available(&mut self, count: usize) -> Result<Bytes>;

    /// Write all of `bytes`, flushing before returning.
    fn write(&mut self, bytes: &[u8]) -> Result<()>;
}

impl<P: Port + ?Sized> Port for Box<P> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn available(&mut self) -> Result<usize> {
        (**self).available()
    }

    fn read_available(&mut self, count: usize) -> Result<Bytes> {
        (**self).read_available(count)
    }

    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        (**self).write(bytes)
    }
}
