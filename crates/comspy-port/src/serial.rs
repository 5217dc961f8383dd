use std::io::{Read, Write};
use std::time::Duration;

use bytes::{Bytes, BytesMut};
use serde::Serialize;
use serialport::{DataBits, FlowControl, Parity, SerialPort, SerialPortType, StopBits};
use tracing::{debug, info};

use crate::error::{PortError, Result};
use crate::traits::Port;

/// Line speed of the bridged link. The byte format is fixed at 8N1.
pub const BAUD_RATE: u32 = 115_200;

/// How a serial device is opened.
#[derive(Debug, Clone, PartialEq)]
pub struct SerialSettings {
    /// Device path (e.g. `/dev/ttyUSB0`, `COM3`).
    pub path: String,
    /// Upper bound for a single read.
    pub read_timeout: Duration,
    /// Upper bound for a single write, including the flush.
    pub write_timeout: Duration,
    /// Maximum gap between bytes of one read.
    ///
    /// Reads only ever request bytes the driver already reports as buffered,
    /// so there is no gap to wait on. Kept so configuration round-trips.
    pub inter_byte_timeout: Option<Duration>,
}

impl SerialSettings {
    /// Settings with one-second read and write timeouts.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            read_timeout: Duration::from_secs(1),
            write_timeout: Duration::from_secs(1),
            inter_byte_timeout: None,
        }
    }
}

/// A serial device bridged through [`Port`].
pub struct SerialLink {
    inner: Box<dyn SerialPort>,
    settings: SerialSettings,
}

impl SerialLink {
    /// Open the device at 115200 baud, 8 data bits, no parity, 1 stop bit.
    pub fn open(settings: SerialSettings) -> Result<Self> {
        let inner = serialport::new(&settings.path, BAUD_RATE)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(settings.read_timeout)
            .open()
            .map_err(|source| PortError::Open {
                port: settings.path.clone(),
                source,
            })?;

        info!(
            port = %settings.path,
            baud = BAUD_RATE,
            read_timeout = ?settings.read_timeout,
            write_timeout = ?settings.write_timeout,
            "opened serial port (8N1)"
        );

        Ok(Self { inner, settings })
    }

    /// Settings the port was opened with.
    pub fn settings(&self) -> &SerialSettings {
        &self.settings
    }

    fn read_error(&self, source: std::io::Error) -> PortError {
        PortError::Read {
            port: self.settings.path.clone(),
            source,
        }
    }
}

impl Port for SerialLink {
    fn name(&self) -> &str {
        &self.settings.path
    }

    fn available(&mut self) -> Result<usize> {
        self.inner
            .bytes_to_read()
            .map(|n| n as usize)
            .map_err(|err| self.read_error(err.into()))
    }

    fn read_available(&mut self, count: usize) -> Result<Bytes> {
        let mut buf = BytesMut::zeroed(count);
        if let Err(err) = self.inner.read_exact(&mut buf) {
            return Err(self.read_error(err));
        }
        Ok(buf.freeze())
    }

    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        if bytes.is_empty() {
            return Ok(());
        }
        let read_timeout = self.settings.read_timeout;
        let write_timeout = self.settings.write_timeout;
        let result = with_timeout(&mut *self.inner, write_timeout, read_timeout, |port| {
            port.write_all(bytes)?;
            port.flush()
        });
        result.map_err(|source| PortError::Write {
            port: self.settings.path.clone(),
            source,
        })
    }
}

impl std::fmt::Debug for SerialLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialLink")
            .field("settings", &self.settings)
            .finish()
    }
}

/// A port whose single I/O timeout can be changed.
trait Timeout {
    fn set_io_timeout(&mut self, timeout: Duration) -> std::io::Result<()>;
}

impl Timeout for dyn SerialPort {
    fn set_io_timeout(&mut self, timeout: Duration) -> std::io::Result<()> {
        self.set_timeout(timeout).map_err(Into::into)
    }
}

/// Run `op` with the port timeout temporarily set to `timeout`.
///
/// serialport exposes a single timeout for both directions; it is swapped only
/// when the read and write bounds differ. An error from `op` wins over a
/// failure to restore.
fn with_timeout<P: Timeout + ?Sized, T>(
    port: &mut P,
    timeout: Duration,
    restore: Duration,
    op: impl FnOnce(&mut P) -> std::io::Result<T>,
) -> std::io::Result<T> {
    if timeout == restore {
        return op(port);
    }
    port.set_io_timeout(timeout)?;
    let result = op(port);
    let restored = port.set_io_timeout(restore);
    let value = result?;
    restored?;
    Ok(value)
}

/// A serial port present on the host.
#[derive(Debug, Clone, Serialize)]
pub struct PortInfo {
    pub port_name: String,
    pub port_type: String,
    pub manufacturer: Option<String>,
    pub product: Option<String>,
    pub serial_number: Option<String>,
    pub vid: Option<u16>,
    pub pid: Option<u16>,
}

/// Enumerate serial ports.
///
/// On macOS the `/dev/tty.*` callin devices are skipped; the matching
/// `/dev/cu.*` entries do not block waiting for carrier detect.
pub fn list_ports() -> Result<Vec<PortInfo>> {
    let ports = serialport::available_ports().map_err(PortError::Enumerate)?;
    debug!(count = ports.len(), "enumerated serial ports");

    Ok(ports
        .into_iter()
        .filter(|p| !cfg!(target_os = "macos") || !p.port_name.starts_with("/dev/tty."))
        .map(|p| {
            let (port_type, manufacturer, product, serial_number, vid, pid) = match p.port_type {
                SerialPortType::UsbPort(info) => (
                    "usb",
                    info.manufacturer,
                    info.product,
                    info.serial_number,
                    Some(info.vid),
                    Some(info.pid),
                ),
                SerialPortType::BluetoothPort => ("bluetooth", None, None, None, None, None),
                SerialPortType::PciPort => ("pci", None, None, None, None, None),
                SerialPortType::Unknown => ("unknown", None, None, None, None, None),
            };
            PortInfo {
                port_name: p.port_name,
                port_type: port_type.to_string(),
                manufacturer,
                product,
                serial_number,
                vid,
                pid,
            }
        })
        .collect())
}
