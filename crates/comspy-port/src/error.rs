/// Errors that can occur on a bridged port.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    /// The device could not be opened or configured.
    #[error("failed to open {port}: {source}")]
    Open {
        port: String,
        source: serialport::Error,
    },

    /// Reading from the port timed out or hit an I/O fault.
    #[error("read from {port} failed: {source}")]
    Read {
        port: String,
        source: std::io::Error,
    },

    /// Writing to the port timed out or hit an I/O fault.
    #[error("write to {port} failed: {source}")]
    Write {
        port: String,
        source: std::io::Error,
    },

    /// Serial port enumeration failed.
    #[error("failed to enumerate serial ports: {0}")]
    Enumerate(serialport::Error),
}

impl PortError {
    /// Name of the port the error originated from, if any.
    pub fn port(&self) -> Option<&str> {
        match self {
            PortError::Open { port, .. }
            | PortError::Read { port, .. }
            | PortError::Write { port, .. } => Some(port),
            PortError::Enumerate(_) => None,
        }
    }

    /// Whether the underlying failure was a timeout.
    pub fn is_timeout(&self) -> bool {
        match self {
            PortError::Read { source, .. } | PortError::Write { source, .. } => {
                matches!(
                    source.kind(),
                    std::io::ErrorKind::TimedOut | std::io::ErrorKind::WouldBlock
                )
            }
            PortError::Open { .. } | PortError::Enumerate(_) => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, PortError>;
