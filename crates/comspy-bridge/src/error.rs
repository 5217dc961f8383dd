/// Errors that stop the bridge.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// A port read or write failed. There is no reconnect; the bridge stops.
    #[error("port error: {0}")]
    Port(#[from] comspy_port::PortError),

    /// The log sink could not be written.
    #[error("log write failed: {0}")]
    Log(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BridgeError>;
