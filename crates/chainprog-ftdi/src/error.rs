//! Error types for the FTDI port

use thiserror::Error;

/// Result type for FTDI operations
pub type Result<T> = std::result::Result<T, FtdiError>;

/// Errors configuring or enumerating FTDI devices
///
/// Failures of the port primitives themselves are reported as
/// [`chainprog_core::PortStatus`] values instead.
#[derive(Debug, Error)]
pub enum FtdiError {
    /// Invalid device type
    #[error("Invalid device type: {0}")]
    InvalidDeviceType(String),

    /// Invalid channel/port specification
    #[error("Invalid channel: {0}")]
    InvalidChannel(String),

    /// Invalid parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// USB enumeration error
    #[error("USB error: {0}")]
    UsbError(#[from] nusb::Error),
}
