//! Error types for chainprog-core

use thiserror::Error;

use crate::channels::Bank;
use crate::port::PortStatus;

/// Invalid pin assignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PinError {
    /// Pin index does not address a bit of the output register
    #[error("{name} pin {pin} is out of range (must be 0-7)")]
    OutOfRange {
        /// Pin role (CS, CK, DOUT or DIN)
        name: &'static str,
        /// Requested index
        pin: u8,
    },

    /// Two roles were assigned the same pin index
    #[error("{first} and {second} pins both use index {pin}")]
    Collision {
        /// First pin role
        first: &'static str,
        /// Second pin role
        second: &'static str,
        /// Shared index
        pin: u8,
    },
}

/// Invalid textual or slice representation of a 96-bit pattern
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    /// Wrong number of bits (or hex digits)
    #[error("expected {expected} {unit}, found {found}")]
    WrongLength {
        /// Required count
        expected: usize,
        /// Count actually supplied
        found: usize,
        /// "bits" or "hex digits"
        unit: &'static str,
    },

    /// A character that is not part of the selected format
    #[error("invalid character '{ch}' at position {position}")]
    InvalidCharacter {
        /// Offending character
        ch: char,
        /// Character position in the input (0-based)
        position: usize,
    },
}

/// Invalid channel reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ChannelError {
    /// Channel number outside 1..=25
    #[error("{bank} channel must be between 1 and {max}, got {channel}")]
    OutOfRange {
        /// Channel bank
        bank: Bank,
        /// Requested channel number
        channel: u8,
        /// Highest valid channel number
        max: u8,
    },
}

/// A failed device step during a shift sequence
///
/// One kind per protocol step, each carrying the status reported by the
/// port. These are recorded and traced, never propagated: the sequencer
/// always runs to completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SequenceError {
    /// `open()` failed
    #[error("failed to open device: {0}")]
    DeviceOpenFailed(PortStatus),

    /// `reset()` failed
    #[error("failed to reset device: {0}")]
    DeviceResetFailed(PortStatus),

    /// `set_bit_mode()` failed
    #[error("failed to configure bit-bang mode: {0}")]
    ModeConfigFailed(PortStatus),

    /// `write_byte()` failed
    #[error("failed to write pin register: {0}")]
    WriteFailed(PortStatus),

    /// `read_levels()` failed
    #[error("failed to read pin levels: {0}")]
    ReadFailed(PortStatus),

    /// `close()` failed
    #[error("failed to close device: {0}")]
    DeviceCloseFailed(PortStatus),
}

impl SequenceError {
    /// Status reported by the port
    pub fn status(&self) -> PortStatus {
        match *self {
            Self::DeviceOpenFailed(s)
            | Self::DeviceResetFailed(s)
            | Self::ModeConfigFailed(s)
            | Self::WriteFailed(s)
            | Self::ReadFailed(s)
            | Self::DeviceCloseFailed(s) => s,
        }
    }

    /// Short name of the protocol step that failed
    pub fn step(&self) -> &'static str {
        match self {
            Self::DeviceOpenFailed(_) => "open",
            Self::DeviceResetFailed(_) => "reset",
            Self::ModeConfigFailed(_) => "set bit mode",
            Self::WriteFailed(_) => "write",
            Self::ReadFailed(_) => "read",
            Self::DeviceCloseFailed(_) => "close",
        }
    }
}

/// Errors loading a settings file
#[derive(Debug, Error)]
pub enum SettingsError {
    /// Settings file could not be read
    #[error("failed to read settings file '{path}': {source}")]
    Io {
        /// File path
        path: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Settings file is not valid TOML or has unknown keys
    #[error("failed to parse settings: {0}")]
    Parse(#[from] toml::de::Error),

    /// Pin section is invalid
    #[error("invalid pin settings: {0}")]
    Pins(#[from] PinError),

    /// Pattern section is invalid
    #[error("invalid pattern settings: {0}")]
    Pattern(#[from] PatternError),

    /// Channel list references a channel that does not exist
    #[error("invalid channel settings: {0}")]
    Channel(#[from] ChannelError),
}
