//! Digital I/O port abstraction
//!
//! This module provides the trait for **byte-wide bit-bang ports**: adapters
//! that drive up to eight pins from a single register write and can sample
//! the instantaneous level of every pin.
//!
//! ## Architecture
//!
//! The chain sequencer only needs six primitives:
//!
//! 1. `open()` / `close()` bracket one session
//! 2. `reset()` and `set_bit_mode()` put the adapter into async bit-bang mode
//!    with a given output mask
//! 3. `write_byte()` drives all output pins at once
//! 4. `read_levels()` samples all pins at once
//!
//! Every primitive reports a [`PortStatus`] on failure. Status values follow
//! the D2XX numbering so traces stay comparable with vendor tooling.

use core::fmt;

/// Adapter pin mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitMode {
    /// All pins back to their power-on function
    Reset,
    /// Asynchronous bit-bang: every written byte appears on the pins
    AsyncBitbang,
}

impl BitMode {
    /// Mode value as understood by FTDI adapters
    pub fn wire_value(self) -> u8 {
        match self {
            BitMode::Reset => 0x00,
            BitMode::AsyncBitbang => 0x01,
        }
    }
}

impl fmt::Display for BitMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BitMode::Reset => write!(f, "reset"),
            BitMode::AsyncBitbang => write!(f, "async bit-bang"),
        }
    }
}

/// Failure status reported by a port primitive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortStatus {
    /// Handle is not valid (port never opened or already closed)
    InvalidHandle,
    /// No matching device is attached
    DeviceNotFound,
    /// Device exists but could not be opened
    DeviceNotOpened,
    /// Transfer failed
    IoError,
    /// Out of memory or USB resources
    InsufficientResources,
    /// Argument rejected by the adapter
    InvalidParameter,
    /// Operation not supported by the adapter
    NotSupported,
    /// Unclassified adapter error
    OtherError,
    /// Status code with no named variant
    Other(u32),
}

impl PortStatus {
    /// Numeric status code
    pub fn code(&self) -> u32 {
        match *self {
            PortStatus::InvalidHandle => 1,
            PortStatus::DeviceNotFound => 2,
            PortStatus::DeviceNotOpened => 3,
            PortStatus::IoError => 4,
            PortStatus::InsufficientResources => 5,
            PortStatus::InvalidParameter => 6,
            PortStatus::NotSupported => 17,
            PortStatus::OtherError => 18,
            PortStatus::Other(code) => code,
        }
    }

    /// Map a numeric status code back to a status
    pub fn from_code(code: u32) -> Self {
        match code {
            1 => PortStatus::InvalidHandle,
            2 => PortStatus::DeviceNotFound,
            3 => PortStatus::DeviceNotOpened,
            4 => PortStatus::IoError,
            5 => PortStatus::InsufficientResources,
            6 => PortStatus::InvalidParameter,
            17 => PortStatus::NotSupported,
            18 => PortStatus::OtherError,
            other => PortStatus::Other(other),
        }
    }

    /// Human readable name
    pub fn name(&self) -> &'static str {
        match self {
            PortStatus::InvalidHandle => "invalid handle",
            PortStatus::DeviceNotFound => "device not found",
            PortStatus::DeviceNotOpened => "device not opened",
            PortStatus::IoError => "I/O error",
            PortStatus::InsufficientResources => "insufficient resources",
            PortStatus::InvalidParameter => "invalid parameter",
            PortStatus::NotSupported => "not supported",
            PortStatus::OtherError => "other error",
            PortStatus::Other(_) => "unknown status",
        }
    }
}

impl fmt::Display for PortStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (status {})", self.name(), self.code())
    }
}

/// Trait for byte-wide bit-bang adapters
///
/// Implementations are blocking and single-user: one session owns the port
/// (or a mutable borrow of it) between `open()` and `close()`.
pub trait DigitalPort {
    /// Open the device
    fn open(&mut self) -> Result<(), PortStatus>;

    /// Reset the device
    fn reset(&mut self) -> Result<(), PortStatus>;

    /// Select the pin mode; bits set in `output_mask` become outputs
    fn set_bit_mode(&mut self, output_mask: u8, mode: BitMode) -> Result<(), PortStatus>;

    /// Drive all output pins; returns the number of bytes written
    fn write_byte(&mut self, value: u8) -> Result<usize, PortStatus>;

    /// Sample the instantaneous level of every pin
    fn read_levels(&mut self) -> Result<u8, PortStatus>;

    /// Close the device
    fn close(&mut self) -> Result<(), PortStatus>;
}

impl<P: DigitalPort + ?Sized> DigitalPort for &mut P {
    fn open(&mut self) -> Result<(), PortStatus> {
        (**self).open()
    }

    fn reset(&mut self) -> Result<(), PortStatus> {
        (**self).reset()
    }

    fn set_bit_mode(&mut self, output_mask: u8, mode: BitMode) -> Result<(), PortStatus> {
        (**self).set_bit_mode(output_mask, mode)
    }

    fn write_byte(&mut self, value: u8) -> Result<usize, PortStatus> {
        (**self).write_byte(value)
    }

    fn read_levels(&mut self) -> Result<u8, PortStatus> {
        (**self).read_levels()
    }

    fn close(&mut self) -> Result<(), PortStatus> {
        (**self).close()
    }
}

impl<P: DigitalPort + ?Sized> DigitalPort for Box<P> {
    fn open(&mut self) -> Result<(), PortStatus> {
        (**self).open()
    }

    fn reset(&mut self) -> Result<(), PortStatus> {
        (**self).reset()
    }

    fn set_bit_mode(&mut self, output_mask: u8, mode: BitMode) -> Result<(), PortStatus> {
        (**self).set_bit_mode(output_mask, mode)
    }

    fn write_byte(&mut self, value: u8) -> Result<usize, PortStatus> {
        (**self).write_byte(value)
    }

    fn read_levels(&mut self) -> Result<u8, PortStatus> {
        (**self).read_levels()
    }

    fn close(&mut self) -> Result<(), PortStatus> {
        (**self).close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes_round_trip_named_variants() {
        for status in [
            PortStatus::InvalidHandle,
            PortStatus::DeviceNotFound,
            PortStatus::DeviceNotOpened,
            PortStatus::IoError,
            PortStatus::InsufficientResources,
            PortStatus::InvalidParameter,
            PortStatus::NotSupported,
            PortStatus::OtherError,
        ] {
            assert_eq!(PortStatus::from_code(status.code()), status);
        }
        assert_eq!(PortStatus::from_code(42), PortStatus::Other(42));
    }

    #[test]
    fn test_status_display() {
        assert_eq!(PortStatus::IoError.to_string(), "I/O error (status 4)");
        assert_eq!(
            PortStatus::Other(99).to_string(),
            "unknown status (status 99)"
        );
    }

    #[test]
    fn test_bit_mode_wire_value() {
        assert_eq!(BitMode::Reset.wire_value(), 0x00);
        assert_eq!(BitMode::AsyncBitbang.wire_value(), 0x01);
    }
}
