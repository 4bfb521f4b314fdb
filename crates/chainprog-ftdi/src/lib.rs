//! chainprog-ftdi - FTDI async bit-bang port
//!
//! This crate drives the chain pins through one channel of an FTDI USB
//! adapter in asynchronous bit-bang mode, using libftdi1.
//!
//! # Supported Devices
//!
//! - FTDI FT232H (single channel, default)
//! - FTDI FT2232H (dual channel)
//! - FTDI FT4232H (quad channel)
//! - FTDI FT232R
//! - FTDI FT-X series
//!
//! # Example
//!
//! ```no_run
//! use chainprog_core::{run_spi_sequence, ChannelMap};
//! use chainprog_ftdi::{FtdiConfig, FtdiDeviceType, FtdiPort};
//!
//! let config = FtdiConfig::for_device(FtdiDeviceType::Ft2232H)
//!     .interface(chainprog_ftdi::FtdiInterface::B)?;
//! let port = FtdiPort::new(config);
//!
//! let pattern = ChannelMap::all_off().into_pattern();
//! let captured = run_spi_sequence(port, 2, 3, 1, 0, &pattern, None)?;
//! println!("Readback: {}", captured);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Programmer Options
//!
//! When using the CLI, the following options are available:
//!
//! - `type=<device>` - Device type (232h, 2232h, 4232h, 232r, 230x)
//! - `port=<A|B|C|D>` - Channel to use (default: A), also `channel` or `interface`
//! - `baudrate=<N>` - Bit-bang clock baud rate (default: 9600)
//! - `latency=<ms>` - USB latency timer (default: 2)

pub mod device;
mod error;
mod protocol;

pub use device::{list_devices, parse_options, FtdiConfig, FtdiDeviceInfo, FtdiPort};
pub use error::{FtdiError, Result};
pub use protocol::{FtdiDeviceType, FtdiInterface};
