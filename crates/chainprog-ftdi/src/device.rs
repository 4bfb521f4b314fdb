//! FTDI async bit-bang port
//!
//! This module provides the `FtdiPort` struct that drives the chain pins
//! through an FTDI channel in asynchronous bit-bang mode and implements the
//! `DigitalPort` trait.

use std::io::Write;

use chainprog_core::{BitMode, DigitalPort, PortStatus};
use ftdi::{find_by_vid_pid, Device, Interface};

use crate::error::{FtdiError, Result};
use crate::protocol::*;

/// Configuration for opening an FTDI device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FtdiConfig {
    /// Device type (determines VID/PID)
    pub device_type: FtdiDeviceType,
    /// Interface/channel to use (A, B, C, D)
    pub interface: FtdiInterface,
    /// Baud rate, which sets the bit-bang output clock
    pub baudrate: u32,
    /// Latency timer in milliseconds
    pub latency_ms: u8,
}

impl Default for FtdiConfig {
    fn default() -> Self {
        Self::for_device(FtdiDeviceType::default())
    }
}

impl FtdiConfig {
    /// Create a new config for a specific device type
    pub fn for_device(device_type: FtdiDeviceType) -> Self {
        FtdiConfig {
            device_type,
            interface: FtdiInterface::default(),
            baudrate: DEFAULT_BAUDRATE,
            latency_ms: DEFAULT_LATENCY_MS,
        }
    }

    /// Set the interface/channel
    pub fn interface(mut self, interface: FtdiInterface) -> Result<Self> {
        // Validate that the interface is available on this device
        let max_channel = self.device_type.channel_count();
        if interface.index() >= max_channel {
            return Err(FtdiError::InvalidChannel(format!(
                "Channel {} not available on {} (max: {})",
                interface.letter(),
                self.device_type.name(),
                (b'A' + max_channel - 1) as char
            )));
        }
        self.interface = interface;
        Ok(self)
    }

    /// Set the baud rate
    pub fn baudrate(mut self, baudrate: u32) -> Result<Self> {
        if baudrate == 0 {
            return Err(FtdiError::InvalidParameter(
                "Baud rate must be greater than zero".to_string(),
            ));
        }
        self.baudrate = baudrate;
        Ok(self)
    }

    /// Set the latency timer
    pub fn latency(mut self, latency_ms: u8) -> Result<Self> {
        if latency_ms == 0 {
            return Err(FtdiError::InvalidParameter(
                "Latency timer must be between 1 and 255 ms".to_string(),
            ));
        }
        self.latency_ms = latency_ms;
        Ok(self)
    }
}

/// FTDI channel in async bit-bang mode
///
/// The USB device is claimed by `open()` and released by `close()`. All
/// other primitives report [`PortStatus::InvalidHandle`] while closed.
pub struct FtdiPort {
    config: FtdiConfig,
    device: Option<Device>,
}

impl FtdiPort {
    /// Create a closed port for the given configuration
    pub fn new(config: FtdiConfig) -> Self {
        Self {
            config,
            device: None,
        }
    }

    /// Configuration this port opens with
    pub fn config(&self) -> &FtdiConfig {
        &self.config
    }

    fn device(&mut self) -> std::result::Result<&mut Device, PortStatus> {
        self.device.as_mut().ok_or(PortStatus::InvalidHandle)
    }
}

fn io_status(step: &str, e: impl std::fmt::Display) -> PortStatus {
    log::debug!("FTDI {} failed: {}", step, e);
    PortStatus::IoError
}

impl DigitalPort for FtdiPort {
    fn open(&mut self) -> std::result::Result<(), PortStatus> {
        let config = &self.config;
        log::info!(
            "Opening FTDI {} channel {}",
            config.device_type.name(),
            config.interface.letter()
        );

        let interface = match config.interface {
            FtdiInterface::A => Interface::A,
            FtdiInterface::B => Interface::B,
            FtdiInterface::C => Interface::C,
            FtdiInterface::D => Interface::D,
        };

        let vid = config.device_type.vendor_id();
        let pid = config.device_type.product_id();
        log::debug!("Looking for FTDI device VID={:04X} PID={:04X}", vid, pid);

        let device = find_by_vid_pid(vid, pid)
            .interface(interface)
            .open()
            .map_err(|e| {
                log::debug!("FTDI open failed: {}", e);
                PortStatus::DeviceNotOpened
            })?;

        log::debug!("Opened FTDI device VID={:04X} PID={:04X}", vid, pid);
        self.device = Some(device);
        Ok(())
    }

    fn reset(&mut self) -> std::result::Result<(), PortStatus> {
        let latency = self.config.latency_ms;
        let baudrate = self.config.baudrate;
        let device = self.device()?;

        device.usb_reset().map_err(|e| io_status("USB reset", e))?;
        device
            .set_latency_timer(latency)
            .map_err(|e| io_status("set latency timer", e))?;
        device
            .set_baud_rate(baudrate)
            .map_err(|e| io_status("set baud rate", e))?;
        Ok(())
    }

    fn set_bit_mode(&mut self, output_mask: u8, mode: BitMode) -> std::result::Result<(), PortStatus> {
        let ftdi_mode = match mode {
            BitMode::Reset => ftdi::BitMode::Reset,
            BitMode::AsyncBitbang => ftdi::BitMode::Bitbang,
        };
        log::debug!("Setting bit mode {} with output mask 0x{:02X}", mode, output_mask);
        self.device()?
            .set_bitmode(output_mask, ftdi_mode)
            .map_err(|e| io_status("set bit mode", e))
    }

    fn write_byte(&mut self, value: u8) -> std::result::Result<usize, PortStatus> {
        self.device()?
            .write_all(&[value])
            .map_err(|e| io_status("write", e))?;
        Ok(1)
    }

    fn read_levels(&mut self) -> std::result::Result<u8, PortStatus> {
        self.device()?
            .read_pins()
            .map_err(|e| io_status("read pins", e))
    }

    fn close(&mut self) -> std::result::Result<(), PortStatus> {
        let mut device = self.device.take().ok_or(PortStatus::InvalidHandle)?;
        // Release I/O pins; the USB handle closes on drop
        device
            .set_bitmode(0x00, ftdi::BitMode::Reset)
            .map_err(|e| io_status("release pins", e))?;
        log::debug!("Closed FTDI device");
        Ok(())
    }
}

impl Drop for FtdiPort {
    fn drop(&mut self) {
        if let Some(device) = self.device.as_mut() {
            if let Err(e) = device.set_bitmode(0x00, ftdi::BitMode::Reset) {
                log::warn!("Failed to release pins on close: {}", e);
            }
        }
    }
}

/// Information about a connected FTDI device
#[derive(Debug, Clone)]
pub struct FtdiDeviceInfo {
    /// USB bus number
    pub bus: u8,
    /// USB device address
    pub address: u8,
    /// Device type
    pub device_type: FtdiDeviceType,
    /// Serial number (if available)
    pub serial: Option<String>,
}

impl std::fmt::Display for FtdiDeviceInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "FTDI {} at bus {} address {} ({:04X}:{:04X})",
            self.device_type.name(),
            self.bus,
            self.address,
            self.device_type.vendor_id(),
            self.device_type.product_id()
        )?;
        if let Some(serial) = &self.serial {
            write!(f, " serial {}", serial)?;
        }
        Ok(())
    }
}

/// List connected FTDI devices with bit-bang support
pub fn list_devices() -> Result<Vec<FtdiDeviceInfo>> {
    let mut devices = Vec::new();

    for dev in nusb::list_devices()? {
        if let Some(device_type) = FtdiDeviceType::from_ids(dev.vendor_id(), dev.product_id()) {
            devices.push(FtdiDeviceInfo {
                bus: dev.bus_number(),
                address: dev.device_address(),
                device_type,
                serial: dev.serial_number().map(str::to_string),
            });
        }
    }

    Ok(devices)
}

/// Parse programmer options from a string
///
/// Format: "type=<type>,port=<A|B|C|D>,baudrate=<N>,latency=<ms>"
pub fn parse_options(options: &[(&str, &str)]) -> Result<FtdiConfig> {
    let mut config = FtdiConfig::default();

    for (key, value) in options {
        match *key {
            "type" => {
                config.device_type = FtdiDeviceType::parse(value).ok_or_else(|| {
                    FtdiError::InvalidDeviceType(format!(
                        "Unknown device type '{}'. Valid types: 232h, 2232h, 4232h, 232r, 230x",
                        value
                    ))
                })?;
            }
            "port" | "channel" | "interface" => {
                let mut chars = value.chars();
                let interface = match (chars.next(), chars.next()) {
                    (Some(c), None) => FtdiInterface::from_char(c),
                    _ => None,
                }
                .ok_or_else(|| {
                    FtdiError::InvalidChannel(format!(
                        "Invalid channel '{}': must be A, B, C, or D",
                        value
                    ))
                })?;
                config.interface = interface;
            }
            "baudrate" | "baud" => {
                let baudrate: u32 = value.parse().map_err(|_| {
                    FtdiError::InvalidParameter(format!("Invalid baud rate '{}'", value))
                })?;
                config = config.baudrate(baudrate)?;
            }
            "latency" => {
                let latency: u8 = value.parse().map_err(|_| {
                    FtdiError::InvalidParameter(format!("Invalid latency '{}'", value))
                })?;
                config = config.latency(latency)?;
            }
            _ => {
                log::warn!("Unknown FTDI option: {}={}", key, value);
            }
        }
    }

    // Channel availability depends on the final device type
    let interface = config.interface;
    config.interface(interface)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_defaults() {
        let config = parse_options(&[]).unwrap();
        assert_eq!(config, FtdiConfig::default());
        assert_eq!(config.device_type, FtdiDeviceType::Ft232H);
        assert_eq!(config.baudrate, DEFAULT_BAUDRATE);
    }

    #[test]
    fn test_parse_options() {
        let config = parse_options(&[
            ("type", "4232h"),
            ("port", "c"),
            ("baudrate", "115200"),
            ("latency", "16"),
        ])
        .unwrap();
        assert_eq!(config.device_type, FtdiDeviceType::Ft4232H);
        assert_eq!(config.interface, FtdiInterface::C);
        assert_eq!(config.baudrate, 115200);
        assert_eq!(config.latency_ms, 16);
    }

    #[test]
    fn test_parse_interface_key() {
        let config = parse_options(&[("type", "2232h"), ("interface", "B")]).unwrap();
        assert_eq!(config.device_type, FtdiDeviceType::Ft2232H);
        assert_eq!(config.interface, FtdiInterface::B);
    }

    #[test]
    fn test_parse_rejects_bad_values() {
        assert!(matches!(
            parse_options(&[("type", "ft9000")]),
            Err(FtdiError::InvalidDeviceType(_))
        ));
        assert!(matches!(
            parse_options(&[("port", "AB")]),
            Err(FtdiError::InvalidChannel(_))
        ));
        assert!(matches!(
            parse_options(&[("type", "232h"), ("port", "B")]),
            Err(FtdiError::InvalidChannel(_))
        ));
        assert!(matches!(
            parse_options(&[("port", "B"), ("type", "232h")]),
            Err(FtdiError::InvalidChannel(_))
        ));
        assert!(parse_options(&[("port", "B"), ("type", "2232h")]).is_ok());
        assert!(matches!(
            parse_options(&[("baudrate", "0")]),
            Err(FtdiError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_closed_port_reports_invalid_handle() {
        let mut port = FtdiPort::new(FtdiConfig::default());
        assert_eq!(port.write_byte(0x04), Err(PortStatus::InvalidHandle));
        assert_eq!(port.read_levels(), Err(PortStatus::InvalidHandle));
        assert_eq!(port.close(), Err(PortStatus::InvalidHandle));
    }
}
