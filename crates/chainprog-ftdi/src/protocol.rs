//! FTDI device table
//!
//! Only chips whose async bit-bang mode exposes eight pins on channel A
//! (and B-D where present) are listed.

/// FTDI vendor ID
pub const FTDI_VID: u16 = 0x0403;

/// FT232R / FT245R product ID
pub const FTDI_FT232R_PID: u16 = 0x6001;

/// FT2232H product ID (dual channel)
pub const FTDI_FT2232H_PID: u16 = 0x6010;

/// FT4232H product ID (quad channel)
pub const FTDI_FT4232H_PID: u16 = 0x6011;

/// FT232H product ID (single channel)
pub const FTDI_FT232H_PID: u16 = 0x6014;

/// FT-X series product ID (FT230X, FT231X, ...)
pub const FTDI_FT_X_PID: u16 = 0x6015;

/// Default baud rate; the bit-bang clock is this times 16 on FT232H
pub const DEFAULT_BAUDRATE: u32 = 9600;

/// Default latency timer in milliseconds
pub const DEFAULT_LATENCY_MS: u8 = 2;

/// Supported FTDI device types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FtdiDeviceType {
    /// FT232H (Adafruit FT232H breakout and similar)
    #[default]
    Ft232H,
    /// FT2232H
    Ft2232H,
    /// FT4232H
    Ft4232H,
    /// FT232R
    Ft232R,
    /// FT-X series
    FtX,
}

impl FtdiDeviceType {
    /// Get the vendor ID for this device type
    pub fn vendor_id(&self) -> u16 {
        FTDI_VID
    }

    /// Get the product ID for this device type
    pub fn product_id(&self) -> u16 {
        match self {
            FtdiDeviceType::Ft232H => FTDI_FT232H_PID,
            FtdiDeviceType::Ft2232H => FTDI_FT2232H_PID,
            FtdiDeviceType::Ft4232H => FTDI_FT4232H_PID,
            FtdiDeviceType::Ft232R => FTDI_FT232R_PID,
            FtdiDeviceType::FtX => FTDI_FT_X_PID,
        }
    }

    /// Get the number of channels for this device type
    pub fn channel_count(&self) -> u8 {
        match self {
            FtdiDeviceType::Ft232H | FtdiDeviceType::Ft232R | FtdiDeviceType::FtX => 1,
            FtdiDeviceType::Ft2232H => 2,
            FtdiDeviceType::Ft4232H => 4,
        }
    }

    /// Parse device type from string
    pub fn parse(s: &str) -> Option<Self> {
        let s_lower = s.to_lowercase();
        match s_lower.as_str() {
            "232h" | "ft232h" => Some(FtdiDeviceType::Ft232H),
            "2232h" | "ft2232h" => Some(FtdiDeviceType::Ft2232H),
            "4232h" | "ft4232h" => Some(FtdiDeviceType::Ft4232H),
            "232r" | "ft232r" => Some(FtdiDeviceType::Ft232R),
            "230x" | "ft230x" | "ftx" => Some(FtdiDeviceType::FtX),
            _ => None,
        }
    }

    /// Get the name of this device type
    pub fn name(&self) -> &'static str {
        match self {
            FtdiDeviceType::Ft232H => "FT232H",
            FtdiDeviceType::Ft2232H => "FT2232H",
            FtdiDeviceType::Ft4232H => "FT4232H",
            FtdiDeviceType::Ft232R => "FT232R",
            FtdiDeviceType::FtX => "FT-X",
        }
    }

    /// Look up the device type for a USB VID/PID pair
    pub fn from_ids(vid: u16, pid: u16) -> Option<Self> {
        if vid != FTDI_VID {
            return None;
        }
        match pid {
            FTDI_FT232H_PID => Some(FtdiDeviceType::Ft232H),
            FTDI_FT2232H_PID => Some(FtdiDeviceType::Ft2232H),
            FTDI_FT4232H_PID => Some(FtdiDeviceType::Ft4232H),
            FTDI_FT232R_PID => Some(FtdiDeviceType::Ft232R),
            FTDI_FT_X_PID => Some(FtdiDeviceType::FtX),
            _ => None,
        }
    }
}

/// FTDI interface/channel selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FtdiInterface {
    /// Channel A (default)
    #[default]
    A,
    /// Channel B
    B,
    /// Channel C
    C,
    /// Channel D
    D,
}

impl FtdiInterface {
    /// Parse interface from character
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'A' => Some(FtdiInterface::A),
            'B' => Some(FtdiInterface::B),
            'C' => Some(FtdiInterface::C),
            'D' => Some(FtdiInterface::D),
            _ => None,
        }
    }

    /// Get the interface index (0-3)
    pub fn index(&self) -> u8 {
        match self {
            FtdiInterface::A => 0,
            FtdiInterface::B => 1,
            FtdiInterface::C => 2,
            FtdiInterface::D => 3,
        }
    }

    /// Get the channel letter
    pub fn letter(&self) -> char {
        (b'A' + self.index()) as char
    }
}
