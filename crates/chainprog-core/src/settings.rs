//! TOML settings file
//!
//! ```toml
//! programmer = "ftdi:type=2232h,interface=B"
//!
//! [pins]
//! cs = 2
//! ck = 3
//! dout = 1
//! din = 0
//!
//! [session]
//! log_dir = "C:/chain-logs"
//! settle_us = 0
//! abort_on_open_failure = false
//!
//! [pattern]
//! # either a full pattern ...
//! bits = "0x0000000000000000FFFFFFFF"
//! # ... and/or channels to switch on, starting from all-off
//! lv_on = [1, 2, 3]
//! hv_on = [25]
//! ```
//!
//! Every key is optional. `sck`, `mosi` and `miso` are accepted as aliases
//! for `ck`, `dout` and `din`.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::channels::{Bank, ChannelMap};
use crate::error::SettingsError;
use crate::pattern::BitPattern;
use crate::register::PinAssignment;
use crate::sequencer::{FailurePolicy, SequencerConfig};

/// Programmer used when none is configured
pub const DEFAULT_PROGRAMMER: &str = "dummy";

/// Top-level settings file
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Programmer string (`name:key=value,...`)
    pub programmer: Option<String>,
    /// Pin assignment
    pub pins: PinSettings,
    /// Session options
    pub session: SessionSettings,
    /// Pattern to program
    pub pattern: PatternSettings,
}

/// `[pins]` table
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PinSettings {
    /// Chip select / latch enable
    pub cs: u8,
    /// Clock
    #[serde(alias = "sck")]
    pub ck: u8,
    /// Data towards the chain
    #[serde(alias = "mosi")]
    pub dout: u8,
    /// Data from the chain
    #[serde(alias = "miso")]
    pub din: u8,
}

impl Default for PinSettings {
    fn default() -> Self {
        let pins = PinAssignment::default();
        Self {
            cs: pins.cs(),
            ck: pins.ck(),
            dout: pins.dout(),
            din: pins.din(),
        }
    }
}

/// `[session]` table
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionSettings {
    /// Directory for the session trace file
    #[serde(alias = "directory")]
    pub log_dir: Option<PathBuf>,
    /// Delay after every register write, in microseconds
    pub settle_us: u64,
    /// Stop the session if the device cannot be opened
    pub abort_on_open_failure: bool,
}

/// `[pattern]` table
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PatternSettings {
    /// Full pattern, as a bit string or `0x` hex
    pub bits: Option<String>,
    /// LV channels to switch on
    pub lv_on: Vec<u8>,
    /// HV channels to switch on
    pub hv_on: Vec<u8>,
}

impl Settings {
    /// Load settings from a TOML file
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse settings from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self, SettingsError> {
        let settings: Settings = toml::from_str(content)?;
        // Surface bad pins and patterns at load time
        settings.pin_assignment()?;
        settings.pattern()?;
        Ok(settings)
    }

    /// Programmer string, falling back to the simulated chain
    pub fn programmer(&self) -> &str {
        self.programmer.as_deref().unwrap_or(DEFAULT_PROGRAMMER)
    }

    /// Validated pin assignment
    pub fn pin_assignment(&self) -> Result<PinAssignment, SettingsError> {
        let p = &self.pins;
        Ok(PinAssignment::new(p.cs, p.ck, p.dout, p.din)?)
    }

    /// Sequencer configuration from the `[session]` table
    pub fn sequencer_config(&self) -> SequencerConfig {
        SequencerConfig {
            settle: Duration::from_micros(self.session.settle_us),
            failure_policy: if self.session.abort_on_open_failure {
                FailurePolicy::AbortOnOpenFailure
            } else {
                FailurePolicy::BestEffort
            },
        }
    }

    /// Pattern from the `[pattern]` table
    ///
    /// Starts from `bits` (or all-off) and switches on the listed channels.
    pub fn pattern(&self) -> Result<BitPattern, SettingsError> {
        let base = match &self.pattern.bits {
            Some(text) => text.parse::<BitPattern>()?,
            None => ChannelMap::all_off().into_pattern(),
        };

        let mut map = ChannelMap::from_pattern(base);
        for &channel in &self.pattern.lv_on {
            map.set(Bank::Low, channel, true)?;
        }
        for &channel in &self.pattern.hv_on {
            map.set(Bank::High, channel, true)?;
        }
        Ok(map.into_pattern())
    }
}
