//! Board channel map
//!
//! The board exposes 25 low-voltage outputs driven by the HV5523 and 25
//! high-voltage outputs driven by the HV3418. Channel `n` of a bank lives
//! at pattern index `base - n`. HV5523 outputs are on when their bit is
//! low; HV3418 outputs are on when their bit is high.

use core::fmt;

use crate::error::ChannelError;
use crate::pattern::{BitPattern, CHAIN_BITS};

/// Channels per bank exposed on the board
pub const CHANNELS_PER_BANK: u8 = 25;

/// Output bank
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bank {
    /// Low-voltage outputs (HV5523)
    Low,
    /// High-voltage outputs (HV3418)
    High,
}

impl Bank {
    /// Both banks, LV first
    pub const ALL: [Bank; 2] = [Bank::Low, Bank::High];

    /// Pattern index one past channel 1
    fn base(self) -> usize {
        match self {
            Bank::Low => CHAIN_BITS,
            Bank::High => 64,
        }
    }

    /// Bit value that switches a channel on
    pub fn on_level(self) -> bool {
        match self {
            Bank::Low => false,
            Bank::High => true,
        }
    }

    /// Short bank name
    pub fn name(self) -> &'static str {
        match self {
            Bank::Low => "LV",
            Bank::High => "HV",
        }
    }

    /// Pattern index of `channel`
    pub fn bit_index(self, channel: u8) -> Result<usize, ChannelError> {
        if !(1..=CHANNELS_PER_BANK).contains(&channel) {
            return Err(ChannelError::OutOfRange {
                bank: self,
                channel,
                max: CHANNELS_PER_BANK,
            });
        }
        Ok(self.base() - usize::from(channel))
    }
}

impl fmt::Display for Bank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Channel-level view of a chain pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelMap {
    pattern: BitPattern,
}

impl ChannelMap {
    /// Every output off: 64 low bits followed by 32 high bits
    pub fn all_off() -> Self {
        Self {
            pattern: BitPattern::from_fn(|i| i >= 64),
        }
    }

    /// View an existing pattern, such as a captured readback
    pub fn from_pattern(pattern: BitPattern) -> Self {
        Self { pattern }
    }

    /// Switch one channel
    pub fn set(&mut self, bank: Bank, channel: u8, on: bool) -> Result<(), ChannelError> {
        let index = bank.bit_index(channel)?;
        self.pattern.set(index, on == bank.on_level());
        Ok(())
    }

    /// Switch every channel of a bank; bits outside 1..=25 are left alone
    pub fn set_all(&mut self, bank: Bank, on: bool) {
        for channel in 1..=CHANNELS_PER_BANK {
            let index = bank.base() - usize::from(channel);
            self.pattern.set(index, on == bank.on_level());
        }
    }

    /// Whether a channel is on
    pub fn is_on(&self, bank: Bank, channel: u8) -> Result<bool, ChannelError> {
        let index = bank.bit_index(channel)?;
        Ok(self.pattern[index] == bank.on_level())
    }

    /// On/off state of channels 1..=25 of a bank
    pub fn states(&self, bank: Bank) -> [bool; CHANNELS_PER_BANK as usize] {
        core::array::from_fn(|i| self.pattern[bank.base() - 1 - i] == bank.on_level())
    }

    /// Channels of a bank that are on
    pub fn on_channels(&self, bank: Bank) -> Vec<u8> {
        (1..=CHANNELS_PER_BANK)
            .filter(|&ch| self.pattern[bank.base() - usize::from(ch)] == bank.on_level())
            .collect()
    }

    /// Underlying pattern
    pub fn pattern(&self) -> &BitPattern {
        &self.pattern
    }

    /// Consume the map and return the pattern
    pub fn into_pattern(self) -> BitPattern {
        self.pattern
    }
}

impl Default for ChannelMap {
    fn default() -> Self {
        Self::all_off()
    }
}

/// One row per bank, `#` for on and `.` for off, channel 1 first
impl fmt::Display for ChannelMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (n, bank) in Bank::ALL.iter().enumerate() {
            if n > 0 {
                writeln!(f)?;
            }
            write!(f, "{}: ", bank)?;
            for on in self.states(*bank) {
                f.write_str(if on { "#" } else { "." })?;
            }
        }
        Ok(())
    }
}
