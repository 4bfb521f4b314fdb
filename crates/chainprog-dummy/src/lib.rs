//! chainprog-dummy - Simulated shift register chain
//!
//! This crate provides a [`DigitalPort`] that emulates the adapter and the
//! HV5523/HV3418 chain in memory. It's useful for testing and development
//! without real hardware.
//!
//! The simulation tracks the output register written by the host. On every
//! rising CK edge the chain shifts in the DOUT level, and DIN starts
//! reporting the DOUT level that was shifted in at the previous rising
//! edge. A rising CS edge latches the last 96 shifted bits onto the chip
//! outputs.

use std::collections::VecDeque;

use chainprog_core::{BitMode, BitPattern, DigitalPort, PinAssignment, PortStatus, CHAIN_BITS};

/// Port primitives that can be made to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FaultPlan {
    /// Fail `open()`
    pub open: bool,
    /// Fail `reset()`
    pub reset: bool,
    /// Fail `set_bit_mode()`
    pub mode: bool,
    /// Fail every `write_byte()`
    pub write: bool,
    /// Fail every `read_levels()`
    pub read: bool,
    /// Fail `close()`
    pub close: bool,
}

impl FaultPlan {
    /// Plan that fails nothing
    pub fn none() -> Self {
        Self::default()
    }

    fn enable(&mut self, step: &str) -> Result<(), String> {
        match step {
            "open" => self.open = true,
            "reset" => self.reset = true,
            "mode" => self.mode = true,
            "write" => self.write = true,
            "read" => self.read = true,
            "close" => self.close = true,
            "all" => {
                *self = Self {
                    open: true,
                    reset: true,
                    mode: true,
                    write: true,
                    read: true,
                    close: true,
                }
            }
            other => return Err(format!("Unknown fault step: {}", other)),
        }
        Ok(())
    }
}

/// Configuration for the simulated chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DummyConfig {
    /// Primitives that fail
    pub faults: FaultPlan,
    /// Status reported by failing primitives
    pub status: PortStatus,
}

impl Default for DummyConfig {
    fn default() -> Self {
        Self {
            faults: FaultPlan::none(),
            status: PortStatus::IoError,
        }
    }
}

/// One port primitive as seen by the simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortCall {
    /// `open()`
    Open,
    /// `reset()`
    Reset,
    /// `set_bit_mode()`
    SetBitMode {
        /// Output mask
        mask: u8,
        /// Requested mode
        mode: BitMode,
    },
    /// `write_byte()`
    Write(u8),
    /// `read_levels()`
    ReadLevels,
    /// `close()`
    Close,
}

/// Simulated adapter plus shift register chain
#[derive(Debug)]
pub struct SimulatedChain {
    pins: PinAssignment,
    config: DummyConfig,
    is_open: bool,
    output: u8,
    din: bool,
    shifted: VecDeque<bool>,
    latched: BitPattern,
    calls: Vec<PortCall>,
}

impl SimulatedChain {
    /// Create a chain wired to `pins` with no faults
    pub fn new(pins: PinAssignment) -> Self {
        Self::with_config(pins, DummyConfig::default())
    }

    /// Create a chain with an explicit configuration
    pub fn with_config(pins: PinAssignment, config: DummyConfig) -> Self {
        Self {
            pins,
            config,
            is_open: false,
            output: 0,
            din: false,
            shifted: VecDeque::with_capacity(CHAIN_BITS),
            latched: BitPattern::zeroed(),
            calls: Vec::new(),
        }
    }

    /// Every primitive called so far, in order
    pub fn calls(&self) -> &[PortCall] {
        &self.calls
    }

    /// Bytes written so far, in order
    pub fn written(&self) -> Vec<u8> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                PortCall::Write(value) => Some(*value),
                _ => None,
            })
            .collect()
    }

    /// Pattern currently latched onto the chip outputs, in shift order
    pub fn latched(&self) -> &BitPattern {
        &self.latched
    }

    /// Whether the port is currently open
    pub fn is_open(&self) -> bool {
        self.is_open
    }

    fn check(&self, failing: bool) -> Result<(), PortStatus> {
        if !self.is_open {
            return Err(PortStatus::InvalidHandle);
        }
        if failing {
            return Err(self.config.status);
        }
        Ok(())
    }

    fn level(&self, value: u8, pin: u8) -> bool {
        value & (1 << pin) != 0
    }

    fn apply(&mut self, value: u8) {
        let ck = self.pins.ck();
        let cs = self.pins.cs();

        if !self.level(self.output, ck) && self.level(value, ck) {
            let dout = self.level(value, self.pins.dout());
            // The far end of the chain lags the near end by one clock
            self.din = self.shifted.back().copied().unwrap_or(false);
            if self.shifted.len() == CHAIN_BITS {
                self.shifted.pop_front();
            }
            self.shifted.push_back(dout);
            log::trace!("dummy: shift in {}, DIN now {}", u8::from(dout), u8::from(self.din));
        }

        if !self.level(self.output, cs) && self.level(value, cs) && self.shifted.len() == CHAIN_BITS
        {
            self.latched = BitPattern::from_fn(|i| self.shifted[i]);
            log::trace!("dummy: latched {}", self.latched);
        }

        self.output = value;
    }
}

impl DigitalPort for SimulatedChain {
    fn open(&mut self) -> Result<(), PortStatus> {
        self.calls.push(PortCall::Open);
        if self.config.faults.open {
            return Err(self.config.status);
        }
        log::debug!("dummy: open");
        self.is_open = true;
        Ok(())
    }

    fn reset(&mut self) -> Result<(), PortStatus> {
        self.calls.push(PortCall::Reset);
        self.check(self.config.faults.reset)?;
        self.output = 0;
        Ok(())
    }

    fn set_bit_mode(&mut self, output_mask: u8, mode: BitMode) -> Result<(), PortStatus> {
        self.calls.push(PortCall::SetBitMode {
            mask: output_mask,
            mode,
        });
        self.check(self.config.faults.mode)?;
        if mode == BitMode::AsyncBitbang && output_mask & (1 << self.pins.din()) != 0 {
            log::warn!("dummy: DIN pin {} configured as an output", self.pins.din());
        }
        Ok(())
    }

    fn write_byte(&mut self, value: u8) -> Result<usize, PortStatus> {
        self.calls.push(PortCall::Write(value));
        self.check(self.config.faults.write)?;
        self.apply(value);
        Ok(1)
    }

    fn read_levels(&mut self) -> Result<u8, PortStatus> {
        self.calls.push(PortCall::ReadLevels);
        self.check(self.config.faults.read)?;
        let din_bit = 1u8 << self.pins.din();
        let levels = if self.din {
            self.output | din_bit
        } else {
            self.output & !din_bit
        };
        Ok(levels)
    }

    fn close(&mut self) -> Result<(), PortStatus> {
        self.calls.push(PortCall::Close);
        self.check(self.config.faults.close)?;
        log::debug!("dummy: close");
        self.is_open = false;
        Ok(())
    }
}

/// Parse programmer options into a [`DummyConfig`]
///
/// Supported options:
/// - `fail=<step>[+<step>...]`: primitives to fail (`open`, `reset`, `mode`,
///   `write`, `read`, `close` or `all`)
/// - `status=<code>`: status code reported by failing primitives
pub fn parse_options(options: &[(&str, &str)]) -> Result<DummyConfig, String> {
    let mut config = DummyConfig::default();

    for (key, value) in options {
        match *key {
            "fail" => {
                for step in value.split('+') {
                    config.faults.enable(step.trim())?;
                }
            }
            "status" => {
                let code: u32 = value
                    .parse()
                    .map_err(|_| format!("Invalid status value: {}", value))?;
                config.status = PortStatus::from_code(code);
            }
            _ => {
                log::warn!("Unknown dummy option: {}", key);
            }
        }
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chainprog_core::{
        expected_readback, run_spi_sequence, verify, ChannelMap, MemoryTrace, SequenceError,
        Sequencer,
    };

    fn all_off() -> BitPattern {
        ChannelMap::all_off().into_pattern()
    }

    #[test]
    fn test_readback_lags_by_one_bit() {
        let pattern = all_off();
        let mut chain = SimulatedChain::new(PinAssignment::default());

        let captured = run_spi_sequence(&mut chain, 2, 3, 1, 0, &pattern, None).unwrap();

        assert_eq!(captured, pattern.rotated_right(1));
        assert!(captured[0]); // P[95]
        assert!(!captured[64]); // P[63]
        assert!(captured[65]); // P[64]

        let trace = MemoryTrace::new();
        assert!(!verify(&pattern, &captured, &trace));
        assert!(verify(&expected_readback(&pattern), &captured, &trace));
    }

    #[test]
    fn test_chain_latches_pattern() {
        let mut map = ChannelMap::all_off();
        map.set(chainprog_core::Bank::Low, 7, true).unwrap();
        let pattern = map.into_pattern();

        let mut chain = SimulatedChain::new(PinAssignment::default());
        run_spi_sequence(&mut chain, 2, 3, 1, 0, &pattern, None).unwrap();

        assert_eq!(chain.latched(), &pattern);
        assert!(!chain.is_open());
    }

    #[test]
    fn test_exact_call_sequence() {
        let pins = PinAssignment::default();
        let pattern = BitPattern::from_fn(|i| i % 2 == 1);
        let mut chain = SimulatedChain::new(pins);
        let trace = MemoryTrace::new();

        Sequencer::new(&mut chain, pins, &trace).run(&pattern);

        let mut expected = vec![
            PortCall::Open,
            PortCall::Reset,
            PortCall::SetBitMode {
                mask: 0xFE,
                mode: BitMode::AsyncBitbang,
            },
            PortCall::Write(0b0000),
            PortCall::Write(0b0100),
        ];
        for _pass in 0..2 {
            expected.push(PortCall::Write(0b0000));
            for i in 0..CHAIN_BITS {
                let d = if pattern[i] { 0b0010 } else { 0 };
                expected.push(PortCall::Write(d));
                expected.push(PortCall::Write(d | 0b1000));
                expected.push(PortCall::Write(d));
                expected.push(PortCall::ReadLevels);
            }
            // Bit 95 is set
            expected.push(PortCall::Write(0b0110));
            expected.push(PortCall::Write(0b0010));
            expected.push(PortCall::Write(0b0110));
        }
        expected.push(PortCall::Close);

        assert_eq!(chain.calls().len(), 782);
        assert_eq!(chain.calls(), expected.as_slice());
    }

    #[test]
    fn test_write_failures() {
        let pins = PinAssignment::default();
        let config = DummyConfig {
            faults: FaultPlan {
                write: true,
                ..FaultPlan::none()
            },
            status: PortStatus::IoError,
        };
        let mut chain = SimulatedChain::with_config(pins, config);
        let trace = MemoryTrace::new();

        let outcome = Sequencer::new(&mut chain, pins, &trace).run(&all_off());

        assert_eq!(outcome.reads, 192);
        assert_eq!(
            chain
                .calls()
                .iter()
                .filter(|c| **c == PortCall::ReadLevels)
                .count(),
            192
        );
        assert_eq!(trace.count_containing("Device failed step write"), 586);
        assert_eq!(outcome.captured, BitPattern::zeroed());
    }

    #[test]
    fn test_open_failure_keeps_going() {
        let pins = PinAssignment::default();
        let config = DummyConfig {
            faults: FaultPlan {
                open: true,
                ..FaultPlan::none()
            },
            status: PortStatus::DeviceNotFound,
        };
        let mut chain = SimulatedChain::with_config(pins, config);
        let trace = MemoryTrace::new();

        let outcome = Sequencer::new(&mut chain, pins, &trace).run(&all_off());

        // open + reset + mode + 586 writes + 192 reads + close
        assert_eq!(outcome.failures.len(), 1 + 1 + 1 + 586 + 192 + 1);
        assert_eq!(
            outcome.failures[0],
            SequenceError::DeviceOpenFailed(PortStatus::DeviceNotFound)
        );
        assert_eq!(
            outcome.failures[1],
            SequenceError::DeviceResetFailed(PortStatus::InvalidHandle)
        );
        assert_eq!(outcome.captured, BitPattern::zeroed());
        assert_eq!(chain.calls().len(), 782);
    }

    #[test]
    fn test_other_pin_assignment() {
        let pins = PinAssignment::new(7, 4, 5, 6).unwrap();
        let pattern = BitPattern::from_fn(|i| i % 5 == 0 || i == 95);
        let mut chain = SimulatedChain::new(pins);

        let captured = run_spi_sequence(&mut chain, 7, 4, 5, 6, &pattern, None).unwrap();

        assert_eq!(captured, expected_readback(&pattern));
        assert!(chain
            .calls()
            .contains(&PortCall::SetBitMode {
                mask: 0b1011_1111,
                mode: BitMode::AsyncBitbang
            }));
    }

    #[test]
    fn test_parse_options() {
        let config = parse_options(&[("fail", "write+read"), ("status", "18")]).unwrap();
        assert!(config.faults.write);
        assert!(config.faults.read);
        assert!(!config.faults.open);
        assert_eq!(config.status, PortStatus::OtherError);

        let config = parse_options(&[("fail", "all")]).unwrap();
        assert!(config.faults.open && config.faults.close);

        assert!(parse_options(&[("fail", "explode")]).is_err());
        assert!(parse_options(&[("status", "four")]).is_err());
        assert_eq!(parse_options(&[]).unwrap(), DummyConfig::default());
    }
}
