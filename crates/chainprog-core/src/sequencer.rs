//! Two-pass shift sequencer for the HV5523 -> HV3418 chain
//!
//! The chain sits behind an LTC6820 isolator pair running with POL=0,
//! PHA=0, so CS/LE edges never produce clock edges of their own and both
//! chips can be latched by pulsing CS at the end of a pass.
//!
//! ## Protocol
//!
//! ```text
//! open, reset, set_bit_mode(!DIN, async bit-bang)
//! wake:     reg(0,0,0) reg(1,0,0)
//! 2 passes: reg(0,0,0)
//!           for each bit b:  reg(0,0,b) reg(0,1,b) reg(0,0,b) read
//!           after bit 95:    reg(1,0,b) reg(0,0,b) reg(1,0,b)
//! close
//! ```
//!
//! The first pass loads the shift registers, the second pushes the same
//! pattern again while the previous contents come out on DIN. The HV5523
//! shifts on the falling clock edge and the HV3418 on the rising edge, so
//! the captured pattern lags the written one by one position.
//!
//! Every device step is checked. A failing step is logged and traced and
//! the sequence carries on with the next scheduled step.

use core::fmt;
use std::path::Path;
use std::time::Duration;

use crate::error::{PinError, SequenceError};
use crate::pattern::{BitPattern, CHAIN_BITS};
use crate::port::{BitMode, DigitalPort};
use crate::register::PinAssignment;
use crate::trace::{DiagnosticSink, FileTrace, NullTrace};
use crate::verify::verify;

/// Number of times the pattern is shifted through the chain per session
pub const SHIFT_PASSES: usize = 2;

/// What to do when the device cannot be opened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Attempt every scheduled step regardless of earlier failures
    #[default]
    BestEffort,
    /// Stop right after a failed `open()`
    AbortOnOpenFailure,
}

/// Session tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SequencerConfig {
    /// Delay after every register write
    pub settle: Duration,
    /// Behaviour after a failed `open()`
    pub failure_policy: FailurePolicy,
}

/// Result of one session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceOutcome {
    /// Levels sampled on DIN after each clock pulse of the last pass
    pub captured: BitPattern,
    /// Failed device steps, in the order they happened
    pub failures: Vec<SequenceError>,
    /// Number of `write_byte()` calls issued
    pub writes: usize,
    /// Number of `read_levels()` calls issued
    pub reads: usize,
}

impl SequenceOutcome {
    /// True if every device step succeeded
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Position of a step in the protocol, used to label failures
#[derive(Debug, Clone, Copy)]
enum Step {
    Setup,
    Wake,
    PassStart { pass: usize },
    Present { pass: usize, bit: usize },
    ClockHigh { pass: usize, bit: usize },
    ClockLow { pass: usize, bit: usize },
    Sample { pass: usize, bit: usize },
    Latch { pass: usize, pulse: usize },
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Step::Setup => write!(f, "setup"),
            Step::Wake => write!(f, "wake pulse"),
            Step::PassStart { pass } => write!(f, "pass {}, start", pass + 1),
            Step::Present { pass, bit } => write!(f, "pass {}, bit {}, data", pass + 1, bit),
            Step::ClockHigh { pass, bit } => {
                write!(f, "pass {}, bit {}, clock high", pass + 1, bit)
            }
            Step::ClockLow { pass, bit } => write!(f, "pass {}, bit {}, clock low", pass + 1, bit),
            Step::Sample { pass, bit } => write!(f, "pass {}, bit {}, sample", pass + 1, bit),
            Step::Latch { pass, pulse } => write!(f, "pass {}, latch {}", pass + 1, pulse + 1),
        }
    }
}

/// One shift session over an exclusively owned port
///
/// The port may be owned or a `&mut` borrow; either way it is closed before
/// [`Sequencer::run`] returns.
pub struct Sequencer<'a, P: DigitalPort> {
    port: P,
    pins: PinAssignment,
    config: SequencerConfig,
    trace: &'a dyn DiagnosticSink,
    captured: BitPattern,
    failures: Vec<SequenceError>,
    writes: usize,
    reads: usize,
}

impl<'a, P: DigitalPort> Sequencer<'a, P> {
    /// Create a session with the default configuration
    pub fn new(port: P, pins: PinAssignment, trace: &'a dyn DiagnosticSink) -> Self {
        Self {
            port,
            pins,
            config: SequencerConfig::default(),
            trace,
            captured: BitPattern::zeroed(),
            failures: Vec::new(),
            writes: 0,
            reads: 0,
        }
    }

    /// Replace the session configuration
    pub fn with_config(mut self, config: SequencerConfig) -> Self {
        self.config = config;
        self
    }

    /// Shift `pattern` through the chain twice and capture the readback
    pub fn run(mut self, pattern: &BitPattern) -> SequenceOutcome {
        let mask = self.pins.output_mask();

        log::info!("Starting chain session ({})", self.pins);
        self.trace.append_line("Starting chain session");
        self.trace.append_line(&format!("CS: {}", self.pins.cs()));
        self.trace.append_line(&format!("CK: {}", self.pins.ck()));
        self.trace.append_line(&format!("DOUT: {}", self.pins.dout()));
        self.trace.append_line(&format!("DIN: {}", self.pins.din()));
        self.trace.append_line(&format!("Data: {}", pattern));
        self.trace.append_line(&format!("IO mask is: 0x{:02X}", mask));

        log::trace!("open()");
        if let Err(status) = self.port.open() {
            self.record(SequenceError::DeviceOpenFailed(status), Step::Setup);
            if self.config.failure_policy == FailurePolicy::AbortOnOpenFailure {
                log::warn!("Aborting session: device could not be opened");
                self.trace.append_line("Session aborted after open failure");
                return self.finish();
            }
        }

        log::trace!("reset()");
        if let Err(status) = self.port.reset() {
            self.record(SequenceError::DeviceResetFailed(status), Step::Setup);
        }

        log::trace!("set_bit_mode(0x{:02X}, {})", mask, BitMode::AsyncBitbang);
        if let Err(status) = self.port.set_bit_mode(mask, BitMode::AsyncBitbang) {
            self.record(SequenceError::ModeConfigFailed(status), Step::Setup);
        }

        self.write(false, false, false, Step::Wake);
        self.write(true, false, false, Step::Wake);

        for pass in 0..SHIFT_PASSES {
            log::debug!("Shift pass {} of {}", pass + 1, SHIFT_PASSES);

            // CS low enables shifting
            self.write(false, false, false, Step::PassStart { pass });

            for (bit, dout) in pattern.iter().enumerate() {
                self.write(false, false, dout, Step::Present { pass, bit });
                self.write(false, true, dout, Step::ClockHigh { pass, bit });
                self.write(false, false, dout, Step::ClockLow { pass, bit });
                self.sample(pass, bit);

                if bit == CHAIN_BITS - 1 {
                    // Both LE edges, one per chip
                    self.write(true, false, dout, Step::Latch { pass, pulse: 0 });
                    self.write(false, false, dout, Step::Latch { pass, pulse: 1 });
                    self.write(true, false, dout, Step::Latch { pass, pulse: 2 });
                }
            }
        }

        log::trace!("close()");
        if let Err(status) = self.port.close() {
            self.record(SequenceError::DeviceCloseFailed(status), Step::Setup);
        }

        log::info!(
            "Chain session finished: {} writes, {} reads, {} failures",
            self.writes,
            self.reads,
            self.failures.len()
        );
        self.finish()
    }

    fn write(&mut self, cs: bool, ck: bool, dout: bool, step: Step) {
        let value = self.pins.register(cs, ck, dout);
        log::trace!("write_byte(0x{:02X}) [{}]", value, step);

        self.writes += 1;
        if let Err(status) = self.port.write_byte(value) {
            self.record(SequenceError::WriteFailed(status), step);
        }

        if !self.config.settle.is_zero() {
            std::thread::sleep(self.config.settle);
        }
    }

    fn sample(&mut self, pass: usize, bit: usize) {
        self.reads += 1;
        match self.port.read_levels() {
            Ok(levels) => {
                let level = self.pins.din_level(levels);
                log::trace!("read_levels() = 0x{:02X}, DIN={}", levels, u8::from(level));
                self.captured.set(bit, level);
            }
            Err(status) => self.record(SequenceError::ReadFailed(status), Step::Sample { pass, bit }),
        }
    }

    fn record(&mut self, error: SequenceError, step: Step) {
        let line = match step {
            Step::Setup => format!("Device failed step {}: {}", error.step(), error.status()),
            step => format!(
                "Device failed step {} ({}): {}",
                error.step(),
                step,
                error.status()
            ),
        };
        log::warn!("{}", line);
        self.trace.append_line(&line);
        self.failures.push(error);
    }

    fn finish(self) -> SequenceOutcome {
        SequenceOutcome {
            captured: self.captured,
            failures: self.failures,
            writes: self.writes,
            reads: self.reads,
        }
    }
}

/// Program `pattern` into the chain and return the captured readback
///
/// Pin indices are validated before any device access; that is the only
/// error this returns. Device failures are traced and the captured pattern
/// is returned regardless. With `log_dir` set, the session trace goes to
/// `SPI Sequence Trace.txt` in that directory.
pub fn run_spi_sequence<P: DigitalPort>(
    port: P,
    cs: u8,
    ck: u8,
    dout: u8,
    din: u8,
    pattern: &BitPattern,
    log_dir: Option<&Path>,
) -> Result<BitPattern, PinError> {
    let pins = PinAssignment::new(cs, ck, dout, din)?;

    let file_trace;
    let trace: &dyn DiagnosticSink = match log_dir {
        Some(dir) => {
            file_trace = FileTrace::in_dir(dir);
            &file_trace
        }
        None => &NullTrace,
    };

    let outcome = Sequencer::new(port, pins, trace).run(pattern);
    verify(pattern, &outcome.captured, trace);
    Ok(outcome.captured)
}
