//! chainprog-core - Core library for shift register chain programming
//!
//! This crate drives a 96-bit configuration pattern through a chain of two
//! daisy-connected high-voltage shift register chips (HV5523 followed by
//! HV3418) that sit behind an LTC6820 isolated SPI link. The link is
//! driven by bit-banging four pins of a parallel I/O port: chip select
//! (CS, doubling as latch enable), clock (CK), data out (DOUT) and data
//! in (DIN).
//!
//! The two chips shift and latch on opposite clock/enable edges, so the
//! whole pattern is shifted in twice: the first pass loads the chain, the
//! second pass re-shifts it while the previous contents come back out on
//! DIN. The captured readback lags the written pattern by one bit, see
//! [`verify::expected_readback`].
//!
//! # Example
//!
//! ```ignore
//! use chainprog_core::{run_spi_sequence, BitPattern, ChannelMap};
//!
//! fn program<P: chainprog_core::DigitalPort>(port: P) {
//!     let pattern = ChannelMap::all_off().into_pattern();
//!     let captured = run_spi_sequence(port, 2, 3, 1, 0, &pattern, None).unwrap();
//!     println!("Readback: {}", captured);
//! }
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod channels;
pub mod error;
pub mod pattern;
pub mod port;
pub mod register;
pub mod sequencer;
pub mod settings;
pub mod trace;
pub mod verify;

pub use channels::{Bank, ChannelMap, CHANNELS_PER_BANK};
pub use error::{ChannelError, PatternError, PinError, SequenceError, SettingsError};
pub use pattern::{BitPattern, CHAIN_BITS};
pub use port::{BitMode, DigitalPort, PortStatus};
pub use register::{encode, PinAssignment, REGISTER_PINS};
pub use sequencer::{
    run_spi_sequence, FailurePolicy, SequenceOutcome, Sequencer, SequencerConfig, SHIFT_PASSES,
};
pub use settings::Settings;
pub use trace::{DiagnosticSink, FileTrace, MemoryTrace, NullTrace, TRACE_FILE_NAME};
pub use verify::{compare, expected_readback, verify, ReadbackReport};
