//! Pin assignment and output register encoding

use core::fmt;

use crate::error::PinError;

/// Number of pins addressed by one output register byte
pub const REGISTER_PINS: u8 = 8;

/// Register bit positions of the four chain signals
///
/// CS, CK and DOUT are driven by the adapter; DIN is sampled. All four must
/// be distinct and below [`REGISTER_PINS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinAssignment {
    cs: u8,
    ck: u8,
    dout: u8,
    din: u8,
}

impl PinAssignment {
    /// Validate and build a pin assignment
    pub fn new(cs: u8, ck: u8, dout: u8, din: u8) -> Result<Self, PinError> {
        let pins = [("CS", cs), ("CK", ck), ("DOUT", dout), ("DIN", din)];

        for &(name, pin) in &pins {
            if pin >= REGISTER_PINS {
                return Err(PinError::OutOfRange { name, pin });
            }
        }

        for (i, &(first, a)) in pins.iter().enumerate() {
            for &(second, b) in &pins[i + 1..] {
                if a == b {
                    return Err(PinError::Collision {
                        first,
                        second,
                        pin: a,
                    });
                }
            }
        }

        Ok(Self { cs, ck, dout, din })
    }

    /// Chip select / latch enable pin
    pub fn cs(&self) -> u8 {
        self.cs
    }

    /// Clock pin
    pub fn ck(&self) -> u8 {
        self.ck
    }

    /// Data output pin (adapter to chain)
    pub fn dout(&self) -> u8 {
        self.dout
    }

    /// Data input pin (chain to adapter)
    pub fn din(&self) -> u8 {
        self.din
    }

    /// Bit-bang direction mask: every pin is an output except DIN
    pub fn output_mask(&self) -> u8 {
        !(1u8 << self.din)
    }

    /// Encode a pin state with this assignment
    pub fn register(&self, cs: bool, ck: bool, dout: bool) -> u8 {
        encode(cs, ck, dout, self)
    }

    /// Level of DIN in a sampled pin byte
    pub fn din_level(&self, levels: u8) -> bool {
        levels & (1 << self.din) != 0
    }
}

impl Default for PinAssignment {
    fn default() -> Self {
        Self {
            cs: 2,
            ck: 3,
            dout: 1,
            din: 0,
        }
    }
}

impl fmt::Display for PinAssignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CS={} CK={} DOUT={} DIN={}",
            self.cs, self.ck, self.dout, self.din
        )
    }
}

/// Encode the requested CS/CK/DOUT levels into one output register byte
///
/// Only the three driven pins can be set; every other bit is zero.
pub fn encode(cs: bool, ck: bool, dout: bool, pins: &PinAssignment) -> u8 {
    (u8::from(cs) << pins.cs) | (u8::from(ck) << pins.ck) | (u8::from(dout) << pins.dout)
}
