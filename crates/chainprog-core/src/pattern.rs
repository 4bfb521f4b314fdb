//! Fixed-length 96-bit chain pattern

use core::fmt;
use core::ops::Index;
use core::str::FromStr;

use crate::error::PatternError;

/// Number of bits held by the two-chip chain
pub const CHAIN_BITS: usize = 96;

const HEX_DIGITS: usize = CHAIN_BITS / 4;

/// One bit per chain register position, in shift order
///
/// Index 0 is shifted first. The same type holds both the pattern written
/// into the chain and the pattern captured from it, so neither can change
/// length.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct BitPattern([bool; CHAIN_BITS]);

impl BitPattern {
    /// Wrap a bit array
    pub const fn new(bits: [bool; CHAIN_BITS]) -> Self {
        Self(bits)
    }

    /// All bits false
    pub const fn zeroed() -> Self {
        Self([false; CHAIN_BITS])
    }

    /// Build a pattern from a per-index function
    pub fn from_fn(f: impl FnMut(usize) -> bool) -> Self {
        Self(core::array::from_fn(f))
    }

    /// Copy a slice of exactly [`CHAIN_BITS`] bits
    pub fn from_slice(bits: &[bool]) -> Result<Self, PatternError> {
        let array = <[bool; CHAIN_BITS]>::try_from(bits).map_err(|_| PatternError::WrongLength {
            expected: CHAIN_BITS,
            found: bits.len(),
            unit: "bits",
        })?;
        Ok(Self(array))
    }

    /// Bit at `index`, or `None` past the end
    pub fn get(&self, index: usize) -> Option<bool> {
        self.0.get(index).copied()
    }

    /// Set the bit at `index`
    ///
    /// # Panics
    ///
    /// Panics if `index >= CHAIN_BITS`.
    pub fn set(&mut self, index: usize, value: bool) {
        self.0[index] = value;
    }

    /// Iterate over the bits in shift order
    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        self.0.iter().copied()
    }

    /// Underlying bit array
    pub fn as_array(&self) -> &[bool; CHAIN_BITS] {
        &self.0
    }

    /// Rotate right by `n`: bit `i` moves to `(i + n) % CHAIN_BITS`
    pub fn rotated_right(&self, n: usize) -> Self {
        let mut bits = self.0;
        bits.rotate_right(n % CHAIN_BITS);
        Self(bits)
    }

    /// Indices at which `self` and `other` differ
    pub fn mismatches(&self, other: &Self) -> Vec<usize> {
        self.iter()
            .zip(other.iter())
            .enumerate()
            .filter_map(|(i, (a, b))| (a != b).then_some(i))
            .collect()
    }

    /// Number of set bits
    pub fn count_ones(&self) -> usize {
        self.iter().filter(|&b| b).count()
    }

    /// Render as 96 `0`/`1` characters
    pub fn to_bit_string(&self) -> String {
        self.iter().map(|b| if b { '1' } else { '0' }).collect()
    }

    /// Parse 96 `0`/`1` characters; `_` and whitespace are ignored
    pub fn parse_bits(s: &str) -> Result<Self, PatternError> {
        let mut bits = [false; CHAIN_BITS];
        let mut count = 0;

        for (position, ch) in s.chars().enumerate() {
            let bit = match ch {
                '0' => false,
                '1' => true,
                '_' => continue,
                c if c.is_whitespace() => continue,
                c => return Err(PatternError::InvalidCharacter { ch: c, position }),
            };
            if count < CHAIN_BITS {
                bits[count] = bit;
            }
            count += 1;
        }

        if count != CHAIN_BITS {
            return Err(PatternError::WrongLength {
                expected: CHAIN_BITS,
                found: count,
                unit: "bits",
            });
        }
        Ok(Self(bits))
    }

    /// Render as 24 uppercase hex digits; index 0 is the MSB of the first digit
    pub fn to_hex(&self) -> String {
        self.0
            .chunks(4)
            .map(|nibble| {
                let value = nibble
                    .iter()
                    .fold(0u32, |acc, &b| (acc << 1) | u32::from(b));
                char::from_digit(value, 16)
                    .unwrap_or('0')
                    .to_ascii_uppercase()
            })
            .collect()
    }

    /// Parse 24 hex digits, with an optional `0x` prefix; `_` is ignored
    pub fn parse_hex(s: &str) -> Result<Self, PatternError> {
        let (offset, digits) = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            Some(rest) => (2, rest),
            None => (0, s),
        };

        let mut bits = [false; CHAIN_BITS];
        let mut count = 0;

        for (position, ch) in digits.chars().enumerate() {
            if ch == '_' {
                continue;
            }
            let value = ch.to_digit(16).ok_or(PatternError::InvalidCharacter {
                ch,
                position: position + offset,
            })?;
            if count < HEX_DIGITS {
                for bit in 0..4 {
                    bits[count * 4 + bit] = value & (0b1000 >> bit) != 0;
                }
            }
            count += 1;
        }

        if count != HEX_DIGITS {
            return Err(PatternError::WrongLength {
                expected: HEX_DIGITS,
                found: count,
                unit: "hex digits",
            });
        }
        Ok(Self(bits))
    }
}

impl Default for BitPattern {
    fn default() -> Self {
        Self::zeroed()
    }
}

impl From<[bool; CHAIN_BITS]> for BitPattern {
    fn from(bits: [bool; CHAIN_BITS]) -> Self {
        Self(bits)
    }
}

impl Index<usize> for BitPattern {
    type Output = bool;

    fn index(&self, index: usize) -> &bool {
        &self.0[index]
    }
}

/// Accepts either text format: `0x`-prefixed hex, or a bit string
impl FromStr for BitPattern {
    type Err = PatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.starts_with("0x") || s.starts_with("0X") {
            Self::parse_hex(s)
        } else {
            Self::parse_bits(s)
        }
    }
}

impl fmt::Display for BitPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_bit_string())
    }
}

impl fmt::Debug for BitPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BitPattern(0x{})", self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sample() -> BitPattern {
        BitPattern::from_fn(|i| i >= 64)
    }

    #[test]
    fn test_from_slice_length() {
        assert!(BitPattern::from_slice(&[false; CHAIN_BITS]).is_ok());
        assert_eq!(
            BitPattern::from_slice(&[true; 95]),
            Err(PatternError::WrongLength {
                expected: 96,
                found: 95,
                unit: "bits"
            })
        );
        assert!(BitPattern::from_slice(&[true; 97]).is_err());
    }

    #[test]
    fn test_rotated_right_by_one() {
        let p = BitPattern::from_fn(|i| i == 0 || i == 95);
        let r = p.rotated_right(1);
        assert!(r[0]); // from 95
        assert!(r[1]); // from 0
        assert_eq!(r.count_ones(), 2);
        assert!(!r[95]);
    }

    #[test]
    fn test_mismatches() {
        let p = sample();
        let mut q = p;
        assert!(p.mismatches(&q).is_empty());
        q.set(47, !q[47]);
        q.set(80, !q[80]);
        assert_eq!(p.mismatches(&q), vec![47, 80]);
    }

    #[test]
    fn test_bit_string_format() {
        let s = sample().to_bit_string();
        assert_eq!(s.len(), 96);
        assert!(s.starts_with(&"0".repeat(64)));
        assert!(s.ends_with(&"1".repeat(32)));

        let spaced = format!("{}_{}", &s[..48], &s[48..]);
        assert_eq!(BitPattern::parse_bits(&spaced).unwrap(), sample());
    }

    #[test]
    fn test_bit_string_errors() {
        assert_eq!(
            BitPattern::parse_bits("0102"),
            Err(PatternError::InvalidCharacter {
                ch: '2',
                position: 3
            })
        );
        assert!(matches!(
            BitPattern::parse_bits(&"1".repeat(100)),
            Err(PatternError::WrongLength { found: 100, .. })
        ));
    }

    #[test]
    fn test_hex_format() {
        assert_eq!(sample().to_hex(), "0000000000000000FFFFFFFF");
        let p = BitPattern::from_fn(|i| i == 0);
        assert_eq!(p.to_hex(), "800000000000000000000000");
        assert_eq!(BitPattern::parse_hex("0x8000_0000_0000_0000_0000_0000").unwrap(), p);
    }

    #[test]
    fn test_hex_errors() {
        assert_eq!(
            BitPattern::parse_hex("0xFG"),
            Err(PatternError::InvalidCharacter {
                ch: 'G',
                position: 3
            })
        );
        assert!(matches!(
            BitPattern::parse_hex("FFFF"),
            Err(PatternError::WrongLength {
                expected: 24,
                found: 4,
                unit: "hex digits"
            })
        ));
    }

    #[test]
    fn test_from_str_picks_format() {
        let hex: BitPattern = "0x0000000000000000FFFFFFFF".parse().unwrap();
        let bits: BitPattern = sample().to_string().parse().unwrap();
        assert_eq!(hex, sample());
        assert_eq!(bits, sample());
    }

    fn any_pattern() -> impl Strategy<Value = BitPattern> {
        prop::collection::vec(any::<bool>(), CHAIN_BITS)
            .prop_map(|v| BitPattern::from_slice(&v).unwrap())
    }

    proptest! {
        /// Both text formats describe the same bits.
        #[test]
        fn text_formats_agree(p in any_pattern()) {
            prop_assert_eq!(BitPattern::parse_hex(&p.to_hex()).unwrap(), p);
            prop_assert_eq!(BitPattern::parse_bits(&p.to_bit_string()).unwrap(), p);
        }

        /// Rotation preserves the bit population and wraps around.
        #[test]
        fn rotation_wraps(p in any_pattern(), n in 0usize..CHAIN_BITS) {
            let r = p.rotated_right(n);
            prop_assert_eq!(r.count_ones(), p.count_ones());
            prop_assert_eq!(r.rotated_right(CHAIN_BITS - n), p);
            prop_assert_eq!(r[n], p[0]);
        }
    }
}
