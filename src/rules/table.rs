//! Base-20 rule tables for the summation automaton.
//!
//! A rule is one non-negative integer whose base-20 digits, least
//! significant first, give the next state for neighborhood sums 0, 1, 2, ...
//! Only the lowest [`TABLE_LEN`] digits matter; higher ones are dropped.

use num_bigint::BigUint;

use crate::error::DecodeError;

/// Number of distinct cell states.
pub const STATE_COUNT: u8 = 20;
/// Largest possible 3x3 sum: nine cells at state 19.
pub const MAX_SUM: usize = 9 * (STATE_COUNT as usize - 1);
pub const TABLE_LEN: usize = MAX_SUM + 1;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuleTable([u8; TABLE_LEN]);

impl Default for RuleTable {
    fn default() -> Self {
        Self([0; TABLE_LEN])
    }
}

impl RuleTable {
    /// Decode rule text. All-or-nothing: an error leaves nothing half-built.
    pub fn decode(text: &str) -> Result<Self, DecodeError> {
        let magnitude = parse_magnitude(text)?;
        let mut table = [0u8; TABLE_LEN];
        for (slot, digit) in table
            .iter_mut()
            .zip(magnitude.to_radix_le(STATE_COUNT as u32))
        {
            *slot = digit;
        }
        Ok(Self(table))
    }

    /// Next state for a neighborhood sum; sums past [`MAX_SUM`] clamp to it.
    #[inline]
    pub fn lookup(&self, sum: usize) -> u8 {
        self.0[sum.min(MAX_SUM)]
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    /// Text listing as `sum:state` pairs, `per_line` entries per line.
    pub fn rows(&self, per_line: usize) -> String {
        self.0
            .chunks(per_line.max(1))
            .enumerate()
            .map(|(row, chunk)| {
                chunk
                    .iter()
                    .enumerate()
                    .map(|(i, v)| format!("{:>3}:{:>2}", row * per_line.max(1) + i, v))
                    .collect::<Vec<_>>()
                    .join("  ")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Absolute value of an integer literal.
///
/// Decimal literals may carry a sign; `0x`, `0o` and `0b` literals may not.
fn parse_magnitude(text: &str) -> Result<BigUint, DecodeError> {
    let trimmed = text.trim();
    // Blank input is an error here, not the zero rule.
    if trimmed.is_empty() {
        return Err(DecodeError::Empty);
    }
    let invalid = || DecodeError::InvalidLiteral(trimmed.to_string());

    let (radix, digits) = match trimmed.get(..2) {
        Some("0x" | "0X") => (16, &trimmed[2..]),
        Some("0o" | "0O") => (8, &trimmed[2..]),
        Some("0b" | "0B") => (2, &trimmed[2..]),
        _ => (10, trimmed.strip_prefix(['+', '-']).unwrap_or(trimmed)),
    };
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return Err(invalid());
    }
    BigUint::parse_bytes(digits.as_bytes(), radix).ok_or_else(invalid)
}
