//! SCTID validation primitives.
//!
//! This crate is the single source of truth for SNOMED CT identifier (SCTID)
//! integrity checks, used by the `rf2-validator` cell parser. An SCTID is a
//! 6 to 18 digit number whose last digit is a Verhoeff-Dihedral check digit
//! and whose two preceding digits are the partition identifier.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Minimum number of digits in an SCTID.
pub const SCTID_MIN_LENGTH: usize = 6;

/// Maximum number of digits in an SCTID.
pub const SCTID_MAX_LENGTH: usize = 18;

/// Errors from SCTID validation.
///
/// Checks run in a fixed order (length, digits, check digit, partition) and
/// the first failing check is reported.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SctidError {
    /// The identifier is shorter than 6 or longer than 18 characters.
    #[error("Invalid SCTID length {length} for '{value}' (expected 6 to 18 digits)")]
    Length {
        /// The rejected value.
        value: String,
        /// Number of characters in the rejected value.
        length: usize,
    },

    /// The identifier contains something other than ASCII digits.
    #[error("SCTID should be a number")]
    NotNumeric,

    /// The final digit does not match the computed Verhoeff-Dihedral check digit.
    #[error("SCTID check digit should be '{expected}'")]
    CheckDigit {
        /// The check digit computed from the payload.
        expected: u8,
        /// The digit actually present.
        found: u8,
    },

    /// The two digits before the check digit are not a known partition.
    #[error("Invalid partition portion of SCTID '{partition}'")]
    Partition {
        /// The two-digit partition as written.
        partition: String,
    },
}

/// Verhoeff `F` permutation table. Row 0 is the identity, row 1 the base
/// permutation, and row `i` is `F[i-1][F[1][j]]`.
const FNF: [[usize; 10]; 8] = build_fnf();

/// Multiplication table of the dihedral group D5.
const DIHEDRAL: [[usize; 10]; 10] = [
    [0, 1, 2, 3, 4, 5, 6, 7, 8, 9],
    [1, 2, 3, 4, 0, 6, 7, 8, 9, 5],
    [2, 3, 4, 0, 1, 7, 8, 9, 5, 6],
    [3, 4, 0, 1, 2, 8, 9, 5, 6, 7],
    [4, 0, 1, 2, 3, 9, 5, 6, 7, 8],
    [5, 9, 8, 7, 6, 0, 4, 3, 2, 1],
    [6, 5, 9, 8, 7, 1, 0, 4, 3, 2],
    [7, 6, 5, 9, 8, 2, 1, 0, 4, 3],
    [8, 7, 6, 5, 9, 3, 2, 1, 0, 4],
    [9, 8, 7, 6, 5, 4, 3, 2, 1, 0],
];

/// Inverses in D5.
const INVERSE_D5: [u8; 10] = [0, 4, 3, 2, 1, 5, 6, 7, 8, 9];

const fn build_fnf() -> [[usize; 10]; 8] {
    let mut table = [[0; 10]; 8];
    table[0] = [0, 1, 2, 3, 4, 5, 6, 7, 8, 9];
    table[1] = [1, 5, 7, 6, 2, 8, 3, 0, 9, 4];
    let mut i = 2;
    while i < 8 {
        let mut j = 0;
        while j < 10 {
            table[i][j] = table[i - 1][table[1][j]];
            j += 1;
        }
        i += 1;
    }
    table
}

/// A validated SNOMED CT identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Sctid(u64);

impl Sctid {
    /// The numeric value of the identifier.
    #[must_use]
    pub fn value(self) -> u64 {
        self.0
    }

    /// The two-digit partition identifier (the digits before the check digit).
    #[must_use]
    pub fn partition(self) -> u8 {
        u8::try_from((self.0 % 1000).div_euclid(10)).unwrap_or(u8::MAX)
    }

    /// The trailing check digit.
    #[must_use]
    pub fn check_digit(self) -> u8 {
        u8::try_from(self.0 % 10).unwrap_or(u8::MAX)
    }

    /// Whether the identifier carries a namespace (long-format partitions `10`-`15`).
    #[must_use]
    pub fn has_namespace(self) -> bool {
        self.partition() >= 10
    }
}

impl fmt::Display for Sctid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Sctid {
    type Err = SctidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        validate_sctid(s)
    }
}

/// Compute the Verhoeff-Dihedral check digit for an identifier payload
/// (the identifier without its final digit).
///
/// Returns `None` if the payload contains anything other than ASCII digits.
#[must_use]
pub fn compute_check_digit(payload: &str) -> Option<u8> {
    let mut check = 0;
    for (position, byte) in payload.bytes().rev().enumerate() {
        if !byte.is_ascii_digit() {
            return None;
        }
        let digit = usize::from(byte - b'0');
        check = DIHEDRAL[check][FNF[(position + 1) % 8][digit]];
    }
    Some(INVERSE_D5[check])
}

/// Whether a two-digit partition string is one of `00`-`05` or `10`-`15`.
#[inline]
#[must_use]
pub fn is_valid_partition(partition: &str) -> bool {
    matches!(partition.as_bytes(), [b'0' | b'1', b'0'..=b'5'])
}

/// Validate an SCTID string.
///
/// Checks, failing fast on the first problem:
/// 1. length is between [`SCTID_MIN_LENGTH`] and [`SCTID_MAX_LENGTH`]
/// 2. every character is an ASCII digit
/// 3. the last digit equals the Verhoeff-Dihedral check digit of the rest
/// 4. the partition is `00`-`05` or `10`-`15`
///
/// # Errors
/// Returns [`SctidError`] describing the first failing check.
pub fn validate_sctid(raw: &str) -> Result<Sctid, SctidError> {
    let length = raw.chars().count();
    if !(SCTID_MIN_LENGTH..=SCTID_MAX_LENGTH).contains(&length) {
        return Err(SctidError::Length {
            value: raw.to_owned(),
            length,
        });
    }

    if !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(SctidError::NotNumeric);
    }

    // All ASCII digits from here on, so byte slicing is safe.
    let (payload, last) = raw.split_at(raw.len() - 1);
    let expected = compute_check_digit(payload).ok_or(SctidError::NotNumeric)?;
    let found = last.as_bytes()[0] - b'0';
    if expected != found {
        return Err(SctidError::CheckDigit { expected, found });
    }

    let partition = &raw[raw.len() - 3..raw.len() - 1];
    if !is_valid_partition(partition) {
        return Err(SctidError::Partition {
            partition: partition.to_owned(),
        });
    }

    raw.parse::<u64>()
        .map(Sctid)
        .map_err(|_| SctidError::NotNumeric)
}
