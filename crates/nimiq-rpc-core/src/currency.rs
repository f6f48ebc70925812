//! Fixed-point conversion between Luna (the integer base unit) and NIM (the
//! decimal display unit).
//!
//! 100 000 Luna make one NIM. Amounts travel over the wire as integer Luna;
//! [`Nim`] is only ever a presentation format.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Number of fractional digits in a NIM amount.
pub const NIM_DECIMALS: usize = 5;

/// Luna per NIM (`10^NIM_DECIMALS`).
pub const LUNA_PER_NIM: i64 = 100_000;

/// Total supply the network was designed for: 21 billion NIM, in Luna.
pub const MAX_SUPPLY: Luna = Luna(2_100_000_000_000_000);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AmountError {
    #[error("amount is empty")]
    Empty,

    #[error("invalid NIM amount `{0}`: expected decimal digits with an optional `.`")]
    InvalidDigits(String),

    #[error("NIM amount `{input}` has {found} fractional digits, at most 5 are allowed")]
    TooManyFractionDigits { input: String, found: usize },

    #[error("NIM amount `{0}` does not fit in a signed 64-bit Luna value")]
    OutOfRange(String),
}

// ==============================================================================
// Luna
// ==============================================================================

/// An amount in Luna, the smallest indivisible unit of NIM.
///
/// `#[serde(transparent)]` keeps the wire form a bare integer, so every
/// balance, value and fee field of the node API decodes straight into it.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Luna(pub i64);

impl Luna {
    pub const ZERO: Luna = Luna(0);

    pub fn to_nim(self) -> Nim {
        format_nim(self)
    }
}

impl From<i64> for Luna {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<Luna> for i64 {
    fn from(value: Luna) -> Self {
        value.0
    }
}

impl fmt::Display for Luna {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ==============================================================================
// NIM
// ==============================================================================

/// A NIM amount in its decimal display form, e.g. `"12.34567"`.
///
/// Values built through [`format_nim`] or [`FromStr`] are canonical: no
/// trailing fractional zeros and no `.` for whole amounts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Nim(String);

impl Nim {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn to_luna(&self) -> Result<Luna, AmountError> {
        parse_luna(&self.0)
    }
}

impl fmt::Display for Nim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Nim {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_luna(s).map(format_nim)
    }
}

impl AsRef<str> for Nim {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Format a Luna amount as NIM.
///
/// `0` → `"0"`, `1` → `"0.00001"`, `100000` → `"1"`, `1250000` → `"12.5"`.
pub fn format_nim(amount: Luna) -> Nim {
    let digits = amount.0.unsigned_abs().to_string();
    let padded = format!("{digits:0>width$}", width = NIM_DECIMALS);
    let (int_part, frac_part) = padded.split_at(padded.len() - NIM_DECIMALS);

    let int_part = if int_part.is_empty() { "0" } else { int_part };
    let frac_part = frac_part.trim_end_matches('0');
    let sign = if amount.0 < 0 { "-" } else { "" };

    if frac_part.is_empty() {
        Nim(format!("{sign}{int_part}"))
    } else {
        Nim(format!("{sign}{int_part}.{frac_part}"))
    }
}

/// Parse a NIM amount into Luna.
///
/// A value without `.` is a whole number of NIM. Fractions shorter than five
/// digits are right-padded (`"12.5"` is 1 250 000 Luna); longer ones are
/// rejected instead of being folded into a wrong magnitude.
pub fn parse_luna(input: &str) -> Result<Luna, AmountError> {
    if input.is_empty() {
        return Err(AmountError::Empty);
    }

    let (negative, unsigned) = match input.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, input),
    };
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (unsigned, None),
    };

    if !is_digits(int_part) || frac_part.is_some_and(|frac| !is_digits(frac)) {
        return Err(AmountError::InvalidDigits(input.to_owned()));
    }

    let frac_part = frac_part.unwrap_or("");
    if frac_part.len() > NIM_DECIMALS {
        return Err(AmountError::TooManyFractionDigits {
            input: input.to_owned(),
            found: frac_part.len(),
        });
    }

    let joined = format!("{int_part}{frac_part:0<width$}", width = NIM_DECIMALS);
    let magnitude: i64 = joined
        .parse()
        .map_err(|_| AmountError::OutOfRange(input.to_owned()))?;

    Ok(Luna(if negative { -magnitude } else { magnitude }))
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}
