//! Byte-size literals such as `"1500"`, `"256M"` or `"4G"`.

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Maximum entry size, in bytes, that buffering mode will materialize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SizeLimit(u64);

impl SizeLimit {
    pub const fn from_bytes(bytes: u64) -> Self {
        Self(bytes)
    }

    pub const fn bytes(self) -> u64 {
        self.0
    }

    /// Whether an entry of `size` bytes may be buffered. The cap itself is excluded.
    pub const fn admits(self, size: u64) -> bool {
        size < self.0
    }
}

impl fmt::Display for SizeLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SizeLimit {
    type Err = Error;

    /// Parse `DIGITS [K|M|G]`; the whole input must match.
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let format_error = |reason| Error::Format {
            input: input.to_string(),
            reason,
        };

        let (digits, multiplier) = match input.as_bytes().last() {
            Some(b'K') => (&input[..input.len() - 1], 1u64 << 10),
            Some(b'M') => (&input[..input.len() - 1], 1u64 << 20),
            Some(b'G') => (&input[..input.len() - 1], 1u64 << 30),
            _ => (input, 1),
        };

        if digits.is_empty() {
            return Err(format_error("expected digits"));
        }
        if !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(format_error("expected digits followed by an optional K, M or G"));
        }

        // all-digit input only fails to parse on overflow
        let value: u64 = digits
            .parse()
            .map_err(|_| format_error("value out of range"))?;
        value
            .checked_mul(multiplier)
            .map(SizeLimit)
            .ok_or_else(|| format_error("value out of range"))
    }
}
