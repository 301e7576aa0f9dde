//! Number format specifications
//!
//! The gateway configures hex and address rendering with short printf-like
//! specs such as `02x`, `04X` or `d`. They are parsed once at load time so
//! that a typo fails the startup instead of the first published value.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Widest padding a format may request
pub const MAX_WIDTH: usize = 64;

/// Base used when rendering a number
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Radix {
    Decimal,
    LowerHex,
    UpperHex,
}

impl Radix {
    fn spec_char(self) -> char {
        match self {
            Radix::Decimal => 'd',
            Radix::LowerHex => 'x',
            Radix::UpperHex => 'X',
        }
    }
}

/// A parsed `[0][width](d|x|X)` format spec
///
/// A spec without a type character renders decimal, so `4` equals `4d`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NumberFormat {
    zero_pad: bool,
    width: usize,
    radix: Radix,
}

impl NumberFormat {
    /// Create a format from its parts
    pub const fn new(zero_pad: bool, width: usize, radix: Radix) -> Self {
        Self {
            zero_pad,
            width,
            radix,
        }
    }

    /// Two-digit lowercase hex, the default for raw data bytes
    pub const fn hex_byte() -> Self {
        Self::new(true, 2, Radix::LowerHex)
    }

    /// Unpadded lowercase hex, the default for addresses in responses
    pub const fn hex() -> Self {
        Self::new(false, 0, Radix::LowerHex)
    }

    pub fn radix(&self) -> Radix {
        self.radix
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn is_hex(&self) -> bool {
        self.radix != Radix::Decimal
    }

    /// Render a single number
    pub fn format_u64(&self, value: u64) -> String {
        let width = self.width;
        match (self.radix, self.zero_pad) {
            (Radix::Decimal, true) => format!("{:0width$}", value),
            (Radix::Decimal, false) => format!("{:>width$}", value),
            (Radix::LowerHex, true) => format!("{:0width$x}", value),
            (Radix::LowerHex, false) => format!("{:>width$x}", value),
            (Radix::UpperHex, true) => format!("{:0width$X}", value),
            (Radix::UpperHex, false) => format!("{:>width$X}", value),
        }
    }

    /// Render a byte string, each byte formatted on its own and concatenated
    pub fn format_bytes(&self, bytes: &[u8]) -> String {
        bytes
            .iter()
            .map(|b| self.format_u64(u64::from(*b)))
            .collect()
    }
}

impl FromStr for NumberFormat {
    type Err = Error;

    fn from_str(spec: &str) -> Result<Self> {
        let spec = spec.trim();
        let invalid = |reason: &str| {
            Error::config(
                "format spec",
                format!("Invalid format spec '{}': {}", spec, reason),
            )
        };

        let (body, radix) = match spec.chars().last() {
            None => return Err(invalid("empty")),
            Some('d') => (&spec[..spec.len() - 1], Radix::Decimal),
            Some('x') => (&spec[..spec.len() - 1], Radix::LowerHex),
            Some('X') => (&spec[..spec.len() - 1], Radix::UpperHex),
            Some(c) if c.is_ascii_digit() => (spec, Radix::Decimal),
            Some(c) => return Err(invalid(&format!("unsupported type '{}'", c))),
        };

        if !body.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid("width must be digits"));
        }

        let zero_pad = body.starts_with('0');
        let width = if body.is_empty() {
            0
        } else {
            body.parse()
                .map_err(|e| invalid(&format!("bad width: {}", e)))?
        };
        if width > MAX_WIDTH {
            return Err(invalid(&format!("width {} exceeds {}", width, MAX_WIDTH)));
        }

        Ok(Self::new(zero_pad, width, radix))
    }
}

impl fmt::Display for NumberFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.zero_pad {
            f.write_str("0")?;
        }
        if self.width > 0 {
            write!(f, "{}", self.width)?;
        }
        write!(f, "{}", self.radix.spec_char())
    }
}

impl TryFrom<String> for NumberFormat {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<NumberFormat> for String {
    fn from(value: NumberFormat) -> Self {
        value.to_string()
    }
}
