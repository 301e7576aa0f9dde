//! Bit slice specifications
//!
//! A bit slice polls a longer value once and publishes a window of it as its
//! own datapoint. The spec string reads `b:<start>:<end>[:<mask>[:<subtype>]]`
//! where `start` and `end` are inclusive byte positions, `mask` is an optional
//! decimal or `0x` hex bit mask (may be left empty) and `subtype` is `raw`.

use std::fmt;

/// How the selected window is interpreted
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SliceValue {
    /// Passed through as hex bytes
    Raw,
    /// Read as an integer and multiplied by `scale`
    Scaled { scale: f64, signed: bool },
}

/// A parsed `b:` specification
#[derive(Debug, Clone, PartialEq)]
pub struct BitSlice {
    pub start: usize,
    pub end: usize,
    pub mask: Option<u64>,
    pub value: SliceValue,
}

impl BitSlice {
    /// Parse a `b:` spec string
    ///
    /// Without a subtype the slice reads as an unsigned integer with scale 1;
    /// callers override the scale from the trailing descriptor fields.
    pub fn parse(spec: &str) -> Result<Self, String> {
        let body = spec
            .strip_prefix("b:")
            .ok_or_else(|| format!("bit slice '{}' must start with 'b:'", spec))?;

        let parts: Vec<&str> = body.split(':').map(str::trim).collect();
        if parts.len() < 2 || parts.len() > 4 {
            return Err(format!(
                "bit slice '{}' needs 2 to 4 fields after 'b:', got {}",
                spec,
                parts.len()
            ));
        }

        let start = parse_position(parts[0], "start", spec)?;
        let end = parse_position(parts[1], "end", spec)?;
        if start > end {
            return Err(format!("bit slice '{}' ends before it starts", spec));
        }

        let (mask, subtype) = match &parts[2..] {
            [] => (None, None),
            [""] => (None, None),
            [third] => match parse_mask(third) {
                Some(mask) => (Some(mask), None),
                None => (None, Some(*third)),
            },
            [mask, subtype] => {
                let mask = if mask.is_empty() {
                    None
                } else {
                    Some(
                        parse_mask(mask)
                            .ok_or_else(|| format!("bad mask '{}' in bit slice '{}'", mask, spec))?,
                    )
                };
                let subtype = if subtype.is_empty() { None } else { Some(*subtype) };
                (mask, subtype)
            }
            _ => unreachable!("field count checked above"),
        };

        let value = match subtype {
            None => SliceValue::Scaled {
                scale: 1.0,
                signed: false,
            },
            Some("raw") => SliceValue::Raw,
            Some(other) => {
                return Err(format!(
                    "unknown subtype '{}' in bit slice '{}'",
                    other, spec
                ));
            }
        };

        Ok(Self {
            start,
            end,
            mask,
            value,
        })
    }

    /// Number of bytes the slice selects, `None` when the positions are inverted or overflow
    pub fn byte_count(&self) -> Option<usize> {
        self.end.checked_sub(self.start)?.checked_add(1)
    }

    /// Check that the slice fits inside a value of `length` bytes
    pub fn check_bounds(&self, length: usize) -> Result<(), String> {
        if self.end >= length {
            return Err(format!(
                "bit slice ends at byte {} but the value is only {} bytes long",
                self.end, length
            ));
        }
        Ok(())
    }

    /// Render the spec string without scale or signedness
    pub fn spec(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for BitSlice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "b:{}:{}", self.start, self.end)?;
        let raw = self.value == SliceValue::Raw;
        if self.mask.is_some() || raw {
            f.write_str(":")?;
            if let Some(mask) = self.mask {
                write!(f, "{:#x}", mask)?;
            }
        }
        if raw {
            f.write_str(":raw")?;
        }
        Ok(())
    }
}

fn parse_position(text: &str, which: &str, spec: &str) -> Result<usize, String> {
    text.parse()
        .map_err(|_| format!("bad {} position '{}' in bit slice '{}'", which, text, spec))
}

fn parse_mask(text: &str) -> Option<u64> {
    match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16).ok(),
        None => text.parse().ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_full_raw_slice() {
        let slice = BitSlice::parse("b:0:21::raw").unwrap();
        assert_eq!(slice.start, 0);
        assert_eq!(slice.end, 21);
        assert_eq!(slice.mask, None);
        assert_eq!(slice.value, SliceValue::Raw);
        assert_eq!(slice.byte_count(), Some(22));
    }

    #[test]
    fn test_parse_plain_slice() {
        let slice = BitSlice::parse("b:12:13").unwrap();
        assert_eq!(slice.byte_count(), Some(2));
        assert_eq!(
            slice.value,
            SliceValue::Scaled {
                scale: 1.0,
                signed: false
            }
        );
    }

    #[test]
    fn test_byte_count_extremes() {
        let slice = BitSlice::parse(&format!("b:0:{}", usize::MAX)).unwrap();
        assert_eq!(slice.byte_count(), None);
        assert!(slice.check_bounds(22).is_err());

        let inverted = BitSlice {
            start: 4,
            end: 2,
            ..slice
        };
        assert_eq!(inverted.byte_count(), None);
    }

    #[test]
    fn test_parse_mask() {
        let slice = BitSlice::parse("b:16:16:0x0F").unwrap();
        assert_eq!(slice.mask, Some(0x0f));

        let slice = BitSlice::parse("b:16:16:3:raw").unwrap();
        assert_eq!(slice.mask, Some(3));
        assert_eq!(slice.value, SliceValue::Raw);
    }

    #[test]
    fn test_subtype_without_mask_field() {
        let slice = BitSlice::parse("b:2:3:raw").unwrap();
        assert_eq!(slice.mask, None);
        assert_eq!(slice.value, SliceValue::Raw);
    }

    #[test]
    fn test_parse_errors() {
        assert!(BitSlice::parse("c:0:1").is_err());
        assert!(BitSlice::parse("b:0").is_err());
        assert!(BitSlice::parse("b:5:2").is_err());
        assert!(BitSlice::parse("b:x:2").is_err());
        assert!(BitSlice::parse("b:0:1:zz:raw").is_err());
        assert!(BitSlice::parse("b:0:1::bcd").is_err());
        assert!(BitSlice::parse("b:0:1:0:raw:extra").is_err());
    }

    #[test]
    fn test_check_bounds() {
        let slice = BitSlice::parse("b:12:13").unwrap();
        assert!(slice.check_bounds(22).is_ok());
        assert!(slice.check_bounds(13).is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(BitSlice::parse("b:0:21::raw").unwrap().spec(), "b:0:21::raw");
        assert_eq!(BitSlice::parse("b:12:13").unwrap().spec(), "b:12:13");
        assert_eq!(BitSlice::parse("b:1:1:15").unwrap().spec(), "b:1:1:0xf");
    }
}
