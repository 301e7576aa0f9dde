//! Datapoint descriptors
//!
//! Polling entries are written as positional tuples, e.g.
//! `["AussenTemp", 2048, 2, 0.1, true]`. They are decoded into [`Datapoint`]
//! once at load time so consumers never see an unchecked tuple.

use super::bitslice::{BitSlice, SliceValue};
use super::parse_address;
use crate::{Error, Result};
use serde::{Deserialize, Serialize, Serializer};

/// Type tag for controller date/time values
pub const TAG_DATETIME: &str = "vdatetime";
/// Type tag for raw byte passthrough
pub const TAG_RAW: &str = "raw";

/// One positional field of a descriptor tuple
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DescriptorField {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl DescriptorField {
    fn as_number(&self) -> Option<f64> {
        match self {
            DescriptorField::Int(v) => Some(*v as f64),
            DescriptorField::Float(v) => Some(*v),
            _ => None,
        }
    }
}

/// Decode rule for a datapoint
#[derive(Debug, Clone, PartialEq)]
pub enum DatapointKind {
    /// Integer value multiplied by `scale`, sign-extended first when `signed`
    Scaled { scale: f64, signed: bool },
    /// Controller date/time structure
    DateTime,
    /// Raw bytes rendered as hex
    Raw,
    /// A window of a longer value
    BitSlice(BitSlice),
}

/// A named, addressed value to poll from the controller
#[derive(Debug, Clone, PartialEq)]
pub struct Datapoint {
    /// Label used as MQTT topic component
    pub name: String,
    /// Optolink address
    pub address: u16,
    /// Byte length on the wire
    pub length: usize,
    pub kind: DatapointKind,
}

impl Datapoint {
    pub fn scaled(name: &str, address: u16, length: usize, scale: f64, signed: bool) -> Self {
        Self::new(name, address, length, DatapointKind::Scaled { scale, signed })
    }

    pub fn datetime(name: &str, address: u16, length: usize) -> Self {
        Self::new(name, address, length, DatapointKind::DateTime)
    }

    pub fn raw(name: &str, address: u16, length: usize) -> Self {
        Self::new(name, address, length, DatapointKind::Raw)
    }

    pub fn bit_slice(name: &str, address: u16, length: usize, slice: BitSlice) -> Self {
        Self::new(name, address, length, DatapointKind::BitSlice(slice))
    }

    fn new(name: &str, address: u16, length: usize, kind: DatapointKind) -> Self {
        Self {
            name: name.to_string(),
            address,
            length,
            kind,
        }
    }

    /// Decode a positional tuple
    ///
    /// `index` is the position in the polling list and only used for error reporting.
    pub fn from_fields(index: usize, fields: &[DescriptorField]) -> Result<Self> {
        let name = match fields.first() {
            Some(DescriptorField::Text(name)) if !name.trim().is_empty() => name.clone(),
            Some(_) => {
                return Err(Error::invalid_datapoint(
                    index,
                    None,
                    "first field must be a non-empty name",
                ));
            }
            None => return Err(Error::invalid_datapoint(index, None, "empty descriptor")),
        };
        let invalid = |message: String| Error::invalid_datapoint(index, Some(name.as_str()), message);

        if fields.len() < 3 {
            return Err(invalid(format!(
                "expected at least name, address and length, got {} fields",
                fields.len()
            )));
        }
        if fields.len() > 6 {
            return Err(invalid(format!(
                "expected at most 6 fields, got {}",
                fields.len()
            )));
        }

        let address = match &fields[1] {
            DescriptorField::Int(v) => u16::try_from(*v)
                .map_err(|_| invalid(format!("address {} is out of range 0..=0xFFFF", v)))?,
            DescriptorField::Text(text) => parse_address(text)
                .ok_or_else(|| invalid(format!("address '{}' is not a 16-bit number", text)))?,
            other => return Err(invalid(format!("address must be a number, got {:?}", other))),
        };

        let length = match &fields[2] {
            DescriptorField::Int(v) if *v > 0 => *v as usize,
            other => {
                return Err(invalid(format!(
                    "length must be a positive integer, got {:?}",
                    other
                )));
            }
        };

        let kind = match &fields[3..] {
            [] => DatapointKind::Raw,
            [DescriptorField::Text(tag), rest @ ..] => match tag.as_str() {
                TAG_DATETIME | TAG_RAW if !rest.is_empty() => {
                    return Err(invalid(format!("type '{}' takes no further fields", tag)));
                }
                TAG_DATETIME => DatapointKind::DateTime,
                TAG_RAW => DatapointKind::Raw,
                spec if spec.starts_with("b:") => {
                    let mut slice = BitSlice::parse(spec).map_err(&invalid)?;
                    slice.check_bounds(length).map_err(&invalid)?;
                    slice.value = slice_value(slice.value, rest).map_err(&invalid)?;
                    DatapointKind::BitSlice(slice)
                }
                other => return Err(invalid(format!("unknown type tag '{}'", other))),
            },
            [scale, rest @ ..] => {
                let scale = scale
                    .as_number()
                    .ok_or_else(|| invalid(format!("scale must be a number, got {:?}", scale)))?;
                let signed = match rest {
                    [] => false,
                    [DescriptorField::Bool(signed)] => *signed,
                    [other] => {
                        return Err(invalid(format!(
                            "signed flag must be a boolean, got {:?}",
                            other
                        )));
                    }
                    _ => return Err(invalid("numeric datapoint takes at most 5 fields".into())),
                };
                DatapointKind::Scaled { scale, signed }
            }
        };

        Ok(Self {
            name,
            address,
            length,
            kind,
        })
    }

    /// Encode back into the positional tuple form
    pub fn to_fields(&self) -> Vec<DescriptorField> {
        let mut fields = vec![
            DescriptorField::Text(self.name.clone()),
            DescriptorField::Int(i64::from(self.address)),
            DescriptorField::Int(self.length as i64),
        ];

        match &self.kind {
            DatapointKind::Scaled { scale, signed } => {
                fields.push(DescriptorField::Float(*scale));
                fields.push(DescriptorField::Bool(*signed));
            }
            DatapointKind::DateTime => fields.push(DescriptorField::Text(TAG_DATETIME.into())),
            DatapointKind::Raw => fields.push(DescriptorField::Text(TAG_RAW.into())),
            DatapointKind::BitSlice(slice) => {
                fields.push(DescriptorField::Text(slice.spec()));
                if let SliceValue::Scaled { scale, signed } = slice.value
                    && (scale != 1.0 || signed)
                {
                    fields.push(DescriptorField::Float(scale));
                    fields.push(DescriptorField::Bool(signed));
                }
            }
        }

        fields
    }

    /// Short description of the decode rule, for listings
    pub fn kind_label(&self) -> String {
        match &self.kind {
            DatapointKind::Scaled { scale, signed: true } => format!("scale {} signed", scale),
            DatapointKind::Scaled { scale, signed: false } => format!("scale {}", scale),
            DatapointKind::DateTime => TAG_DATETIME.to_string(),
            DatapointKind::Raw => TAG_RAW.to_string(),
            DatapointKind::BitSlice(slice) => match slice.value {
                SliceValue::Raw => slice.spec(),
                SliceValue::Scaled { scale, signed } => {
                    format!("{} scale {}{}", slice.spec(), scale, if signed { " signed" } else { "" })
                }
            },
        }
    }
}

fn slice_value(value: SliceValue, rest: &[DescriptorField]) -> std::result::Result<SliceValue, String> {
    if rest.is_empty() {
        return Ok(value);
    }
    if value == SliceValue::Raw {
        return Err("raw bit slice takes no scale".to_string());
    }

    let scale = rest[0]
        .as_number()
        .ok_or_else(|| format!("scale must be a number, got {:?}", rest[0]))?;
    let signed = match rest.get(1) {
        None => false,
        Some(DescriptorField::Bool(signed)) => *signed,
        Some(other) => return Err(format!("signed flag must be a boolean, got {:?}", other)),
    };

    Ok(SliceValue::Scaled { scale, signed })
}

impl Serialize for Datapoint {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_fields().serialize(serializer)
    }
}

/// Decode a whole polling list, reporting the first invalid entry
pub fn parse_poll_items(rows: Vec<Vec<DescriptorField>>) -> Result<Vec<Datapoint>> {
    rows.iter()
        .enumerate()
        .map(|(index, fields)| Datapoint::from_fields(index, fields))
        .collect()
}

/// Parse a JSON-encoded polling list
///
/// Malformed JSON and a structurally invalid entry are reported separately:
/// the former as the returned `serde_json` error, the latter as
/// `InvalidDatapointDescriptor`.
pub fn parse_poll_items_json(text: &str) -> std::result::Result<Result<Vec<Datapoint>>, serde_json::Error> {
    let rows: Vec<Vec<DescriptorField>> = serde_json::from_str(text)?;
    Ok(parse_poll_items(rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn fields(value: serde_json::Value) -> Vec<DescriptorField> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_datetime_descriptor() {
        let dp = Datapoint::from_fields(0, &fields(json!(["Anlagenzeit", 2190, 8, "vdatetime"])))
            .unwrap();
        assert_eq!(dp, Datapoint::datetime("Anlagenzeit", 0x088E, 8));
    }

    #[test]
    fn test_scaled_descriptor() {
        let dp =
            Datapoint::from_fields(0, &fields(json!(["AussenTemp", 2048, 2, 0.1, true]))).unwrap();
        assert_eq!(dp, Datapoint::scaled("AussenTemp", 0x0800, 2, 0.1, true));

        let dp = Datapoint::from_fields(0, &fields(json!(["Brennerstarts", 2186, 4, 1]))).unwrap();
        assert_eq!(dp.kind, DatapointKind::Scaled { scale: 1.0, signed: false });
    }

    #[test]
    fn test_hex_string_address() {
        let dp = Datapoint::from_fields(0, &fields(json!(["KesselTemp", "0x0802", 2, 0.1]))).unwrap();
        assert_eq!(dp.address, 0x0802);
    }

    #[test]
    fn test_raw_descriptors() {
        let dp = Datapoint::from_fields(0, &fields(json!(["Frost", 9472, 22]))).unwrap();
        assert_eq!(dp.kind, DatapointKind::Raw);

        let dp = Datapoint::from_fields(0, &fields(json!(["Frost", 9472, 22, "raw"]))).unwrap();
        assert_eq!(dp.kind, DatapointKind::Raw);
    }

    #[test]
    fn test_bit_slice_descriptor_with_scale() {
        let dp = Datapoint::from_fields(0, &fields(json!(["RTS_akt", 9472, 22, "b:12:13", 0.1, false])))
            .unwrap();
        match dp.kind {
            DatapointKind::BitSlice(slice) => {
                assert_eq!(slice.start, 12);
                assert_eq!(slice.end, 13);
                assert_eq!(
                    slice.value,
                    SliceValue::Scaled {
                        scale: 0.1,
                        signed: false
                    }
                );
            }
            other => panic!("Expected bit slice, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_descriptors() {
        let cases = [
            json!([]),
            json!([42, 2048, 2]),
            json!(["x", 2048]),
            json!(["x", 70000, 2]),
            json!(["x", "0xZZ", 2]),
            json!(["x", 2048, 0]),
            json!(["x", 2048, 2, "vtime"]),
            json!(["x", 2048, 2, "vdatetime", 1]),
            json!(["x", 2048, 2, 0.1, "yes"]),
            json!(["x", 2048, 2, 0.1, true, 1]),
            json!(["x", 2048, 2, "b:0:5"]),
            json!(["x", 2048, 22, "b:0:1::raw", 0.1]),
            json!(["x", 2048, 22, "b:0:1", 0.1, false, 7]),
        ];

        for (i, case) in cases.into_iter().enumerate() {
            let result = Datapoint::from_fields(i, &fields(case.clone()));
            assert!(
                matches!(result, Err(Error::InvalidDatapointDescriptor { index, .. }) if index == i),
                "case {:?} should be rejected",
                case
            );
        }
    }

    #[test]
    fn test_to_fields_reparses() {
        let items = vec![
            Datapoint::datetime("Anlagenzeit", 0x088E, 8),
            Datapoint::scaled("AussenTemp", 0x0800, 2, 0.1, true),
            Datapoint::raw("Frost", 0x2500, 22),
            Datapoint::bit_slice("RTS_akt", 0x2500, 22, {
                let mut slice = BitSlice::parse("b:12:13").unwrap();
                slice.value = SliceValue::Scaled {
                    scale: 0.1,
                    signed: false,
                };
                slice
            }),
        ];

        let json = serde_json::to_string(&items).unwrap();
        let parsed = parse_poll_items_json(&json).unwrap().unwrap();
        assert_eq!(parsed, items);
    }

    #[test]
    fn test_parse_poll_items_json_errors() {
        assert!(parse_poll_items_json("not json").is_err());
        assert!(parse_poll_items_json("{\"a\": 1}").is_err());

        let result = parse_poll_items_json(r#"[["ok", 1, 1], ["bad", 1]]"#).unwrap();
        assert!(matches!(
            result,
            Err(Error::InvalidDatapointDescriptor { index: 1, .. })
        ));
    }

    #[test]
    fn test_kind_label() {
        assert_eq!(Datapoint::scaled("a", 1, 2, 0.1, true).kind_label(), "scale 0.1 signed");
        assert_eq!(Datapoint::datetime("a", 1, 8).kind_label(), "vdatetime");
    }
}
