//! Datapoint descriptors and the polling table
//!
//! A datapoint is a named value in the heating controller's memory map. This
//! module only describes what to poll and how the raw bytes are meant to be
//! read; decoding itself happens in the poller.

pub mod bitslice;
pub mod defaults;
pub mod descriptor;

pub use bitslice::{BitSlice, SliceValue};
pub use defaults::default_poll_items;
pub use descriptor::{
    Datapoint, DatapointKind, DescriptorField, parse_poll_items, parse_poll_items_json,
};

use std::collections::BTreeMap;

/// Parse an Optolink address written as `0x088E` or as a decimal number
pub fn parse_address(text: &str) -> Option<u16> {
    let text = text.trim();
    match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => u16::from_str_radix(hex, 16).ok(),
        None => text.parse().ok(),
    }
}

/// Addresses polled by more than one plain datapoint
///
/// Bit slices are expected to share their address with other entries and are
/// not counted.
pub fn duplicate_addresses(items: &[Datapoint]) -> Vec<u16> {
    let mut seen: BTreeMap<u16, usize> = BTreeMap::new();
    for dp in items {
        if !matches!(dp.kind, DatapointKind::BitSlice(_)) {
            *seen.entry(dp.address).or_default() += 1;
        }
    }

    seen.into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(address, _)| address)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_address() {
        assert_eq!(parse_address("0x088E"), Some(0x088E));
        assert_eq!(parse_address("0XFFF4"), Some(0xFFF4));
        assert_eq!(parse_address("2190"), Some(2190));
        assert_eq!(parse_address(" 0x0800 "), Some(0x0800));
        assert_eq!(parse_address("0x10000"), None);
        assert_eq!(parse_address("temp"), None);
    }

    #[test]
    fn test_duplicate_addresses() {
        assert!(duplicate_addresses(&default_poll_items()).is_empty());

        let items = vec![
            Datapoint::scaled("a", 0x0800, 2, 0.1, true),
            Datapoint::raw("b", 0x0800, 2),
            Datapoint::raw("c", 0x0802, 2),
        ];
        assert_eq!(duplicate_addresses(&items), vec![0x0800]);
    }
}
