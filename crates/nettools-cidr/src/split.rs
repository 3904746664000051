//! Address ranges and their decomposition into CIDR blocks

use crate::{Cidr, CidrError, Result};
use nettools_core::{Address, Family};
use std::fmt;
use tracing::{debug, trace};

/// Inclusive range of addresses of one family, `first <= last`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AddressRange {
    first: Address,
    last: Address,
}

impl AddressRange {
    /// Create a range from two ends given in either order
    pub fn new(one: Address, other: Address) -> Result<Self> {
        if one.family() != other.family() {
            return Err(CidrError::MixedFamily(one.to_string(), other.to_string()));
        }

        let (first, last) = if one <= other {
            (one, other)
        } else {
            (other, one)
        };
        Ok(Self { first, last })
    }

    /// Parse `"first-last"`
    ///
    /// # Examples
    ///
    /// ```
    /// use nettools_cidr::AddressRange;
    ///
    /// let range = AddressRange::parse("10.0.0.9-10.0.0.1").unwrap();
    /// assert_eq!(range.to_string(), "10.0.0.1-10.0.0.9");
    /// ```
    pub fn parse(range: &str) -> Result<Self> {
        let range = range.trim();
        let (one, other) = range.split_once('-').ok_or_else(|| {
            CidrError::InvalidNotation(format!("Expected format: first-last, got {}", range))
        })?;
        if other.contains('-') {
            return Err(CidrError::InvalidNotation(format!(
                "Expected a single '-' in range: {}",
                range
            )));
        }

        Self::new(Address::parse(one)?, Address::parse(other)?)
    }

    pub fn first(&self) -> Address {
        self.first
    }

    pub fn last(&self) -> Address {
        self.last
    }

    pub fn family(&self) -> Family {
        self.first.family()
    }

    /// Minimal list of CIDR blocks covering the range
    pub fn blocks(&self) -> Result<Vec<Cidr>> {
        split_range(self.first, self.last)
    }
}

impl fmt::Display for AddressRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.first, self.last)
    }
}

/// Split `[one, other]` into the minimal ordered list of CIDR blocks
///
/// The ends may be given in either order. Each step emits the largest
/// block that starts at the cursor and ends no later than the range end.
///
/// # Examples
///
/// ```
/// use nettools_cidr::split_range;
/// use nettools_core::Address;
///
/// let lo = Address::parse("3.4.5.0").unwrap();
/// let hi = Address::parse("3.4.5.1").unwrap();
/// let blocks = split_range(lo, hi).unwrap();
/// assert_eq!(blocks.len(), 1);
/// assert_eq!(blocks[0].to_string(), "3.4.5.0/31");
/// ```
pub fn split_range(one: Address, other: Address) -> Result<Vec<Cidr>> {
    let range = AddressRange::new(one, other)?;
    let family = range.family();
    let hi = range.last.value();

    // No range needs more than 2 * bits - 2 blocks
    let max_blocks = 2 * family.bits() as usize;

    let mut cursor = range.first;
    let mut blocks = Vec::new();
    while blocks.len() < max_blocks {
        let prefix = widest_prefix_at(family, cursor.value(), hi).ok_or_else(|| {
            CidrError::Unconverged(format!("no block starts at {} within {}", cursor, range))
        })?;

        let block = Cidr::new(cursor, prefix)?;
        let end = block.broadcast();
        trace!(%block, "emitting block");
        blocks.push(block);

        if end.value() == hi {
            debug!(%range, blocks = blocks.len(), "split range");
            return Ok(blocks);
        }

        cursor = end.checked_next().ok_or_else(|| {
            CidrError::Unconverged(format!(
                "ran past the end of the {} space in {}",
                family, range
            ))
        })?;
    }

    Err(CidrError::Unconverged(format!(
        "{} needs more than {} blocks",
        range, max_blocks
    )))
}

/// Smallest prefix whose block starts exactly at `cursor` and ends at or before `hi`
fn widest_prefix_at(family: Family, cursor: u128, hi: u128) -> Option<u8> {
    let mut widest = None;
    for prefix in (0..=family.bits()).rev() {
        let host = family.host_mask(prefix);
        if cursor & host != 0 || cursor | host > hi {
            break;
        }
        widest = Some(prefix);
    }
    widest
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(s: &str) -> Address {
        Address::parse(s).unwrap()
    }

    fn split(one: &str, other: &str) -> Vec<String> {
        split_range(addr(one), addr(other))
            .unwrap()
            .iter()
            .map(|c| c.to_string())
            .collect()
    }

    #[test]
    fn test_range_sorts_ends() {
        let range = AddressRange::new(addr("10.0.0.9"), addr("10.0.0.1")).unwrap();
        assert_eq!(range.first(), addr("10.0.0.1"));
        assert_eq!(range.last(), addr("10.0.0.9"));
    }

    #[test]
    fn test_range_rejects_mixed_family() {
        assert_eq!(
            AddressRange::new(addr("10.0.0.1"), addr("::1")),
            Err(CidrError::MixedFamily("10.0.0.1".to_string(), "::1".to_string()))
        );
    }

    #[test]
    fn test_range_parse_errors() {
        assert!(matches!(
            AddressRange::parse("10.0.0.1"),
            Err(CidrError::InvalidNotation(_))
        ));
        assert!(matches!(
            AddressRange::parse("10.0.0.1-10.0.0.2-10.0.0.3"),
            Err(CidrError::InvalidNotation(_))
        ));
        assert!(matches!(
            AddressRange::parse("10.0.0.1-10.0.0.x"),
            Err(CidrError::InvalidIpAddress(_))
        ));
    }

    #[test]
    fn test_widest_prefix_at() {
        assert_eq!(widest_prefix_at(Family::V4, 0x0304_0500, 0x0304_0501), Some(31));
        assert_eq!(widest_prefix_at(Family::V4, 0x0304_0501, 0x0304_05FF), Some(32));
        assert_eq!(widest_prefix_at(Family::V4, 0, u32::MAX as u128), Some(0));
        assert_eq!(widest_prefix_at(Family::V6, 0, u128::MAX), Some(0));
    }

    #[test]
    fn test_split_single_address() {
        assert_eq!(split("3.4.5.6", "3.4.5.6"), vec!["3.4.5.6/32"]);
        assert_eq!(split("fe80::1", "fe80::1"), vec!["fe80::1/128"]);
    }

    #[test]
    fn test_split_aligned_pair() {
        assert_eq!(split("3.4.5.0", "3.4.5.1"), vec!["3.4.5.0/31"]);
    }

    #[test]
    fn test_split_whole_block() {
        assert_eq!(split("192.0.2.0", "192.0.2.255"), vec!["192.0.2.0/24"]);
        assert_eq!(split("0.0.0.0", "255.255.255.255"), vec!["0.0.0.0/0"]);
        assert_eq!(
            split("2001:db8::", "2001:db8::ffff:ffff:ffff:ffff"),
            vec!["2001:db8::/64"]
        );
    }

    #[test]
    fn test_split_reversed_ends() {
        assert_eq!(split("3.4.5.1", "3.4.5.0"), vec!["3.4.5.0/31"]);
    }

    #[test]
    fn test_split_unaligned_ipv4() {
        assert_eq!(
            split("192.0.2.1", "192.0.2.254"),
            vec![
                "192.0.2.1/32",
                "192.0.2.2/31",
                "192.0.2.4/30",
                "192.0.2.8/29",
                "192.0.2.16/28",
                "192.0.2.32/27",
                "192.0.2.64/26",
                "192.0.2.128/26",
                "192.0.2.192/27",
                "192.0.2.224/28",
                "192.0.2.240/29",
                "192.0.2.248/30",
                "192.0.2.252/31",
                "192.0.2.254/32",
            ]
        );
    }

    #[test]
    fn test_split_ipv6() {
        assert_eq!(
            split("fe80::aede:48ff:fe00:1122", "fe80::aede:48ff:fe00:112a"),
            vec![
                "fe80::aede:48ff:fe00:1122/127",
                "fe80::aede:48ff:fe00:1124/126",
                "fe80::aede:48ff:fe00:1128/127",
                "fe80::aede:48ff:fe00:112a/128",
            ]
        );
    }

    #[test]
    fn test_split_worst_case_fits_cap() {
        let blocks = split_range(addr("0.0.0.1"), addr("255.255.255.254")).unwrap();
        assert_eq!(blocks.len(), 62);

        let blocks = split_range(
            addr("::1"),
            addr("ffff:ffff:ffff:ffff:ffff:ffff:ffff:fffe"),
        )
        .unwrap();
        assert_eq!(blocks.len(), 254);
    }

    #[test]
    fn test_split_up_to_end_of_space() {
        assert_eq!(
            split("255.255.255.254", "255.255.255.255"),
            vec!["255.255.255.254/31"]
        );
        assert_eq!(
            split("128.0.0.0", "255.255.255.255"),
            vec!["128.0.0.0/1"]
        );
    }

    #[test]
    fn test_split_mixed_family() {
        assert!(matches!(
            split_range(addr("10.0.0.1"), addr("fe80::1")),
            Err(CidrError::MixedFamily(_, _))
        ));
    }
}
