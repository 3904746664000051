//! Core address types for nettools
//!
//! This crate provides the value types shared by the nettools crates:
//! - [`Family`] - IPv4 / IPv6 address family and its bit-width helpers
//! - [`Address`] - An IP address held as an unsigned integer of its family
//! - [`NetError`] - Error types
//!
//! Both families are stored in a `u128`, so ordering and increments are
//! exact for IPv6 as well as IPv4.
//!
//! ```
//! use nettools_core::{Address, Family};
//!
//! let addr = Address::parse("3.4.5.6").unwrap();
//! assert_eq!(addr.family(), Family::V4);
//! assert_eq!(addr.octets(), vec![3, 4, 5, 6]);
//! ```

use serde::de;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;
use thiserror::Error;

pub mod config;

/// IP address family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Family {
    V4,
    V6,
}

impl Family {
    /// Address width in bits (32 or 128)
    pub fn bits(self) -> u8 {
        match self {
            Family::V4 => 32,
            Family::V6 => 128,
        }
    }

    /// Address width in bytes (4 or 16)
    pub fn byte_len(self) -> usize {
        self.bits() as usize / 8
    }

    /// Every bit of the family set
    pub fn all_ones(self) -> u128 {
        match self {
            Family::V4 => u32::MAX as u128,
            Family::V6 => u128::MAX,
        }
    }

    /// Mask with `prefix` leading one-bits followed by zero-bits
    ///
    /// Prefixes beyond the family width saturate to all ones.
    pub fn network_mask(self, prefix: u8) -> u128 {
        self.all_ones() & !self.host_mask(prefix)
    }

    /// Complement of [`Family::network_mask`] within the family width
    pub fn host_mask(self, prefix: u8) -> u128 {
        if prefix >= self.bits() {
            0
        } else {
            self.all_ones() >> prefix
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Family::V4 => write!(f, "IPv4"),
            Family::V6 => write!(f, "IPv6"),
        }
    }
}

/// An IPv4 or IPv6 address
///
/// The value is always confined to the width of its family. Ordering is
/// only meaningful between addresses of the same family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address {
    family: Family,
    value: u128,
}

impl Address {
    /// Parse an address from its textual form
    ///
    /// # Examples
    ///
    /// ```
    /// use nettools_core::{Address, Family};
    ///
    /// let addr = Address::parse("fe80::1").unwrap();
    /// assert_eq!(addr.family(), Family::V6);
    /// assert_eq!(addr.value(), 0xfe80_0000_0000_0000_0000_0000_0000_0001);
    /// ```
    pub fn parse(addr: &str) -> Result<Self> {
        let addr = addr.trim();
        addr.parse::<IpAddr>()
            .map(Self::from)
            .map_err(|_| NetError::InvalidIp(addr.to_string()))
    }

    /// Build an address from the low bits of `value` that fit the family
    pub fn truncated(family: Family, value: u128) -> Self {
        Self {
            family,
            value: value & family.all_ones(),
        }
    }

    pub fn family(&self) -> Family {
        self.family
    }

    /// Numeric value, most-significant byte first
    pub fn value(&self) -> u128 {
        self.value
    }

    /// Address bytes, most-significant first (4 or 16 of them)
    pub fn octets(&self) -> Vec<u8> {
        let bytes = self.value.to_be_bytes();
        bytes[bytes.len() - self.family.byte_len()..].to_vec()
    }

    /// The next address, or `None` past the last address of the family
    pub fn checked_next(&self) -> Option<Self> {
        self.value
            .checked_add(1)
            .filter(|value| *value <= self.family.all_ones())
            .map(|value| Self {
                family: self.family,
                value,
            })
    }

    pub fn to_ip(&self) -> IpAddr {
        match self.family {
            Family::V4 => IpAddr::V4(Ipv4Addr::from(self.value as u32)),
            Family::V6 => IpAddr::V6(Ipv6Addr::from(self.value)),
        }
    }
}

impl From<IpAddr> for Address {
    fn from(ip: IpAddr) -> Self {
        match ip {
            IpAddr::V4(v4) => v4.into(),
            IpAddr::V6(v6) => v6.into(),
        }
    }
}

impl From<Ipv4Addr> for Address {
    fn from(ip: Ipv4Addr) -> Self {
        Self {
            family: Family::V4,
            value: u32::from(ip) as u128,
        }
    }
}

impl From<Ipv6Addr> for Address {
    fn from(ip: Ipv6Addr) -> Self {
        Self {
            family: Family::V6,
            value: u128::from(ip),
        }
    }
}

impl FromStr for Address {
    type Err = NetError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_ip())
    }
}

impl Serialize for Address {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Address, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Address::parse(&s).map_err(de::Error::custom)
    }
}

/// Error types for address operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NetError {
    /// Text is not an IPv4 or IPv6 address
    #[error("Invalid IP address: {0}")]
    InvalidIp(String),
}

/// Result type alias for address operations
pub type Result<T> = std::result::Result<T, NetError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_family_widths() {
        assert_eq!(Family::V4.bits(), 32);
        assert_eq!(Family::V6.bits(), 128);
        assert_eq!(Family::V4.byte_len(), 4);
        assert_eq!(Family::V6.byte_len(), 16);
    }

    #[test]
    fn test_family_masks_v4() {
        assert_eq!(Family::V4.network_mask(7), 0xFE00_0000);
        assert_eq!(Family::V4.host_mask(7), 0x01FF_FFFF);
        assert_eq!(Family::V4.network_mask(0), 0);
        assert_eq!(Family::V4.host_mask(0), 0xFFFF_FFFF);
        assert_eq!(Family::V4.network_mask(32), 0xFFFF_FFFF);
        assert_eq!(Family::V4.host_mask(32), 0);
    }

    #[test]
    fn test_family_masks_v6() {
        assert_eq!(Family::V6.network_mask(0), 0);
        assert_eq!(Family::V6.host_mask(0), u128::MAX);
        assert_eq!(Family::V6.network_mask(128), u128::MAX);
        assert_eq!(Family::V6.host_mask(127), 1);
        assert_eq!(Family::V6.network_mask(64), 0xFFFF_FFFF_FFFF_FFFF << 64);
    }

    #[test]
    fn test_masks_partition_family() {
        for family in [Family::V4, Family::V6] {
            for prefix in 0..=family.bits() {
                let net = family.network_mask(prefix);
                let host = family.host_mask(prefix);
                assert_eq!(net & host, 0);
                assert_eq!(net | host, family.all_ones());
            }
        }
    }

    #[test]
    fn test_parse_v4() {
        let addr = Address::parse("3.4.5.6").unwrap();
        assert_eq!(addr.family(), Family::V4);
        assert_eq!(addr.value(), 0x0304_0506);
        assert_eq!(addr.to_string(), "3.4.5.6");
    }

    #[test]
    fn test_parse_trims_whitespace() {
        let addr = Address::parse("  10.0.0.1\n").unwrap();
        assert_eq!(addr.to_string(), "10.0.0.1");
    }

    #[test]
    fn test_parse_v6() {
        let addr = Address::parse("fe80::aede:48ff:fe00:1122").unwrap();
        assert_eq!(addr.family(), Family::V6);
        assert_eq!(addr.octets().len(), 16);
        assert_eq!(addr.to_string(), "fe80::aede:48ff:fe00:1122");
    }

    #[test]
    fn test_parse_invalid() {
        assert_eq!(
            Address::parse("256.0.0.1"),
            Err(NetError::InvalidIp("256.0.0.1".to_string()))
        );
        assert!(Address::parse("").is_err());
        assert!(Address::parse("1.2.3.4/24").is_err());
        assert!(Address::parse("fe80:::1").is_err());
    }

    #[test]
    fn test_truncated() {
        let addr = Address::truncated(Family::V4, 0x1_0304_0506);
        assert_eq!(addr.to_string(), "3.4.5.6");

        let addr = Address::truncated(Family::V6, u128::MAX);
        assert_eq!(addr.value(), u128::MAX);
    }

    #[test]
    fn test_octets_order() {
        let addr = Address::parse("192.168.1.2").unwrap();
        assert_eq!(addr.octets(), vec![192, 168, 1, 2]);

        let addr = Address::parse("2001:db8::ff").unwrap();
        let octets = addr.octets();
        assert_eq!(&octets[..4], &[0x20, 0x01, 0x0d, 0xb8]);
        assert_eq!(octets[15], 0xff);
    }

    #[test]
    fn test_checked_next_carries() {
        let addr = Address::parse("3.4.5.255").unwrap();
        assert_eq!(addr.checked_next().unwrap().to_string(), "3.4.6.0");

        let addr = Address::parse("0.255.255.255").unwrap();
        assert_eq!(addr.checked_next().unwrap().to_string(), "1.0.0.0");

        let addr = Address::parse("fe80::ffff").unwrap();
        assert_eq!(addr.checked_next().unwrap().to_string(), "fe80::1:0");
    }

    #[test]
    fn test_checked_next_at_end_of_family() {
        assert!(Address::parse("255.255.255.255")
            .unwrap()
            .checked_next()
            .is_none());
        assert!(Address::parse("ffff:ffff:ffff:ffff:ffff:ffff:ffff:ffff")
            .unwrap()
            .checked_next()
            .is_none());
    }

    #[test]
    fn test_ordering_within_family() {
        let a = Address::parse("3.4.5.0").unwrap();
        let b = Address::parse("3.4.5.1").unwrap();
        let c = Address::parse("10.0.0.0").unwrap();
        assert!(a < b);
        assert!(b < c);
    }

    #[test]
    fn test_address_serialization() {
        let addr = Address::parse("fe80::1").unwrap();
        let json = serde_json::to_string(&addr).expect("serialization failed");
        assert_eq!(json, "\"fe80::1\"");

        let back: Address = serde_json::from_str(&json).expect("deserialization failed");
        assert_eq!(back, addr);

        assert!(serde_json::from_str::<Address>("\"not-an-ip\"").is_err());
    }

    #[test]
    fn test_error_display() {
        let err = NetError::InvalidIp("1.2.3".to_string());
        assert_eq!(format!("{}", err), "Invalid IP address: 1.2.3");
    }
}
