//! CIDR formatting, range and range-splitting operations
//!
//! Provides the arithmetic behind the `netmask` command:
//! - Parse CIDR notation (e.g., "192.168.0.0/24") or bare addresses
//! - Render an address/mask pair in binary, octal, decimal, hex or Cisco notation
//! - Compute the first/last address and address count of a block
//! - Split an arbitrary address range into the minimal list of CIDR blocks
//!
//! IPv4 and IPv6 are handled alike; an operation never mixes the two.
//!
//! # Examples
//!
//! ```
//! use nettools_cidr::{Cidr, Radix};
//!
//! let cidr = Cidr::parse("3.4.5.6/7").unwrap();
//! assert_eq!(cidr.to_string(), "2.0.0.0/7");
//! assert_eq!(cidr.notation(Radix::Cisco), "2.0.0.0 / 1.255.255.255");
//! assert_eq!(cidr.range().to_string(), "2.0.0.0 -> 3.255.255.255 (33554432)");
//! ```

use nettools_core::{Address, Family, NetError};
use num_bigint::BigUint;
use serde::de;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

mod radix;
mod split;

pub use radix::Radix;
pub use split::{split_range, AddressRange};

/// CIDR errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CidrError {
    /// Invalid CIDR or range notation
    #[error("Invalid CIDR notation: {0}")]
    InvalidNotation(String),

    /// Invalid IP address
    #[error(transparent)]
    InvalidIpAddress(#[from] NetError),

    /// Invalid prefix length
    #[error("Invalid prefix length: {prefix} (must be 0-{max})")]
    InvalidPrefixLength { prefix: u32, max: u8 },

    /// IPv4 and IPv6 in one operation
    #[error("Cannot mix IPv4 and IPv6: {0} and {1}")]
    MixedFamily(String, String),

    /// Format name outside of [`Radix`]
    #[error("Unknown format: {0} (expected binary, octal, decimal, hex or cisco)")]
    UnknownFormat(String),

    /// Range splitting stopped without reaching the end of the range
    #[error("Range splitting did not converge: {0}")]
    Unconverged(String),
}

impl CidrError {
    /// Whether the error signals a defect rather than bad input
    pub fn is_internal(&self) -> bool {
        matches!(self, CidrError::Unconverged(_))
    }
}

pub type Result<T> = std::result::Result<T, CidrError>;

/// CIDR block representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cidr {
    /// Network address (host bits cleared)
    network: Address,
    /// Prefix length (0 to the family bit width)
    prefix_len: u8,
}

impl Cidr {
    /// Parse CIDR notation or a bare address
    ///
    /// A bare address becomes a single-address block. Host bits of the
    /// address are cleared.
    ///
    /// # Examples
    ///
    /// ```
    /// use nettools_cidr::Cidr;
    ///
    /// let cidr = Cidr::parse("10.1.2.3/8").unwrap();
    /// assert_eq!(cidr.to_string(), "10.0.0.0/8");
    ///
    /// let host = Cidr::parse("fe80::1").unwrap();
    /// assert_eq!(host.prefix_len(), 128);
    /// ```
    pub fn parse(cidr: &str) -> Result<Self> {
        let cidr = cidr.trim();
        let (ip_str, prefix_str) = match cidr.split_once('/') {
            Some((ip, prefix)) => (ip, Some(prefix)),
            None => (cidr, None),
        };

        let address = Address::parse(ip_str)?;

        let prefix_len = match prefix_str {
            Some(prefix) => {
                let digits = prefix.trim();
                if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(CidrError::InvalidNotation(format!("Invalid prefix: {}", prefix)));
                }
                let prefix: u32 = digits.parse().map_err(|_| {
                    CidrError::InvalidNotation(format!("Invalid prefix: {}", prefix))
                })?;
                let max = address.family().bits();
                if prefix > max as u32 {
                    return Err(CidrError::InvalidPrefixLength { prefix, max });
                }
                prefix as u8
            }
            None => address.family().bits(),
        };

        Self::new(address, prefix_len)
    }

    /// Create new CIDR from an address and prefix length
    ///
    /// # Arguments
    ///
    /// * `address` - Any address inside the block
    /// * `prefix_len` - Prefix length (0 to the family bit width)
    pub fn new(address: Address, prefix_len: u8) -> Result<Self> {
        let family = address.family();
        if prefix_len > family.bits() {
            return Err(CidrError::InvalidPrefixLength {
                prefix: prefix_len as u32,
                max: family.bits(),
            });
        }

        Ok(Self {
            network: Address::truncated(family, address.value() & family.network_mask(prefix_len)),
            prefix_len,
        })
    }

    /// Get network address
    pub fn network(&self) -> Address {
        self.network
    }

    /// Get prefix length
    pub fn prefix_len(&self) -> u8 {
        self.prefix_len
    }

    pub fn family(&self) -> Family {
        self.network.family()
    }

    /// Get network mask
    pub fn mask(&self) -> Address {
        let family = self.family();
        Address::truncated(family, family.network_mask(self.prefix_len))
    }

    /// Get wildcard mask (Cisco style): host bits set, network bits clear
    pub fn wildcard(&self) -> Address {
        let family = self.family();
        Address::truncated(family, family.host_mask(self.prefix_len))
    }

    /// Get broadcast address (last address of the block)
    pub fn broadcast(&self) -> Address {
        let family = self.family();
        Address::truncated(
            family,
            self.network.value() | family.host_mask(self.prefix_len),
        )
    }

    /// Get total number of addresses in this CIDR block
    ///
    /// Arbitrary precision: `::/0` holds 2^128 addresses.
    pub fn size(&self) -> BigUint {
        BigUint::from(1u32) << (self.family().bits() - self.prefix_len) as usize
    }

    /// First address, last address and address count
    pub fn range(&self) -> CidrRange {
        CidrRange {
            first: self.network,
            last: self.broadcast(),
            count: self.size(),
        }
    }

    /// Render as `"<address> / <mask>"` in the given radix
    ///
    /// [`Radix::Cisco`] renders the wildcard mask in place of the mask.
    pub fn notation(&self, radix: Radix) -> String {
        let mask = if radix.uses_wildcard() {
            self.wildcard()
        } else {
            self.mask()
        };
        format!("{} / {}", radix.render(&self.network), radix.render(&mask))
    }
}

impl fmt::Display for Cidr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.network, self.prefix_len)
    }
}

impl FromStr for Cidr {
    type Err = CidrError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for Cidr {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Cidr {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Cidr, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Cidr::parse(&s).map_err(de::Error::custom)
    }
}

/// Inclusive address span of a CIDR block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CidrRange {
    pub first: Address,
    pub last: Address,
    pub count: BigUint,
}

impl fmt::Display for CidrRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {} ({})", self.first, self.last, self.count)
    }
}

/// First address, last address and count of a CIDR string
pub fn range_of(cidr: &str) -> Result<CidrRange> {
    Ok(Cidr::parse(cidr)?.range())
}

/// A command-line target: one block, or a range to be split into blocks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Block(Cidr),
    Range(AddressRange),
}

impl Target {
    /// `"first-last"` is a range, anything else a CIDR or bare address
    pub fn parse(target: &str) -> Result<Self> {
        let target = target.trim();
        let parsed = if target.contains('-') {
            Target::Range(AddressRange::parse(target)?)
        } else {
            Target::Block(Cidr::parse(target)?)
        };
        debug!(input = target, parsed = ?parsed, "parsed target");
        Ok(parsed)
    }

    /// CIDR blocks covering the target, in ascending order
    pub fn blocks(&self) -> Result<Vec<Cidr>> {
        match self {
            Target::Block(cidr) => Ok(vec![*cidr]),
            Target::Range(range) => range.blocks(),
        }
    }
}

impl FromStr for Target {
    type Err = CidrError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Render every block of a target as `"<address> / <mask>"`
///
/// # Examples
///
/// ```
/// use nettools_cidr::{format_input, Radix};
///
/// let lines = format_input("3.4.5.0-3.4.5.1", Radix::Cisco).unwrap();
/// assert_eq!(lines, vec!["3.4.5.0 / 0.0.0.1"]);
/// ```
pub fn format_input(target: &str, radix: Radix) -> Result<Vec<String>> {
    let blocks = Target::parse(target)?.blocks()?;
    Ok(blocks.iter().map(|cidr| cidr.notation(radix)).collect())
}
