//! Address/mask rendering in a fixed set of notations

use crate::CidrError;
use nettools_core::Address;
use std::fmt;
use std::str::FromStr;

/// Output notation for an address/mask pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Radix {
    /// Each byte as 8 binary digits, space separated
    Binary,
    /// Each byte as 3 octal digits, space separated
    Octal,
    /// Each byte in decimal, dot separated
    Decimal,
    /// Each byte as 2 lowercase hex digits, space separated
    Hex,
    /// Decimal, with the wildcard mask in place of the mask
    Cisco,
}

impl Radix {
    pub const ALL: [Radix; 5] = [
        Radix::Binary,
        Radix::Octal,
        Radix::Decimal,
        Radix::Hex,
        Radix::Cisco,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Radix::Binary => "binary",
            Radix::Octal => "octal",
            Radix::Decimal => "decimal",
            Radix::Hex => "hex",
            Radix::Cisco => "cisco",
        }
    }

    /// Whether the mask is shown inverted
    pub fn uses_wildcard(self) -> bool {
        matches!(self, Radix::Cisco)
    }

    /// Render a single address
    ///
    /// # Examples
    ///
    /// ```
    /// use nettools_cidr::Radix;
    /// use nettools_core::Address;
    ///
    /// let addr = Address::parse("10.0.0.255").unwrap();
    /// assert_eq!(Radix::Octal.render(&addr), "012 000 000 377");
    /// ```
    pub fn render(self, address: &Address) -> String {
        match self {
            Radix::Binary => join_bytes(address, " ", |b| format!("{:08b}", b)),
            Radix::Octal => join_bytes(address, " ", |b| format!("{:03o}", b)),
            Radix::Hex => join_bytes(address, " ", |b| format!("{:02x}", b)),
            Radix::Decimal | Radix::Cisco => join_bytes(address, ".", |b| b.to_string()),
        }
    }
}

fn join_bytes<F>(address: &Address, separator: &str, render: F) -> String
where
    F: Fn(u8) -> String,
{
    address
        .octets()
        .into_iter()
        .map(render)
        .collect::<Vec<_>>()
        .join(separator)
}

impl fmt::Display for Radix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Radix {
    type Err = CidrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "binary" | "bin" | "b" => Ok(Radix::Binary),
            "octal" | "oct" | "o" => Ok(Radix::Octal),
            "decimal" | "dec" | "d" => Ok(Radix::Decimal),
            "hex" | "x" => Ok(Radix::Hex),
            "cisco" | "i" => Ok(Radix::Cisco),
            _ => Err(CidrError::UnknownFormat(s.to_string())),
        }
    }
}
