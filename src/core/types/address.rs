//! Foreign address wrapper with hex parsing

use super::error::ParseAddressError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Add;
use std::str::FromStr;

/// A location in the foreign process's address space.
///
/// Nothing about an `Address` is validated until it is read through a
/// [`ReadMemory`](crate::memory::ReadMemory) source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Address(pub usize);

impl Address {
    /// Creates a new address from a usize value
    pub const fn new(value: usize) -> Self {
        Address(value)
    }

    /// Creates a null address (0x0)
    pub const fn null() -> Self {
        Address(0)
    }

    /// Checks if the address is null
    pub const fn is_null(&self) -> bool {
        self.0 == 0
    }

    /// Applies a signed displacement, wrapping at the address-space boundary
    pub const fn offset(&self, offset: isize) -> Self {
        Address(self.0.wrapping_add_signed(offset))
    }

    /// Returns the raw usize value
    pub const fn as_usize(&self) -> usize {
        self.0
    }
}

impl Add<usize> for Address {
    type Output = Address;

    fn add(self, offset: usize) -> Address {
        Address(self.0.wrapping_add(offset))
    }
}

impl FromStr for Address {
    type Err = ParseAddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        let value = if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            usize::from_str_radix(hex, 16)
        } else if let Some(hex) = s.strip_prefix('$') {
            usize::from_str_radix(hex, 16)
        } else if s.chars().any(|c| c.is_ascii_alphabetic()) {
            usize::from_str_radix(s, 16)
        } else {
            s.parse::<usize>().or_else(|_| usize::from_str_radix(s, 16))
        };

        value
            .map(Address::new)
            .map_err(|_| ParseAddressError(s.to_string()))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08X}", self.0)
    }
}

impl fmt::LowerHex for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08x}", self.0)
    }
}

impl From<usize> for Address {
    fn from(value: usize) -> Self {
        Address::new(value)
    }
}

impl From<u32> for Address {
    fn from(value: u32) -> Self {
        Address::new(value as usize)
    }
}

impl From<u64> for Address {
    fn from(value: u64) -> Self {
        Address::new(value as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_parsing() {
        assert_eq!(Address::from_str("0x01EA60D4").unwrap(), Address::new(0x01EA60D4));
        assert_eq!(Address::from_str("0X1000").unwrap(), Address::new(0x1000));
        assert_eq!(Address::from_str("$1000").unwrap(), Address::new(0x1000));
        assert_eq!(
            Address::from_str("DEADBEEF").unwrap(),
            Address::new(0xDEADBEEF)
        );
        assert_eq!(Address::from_str("4096").unwrap(), Address::new(4096));
        assert!(Address::from_str("0xZZ").is_err());
        assert!(Address::from_str("").is_err());
    }

    #[test]
    fn test_address_arithmetic() {
        let addr = Address::new(0x1000);
        assert_eq!(addr + 0x10, Address::new(0x1010));
        assert_eq!(addr.offset(-0x10), Address::new(0x0FF0));
        assert_eq!(Address::new(usize::MAX) + 1, Address::null());
    }

    #[test]
    fn test_address_display() {
        let addr = Address::new(0x01EA7378);
        assert_eq!(format!("{}", addr), "0x01EA7378");
        assert_eq!(format!("{:x}", addr), "0x01ea7378");
    }

    #[test]
    fn test_conversions() {
        assert_eq!(Address::from(0x10u32), Address::new(0x10));
        assert_eq!(Address::from(0x20u64), Address::new(0x20));
        assert!(Address::from(0usize).is_null());
    }
}
