use crate::{
    Result,
    constants::{DEFAULT_FIRMWARE_VERSION, MAGIC_WORD},
    error::Error,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use subtle::ConstantTimeEq;

/// Implements serde for a type through its `Display` and `FromStr` impls.
macro_rules! serde_via_string {
    ($ty:ty) => {
        impl serde::Serialize for $ty {
            fn serialize<S: serde::Serializer>(
                &self,
                serializer: S,
            ) -> std::result::Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }

        impl<'de> serde::Deserialize<'de> for $ty {
            fn deserialize<D: serde::Deserializer<'de>>(
                deserializer: D,
            ) -> std::result::Result<Self, D::Error> {
                let s = <String as serde::Deserialize>::deserialize(deserializer)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

pub(crate) use serde_via_string;

/// Controller serial number.
///
/// Treated as an opaque identifier: it is compared and displayed but never
/// used in arithmetic.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SerialNumber(u32);

impl SerialNumber {
    #[must_use]
    pub const fn new(serial: u32) -> Self {
        SerialNumber(serial)
    }

    /// Get the raw serial number as u32.
    #[must_use]
    pub const fn as_u32(&self) -> u32 {
        self.0
    }
}

impl From<u32> for SerialNumber {
    fn from(serial: u32) -> Self {
        SerialNumber(serial)
    }
}

impl fmt::Display for SerialNumber {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SerialNumber {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        s.trim()
            .parse::<u32>()
            .map(SerialNumber)
            .map_err(|_| Error::InvalidSerialNumber(s.to_string()))
    }
}

/// 48-bit hardware address, displayed as `00:66:19:39:55:2d`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MacAddress([u8; 6]);

impl MacAddress {
    #[must_use]
    pub const fn new(bytes: [u8; 6]) -> Self {
        MacAddress(bytes)
    }

    #[must_use]
    pub const fn octets(&self) -> [u8; 6] {
        self.0
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02x}:{b:02x}:{c:02x}:{d:02x}:{e:02x}:{g:02x}")
    }
}

impl FromStr for MacAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidMacAddress(s.to_string());

        let parts: Vec<&str> = s.split([':', '-']).collect();
        if parts.len() != 6 {
            return Err(invalid());
        }

        let mut bytes = [0u8; 6];
        for (byte, part) in bytes.iter_mut().zip(parts) {
            if part.len() != 2 {
                return Err(invalid());
            }
            *byte = u8::from_str_radix(part, 16).map_err(|_| invalid())?;
        }

        Ok(MacAddress(bytes))
    }
}

serde_via_string!(MacAddress);

/// Firmware version, transmitted big-endian and displayed as 4 hex digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Version(u16);

impl Version {
    #[must_use]
    pub const fn new(version: u16) -> Self {
        Version(version)
    }

    #[must_use]
    pub const fn as_u16(&self) -> u16 {
        self.0
    }
}

impl Default for Version {
    fn default() -> Self {
        Version(DEFAULT_FIRMWARE_VERSION)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:04x}", self.0)
    }
}

impl FromStr for Version {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let digits = s.trim().trim_start_matches("0x");
        u16::from_str_radix(digits, 16)
            .map(Version)
            .map_err(|_| Error::InvalidVersion(s.to_string()))
    }
}

serde_via_string!(Version);

/// Check a request's authorization field against [`MAGIC_WORD`].
///
/// # Security
/// The comparison runs in constant time so that probing the field does
/// not leak how many leading bytes matched.
#[must_use]
pub fn is_magic_word(value: u32) -> bool {
    value.ct_eq(&MAGIC_WORD).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("423187757", 423187757)]
    #[case(" 305419896 ", 305419896)]
    #[case("0", 0)]
    fn test_serial_number_valid(#[case] input: &str, #[case] expected: u32) {
        let serial: SerialNumber = input.parse().unwrap();
        assert_eq!(serial.as_u32(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("-1")]
    #[case("4294967296")]
    #[case("abc")]
    fn test_serial_number_invalid(#[case] input: &str) {
        assert!(input.parse::<SerialNumber>().is_err());
    }

    #[test]
    fn test_mac_address_display_and_parse() {
        let mac = MacAddress::new([0x00, 0x66, 0x19, 0x39, 0x55, 0x2d]);
        assert_eq!(mac.to_string(), "00:66:19:39:55:2d");
        assert_eq!("00:66:19:39:55:2D".parse::<MacAddress>().unwrap(), mac);
        assert_eq!("00-66-19-39-55-2d".parse::<MacAddress>().unwrap(), mac);
    }

    #[rstest]
    #[case("00:66:19:39:55")]
    #[case("00:66:19:39:55:2d:01")]
    #[case("00:66:19:39:55:zz")]
    #[case("0:66:19:39:55:2d")]
    fn test_mac_address_invalid(#[case] input: &str) {
        assert!(matches!(
            input.parse::<MacAddress>(),
            Err(Error::InvalidMacAddress(_))
        ));
    }

    #[test]
    fn test_version_format() {
        let version = Version::default();
        assert_eq!(version.as_u16(), 0x0892);
        assert_eq!(version.to_string(), "0892");
        assert_eq!("0892".parse::<Version>().unwrap(), version);
        assert_eq!("0x0892".parse::<Version>().unwrap(), version);
    }

    #[test]
    fn test_serde_uses_display_format() {
        let mac = MacAddress::new([0x00, 0x66, 0x19, 0x39, 0x55, 0x2d]);
        assert_eq!(
            serde_json::to_string(&mac).unwrap(),
            "\"00:66:19:39:55:2d\""
        );
        assert_eq!(
            serde_json::from_str::<Version>("\"0892\"").unwrap(),
            Version::new(0x0892)
        );
        assert_eq!(
            serde_json::to_string(&SerialNumber::new(405419896)).unwrap(),
            "405419896"
        );
    }

    #[rstest]
    #[case(0x55aa_aa55, true)]
    #[case(0x55aa_aa54, false)]
    #[case(0x0000_0000, false)]
    #[case(0xaa55_55aa, false)]
    fn test_magic_word(#[case] value: u32, #[case] expected: bool) {
        assert_eq!(is_magic_word(value), expected);
    }
}
