//! Hardware (MAC) addresses: strict 6-byte parsing, any-address sentinel, canonical text form.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::Malformed;

pub const MAC_LEN: usize = 6;

/// 48-bit hardware address. Serialized as canonical `xx:xx:xx:xx:xx:xx`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MacAddress([u8; MAC_LEN]);

impl MacAddress {
    /// All-zero address: "unknown / unspecified".
    pub const ANY: MacAddress = MacAddress([0u8; MAC_LEN]);

    pub fn new(bytes: [u8; MAC_LEN]) -> Self {
        MacAddress(bytes)
    }

    /// Parse raw bytes. Anything but exactly 6 bytes is rejected; never padded or truncated.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, Malformed> {
        Self::parse_field("address", bytes)
    }

    /// Same as [`MacAddress::from_slice`], naming the offending field in the error.
    pub(crate) fn parse_field(field: &'static str, bytes: &[u8]) -> Result<Self, Malformed> {
        let arr: [u8; MAC_LEN] = bytes.try_into().map_err(|_| Malformed::InvalidAddress {
            field,
            len: bytes.len(),
        })?;
        Ok(MacAddress(arr))
    }

    /// Parse an optional buffer; `None` counts as a missing field.
    pub(crate) fn parse_required(
        field: &'static str,
        bytes: Option<&[u8]>,
    ) -> Result<Self, Malformed> {
        let bytes = bytes.ok_or(Malformed::MissingField(field))?;
        Self::parse_field(field, bytes)
    }

    pub fn is_any(&self) -> bool {
        self.0 == [0u8; MAC_LEN]
    }

    pub fn as_bytes(&self) -> &[u8; MAC_LEN] {
        &self.0
    }
}

impl From<[u8; MAC_LEN]> for MacAddress {
    fn from(bytes: [u8; MAC_LEN]) -> Self {
        MacAddress(bytes)
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = &self.0;
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            b[0], b[1], b[2], b[3], b[4], b[5]
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid MAC address string {0:?}")]
pub struct ParseMacError(String);

impl FromStr for MacAddress {
    type Err = ParseMacError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut out = [0u8; MAC_LEN];
        let mut parts = s.split(':');
        for byte in out.iter_mut() {
            let part = parts.next().ok_or_else(|| ParseMacError(s.to_string()))?;
            if part.len() != 2 {
                return Err(ParseMacError(s.to_string()));
            }
            *byte = u8::from_str_radix(part, 16).map_err(|_| ParseMacError(s.to_string()))?;
        }
        if parts.next().is_some() {
            return Err(ParseMacError(s.to_string()));
        }
        Ok(MacAddress(out))
    }
}

impl Serialize for MacAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MacAddress {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let s: String = Deserialize::deserialize(d)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn parse_and_format() {
        let addr = MacAddress::from_slice(&[0x00, 0x11, 0x22, 0x33, 0x44, 0x55]).unwrap();
        assert_eq!(addr.to_string(), "00:11:22:33:44:55");
        let addr = MacAddress::from_slice(&[0xde, 0xAD, 0xbe, 0xef, 0x0a, 0xff]).unwrap();
        assert_eq!(addr.to_string(), "de:ad:be:ef:0a:ff");
    }

    #[test]
    fn wrong_lengths_rejected() {
        assert!(MacAddress::from_slice(&[]).is_err());
        assert!(MacAddress::from_slice(&[0x00]).is_err());
        assert_eq!(
            MacAddress::from_slice(&[0, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66]),
            Err(Malformed::InvalidAddress {
                field: "address",
                len: 7
            })
        );
    }

    #[test]
    fn random_lengths_other_than_six_rejected() {
        let mut rng = rand::thread_rng();
        for len in (0..32).filter(|&l| l != MAC_LEN) {
            let buf: Vec<u8> = (0..len).map(|_| rng.gen()).collect();
            assert!(MacAddress::from_slice(&buf).is_err(), "len {len}");
        }
    }

    #[test]
    fn random_roundtrip_through_text() {
        let mut rng = rand::thread_rng();
        for _ in 0..64 {
            let bytes: [u8; MAC_LEN] = rng.gen();
            let addr = MacAddress::from_slice(&bytes).unwrap();
            let expected: Vec<String> = bytes.iter().map(|b| format!("{b:02x}")).collect();
            assert_eq!(addr.to_string(), expected.join(":"));
            assert_eq!(addr.to_string().parse::<MacAddress>().unwrap(), addr);
        }
    }

    #[test]
    fn any_address() {
        assert!(MacAddress::ANY.is_any());
        assert!(MacAddress::from_slice(&[0; 6]).unwrap().is_any());
        assert!(!MacAddress::new([0, 0, 0, 0, 0, 1]).is_any());
        assert_eq!(MacAddress::ANY.to_string(), "00:00:00:00:00:00");
    }

    #[test]
    fn from_str_rejects_bad_text() {
        assert!("00:11:22:33:44".parse::<MacAddress>().is_err());
        assert!("00:11:22:33:44:55:66".parse::<MacAddress>().is_err());
        assert!("00:11:22:33:44:zz".parse::<MacAddress>().is_err());
        assert!("0:11:22:33:44:55".parse::<MacAddress>().is_err());
    }
}
