//! Fixed-layout field decoders: big-endian words, WPS device type, WFD info, SSID, IPv4 words.

use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};

use crate::error::Malformed;

/// WPS primary device type record length: category(2) + OUI(4) + subcategory(2).
pub const DEVICE_TYPE_LEN: usize = 8;
/// Minimum WFD device info subelement body: device info(2) + control port(2) + max throughput(2).
pub const WFD_DEVICE_INFO_LEN: usize = 6;
pub const WFD_R2_DEVICE_INFO_LEN: usize = 2;

/// Read a big-endian u16 at `offset`. Bytes are taken unsigned, so `C0 03` is 0xC003.
pub fn be_u16(bytes: &[u8], offset: usize) -> Option<u16> {
    let b = bytes.get(offset..offset.checked_add(2)?)?;
    Some(u16::from_be_bytes([b[0], b[1]]))
}

/// Format a primary device type as `"<category>-<OUI hex>-<subcategory>"`.
pub fn primary_device_type(bytes: &[u8]) -> Result<String, Malformed> {
    if bytes.len() != DEVICE_TYPE_LEN {
        return Err(Malformed::InvalidDeviceType(bytes.len()));
    }
    let category = u16::from_be_bytes([bytes[0], bytes[1]]);
    let sub_category = u16::from_be_bytes([bytes[6], bytes[7]]);
    let oui: String = bytes[2..6].iter().map(|b| format!("{b:02X}")).collect();
    Ok(format!("{category}-{oui}-{sub_category}"))
}

/// Wi-Fi Display device information advertised by a peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WfdInfo {
    pub device_info: u16,
    pub control_port: u16,
    pub max_throughput: u16,
    pub r2_device_info: Option<u16>,
}

impl WfdInfo {
    /// Decode the 6-byte WFD device info body. Shorter buffers yield `None`.
    pub fn from_bytes(bytes: &[u8]) -> Option<WfdInfo> {
        if bytes.len() < WFD_DEVICE_INFO_LEN {
            return None;
        }
        Some(WfdInfo {
            device_info: be_u16(bytes, 0)?,
            control_port: be_u16(bytes, 2)?,
            max_throughput: be_u16(bytes, 4)?,
            r2_device_info: None,
        })
    }

    /// Attach R2 device info when the buffer carries at least 2 bytes.
    pub fn with_r2(mut self, bytes: Option<&[u8]>) -> Self {
        self.r2_device_info = bytes
            .filter(|b| b.len() >= WFD_R2_DEVICE_INFO_LEN)
            .and_then(|b| be_u16(b, 0));
        self
    }
}

/// Decode WFD info plus optional R2 info. R2 alone (without base info) is ignored.
pub fn wfd_info(device_info: Option<&[u8]>, r2_device_info: Option<&[u8]>) -> Option<WfdInfo> {
    device_info
        .and_then(WfdInfo::from_bytes)
        .map(|info| info.with_r2(r2_device_info))
}

/// Convert a host-order word to an address. The word's little-endian bytes are the octets.
pub fn ipv4_from_word(word: u32) -> Ipv4Addr {
    Ipv4Addr::from(word.to_le_bytes())
}

/// SSID bytes as text: verbatim UTF-8, or lower-case hex when not valid UTF-8.
pub fn decode_ssid(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|b| format!("{b:02x}")).collect(),
    }
}
