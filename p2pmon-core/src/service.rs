//! Service discovery responses: TLV records carrying Bonjour (DNS-SD) or UPnP answers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::address::MacAddress;
use crate::tlv::{self, ElementReader, Step};

pub const SERVICE_TYPE_ALL: u8 = 0;
pub const SERVICE_TYPE_BONJOUR: u8 = 1;
pub const SERVICE_TYPE_UPNP: u8 = 2;
pub const SERVICE_TYPE_VENDOR_SPECIFIC: u8 = 255;

pub const STATUS_SUCCESS: u8 = 0;
pub const STATUS_PROTOCOL_NOT_AVAILABLE: u8 = 1;
pub const STATUS_INFORMATION_NOT_AVAILABLE: u8 = 2;
pub const STATUS_BAD_REQUEST: u8 = 3;

/// Records carrying more data than this are skipped.
pub const MAX_RECORD_DATA: usize = 1024;

const DNS_TYPE_PTR: u16 = 12;
const DNS_TYPE_TXT: u16 = 16;

/// Record header: length(2, LE) + service type + transaction id + status.
const RECORD_HEADER_LEN: usize = 5;
/// The length field counts these three header bytes as well as the data.
const LEN_COUNTED_HEADER: usize = 3;

/// One service discovery answer from a peer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceResponse {
    pub service_type: u8,
    pub status: u8,
    pub transaction_id: u8,
    pub device: MacAddress,
    pub data: Vec<u8>,
    pub body: ServiceBody,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServiceBody {
    DnsSd(DnsSdResponse),
    Upnp(UpnpResponse),
    Raw,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsSdResponse {
    pub query_name: String,
    pub dns_type: u16,
    pub version: u8,
    /// Set for PTR answers.
    pub instance_name: Option<String>,
    /// Set for TXT answers.
    pub txt: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpnpResponse {
    pub version: u8,
    pub unique_service_names: Vec<String>,
}

/// Decode every well-formed, successful record in `tlvs`. Never panics on garbage.
pub fn parse_responses(device: MacAddress, tlvs: &[u8]) -> Vec<ServiceResponse> {
    tlv::scan(tlvs, &ServiceResponseReader { device })
}

struct ServiceResponseReader {
    device: MacAddress,
}

impl ElementReader for ServiceResponseReader {
    type Item = ServiceResponse;

    fn header_len(&self) -> usize {
        RECORD_HEADER_LEN
    }

    fn payload_len(&self, header: &[u8]) -> Option<usize> {
        let len = u16::from_le_bytes([header[0], header[1]]) as usize;
        len.checked_sub(LEN_COUNTED_HEADER)
    }

    fn read(&self, header: &[u8], payload: &[u8]) -> Step<ServiceResponse> {
        let (service_type, transaction_id, status) = (header[2], header[3], header[4]);
        if status != STATUS_SUCCESS {
            tracing::trace!(service_type, transaction_id, status, "skipping failed record");
            return Step::Skip;
        }
        if payload.len() > MAX_RECORD_DATA {
            tracing::trace!(len = payload.len(), "skipping oversized record");
            return Step::Skip;
        }
        let body = if payload.is_empty() {
            Some(ServiceBody::Raw)
        } else {
            match service_type {
                SERVICE_TYPE_BONJOUR => parse_dns_sd(payload).map(ServiceBody::DnsSd),
                SERVICE_TYPE_UPNP => parse_upnp(payload).map(ServiceBody::Upnp),
                _ => Some(ServiceBody::Raw),
            }
        };
        match body {
            Some(body) => Step::Emit(ServiceResponse {
                service_type,
                status,
                transaction_id,
                device: self.device,
                data: payload.to_vec(),
                body,
            }),
            None => {
                tracing::trace!(service_type, transaction_id, "undecodable record body");
                Step::Skip
            }
        }
    }
}

struct Cursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn take(&mut self, n: usize) -> Option<&'a [u8]> {
        let out = self.buf.get(self.pos..self.pos + n)?;
        self.pos += n;
        Some(out)
    }

    fn u8(&mut self) -> Option<u8> {
        self.take(1).map(|b| b[0])
    }

    fn be_u16(&mut self) -> Option<u16> {
        self.take(2).map(|b| u16::from_be_bytes([b[0], b[1]]))
    }
}

/// Well-known suffixes referenced by compression pointers in supplicant answers.
fn compressed_suffix(key: u8) -> Option<&'static str> {
    match key {
        0x0c => Some("_tcp.local."),
        0x11 => Some("local."),
        0x1c => Some("_udp.local."),
        _ => None,
    }
}

/// Pointer key that refers back to the query name itself (only valid in answer data).
const QUERY_NAME_POINTER: u8 = 0x27;

fn read_dns_name(cur: &mut Cursor<'_>, query_name: Option<&str>) -> Option<String> {
    let mut name = String::new();
    loop {
        match cur.u8()? {
            0x00 => return Some(name),
            0xc0 => {
                let key = cur.u8()?;
                let suffix = match (key, query_name) {
                    (QUERY_NAME_POINTER, Some(q)) => q,
                    _ => compressed_suffix(key)?,
                };
                name.push_str(suffix);
                return Some(name);
            }
            len => {
                let label = cur.take(len as usize)?;
                name.push_str(&String::from_utf8_lossy(label));
                name.push('.');
            }
        }
    }
}

fn parse_dns_sd(data: &[u8]) -> Option<DnsSdResponse> {
    let mut cur = Cursor::new(data);
    let query_name = read_dns_name(&mut cur, None)?;
    let dns_type = cur.be_u16()?;
    let version = cur.u8()?;
    let mut resp = DnsSdResponse {
        query_name,
        dns_type,
        version,
        instance_name: None,
        txt: BTreeMap::new(),
    };
    match dns_type {
        DNS_TYPE_PTR => {
            let rdata = read_dns_name(&mut cur, Some(&resp.query_name))?;
            let keep = rdata.len().checked_sub(resp.query_name.len() + 1)?;
            resp.instance_name = Some(rdata.get(..keep)?.to_string());
        }
        DNS_TYPE_TXT => {
            while cur.remaining() > 0 {
                let len = cur.u8()? as usize;
                if len == 0 {
                    continue;
                }
                let entry = String::from_utf8_lossy(cur.take(len)?).into_owned();
                let (key, value) = entry.split_once('=')?;
                resp.txt.insert(key.to_string(), value.to_string());
            }
        }
        _ => return None,
    }
    Some(resp)
}

fn parse_upnp(data: &[u8]) -> Option<UpnpResponse> {
    let (&version, rest) = data.split_first()?;
    let names = String::from_utf8_lossy(rest);
    Some(UpnpResponse {
        version,
        unique_service_names: names.split(',').map(str::to_string).collect(),
    })
}
