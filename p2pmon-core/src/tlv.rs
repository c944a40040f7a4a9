//! Length-prefixed element scanning, tolerant of a truncated trailing element.

use serde::{Deserialize, Serialize};

/// Element id of a vendor-specific information element.
pub const EID_VENDOR_SPECIFIC: u8 = 221;
/// Element id whose first payload byte is an extended element id.
pub const EID_EXTENSION_PRESENT: u8 = 255;

/// What a reader wants done with the element it was handed.
pub enum Step<T> {
    Emit(T),
    Skip,
}

/// Knows the header layout of one element family.
pub trait ElementReader {
    type Item;

    /// Fixed header length preceding the payload.
    fn header_len(&self) -> usize;

    /// Payload length declared by `header` (exactly `header_len()` bytes), or `None` when the
    /// header itself is invalid.
    fn payload_len(&self, header: &[u8]) -> Option<usize>;

    fn read(&self, header: &[u8], payload: &[u8]) -> Step<Self::Item>;
}

/// Scan `buf` as a flat sequence of `(header, payload)` elements.
/// An element whose header or payload would run past the end is dropped and the scan ends.
pub fn scan<R: ElementReader>(buf: &[u8], reader: &R) -> Vec<R::Item> {
    let header_len = reader.header_len();
    let mut out = Vec::new();
    let mut pos = 0;
    while pos < buf.len() {
        let Some(header) = buf.get(pos..pos + header_len) else {
            tracing::trace!(offset = pos, "truncated element header");
            break;
        };
        let Some(len) = reader.payload_len(header) else {
            tracing::trace!(offset = pos, "invalid element header");
            break;
        };
        let start = pos + header_len;
        let Some(payload) = buf.get(start..start + len) else {
            tracing::trace!(offset = pos, declared = len, "element overruns buffer");
            break;
        };
        match reader.read(header, payload) {
            Step::Emit(item) => out.push(item),
            Step::Skip => {}
        }
        pos = start + len;
    }
    out
}

/// A raw 802.11 information element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InformationElement {
    pub id: u8,
    pub id_ext: Option<u8>,
    pub bytes: Vec<u8>,
}

/// Reads `(id, len, payload)` elements and keeps only vendor-specific ones.
pub struct VendorElementReader;

impl ElementReader for VendorElementReader {
    type Item = InformationElement;

    fn header_len(&self) -> usize {
        2
    }

    fn payload_len(&self, header: &[u8]) -> Option<usize> {
        Some(header[1] as usize)
    }

    fn read(&self, header: &[u8], payload: &[u8]) -> Step<InformationElement> {
        let id = header[0];
        let (id_ext, bytes) = match (id, payload.split_first()) {
            (EID_EXTENSION_PRESENT, Some((ext, rest))) => (Some(*ext), rest),
            _ => (None, payload),
        };
        if id != EID_VENDOR_SPECIFIC {
            tracing::trace!(id, ?id_ext, "skipping non-vendor element");
            return Step::Skip;
        }
        Step::Emit(InformationElement {
            id,
            id_ext,
            bytes: bytes.to_vec(),
        })
    }
}

/// Vendor-specific elements found in `buf`.
pub fn vendor_elements(buf: &[u8]) -> Vec<InformationElement> {
    scan(buf, &VendorElementReader)
}
