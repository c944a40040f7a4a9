//! Decode errors: malformed input (dropped) vs. unmapped enumerations (protocol drift).

/// Why a callback payload was rejected. Expected on noisy hardware input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Malformed {
    #[error("{field}: expected 6-byte address, got {len} bytes")]
    InvalidAddress { field: &'static str, len: usize },
    #[error("missing required field {0}")]
    MissingField(&'static str),
    #[error("primary device type: expected 8 bytes, got {0}")]
    InvalidDeviceType(usize),
    #[error("unsupported config methods {0:#06x}")]
    UnsupportedConfigMethods(u16),
}

/// Error returned by [`crate::Decoder::decode`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// Payload failed validation; nothing is dispatched.
    #[error("dropped {callback}: {reason}")]
    Dropped {
        callback: &'static str,
        reason: Malformed,
    },
    /// A status or code outside the known table. Tables are out of date with the supplicant.
    #[error("unmapped {table} value {value}")]
    UnmappedEnum { table: &'static str, value: i32 },
}

impl DecodeError {
    pub fn is_dropped(&self) -> bool {
        matches!(self, DecodeError::Dropped { .. })
    }
}
