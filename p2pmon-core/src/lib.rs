//! Wi-Fi P2P supplicant event decoder.
//! Host-driven: no I/O; host passes supplicant callbacks and receives typed events.

pub mod address;
pub mod classify;
pub mod decoder;
pub mod error;
pub mod event;
pub mod fields;
pub mod protocol;
pub mod service;
pub mod tlv;
pub mod wire;

pub use address::MacAddress;
pub use classify::{P2pStatus, ProvisionFailure, ProvisionOutcome, WpsSetup};
pub use decoder::Decoder;
pub use error::{DecodeError, Malformed};
pub use event::{dispatch, EventSink, GroupDescriptor, P2pEvent, PeerDevice};
pub use protocol::{Callback, CALLBACK_FORMAT_VERSION};
pub use service::ServiceResponse;
pub use wire::{decode_frame, encode_frame, FrameDecodeError, FrameEncodeError};

// C ABI for native hosts.
pub mod ffi;
