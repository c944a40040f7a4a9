//! Inbound supplicant notifications: one variant per callback shape.
//! Byte buffers are `Option` because the supplicant may hand over null arrays.

use serde::{Deserialize, Serialize};

/// Current version of the recorded callback format. Bumped when `Callback` changes shape.
pub const CALLBACK_FORMAT_VERSION: u8 = 1;

/// Structured device-found notification. Also the normalized form of the legacy shapes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceFoundParams {
    pub src_address: Option<Vec<u8>>,
    pub p2p_device_address: Option<Vec<u8>>,
    pub primary_device_type: Option<Vec<u8>>,
    pub device_name: Option<String>,
    pub config_methods: u16,
    pub device_capabilities: u8,
    pub group_capabilities: i32,
    pub wfd_device_info: Option<Vec<u8>>,
    pub wfd_r2_device_info: Option<Vec<u8>>,
    pub vendor_elem_bytes: Option<Vec<u8>>,
}

/// The three 32-bit words of an EAPOL IP allocation, host byte order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientIpWords {
    pub ip_address_client: u32,
    pub ip_address_go: u32,
    pub ip_address_mask: u32,
}

/// Structured group-started notification. Also the normalized form of the legacy shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupStartedParams {
    pub group_interface_name: Option<String>,
    pub is_group_owner: bool,
    pub ssid: Option<Vec<u8>>,
    pub frequency_mhz: i32,
    pub passphrase: Option<String>,
    pub go_device_address: Option<Vec<u8>>,
    pub go_interface_address: Option<Vec<u8>>,
    pub is_persistent: bool,
    pub is_client_ip_info_present: bool,
    pub client_ip_info: Option<ClientIpWords>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvisionDiscoveryParams {
    pub p2p_device_address: Option<Vec<u8>>,
    pub is_request: bool,
    pub status: u8,
    pub config_methods: u16,
    pub generated_pin: Option<String>,
    pub group_interface_name: Option<String>,
}

/// One notification from the supplicant's P2P interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Callback {
    DeviceFound {
        src_address: Option<Vec<u8>>,
        p2p_device_address: Option<Vec<u8>>,
        primary_device_type: Option<Vec<u8>>,
        device_name: Option<String>,
        config_methods: u16,
        device_capabilities: u8,
        group_capabilities: i32,
        wfd_device_info: Option<Vec<u8>>,
    },
    DeviceFoundWithVendorElements {
        src_address: Option<Vec<u8>>,
        p2p_device_address: Option<Vec<u8>>,
        primary_device_type: Option<Vec<u8>>,
        device_name: Option<String>,
        config_methods: u16,
        device_capabilities: u8,
        group_capabilities: i32,
        wfd_device_info: Option<Vec<u8>>,
        wfd_r2_device_info: Option<Vec<u8>>,
        vendor_elem_bytes: Option<Vec<u8>>,
    },
    DeviceFoundWithParams(DeviceFoundParams),
    DeviceLost {
        p2p_device_address: Option<Vec<u8>>,
    },
    FindStopped,
    GoNegotiationRequest {
        src_address: Option<Vec<u8>>,
        password_id: i32,
    },
    GoNegotiationCompleted {
        status: i32,
    },
    GroupStarted {
        group_interface_name: Option<String>,
        is_group_owner: bool,
        ssid: Option<Vec<u8>>,
        frequency_mhz: i32,
        passphrase: Option<String>,
        go_device_address: Option<Vec<u8>>,
        is_persistent: bool,
    },
    GroupStartedWithParams(GroupStartedParams),
    GroupFormationSuccess,
    GroupFormationFailure {
        failure_reason: String,
    },
    GroupRemoved {
        group_interface_name: String,
        is_group_owner: bool,
    },
    ProvisionDiscoveryCompleted {
        p2p_device_address: Option<Vec<u8>>,
        is_request: bool,
        status: u8,
        config_methods: u16,
        generated_pin: Option<String>,
    },
    ProvisionDiscoveryCompletedEvent(ProvisionDiscoveryParams),
    InvitationReceived {
        src_address: Option<Vec<u8>>,
        go_device_address: Option<Vec<u8>>,
        bssid: Option<Vec<u8>>,
        persistent_network_id: i32,
        operating_frequency: i32,
    },
    InvitationResult {
        bssid: Option<Vec<u8>>,
        status: i32,
    },
    StaAuthorized {
        src_address: Option<Vec<u8>>,
        p2p_device_address: Option<Vec<u8>>,
    },
    StaDeauthorized {
        src_address: Option<Vec<u8>>,
        p2p_device_address: Option<Vec<u8>>,
    },
    ServiceDiscoveryResponse {
        src_address: Option<Vec<u8>>,
        update_indicator: u16,
        tlvs: Option<Vec<u8>>,
    },
}

impl Callback {
    pub fn name(&self) -> &'static str {
        match self {
            Callback::DeviceFound { .. } => "onDeviceFound",
            Callback::DeviceFoundWithVendorElements { .. } => "onDeviceFoundWithVendorElements",
            Callback::DeviceFoundWithParams(_) => "onDeviceFoundWithParams",
            Callback::DeviceLost { .. } => "onDeviceLost",
            Callback::FindStopped => "onFindStopped",
            Callback::GoNegotiationRequest { .. } => "onGoNegotiationRequest",
            Callback::GoNegotiationCompleted { .. } => "onGoNegotiationCompleted",
            Callback::GroupStarted { .. } => "onGroupStarted",
            Callback::GroupStartedWithParams(_) => "onGroupStartedWithParams",
            Callback::GroupFormationSuccess => "onGroupFormationSuccess",
            Callback::GroupFormationFailure { .. } => "onGroupFormationFailure",
            Callback::GroupRemoved { .. } => "onGroupRemoved",
            Callback::ProvisionDiscoveryCompleted { .. } => "onProvisionDiscoveryCompleted",
            Callback::ProvisionDiscoveryCompletedEvent(_) => "onProvisionDiscoveryCompletedEvent",
            Callback::InvitationReceived { .. } => "onInvitationReceived",
            Callback::InvitationResult { .. } => "onInvitationResult",
            Callback::StaAuthorized { .. } => "onStaAuthorized",
            Callback::StaDeauthorized { .. } => "onStaDeauthorized",
            Callback::ServiceDiscoveryResponse { .. } => "onServiceDiscoveryResponse",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_replay_line_parses() {
        let line = r#"{"DeviceLost":{"p2p_device_address":[0,17,34,51,68,85]}}"#;
        let cb: Callback = serde_json::from_str(line).unwrap();
        assert_eq!(
            cb,
            Callback::DeviceLost {
                p2p_device_address: Some(vec![0x00, 0x11, 0x22, 0x33, 0x44, 0x55])
            }
        );
        assert_eq!(cb.name(), "onDeviceLost");
    }

    #[test]
    fn params_fields_default_when_absent() {
        let line = r#"{"GroupStartedWithParams":{"group_interface_name":"p2p-p2p0-1","is_group_owner":true}}"#;
        let cb: Callback = serde_json::from_str(line).unwrap();
        match cb {
            Callback::GroupStartedWithParams(p) => {
                assert_eq!(p.group_interface_name.as_deref(), Some("p2p-p2p0-1"));
                assert!(p.is_group_owner);
                assert!(p.ssid.is_none());
                assert!(!p.is_client_ip_info_present);
                assert_eq!(p.frequency_mhz, 0);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn unit_variant_from_json() {
        let cb: Callback = serde_json::from_str(r#""FindStopped""#).unwrap();
        assert_eq!(cb, Callback::FindStopped);
    }
}
