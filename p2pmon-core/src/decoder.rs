//! Host-driven decoder: the host passes supplicant callbacks in, the decoder returns at most one event.
//! No I/O, no state beyond the interface name.

use crate::address::MacAddress;
use crate::classify::{self, P2pStatus, ProvisionOutcome};
use crate::error::{DecodeError, Malformed};
use crate::event::{
    self, ClientIpInfo, DeviceStatus, EventSink, GoNegotiationRequest, GroupDescriptor, P2pEvent,
    PeerDevice, ProvisionDiscovery, RemovedGroup, NETWORK_ID_PERSISTENT, NETWORK_ID_TEMPORARY,
};
use crate::fields;
use crate::protocol::{Callback, DeviceFoundParams, GroupStartedParams, ProvisionDiscoveryParams};
use crate::service;
use crate::tlv;

/// Stateless decoder bound to one P2P interface. Safe to share across threads.
#[derive(Debug, Clone)]
pub struct Decoder {
    iface: String,
}

fn dropped(callback: &'static str) -> impl Fn(Malformed) -> DecodeError {
    move |reason| DecodeError::Dropped { callback, reason }
}

fn found_device(p: &DeviceFoundParams) -> Result<PeerDevice, Malformed> {
    MacAddress::parse_required("src_address", p.src_address.as_deref())?;
    let address =
        MacAddress::parse_required("p2p_device_address", p.p2p_device_address.as_deref())?;
    let device_type = p
        .primary_device_type
        .as_deref()
        .ok_or(Malformed::MissingField("primary_device_type"))?;
    let name = p
        .device_name
        .clone()
        .ok_or(Malformed::MissingField("device_name"))?;
    Ok(PeerDevice {
        address,
        name,
        primary_device_type: fields::primary_device_type(device_type)?,
        device_capability: p.device_capabilities,
        group_capability: p.group_capabilities,
        wps_config_methods: p.config_methods,
        status: DeviceStatus::Available,
        wfd_info: fields::wfd_info(p.wfd_device_info.as_deref(), p.wfd_r2_device_info.as_deref()),
        vendor_elements: p
            .vendor_elem_bytes
            .as_deref()
            .map(tlv::vendor_elements)
            .unwrap_or_default(),
    })
}

fn started_group(p: &GroupStartedParams) -> Result<GroupDescriptor, Malformed> {
    let interface = p
        .group_interface_name
        .clone()
        .filter(|name| !name.is_empty())
        .ok_or(Malformed::MissingField("group_interface_name"))?;
    let ssid = p.ssid.as_deref().ok_or(Malformed::MissingField("ssid"))?;
    let owner = MacAddress::parse_required("go_device_address", p.go_device_address.as_deref())?;

    // Only clients are handed an address by the group owner.
    let client_ip_info = match p.client_ip_info {
        Some(words) if p.is_client_ip_info_present && !p.is_group_owner => Some(ClientIpInfo {
            client: fields::ipv4_from_word(words.ip_address_client),
            group_owner: fields::ipv4_from_word(words.ip_address_go),
            mask: fields::ipv4_from_word(words.ip_address_mask),
        }),
        _ => None,
    };

    Ok(GroupDescriptor {
        interface: Some(interface),
        is_group_owner: p.is_group_owner,
        network_name: Some(fields::decode_ssid(ssid)),
        network_id: if p.is_persistent {
            NETWORK_ID_PERSISTENT
        } else {
            NETWORK_ID_TEMPORARY
        },
        owner: PeerDevice::new(owner),
        clients: Vec::new(),
        passphrase: p.passphrase.clone(),
        frequency_mhz: p.frequency_mhz,
        interface_address: p
            .go_interface_address
            .as_deref()
            .and_then(|b| MacAddress::from_slice(b).ok()),
        client_ip_info,
    })
}

/// An all-zero P2P device address means the station is known by its source address.
/// A missing or malformed P2P device address is not a substitute for it.
fn station(
    src_address: Option<&[u8]>,
    p2p_device_address: Option<&[u8]>,
) -> Result<PeerDevice, Malformed> {
    let p2p = MacAddress::parse_required("p2p_device_address", p2p_device_address)?;
    let address = if p2p.is_any() {
        MacAddress::parse_required("src_address", src_address)?
    } else {
        p2p
    };
    Ok(PeerDevice::new(address))
}

impl Decoder {
    pub fn new(iface: impl Into<String>) -> Self {
        Self {
            iface: iface.into(),
        }
    }

    pub fn iface(&self) -> &str {
        &self.iface
    }

    /// Decode one callback into its event.
    pub fn decode(&self, callback: &Callback) -> Result<P2pEvent, DecodeError> {
        match callback {
            Callback::DeviceFound {
                src_address,
                p2p_device_address,
                primary_device_type,
                device_name,
                config_methods,
                device_capabilities,
                group_capabilities,
                wfd_device_info,
            } => self.on_device_found(&DeviceFoundParams {
                src_address: src_address.clone(),
                p2p_device_address: p2p_device_address.clone(),
                primary_device_type: primary_device_type.clone(),
                device_name: device_name.clone(),
                config_methods: *config_methods,
                device_capabilities: *device_capabilities,
                group_capabilities: *group_capabilities,
                wfd_device_info: wfd_device_info.clone(),
                wfd_r2_device_info: None,
                vendor_elem_bytes: None,
            }),
            Callback::DeviceFoundWithVendorElements {
                src_address,
                p2p_device_address,
                primary_device_type,
                device_name,
                config_methods,
                device_capabilities,
                group_capabilities,
                wfd_device_info,
                wfd_r2_device_info,
                vendor_elem_bytes,
            } => self.on_device_found(&DeviceFoundParams {
                src_address: src_address.clone(),
                p2p_device_address: p2p_device_address.clone(),
                primary_device_type: primary_device_type.clone(),
                device_name: device_name.clone(),
                config_methods: *config_methods,
                device_capabilities: *device_capabilities,
                group_capabilities: *group_capabilities,
                wfd_device_info: wfd_device_info.clone(),
                wfd_r2_device_info: wfd_r2_device_info.clone(),
                vendor_elem_bytes: vendor_elem_bytes.clone(),
            }),
            Callback::DeviceFoundWithParams(params) => self.on_device_found(params),
            Callback::DeviceLost { p2p_device_address } => {
                self.on_device_lost(p2p_device_address.as_deref())
            }
            Callback::FindStopped => Ok(P2pEvent::FindStopped),
            Callback::GoNegotiationRequest {
                src_address,
                password_id,
            } => self.on_go_negotiation_request(src_address.as_deref(), *password_id),
            Callback::GoNegotiationCompleted { status } => {
                self.on_go_negotiation_completed(*status)
            }
            Callback::GroupStarted {
                group_interface_name,
                is_group_owner,
                ssid,
                frequency_mhz,
                passphrase,
                go_device_address,
                is_persistent,
            } => self.on_group_started(&GroupStartedParams {
                group_interface_name: group_interface_name.clone(),
                is_group_owner: *is_group_owner,
                ssid: ssid.clone(),
                frequency_mhz: *frequency_mhz,
                passphrase: passphrase.clone(),
                go_device_address: go_device_address.clone(),
                is_persistent: *is_persistent,
                ..GroupStartedParams::default()
            }),
            Callback::GroupStartedWithParams(params) => self.on_group_started(params),
            Callback::GroupFormationSuccess => Ok(P2pEvent::GroupFormationSuccess),
            Callback::GroupFormationFailure { failure_reason } => {
                Ok(P2pEvent::GroupFormationFailure(failure_reason.clone()))
            }
            Callback::GroupRemoved {
                group_interface_name,
                is_group_owner,
            } => Ok(self.on_group_removed(group_interface_name, *is_group_owner)),
            Callback::ProvisionDiscoveryCompleted {
                p2p_device_address,
                is_request,
                status,
                config_methods,
                generated_pin,
            } => self.on_provision_discovery_completed(&ProvisionDiscoveryParams {
                p2p_device_address: p2p_device_address.clone(),
                is_request: *is_request,
                status: *status,
                config_methods: *config_methods,
                generated_pin: generated_pin.clone(),
                group_interface_name: None,
            }),
            Callback::ProvisionDiscoveryCompletedEvent(params) => {
                self.on_provision_discovery_completed(params)
            }
            Callback::InvitationReceived {
                src_address,
                go_device_address,
                bssid: _,
                persistent_network_id,
                operating_frequency,
            } => self.on_invitation_received(
                src_address.as_deref(),
                go_device_address.as_deref(),
                *persistent_network_id,
                *operating_frequency,
            ),
            Callback::InvitationResult { bssid: _, status } => self.on_invitation_result(*status),
            Callback::StaAuthorized {
                src_address,
                p2p_device_address,
            } => self.on_sta_authorized(src_address.as_deref(), p2p_device_address.as_deref()),
            Callback::StaDeauthorized {
                src_address,
                p2p_device_address,
            } => self.on_sta_deauthorized(src_address.as_deref(), p2p_device_address.as_deref()),
            Callback::ServiceDiscoveryResponse {
                src_address,
                update_indicator: _,
                tlvs,
            } => self.on_service_discovery_response(src_address.as_deref(), tlvs.as_deref()),
        }
    }

    /// Decode and hand the event to `sink`. Malformed input is dropped silently;
    /// only an unmapped enumeration comes back as an error.
    pub fn deliver(&self, callback: &Callback, sink: &mut dyn EventSink) -> Result<(), DecodeError> {
        match self.decode(callback) {
            Ok(event) => {
                tracing::trace!(iface = %self.iface, kind = event.kind(), "dispatching");
                event::dispatch(&self.iface, event, sink);
                Ok(())
            }
            Err(DecodeError::Dropped { callback, reason }) => {
                tracing::debug!(iface = %self.iface, callback, %reason, "dropped malformed callback");
                Ok(())
            }
            Err(e) => {
                tracing::warn!(iface = %self.iface, callback = callback.name(), error = %e, "decode failed");
                Err(e)
            }
        }
    }

    pub fn on_device_found(&self, params: &DeviceFoundParams) -> Result<P2pEvent, DecodeError> {
        let device = found_device(params).map_err(dropped("onDeviceFound"))?;
        Ok(P2pEvent::DeviceFound(device))
    }

    pub fn on_device_lost(&self, p2p_device_address: Option<&[u8]>) -> Result<P2pEvent, DecodeError> {
        let address = MacAddress::parse_required("p2p_device_address", p2p_device_address)
            .map_err(dropped("onDeviceLost"))?;
        Ok(P2pEvent::DeviceLost(PeerDevice::new(address)))
    }

    /// Unknown password ids fall back to push-button rather than dropping.
    pub fn on_go_negotiation_request(
        &self,
        src_address: Option<&[u8]>,
        password_id: i32,
    ) -> Result<P2pEvent, DecodeError> {
        let device_address = MacAddress::parse_required("src_address", src_address)
            .map_err(dropped("onGoNegotiationRequest"))?;
        Ok(P2pEvent::GoNegotiationRequest(GoNegotiationRequest {
            device_address,
            wps_setup: classify::wps_setup(password_id),
        }))
    }

    pub fn on_go_negotiation_completed(&self, status: i32) -> Result<P2pEvent, DecodeError> {
        Ok(match P2pStatus::from_code(status)? {
            P2pStatus::Success => P2pEvent::GoNegotiationSuccess,
            failure => P2pEvent::GoNegotiationFailure(failure),
        })
    }

    pub fn on_group_started(&self, params: &GroupStartedParams) -> Result<P2pEvent, DecodeError> {
        let group = started_group(params).map_err(dropped("onGroupStarted"))?;
        Ok(P2pEvent::GroupStarted(group))
    }

    pub fn on_group_removed(&self, group_interface_name: &str, is_group_owner: bool) -> P2pEvent {
        P2pEvent::GroupRemoved(RemovedGroup {
            interface: group_interface_name.to_string(),
            is_group_owner,
        })
    }

    /// Address first, then status (unknown status is an error), then config methods.
    pub fn on_provision_discovery_completed(
        &self,
        p: &ProvisionDiscoveryParams,
    ) -> Result<P2pEvent, DecodeError> {
        let drop_with = dropped("onProvisionDiscoveryCompleted");
        let address =
            MacAddress::parse_required("p2p_device_address", p.p2p_device_address.as_deref())
                .map_err(&drop_with)?;
        let outcome = match classify::provision_failure(p.status)? {
            Some(reason) => ProvisionOutcome::Failure(reason),
            None => classify::provision_outcome(
                p.config_methods,
                p.is_request,
                p.generated_pin.as_deref().unwrap_or_default(),
            )
            .map_err(&drop_with)?,
        };
        Ok(P2pEvent::ProvisionDiscovery(ProvisionDiscovery {
            device: PeerDevice::new(address),
            outcome,
            group_interface: p.group_interface_name.clone(),
        }))
    }

    /// The inviting peer becomes the single client; the group owner is always required.
    pub fn on_invitation_received(
        &self,
        src_address: Option<&[u8]>,
        go_device_address: Option<&[u8]>,
        persistent_network_id: i32,
        operating_frequency: i32,
    ) -> Result<P2pEvent, DecodeError> {
        let drop_with = dropped("onInvitationReceived");
        let client = MacAddress::parse_required("src_address", src_address).map_err(&drop_with)?;
        let owner = MacAddress::parse_required("go_device_address", go_device_address)
            .map_err(&drop_with)?;
        Ok(P2pEvent::InvitationReceived(GroupDescriptor {
            interface: None,
            is_group_owner: false,
            network_name: None,
            network_id: persistent_network_id,
            owner: PeerDevice::new(owner),
            clients: vec![PeerDevice::new(client)],
            passphrase: None,
            frequency_mhz: operating_frequency,
            interface_address: None,
            client_ip_info: None,
        }))
    }

    pub fn on_invitation_result(&self, status: i32) -> Result<P2pEvent, DecodeError> {
        Ok(P2pEvent::InvitationResult(P2pStatus::from_code(status)?))
    }

    pub fn on_sta_authorized(
        &self,
        src_address: Option<&[u8]>,
        p2p_device_address: Option<&[u8]>,
    ) -> Result<P2pEvent, DecodeError> {
        let device =
            station(src_address, p2p_device_address).map_err(dropped("onStaAuthorized"))?;
        Ok(P2pEvent::StaAuthorized(device))
    }

    pub fn on_sta_deauthorized(
        &self,
        src_address: Option<&[u8]>,
        p2p_device_address: Option<&[u8]>,
    ) -> Result<P2pEvent, DecodeError> {
        let device =
            station(src_address, p2p_device_address).map_err(dropped("onStaDeauthorized"))?;
        Ok(P2pEvent::StaDeauthorized(device))
    }

    /// An absent TLV blob yields an empty response list.
    pub fn on_service_discovery_response(
        &self,
        src_address: Option<&[u8]>,
        tlvs: Option<&[u8]>,
    ) -> Result<P2pEvent, DecodeError> {
        let device = MacAddress::parse_required("src_address", src_address)
            .map_err(dropped("onServiceDiscoveryResponse"))?;
        let responses = service::parse_responses(device, tlvs.unwrap_or_default());
        Ok(P2pEvent::ServiceDiscoveryResponse(responses))
    }
}
