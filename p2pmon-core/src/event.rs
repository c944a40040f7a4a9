//! Decoded P2P events and the sink they are dispatched to.

use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};

use crate::address::MacAddress;
use crate::classify::{P2pStatus, ProvisionFailure, ProvisionOutcome, WpsSetup};
use crate::fields::WfdInfo;
use crate::service::ServiceResponse;
use crate::tlv::InformationElement;

/// Network id of a group that is not stored.
pub const NETWORK_ID_TEMPORARY: i32 = -1;
/// Network id of a group the supplicant persists.
pub const NETWORK_ID_PERSISTENT: i32 = -2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceStatus {
    Available,
    Unavailable,
}

/// A peer as seen in one event. Not cached across events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerDevice {
    pub address: MacAddress,
    pub name: String,
    pub primary_device_type: String,
    pub device_capability: u8,
    pub group_capability: i32,
    pub wps_config_methods: u16,
    pub status: DeviceStatus,
    pub wfd_info: Option<WfdInfo>,
    pub vendor_elements: Vec<InformationElement>,
}

impl PeerDevice {
    /// A device known only by address.
    pub fn new(address: MacAddress) -> Self {
        Self {
            address,
            name: String::new(),
            primary_device_type: String::new(),
            device_capability: 0,
            group_capability: 0,
            wps_config_methods: 0,
            status: DeviceStatus::Unavailable,
            wfd_info: None,
            vendor_elements: Vec::new(),
        }
    }
}

/// IP addressing handed to a client over EAPOL during group formation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientIpInfo {
    pub client: Ipv4Addr,
    pub group_owner: Ipv4Addr,
    pub mask: Ipv4Addr,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupDescriptor {
    /// Group interface; `None` for invitations.
    pub interface: Option<String>,
    pub is_group_owner: bool,
    /// SSID; `None` for invitations.
    pub network_name: Option<String>,
    pub network_id: i32,
    pub owner: PeerDevice,
    pub clients: Vec<PeerDevice>,
    /// `None` means an open network, distinct from an empty passphrase.
    pub passphrase: Option<String>,
    pub frequency_mhz: i32,
    pub interface_address: Option<MacAddress>,
    pub client_ip_info: Option<ClientIpInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemovedGroup {
    pub interface: String,
    pub is_group_owner: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoNegotiationRequest {
    pub device_address: MacAddress,
    pub wps_setup: WpsSetup,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisionDiscovery {
    pub device: PeerDevice,
    pub outcome: ProvisionOutcome,
    pub group_interface: Option<String>,
}

/// Every event the decoder can emit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum P2pEvent {
    DeviceFound(PeerDevice),
    DeviceLost(PeerDevice),
    FindStopped,
    GoNegotiationRequest(GoNegotiationRequest),
    GoNegotiationSuccess,
    GoNegotiationFailure(P2pStatus),
    GroupStarted(GroupDescriptor),
    GroupFormationSuccess,
    GroupFormationFailure(String),
    GroupRemoved(RemovedGroup),
    ProvisionDiscovery(ProvisionDiscovery),
    InvitationReceived(GroupDescriptor),
    InvitationResult(P2pStatus),
    StaAuthorized(PeerDevice),
    StaDeauthorized(PeerDevice),
    ServiceDiscoveryResponse(Vec<ServiceResponse>),
}

impl P2pEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            P2pEvent::DeviceFound(_) => "device-found",
            P2pEvent::DeviceLost(_) => "device-lost",
            P2pEvent::FindStopped => "find-stopped",
            P2pEvent::GoNegotiationRequest(_) => "go-negotiation-request",
            P2pEvent::GoNegotiationSuccess => "go-negotiation-success",
            P2pEvent::GoNegotiationFailure(_) => "go-negotiation-failure",
            P2pEvent::GroupStarted(_) => "group-started",
            P2pEvent::GroupFormationSuccess => "group-formation-success",
            P2pEvent::GroupFormationFailure(_) => "group-formation-failure",
            P2pEvent::GroupRemoved(_) => "group-removed",
            P2pEvent::ProvisionDiscovery(pd) => match pd.outcome {
                ProvisionOutcome::Failure(_) => "provision-discovery-failure",
                _ => "provision-discovery",
            },
            P2pEvent::InvitationReceived(_) => "invitation-received",
            P2pEvent::InvitationResult(_) => "invitation-result",
            P2pEvent::StaAuthorized(_) => "sta-authorized",
            P2pEvent::StaDeauthorized(_) => "sta-deauthorized",
            P2pEvent::ServiceDiscoveryResponse(_) => "service-discovery-response",
        }
    }
}

/// Receiver of decoded events: one method per event category.
pub trait EventSink {
    fn on_device_found(&mut self, iface: &str, device: PeerDevice);
    fn on_device_lost(&mut self, iface: &str, device: PeerDevice);
    fn on_find_stopped(&mut self, iface: &str);
    fn on_go_negotiation_request(&mut self, iface: &str, request: GoNegotiationRequest);
    fn on_go_negotiation_success(&mut self, iface: &str);
    fn on_go_negotiation_failure(&mut self, iface: &str, status: P2pStatus);
    fn on_group_started(&mut self, iface: &str, group: GroupDescriptor);
    fn on_group_formation_success(&mut self, iface: &str);
    fn on_group_formation_failure(&mut self, iface: &str, reason: String);
    fn on_group_removed(&mut self, iface: &str, group: RemovedGroup);
    /// Successful provision discovery (pin or push-button exchange).
    fn on_provision_discovery(&mut self, iface: &str, event: ProvisionDiscovery);
    fn on_provision_discovery_failure(
        &mut self,
        iface: &str,
        reason: ProvisionFailure,
        device: PeerDevice,
    );
    fn on_invitation_received(&mut self, iface: &str, group: GroupDescriptor);
    fn on_invitation_result(&mut self, iface: &str, status: P2pStatus);
    fn on_sta_authorized(&mut self, iface: &str, device: PeerDevice);
    fn on_sta_deauthorized(&mut self, iface: &str, device: PeerDevice);
    fn on_service_discovery_response(&mut self, iface: &str, responses: Vec<ServiceResponse>);
}

/// Hand `event` to exactly one sink method. Provision failures go to their own method.
pub fn dispatch(iface: &str, event: P2pEvent, sink: &mut dyn EventSink) {
    match event {
        P2pEvent::DeviceFound(d) => sink.on_device_found(iface, d),
        P2pEvent::DeviceLost(d) => sink.on_device_lost(iface, d),
        P2pEvent::FindStopped => sink.on_find_stopped(iface),
        P2pEvent::GoNegotiationRequest(r) => sink.on_go_negotiation_request(iface, r),
        P2pEvent::GoNegotiationSuccess => sink.on_go_negotiation_success(iface),
        P2pEvent::GoNegotiationFailure(s) => sink.on_go_negotiation_failure(iface, s),
        P2pEvent::GroupStarted(g) => sink.on_group_started(iface, g),
        P2pEvent::GroupFormationSuccess => sink.on_group_formation_success(iface),
        P2pEvent::GroupFormationFailure(r) => sink.on_group_formation_failure(iface, r),
        P2pEvent::GroupRemoved(g) => sink.on_group_removed(iface, g),
        P2pEvent::ProvisionDiscovery(pd) => match pd.outcome {
            ProvisionOutcome::Failure(reason) => {
                sink.on_provision_discovery_failure(iface, reason, pd.device)
            }
            _ => sink.on_provision_discovery(iface, pd),
        },
        P2pEvent::InvitationReceived(g) => sink.on_invitation_received(iface, g),
        P2pEvent::InvitationResult(s) => sink.on_invitation_result(iface, s),
        P2pEvent::StaAuthorized(d) => sink.on_sta_authorized(iface, d),
        P2pEvent::StaDeauthorized(d) => sink.on_sta_deauthorized(iface, d),
        P2pEvent::ServiceDiscoveryResponse(r) => sink.on_service_discovery_response(iface, r),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Records every sink call as (method, iface, event rebuilt from the arguments).
    #[derive(Default)]
    pub(crate) struct Recorder {
        pub calls: Vec<(&'static str, String, P2pEvent)>,
    }

    impl Recorder {
        fn push(&mut self, method: &'static str, iface: &str, event: P2pEvent) {
            self.calls.push((method, iface.to_string(), event));
        }

        pub fn methods(&self) -> Vec<&'static str> {
            self.calls.iter().map(|(m, _, _)| *m).collect()
        }
    }

    impl EventSink for Recorder {
        fn on_device_found(&mut self, iface: &str, device: PeerDevice) {
            self.push("device_found", iface, P2pEvent::DeviceFound(device));
        }
        fn on_device_lost(&mut self, iface: &str, device: PeerDevice) {
            self.push("device_lost", iface, P2pEvent::DeviceLost(device));
        }
        fn on_find_stopped(&mut self, iface: &str) {
            self.push("find_stopped", iface, P2pEvent::FindStopped);
        }
        fn on_go_negotiation_request(&mut self, iface: &str, request: GoNegotiationRequest) {
            self.push(
                "go_negotiation_request",
                iface,
                P2pEvent::GoNegotiationRequest(request),
            );
        }
        fn on_go_negotiation_success(&mut self, iface: &str) {
            self.push("go_negotiation_success", iface, P2pEvent::GoNegotiationSuccess);
        }
        fn on_go_negotiation_failure(&mut self, iface: &str, status: P2pStatus) {
            self.push(
                "go_negotiation_failure",
                iface,
                P2pEvent::GoNegotiationFailure(status),
            );
        }
        fn on_group_started(&mut self, iface: &str, group: GroupDescriptor) {
            self.push("group_started", iface, P2pEvent::GroupStarted(group));
        }
        fn on_group_formation_success(&mut self, iface: &str) {
            self.push("group_formation_success", iface, P2pEvent::GroupFormationSuccess);
        }
        fn on_group_formation_failure(&mut self, iface: &str, reason: String) {
            self.push(
                "group_formation_failure",
                iface,
                P2pEvent::GroupFormationFailure(reason),
            );
        }
        fn on_group_removed(&mut self, iface: &str, group: RemovedGroup) {
            self.push("group_removed", iface, P2pEvent::GroupRemoved(group));
        }
        fn on_provision_discovery(&mut self, iface: &str, event: ProvisionDiscovery) {
            self.push("provision_discovery", iface, P2pEvent::ProvisionDiscovery(event));
        }
        fn on_provision_discovery_failure(
            &mut self,
            iface: &str,
            reason: ProvisionFailure,
            device: PeerDevice,
        ) {
            self.push(
                "provision_discovery_failure",
                iface,
                P2pEvent::ProvisionDiscovery(ProvisionDiscovery {
                    device,
                    outcome: ProvisionOutcome::Failure(reason),
                    group_interface: None,
                }),
            );
        }
        fn on_invitation_received(&mut self, iface: &str, group: GroupDescriptor) {
            self.push("invitation_received", iface, P2pEvent::InvitationReceived(group));
        }
        fn on_invitation_result(&mut self, iface: &str, status: P2pStatus) {
            self.push("invitation_result", iface, P2pEvent::InvitationResult(status));
        }
        fn on_sta_authorized(&mut self, iface: &str, device: PeerDevice) {
            self.push("sta_authorized", iface, P2pEvent::StaAuthorized(device));
        }
        fn on_sta_deauthorized(&mut self, iface: &str, device: PeerDevice) {
            self.push("sta_deauthorized", iface, P2pEvent::StaDeauthorized(device));
        }
        fn on_service_discovery_response(&mut self, iface: &str, responses: Vec<ServiceResponse>) {
            self.push(
                "service_discovery_response",
                iface,
                P2pEvent::ServiceDiscoveryResponse(responses),
            );
        }
    }

    fn device() -> PeerDevice {
        PeerDevice::new(MacAddress::new([0, 1, 2, 3, 4, 5]))
    }

    #[test]
    fn provision_failure_routed_to_failure_method() {
        let mut rec = Recorder::default();
        let event = P2pEvent::ProvisionDiscovery(ProvisionDiscovery {
            device: device(),
            outcome: ProvisionOutcome::Failure(ProvisionFailure::Rejected),
            group_interface: None,
        });
        assert_eq!(event.kind(), "provision-discovery-failure");
        dispatch("p2p0", event, &mut rec);
        assert_eq!(rec.methods(), vec!["provision_discovery_failure"]);
        assert_eq!(rec.calls[0].1, "p2p0");
    }

    #[test]
    fn provision_success_routed_to_success_method() {
        let mut rec = Recorder::default();
        let event = P2pEvent::ProvisionDiscovery(ProvisionDiscovery {
            device: device(),
            outcome: ProvisionOutcome::ShowPin("1234".into()),
            group_interface: Some("p2p-p2p0-1".into()),
        });
        dispatch("p2p0", event.clone(), &mut rec);
        assert_eq!(rec.methods(), vec!["provision_discovery"]);
        assert_eq!(rec.calls[0].2, event);
    }

    #[test]
    fn one_call_per_event() {
        let mut rec = Recorder::default();
        let events = vec![
            P2pEvent::FindStopped,
            P2pEvent::GoNegotiationSuccess,
            P2pEvent::GroupFormationFailure("timeout".into()),
            P2pEvent::InvitationResult(P2pStatus::RejectedByUser),
            P2pEvent::StaDeauthorized(device()),
        ];
        let n = events.len();
        for e in events {
            dispatch("p2p0", e, &mut rec);
        }
        assert_eq!(rec.calls.len(), n);
        assert_eq!(
            rec.methods(),
            vec![
                "find_stopped",
                "go_negotiation_success",
                "group_formation_failure",
                "invitation_result",
                "sta_deauthorized"
            ]
        );
    }

    #[test]
    fn new_device_defaults() {
        let d = device();
        assert_eq!(d.status, DeviceStatus::Unavailable);
        assert!(d.name.is_empty());
        assert!(d.wfd_info.is_none());
        assert!(d.vendor_elements.is_empty());
    }
}
