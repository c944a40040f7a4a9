//! Event sinks for the daemon: structured log records or JSON lines.

use p2pmon_core::classify::ProvisionFailure;
use p2pmon_core::event::{GoNegotiationRequest, ProvisionDiscovery, RemovedGroup};
use p2pmon_core::{EventSink, GroupDescriptor, P2pStatus, PeerDevice, ServiceResponse};
use serde::Serialize;
use serde_json::json;

/// Emits every event as an `info` record.
#[derive(Debug, Default)]
pub struct LogSink;

impl EventSink for LogSink {
    fn on_device_found(&mut self, iface: &str, device: PeerDevice) {
        tracing::info!(
            iface,
            address = %device.address,
            name = %device.name,
            device_type = %device.primary_device_type,
            wfd = device.wfd_info.is_some(),
            vendor_elements = device.vendor_elements.len(),
            "device found"
        );
    }
    fn on_device_lost(&mut self, iface: &str, device: PeerDevice) {
        tracing::info!(iface, address = %device.address, "device lost");
    }
    fn on_find_stopped(&mut self, iface: &str) {
        tracing::info!(iface, "find stopped");
    }
    fn on_go_negotiation_request(&mut self, iface: &str, request: GoNegotiationRequest) {
        tracing::info!(iface, address = %request.device_address, setup = ?request.wps_setup, "go negotiation request");
    }
    fn on_go_negotiation_success(&mut self, iface: &str) {
        tracing::info!(iface, "go negotiation success");
    }
    fn on_go_negotiation_failure(&mut self, iface: &str, status: P2pStatus) {
        tracing::info!(iface, ?status, "go negotiation failure");
    }
    fn on_group_started(&mut self, iface: &str, group: GroupDescriptor) {
        tracing::info!(
            iface,
            group = group.interface.as_deref().unwrap_or_default(),
            ssid = group.network_name.as_deref().unwrap_or_default(),
            owner = %group.owner.address,
            is_group_owner = group.is_group_owner,
            network_id = group.network_id,
            frequency_mhz = group.frequency_mhz,
            client_ip = ?group.client_ip_info.map(|i| i.client),
            "group started"
        );
    }
    fn on_group_formation_success(&mut self, iface: &str) {
        tracing::info!(iface, "group formation success");
    }
    fn on_group_formation_failure(&mut self, iface: &str, reason: String) {
        tracing::info!(iface, %reason, "group formation failure");
    }
    fn on_group_removed(&mut self, iface: &str, group: RemovedGroup) {
        tracing::info!(iface, group = %group.interface, is_group_owner = group.is_group_owner, "group removed");
    }
    fn on_provision_discovery(&mut self, iface: &str, event: ProvisionDiscovery) {
        tracing::info!(iface, address = %event.device.address, outcome = ?event.outcome, "provision discovery");
    }
    fn on_provision_discovery_failure(
        &mut self,
        iface: &str,
        reason: ProvisionFailure,
        device: PeerDevice,
    ) {
        tracing::info!(iface, address = %device.address, ?reason, "provision discovery failure");
    }
    fn on_invitation_received(&mut self, iface: &str, group: GroupDescriptor) {
        tracing::info!(
            iface,
            owner = %group.owner.address,
            network_id = group.network_id,
            frequency_mhz = group.frequency_mhz,
            "invitation received"
        );
    }
    fn on_invitation_result(&mut self, iface: &str, status: P2pStatus) {
        tracing::info!(iface, ?status, "invitation result");
    }
    fn on_sta_authorized(&mut self, iface: &str, device: PeerDevice) {
        tracing::info!(iface, address = %device.address, "station authorized");
    }
    fn on_sta_deauthorized(&mut self, iface: &str, device: PeerDevice) {
        tracing::info!(iface, address = %device.address, "station deauthorized");
    }
    fn on_service_discovery_response(&mut self, iface: &str, responses: Vec<ServiceResponse>) {
        tracing::info!(iface, records = responses.len(), "service discovery response");
    }
}

/// Buffers one JSON object per event; the caller drains and writes them.
#[derive(Debug, Default)]
pub struct JsonSink {
    lines: Vec<String>,
}

impl JsonSink {
    fn push(&mut self, iface: &str, event: &str, data: impl Serialize) {
        let value = json!({ "iface": iface, "event": event, "data": data });
        self.lines.push(value.to_string());
    }

    pub fn drain(&mut self) -> std::vec::Drain<'_, String> {
        self.lines.drain(..)
    }
}

impl EventSink for JsonSink {
    fn on_device_found(&mut self, iface: &str, device: PeerDevice) {
        self.push(iface, "device-found", device);
    }
    fn on_device_lost(&mut self, iface: &str, device: PeerDevice) {
        self.push(iface, "device-lost", device);
    }
    fn on_find_stopped(&mut self, iface: &str) {
        self.push(iface, "find-stopped", ());
    }
    fn on_go_negotiation_request(&mut self, iface: &str, request: GoNegotiationRequest) {
        self.push(iface, "go-negotiation-request", request);
    }
    fn on_go_negotiation_success(&mut self, iface: &str) {
        self.push(iface, "go-negotiation-success", ());
    }
    fn on_go_negotiation_failure(&mut self, iface: &str, status: P2pStatus) {
        self.push(iface, "go-negotiation-failure", status);
    }
    fn on_group_started(&mut self, iface: &str, group: GroupDescriptor) {
        self.push(iface, "group-started", group);
    }
    fn on_group_formation_success(&mut self, iface: &str) {
        self.push(iface, "group-formation-success", ());
    }
    fn on_group_formation_failure(&mut self, iface: &str, reason: String) {
        self.push(iface, "group-formation-failure", reason);
    }
    fn on_group_removed(&mut self, iface: &str, group: RemovedGroup) {
        self.push(iface, "group-removed", group);
    }
    fn on_provision_discovery(&mut self, iface: &str, event: ProvisionDiscovery) {
        self.push(iface, "provision-discovery", event);
    }
    fn on_provision_discovery_failure(
        &mut self,
        iface: &str,
        reason: ProvisionFailure,
        device: PeerDevice,
    ) {
        self.push(
            iface,
            "provision-discovery-failure",
            json!({ "reason": reason, "device": device }),
        );
    }
    fn on_invitation_received(&mut self, iface: &str, group: GroupDescriptor) {
        self.push(iface, "invitation-received", group);
    }
    fn on_invitation_result(&mut self, iface: &str, status: P2pStatus) {
        self.push(iface, "invitation-result", status);
    }
    fn on_sta_authorized(&mut self, iface: &str, device: PeerDevice) {
        self.push(iface, "sta-authorized", device);
    }
    fn on_sta_deauthorized(&mut self, iface: &str, device: PeerDevice) {
        self.push(iface, "sta-deauthorized", device);
    }
    fn on_service_discovery_response(&mut self, iface: &str, responses: Vec<ServiceResponse>) {
        self.push(iface, "service-discovery-response", responses);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use p2pmon_core::{Callback, Decoder};

    #[test]
    fn json_lines_carry_iface_and_kind() {
        let decoder = Decoder::new("p2p0");
        let mut sink = JsonSink::default();
        decoder
            .deliver(
                &Callback::StaAuthorized {
                    src_address: Some(vec![0, 0x11, 0x22, 0x33, 0x44, 0x55]),
                    p2p_device_address: Some(vec![0; 6]),
                },
                &mut sink,
            )
            .unwrap();
        let lines: Vec<String> = sink.drain().collect();
        assert_eq!(lines.len(), 1);
        let v: serde_json::Value = serde_json::from_str(&lines[0]).unwrap();
        assert_eq!(v["iface"], "p2p0");
        assert_eq!(v["event"], "sta-authorized");
        assert_eq!(v["data"]["address"], "00:11:22:33:44:55");
        assert!(sink.drain().next().is_none());
    }

    #[test]
    fn dropped_callback_writes_nothing() {
        let decoder = Decoder::new("p2p0");
        let mut sink = JsonSink::default();
        decoder
            .deliver(
                &Callback::DeviceLost {
                    p2p_device_address: Some(vec![1]),
                },
                &mut sink,
            )
            .unwrap();
        assert_eq!(sink.drain().count(), 0);
    }
}
