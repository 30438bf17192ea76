#![allow(clippy::unwrap_used)]
// A full provisioning run through `RestGateway` against a mocked inventory.

use std::sync::Arc;

use serde_json::{Value, json};
use uuid::Uuid;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use pairwire_api::InventoryClient;
use pairwire_core::{
    AllocationConfig, CoreError, InventoryGateway, ObjectRef, ProvisionRequest, Provisioner,
    RecordKind, RestGateway,
};

// ── Helpers ─────────────────────────────────────────────────────────

fn page(results: Vec<Value>) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "count": results.len(),
        "next": null,
        "previous": null,
        "results": results,
    }))
}

fn nested(id: Uuid) -> Value {
    json!({ "id": id })
}

struct Ids {
    active: Uuid,
    connected: Uuid,
    devices: [Uuid; 2],
    interfaces: [Uuid; 2],
    addresses: [Uuid; 2],
}

impl Ids {
    fn new() -> Self {
        Self {
            active: Uuid::new_v4(),
            connected: Uuid::new_v4(),
            devices: [Uuid::new_v4(), Uuid::new_v4()],
            interfaces: [Uuid::new_v4(), Uuid::new_v4()],
            addresses: [Uuid::new_v4(), Uuid::new_v4()],
        }
    }
}

fn request() -> ProvisionRequest {
    ProvisionRequest {
        location: ObjectRef::new(Uuid::new_v4(), "DC1"),
        device_type: ObjectRef::new(Uuid::new_v4(), "DCS-7050SX3"),
        role: ObjectRef::new(Uuid::new_v4(), "leaf"),
        debug: true,
    }
}

async fn setup() -> (MockServer, Arc<RestGateway>) {
    let server = MockServer::start().await;
    let client = InventoryClient::from_reqwest(&server.uri(), reqwest::Client::new()).unwrap();
    (server, Arc::new(RestGateway::from_client(client)))
}

/// Mount everything up to and including the cable.
async fn mount_devices_and_link(server: &MockServer, ids: &Ids) {
    for (name, id) in [("Active", ids.active), ("Connected", ids.connected)] {
        Mock::given(method("GET"))
            .and(path("/api/extras/statuses/"))
            .and(query_param("name", name))
            .respond_with(page(vec![json!({ "id": id, "name": name })]))
            .mount(server)
            .await;
    }

    for device in ids.devices {
        Mock::given(method("POST"))
            .and(path("/api/dcim/devices/"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "id": device,
                "device_type": nested(Uuid::new_v4()),
                "role": nested(Uuid::new_v4()),
                "location": nested(Uuid::new_v4()),
                "status": nested(ids.active),
            })))
            .up_to_n_times(1)
            .expect(1)
            .mount(server)
            .await;
    }

    for (device, iface) in ids.devices.into_iter().zip(ids.interfaces) {
        Mock::given(method("GET"))
            .and(path("/api/dcim/interfaces/"))
            .and(query_param("device_id", device.to_string().as_str()))
            .respond_with(page(vec![
                json!({ "id": Uuid::new_v4(), "name": "Ethernet2", "device": nested(device) }),
                json!({ "id": iface, "name": "Ethernet1", "device": nested(device) }),
            ]))
            .mount(server)
            .await;
    }

    Mock::given(method("POST"))
        .and(path("/api/dcim/cables/"))
        .and(body_partial_json(json!({
            "termination_a_type": "dcim.interface",
            "termination_a_id": ids.interfaces[0],
            "termination_b_id": ids.interfaces[1],
            "status": ids.connected,
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": Uuid::new_v4(),
            "termination_a_id": ids.interfaces[0],
            "termination_b_id": ids.interfaces[1],
            "status": nested(ids.connected),
        })))
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_prefix(server: &MockServer, cidr: &str, status: Uuid) {
    Mock::given(method("GET"))
        .and(path("/api/ipam/prefixes/"))
        .and(query_param("prefix", cidr))
        .respond_with(page(vec![]))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/ipam/prefixes/"))
        .and(body_partial_json(json!({ "prefix": cidr })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": Uuid::new_v4(),
            "prefix": cidr,
            "description": "",
            "status": nested(status),
        })))
        .expect(1)
        .mount(server)
        .await;
}

// ── Tests ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_run_over_rest_skips_assigned_block() {
    let (server, gateway) = setup().await;
    let ids = Ids::new();
    mount_devices_and_link(&server, &ids).await;
    mount_prefix(&server, "10.0.0.0/8", ids.active).await;
    mount_prefix(&server, "10.0.0.2/31", ids.active).await;

    // 10.0.0.1 sits in a wider block but still occupies the first /31.
    Mock::given(method("GET"))
        .and(path("/api/ipam/ip-addresses/"))
        .and(query_param("prefix", "10.0.0.0/8"))
        .respond_with(page(vec![json!({
            "id": Uuid::new_v4(),
            "address": "10.0.0.1/24",
            "status": nested(ids.active),
        })]))
        .mount(&server)
        .await;

    for host in ["10.0.0.2", "10.0.0.3"] {
        Mock::given(method("GET"))
            .and(path("/api/ipam/ip-addresses/"))
            .and(query_param("address", host))
            .respond_with(page(vec![]))
            .mount(&server)
            .await;
    }

    for (i, addr) in ["10.0.0.2/31", "10.0.0.3/31"].into_iter().enumerate() {
        Mock::given(method("POST"))
            .and(path("/api/ipam/ip-addresses/"))
            .and(body_partial_json(json!({ "address": addr })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "id": ids.addresses[i],
                "address": addr,
                "status": nested(ids.active),
            })))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/api/ipam/ip-address-to-interface/"))
            .and(body_partial_json(json!({
                "ip_address": ids.addresses[i],
                "interface": ids.interfaces[i],
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "id": Uuid::new_v4(),
                "ip_address": nested(ids.addresses[i]),
                "interface": nested(ids.interfaces[i]),
            })))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/api/ipam/ip-addresses/"))
            .and(query_param("interfaces", ids.interfaces[i].to_string().as_str()))
            .respond_with(page(vec![json!({
                "id": ids.addresses[i],
                "address": addr,
                "status": nested(ids.active),
            })]))
            .mount(&server)
            .await;
    }

    let provisioner = Provisioner::new(gateway, AllocationConfig::default());
    let summary = provisioner.run(&request()).await.unwrap();

    let csv = summary.to_csv();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines[0], "device,interface,ip_address");
    assert!(lines[1].ends_with(",Ethernet1,10.0.0.2/31"), "{csv}");
    assert!(lines[2].ends_with(",Ethernet1,10.0.0.3/31"), "{csv}");
}

#[tokio::test]
async fn test_duplicate_device_is_a_conflict() {
    let (server, gateway) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/extras/statuses/"))
        .and(query_param("name", "Active"))
        .respond_with(page(vec![json!({ "id": Uuid::new_v4(), "name": "Active" })]))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/extras/statuses/"))
        .and(query_param("name", "Connected"))
        .respond_with(page(vec![json!({ "id": Uuid::new_v4(), "name": "Connected" })]))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/dcim/devices/"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "__all__": ["Device with this Location, Tenant and Name already exists."]
        })))
        .mount(&server)
        .await;

    let err = Provisioner::new(gateway, AllocationConfig::default())
        .run(&request())
        .await
        .unwrap_err();

    assert!(
        matches!(err.source, CoreError::Conflict { .. }),
        "expected Conflict, got: {:?}",
        err.source
    );
    assert!(err.committed.is_empty());
}

#[tokio::test]
async fn test_cable_rejection_reports_devices_as_committed() {
    let (server, gateway) = setup().await;
    let ids = Ids::new();

    for (name, id) in [("Active", ids.active), ("Connected", ids.connected)] {
        Mock::given(method("GET"))
            .and(path("/api/extras/statuses/"))
            .and(query_param("name", name))
            .respond_with(page(vec![json!({ "id": id, "name": name })]))
            .mount(&server)
            .await;
    }
    for device in ids.devices {
        Mock::given(method("POST"))
            .and(path("/api/dcim/devices/"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "id": device,
                "device_type": nested(Uuid::new_v4()),
                "role": nested(Uuid::new_v4()),
                "location": nested(Uuid::new_v4()),
                "status": nested(ids.active),
            })))
            .up_to_n_times(1)
            .mount(&server)
            .await;
    }
    Mock::given(method("GET"))
        .and(path("/api/dcim/interfaces/"))
        .respond_with(page(vec![json!({
            "id": Uuid::new_v4(),
            "name": "Ethernet1",
            "device": nested(Uuid::new_v4()),
        })]))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/dcim/cables/"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "termination_a_id": ["Interface Ethernet1 already has a cable attached"]
        })))
        .mount(&server)
        .await;

    let err = Provisioner::new(gateway, AllocationConfig::default())
        .run(&request())
        .await
        .unwrap_err();

    assert!(matches!(err.source, CoreError::Conflict { .. }));
    let committed: Vec<_> = err.committed.iter().map(|c| (c.kind, c.id)).collect();
    assert_eq!(
        committed,
        [
            (RecordKind::Device, ids.devices[0]),
            (RecordKind::Device, ids.devices[1]),
        ]
    );
}

#[tokio::test]
async fn test_reference_lookup_uses_device_type_model() {
    let (server, gateway) = setup().await;
    let id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/api/dcim/device-types/"))
        .and(query_param("model", "DCS-7050SX3"))
        .respond_with(page(vec![json!({ "id": id, "model": "DCS-7050SX3" })]))
        .mount(&server)
        .await;

    let found = gateway
        .find_reference(pairwire_core::ReferenceKind::DeviceType, "DCS-7050SX3")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found, ObjectRef::new(id, "DCS-7050SX3"));
}
