#![allow(clippy::unwrap_used)]
// Integration tests for `InventoryClient` using wiremock.

use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use pairwire_api::types::{CableCreate, DeviceCreate, IpAddressCreate, PrefixCreate};
use pairwire_api::{Error, InventoryClient, TransportConfig};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, InventoryClient) {
    let server = MockServer::start().await;
    let client = InventoryClient::from_reqwest(&server.uri(), reqwest::Client::new()).unwrap();
    (server, client)
}

fn nested(id: Uuid) -> serde_json::Value {
    json!({ "id": id, "url": format!("http://inventory/api/x/{id}/") })
}

// ── Auth ────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_token_header_is_sent() {
    let server = MockServer::start().await;
    let token: secrecy::SecretString = "0123456789abcdef".to_string().into();
    let client =
        InventoryClient::from_token(&server.uri(), &token, &TransportConfig::default()).unwrap();

    Mock::given(method("GET"))
        .and(path("/api/extras/statuses/"))
        .and(header("authorization", "Token 0123456789abcdef"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 1,
            "next": null,
            "previous": null,
            "results": [{ "id": Uuid::new_v4(), "name": "Active" }]
        })))
        .mount(&server)
        .await;

    let status = client.find_status("Active").await.unwrap();
    assert_eq!(status.unwrap().name, "Active");
}

#[tokio::test]
async fn test_unauthorized_maps_to_invalid_token() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/extras/statuses/"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "detail": "Invalid token." })),
        )
        .mount(&server)
        .await;

    let result = client.find_status("Active").await;
    assert!(
        matches!(result, Err(Error::InvalidToken)),
        "expected InvalidToken, got: {result:?}"
    );
}

// ── Vocabulary ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_find_status_missing() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/extras/statuses/"))
        .and(query_param("name", "Connected"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 0, "next": null, "previous": null, "results": []
        })))
        .mount(&server)
        .await;

    assert!(client.find_status("Connected").await.unwrap().is_none());
}

#[tokio::test]
async fn test_find_device_type_by_model() {
    let (server, client) = setup().await;
    let id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/api/dcim/device-types/"))
        .and(query_param("model", "DCS-7050"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 1, "next": null, "previous": null,
            "results": [{ "id": id, "model": "DCS-7050", "display": "Arista DCS-7050" }]
        })))
        .mount(&server)
        .await;

    let dt = client.find_device_type("DCS-7050").await.unwrap().unwrap();
    assert_eq!(dt.id, id);
    assert_eq!(dt.label(), "Arista DCS-7050");
}

// ── Devices ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_create_device() {
    let (server, client) = setup().await;

    let (dt, role, loc, status) = (
        Uuid::new_v4(),
        Uuid::new_v4(),
        Uuid::new_v4(),
        Uuid::new_v4(),
    );
    let device_id = Uuid::new_v4();
    let body = DeviceCreate {
        name: "switch1-a1b2c3".into(),
        device_type: dt,
        role,
        location: loc,
        status,
    };

    Mock::given(method("POST"))
        .and(path("/api/dcim/devices/"))
        .and(body_json(&body))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": device_id,
            "name": "switch1-a1b2c3",
            "device_type": nested(dt),
            "role": nested(role),
            "location": nested(loc),
            "status": nested(status),
        })))
        .mount(&server)
        .await;

    let created = client.create_device(&body).await.unwrap();
    assert_eq!(created.id, device_id);
    assert_eq!(created.name.as_deref(), Some("switch1-a1b2c3"));
    assert_eq!(created.status.id, status);
}

#[tokio::test]
async fn test_duplicate_device_name_is_conflict() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/dcim/devices/"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "__all__": ["Device with this Name and Location already exists."]
        })))
        .mount(&server)
        .await;

    let body = DeviceCreate {
        name: "switch1-a1b2c3".into(),
        device_type: Uuid::nil(),
        role: Uuid::nil(),
        location: Uuid::nil(),
        status: Uuid::nil(),
    };
    let err = client.create_device(&body).await.unwrap_err();
    assert!(err.is_conflict(), "expected conflict, got: {err:?}");
    assert_eq!(
        err.to_string(),
        "Inventory API error (HTTP 400): Device with this Name and Location already exists."
    );
}

// ── Interfaces (pagination) ─────────────────────────────────────────

#[tokio::test]
async fn test_list_interfaces_walks_pages() {
    let (server, client) = setup().await;
    let device = Uuid::new_v4();

    let first: Vec<_> = (0..250)
        .map(|i| json!({ "id": Uuid::new_v4(), "name": format!("eth{i}"), "device": nested(device) }))
        .collect();

    Mock::given(method("GET"))
        .and(path("/api/dcim/interfaces/"))
        .and(query_param("device_id", device.to_string()))
        .and(query_param("offset", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 251,
            "next": "http://inventory/api/dcim/interfaces/?offset=250",
            "previous": null,
            "results": first,
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/dcim/interfaces/"))
        .and(query_param("device_id", device.to_string()))
        .and(query_param("offset", "250"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 251,
            "next": null,
            "previous": "http://inventory/api/dcim/interfaces/?offset=0",
            "results": [{ "id": Uuid::new_v4(), "name": "mgmt0", "device": nested(device) }],
        })))
        .mount(&server)
        .await;

    let interfaces = client.list_interfaces(&device).await.unwrap();
    assert_eq!(interfaces.len(), 251);
    assert_eq!(interfaces[250].name, "mgmt0");
}

// ── Cables ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_cable_on_occupied_endpoint_is_conflict() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/dcim/cables/"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "termination_a_id": ["Interface eth0 already has a cable attached (#4)"]
        })))
        .mount(&server)
        .await;

    let body = CableCreate::between_interfaces(Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
    let err = client.create_cable(&body).await.unwrap_err();
    assert!(err.is_conflict());
}

// ── Prefixes ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_find_prefix_requires_exact_match() {
    let (server, client) = setup().await;

    // The store returns a containing prefix for a loose query.
    Mock::given(method("GET"))
        .and(path("/api/ipam/prefixes/"))
        .and(query_param("prefix", "10.0.0.0/31"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 1, "next": null, "previous": null,
            "results": [{
                "id": Uuid::new_v4(),
                "prefix": "10.0.0.0/8",
                "description": "",
                "status": nested(Uuid::new_v4()),
            }]
        })))
        .mount(&server)
        .await;

    assert!(client.find_prefix("10.0.0.0/31").await.unwrap().is_none());
}

#[tokio::test]
async fn test_create_prefix_validation_error() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/ipam/prefixes/"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "prefix": ["10.0.0.1/8 is not a valid prefix. Did you mean 10.0.0.0/8?"]
        })))
        .mount(&server)
        .await;

    let err = client
        .create_prefix(&PrefixCreate {
            prefix: "10.0.0.1/8".into(),
            description: String::new(),
            status: Uuid::new_v4(),
        })
        .await
        .unwrap_err();
    assert!(err.is_validation(), "expected validation error, got: {err:?}");
}

// ── IP addresses ────────────────────────────────────────────────────

#[tokio::test]
async fn test_ip_address_exists_uses_count() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/ipam/ip-addresses/"))
        .and(query_param("address", "10.0.0.1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 1, "next": null, "previous": null,
            "results": [{ "id": Uuid::new_v4(), "address": "10.0.0.1/24", "status": nested(Uuid::new_v4()) }]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/ipam/ip-addresses/"))
        .and(query_param("address", "10.0.0.2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 0, "next": null, "previous": null, "results": []
        })))
        .mount(&server)
        .await;

    assert!(client.ip_address_exists("10.0.0.1").await.unwrap());
    assert!(!client.ip_address_exists("10.0.0.2").await.unwrap());
}

#[tokio::test]
async fn test_create_and_assign_ip_address() {
    let (server, client) = setup().await;
    let (status, ip_id, iface) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());

    Mock::given(method("POST"))
        .and(path("/api/ipam/ip-addresses/"))
        .and(body_json(json!({ "address": "10.0.0.0/31", "status": status })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": ip_id, "address": "10.0.0.0/31", "status": nested(status)
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/ipam/ip-address-to-interface/"))
        .and(body_json(json!({ "ip_address": ip_id, "interface": iface })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": Uuid::new_v4(), "ip_address": nested(ip_id), "interface": nested(iface)
        })))
        .expect(1)
        .mount(&server)
        .await;

    let ip = client
        .create_ip_address(&IpAddressCreate {
            address: "10.0.0.0/31".into(),
            status,
        })
        .await
        .unwrap();
    assert_eq!(ip.id, ip_id);

    let binding = client.assign_ip_address(ip.id, iface).await.unwrap();
    assert_eq!(binding.interface.id, iface);
}

#[tokio::test]
async fn test_undecodable_body_is_deserialization_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/ipam/ip-addresses/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy login</html>"))
        .mount(&server)
        .await;

    let result = client.list_ip_addresses_within("10.0.0.0/8").await;
    assert!(
        matches!(result, Err(Error::Deserialization { .. })),
        "expected Deserialization error, got: {result:?}"
    );
}
