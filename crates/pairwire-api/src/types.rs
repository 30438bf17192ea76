//! Wire types for the inventory REST API.
//!
//! Response types match the JSON returned by `/api/dcim/`, `/api/ipam/`
//! and `/api/extras/` endpoints. Write bodies (`*Create`) reference related
//! records by primary key.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ── Pagination ───────────────────────────────────────────────────────

/// Pagination envelope returned by every list endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub count: u64,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    pub results: Vec<T>,
}

/// Related record as embedded in a response (`{"id": ..., "url": ...}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NestedRef {
    pub id: Uuid,
    #[serde(default)]
    pub display: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

// ── Vocabulary ───────────────────────────────────────────────────────

/// Lifecycle status from `GET /api/extras/statuses/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub id: Uuid,
    pub name: String,
}

/// Whatever a location, device-type or role lookup returned.
///
/// Device types carry `model` instead of `name`; `display` is always set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedResponse {
    pub id: Uuid,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub display: Option<String>,
}

impl NamedResponse {
    /// Best human-readable label for this record.
    pub fn label(&self) -> String {
        self.display
            .clone()
            .or_else(|| self.name.clone())
            .or_else(|| self.model.clone())
            .unwrap_or_else(|| self.id.to_string())
    }
}

// ── Devices ──────────────────────────────────────────────────────────

/// Body for `POST /api/dcim/devices/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceCreate {
    pub name: String,
    pub device_type: Uuid,
    pub role: Uuid,
    pub location: Uuid,
    pub status: Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceResponse {
    pub id: Uuid,
    #[serde(default)]
    pub name: Option<String>,
    pub device_type: NestedRef,
    pub role: NestedRef,
    pub location: NestedRef,
    pub status: NestedRef,
}

/// Interface from `GET /api/dcim/interfaces/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceResponse {
    pub id: Uuid,
    pub name: String,
    pub device: NestedRef,
}

// ── Cables ───────────────────────────────────────────────────────────

/// Body for `POST /api/dcim/cables/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CableCreate {
    pub termination_a_type: String,
    pub termination_a_id: Uuid,
    pub termination_b_type: String,
    pub termination_b_id: Uuid,
    pub status: Uuid,
}

impl CableCreate {
    /// Content type of interface endpoints.
    pub const INTERFACE: &'static str = "dcim.interface";

    /// Cable between two interfaces.
    pub fn between_interfaces(a: Uuid, b: Uuid, status: Uuid) -> Self {
        Self {
            termination_a_type: Self::INTERFACE.into(),
            termination_a_id: a,
            termination_b_type: Self::INTERFACE.into(),
            termination_b_id: b,
            status,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CableResponse {
    pub id: Uuid,
    pub termination_a_id: Uuid,
    pub termination_b_id: Uuid,
    pub status: NestedRef,
}

// ── Prefixes ─────────────────────────────────────────────────────────

/// Body for `POST /api/ipam/prefixes/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrefixCreate {
    pub prefix: String,
    pub description: String,
    pub status: Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrefixResponse {
    pub id: Uuid,
    pub prefix: String,
    #[serde(default)]
    pub description: String,
    pub status: NestedRef,
}

// ── IP addresses ─────────────────────────────────────────────────────

/// Body for `POST /api/ipam/ip-addresses/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpAddressCreate {
    /// Host address with prefix length, e.g. `10.0.0.0/31`.
    pub address: String,
    pub status: Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpAddressResponse {
    pub id: Uuid,
    pub address: String,
    pub status: NestedRef,
}

/// Body for `POST /api/ipam/ip-address-to-interface/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpAddressToInterfaceCreate {
    pub ip_address: Uuid,
    pub interface: Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpAddressToInterfaceResponse {
    pub id: Uuid,
    pub ip_address: NestedRef,
    pub interface: NestedRef,
}
