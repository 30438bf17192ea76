// ── Inventory records ──

use std::fmt;

use ipnet::IpNet;
use serde::{Deserialize, Serialize};

use super::reference::{ObjectId, ObjectRef, StatusRef};

/// Fields for a device about to be created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDevice {
    pub name: String,
    pub device_type: ObjectRef,
    pub role: ObjectRef,
    pub location: ObjectRef,
    pub status: StatusRef,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub id: ObjectId,
    pub name: String,
    pub device_type: ObjectRef,
    pub role: ObjectRef,
    pub location: ObjectRef,
    pub status: ObjectId,
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Interface on a device. Pre-existing; the core never creates one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interface {
    pub id: ObjectId,
    pub device: ObjectId,
    pub name: String,
}

impl fmt::Display for Interface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// A cable between exactly two interface endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub id: ObjectId,
    /// Termination A (interface id).
    pub a: ObjectId,
    /// Termination B (interface id).
    pub b: ObjectId,
    pub status: ObjectId,
}

/// A CIDR block: the parent pool or a 2-address leaf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressBlock {
    pub id: ObjectId,
    pub prefix: IpNet,
    pub description: String,
    pub status: ObjectId,
}

/// A single host address, annotated with the prefix length of its block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub id: ObjectId,
    pub address: IpNet,
    pub status: ObjectId,
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.address)
    }
}
