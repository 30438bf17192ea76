// ── Reference types ──
//
// Identity and vocabulary references shared by every record type.

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

/// Primary key of any inventory record. The store assigns it.
pub type ObjectId = Uuid;

/// Reference to an externally validated record (location, device type, role).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectRef {
    pub id: ObjectId,
    pub display: String,
}

impl ObjectRef {
    pub fn new(id: ObjectId, display: impl Into<String>) -> Self {
        Self {
            id,
            display: display.into(),
        }
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display)
    }
}

/// A lifecycle status resolved by name from the status vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StatusRef {
    pub id: ObjectId,
    pub name: String,
}

impl fmt::Display for StatusRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Which lookup a reference name is resolved against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum ReferenceKind {
    Location,
    DeviceType,
    Role,
}
