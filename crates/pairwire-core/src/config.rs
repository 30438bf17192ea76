// ── Runtime configuration ──
//
// These types describe *how* to reach the inventory and *what* to allocate.
// They carry credential data and allocation settings, but never touch disk.
// The CLI constructs them (via pairwire-config) and hands them in.

use std::net::Ipv4Addr;
use std::time::Duration;

use ipnet::{IpNet, Ipv4Net};
use secrecy::SecretString;
use url::Url;

/// Pool every transit block is carved from unless configured otherwise.
pub const DEFAULT_POOL: Ipv4Net = Ipv4Net::new_assert(Ipv4Addr::new(10, 0, 0, 0), 8);

pub const DEFAULT_PARENT_DESCRIPTION: &str = "Parent prefix for switch interconnections";
pub const DEFAULT_ACTIVE_STATUS: &str = "Active";
pub const DEFAULT_LINK_STATUS: &str = "Connected";
pub const DEFAULT_NAME_PREFIX: &str = "switch";

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict). Default.
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(std::path::PathBuf),
    /// Skip verification (self-signed lab inventories).
    DangerAcceptInvalid,
}

/// How to reach the inventory REST API.
///
/// Built by the CLI, passed to `RestGateway` -- core never reads config files.
#[derive(Debug, Clone)]
pub struct InventoryConfig {
    /// Inventory root URL (e.g., `https://nautobot.example.net`).
    pub url: Url,
    /// API token, sent as `Authorization: Token <token>`.
    pub token: SecretString,
    /// TLS verification strategy.
    pub tls: TlsVerification,
    /// Request timeout.
    pub timeout: Duration,
}

/// What a provisioning run allocates and how it labels the result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocationConfig {
    /// The single pool transit blocks are carved from.
    pub pool: IpNet,
    /// Description given to the pool block if it has to be created.
    pub parent_description: String,
    /// Description given to a new leaf block. `None` derives one from the
    /// leaf prefix length.
    pub leaf_description: Option<String>,
    /// Status applied to devices, blocks, and addresses.
    pub active_status: String,
    /// Status applied to the link.
    pub link_status: String,
    /// Device names are `<prefix>1-<hex>` and `<prefix>2-<hex>`.
    pub name_prefix: String,
}

impl Default for AllocationConfig {
    fn default() -> Self {
        Self {
            pool: IpNet::V4(DEFAULT_POOL),
            parent_description: DEFAULT_PARENT_DESCRIPTION.into(),
            leaf_description: None,
            active_status: DEFAULT_ACTIVE_STATUS.into(),
            link_status: DEFAULT_LINK_STATUS.into(),
            name_prefix: DEFAULT_NAME_PREFIX.into(),
        }
    }
}

impl AllocationConfig {
    /// Description for a leaf block of the given prefix length.
    pub fn leaf_description_for(&self, leaf_prefix_len: u8) -> String {
        self.leaf_description.clone().unwrap_or_else(|| {
            format!("First available /{leaf_prefix_len} subnet for switch interconnection")
        })
    }
}
