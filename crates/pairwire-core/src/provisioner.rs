// ── Provisioner ──
//
// Runs the ordered workflow: device pair, first interfaces, link, pool
// block, free-pair search, leaf block, addresses, summary. Every step is
// fatal on error. Records created before a failure stay in the inventory
// and are reported through `ProvisionError::committed`.

use std::sync::Arc;

use ipnet::IpNet;
use serde::Serialize;
use strum::Display;
use thiserror::Error;
use tracing::{Instrument, info, info_span, warn};

use crate::allocator::{Allocator, TRANSIT_BLOCK_SIZE};
use crate::config::AllocationConfig;
use crate::error::CoreError;
use crate::gateway::InventoryGateway;
use crate::model::{Address, Device, Interface, Link, NewDevice, ObjectId, ObjectRef, StatusRef};
use crate::naming;
use crate::summary::{Summary, SummaryRow};

/// Step-level events go out at `debug` when the run asked for it and at
/// `trace` otherwise.
macro_rules! detail {
    ($enabled:expr, $($arg:tt)+) => {
        if $enabled {
            tracing::debug!($($arg)+);
        } else {
            tracing::trace!($($arg)+);
        }
    };
}

// ── Committed-record ledger ─────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum RecordKind {
    Device,
    Link,
    AddressBlock,
    Address,
}

/// A record a run created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Committed {
    pub kind: RecordKind,
    pub id: ObjectId,
    pub display: String,
}

/// Records created so far, in creation order.
#[derive(Debug, Default)]
pub struct Ledger {
    records: Vec<Committed>,
}

impl Ledger {
    pub fn record(&mut self, kind: RecordKind, id: ObjectId, display: impl Into<String>) {
        let label: String = display.into();
        info!(%kind, %id, display = %label, "created");
        self.records.push(Committed {
            kind,
            id,
            display: label,
        });
    }

    pub fn records(&self) -> &[Committed] {
        &self.records
    }

    pub fn into_records(self) -> Vec<Committed> {
        self.records
    }
}

/// A failed run: the first error, plus everything created before it.
#[derive(Debug, Error)]
#[error("{source}")]
pub struct ProvisionError {
    pub source: CoreError,
    pub committed: Vec<Committed>,
}

/// Resolved inputs of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionRequest {
    pub location: ObjectRef,
    pub device_type: ObjectRef,
    pub role: ObjectRef,
    /// Emit step-level events at `debug` instead of `trace`.
    pub debug: bool,
}

pub struct Provisioner {
    gateway: Arc<dyn InventoryGateway>,
    allocator: Allocator,
    config: AllocationConfig,
}

impl Provisioner {
    pub fn new(gateway: Arc<dyn InventoryGateway>, config: AllocationConfig) -> Self {
        Self {
            allocator: Allocator::new(Arc::clone(&gateway)),
            gateway,
            config,
        }
    }

    async fn resolve_status(&self, name: &str) -> Result<StatusRef, CoreError> {
        self.gateway
            .get_status(name)
            .await?
            .ok_or_else(|| CoreError::Configuration {
                message: format!("status {name:?} does not exist in the inventory"),
            })
    }

    /// Create two devices with fresh names and identical attributes.
    pub async fn create_device_pair(
        &self,
        location: &ObjectRef,
        device_type: &ObjectRef,
        role: &ObjectRef,
        status: &StatusRef,
        ledger: &mut Ledger,
    ) -> Result<(Device, Device), CoreError> {
        let (first, second) = naming::device_pair_names(&self.config.name_prefix);
        let mut created = Vec::with_capacity(2);
        for name in [first, second] {
            let device = self
                .gateway
                .create_device(&NewDevice {
                    name,
                    device_type: device_type.clone(),
                    role: role.clone(),
                    location: location.clone(),
                    status: status.clone(),
                })
                .await?;
            ledger.record(RecordKind::Device, device.id, device.name.clone());
            created.push(device);
        }
        let second = created.pop();
        let first = created.pop();
        first
            .zip(second)
            .ok_or_else(|| CoreError::Internal("device pair incomplete".into()))
    }

    /// The device's interface that sorts first by name.
    pub async fn resolve_first_interface(&self, device: &Device) -> Result<Interface, CoreError> {
        self.gateway
            .list_interfaces(device)
            .await?
            .into_iter()
            .min_by(|a, b| a.name.cmp(&b.name))
            .ok_or_else(|| CoreError::MissingInterface {
                device: device.name.clone(),
            })
    }

    pub async fn connect(
        &self,
        a: &Interface,
        b: &Interface,
        status: &StatusRef,
    ) -> Result<Link, CoreError> {
        self.gateway.create_link(a, b, status).await
    }

    /// Create `value` and bind it to `interface`.
    pub async fn bind_address(
        &self,
        value: IpNet,
        status: &StatusRef,
        interface: &Interface,
        ledger: &mut Ledger,
    ) -> Result<Address, CoreError> {
        let address = self.gateway.create_address(value, status).await?;
        ledger.record(RecordKind::Address, address.id, address.to_string());
        self.gateway
            .bind_address_to_interface(&address, interface)
            .await?;
        Ok(address)
    }

    /// Run the whole workflow once.
    pub async fn run(&self, request: &ProvisionRequest) -> Result<Summary, ProvisionError> {
        let span = info_span!(
            "provision",
            location = %request.location,
            device_type = %request.device_type,
            role = %request.role,
        );
        let mut ledger = Ledger::default();

        match self.execute(request, &mut ledger).instrument(span).await {
            Ok(summary) => Ok(summary),
            Err(source) => {
                for record in ledger.records() {
                    warn!(
                        kind = %record.kind,
                        id = %record.id,
                        display = %record.display,
                        "left in inventory by failed run"
                    );
                }
                Err(ProvisionError {
                    source,
                    committed: ledger.into_records(),
                })
            }
        }
    }

    async fn execute(
        &self,
        request: &ProvisionRequest,
        ledger: &mut Ledger,
    ) -> Result<Summary, CoreError> {
        let verbose = request.debug;

        let active = self.resolve_status(&self.config.active_status).await?;
        let link_status = self.resolve_status(&self.config.link_status).await?;
        detail!(verbose, active = %active, link = %link_status, "statuses resolved");

        let (first, second) = self
            .create_device_pair(
                &request.location,
                &request.device_type,
                &request.role,
                &active,
                ledger,
            )
            .await?;

        let first_iface = self.resolve_first_interface(&first).await?;
        let second_iface = self.resolve_first_interface(&second).await?;
        detail!(
            verbose,
            a = %format_args!("{first}:{first_iface}"),
            b = %format_args!("{second}:{second_iface}"),
            "interfaces resolved"
        );

        let link = self.connect(&first_iface, &second_iface, &link_status).await?;
        ledger.record(
            RecordKind::Link,
            link.id,
            format!("{first}:{first_iface} <-> {second}:{second_iface}"),
        );

        let pool = self.config.pool;
        let parent = self
            .allocator
            .ensure_parent_block(pool, &self.config.parent_description, &active)
            .await?;
        if parent.created {
            ledger.record(RecordKind::AddressBlock, parent.block.id, pool.to_string());
        }
        detail!(verbose, %pool, created = parent.created, "parent block ready");

        let pair = self
            .allocator
            .find_first_free_pair(pool, TRANSIT_BLOCK_SIZE)
            .await?;
        detail!(verbose, subnet = %pair.subnet, a = %pair.a, b = %pair.b, "transit block chosen");

        let leaf_description = self.config.leaf_description_for(pair.subnet.prefix_len());
        let leaf = self
            .allocator
            .ensure_leaf_block(pair.subnet, &leaf_description, &active)
            .await?;
        if leaf.created {
            ledger.record(
                RecordKind::AddressBlock,
                leaf.block.id,
                pair.subnet.to_string(),
            );
        }

        self.bind_address(pair.a, &active, &first_iface, ledger)
            .await?;
        self.bind_address(pair.b, &active, &second_iface, ledger)
            .await?;
        detail!(verbose, "addresses bound");

        let mut rows = Vec::with_capacity(2);
        for device in [&first, &second] {
            rows.push(self.summary_row(device).await?);
        }
        Ok(Summary { rows })
    }

    /// Re-read the device's first interface and its first bound address.
    async fn summary_row(&self, device: &Device) -> Result<SummaryRow, CoreError> {
        let iface = self.resolve_first_interface(device).await?;
        let address = self
            .gateway
            .list_interface_addresses(&iface)
            .await?
            .into_iter()
            .next()
            .map(|a| a.to_string());
        Ok(SummaryRow::new(&device.name, &iface.name, address))
    }
}
