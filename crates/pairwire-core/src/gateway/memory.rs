// In-process gateway with the same uniqueness rules as the real store.
//
// Each operation holds the state lock for its whole check-then-insert,
// so concurrent runs see the same conflicts they would see server-side.

use std::collections::HashMap;
use std::net::IpAddr;

use async_trait::async_trait;
use ipnet::IpNet;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::InventoryGateway;
use crate::error::CoreError;
use crate::model::{
    Address, AddressBlock, Device, Interface, Link, NewDevice, ObjectId, ObjectRef,
    ReferenceKind, StatusRef,
};

/// Point-in-time copy of every record the inventory holds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InventorySnapshot {
    pub devices: Vec<Device>,
    pub interfaces: Vec<Interface>,
    pub links: Vec<Link>,
    pub blocks: Vec<AddressBlock>,
    pub addresses: Vec<Address>,
    /// `(address id, interface id)` in binding order.
    pub bindings: Vec<(ObjectId, ObjectId)>,
}

impl InventorySnapshot {
    pub fn block(&self, cidr: &str) -> Option<&AddressBlock> {
        self.blocks.iter().find(|b| b.prefix.to_string() == cidr)
    }

    /// Addresses bound to the interface, in binding order.
    pub fn addresses_on(&self, interface: ObjectId) -> Vec<&Address> {
        self.bindings
            .iter()
            .filter(|(_, iface)| *iface == interface)
            .filter_map(|(addr, _)| self.addresses.iter().find(|a| a.id == *addr))
            .collect()
    }
}

#[derive(Default)]
struct State {
    statuses: Vec<StatusRef>,
    references: HashMap<(ReferenceKind, String), ObjectRef>,
    /// Interface names instantiated on every device of a type.
    interface_templates: HashMap<ObjectId, Vec<String>>,
    records: InventorySnapshot,
}

impl State {
    fn knows_status(&self, id: ObjectId) -> bool {
        self.statuses.iter().any(|s| s.id == id)
    }

    fn knows_reference(&self, kind: ReferenceKind, id: ObjectId) -> bool {
        self.references
            .iter()
            .any(|((k, _), r)| *k == kind && r.id == id)
    }

    fn require_status(&self, status: &StatusRef) -> Result<(), CoreError> {
        if self.knows_status(status.id) {
            Ok(())
        } else {
            Err(CoreError::Validation {
                message: format!("status: unknown status {}", status.name),
            })
        }
    }

    fn interface(&self, id: ObjectId) -> Result<&Interface, CoreError> {
        self.records
            .interfaces
            .iter()
            .find(|i| i.id == id)
            .ok_or_else(|| CoreError::Validation {
                message: format!("interface: unknown interface {id}"),
            })
    }
}

/// In-memory inventory.
///
/// Seed it with the builder methods, then hand it to a `Provisioner` as
/// `Arc<MemoryInventory>`; keep a clone of the `Arc` to inspect the
/// result with [`snapshot`](Self::snapshot).
#[derive(Default)]
pub struct MemoryInventory {
    state: Mutex<State>,
}

impl MemoryInventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a lifecycle status.
    pub fn with_status(mut self, name: &str) -> Self {
        self.state.get_mut().statuses.push(StatusRef {
            id: Uuid::new_v4(),
            name: name.to_owned(),
        });
        self
    }

    /// Register a location or role.
    pub fn with_reference(mut self, kind: ReferenceKind, name: &str) -> Self {
        self.state.get_mut().references.insert(
            (kind, name.to_owned()),
            ObjectRef::new(Uuid::new_v4(), name),
        );
        self
    }

    /// Register a device type whose devices come up with these interfaces.
    pub fn with_device_type(mut self, model: &str, interfaces: &[&str]) -> Self {
        let id = Uuid::new_v4();
        let state = self.state.get_mut();
        state.references.insert(
            (ReferenceKind::DeviceType, model.to_owned()),
            ObjectRef::new(id, model),
        );
        state
            .interface_templates
            .insert(id, interfaces.iter().map(|s| (*s).to_owned()).collect());
        self
    }

    /// Record an address as already assigned.
    pub fn with_assigned(mut self, address: IpNet) -> Self {
        self.state.get_mut().records.addresses.push(Address {
            id: Uuid::new_v4(),
            address,
            status: Uuid::nil(),
        });
        self
    }

    /// Copy of every record currently held.
    pub async fn snapshot(&self) -> InventorySnapshot {
        self.state.lock().await.records.clone()
    }
}

#[async_trait]
impl InventoryGateway for MemoryInventory {
    async fn get_status(&self, name: &str) -> Result<Option<StatusRef>, CoreError> {
        let state = self.state.lock().await;
        Ok(state.statuses.iter().find(|s| s.name == name).cloned())
    }

    async fn find_reference(
        &self,
        kind: ReferenceKind,
        name: &str,
    ) -> Result<Option<ObjectRef>, CoreError> {
        let state = self.state.lock().await;
        Ok(state.references.get(&(kind, name.to_owned())).cloned())
    }

    async fn create_device(&self, device: &NewDevice) -> Result<Device, CoreError> {
        let mut state = self.state.lock().await;

        if state.records.devices.iter().any(|d| d.name == device.name) {
            return Err(CoreError::Conflict {
                message: format!("name: Device with this Name already exists ({})", device.name),
            });
        }
        for (kind, r) in [
            (ReferenceKind::DeviceType, &device.device_type),
            (ReferenceKind::Role, &device.role),
            (ReferenceKind::Location, &device.location),
        ] {
            if !state.knows_reference(kind, r.id) {
                return Err(CoreError::Validation {
                    message: format!("{kind}: unknown {kind} {}", r.display),
                });
            }
        }
        state.require_status(&device.status)?;

        let created = Device {
            id: Uuid::new_v4(),
            name: device.name.clone(),
            device_type: device.device_type.clone(),
            role: device.role.clone(),
            location: device.location.clone(),
            status: device.status.id,
        };

        let template = state
            .interface_templates
            .get(&device.device_type.id)
            .cloned()
            .unwrap_or_default();
        for name in template {
            state.records.interfaces.push(Interface {
                id: Uuid::new_v4(),
                device: created.id,
                name,
            });
        }

        state.records.devices.push(created.clone());
        Ok(created)
    }

    async fn list_interfaces(&self, device: &Device) -> Result<Vec<Interface>, CoreError> {
        let state = self.state.lock().await;
        Ok(state
            .records
            .interfaces
            .iter()
            .filter(|i| i.device == device.id)
            .cloned()
            .collect())
    }

    async fn create_link(
        &self,
        a: &Interface,
        b: &Interface,
        status: &StatusRef,
    ) -> Result<Link, CoreError> {
        let mut state = self.state.lock().await;
        state.require_status(status)?;
        state.interface(a.id)?;
        state.interface(b.id)?;

        if a.id == b.id {
            return Err(CoreError::Validation {
                message: format!("Cannot connect interface {} to itself", a.name),
            });
        }
        for end in [a, b] {
            if state
                .records
                .links
                .iter()
                .any(|l| l.a == end.id || l.b == end.id)
            {
                return Err(CoreError::Conflict {
                    message: format!("Interface {} already has a cable attached", end.name),
                });
            }
        }

        let link = Link {
            id: Uuid::new_v4(),
            a: a.id,
            b: b.id,
            status: status.id,
        };
        state.records.links.push(link.clone());
        Ok(link)
    }

    async fn get_address_block(&self, cidr: IpNet) -> Result<Option<AddressBlock>, CoreError> {
        let state = self.state.lock().await;
        Ok(state
            .records
            .blocks
            .iter()
            .find(|b| b.prefix == cidr)
            .cloned())
    }

    async fn create_address_block(
        &self,
        cidr: IpNet,
        description: &str,
        status: &StatusRef,
    ) -> Result<AddressBlock, CoreError> {
        let mut state = self.state.lock().await;
        state.require_status(status)?;

        if cidr.trunc() != cidr {
            return Err(CoreError::Validation {
                message: format!("prefix: {cidr} is not a valid prefix. Did you mean {}?", cidr.trunc()),
            });
        }
        if state.records.blocks.iter().any(|b| b.prefix == cidr) {
            return Err(CoreError::Conflict {
                message: format!("prefix: Prefix {cidr} already exists"),
            });
        }

        let block = AddressBlock {
            id: Uuid::new_v4(),
            prefix: cidr,
            description: description.to_owned(),
            status: status.id,
        };
        state.records.blocks.push(block.clone());
        Ok(block)
    }

    async fn address_exists(&self, host: IpAddr) -> Result<bool, CoreError> {
        let state = self.state.lock().await;
        Ok(state.records.addresses.iter().any(|a| a.address.addr() == host))
    }

    async fn list_addresses_within(&self, pool: IpNet) -> Result<Vec<IpNet>, CoreError> {
        let state = self.state.lock().await;
        Ok(state
            .records
            .addresses
            .iter()
            .map(|a| a.address)
            .filter(|a| pool.contains(&a.addr()))
            .collect())
    }

    async fn create_address(
        &self,
        address: IpNet,
        status: &StatusRef,
    ) -> Result<Address, CoreError> {
        let mut state = self.state.lock().await;
        state.require_status(status)?;

        if state
            .records
            .addresses
            .iter()
            .any(|a| a.address.addr() == address.addr())
        {
            return Err(CoreError::Conflict {
                message: format!("address: IP address {address} already exists"),
            });
        }

        let created = Address {
            id: Uuid::new_v4(),
            address,
            status: status.id,
        };
        state.records.addresses.push(created.clone());
        Ok(created)
    }

    async fn bind_address_to_interface(
        &self,
        address: &Address,
        interface: &Interface,
    ) -> Result<(), CoreError> {
        let mut state = self.state.lock().await;
        state.interface(interface.id)?;
        if !state.records.addresses.iter().any(|a| a.id == address.id) {
            return Err(CoreError::Validation {
                message: format!("ip_address: unknown address {address}"),
            });
        }

        let binding = (address.id, interface.id);
        if state.records.bindings.contains(&binding) {
            return Err(CoreError::Conflict {
                message: format!("{address} is already bound to {}", interface.name),
            });
        }
        state.records.bindings.push(binding);
        Ok(())
    }

    async fn list_interface_addresses(
        &self,
        interface: &Interface,
    ) -> Result<Vec<Address>, CoreError> {
        let state = self.state.lock().await;
        Ok(state
            .records
            .addresses_on(interface.id)
            .into_iter()
            .cloned()
            .collect())
    }
}
