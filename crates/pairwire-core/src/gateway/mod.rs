// ── Inventory gateway ──
//
// The narrow interface the allocator and provisioner drive. Every create
// is expected to be atomic and conflict-detecting on the store side:
// a duplicate device name, address, block, or cabled endpoint comes back
// as `CoreError::Conflict`.

mod memory;
mod rest;

use std::net::IpAddr;

use async_trait::async_trait;
use ipnet::IpNet;

pub use memory::{InventorySnapshot, MemoryInventory};
pub use rest::RestGateway;

use crate::error::CoreError;
use crate::model::{
    Address, AddressBlock, Device, Interface, Link, NewDevice, ObjectRef, ReferenceKind,
    StatusRef,
};

#[async_trait]
pub trait InventoryGateway: Send + Sync {
    /// Resolve a lifecycle status by exact name.
    async fn get_status(&self, name: &str) -> Result<Option<StatusRef>, CoreError>;

    /// Resolve a location, device type, or role by name.
    async fn find_reference(
        &self,
        kind: ReferenceKind,
        name: &str,
    ) -> Result<Option<ObjectRef>, CoreError>;

    async fn create_device(&self, device: &NewDevice) -> Result<Device, CoreError>;

    /// Interfaces of `device`, in no particular order.
    async fn list_interfaces(&self, device: &Device) -> Result<Vec<Interface>, CoreError>;

    async fn create_link(
        &self,
        a: &Interface,
        b: &Interface,
        status: &StatusRef,
    ) -> Result<Link, CoreError>;

    /// Block with exactly this CIDR, if one exists.
    async fn get_address_block(&self, cidr: IpNet) -> Result<Option<AddressBlock>, CoreError>;

    async fn create_address_block(
        &self,
        cidr: IpNet,
        description: &str,
        status: &StatusRef,
    ) -> Result<AddressBlock, CoreError>;

    /// Whether any address record exists for `host`, whatever its mask.
    async fn address_exists(&self, host: IpAddr) -> Result<bool, CoreError>;

    /// Every address recorded inside `pool`, in no particular order.
    async fn list_addresses_within(&self, pool: IpNet) -> Result<Vec<IpNet>, CoreError>;

    async fn create_address(&self, address: IpNet, status: &StatusRef)
    -> Result<Address, CoreError>;

    async fn bind_address_to_interface(
        &self,
        address: &Address,
        interface: &Interface,
    ) -> Result<(), CoreError>;

    /// Addresses bound to `interface`, oldest binding first.
    async fn list_interface_addresses(
        &self,
        interface: &Interface,
    ) -> Result<Vec<Address>, CoreError>;
}
