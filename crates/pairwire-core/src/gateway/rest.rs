// REST-backed gateway: adapts `pairwire_api::InventoryClient` wire types
// into domain records.

use std::net::IpAddr;

use async_trait::async_trait;
use ipnet::IpNet;
use tracing::debug;

use pairwire_api::types::{
    CableCreate, DeviceCreate, InterfaceResponse, IpAddressCreate, IpAddressResponse,
    PrefixCreate, PrefixResponse,
};
use pairwire_api::{InventoryClient, TlsMode, TransportConfig};

use super::InventoryGateway;
use crate::config::{InventoryConfig, TlsVerification};
use crate::error::CoreError;
use crate::model::{
    Address, AddressBlock, Device, Interface, Link, NewDevice, ObjectRef, ReferenceKind,
    StatusRef,
};

/// Gateway over the inventory REST API.
pub struct RestGateway {
    client: InventoryClient,
}

impl RestGateway {
    /// Build the HTTP client from runtime config. Does not touch the network.
    pub fn new(config: &InventoryConfig) -> Result<Self, CoreError> {
        let transport = build_transport(config);
        let client = InventoryClient::from_token(config.url.as_str(), &config.token, &transport)?;
        Ok(Self { client })
    }

    /// Wrap a pre-built client.
    pub fn from_client(client: InventoryClient) -> Self {
        Self { client }
    }
}

fn build_transport(config: &InventoryConfig) -> TransportConfig {
    let tls = match &config.tls {
        TlsVerification::SystemDefaults => TlsMode::System,
        TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
        TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
    };
    TransportConfig {
        tls,
        timeout: config.timeout,
    }
}

// ── Wire → domain ────────────────────────────────────────────────────

/// Parse an address or prefix as the store renders it. Bare hosts get a
/// full-length mask.
fn parse_net(raw: &str) -> Result<IpNet, CoreError> {
    if let Ok(net) = raw.parse::<IpNet>() {
        return Ok(net);
    }
    raw.parse::<IpAddr>()
        .map(IpNet::from)
        .map_err(|e| CoreError::Internal(format!("store returned unparseable address {raw:?}: {e}")))
}

fn interface_from(resp: InterfaceResponse) -> Interface {
    Interface {
        id: resp.id,
        device: resp.device.id,
        name: resp.name,
    }
}

fn block_from(resp: PrefixResponse) -> Result<AddressBlock, CoreError> {
    Ok(AddressBlock {
        id: resp.id,
        prefix: parse_net(&resp.prefix)?,
        description: resp.description,
        status: resp.status.id,
    })
}

fn address_from(resp: IpAddressResponse) -> Result<Address, CoreError> {
    Ok(Address {
        id: resp.id,
        address: parse_net(&resp.address)?,
        status: resp.status.id,
    })
}

#[async_trait]
impl InventoryGateway for RestGateway {
    async fn get_status(&self, name: &str) -> Result<Option<StatusRef>, CoreError> {
        let found = self.client.find_status(name).await?;
        Ok(found.map(|s| StatusRef {
            id: s.id,
            name: s.name,
        }))
    }

    async fn find_reference(
        &self,
        kind: ReferenceKind,
        name: &str,
    ) -> Result<Option<ObjectRef>, CoreError> {
        let found = match kind {
            ReferenceKind::Location => self.client.find_location(name).await?,
            ReferenceKind::DeviceType => self.client.find_device_type(name).await?,
            ReferenceKind::Role => self.client.find_role(name).await?,
        };
        Ok(found.map(|r| ObjectRef::new(r.id, r.label())))
    }

    async fn create_device(&self, device: &NewDevice) -> Result<Device, CoreError> {
        let body = DeviceCreate {
            name: device.name.clone(),
            device_type: device.device_type.id,
            role: device.role.id,
            location: device.location.id,
            status: device.status.id,
        };
        let resp = self.client.create_device(&body).await?;
        debug!(id = %resp.id, name = %device.name, "device created");

        Ok(Device {
            id: resp.id,
            name: resp.name.unwrap_or_else(|| device.name.clone()),
            device_type: device.device_type.clone(),
            role: device.role.clone(),
            location: device.location.clone(),
            status: resp.status.id,
        })
    }

    async fn list_interfaces(&self, device: &Device) -> Result<Vec<Interface>, CoreError> {
        let interfaces = self.client.list_interfaces(&device.id).await?;
        Ok(interfaces.into_iter().map(interface_from).collect())
    }

    async fn create_link(
        &self,
        a: &Interface,
        b: &Interface,
        status: &StatusRef,
    ) -> Result<Link, CoreError> {
        let resp = self
            .client
            .create_cable(&CableCreate::between_interfaces(a.id, b.id, status.id))
            .await?;
        Ok(Link {
            id: resp.id,
            a: resp.termination_a_id,
            b: resp.termination_b_id,
            status: resp.status.id,
        })
    }

    async fn get_address_block(&self, cidr: IpNet) -> Result<Option<AddressBlock>, CoreError> {
        self.client
            .find_prefix(&cidr.to_string())
            .await?
            .map(block_from)
            .transpose()
    }

    async fn create_address_block(
        &self,
        cidr: IpNet,
        description: &str,
        status: &StatusRef,
    ) -> Result<AddressBlock, CoreError> {
        let resp = self
            .client
            .create_prefix(&PrefixCreate {
                prefix: cidr.to_string(),
                description: description.to_owned(),
                status: status.id,
            })
            .await?;
        block_from(resp)
    }

    async fn address_exists(&self, host: IpAddr) -> Result<bool, CoreError> {
        Ok(self.client.ip_address_exists(&host.to_string()).await?)
    }

    async fn list_addresses_within(&self, pool: IpNet) -> Result<Vec<IpNet>, CoreError> {
        let records = self
            .client
            .list_ip_addresses_within(&pool.to_string())
            .await?;
        let mut addresses = Vec::with_capacity(records.len());
        for record in records {
            let net = parse_net(&record.address)?;
            // The prefix filter can be loose across namespaces.
            if pool.contains(&net.addr()) {
                addresses.push(net);
            }
        }
        Ok(addresses)
    }

    async fn create_address(
        &self,
        address: IpNet,
        status: &StatusRef,
    ) -> Result<Address, CoreError> {
        let resp = self
            .client
            .create_ip_address(&IpAddressCreate {
                address: address.to_string(),
                status: status.id,
            })
            .await?;
        address_from(resp)
    }

    async fn bind_address_to_interface(
        &self,
        address: &Address,
        interface: &Interface,
    ) -> Result<(), CoreError> {
        self.client
            .assign_ip_address(address.id, interface.id)
            .await?;
        Ok(())
    }

    async fn list_interface_addresses(
        &self,
        interface: &Interface,
    ) -> Result<Vec<Address>, CoreError> {
        self.client
            .list_interface_ip_addresses(&interface.id)
            .await?
            .into_iter()
            .map(address_from)
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn parse_net_accepts_cidr_and_bare_host() {
        assert_eq!(parse_net("10.0.0.1/31").unwrap().to_string(), "10.0.0.1/31");
        assert_eq!(parse_net("10.0.0.1").unwrap().to_string(), "10.0.0.1/32");
        assert_eq!(parse_net("2001:db8::1").unwrap().to_string(), "2001:db8::1/128");
    }

    #[test]
    fn parse_net_rejects_garbage() {
        assert!(matches!(parse_net("ten.zero"), Err(CoreError::Internal(_))));
    }

    #[test]
    fn transport_mirrors_tls_choice() {
        let config = InventoryConfig {
            url: "https://inventory.example.net".parse().unwrap(),
            token: "t".to_string().into(),
            tls: TlsVerification::DangerAcceptInvalid,
            timeout: std::time::Duration::from_secs(5),
        };
        let transport = build_transport(&config);
        assert!(matches!(transport.tls, TlsMode::DangerAcceptInvalid));
        assert_eq!(transport.timeout.as_secs(), 5);
    }
}
