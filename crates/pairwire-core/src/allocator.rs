// ── Transit block allocator ──
//
// First-fit search for a free 2-address block inside the configured pool,
// plus get-or-create of the pool and leaf block records.
//
// The search is a gap scan over the assigned addresses in the pool: map
// each to its block index, sort, and walk once. The lowest index missing
// from the walk is the answer.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::sync::Arc;

use ipnet::IpNet;
use tracing::{debug, info};

use crate::error::CoreError;
use crate::gateway::InventoryGateway;
use crate::model::{AddressBlock, StatusRef};

/// Addresses per transit block (a /31 or /127).
pub const TRANSIT_BLOCK_SIZE: u128 = 2;

/// A block record, and whether this call created it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnsuredBlock {
    pub block: AddressBlock,
    pub created: bool,
}

/// The chosen block and its first two host addresses, each carrying the
/// block's prefix length (`10.0.0.0/31`, `10.0.0.1/31`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreePair {
    pub subnet: IpNet,
    pub a: IpNet,
    pub b: IpNet,
}

fn to_u128(addr: IpAddr) -> u128 {
    match addr {
        IpAddr::V4(v4) => u128::from(u32::from(v4)),
        IpAddr::V6(v6) => u128::from(v6),
    }
}

fn from_u128(like: IpAddr, value: u128) -> Result<IpAddr, CoreError> {
    match like {
        IpAddr::V4(_) => u32::try_from(value)
            .map(|v| IpAddr::V4(Ipv4Addr::from(v)))
            .map_err(|_| CoreError::Internal(format!("{value} is not an IPv4 address"))),
        IpAddr::V6(_) => Ok(IpAddr::V6(Ipv6Addr::from(value))),
    }
}

/// Prefix length of a block of `block_size` addresses carved from `pool`.
fn leaf_prefix_len(pool: IpNet, block_size: u128) -> Result<u8, CoreError> {
    if block_size < 2 || !block_size.is_power_of_two() {
        return Err(CoreError::Validation {
            message: format!("block size must be a power of two of at least 2, got {block_size}"),
        });
    }
    // trailing_zeros of a power of two <= 2^127 fits in u8.
    let host_bits = u8::try_from(block_size.trailing_zeros())
        .map_err(|_| CoreError::Internal("block size out of range".into()))?;
    match pool.max_prefix_len().checked_sub(host_bits) {
        Some(len) if len >= pool.prefix_len() => Ok(len),
        _ => Err(CoreError::Validation {
            message: format!("a block of {block_size} addresses does not fit in {pool}"),
        }),
    }
}

/// Lowest-addressed block of `block_size` addresses in `pool` that holds
/// none of `occupied`. Addresses outside the pool are ignored.
///
/// Returns `Ok(None)` when every block is taken.
pub fn first_free_block(
    pool: IpNet,
    block_size: u128,
    occupied: &[IpAddr],
) -> Result<Option<IpNet>, CoreError> {
    let pool = pool.trunc();
    let leaf_len = leaf_prefix_len(pool, block_size)?;
    let shift = pool.max_prefix_len() - leaf_len;
    let block_count = 1u128 << (leaf_len - pool.prefix_len());
    let base = to_u128(pool.network());

    let mut taken: Vec<u128> = occupied
        .iter()
        .filter(|addr| pool.contains(*addr))
        .map(|addr| (to_u128(*addr) - base) >> shift)
        .collect();
    taken.sort_unstable();
    taken.dedup();

    let mut candidate = 0u128;
    for index in taken {
        if index != candidate {
            break;
        }
        candidate += 1;
    }
    if candidate >= block_count {
        return Ok(None);
    }

    let network = from_u128(pool.network(), base + (candidate << shift))?;
    IpNet::new(network, leaf_len)
        .map(Some)
        .map_err(|e| CoreError::Internal(e.to_string()))
}

/// Drives the gateway for block records and the free-pair search.
#[derive(Clone)]
pub struct Allocator {
    gateway: Arc<dyn InventoryGateway>,
}

impl Allocator {
    pub fn new(gateway: Arc<dyn InventoryGateway>) -> Self {
        Self { gateway }
    }

    /// Get or create the pool's block record.
    pub async fn ensure_parent_block(
        &self,
        cidr: IpNet,
        description: &str,
        status: &StatusRef,
    ) -> Result<EnsuredBlock, CoreError> {
        self.ensure_block(cidr, description, status).await
    }

    /// Get or create the record for a chosen transit block.
    pub async fn ensure_leaf_block(
        &self,
        cidr: IpNet,
        description: &str,
        status: &StatusRef,
    ) -> Result<EnsuredBlock, CoreError> {
        self.ensure_block(cidr, description, status).await
    }

    async fn ensure_block(
        &self,
        cidr: IpNet,
        description: &str,
        status: &StatusRef,
    ) -> Result<EnsuredBlock, CoreError> {
        if let Some(block) = self.gateway.get_address_block(cidr).await? {
            debug!(%cidr, "address block already present");
            return Ok(EnsuredBlock {
                block,
                created: false,
            });
        }

        match self
            .gateway
            .create_address_block(cidr, description, status)
            .await
        {
            Ok(block) => {
                info!(%cidr, id = %block.id, "address block created");
                Ok(EnsuredBlock {
                    block,
                    created: true,
                })
            }
            // Lost a race with a concurrent run.
            Err(CoreError::Conflict { message }) => {
                match self.gateway.get_address_block(cidr).await? {
                    Some(block) => {
                        debug!(%cidr, "address block created concurrently");
                        Ok(EnsuredBlock {
                            block,
                            created: false,
                        })
                    }
                    None => Err(CoreError::Conflict { message }),
                }
            }
            Err(e) => Err(e),
        }
    }

    /// First block of `block_size` addresses in `parent` whose first two
    /// hosts are both unassigned.
    ///
    /// The chosen hosts are re-checked one by one before returning; a host
    /// that turns out to be taken joins the occupied set and the scan
    /// resumes.
    pub async fn find_first_free_pair(
        &self,
        parent: IpNet,
        block_size: u128,
    ) -> Result<FreePair, CoreError> {
        let leaf_len = leaf_prefix_len(parent.trunc(), block_size)?;
        let mut occupied: Vec<IpAddr> = self
            .gateway
            .list_addresses_within(parent)
            .await?
            .into_iter()
            .map(|net| net.addr())
            .collect();
        debug!(pool = %parent, assigned = occupied.len(), "scanning for a free block");

        loop {
            let Some(subnet) = first_free_block(parent, block_size, &occupied)? else {
                return Err(CoreError::Exhaustion {
                    pool: parent,
                    leaf_prefix_len: leaf_len,
                });
            };

            let first = subnet.network();
            let second = from_u128(first, to_u128(first) + 1)?;

            let mut raced = Vec::new();
            for host in [first, second] {
                if self.gateway.address_exists(host).await? {
                    raced.push(host);
                }
            }

            if raced.is_empty() {
                let pair = FreePair {
                    subnet,
                    a: IpNet::new(first, leaf_len).map_err(|e| CoreError::Internal(e.to_string()))?,
                    b: IpNet::new(second, leaf_len)
                        .map_err(|e| CoreError::Internal(e.to_string()))?,
                };
                debug!(%subnet, "free block found");
                return Ok(pair);
            }

            debug!(%subnet, ?raced, "candidate taken since listing, rescanning");
            occupied.extend(raced);
        }
    }
}
