// pairwire-core: Transit-link provisioning engine between pairwire-api and the CLI.

pub mod allocator;
pub mod config;
pub mod error;
pub mod gateway;
pub mod model;
pub mod naming;
pub mod provisioner;
pub mod summary;

// ── Primary re-exports ──────────────────────────────────────────────
pub use allocator::{Allocator, EnsuredBlock, FreePair, TRANSIT_BLOCK_SIZE, first_free_block};
pub use config::{AllocationConfig, InventoryConfig, TlsVerification};
pub use error::CoreError;
pub use gateway::{InventoryGateway, InventorySnapshot, MemoryInventory, RestGateway};
pub use provisioner::{
    Committed, Ledger, ProvisionError, ProvisionRequest, Provisioner, RecordKind,
};
pub use summary::{CSV_HEADER, NONE_MARKER, Summary, SummaryRow};

// Re-export model types at the crate root for ergonomics.
pub use model::{
    Address, AddressBlock, Device, Interface, Link, NewDevice, ObjectId, ObjectRef,
    ReferenceKind, StatusRef,
};
