// pairwire-api: Async Rust client for Nautobot-style inventory REST APIs

pub mod client;
pub mod error;
pub mod transport;
pub mod types;

pub use client::{InventoryClient, PAGE_SIZE};
pub use error::Error;
pub use transport::{TlsMode, TransportConfig};
