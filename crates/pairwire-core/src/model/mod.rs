// ── Domain model ──
//
// Transient views of inventory records. The store owns every record;
// the core holds these only for the duration of one run.

mod inventory;
mod reference;

pub use inventory::{Address, AddressBlock, Device, Interface, Link, NewDevice};
pub use reference::{ObjectId, ObjectRef, ReferenceKind, StatusRef};
