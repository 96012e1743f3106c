//! Compute resource discovery and allocation

pub mod allocator;
pub mod inventory;

pub use allocator::Allocator;
pub use inventory::{Inventory, ResourceUnit, UnitKind};
