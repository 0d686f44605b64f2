//! Inventory and item ownership model.
//!
//! Every item instance is owned by at most one inventory slot, and the
//! ownership transfer is modeled structurally: receiving *moves* the item
//! value into the slot, removal moves it back out, so a double owner is
//! unrepresentable. The back-reference (`owning_inventory`) exists for
//! observers and invariant checks and always agrees with the containing slot
//! at quiescent points.
//!
//! Inventories are owned by an inventory system component; other components
//! gain access through grant records carrying permission flags.

mod component;
mod inventory;
mod item;
mod slot;
mod transfer;

pub use component::{
    GrantId, InventoryGrant, InventoryGrantError, InventoryPermissions, InventorySystemComponent,
};
pub use inventory::{Inventory, InventoryHooks, ReceiveError};
pub use item::{ItemData, ItemDefId, ItemId, ItemInstance, SplitError};
pub use slot::{InventorySlot, SlotIndex, SlotList};
pub use transfer::{TransferError, transfer_item};

use std::fmt;

/// Unique identifier for an inventory.
///
/// Generated through the rng oracle at creation time, so ids are globally
/// unique across components and deterministic under replay.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InventoryId(pub u128);

impl fmt::Display for InventoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "inv:{:032x}", self.0)
    }
}
