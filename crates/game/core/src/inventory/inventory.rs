//! The inventory: an owned slot container where item instances live.

use std::fmt;

use super::item::ItemInstance;
use super::slot::{SlotIndex, SlotList};
use super::InventoryId;
use crate::authority::{NetRole, NotAuthoritative};
use crate::types::ComponentId;

/// Hooks an inventory variant can install around the receive transaction.
///
/// `pre_item_received` runs before ownership changes hands (read-only
/// observation; the item is still unowned). `post_item_received` runs once
/// the bind is committed and is where "inventory changed" notifications hang.
pub trait InventoryHooks: Send + Sync {
    fn pre_item_received(&self, inventory: &Inventory, item: &ItemInstance) {
        let _ = (inventory, item);
    }

    fn post_item_received(&self, inventory: &Inventory, slot: SlotIndex, item: &ItemInstance) {
        let _ = (inventory, slot, item);
    }
}

/// Rejections from the receive transaction.
///
/// Every variant hands the item back so a rejected receive cannot destroy
/// it; callers either retry elsewhere or return it to its source.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ReceiveError {
    #[error("operation requires authority, called with role {role}")]
    NotAuthoritative {
        role: NetRole,
        item: ItemInstance,
    },

    #[error("no inventory named {name:?}")]
    UnknownInventory { name: String, item: ItemInstance },

    #[error("no empty compatible slot for item {}", .item.id())]
    NoCompatibleSlot { item: ItemInstance },
}

impl ReceiveError {
    /// Recovers the rejected item.
    pub fn into_item(self) -> ItemInstance {
        match self {
            Self::NotAuthoritative { item, .. }
            | Self::UnknownInventory { item, .. }
            | Self::NoCompatibleSlot { item } => item,
        }
    }
}

/// An object where item instances are stored.
///
/// Any and all item instances are owned by an inventory, and any and all
/// inventories are owned by a single inventory system component. Multiple
/// components can be given access to an inventory; the level of access is
/// controlled per grant.
///
/// Every container in the game that items can be placed in or taken from is
/// an inventory: character bags, trade windows, loot on the ground. Looting
/// is a transaction between two inventories (see
/// [`super::transfer_item`]).
///
/// `&mut self` on the receive path is the per-inventory critical section:
/// receives on the same inventory serialize, receives on different
/// inventories never contend.
pub struct Inventory {
    id: InventoryId,
    owning_component: Option<ComponentId>,
    slot_list: SlotList,
    hooks: Option<Box<dyn InventoryHooks>>,
}

impl Inventory {
    pub fn new(id: InventoryId, slot_list: SlotList) -> Self {
        Self {
            id,
            owning_component: None,
            slot_list,
            hooks: None,
        }
    }

    pub fn with_hooks(mut self, hooks: Box<dyn InventoryHooks>) -> Self {
        self.hooks = Some(hooks);
        self
    }

    #[inline]
    pub fn id(&self) -> InventoryId {
        self.id
    }

    /// The component that owns this inventory, once given.
    #[inline]
    pub fn owning_component(&self) -> Option<ComponentId> {
        self.owning_component
    }

    pub(super) fn set_owning_component(&mut self, owner: Option<ComponentId>) {
        self.owning_component = owner;
    }

    pub fn slot_list(&self) -> &SlotList {
        &self.slot_list
    }

    /// Checked slot access; an invalid index is a programmer error.
    pub fn slot(&self, index: SlotIndex) -> &super::InventorySlot {
        self.slot_list.slot(index)
    }

    /// Number of slots holding an item.
    pub fn occupied_slots(&self) -> usize {
        self.slot_list.iter().filter(|s| !s.is_empty()).count()
    }

    /// Checks the inventory does not violate its invariants: it has an
    /// owning component, and every contained item's back-reference points
    /// here.
    pub fn is_valid_inventory(&self) -> bool {
        self.owning_component.is_some()
            && self
                .slot_list
                .iter()
                .filter_map(|slot| slot.item())
                .all(|item| item.owning_inventory() == Some(self.id))
    }

    /// Receives an unowned item into the first empty compatible slot.
    ///
    /// The sole ordinary failure is capacity: no empty slot whose filter
    /// accepts the item's classification tag. That rejection mutates nothing
    /// and returns the item inside the error.
    ///
    /// Passing an item that already has an owner is a programmer error;
    /// transfer between inventories must go remove-then-receive.
    pub fn try_receive_item(&mut self, item: ItemInstance) -> Result<SlotIndex, ReceiveError> {
        assert!(
            item.owning_inventory().is_none(),
            "item {} is already owned by an inventory",
            item.id()
        );

        // Deterministic index-order scan for a compatible slot.
        let Some(index) = self.slot_list.find_first_compatible(item.item_type()) else {
            return Err(ReceiveError::NoCompatibleSlot { item });
        };

        // The source still owns nothing here; hooks observe, never mutate.
        if let Some(hooks) = &self.hooks {
            hooks.pre_item_received(self, &item);
        }

        // Bind: slot reference and back-reference change as one step. No
        // observer can run between these two writes.
        let item_id = item.id();
        let mut item = item;
        item.set_owning_inventory(Some(self.id));
        self.slot_list.slot_mut(index).item = Some(item);

        debug_assert_eq!(
            self.slot_list
                .iter()
                .filter_map(|s| s.item())
                .filter(|i| i.id() == item_id)
                .count(),
            1,
            "exactly one slot must hold the received item"
        );

        // Commit point: the "inventory changed" notification hangs off this
        // hook, strictly after the mutation.
        if let Some(hooks) = &self.hooks {
            if let Some(received) = self.slot_list.slot(index).item() {
                hooks.post_item_received(self, index, received);
            }
        }

        Ok(index)
    }

    /// Mutable access to the item in a slot, for in-place updates (stack
    /// quantity changes) that do not move ownership.
    pub fn item_mut(&mut self, index: SlotIndex) -> Option<&mut ItemInstance> {
        self.slot_list.get_mut(index)?.item.as_mut()
    }

    /// Removes and returns the item in a slot, clearing its back-reference.
    ///
    /// Returns None for an empty or out-of-range slot.
    pub fn remove_item(&mut self, index: SlotIndex) -> Option<ItemInstance> {
        let slot = self.slot_list.get_mut(index)?;
        let mut item = slot.item.take()?;
        item.set_owning_inventory(None);
        Some(item)
    }

    /// Puts an item back into the exact slot it was removed from.
    ///
    /// Used by the transfer path to undo a removal when the destination
    /// rejects; the slot must still be empty.
    pub(super) fn restore_item(&mut self, index: SlotIndex, mut item: ItemInstance) {
        let slot = self.slot_list.slot_mut(index);
        assert!(slot.is_empty(), "cannot restore item into occupied {index}");
        item.set_owning_inventory(Some(self.id));
        slot.item = Some(item);
    }

    /// Deterministic digest over the slot contents.
    ///
    /// Two inventories with byte-identical slot contents (items, ownership
    /// back-references, filters) produce the same digest.
    #[cfg(feature = "serde")]
    pub fn digest(&self) -> [u8; 32] {
        use sha2::{Digest, Sha256};

        let mut hasher = Sha256::new();
        for slot in self.slot_list.iter() {
            // bincode serialization is deterministic and consistent
            if let Ok(bytes) = bincode::serialize(slot) {
                hasher.update(&bytes);
            }
        }
        hasher.finalize().into()
    }

    /// Multi-line debug dump of slot contents.
    pub fn debug_string(&self) -> String {
        use std::fmt::Write as _;

        let mut out = String::new();
        let _ = writeln!(out, "Inventory {}", self.id);
        let _ = writeln!(out, "| Num Slots : {}", self.slot_list.len());
        for (index, slot) in self.slot_list.iter().enumerate() {
            match slot.item() {
                Some(item) => {
                    let _ = writeln!(
                        out,
                        "| [Slot {}] {} x{} ({})",
                        index,
                        item.id(),
                        item.quantity(),
                        item.item_type()
                    );
                }
                None => {
                    let _ = writeln!(out, "| [Slot {}] empty", index);
                }
            }
        }
        out
    }
}

impl fmt::Debug for Inventory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Inventory")
            .field("id", &self.id)
            .field("owning_component", &self.owning_component)
            .field("slot_list", &self.slot_list)
            .field("hooks", &self.hooks.as_ref().map(|_| "<installed>"))
            .finish()
    }
}

/// Convenience check used by callers that validated authority separately.
pub(super) fn check_receive_authority(
    role: NetRole,
    item: ItemInstance,
) -> Result<ItemInstance, ReceiveError> {
    match NotAuthoritative::check(role) {
        Ok(()) => Ok(item),
        Err(NotAuthoritative { role }) => Err(ReceiveError::NotAuthoritative { role, item }),
    }
}
