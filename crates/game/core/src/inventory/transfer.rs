//! Atomic transfer of an item between two inventories.

use super::inventory::{Inventory, ReceiveError};
use super::slot::SlotIndex;
use super::InventoryId;
use crate::authority::NotAuthoritative;

/// Rejections from item removal and transfer operations. All of them leave
/// every slot exactly as it was.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TransferError {
    #[error("source {slot} is empty")]
    EmptySourceSlot { slot: SlotIndex },

    #[error("destination inventory {dest} rejected the item")]
    DestinationRejected { dest: InventoryId },

    #[error("no inventory named {name:?}")]
    UnknownInventory { name: String },

    #[error("grant over inventory {inventory} does not permit this operation")]
    PermissionDenied { inventory: InventoryId },

    #[error(transparent)]
    NotAuthoritative(#[from] NotAuthoritative),
}

/// Moves the item in `slot` of `source` into the first compatible slot of
/// `dest`.
///
/// Composed remove-then-receive: the item is briefly unowned inside this
/// call, but a destination rejection restores it to its original slot before
/// returning, so the transient window never escapes. Taking both inventories
/// by `&mut` means a transfer within one inventory is unrepresentable and the
/// two slot lists are exclusively held for the whole transaction.
pub fn transfer_item(
    source: &mut Inventory,
    slot: SlotIndex,
    dest: &mut Inventory,
) -> Result<SlotIndex, TransferError> {
    let item = source
        .remove_item(slot)
        .ok_or(TransferError::EmptySourceSlot { slot })?;

    match dest.try_receive_item(item) {
        Ok(dest_slot) => Ok(dest_slot),
        Err(err @ ReceiveError::NoCompatibleSlot { .. }) => {
            source.restore_item(slot, err.into_item());
            Err(TransferError::DestinationRejected { dest: dest.id() })
        }
        // Inventory-level receive only rejects on capacity, but hand the
        // item back on any other rejection all the same.
        Err(err) => {
            source.restore_item(slot, err.into_item());
            Err(TransferError::DestinationRejected { dest: dest.id() })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authority::NetRole;
    use crate::inventory::slot::{InventorySlot, SlotList};
    use crate::inventory::{ItemData, ItemDefId, ItemId, ItemInstance};
    use crate::tags::native;

    fn loot_item(id: u128) -> ItemInstance {
        let data = ItemData::new(ItemDefId(1), native::ITEM_EQUIPMENT, 1);
        ItemInstance::create(NetRole::Authority, ItemId(id), &data, 1).unwrap()
    }

    #[test]
    fn transfer_moves_ownership_to_destination() {
        let mut ground = Inventory::new(InventoryId(1), SlotList::new(2));
        let mut bag = Inventory::new(InventoryId(2), SlotList::new(2));

        let slot = ground.try_receive_item(loot_item(1)).unwrap();
        let dest_slot = transfer_item(&mut ground, slot, &mut bag).unwrap();

        assert!(ground.slot(slot).is_empty());
        let looted = bag.slot(dest_slot).item().unwrap();
        assert_eq!(looted.owning_inventory(), Some(bag.id()));
    }

    #[test]
    fn rejected_transfer_restores_the_source_slot() {
        let mut ground = Inventory::new(InventoryId(1), SlotList::new(1));
        // Destination blocks equipment in its only slot.
        let mut bag = Inventory::new(
            InventoryId(2),
            SlotList::from_slots(vec![
                InventorySlot::new().with_blocked_type(native::ITEM_EQUIPMENT)
            ]),
        );

        let slot = ground.try_receive_item(loot_item(1)).unwrap();

        #[cfg(feature = "serde")]
        let before = ground.digest();

        let err = transfer_item(&mut ground, slot, &mut bag).unwrap_err();
        assert_eq!(err, TransferError::DestinationRejected { dest: bag.id() });

        // Item is back in its original slot with its back-reference intact.
        let item = ground.slot(slot).item().unwrap();
        assert_eq!(item.owning_inventory(), Some(ground.id()));
        assert_eq!(bag.occupied_slots(), 0);

        #[cfg(feature = "serde")]
        assert_eq!(before, ground.digest());
    }

    #[test]
    fn empty_source_slot_is_an_ordinary_rejection() {
        let mut a = Inventory::new(InventoryId(1), SlotList::new(1));
        let mut b = Inventory::new(InventoryId(2), SlotList::new(1));

        let err = transfer_item(&mut a, SlotIndex(0), &mut b).unwrap_err();
        assert_eq!(
            err,
            TransferError::EmptySourceSlot {
                slot: SlotIndex(0)
            }
        );
    }
}
