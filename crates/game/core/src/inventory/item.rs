//! Item definitions and runtime item instances.

use std::fmt;

use super::InventoryId;
use crate::authority::{NetRole, NotAuthoritative};
use crate::tags::GameplayTag;

/// Reference to an item definition stored outside the core (lookup via the
/// item oracle).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemDefId(pub u32);

impl fmt::Display for ItemDefId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "itemdef:{}", self.0)
    }
}

/// Unique identity of one item instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemId(pub u128);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "item:{:032x}", self.0)
    }
}

/// Default data about items, used to initialize item instances.
///
/// Defines what the item *is*; the instance tracks what the item currently
/// holds (quantity, owner).
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemData {
    pub def: ItemDefId,
    /// Classification tag used by slot type filters and item queries.
    pub item_type: GameplayTag,
    /// Localized display name.
    pub display_name: String,
    /// Localized description.
    pub description: String,
    pub max_quantity: u32,
}

impl ItemData {
    pub fn new(def: ItemDefId, item_type: GameplayTag, max_quantity: u32) -> Self {
        Self {
            def,
            item_type,
            display_name: String::new(),
            description: String::new(),
            max_quantity,
        }
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// Errors from stack splitting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SplitError {
    #[error("cannot split {amount} off a stack of {quantity}")]
    InvalidAmount { amount: u32, quantity: u32 },
}

/// Runtime record of a concrete item.
///
/// Lifecycle: created unowned by [`ItemInstance::create`] (authority only),
/// becomes owned exactly once when an inventory receives it. Moving between
/// inventories is remove-then-receive, never a mutation of two owners at
/// once.
///
/// Invariant: `quantity <= max_quantity` at all times.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemInstance {
    id: ItemId,
    def: ItemDefId,
    item_type: GameplayTag,
    quantity: u32,
    max_quantity: u32,
    owning_inventory: Option<InventoryId>,
}

impl ItemInstance {
    /// Creates an unowned item instance from its definition data.
    ///
    /// Restricted to the authoritative execution context; off-authority
    /// callers get a rejection to log and drop.
    pub fn create(
        role: NetRole,
        id: ItemId,
        data: &ItemData,
        quantity: u32,
    ) -> Result<Self, NotAuthoritative> {
        NotAuthoritative::check(role)?;
        assert!(
            quantity <= data.max_quantity,
            "item {} created with quantity {} over max {}",
            id,
            quantity,
            data.max_quantity
        );

        Ok(Self {
            id,
            def: data.def,
            item_type: data.item_type,
            quantity,
            max_quantity: data.max_quantity,
            owning_inventory: None,
        })
    }

    #[inline]
    pub fn id(&self) -> ItemId {
        self.id
    }

    #[inline]
    pub fn def(&self) -> ItemDefId {
        self.def
    }

    #[inline]
    pub fn item_type(&self) -> GameplayTag {
        self.item_type
    }

    #[inline]
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    #[inline]
    pub fn max_quantity(&self) -> u32 {
        self.max_quantity
    }

    #[inline]
    pub fn owning_inventory(&self) -> Option<InventoryId> {
        self.owning_inventory
    }

    pub(super) fn set_owning_inventory(&mut self, owner: Option<InventoryId>) {
        self.owning_inventory = owner;
    }

    /// Sets the stack quantity. Exceeding the max is a programmer error.
    pub fn set_quantity(&mut self, quantity: u32) {
        assert!(
            quantity <= self.max_quantity,
            "item {} quantity {} over max {}",
            self.id,
            quantity,
            self.max_quantity
        );
        self.quantity = quantity;
    }

    /// Changes the stack limit at runtime. Shrinking below the current
    /// quantity clamps the quantity down to the new limit.
    pub fn set_max_quantity(&mut self, max_quantity: u32) {
        self.max_quantity = max_quantity;
        self.quantity = self.quantity.min(max_quantity);
    }

    /// Splits `amount` off this stack into a new, unowned instance.
    ///
    /// The split must leave both stacks non-empty; anything else is an
    /// ordinary rejection. The caller supplies the new instance identity.
    pub fn split(&mut self, amount: u32, new_id: ItemId) -> Result<ItemInstance, SplitError> {
        if amount == 0 || amount >= self.quantity {
            return Err(SplitError::InvalidAmount {
                amount,
                quantity: self.quantity,
            });
        }

        self.quantity -= amount;
        Ok(Self {
            id: new_id,
            def: self.def,
            item_type: self.item_type,
            quantity: amount,
            max_quantity: self.max_quantity,
            owning_inventory: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tags::native;

    fn potion_data() -> ItemData {
        ItemData::new(ItemDefId(7), native::ITEM_CONSUMABLE, 10)
            .with_display_name("Health Potion")
    }

    #[test]
    fn create_requires_authority() {
        let data = potion_data();
        assert!(ItemInstance::create(NetRole::SimulatedProxy, ItemId(1), &data, 3).is_err());

        let item = ItemInstance::create(NetRole::Authority, ItemId(1), &data, 3).unwrap();
        assert_eq!(item.quantity(), 3);
        assert!(item.owning_inventory().is_none());
    }

    #[test]
    fn shrinking_max_quantity_clamps_quantity() {
        let data = potion_data();
        let mut item = ItemInstance::create(NetRole::Authority, ItemId(1), &data, 8).unwrap();

        item.set_max_quantity(5);
        assert_eq!(item.quantity(), 5);
        assert_eq!(item.max_quantity(), 5);
    }

    #[test]
    fn split_conserves_total_and_yields_unowned_stack() {
        let data = potion_data();
        let mut item = ItemInstance::create(NetRole::Authority, ItemId(1), &data, 8).unwrap();

        let split = item.split(3, ItemId(2)).unwrap();
        assert_eq!(item.quantity(), 5);
        assert_eq!(split.quantity(), 3);
        assert_eq!(split.def(), item.def());
        assert!(split.owning_inventory().is_none());
    }

    #[test]
    fn split_rejects_empty_or_full_amounts() {
        let data = potion_data();
        let mut item = ItemInstance::create(NetRole::Authority, ItemId(1), &data, 4).unwrap();

        assert!(item.split(0, ItemId(2)).is_err());
        assert!(item.split(4, ItemId(2)).is_err());
        assert_eq!(item.quantity(), 4);
    }
}
