//! Inventory slots and the fixed-capacity slot list.

use std::fmt;

use super::item::ItemInstance;
use crate::tags::{GameplayTag, TagSet};

/// Index of a slot within one inventory.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SlotIndex(pub usize);

impl fmt::Display for SlotIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "slot[{}]", self.0)
    }
}

/// A single-item-capacity cell with a type-block filter.
///
/// The filter lists classification tags this slot refuses; an empty filter
/// accepts everything.
#[derive(Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InventorySlot {
    pub(super) item: Option<ItemInstance>,
    blocked_types: TagSet,
}

impl InventorySlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_blocked_type(mut self, tag: GameplayTag) -> Self {
        self.blocked_types.add_unique(tag);
        self
    }

    #[inline]
    pub fn item(&self) -> Option<&ItemInstance> {
        self.item.as_ref()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.item.is_none()
    }

    /// True when the filter refuses this classification tag.
    #[inline]
    pub fn blocks(&self, item_type: GameplayTag) -> bool {
        self.blocked_types.has_tag_exact(item_type)
    }

    pub fn blocked_types(&self) -> &TagSet {
        &self.blocked_types
    }
}

/// The slot container of one inventory. Size is fixed at construction.
#[derive(Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SlotList {
    slots: Vec<InventorySlot>,
}

impl SlotList {
    /// Creates `capacity` unfiltered slots.
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: (0..capacity).map(|_| InventorySlot::new()).collect(),
        }
    }

    /// Creates a list from explicitly configured slots.
    pub fn from_slots(slots: Vec<InventorySlot>) -> Self {
        Self { slots }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn get(&self, index: SlotIndex) -> Option<&InventorySlot> {
        self.slots.get(index.0)
    }

    pub(super) fn get_mut(&mut self, index: SlotIndex) -> Option<&mut InventorySlot> {
        self.slots.get_mut(index.0)
    }

    /// Checked access; an invalid index is a programmer error.
    pub fn slot(&self, index: SlotIndex) -> &InventorySlot {
        assert!(index.0 < self.slots.len(), "invalid {index}");
        &self.slots[index.0]
    }

    pub(super) fn slot_mut(&mut self, index: SlotIndex) -> &mut InventorySlot {
        assert!(index.0 < self.slots.len(), "invalid {index}");
        &mut self.slots[index.0]
    }

    pub fn iter(&self) -> impl Iterator<Item = &InventorySlot> {
        self.slots.iter()
    }

    /// First empty slot whose filter does not block the tag, scanning in
    /// index order. The deterministic scan keeps receive placement
    /// reproducible across machines.
    pub fn find_first_compatible(&self, item_type: GameplayTag) -> Option<SlotIndex> {
        self.slots
            .iter()
            .position(|slot| slot.is_empty() && !slot.blocks(item_type))
            .map(SlotIndex)
    }
}
