//! Messages an authoritative session emits for observers.

use serde::{Deserialize, Serialize};

use arpg_core::{ActorId, InventoryGrant, InventoryId, ItemInstance, SlotIndex};

use super::bitmask::{HealthSetFields, ItemFields};

/// One unit of authoritative state synchronization.
///
/// Messages carry committed values for changed fields only; applying them in
/// transport order on an observer converges its view on the authority.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ReplicationMessage {
    /// Authoritative base values of the replicated health attributes.
    /// `fields` names which of the carried values are meaningful.
    HealthSet {
        actor: ActorId,
        fields: HealthSetFields,
        health: f32,
        health_max: f32,
    },

    /// An inventory came into existence on an actor.
    InventoryCreated {
        actor: ActorId,
        inventory: InventoryId,
        capacity: usize,
    },

    /// Full refresh of an actor's grant list.
    InventoryGrants {
        actor: ActorId,
        grants: Vec<InventoryGrant>,
    },

    /// Authoritative contents of one slot (identity, quantity, and display
    /// definition travel inside the item record).
    InventorySlot {
        actor: ActorId,
        inventory: InventoryId,
        slot: SlotIndex,
        item: Option<ItemInstance>,
    },

    /// Stack counters of an owned item changed in place.
    ItemQuantity {
        actor: ActorId,
        inventory: InventoryId,
        slot: SlotIndex,
        fields: ItemFields,
        quantity: u32,
        max_quantity: u32,
    },
}
