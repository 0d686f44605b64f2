//! Event payloads carried by the bus.

use serde::{Deserialize, Serialize};

use arpg_core::{
    AbilitySpecHandle, ActorId, AttributeId, GrantId, InventoryId, ItemId, SlotIndex,
};

/// Topics for event routing.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Topic {
    /// Ability activations and input notifications.
    Ability,
    /// Attribute changes (committed values).
    Attribute,
    /// Inventory and grant changes.
    Inventory,
}

/// Event wrapper that carries the topic and typed event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    Ability(AbilityEvent),
    Attribute(AttributeEvent),
    Inventory(InventoryEvent),
}

impl Event {
    pub fn topic(&self) -> Topic {
        match self {
            Event::Ability(_) => Topic::Ability,
            Event::Attribute(_) => Topic::Attribute,
            Event::Inventory(_) => Topic::Inventory,
        }
    }
}

/// Ability pipeline outcomes worth observing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AbilityEvent {
    Activated {
        actor: ActorId,
        handle: AbilitySpecHandle,
    },
    /// An attempt that the engine-level gates rejected (normal outcome).
    ActivationFailed {
        actor: ActorId,
        handle: AbilitySpecHandle,
    },
    /// A press was forwarded to an already-active ability.
    PressForwarded {
        actor: ActorId,
        handle: AbilitySpecHandle,
    },
    /// A release was forwarded to an active ability.
    ReleaseForwarded {
        actor: ActorId,
        handle: AbilitySpecHandle,
    },
    /// The whole frame's input was dropped by the block tag.
    InputBlocked { actor: ActorId },
}

/// One committed attribute mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributeEvent {
    pub actor: ActorId,
    pub attribute: AttributeId,
    pub old: f32,
    pub new: f32,
}

/// Inventory and grant changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum InventoryEvent {
    /// An inventory was created and given to an actor.
    Created {
        actor: ActorId,
        inventory: InventoryId,
    },
    /// An item landed in a slot.
    ItemReceived {
        actor: ActorId,
        inventory: InventoryId,
        slot: SlotIndex,
        item: ItemId,
    },
    /// An item left a slot.
    ItemRemoved {
        actor: ActorId,
        inventory: InventoryId,
        slot: SlotIndex,
        item: ItemId,
    },
    /// Catch-all "inventory changed" notification for UI refresh.
    Changed {
        actor: ActorId,
        inventory: InventoryId,
    },
    /// A grant was appended to an actor's grant list.
    GrantAdded { actor: ActorId, grant: GrantId },
    /// The replicated grant list was refreshed on an observer.
    GrantsUpdated { actor: ActorId },
}
