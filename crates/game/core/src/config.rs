/// Gameplay configuration constants and tunable parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GameConfig {
    /// Upper bound on the number of slots an inventory may be constructed
    /// with. Creation requests above this are rejected.
    pub max_inventory_capacity: usize,
}

impl GameConfig {
    // ===== compile-time constants used as type parameters =====
    /// Maximum number of activatable ability specs per ability system component.
    pub const MAX_ABILITIES: usize = 16;
    /// Maximum number of attribute sets per ability system component.
    pub const MAX_ATTRIBUTE_SETS: usize = 4;
    /// Maximum number of active effect records per ability system component.
    pub const MAX_ACTIVE_EFFECTS: usize = 16;
    /// Maximum number of loose granted tags per ability system component.
    pub const MAX_GRANTED_TAGS: usize = 16;
    /// Maximum number of modifiers a single effect may carry.
    pub const MAX_EFFECT_MODIFIERS: usize = 4;
    /// Maximum entries per category in a single ability set.
    pub const MAX_SET_ABILITIES: usize = 8;
    pub const MAX_SET_EFFECTS: usize = 8;
    pub const MAX_SET_ATTRIBUTE_SETS: usize = 4;
    /// Maximum number of type-block filter tags per inventory slot.
    pub const MAX_SLOT_BLOCKED_TYPES: usize = 4;
    /// Maximum number of inventories owned by one inventory system component.
    pub const MAX_INVENTORIES: usize = 8;
    /// Maximum number of access grants tracked by one inventory system
    /// component. Grant lookup is a linear scan, so this stays small.
    pub const MAX_INVENTORY_GRANTS: usize = 16;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_MAX_INVENTORY_CAPACITY: usize = 16;

    /// Starting values for a freshly granted health attribute set.
    pub const DEFAULT_HEALTH: f32 = 100.0;
    pub const DEFAULT_HEALTH_MAX: f32 = 100.0;

    pub fn new() -> Self {
        Self {
            max_inventory_capacity: Self::DEFAULT_MAX_INVENTORY_CAPACITY,
        }
    }

    pub fn with_max_inventory_capacity(max_inventory_capacity: usize) -> Self {
        Self {
            max_inventory_capacity,
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new()
    }
}
