//! Item definition lookup.

use crate::inventory::{ItemData, ItemDefId};

/// Resolves item definition references stored outside the core.
pub trait ItemOracle: Send + Sync {
    /// Returns the definition for an item, or None for an unregistered id.
    fn item_data(&self, def: ItemDefId) -> Option<ItemData>;
}
