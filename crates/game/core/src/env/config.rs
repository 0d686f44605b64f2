use crate::config::GameConfig;

/// Tunable configuration exposed to component operations.
pub trait ConfigOracle: Send + Sync {
    /// Upper bound on the slot count an inventory may be created with.
    fn max_inventory_capacity(&self) -> usize {
        GameConfig::DEFAULT_MAX_INVENTORY_CAPACITY
    }
}

impl ConfigOracle for GameConfig {
    fn max_inventory_capacity(&self) -> usize {
        self.max_inventory_capacity
    }
}
