//! Constructor registry for the closed capability set.
//!
//! Class references in the core ({Ability, Effect, AttributeSet, ItemData})
//! are opaque ids; this registry is where the concrete class data lives. It
//! implements the core oracle traits so a session can hand the whole thing
//! to component operations as their environment.

use std::collections::HashMap;

use arpg_core::{
    AbilityClassId, AbilityDef, AbilityOracle, EffectClassId, EffectDef, EffectOracle, ItemData,
    ItemDefId, ItemOracle,
};

/// Registered class data, keyed by id.
#[derive(Debug, Default)]
pub struct ClassRegistry {
    abilities: HashMap<AbilityClassId, AbilityDef>,
    effects: HashMap<EffectClassId, EffectDef>,
    items: HashMap<ItemDefId, ItemData>,
}

impl ClassRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an ability class; replaces any previous registration.
    pub fn register_ability(&mut self, def: AbilityDef) -> &mut Self {
        self.abilities.insert(def.class, def);
        self
    }

    pub fn register_effect(&mut self, class: EffectClassId, def: EffectDef) -> &mut Self {
        self.effects.insert(class, def);
        self
    }

    pub fn register_item(&mut self, data: ItemData) -> &mut Self {
        self.items.insert(data.def, data);
        self
    }

    pub fn ability_count(&self) -> usize {
        self.abilities.len()
    }
}

impl AbilityOracle for ClassRegistry {
    fn ability_def(&self, class: AbilityClassId) -> Option<AbilityDef> {
        self.abilities.get(&class).copied()
    }
}

impl EffectOracle for ClassRegistry {
    fn effect_def(&self, class: EffectClassId) -> Option<EffectDef> {
        self.effects.get(&class).cloned()
    }
}

impl ItemOracle for ClassRegistry {
    fn item_data(&self, def: ItemDefId) -> Option<ItemData> {
        self.items.get(&def).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arpg_core::AbilityActivationPolicy;

    #[test]
    fn lookup_returns_registered_classes_only() {
        let mut registry = ClassRegistry::new();
        registry.register_ability(AbilityDef::new(
            AbilityClassId(1),
            AbilityActivationPolicy::OnInputPressed,
        ));

        assert!(registry.ability_def(AbilityClassId(1)).is_some());
        assert!(registry.ability_def(AbilityClassId(2)).is_none());
        assert!(registry.effect_def(EffectClassId(1)).is_none());
    }
}
