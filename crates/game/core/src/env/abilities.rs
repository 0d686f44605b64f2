//! Class-default lookup for abilities and effects.
//!
//! The core receives class *references* to grant; these oracles resolve them
//! to the immutable class data. Class discovery and registration live outside
//! the core (the runtime's registry).

use crate::ability::{AbilityClassId, AbilityDef, EffectClassId, EffectDef};

/// Resolves ability class references to their default data.
pub trait AbilityOracle: Send + Sync {
    /// Returns the class default for an ability, or None for an unregistered
    /// class (callers treat that as an ordinary skip, not an error).
    fn ability_def(&self, class: AbilityClassId) -> Option<AbilityDef>;
}

/// Resolves effect class references to their default data.
pub trait EffectOracle: Send + Sync {
    fn effect_def(&self, class: EffectClassId) -> Option<EffectDef>;
}
