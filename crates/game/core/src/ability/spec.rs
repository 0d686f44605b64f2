use std::fmt;

use super::AbilityClassId;
use crate::tags::GameplayTag;
use crate::types::Tick;

/// Handle to a granted ability spec.
///
/// Handles are allocated monotonically per component and are never reused,
/// so a handle that outlives its spec simply stops resolving.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AbilitySpecHandle(pub u32);

impl fmt::Display for AbilitySpecHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "spec#{}", self.0)
    }
}

/// Runtime record of one granted ability on one component.
///
/// Created when an ability set is granted, destroyed when revoked. Owned
/// exclusively by the granting [`super::AbilitySystemComponent`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AbilitySpec {
    pub handle: AbilitySpecHandle,
    pub class: AbilityClassId,
    pub level: u32,
    /// Input tag whose press/release events drive this spec. May be
    /// [`GameplayTag::NONE`] for abilities triggered only by gameplay code.
    pub input_tag: GameplayTag,
    pub active: bool,
    pub input_pressed: bool,
    /// Ready again once the component clock reaches this tick.
    pub cooldown_until: Tick,
}

impl AbilitySpec {
    pub fn new(
        handle: AbilitySpecHandle,
        class: AbilityClassId,
        level: u32,
        input_tag: GameplayTag,
    ) -> Self {
        Self {
            handle,
            class,
            level,
            input_tag,
            active: false,
            input_pressed: false,
            cooldown_until: Tick::ZERO,
        }
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// True when the cooldown gate allows another activation.
    #[inline]
    pub fn is_ready(&self, clock: Tick) -> bool {
        self.cooldown_until <= clock
    }
}
