use std::fmt;

use crate::types::Tick;

/// Deferred reference to an ability class.
///
/// Resolved to an [`AbilityDef`] through the ability oracle when class-level
/// data (activation policy, cooldown) is needed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AbilityClassId(pub u32);

impl fmt::Display for AbilityClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ability:{}", self.0)
    }
}

/// How an ability reacts to its bound input.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum AbilityActivationPolicy {
    /// Activated when its input is pressed.
    #[default]
    OnInputPressed,
    /// Activated by gameplay code on release; the pipeline only forwards the
    /// release notification, it never auto-activates this policy.
    OnInputReleased,
    /// Repeatedly activated while its input is held down.
    WhileInputActive,
}

/// Class default data for an ability.
///
/// This is the immutable per-class record the oracle hands out; per-grant
/// state lives in [`super::AbilitySpec`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AbilityDef {
    pub class: AbilityClassId,
    pub activation_policy: AbilityActivationPolicy,
    /// Ticks after a successful activation before the ability is ready
    /// again. Zero means no cooldown.
    pub cooldown: Tick,
}

impl AbilityDef {
    pub fn new(class: AbilityClassId, activation_policy: AbilityActivationPolicy) -> Self {
        Self {
            class,
            activation_policy,
            cooldown: Tick::ZERO,
        }
    }

    pub fn with_cooldown(mut self, cooldown: Tick) -> Self {
        self.cooldown = cooldown;
        self
    }
}
