use std::fmt;

use arrayvec::ArrayVec;

use crate::attribute::{AttributeChange, AttributeId};
use crate::config::GameConfig;

/// Deferred reference to an effect class.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EffectClassId(pub u32);

impl fmt::Display for EffectClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "effect:{}", self.0)
    }
}

/// One attribute write an effect performs when applied.
///
/// The magnitude scales linearly with the effect level at application time.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EffectModifier {
    pub attribute: AttributeId,
    pub magnitude: f32,
}

/// Class default data for an effect: the modifiers it writes.
///
/// Effects funnel into meta-attributes (or persistent attributes directly for
/// setup-style effects like initial HealthMax) rather than overwriting state
/// they do not own.
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EffectDef {
    pub modifiers: ArrayVec<EffectModifier, { GameConfig::MAX_EFFECT_MODIFIERS }>,
}

impl EffectDef {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_modifier(mut self, attribute: AttributeId, magnitude: f32) -> Self {
        self.modifiers.push(EffectModifier {
            attribute,
            magnitude,
        });
        self
    }
}

/// Handle to an applied effect, usable for later removal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActiveEffectHandle(pub u32);

impl fmt::Display for ActiveEffectHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fx#{}", self.0)
    }
}

/// Bookkeeping record of one applied effect.
///
/// Application is instantaneous; the record exists so grants can be audited
/// and taken back as a unit.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActiveEffect {
    pub handle: ActiveEffectHandle,
    pub class: EffectClassId,
    pub level: f32,
}

/// Result of applying one effect: the bookkeeping handle plus the committed
/// attribute changes, in commit order.
#[derive(Clone, Debug, PartialEq)]
pub struct EffectOutcome {
    pub handle: ActiveEffectHandle,
    pub changes: Vec<AttributeChange>,
}
