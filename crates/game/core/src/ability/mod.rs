//! Ability system: specs, grants, effects, and the input pipeline.
//!
//! This module contains everything an actor needs to own and trigger
//! abilities:
//! - AbilityDef / AbilitySpec: class data and per-grant runtime records
//! - AbilitySystemComponent: the owning component and activation rules
//! - Input pipeline: frame-accumulated press/hold/release processing
//! - AbilitySet: declarative grant bundles with revocable handles
//! - Effects: modifier bundles routed into attribute sets

mod ability;
mod component;
mod effect;
mod input;
mod set;
mod spec;

pub use ability::{AbilityActivationPolicy, AbilityClassId, AbilityDef};
pub use component::{AbilitySystemComponent, GrantError};
pub use effect::{ActiveEffect, ActiveEffectHandle, EffectClassId, EffectDef, EffectModifier, EffectOutcome};
pub use input::InputProcessOutcome;
pub use set::{AbilitySet, AbilitySetAbility, AbilitySetAttributes, AbilitySetEffect, GrantedHandles};
pub use spec::{AbilitySpec, AbilitySpecHandle};
