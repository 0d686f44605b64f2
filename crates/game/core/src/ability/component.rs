//! The ability system component: owns ability specs, attribute sets, and
//! active effects for one actor.

use arrayvec::ArrayVec;

use super::input::AbilityInputState;
use super::{
    AbilityClassId, AbilitySpec, AbilitySpecHandle, ActiveEffect, ActiveEffectHandle,
    EffectClassId, EffectOutcome,
};
use crate::attribute::{AttributeChange, AttributeId, AttributeSetInstance, AttributeSetKind};
use crate::authority::{NetMode, NetRole, NotAuthoritative};
use crate::config::GameConfig;
use crate::env::{GameEnv, OracleError};
use crate::tags::{GameplayTag, TagSet};
use crate::types::{ComponentId, Tick};

/// Errors surfaced while granting abilities, effects, or attribute sets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum GrantError {
    #[error(transparent)]
    NotAuthoritative(#[from] NotAuthoritative),

    #[error("component cannot hold more than {max} ability specs", max = GameConfig::MAX_ABILITIES)]
    AbilityCapacity,

    #[error("component cannot hold more than {max} active effects", max = GameConfig::MAX_ACTIVE_EFFECTS)]
    EffectCapacity,

    #[error("effect class {0} is not registered")]
    UnknownEffectClass(EffectClassId),

    #[error(transparent)]
    Oracle(#[from] OracleError),
}

/// Owns the activatable abilities of a single actor and drives their
/// activation from accumulated input.
///
/// The component is the only writer of its specs, attribute sets, and effect
/// records. Surrounding frame-sequential execution guarantees single-writer
/// access; no internal locking exists or is needed.
#[derive(Debug)]
pub struct AbilitySystemComponent {
    id: ComponentId,
    role: NetRole,
    net_mode: NetMode,
    clock: Tick,
    next_spec_handle: u32,
    next_effect_handle: u32,
    pub(super) activatable: ArrayVec<AbilitySpec, { GameConfig::MAX_ABILITIES }>,
    attribute_sets: ArrayVec<AttributeSetInstance, { GameConfig::MAX_ATTRIBUTE_SETS }>,
    active_effects: ArrayVec<ActiveEffect, { GameConfig::MAX_ACTIVE_EFFECTS }>,
    pub(super) granted_tags: TagSet,
    pub(super) input: AbilityInputState,
}

impl AbilitySystemComponent {
    pub fn new(id: ComponentId, role: NetRole, net_mode: NetMode) -> Self {
        Self {
            id,
            role,
            net_mode,
            clock: Tick::ZERO,
            next_spec_handle: 0,
            next_effect_handle: 0,
            activatable: ArrayVec::new(),
            attribute_sets: ArrayVec::new(),
            active_effects: ArrayVec::new(),
            granted_tags: TagSet::new(),
            input: AbilityInputState::default(),
        }
    }

    #[inline]
    pub fn id(&self) -> ComponentId {
        self.id
    }

    #[inline]
    pub fn role(&self) -> NetRole {
        self.role
    }

    #[inline]
    pub fn net_mode(&self) -> NetMode {
        self.net_mode
    }

    #[inline]
    pub fn clock(&self) -> Tick {
        self.clock
    }

    pub fn set_clock(&mut self, clock: Tick) {
        self.clock = clock;
    }

    pub fn advance_clock(&mut self, ticks: u64) {
        self.clock = self.clock + ticks;
    }

    // ========================================================================
    // Ability specs
    // ========================================================================

    /// Grants one ability, creating its spec. Authority only.
    pub fn grant_ability(
        &mut self,
        class: AbilityClassId,
        level: u32,
        input_tag: GameplayTag,
    ) -> Result<AbilitySpecHandle, GrantError> {
        NotAuthoritative::check(self.role)?;

        if self.activatable.is_full() {
            return Err(GrantError::AbilityCapacity);
        }

        let handle = AbilitySpecHandle(self.next_spec_handle);
        self.next_spec_handle += 1;
        self.activatable
            .push(AbilitySpec::new(handle, class, level, input_tag));
        Ok(handle)
    }

    /// Removes a granted spec. Revoking an unknown handle is a no-op.
    ///
    /// Stale copies of the handle may remain in the input sets; the pipeline
    /// silently skips handles that no longer resolve.
    pub fn revoke_ability(&mut self, handle: AbilitySpecHandle) -> bool {
        if let Some(index) = self.activatable.iter().position(|s| s.handle == handle) {
            self.activatable.remove(index);
            true
        } else {
            false
        }
    }

    pub fn ability_count(&self) -> usize {
        self.activatable.len()
    }

    pub fn specs(&self) -> &[AbilitySpec] {
        &self.activatable
    }

    pub fn find_spec(&self, handle: AbilitySpecHandle) -> Option<&AbilitySpec> {
        Self::spec_by_handle(&self.activatable, handle)
    }

    pub(super) fn find_spec_mut(&mut self, handle: AbilitySpecHandle) -> Option<&mut AbilitySpec> {
        Self::spec_by_handle_mut(&mut self.activatable, handle)
    }

    pub(super) fn spec_by_handle(
        specs: &[AbilitySpec],
        handle: AbilitySpecHandle,
    ) -> Option<&AbilitySpec> {
        specs.iter().find(|s| s.handle == handle)
    }

    pub(super) fn spec_by_handle_mut(
        specs: &mut [AbilitySpec],
        handle: AbilitySpecHandle,
    ) -> Option<&mut AbilitySpec> {
        specs.iter_mut().find(|s| s.handle == handle)
    }

    // ========================================================================
    // Activation
    // ========================================================================

    /// Attempts to activate the spec behind `handle`.
    ///
    /// A failed attempt (stale handle, unregistered class, already active,
    /// cooldown) is a normal no-op outcome, never an error.
    pub fn try_activate_ability(&mut self, env: &GameEnv<'_>, handle: AbilitySpecHandle) -> bool {
        let clock = self.clock;

        let Some(spec) = Self::spec_by_handle_mut(&mut self.activatable, handle) else {
            return false;
        };
        if spec.active || !spec.is_ready(clock) {
            return false;
        }

        let Some(def) = env
            .abilities()
            .ok()
            .and_then(|oracle| oracle.ability_def(spec.class))
        else {
            return false;
        };

        spec.active = true;
        spec.cooldown_until = clock + def.cooldown.0;
        true
    }

    /// Ends an active ability. Ending an inactive ability is a no-op.
    pub fn end_ability(&mut self, handle: AbilitySpecHandle) {
        if let Some(spec) = self.find_spec_mut(handle) {
            spec.active = false;
        }
    }

    /// Externally cancels an ability. Idempotent: cancelling an already
    /// inactive ability does nothing.
    pub fn cancel_ability(&mut self, handle: AbilitySpecHandle) {
        self.end_ability(handle);
    }

    // ========================================================================
    // Loose gameplay tags
    // ========================================================================

    pub fn has_matching_gameplay_tag(&self, tag: GameplayTag) -> bool {
        self.granted_tags.has_tag_exact(tag)
    }

    pub fn add_loose_gameplay_tag(&mut self, tag: GameplayTag) -> bool {
        self.granted_tags.add_unique(tag)
    }

    pub fn remove_loose_gameplay_tag(&mut self, tag: GameplayTag) -> bool {
        self.granted_tags.remove(tag)
    }

    // ========================================================================
    // Attribute sets
    // ========================================================================

    /// Adds an attribute set instance for the given class.
    ///
    /// Skipped (returns false) when a set of the same concrete kind already
    /// exists on this component, or when the set list is full.
    pub fn grant_attribute_set(&mut self, kind: AttributeSetKind) -> bool {
        if self.attribute_sets.iter().any(|s| s.kind() == kind) {
            return false;
        }
        self.attribute_sets
            .try_push(AttributeSetInstance::construct(kind))
            .is_ok()
    }

    pub fn remove_attribute_set(&mut self, kind: AttributeSetKind) -> bool {
        if let Some(index) = self.attribute_sets.iter().position(|s| s.kind() == kind) {
            self.attribute_sets.remove(index);
            true
        } else {
            false
        }
    }

    pub fn attribute_sets(&self) -> &[AttributeSetInstance] {
        &self.attribute_sets
    }

    pub fn attribute_set(&self, kind: AttributeSetKind) -> Option<&AttributeSetInstance> {
        self.attribute_sets.iter().find(|s| s.kind() == kind)
    }

    pub fn attribute_set_mut(&mut self, kind: AttributeSetKind) -> Option<&mut AttributeSetInstance> {
        self.attribute_sets.iter_mut().find(|s| s.kind() == kind)
    }

    /// Current value of an attribute, from whichever set owns it.
    pub fn attribute_value(&self, id: AttributeId) -> Option<f32> {
        self.attribute_sets
            .iter()
            .find(|s| s.owns_attribute(id))
            .and_then(|s| s.attribute_value(id))
    }

    /// Client-side hook: merges a replicated base value into the owning set.
    pub fn set_base_attribute_value_from_replication(
        &mut self,
        id: AttributeId,
        new_base: f32,
    ) -> Option<AttributeChange> {
        self.attribute_sets
            .iter_mut()
            .find(|s| s.owns_attribute(id))
            .and_then(|s| s.set_base_from_replication(id, new_base))
    }

    // ========================================================================
    // Effects
    // ========================================================================

    /// Applies an effect to this component, routing its modifiers into the
    /// owning attribute sets. Modifiers whose attribute no set owns are
    /// skipped.
    pub fn apply_effect_to_self(
        &mut self,
        env: &GameEnv<'_>,
        class: EffectClassId,
        level: f32,
    ) -> Result<EffectOutcome, GrantError> {
        let def = env
            .effects()?
            .effect_def(class)
            .ok_or(GrantError::UnknownEffectClass(class))?;

        if self.active_effects.is_full() {
            return Err(GrantError::EffectCapacity);
        }

        let handle = ActiveEffectHandle(self.next_effect_handle);
        self.next_effect_handle += 1;
        self.active_effects.push(ActiveEffect {
            handle,
            class,
            level,
        });

        let mut changes = Vec::new();
        for modifier in &def.modifiers {
            let scaled = modifier.magnitude * level;
            if let Some(set) = self
                .attribute_sets
                .iter_mut()
                .find(|s| s.owns_attribute(modifier.attribute))
            {
                set.set_attribute(modifier.attribute, scaled, &mut changes);
            }
        }

        Ok(EffectOutcome { handle, changes })
    }

    /// Drops the bookkeeping record of an applied effect.
    pub fn remove_effect(&mut self, handle: ActiveEffectHandle) -> bool {
        if let Some(index) = self.active_effects.iter().position(|e| e.handle == handle) {
            self.active_effects.remove(index);
            true
        } else {
            false
        }
    }

    pub fn active_effects(&self) -> &[ActiveEffect] {
        &self.active_effects
    }

    /// Routes incoming damage through the Damage meta channel of the health
    /// set. Returns the committed changes; empty when no health set exists.
    pub fn apply_damage(&mut self, amount: f32) -> Vec<AttributeChange> {
        let mut changes = Vec::new();
        if let Some(set) = self
            .attribute_sets
            .iter_mut()
            .find_map(AttributeSetInstance::as_health_mut)
        {
            set.apply_damage(amount, &mut changes);
        }
        changes
    }

    /// Routes incoming healing through the Healing meta channel.
    pub fn apply_healing(&mut self, amount: f32) -> Vec<AttributeChange> {
        let mut changes = Vec::new();
        if let Some(set) = self
            .attribute_sets
            .iter_mut()
            .find_map(AttributeSetInstance::as_health_mut)
        {
            set.apply_healing(amount, &mut changes);
        }
        changes
    }
}
