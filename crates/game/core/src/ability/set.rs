//! Declarative grant bundles: abilities, effects, and attribute sets.
//!
//! An ability set is immutable data describing what a character archetype or
//! piece of equipment bestows. Granting one returns handles for everything
//! bestowed so the whole bundle can be taken back later.

use arrayvec::ArrayVec;

use super::component::AbilitySystemComponent;
use super::{AbilityClassId, AbilitySpecHandle, ActiveEffectHandle, EffectClassId};
use crate::attribute::AttributeSetKind;
use crate::authority::NotAuthoritative;
use crate::config::GameConfig;
use crate::env::GameEnv;
use crate::tags::GameplayTag;

/// One ability entry in a set: the class plus the data needed to grant it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AbilitySetAbility {
    pub ability: AbilityClassId,
    pub level: u32,
    /// Input tag that triggers this ability once granted.
    pub input_tag: GameplayTag,
}

/// One effect entry in a set, applied when the set is granted.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AbilitySetEffect {
    pub effect: EffectClassId,
    pub level: f32,
}

/// One attribute-set entry in a set, instantiated when the set is granted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AbilitySetAttributes {
    pub attribute_set: AttributeSetKind,
}

/// Non-mutable bundle used to grant abilities, effects, and attribute sets.
///
/// Allows sets of capabilities to be assigned to many characters quickly: a
/// "fire mage" set may contain a fireball, a meteor shower, and the mana
/// attribute set.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AbilitySet {
    granted_abilities: ArrayVec<AbilitySetAbility, { GameConfig::MAX_SET_ABILITIES }>,
    granted_effects: ArrayVec<AbilitySetEffect, { GameConfig::MAX_SET_EFFECTS }>,
    granted_attributes: ArrayVec<AbilitySetAttributes, { GameConfig::MAX_SET_ATTRIBUTE_SETS }>,
}

impl AbilitySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ability(
        mut self,
        ability: AbilityClassId,
        level: u32,
        input_tag: GameplayTag,
    ) -> Self {
        self.granted_abilities.push(AbilitySetAbility {
            ability,
            level,
            input_tag,
        });
        self
    }

    pub fn with_effect(mut self, effect: EffectClassId, level: f32) -> Self {
        self.granted_effects.push(AbilitySetEffect { effect, level });
        self
    }

    pub fn with_attribute_set(mut self, attribute_set: AttributeSetKind) -> Self {
        self.granted_attributes
            .push(AbilitySetAttributes { attribute_set });
        self
    }

    /// The ability entries of this set (used by the input-binding layer to
    /// wire actions to tags).
    pub fn abilities(&self) -> &[AbilitySetAbility] {
        &self.granted_abilities
    }

    /// Grants everything in this set to the component. Authority only.
    ///
    /// Attribute sets go first (effects may write into them), then effects,
    /// then abilities. Entries that do not resolve (unregistered class,
    /// duplicate attribute set, full component) are skipped; the grant is
    /// not aborted halfway.
    ///
    /// The returned handles accumulate in `out_handles` and can be used
    /// later to take away everything that was granted.
    pub fn give_to_ability_system(
        &self,
        asc: &mut AbilitySystemComponent,
        env: &GameEnv<'_>,
        out_handles: &mut GrantedHandles,
    ) -> Result<(), NotAuthoritative> {
        NotAuthoritative::check(asc.role())?;

        self.grant_attribute_sets(asc, out_handles);
        self.grant_effects(asc, env, out_handles);
        self.grant_abilities(asc, out_handles);
        Ok(())
    }

    fn grant_attribute_sets(
        &self,
        asc: &mut AbilitySystemComponent,
        out_handles: &mut GrantedHandles,
    ) {
        for entry in &self.granted_attributes {
            // Skip when an attribute set of the same concrete kind already
            // exists on the component.
            if asc.grant_attribute_set(entry.attribute_set) {
                out_handles.add_attribute_set(entry.attribute_set);
            }
        }
    }

    fn grant_effects(
        &self,
        asc: &mut AbilitySystemComponent,
        env: &GameEnv<'_>,
        out_handles: &mut GrantedHandles,
    ) {
        for entry in &self.granted_effects {
            if let Ok(outcome) = asc.apply_effect_to_self(env, entry.effect, entry.level) {
                out_handles.add_effect_handle(outcome.handle);
            }
        }
    }

    fn grant_abilities(&self, asc: &mut AbilitySystemComponent, out_handles: &mut GrantedHandles) {
        for entry in &self.granted_abilities {
            if let Ok(handle) = asc.grant_ability(entry.ability, entry.level, entry.input_tag) {
                out_handles.add_ability_spec_handle(handle);
            }
        }
    }
}

/// Handles to everything one grant bestowed, usable to take it back.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GrantedHandles {
    ability_spec_handles: Vec<AbilitySpecHandle>,
    effect_handles: Vec<ActiveEffectHandle>,
    attribute_sets: Vec<AttributeSetKind>,
}

impl GrantedHandles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_ability_spec_handle(&mut self, handle: AbilitySpecHandle) {
        self.ability_spec_handles.push(handle);
    }

    pub fn add_effect_handle(&mut self, handle: ActiveEffectHandle) {
        self.effect_handles.push(handle);
    }

    pub fn add_attribute_set(&mut self, kind: AttributeSetKind) {
        self.attribute_sets.push(kind);
    }

    pub fn ability_spec_handles(&self) -> &[AbilitySpecHandle] {
        &self.ability_spec_handles
    }

    /// Removes everything these handles refer to from the component.
    /// Authority only. The handles are consumed; calling again is a no-op.
    pub fn take_from_ability_system(
        &mut self,
        asc: &mut AbilitySystemComponent,
    ) -> Result<(), NotAuthoritative> {
        NotAuthoritative::check(asc.role())?;

        for handle in self.ability_spec_handles.drain(..) {
            asc.revoke_ability(handle);
        }
        for handle in self.effect_handles.drain(..) {
            asc.remove_effect(handle);
        }
        for kind in self.attribute_sets.drain(..) {
            asc.remove_attribute_set(kind);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ability::{AbilityActivationPolicy, AbilityDef, EffectDef};
    use crate::attribute::AttributeId;
    use crate::authority::{NetMode, NetRole};
    use crate::env::{AbilityOracle, EffectOracle, Env};
    use crate::tags::native;
    use crate::types::ComponentId;

    struct TestClasses;

    impl AbilityOracle for TestClasses {
        fn ability_def(&self, class: AbilityClassId) -> Option<AbilityDef> {
            (class.0 < 100)
                .then(|| AbilityDef::new(class, AbilityActivationPolicy::OnInputPressed))
        }
    }

    impl EffectOracle for TestClasses {
        fn effect_def(&self, class: EffectClassId) -> Option<EffectDef> {
            match class {
                EffectClassId(1) => {
                    Some(EffectDef::new().with_modifier(AttributeId::Damage, 10.0))
                }
                _ => None,
            }
        }
    }

    static CLASSES: TestClasses = TestClasses;

    fn test_env<'a>() -> GameEnv<'a> {
        Env::new(
            Some(&CLASSES as &dyn AbilityOracle),
            Some(&CLASSES as &dyn EffectOracle),
            None,
            None,
            None,
        )
    }

    fn fire_mage_set() -> AbilitySet {
        AbilitySet::new()
            .with_attribute_set(AttributeSetKind::Health)
            .with_effect(EffectClassId(1), 1.0)
            .with_ability(AbilityClassId(1), 1, native::INPUT_ATTACK)
            .with_ability(AbilityClassId(2), 2, native::INPUT_DODGE)
    }

    #[test]
    fn grant_then_revoke_restores_all_counts() {
        let mut asc =
            AbilitySystemComponent::new(ComponentId(1), NetRole::Authority, NetMode::Standalone);
        let env = test_env();

        let abilities_before = asc.ability_count();
        let sets_before = asc.attribute_sets().len();

        let mut handles = GrantedHandles::new();
        fire_mage_set()
            .give_to_ability_system(&mut asc, &env, &mut handles)
            .unwrap();

        assert_eq!(asc.ability_count(), abilities_before + 2);
        assert_eq!(asc.attribute_sets().len(), sets_before + 1);
        assert_eq!(asc.active_effects().len(), 1);

        handles.take_from_ability_system(&mut asc).unwrap();

        assert_eq!(asc.ability_count(), abilities_before);
        assert_eq!(asc.attribute_sets().len(), sets_before);
        assert!(asc.active_effects().is_empty());

        // Second take is a quiet no-op.
        handles.take_from_ability_system(&mut asc).unwrap();
        assert_eq!(asc.ability_count(), abilities_before);
    }

    #[test]
    fn duplicate_attribute_set_is_skipped() {
        let mut asc =
            AbilitySystemComponent::new(ComponentId(1), NetRole::Authority, NetMode::Standalone);
        let env = test_env();

        let mut first = GrantedHandles::new();
        let mut second = GrantedHandles::new();
        fire_mage_set()
            .give_to_ability_system(&mut asc, &env, &mut first)
            .unwrap();
        fire_mage_set()
            .give_to_ability_system(&mut asc, &env, &mut second)
            .unwrap();

        assert_eq!(asc.attribute_sets().len(), 1);

        // The second grant holds no attribute set, so taking it back leaves
        // the first grant's set in place.
        second.take_from_ability_system(&mut asc).unwrap();
        assert_eq!(asc.attribute_sets().len(), 1);
    }

    #[test]
    fn non_authority_grant_is_rejected() {
        let mut asc = AbilitySystemComponent::new(
            ComponentId(1),
            NetRole::SimulatedProxy,
            NetMode::Client,
        );
        let env = test_env();

        let mut handles = GrantedHandles::new();
        assert!(fire_mage_set()
            .give_to_ability_system(&mut asc, &env, &mut handles)
            .is_err());
        assert_eq!(asc.ability_count(), 0);
    }

    #[test]
    fn unregistered_effect_class_is_skipped() {
        let mut asc =
            AbilitySystemComponent::new(ComponentId(1), NetRole::Authority, NetMode::Standalone);
        let env = test_env();

        let set = AbilitySet::new()
            .with_effect(EffectClassId(99), 1.0)
            .with_ability(AbilityClassId(1), 1, native::INPUT_ATTACK);

        let mut handles = GrantedHandles::new();
        set.give_to_ability_system(&mut asc, &env, &mut handles)
            .unwrap();

        assert!(asc.active_effects().is_empty());
        assert_eq!(asc.ability_count(), 1);
    }
}
