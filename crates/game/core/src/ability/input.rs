//! Frame-accumulated ability input processing.
//!
//! Press/release events arrive synchronously from the input-binding layer and
//! accumulate in three handle sets. Once per simulation tick,
//! [`AbilitySystemComponent::process_ability_input`] turns the accumulated
//! state into activation attempts and press/release notifications. The
//! pipeline only ever observes cumulative state, never individual edges,
//! except through the frame-scoped `pressed`/`released` one-shot sets.

use arrayvec::ArrayVec;

use super::component::AbilitySystemComponent;
use super::{AbilityActivationPolicy, AbilityClassId, AbilityDef, AbilitySpecHandle};
use crate::config::GameConfig;
use crate::env::GameEnv;
use crate::tags::{GameplayTag, native};

type HandleList = ArrayVec<AbilitySpecHandle, { GameConfig::MAX_ABILITIES }>;

/// The three input sets maintained between frames.
///
/// `pressed` and `released` are frame-scoped one-shots cleared by the
/// pipeline; `held` persists and is maintained incrementally by the event
/// handlers only.
#[derive(Debug, Default)]
pub(super) struct AbilityInputState {
    pub(super) pressed: HandleList,
    pub(super) held: HandleList,
    pub(super) released: HandleList,
}

impl AbilityInputState {
    pub(super) fn add_unique(list: &mut HandleList, handle: AbilitySpecHandle) {
        if !list.contains(&handle) {
            // Capacity equals the spec list capacity, so this cannot overflow
            // with live handles; a full list of stale handles just drops the
            // oldest-possible duplicate work.
            let _ = list.try_push(handle);
        }
    }

    pub(super) fn remove(list: &mut HandleList, handle: AbilitySpecHandle) {
        if let Some(index) = list.iter().position(|&h| h == handle) {
            list.remove(index);
        }
    }
}

/// Everything one pipeline pass decided, in decision order.
///
/// Returned rather than dispatched so callers control notification fan-out
/// and tests can observe the pipeline without side channels.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InputProcessOutcome {
    /// True when the block tag short-circuited the pass; all input state was
    /// cleared and nothing else was processed.
    pub input_blocked: bool,
    /// Handles attempted for activation, insertion order, deduplicated.
    pub attempted: Vec<AbilitySpecHandle>,
    /// Subset of `attempted` that actually activated.
    pub activated: Vec<AbilitySpecHandle>,
    /// Active specs whose input was pressed again this frame (combo chains
    /// react to these instead of reactivating).
    pub press_notifications: Vec<AbilitySpecHandle>,
    /// Active specs whose input was released this frame.
    pub release_notifications: Vec<AbilitySpecHandle>,
}

impl AbilitySystemComponent {
    /// Call when a player character triggers an ability input.
    ///
    /// Finds every spec bound to the tag and stores its handle for the next
    /// pipeline pass. May fire any number of times between passes.
    pub fn ability_input_tag_pressed(&mut self, tag: GameplayTag) {
        if !tag.is_valid() {
            return;
        }
        for spec in &self.activatable {
            if spec.input_tag == tag {
                AbilityInputState::add_unique(&mut self.input.pressed, spec.handle);
                AbilityInputState::add_unique(&mut self.input.held, spec.handle);
            }
        }
    }

    /// Call when a player character releases an ability input.
    ///
    /// Calling twice without an intervening press is harmless: the handle is
    /// already out of `held` and `released` deduplicates.
    pub fn ability_input_tag_released(&mut self, tag: GameplayTag) {
        if !tag.is_valid() {
            return;
        }
        for spec in &self.activatable {
            if spec.input_tag == tag {
                AbilityInputState::add_unique(&mut self.input.released, spec.handle);
                AbilityInputState::remove(&mut self.input.held, spec.handle);
            }
        }
    }

    /// Processes all accumulated ability input for this frame.
    ///
    /// Runs once per simulation tick on every machine that predicts input
    /// locally. Must never run on a dedicated server.
    ///
    /// Ordering within the pass: held-triggered candidates are considered
    /// before press-triggered ones; activation attempts run in the order
    /// handles were marked, duplicates collapsed; release notifications are
    /// dispatched after activations; `pressed`/`released` are cleared at the
    /// end while `held` is left to the event handlers.
    pub fn process_ability_input(&mut self, env: &GameEnv<'_>) -> InputProcessOutcome {
        assert!(
            !self.net_mode().is_dedicated_server(),
            "ability input must not be processed on a dedicated server"
        );

        let mut outcome = InputProcessOutcome::default();

        if self.granted_tags.has_tag_exact(native::STATUS_BLOCK_ABILITY_INPUT) {
            self.clear_ability_input();
            outcome.input_blocked = true;
            return outcome;
        }

        let mut to_activate = HandleList::new();

        // Abilities that activate while their input is held down.
        for &handle in &self.input.held {
            let Some(spec) = Self::spec_by_handle(&self.activatable, handle) else {
                continue;
            };
            if spec.active {
                continue;
            }
            let Some(def) = ability_def(env, spec.class) else {
                continue;
            };
            if def.activation_policy == AbilityActivationPolicy::WhileInputActive {
                AbilityInputState::add_unique(&mut to_activate, handle);
            }
        }

        // Abilities whose input was pressed this frame.
        for &handle in &self.input.pressed {
            let Some(spec) = Self::spec_by_handle_mut(&mut self.activatable, handle) else {
                continue;
            };
            let Some(def) = ability_def(env, spec.class) else {
                continue;
            };

            spec.input_pressed = true;

            if spec.active {
                // Already running: forward the input event instead of
                // reactivating.
                outcome.press_notifications.push(handle);
            } else if def.activation_policy == AbilityActivationPolicy::OnInputPressed {
                AbilityInputState::add_unique(&mut to_activate, handle);
            }
        }

        // Attempt activation in marked order. A failed attempt is a normal
        // no-op outcome and is not retried this frame.
        for &handle in &to_activate {
            outcome.attempted.push(handle);
            if self.try_activate_ability(env, handle) {
                outcome.activated.push(handle);
            }
        }

        // Abilities whose input was released this frame.
        for &handle in &self.input.released {
            let Some(spec) = Self::spec_by_handle_mut(&mut self.activatable, handle) else {
                continue;
            };

            spec.input_pressed = false;

            if spec.active {
                outcome.release_notifications.push(handle);
            }
        }

        self.input.pressed.clear();
        self.input.released.clear();

        outcome
    }

    /// Clears all ability input awaiting processing, including `held`.
    pub fn clear_ability_input(&mut self) {
        self.input.pressed.clear();
        self.input.held.clear();
        self.input.released.clear();
    }
}

fn ability_def(env: &GameEnv<'_>, class: AbilityClassId) -> Option<AbilityDef> {
    env.abilities()
        .ok()
        .and_then(|oracle| oracle.ability_def(class))
}
