//! End-to-end ability input pipeline through the server session.

use arpg_core::tags::native;
use arpg_core::{
    AbilityActivationPolicy, AbilityClassId, AbilityDef, AbilitySet, ActorId, AttributeId,
    AttributeSetKind, EffectClassId, EffectDef, GameConfig, Tick,
};
use arpg_runtime::{AbilityEvent, ClassRegistry, Event, ServerSession, Topic};

const ATTACK: AbilityClassId = AbilityClassId(1);
const SPRINT: AbilityClassId = AbilityClassId(2);
const BLEED: EffectClassId = EffectClassId(10);

fn registry() -> ClassRegistry {
    let mut registry = ClassRegistry::new();
    registry
        .register_ability(
            AbilityDef::new(ATTACK, AbilityActivationPolicy::OnInputPressed)
                .with_cooldown(Tick(2)),
        )
        .register_ability(AbilityDef::new(
            SPRINT,
            AbilityActivationPolicy::WhileInputActive,
        ))
        .register_effect(BLEED, EffectDef::new().with_modifier(AttributeId::Damage, 5.0));
    registry
}

fn starter_set() -> AbilitySet {
    AbilitySet::new()
        .with_attribute_set(AttributeSetKind::Health)
        .with_ability(ATTACK, 1, native::INPUT_ATTACK)
        .with_ability(SPRINT, 1, native::INPUT_SPRINT)
}

fn session_with_player() -> ServerSession {
    let mut session = ServerSession::new(registry(), GameConfig::default());
    session.spawn_actor(ActorId::PLAYER);
    session
        .grant_ability_set(ActorId::PLAYER, &starter_set())
        .unwrap();
    session
}

#[test]
fn pressed_ability_activates_once_per_press() {
    let mut session = session_with_player();
    let mut events = session.bus().subscribe(Topic::Ability);

    session
        .ability_input_pressed(ActorId::PLAYER, native::INPUT_ATTACK)
        .unwrap();
    let outcome = session.process_ability_input(ActorId::PLAYER).unwrap();
    assert_eq!(outcome.activated.len(), 1);
    assert!(matches!(
        events.try_recv().unwrap(),
        Event::Ability(AbilityEvent::Activated { .. })
    ));

    // No new input events: the second pass attempts nothing.
    let outcome = session.process_ability_input(ActorId::PLAYER).unwrap();
    assert!(outcome.attempted.is_empty());
    assert!(events.try_recv().is_err());
}

#[test]
fn held_ability_reactivates_after_it_ends() {
    let mut session = session_with_player();

    session
        .ability_input_pressed(ActorId::PLAYER, native::INPUT_SPRINT)
        .unwrap();
    let outcome = session.process_ability_input(ActorId::PLAYER).unwrap();
    assert_eq!(outcome.activated.len(), 1);
    let handle = outcome.activated[0];

    // Sprint stays active; holding the key does not re-attempt.
    let outcome = session.process_ability_input(ActorId::PLAYER).unwrap();
    assert!(outcome.attempted.is_empty());

    // Once it ends, the persisting held entry marks it again.
    session
        .components_mut(ActorId::PLAYER)
        .unwrap()
        .abilities
        .end_ability(handle);
    let outcome = session.process_ability_input(ActorId::PLAYER).unwrap();
    assert_eq!(outcome.activated, vec![handle]);
}

#[test]
fn cooldown_rejections_surface_as_failed_attempts() {
    let mut session = session_with_player();

    session
        .ability_input_pressed(ActorId::PLAYER, native::INPUT_ATTACK)
        .unwrap();
    let outcome = session.process_ability_input(ActorId::PLAYER).unwrap();
    let handle = outcome.activated[0];

    // End the attack immediately; the two-tick cooldown still gates it.
    session
        .components_mut(ActorId::PLAYER)
        .unwrap()
        .abilities
        .end_ability(handle);
    session
        .ability_input_pressed(ActorId::PLAYER, native::INPUT_ATTACK)
        .unwrap();
    let outcome = session.process_ability_input(ActorId::PLAYER).unwrap();
    assert_eq!(outcome.attempted, vec![handle]);
    assert!(outcome.activated.is_empty());

    // Advance past the cooldown; the press now lands.
    session.tick();
    session.tick();
    session
        .ability_input_pressed(ActorId::PLAYER, native::INPUT_ATTACK)
        .unwrap();
    let outcome = session.process_ability_input(ActorId::PLAYER).unwrap();
    assert_eq!(outcome.activated, vec![handle]);
}

#[test]
fn block_tag_drops_the_whole_frame() {
    let mut session = session_with_player();
    let mut events = session.bus().subscribe(Topic::Ability);

    session
        .ability_input_pressed(ActorId::PLAYER, native::INPUT_ATTACK)
        .unwrap();
    session
        .components_mut(ActorId::PLAYER)
        .unwrap()
        .abilities
        .add_loose_gameplay_tag(native::STATUS_BLOCK_ABILITY_INPUT);

    let outcome = session.process_ability_input(ActorId::PLAYER).unwrap();
    assert!(outcome.input_blocked);
    assert!(outcome.attempted.is_empty());
    assert!(matches!(
        events.try_recv().unwrap(),
        Event::Ability(AbilityEvent::InputBlocked { .. })
    ));

    // Unblocking later does not resurrect the dropped press.
    session
        .components_mut(ActorId::PLAYER)
        .unwrap()
        .abilities
        .remove_loose_gameplay_tag(native::STATUS_BLOCK_ABILITY_INPUT);
    let outcome = session.process_ability_input(ActorId::PLAYER).unwrap();
    assert!(outcome.attempted.is_empty());
}

#[test]
fn grant_and_revoke_round_trip_keeps_counts() {
    let mut session = ServerSession::new(registry(), GameConfig::default());
    session.spawn_actor(ActorId::PLAYER);

    let before = session
        .components(ActorId::PLAYER)
        .unwrap()
        .abilities
        .ability_count();

    let mut handles = session
        .grant_ability_set(ActorId::PLAYER, &starter_set())
        .unwrap();
    assert_eq!(
        session
            .components(ActorId::PLAYER)
            .unwrap()
            .abilities
            .ability_count(),
        before + 2
    );

    handles
        .take_from_ability_system(&mut session.components_mut(ActorId::PLAYER).unwrap().abilities)
        .unwrap();
    assert_eq!(
        session
            .components(ActorId::PLAYER)
            .unwrap()
            .abilities
            .ability_count(),
        before
    );
}
