//! Authority-to-observer replication: diff messages and client application.

use arpg_core::tags::native;
use arpg_core::{
    AbilitySet, ActorId, AttributeId, AttributeSetKind, EffectClassId, EffectDef, GameConfig,
    InventoryPermissions, ItemData, ItemDefId, SlotList,
};
use arpg_runtime::{
    ClassRegistry, ClientSession, Event, HealthSetFields, ReplicationMessage, ServerSession,
    Topic,
};

const POTION: ItemDefId = ItemDefId(1);
const VENOM: EffectClassId = EffectClassId(5);

fn registry() -> ClassRegistry {
    let mut registry = ClassRegistry::new();
    registry
        .register_item(
            ItemData::new(POTION, native::ITEM_CONSUMABLE, 10).with_display_name("Health Potion"),
        )
        .register_effect(VENOM, EffectDef::new().with_modifier(AttributeId::Damage, 4.0));
    registry
}

fn server_with_health() -> ServerSession {
    let mut session = ServerSession::new(registry(), GameConfig::default());
    session.spawn_actor(ActorId::PLAYER);
    session
        .grant_ability_set(
            ActorId::PLAYER,
            &AbilitySet::new().with_attribute_set(AttributeSetKind::Health),
        )
        .unwrap();
    session
}

fn client_synced_with(server: &mut ServerSession) -> ClientSession {
    let mut client = ClientSession::new();
    for message in server.drain_outbox() {
        client.apply(message);
    }
    client
}

#[test]
fn damage_produces_exactly_one_health_message() {
    let mut server = server_with_health();
    server.drain_outbox();

    server.apply_damage(ActorId::PLAYER, 30.0).unwrap();

    let messages = server.drain_outbox();
    assert_eq!(messages.len(), 1);
    let ReplicationMessage::HealthSet {
        fields, health, ..
    } = &messages[0]
    else {
        panic!("expected a health message");
    };
    // HealthMax did not change, and meta-attributes never replicate.
    assert_eq!(*fields, HealthSetFields::HEALTH);
    assert_eq!(*health, 70.0);
}

#[test]
fn rejected_damage_produces_no_wire_traffic() {
    let mut server = server_with_health();
    server.drain_outbox();

    // Negative damage is a no-op on the persistent attributes.
    server.apply_damage(ActorId::PLAYER, -10.0).unwrap();
    assert!(server.drain_outbox().is_empty());
}

#[test]
fn effect_application_replicates_its_attribute_fallout() {
    let mut server = server_with_health();
    server.drain_outbox();

    // Venom at level 5 funnels 20 damage through the meta channel.
    let outcome = server.apply_effect(ActorId::PLAYER, VENOM, 5.0).unwrap();
    assert!(!outcome.changes.is_empty());

    let messages = server.drain_outbox();
    assert_eq!(messages.len(), 1);
    let ReplicationMessage::HealthSet { health, .. } = &messages[0] else {
        panic!("expected a health message");
    };
    assert_eq!(*health, 80.0);
}

#[test]
fn client_merges_replicated_health() {
    let mut server = server_with_health();
    let mut client = client_synced_with(&mut server);

    let view = client.actor(ActorId::PLAYER).unwrap();
    assert_eq!(
        view.abilities.attribute_value(AttributeId::Health),
        Some(100.0)
    );

    server.apply_damage(ActorId::PLAYER, 30.0).unwrap();
    let mut events = client.bus().subscribe(Topic::Attribute);
    for message in server.drain_outbox() {
        client.apply(message);
    }

    let view = client.actor(ActorId::PLAYER).unwrap();
    assert_eq!(
        view.abilities.attribute_value(AttributeId::Health),
        Some(70.0)
    );

    // The local notification fired after the merge committed.
    let Ok(Event::Attribute(event)) = events.try_recv() else {
        panic!("expected an attribute event");
    };
    assert_eq!(event.attribute, AttributeId::Health);
    assert_eq!(event.new, 70.0);
}

#[test]
fn replication_merge_preserves_client_prediction() {
    let mut server = server_with_health();
    let mut client = client_synced_with(&mut server);

    // Client predicts 10 damage locally before the server confirms.
    {
        let view = client.actor_mut(ActorId::PLAYER).unwrap();
        let set = view
            .abilities
            .attribute_set_mut(AttributeSetKind::Health)
            .unwrap()
            .as_health_mut()
            .unwrap();
        let mut changes = Vec::new();
        set.apply_damage(10.0, &mut changes);
        assert_eq!(set.health(), 90.0);
    }

    // Authority confirms a different amount.
    server.apply_damage(ActorId::PLAYER, 30.0).unwrap();
    for message in server.drain_outbox() {
        client.apply(message);
    }

    let view = client.actor(ActorId::PLAYER).unwrap();
    assert_eq!(
        view.abilities.attribute_value(AttributeId::Health),
        Some(70.0)
    );
}

#[test]
fn grants_and_slots_mirror_on_the_client() {
    let mut server = server_with_health();
    let mut client = client_synced_with(&mut server);

    let inventory = server
        .create_inventory(
            ActorId::PLAYER,
            SlotList::new(2),
            InventoryPermissions::FULL,
            "bag",
        )
        .unwrap();
    let potion = server.create_item(POTION, 4).unwrap();
    let potion_id = potion.id();
    let slot = server.give_item(ActorId::PLAYER, "bag", potion).unwrap();

    for message in server.drain_outbox() {
        client.apply(message);
    }

    let view = client.actor(ActorId::PLAYER).unwrap();
    assert_eq!(view.grants.len(), 1);
    assert_eq!(view.grants[0].inventory, inventory);
    assert!(view.grants[0].guid.is_valid());

    let mirror = view.inventories.get(&inventory).unwrap();
    assert_eq!(mirror.slots.len(), 2);
    let mirrored = mirror.slots[slot.0].as_ref().unwrap();
    assert_eq!(mirrored.id(), potion_id);
    assert_eq!(mirrored.quantity(), 4);
    assert_eq!(mirrored.owning_inventory(), Some(inventory));
}

#[test]
fn quantity_changes_replicate_in_place() {
    let mut server = server_with_health();
    let mut client = client_synced_with(&mut server);

    let inventory = server
        .create_inventory(
            ActorId::PLAYER,
            SlotList::new(1),
            InventoryPermissions::FULL,
            "bag",
        )
        .unwrap();
    let potion = server.create_item(POTION, 4).unwrap();
    let slot = server.give_item(ActorId::PLAYER, "bag", potion).unwrap();
    for message in server.drain_outbox() {
        client.apply(message);
    }

    server
        .set_item_quantity(ActorId::PLAYER, "bag", slot, 9)
        .unwrap();
    for message in server.drain_outbox() {
        client.apply(message);
    }

    let view = client.actor(ActorId::PLAYER).unwrap();
    let mirrored = view.inventories.get(&inventory).unwrap().slots[slot.0]
        .as_ref()
        .unwrap();
    assert_eq!(mirrored.quantity(), 9);
}
