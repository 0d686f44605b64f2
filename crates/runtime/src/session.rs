//! Server and client session objects.
//!
//! The server session is the injected authoritative context: it owns the
//! per-actor component pairs, the class registry, the event bus, and the
//! replication outbox. Every mutating entry point re-checks authority and
//! logs-and-drops violations rather than crashing or half-applying. After a
//! mutation commits, the session publishes bus events and queues replication
//! messages; a transport (not modeled here) delivers the messages to client
//! sessions in order.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use arpg_core::{
    compute_seed, AbilityOracle, AbilitySet, AbilitySystemComponent, ActorId, AttributeChange,
    AttributeId, AttributeSetKind, ComponentId, ConfigOracle, EffectClassId, EffectOracle,
    EffectOutcome, Env, GameConfig, GameEnv, GameplayTag, GrantedHandles, InputProcessOutcome,
    InventoryGrant, InventoryId, InventoryPermissions, InventorySystemComponent, ItemDefId,
    ItemId, ItemInstance, ItemOracle, NetMode, NetRole, NotAuthoritative, PcgRng, ReceiveError,
    RngOracle, SlotIndex, SlotList, TransferError,
};

use crate::error::{Result, RuntimeError};
use crate::events::{AbilityEvent, AttributeEvent, Event, EventBus, InventoryEvent};
use crate::registry::ClassRegistry;
use crate::replication::{
    diff_health, health_snapshot, HealthSetFields, HealthSnapshot, ItemFields, ReplicationMessage,
};

/// Seed domain for session-level item id generation (components use their
/// own ids as domains).
const ITEM_ID_DOMAIN: u64 = u64::MAX;

/// The component pair attached to one simulated actor.
#[derive(Debug)]
pub struct ActorComponents {
    pub abilities: AbilitySystemComponent,
    pub inventory: InventorySystemComponent,
}

/// The authoritative session.
pub struct ServerSession {
    registry: ClassRegistry,
    config: GameConfig,
    rng: PcgRng,
    bus: EventBus,
    actors: BTreeMap<ActorId, ActorComponents>,
    outbox: Vec<ReplicationMessage>,
    item_nonce: u64,
}

impl ServerSession {
    pub fn new(registry: ClassRegistry, config: GameConfig) -> Self {
        Self {
            registry,
            config,
            rng: PcgRng,
            bus: EventBus::new(),
            actors: BTreeMap::new(),
            outbox: Vec::new(),
            item_nonce: 0,
        }
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn registry(&self) -> &ClassRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut ClassRegistry {
        &mut self.registry
    }

    /// Takes everything queued for replication since the last drain.
    pub fn drain_outbox(&mut self) -> Vec<ReplicationMessage> {
        std::mem::take(&mut self.outbox)
    }

    /// Registers an actor with a fresh component pair.
    pub fn spawn_actor(&mut self, actor: ActorId) {
        let base = (actor.0 as u64) << 1;
        self.actors.insert(
            actor,
            ActorComponents {
                abilities: AbilitySystemComponent::new(
                    ComponentId(base),
                    NetRole::Authority,
                    NetMode::ListenServer,
                ),
                inventory: InventorySystemComponent::new(ComponentId(base | 1), NetRole::Authority),
            },
        );
    }

    pub fn components(&self, actor: ActorId) -> Result<&ActorComponents> {
        self.actors
            .get(&actor)
            .ok_or(RuntimeError::UnknownActor { actor })
    }

    pub fn components_mut(&mut self, actor: ActorId) -> Result<&mut ActorComponents> {
        self.actors
            .get_mut(&actor)
            .ok_or(RuntimeError::UnknownActor { actor })
    }

    /// Advances every actor's ability clock by one simulation tick.
    pub fn tick(&mut self) {
        for components in self.actors.values_mut() {
            components.abilities.advance_clock(1);
        }
    }

    /// Splits the session into an oracle environment plus the mutable parts,
    /// so component operations can run while the env borrows stay live.
    fn split(
        &mut self,
    ) -> (
        GameEnv<'_>,
        &mut BTreeMap<ActorId, ActorComponents>,
        &EventBus,
        &mut Vec<ReplicationMessage>,
    ) {
        let Self {
            registry,
            config,
            rng,
            bus,
            actors,
            outbox,
            ..
        } = self;
        let env: GameEnv<'_> = Env::new(
            Some(&*registry as &dyn AbilityOracle),
            Some(&*registry as &dyn EffectOracle),
            Some(&*registry as &dyn ItemOracle),
            Some(&*config as &dyn ConfigOracle),
            Some(&*rng as &dyn RngOracle),
        );
        (env, actors, &*bus, outbox)
    }

    // ========================================================================
    // Abilities and attributes
    // ========================================================================

    /// Grants an ability set to an actor, replicating any attribute fallout.
    pub fn grant_ability_set(&mut self, actor: ActorId, set: &AbilitySet) -> Result<GrantedHandles> {
        let (env, actors, bus, outbox) = self.split();
        let components = actors
            .get_mut(&actor)
            .ok_or(RuntimeError::UnknownActor { actor })?;

        let before = health_snapshot(&components.abilities);
        let mut handles = GrantedHandles::new();
        if let Err(err) = set.give_to_ability_system(&mut components.abilities, &env, &mut handles)
        {
            warn!(%actor, error = %err, "dropping off-authority ability set grant");
            return Err(err.into());
        }

        let after = health_snapshot(&components.abilities);
        publish_health_events(bus, actor, before, after);
        if let Some(message) = diff_health(actor, before, after) {
            outbox.push(message);
        }
        Ok(handles)
    }

    /// Forwards a press event from the input-binding layer.
    pub fn ability_input_pressed(&mut self, actor: ActorId, tag: GameplayTag) -> Result<()> {
        self.components_mut(actor)?
            .abilities
            .ability_input_tag_pressed(tag);
        Ok(())
    }

    /// Forwards a release event from the input-binding layer.
    pub fn ability_input_released(&mut self, actor: ActorId, tag: GameplayTag) -> Result<()> {
        self.components_mut(actor)?
            .abilities
            .ability_input_tag_released(tag);
        Ok(())
    }

    /// Runs one pipeline pass for an actor and publishes what happened.
    pub fn process_ability_input(&mut self, actor: ActorId) -> Result<InputProcessOutcome> {
        let (env, actors, bus, _outbox) = self.split();
        let components = actors
            .get_mut(&actor)
            .ok_or(RuntimeError::UnknownActor { actor })?;

        let outcome = components.abilities.process_ability_input(&env);

        if outcome.input_blocked {
            bus.publish(Event::Ability(AbilityEvent::InputBlocked { actor }));
        }
        for &handle in &outcome.attempted {
            if !outcome.activated.contains(&handle) {
                bus.publish(Event::Ability(AbilityEvent::ActivationFailed { actor, handle }));
            }
        }
        for &handle in &outcome.activated {
            bus.publish(Event::Ability(AbilityEvent::Activated { actor, handle }));
        }
        for &handle in &outcome.press_notifications {
            bus.publish(Event::Ability(AbilityEvent::PressForwarded { actor, handle }));
        }
        for &handle in &outcome.release_notifications {
            bus.publish(Event::Ability(AbilityEvent::ReleaseForwarded { actor, handle }));
        }

        Ok(outcome)
    }

    /// Routes incoming damage through the actor's health set.
    pub fn apply_damage(&mut self, actor: ActorId, amount: f32) -> Result<Vec<AttributeChange>> {
        let (_env, actors, bus, outbox) = self.split();
        let components = actors
            .get_mut(&actor)
            .ok_or(RuntimeError::UnknownActor { actor })?;

        let before = health_snapshot(&components.abilities);
        let changes = components.abilities.apply_damage(amount);
        let after = health_snapshot(&components.abilities);

        publish_attribute_changes(bus, actor, &changes);
        if let Some(message) = diff_health(actor, before, after) {
            outbox.push(message);
        }
        Ok(changes)
    }

    /// Routes incoming healing through the actor's health set.
    pub fn apply_healing(&mut self, actor: ActorId, amount: f32) -> Result<Vec<AttributeChange>> {
        let (_env, actors, bus, outbox) = self.split();
        let components = actors
            .get_mut(&actor)
            .ok_or(RuntimeError::UnknownActor { actor })?;

        let before = health_snapshot(&components.abilities);
        let changes = components.abilities.apply_healing(amount);
        let after = health_snapshot(&components.abilities);

        publish_attribute_changes(bus, actor, &changes);
        if let Some(message) = diff_health(actor, before, after) {
            outbox.push(message);
        }
        Ok(changes)
    }

    /// Applies a registered effect to an actor.
    pub fn apply_effect(
        &mut self,
        actor: ActorId,
        class: EffectClassId,
        level: f32,
    ) -> Result<EffectOutcome> {
        let (env, actors, bus, outbox) = self.split();
        let components = actors
            .get_mut(&actor)
            .ok_or(RuntimeError::UnknownActor { actor })?;

        let before = health_snapshot(&components.abilities);
        let outcome = match components.abilities.apply_effect_to_self(&env, class, level) {
            Ok(outcome) => outcome,
            Err(err) => {
                debug!(%actor, error = %err, "effect application rejected");
                return Err(err.into());
            }
        };

        let after = health_snapshot(&components.abilities);
        publish_attribute_changes(bus, actor, &outcome.changes);
        if let Some(message) = diff_health(actor, before, after) {
            outbox.push(message);
        }
        Ok(outcome)
    }

    // ========================================================================
    // Items and inventories
    // ========================================================================

    /// Creates an unowned item instance from a registered definition.
    pub fn create_item(&mut self, def: ItemDefId, quantity: u32) -> Result<ItemInstance> {
        let data = self
            .registry
            .item_data(def)
            .ok_or(RuntimeError::UnknownItemDef { def })?;

        let seed = compute_seed(ITEM_ID_DOMAIN, self.item_nonce, 2);
        self.item_nonce += 1;
        let id = ItemId(self.rng.next_u128(seed));

        ItemInstance::create(NetRole::Authority, id, &data, quantity).map_err(Into::into)
    }

    /// Creates an inventory on an actor and replicates its existence.
    pub fn create_inventory(
        &mut self,
        actor: ActorId,
        slots: SlotList,
        permissions: InventoryPermissions,
        name: &str,
    ) -> Result<InventoryId> {
        let (env, actors, bus, outbox) = self.split();
        let components = actors
            .get_mut(&actor)
            .ok_or(RuntimeError::UnknownActor { actor })?;

        let capacity = slots.len();
        match components
            .inventory
            .create_and_give_inventory(&env, slots, permissions, name)
        {
            Ok(inventory) => {
                outbox.push(ReplicationMessage::InventoryCreated {
                    actor,
                    inventory,
                    capacity,
                });
                outbox.push(ReplicationMessage::InventoryGrants {
                    actor,
                    grants: components.inventory.grants().copied().collect(),
                });

                bus.publish(Event::Inventory(InventoryEvent::Created { actor, inventory }));
                if let Some(grant) = components.inventory.grant_for_inventory(inventory) {
                    bus.publish(Event::Inventory(InventoryEvent::GrantAdded {
                        actor,
                        grant: grant.guid,
                    }));
                }
                Ok(inventory)
            }
            Err(err) => {
                warn!(%actor, error = %err, "inventory creation rejected");
                Err(err.into())
            }
        }
    }

    /// Receives an unowned item into an actor's named inventory.
    pub fn give_item(
        &mut self,
        actor: ActorId,
        name: &str,
        item: ItemInstance,
    ) -> Result<SlotIndex> {
        let (_env, actors, bus, outbox) = self.split();
        let components = actors
            .get_mut(&actor)
            .ok_or(RuntimeError::UnknownActor { actor })?;

        let Some(inventory) = components.inventory.get_inventory(name).map(|i| i.id()) else {
            debug!(%actor, name, "item receive rejected: unknown inventory");
            return Err(ReceiveError::UnknownInventory {
                name: name.to_owned(),
                item,
            }
            .into());
        };

        let item_id = item.id();
        match components.inventory.try_receive_item(name, item) {
            Ok(slot) => {
                let stored = components
                    .inventory
                    .inventory_by_id(inventory)
                    .and_then(|inv| inv.slot(slot).item().cloned());
                outbox.push(ReplicationMessage::InventorySlot {
                    actor,
                    inventory,
                    slot,
                    item: stored,
                });

                bus.publish(Event::Inventory(InventoryEvent::ItemReceived {
                    actor,
                    inventory,
                    slot,
                    item: item_id,
                }));
                bus.publish(Event::Inventory(InventoryEvent::Changed { actor, inventory }));
                Ok(slot)
            }
            Err(err) => {
                match &err {
                    ReceiveError::NotAuthoritative { role, .. } => {
                        warn!(%actor, %role, "dropping off-authority item receive");
                    }
                    other => debug!(%actor, error = %other, "item receive rejected"),
                }
                Err(err.into())
            }
        }
    }

    /// Takes an item out of an actor's named inventory.
    pub fn remove_item(
        &mut self,
        actor: ActorId,
        name: &str,
        slot: SlotIndex,
    ) -> Result<ItemInstance> {
        let (_env, actors, bus, outbox) = self.split();
        let components = actors
            .get_mut(&actor)
            .ok_or(RuntimeError::UnknownActor { actor })?;

        let inventory = components.inventory.get_inventory(name).map(|i| i.id());
        match components.inventory.remove_item(name, slot) {
            Ok(item) => {
                if let Some(inventory) = inventory {
                    outbox.push(ReplicationMessage::InventorySlot {
                        actor,
                        inventory,
                        slot,
                        item: None,
                    });
                    bus.publish(Event::Inventory(InventoryEvent::ItemRemoved {
                        actor,
                        inventory,
                        slot,
                        item: item.id(),
                    }));
                    bus.publish(Event::Inventory(InventoryEvent::Changed { actor, inventory }));
                }
                Ok(item)
            }
            Err(err) => {
                match &err {
                    TransferError::NotAuthoritative(inner) => {
                        warn!(%actor, error = %inner, "dropping off-authority item removal");
                    }
                    other => debug!(%actor, error = %other, "item removal rejected"),
                }
                Err(err.into())
            }
        }
    }

    /// Moves an item between two of an actor's inventories.
    pub fn transfer_item(
        &mut self,
        actor: ActorId,
        from: &str,
        from_slot: SlotIndex,
        to: &str,
    ) -> Result<SlotIndex> {
        let (_env, actors, bus, outbox) = self.split();
        let components = actors
            .get_mut(&actor)
            .ok_or(RuntimeError::UnknownActor { actor })?;

        let from_id = components.inventory.get_inventory(from).map(|i| i.id());
        let to_id = components.inventory.get_inventory(to).map(|i| i.id());

        match components.inventory.transfer_between(from, from_slot, to) {
            Ok(dest_slot) => {
                if let Some(inventory) = from_id {
                    outbox.push(ReplicationMessage::InventorySlot {
                        actor,
                        inventory,
                        slot: from_slot,
                        item: None,
                    });
                    bus.publish(Event::Inventory(InventoryEvent::Changed { actor, inventory }));
                }
                if let Some(inventory) = to_id {
                    let stored = components
                        .inventory
                        .inventory_by_id(inventory)
                        .and_then(|inv| inv.slot(dest_slot).item().cloned());
                    if let Some(item) = stored.as_ref().map(|i| i.id()) {
                        bus.publish(Event::Inventory(InventoryEvent::ItemReceived {
                            actor,
                            inventory,
                            slot: dest_slot,
                            item,
                        }));
                    }
                    outbox.push(ReplicationMessage::InventorySlot {
                        actor,
                        inventory,
                        slot: dest_slot,
                        item: stored,
                    });
                    bus.publish(Event::Inventory(InventoryEvent::Changed { actor, inventory }));
                }
                Ok(dest_slot)
            }
            Err(err) => {
                match &err {
                    TransferError::NotAuthoritative(inner) => {
                        warn!(%actor, error = %inner, "dropping off-authority transfer");
                    }
                    other => debug!(%actor, error = %other, "transfer rejected"),
                }
                Err(err.into())
            }
        }
    }

    /// Sets the stack quantity of an owned item. Authority only.
    pub fn set_item_quantity(
        &mut self,
        actor: ActorId,
        name: &str,
        slot: SlotIndex,
        quantity: u32,
    ) -> Result<()> {
        let (_env, actors, bus, outbox) = self.split();
        let components = actors
            .get_mut(&actor)
            .ok_or(RuntimeError::UnknownActor { actor })?;

        if let Err(err) = NotAuthoritative::check(components.inventory.role()) {
            warn!(%actor, error = %err, "dropping off-authority quantity change");
            return Err(err.into());
        }

        let Some(inventory) = components.inventory.get_inventory_mut(name) else {
            return Err(TransferError::UnknownInventory {
                name: name.to_owned(),
            }
            .into());
        };
        let inventory_id = inventory.id();
        let Some(item) = inventory.item_mut(slot) else {
            return Err(RuntimeError::UnknownSlot {
                actor,
                name: name.to_owned(),
                slot: slot.0,
            });
        };

        item.set_quantity(quantity);
        let max_quantity = item.max_quantity();

        outbox.push(ReplicationMessage::ItemQuantity {
            actor,
            inventory: inventory_id,
            slot,
            fields: ItemFields::QUANTITY,
            quantity,
            max_quantity,
        });
        bus.publish(Event::Inventory(InventoryEvent::Changed {
            actor,
            inventory: inventory_id,
        }));
        Ok(())
    }
}

fn publish_attribute_changes(bus: &EventBus, actor: ActorId, changes: &[AttributeChange]) {
    for change in changes {
        bus.publish(Event::Attribute(AttributeEvent {
            actor,
            attribute: change.attribute,
            old: change.old,
            new: change.new,
        }));
    }
}

fn publish_health_events(
    bus: &EventBus,
    actor: ActorId,
    before: Option<HealthSnapshot>,
    after: Option<HealthSnapshot>,
) {
    let Some(after) = after else { return };
    let before = before.unwrap_or_default();

    if before.health != after.health {
        bus.publish(Event::Attribute(AttributeEvent {
            actor,
            attribute: AttributeId::Health,
            old: before.health,
            new: after.health,
        }));
    }
    if before.health_max != after.health_max {
        bus.publish(Event::Attribute(AttributeEvent {
            actor,
            attribute: AttributeId::HealthMax,
            old: before.health_max,
            new: after.health_max,
        }));
    }
}

// ============================================================================
// Client side
// ============================================================================

/// Observer mirror of one replicated inventory.
#[derive(Clone, Debug, Default)]
pub struct InventoryView {
    pub slots: Vec<Option<ItemInstance>>,
}

/// Observer mirror of one actor's replicated component state.
#[derive(Debug)]
pub struct ClientActorView {
    pub abilities: AbilitySystemComponent,
    pub grants: Vec<InventoryGrant>,
    pub inventories: BTreeMap<InventoryId, InventoryView>,
}

/// A non-authoritative session applying replicated state.
///
/// Attribute values go through the prediction-preserving merge on the
/// mirrored ability component; inventory and grant state is overwritten with
/// the authoritative values. Local notifications fire only after a message
/// has been applied in full.
pub struct ClientSession {
    bus: EventBus,
    actors: BTreeMap<ActorId, ClientActorView>,
}

impl ClientSession {
    pub fn new() -> Self {
        Self {
            bus: EventBus::new(),
            actors: BTreeMap::new(),
        }
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn actor(&self, actor: ActorId) -> Option<&ClientActorView> {
        self.actors.get(&actor)
    }

    pub fn actor_mut(&mut self, actor: ActorId) -> Option<&mut ClientActorView> {
        self.actors.get_mut(&actor)
    }

    /// Applies one replication message and raises local notifications.
    pub fn apply(&mut self, message: ReplicationMessage) {
        let Self { bus, actors } = self;

        match message {
            ReplicationMessage::HealthSet {
                actor,
                fields,
                health,
                health_max,
            } => {
                let view = ensure_actor(actors, actor);
                if view
                    .abilities
                    .attribute_set(AttributeSetKind::Health)
                    .is_none()
                {
                    view.abilities.grant_attribute_set(AttributeSetKind::Health);
                }

                let mut changes = Vec::new();
                if fields.contains(HealthSetFields::HEALTH) {
                    changes.extend(view.abilities.set_base_attribute_value_from_replication(
                        AttributeId::Health,
                        health,
                    ));
                }
                if fields.contains(HealthSetFields::HEALTH_MAX) {
                    changes.extend(view.abilities.set_base_attribute_value_from_replication(
                        AttributeId::HealthMax,
                        health_max,
                    ));
                }
                publish_attribute_changes(bus, actor, &changes);
            }

            ReplicationMessage::InventoryCreated {
                actor,
                inventory,
                capacity,
            } => {
                let view = ensure_actor(actors, actor);
                view.inventories.insert(
                    inventory,
                    InventoryView {
                        slots: vec![None; capacity],
                    },
                );
                bus.publish(Event::Inventory(InventoryEvent::Created { actor, inventory }));
            }

            ReplicationMessage::InventoryGrants { actor, grants } => {
                let view = ensure_actor(actors, actor);
                view.grants = grants;
                bus.publish(Event::Inventory(InventoryEvent::GrantsUpdated { actor }));
            }

            ReplicationMessage::InventorySlot {
                actor,
                inventory,
                slot,
                item,
            } => {
                let view = ensure_actor(actors, actor);
                let mirror = view.inventories.entry(inventory).or_default();
                if mirror.slots.len() <= slot.0 {
                    mirror.slots.resize_with(slot.0 + 1, || None);
                }

                let removed = mirror.slots[slot.0].take().map(|i| i.id());
                let received = item.as_ref().map(|i| i.id());
                mirror.slots[slot.0] = item;

                if let Some(item) = removed.filter(|_| received.is_none()) {
                    bus.publish(Event::Inventory(InventoryEvent::ItemRemoved {
                        actor,
                        inventory,
                        slot,
                        item,
                    }));
                }
                if let Some(item) = received {
                    bus.publish(Event::Inventory(InventoryEvent::ItemReceived {
                        actor,
                        inventory,
                        slot,
                        item,
                    }));
                }
                bus.publish(Event::Inventory(InventoryEvent::Changed { actor, inventory }));
            }

            ReplicationMessage::ItemQuantity {
                actor,
                inventory,
                slot,
                fields,
                quantity,
                max_quantity,
            } => {
                let view = ensure_actor(actors, actor);
                let Some(item) = view
                    .inventories
                    .get_mut(&inventory)
                    .and_then(|mirror| mirror.slots.get_mut(slot.0))
                    .and_then(|slot| slot.as_mut())
                else {
                    debug!(%actor, %inventory, "quantity update for unmirrored item dropped");
                    return;
                };

                if fields.contains(ItemFields::MAX_QUANTITY) {
                    item.set_max_quantity(max_quantity);
                }
                if fields.contains(ItemFields::QUANTITY) {
                    item.set_quantity(quantity);
                }
                bus.publish(Event::Inventory(InventoryEvent::Changed { actor, inventory }));
            }
        }
    }
}

impl Default for ClientSession {
    fn default() -> Self {
        Self::new()
    }
}

fn ensure_actor(
    actors: &mut BTreeMap<ActorId, ClientActorView>,
    actor: ActorId,
) -> &mut ClientActorView {
    actors.entry(actor).or_insert_with(|| ClientActorView {
        abilities: AbilitySystemComponent::new(
            ComponentId((actor.0 as u64) << 1),
            NetRole::SimulatedProxy,
            NetMode::Client,
        ),
        grants: Vec::new(),
        inventories: BTreeMap::new(),
    })
}
