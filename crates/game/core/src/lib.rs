//! Deterministic ability and inventory rules shared across server and clients.
//!
//! `arpg-core` defines the canonical gameplay logic: the ability system
//! component with its input-processing pipeline, attribute sets with
//! meta-attribute folding, and the inventory/item ownership transaction
//! model. All state mutation happens through the component types exported
//! here; the runtime crate layers authority checks, replication, and event
//! notification on top without duplicating any rules.
pub mod ability;
pub mod attribute;
pub mod authority;
pub mod config;
pub mod env;
pub mod inventory;
pub mod tags;
pub mod types;

pub use ability::{
    AbilityActivationPolicy, AbilityClassId, AbilityDef, AbilitySet, AbilitySetAbility,
    AbilitySetAttributes, AbilitySetEffect, AbilitySpec, AbilitySpecHandle,
    AbilitySystemComponent, ActiveEffect, ActiveEffectHandle, EffectClassId, EffectDef,
    EffectModifier, EffectOutcome, GrantError, GrantedHandles, InputProcessOutcome,
};
pub use attribute::{
    Attribute, AttributeChange, AttributeId, AttributeSetInstance, AttributeSetKind,
    HealthAttributeSet,
};
pub use authority::{NetMode, NetRole, NotAuthoritative};
pub use config::GameConfig;
pub use env::{
    AbilityOracle, ConfigOracle, EffectOracle, Env, GameEnv, ItemOracle, OracleError, PcgRng,
    RngOracle, compute_seed,
};
pub use inventory::{
    GrantId, Inventory, InventoryGrant, InventoryGrantError, InventoryHooks, InventoryId,
    InventoryPermissions, InventorySlot, InventorySystemComponent, ItemData, ItemDefId, ItemId,
    ItemInstance, ReceiveError, SlotIndex, SlotList, SplitError, TransferError, transfer_item,
};
pub use tags::{GameplayTag, TagSet};
pub use types::{ActorId, ComponentId, Tick};
