//! The inventory system component: manages inventory ownership for an actor.
//!
//! A component can be granted multiple inventories, each under a name, and
//! tracks one grant record per access relationship. Only the authority may
//! create or give inventories; grant GUIDs come from the rng oracle so they
//! are globally unique and deterministic under replay.

use std::fmt;

use bounded_vector::BoundedVec;

use super::inventory::{check_receive_authority, Inventory, ReceiveError};
use super::item::ItemInstance;
use super::slot::{SlotIndex, SlotList};
use super::transfer::TransferError;
use super::InventoryId;
use crate::authority::{NetRole, NotAuthoritative};
use crate::config::GameConfig;
use crate::env::{compute_seed, GameEnv, OracleError};
use crate::types::ComponentId;

bitflags::bitflags! {
    /// What actions a grant allows its holder to perform on an inventory.
    ///
    /// The owning component's grant is the primary one; grants handed to
    /// other components scope their access down.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct InventoryPermissions: u8 {
        const ALLOW_PUT_ITEMS_IN   = 1 << 0;
        const ALLOW_TAKE_ITEMS_OUT = 1 << 1;
        const FULL = Self::ALLOW_PUT_ITEMS_IN.bits() | Self::ALLOW_TAKE_ITEMS_OUT.bits();
    }
}

/// Unique identifier of one grant record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GrantId(pub u128);

impl GrantId {
    /// The nil grant id. Never issued.
    pub const NIL: Self = Self(0);

    #[inline]
    pub const fn is_valid(self) -> bool {
        self.0 != 0
    }
}

impl fmt::Display for GrantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "grant:{:032x}", self.0)
    }
}

/// Record of permission a component holds over an inventory.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InventoryGrant {
    pub guid: GrantId,
    pub permissions: InventoryPermissions,
    pub inventory: InventoryId,
}

/// Errors from inventory creation and grant operations.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum InventoryGrantError {
    #[error(transparent)]
    NotAuthoritative(#[from] NotAuthoritative),

    #[error("requested {requested} slots, configured maximum is {max}")]
    CapacityExceeded { requested: usize, max: usize },

    #[error("component cannot own more than {max} inventories", max = GameConfig::MAX_INVENTORIES)]
    InventoryLimit,

    #[error("component cannot track more than {max} grants", max = GameConfig::MAX_INVENTORY_GRANTS)]
    GrantLimit,

    #[error(transparent)]
    Oracle(#[from] OracleError),
}

#[derive(Debug)]
struct NamedInventory {
    name: String,
    inventory: Inventory,
}

/// Manages ownership of inventories for an actor. Can be player or non
/// player.
///
/// Owned inventories are looked up by name; grant records are looked up by
/// GUID with a linear scan (grant counts per actor are small and bounded).
#[derive(Debug)]
pub struct InventorySystemComponent {
    id: ComponentId,
    role: NetRole,
    /// Sequence number feeding GUID seeds; one per generated id.
    guid_nonce: u64,
    inventories: BoundedVec<NamedInventory, 0, { GameConfig::MAX_INVENTORIES }>,
    grants: BoundedVec<InventoryGrant, 0, { GameConfig::MAX_INVENTORY_GRANTS }>,
}

impl InventorySystemComponent {
    pub fn new(id: ComponentId, role: NetRole) -> Self {
        Self {
            id,
            role,
            guid_nonce: 0,
            inventories: BoundedVec::new(),
            grants: BoundedVec::new(),
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

    pub fn inventory_count(&self) -> usize {
        self.inventories.len()
    }

    pub fn grants(&self) -> impl Iterator<Item = &InventoryGrant> {
        self.grants.iter()
    }

    pub fn grant_count(&self) -> usize {
        self.grants.len()
    }

    // ========================================================================
    // Giving and creating inventories
    // ========================================================================

    /// Creates a new inventory with the given slots and takes ownership of
    /// it. Authority only.
    ///
    /// Appends one grant with a fresh GUID. The created inventory has no
    /// receive hooks; build one yourself and use [`Self::give_inventory`]
    /// when a variant needs them.
    pub fn create_and_give_inventory(
        &mut self,
        env: &GameEnv<'_>,
        slots: SlotList,
        permissions: InventoryPermissions,
        name: &str,
    ) -> Result<InventoryId, InventoryGrantError> {
        NotAuthoritative::check(self.role)?;

        let max = env.max_inventory_capacity().unwrap_or(GameConfig::DEFAULT_MAX_INVENTORY_CAPACITY);
        if slots.len() > max {
            return Err(InventoryGrantError::CapacityExceeded {
                requested: slots.len(),
                max,
            });
        }

        let inventory_id = InventoryId(self.next_guid(env, 0)?);
        let mut inventory = Inventory::new(inventory_id, slots);
        inventory.set_owning_component(Some(self.id));
        self.admit(inventory, permissions, name, env)
    }

    /// Takes ownership of an existing inventory. Authority only.
    ///
    /// Claims the inventory if it is unowned. An inventory already owned by
    /// another component keeps its owner; that shared-access form is normally
    /// paired with a scoped-down permission set.
    pub fn give_inventory(
        &mut self,
        env: &GameEnv<'_>,
        mut inventory: Inventory,
        permissions: InventoryPermissions,
        name: &str,
    ) -> Result<InventoryId, InventoryGrantError> {
        NotAuthoritative::check(self.role)?;

        if inventory.owning_component().is_none() {
            inventory.set_owning_component(Some(self.id));
        }
        self.admit(inventory, permissions, name, env)
    }

    /// Records access to an inventory owned elsewhere. Authority only.
    ///
    /// The grant is non-owning: the inventory value stays with its owner,
    /// this component only tracks the permission record.
    pub fn grant_inventory_access(
        &mut self,
        env: &GameEnv<'_>,
        inventory: InventoryId,
        permissions: InventoryPermissions,
    ) -> Result<GrantId, InventoryGrantError> {
        NotAuthoritative::check(self.role)?;

        if self.grants.len() >= GameConfig::MAX_INVENTORY_GRANTS {
            return Err(InventoryGrantError::GrantLimit);
        }

        let guid = GrantId(self.next_guid(env, 1)?);
        self.grants
            .push(InventoryGrant {
                guid,
                permissions,
                inventory,
            })
            .expect("grant capacity checked above");
        Ok(guid)
    }

    fn admit(
        &mut self,
        inventory: Inventory,
        permissions: InventoryPermissions,
        name: &str,
        env: &GameEnv<'_>,
    ) -> Result<InventoryId, InventoryGrantError> {
        if self.inventories.len() >= GameConfig::MAX_INVENTORIES {
            return Err(InventoryGrantError::InventoryLimit);
        }
        if self.grants.len() >= GameConfig::MAX_INVENTORY_GRANTS {
            return Err(InventoryGrantError::GrantLimit);
        }

        let inventory_id = inventory.id();
        let guid = GrantId(self.next_guid(env, 1)?);

        // Both pushes are infallible after the limit checks, so a failure
        // here cannot leave a grant without its inventory.
        self.grants
            .push(InventoryGrant {
                guid,
                permissions,
                inventory: inventory_id,
            })
            .expect("grant capacity checked above");
        self.inventories
            .push(NamedInventory {
                name: name.to_owned(),
                inventory,
            })
            .expect("inventory capacity checked above");

        Ok(inventory_id)
    }

    fn next_guid(&mut self, env: &GameEnv<'_>, context: u32) -> Result<u128, OracleError> {
        let rng = env.rng()?;
        let seed = compute_seed(self.id.0, self.guid_nonce, context);
        self.guid_nonce += 1;
        Ok(rng.next_u128(seed))
    }

    // ========================================================================
    // Lookup
    // ========================================================================

    /// Returns the owned inventory with the given name, if any.
    pub fn get_inventory(&self, name: &str) -> Option<&Inventory> {
        self.inventories
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| &entry.inventory)
    }

    pub fn get_inventory_mut(&mut self, name: &str) -> Option<&mut Inventory> {
        self.inventories
            .iter_mut()
            .find(|entry| entry.name == name)
            .map(|entry| &mut entry.inventory)
    }

    pub fn inventory_by_id(&self, id: InventoryId) -> Option<&Inventory> {
        self.inventories
            .iter()
            .find(|entry| entry.inventory.id() == id)
            .map(|entry| &entry.inventory)
    }

    pub fn inventory_by_id_mut(&mut self, id: InventoryId) -> Option<&mut Inventory> {
        self.inventories
            .iter_mut()
            .find(|entry| entry.inventory.id() == id)
            .map(|entry| &mut entry.inventory)
    }

    /// Returns the grant with the given GUID. Passing the nil GUID is a
    /// programmer error.
    pub fn get_inventory_grant(&self, guid: GrantId) -> Option<&InventoryGrant> {
        assert!(guid.is_valid(), "grant lookup with nil guid");
        self.grants.iter().find(|grant| grant.guid == guid)
    }

    /// Returns this component's grant over an inventory, if any.
    pub fn grant_for_inventory(&self, inventory: InventoryId) -> Option<&InventoryGrant> {
        self.grants.iter().find(|grant| grant.inventory == inventory)
    }

    // ========================================================================
    // Item flow
    // ========================================================================

    /// Receives an unowned item into the named inventory. Authority only.
    ///
    /// The owner's implicit grant always allows putting into its own
    /// inventories; permission flags gate other components' access at the
    /// session layer.
    pub fn try_receive_item(
        &mut self,
        name: &str,
        item: ItemInstance,
    ) -> Result<SlotIndex, ReceiveError> {
        let item = check_receive_authority(self.role, item)?;

        let Some(inventory) = self.get_inventory_mut(name) else {
            return Err(ReceiveError::UnknownInventory {
                name: name.to_owned(),
                item,
            });
        };
        inventory.try_receive_item(item)
    }

    /// Takes the item out of a slot in the named inventory. Authority only;
    /// the component's grant must allow taking items out.
    pub fn remove_item(
        &mut self,
        name: &str,
        slot: SlotIndex,
    ) -> Result<ItemInstance, TransferError> {
        NotAuthoritative::check(self.role)?;

        let inventory_id = self.resolve_permitted(name, InventoryPermissions::ALLOW_TAKE_ITEMS_OUT)?;
        let Some(inventory) = self.inventory_by_id_mut(inventory_id) else {
            return Err(TransferError::UnknownInventory {
                name: name.to_owned(),
            });
        };
        inventory
            .remove_item(slot)
            .ok_or(TransferError::EmptySourceSlot { slot })
    }

    /// Moves an item between two inventories of this component (or within
    /// one). Authority only; the grants must allow taking from the source
    /// and putting into the destination.
    ///
    /// Composed remove-then-receive: a destination rejection restores the
    /// item to its source slot before returning.
    pub fn transfer_between(
        &mut self,
        from: &str,
        from_slot: SlotIndex,
        to: &str,
    ) -> Result<SlotIndex, TransferError> {
        NotAuthoritative::check(self.role)?;

        // Resolve and permission-check both ends before touching any slot.
        let from_id = self.resolve_permitted(from, InventoryPermissions::ALLOW_TAKE_ITEMS_OUT)?;
        let to_id = self.resolve_permitted(to, InventoryPermissions::ALLOW_PUT_ITEMS_IN)?;

        let Some(source) = self.inventory_by_id_mut(from_id) else {
            return Err(TransferError::UnknownInventory {
                name: from.to_owned(),
            });
        };
        let item = source
            .remove_item(from_slot)
            .ok_or(TransferError::EmptySourceSlot { slot: from_slot })?;

        let Some(dest) = self.inventory_by_id_mut(to_id) else {
            // Cannot happen after resolution, but never drop the item.
            if let Some(source) = self.inventory_by_id_mut(from_id) {
                source.restore_item(from_slot, item);
            }
            return Err(TransferError::UnknownInventory {
                name: to.to_owned(),
            });
        };
        match dest.try_receive_item(item) {
            Ok(slot) => Ok(slot),
            Err(err) => {
                let item = err.into_item();
                if let Some(source) = self.inventory_by_id_mut(from_id) {
                    source.restore_item(from_slot, item);
                }
                Err(TransferError::DestinationRejected { dest: to_id })
            }
        }
    }

    fn resolve_permitted(
        &self,
        name: &str,
        needed: InventoryPermissions,
    ) -> Result<InventoryId, TransferError> {
        let Some(inventory) = self.get_inventory(name) else {
            return Err(TransferError::UnknownInventory {
                name: name.to_owned(),
            });
        };
        let id = inventory.id();

        let permitted = self
            .grant_for_inventory(id)
            .is_some_and(|grant| grant.permissions.contains(needed));
        if !permitted {
            return Err(TransferError::PermissionDenied { inventory: id });
        }
        Ok(id)
    }

    // ========================================================================
    // Debugging
    // ========================================================================

    /// Dump info about all grants and inventories.
    pub fn debug_string(&self) -> String {
        use std::fmt::Write as _;

        let separator = "========================================";
        let sub_separator = "----------------------------------------";

        let mut out = String::new();
        let _ = writeln!(out, "{separator}");
        let _ = writeln!(out, "INVENTORY SYSTEM STATUS ({})", self.id);
        let _ = writeln!(out, "Total Inventories: {}", self.inventories.len());
        let _ = writeln!(out, "{sub_separator}");

        for (index, grant) in self.grants.iter().enumerate() {
            let _ = writeln!(out, "[Grant {}]", index + 1);
            let _ = writeln!(
                out,
                "| Can Take Items Out : {}",
                grant
                    .permissions
                    .contains(InventoryPermissions::ALLOW_TAKE_ITEMS_OUT)
            );
            let _ = writeln!(
                out,
                "| Can Put Items In   : {}",
                grant
                    .permissions
                    .contains(InventoryPermissions::ALLOW_PUT_ITEMS_IN)
            );
            let _ = writeln!(out, "| Grant GUID         : {}", grant.guid);
            let _ = writeln!(out, "| Inventory          : {}", grant.inventory);
            let _ = writeln!(out, "{sub_separator}");
        }

        for entry in self.inventories.iter() {
            let _ = writeln!(out, "[{}]", entry.name);
            out.push_str(&entry.inventory.debug_string());
            let _ = writeln!(out, "{sub_separator}");
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::{Env, PcgRng, RngOracle};
    use crate::inventory::{ItemData, ItemDefId, ItemId};
    use crate::tags::native;

    static RNG: PcgRng = PcgRng;

    fn test_env<'a>() -> GameEnv<'a> {
        Env::new(None, None, None, None, Some(&RNG as &dyn RngOracle))
    }

    fn authority_component(id: u64) -> InventorySystemComponent {
        InventorySystemComponent::new(ComponentId(id), NetRole::Authority)
    }

    #[test]
    fn create_and_give_appends_inventory_and_grant() {
        let mut isc = authority_component(1);
        let env = test_env();

        let id = isc
            .create_and_give_inventory(&env, SlotList::new(4), InventoryPermissions::FULL, "bag")
            .unwrap();

        assert_eq!(isc.inventory_count(), 1);
        assert_eq!(isc.grant_count(), 1);

        let inventory = isc.get_inventory("bag").unwrap();
        assert_eq!(inventory.id(), id);
        assert_eq!(inventory.owning_component(), Some(ComponentId(1)));
        assert!(inventory.is_valid_inventory());

        let grant = isc.grant_for_inventory(id).unwrap();
        assert!(grant.guid.is_valid());
        assert_eq!(isc.get_inventory_grant(grant.guid), Some(grant));
    }

    #[test]
    fn non_authority_give_is_rejected_without_side_effects() {
        let mut isc = InventorySystemComponent::new(ComponentId(1), NetRole::SimulatedProxy);
        let env = test_env();

        let err = isc
            .create_and_give_inventory(&env, SlotList::new(4), InventoryPermissions::FULL, "bag")
            .unwrap_err();
        assert!(matches!(err, InventoryGrantError::NotAuthoritative(_)));
        assert_eq!(isc.inventory_count(), 0);
        assert_eq!(isc.grant_count(), 0);
    }

    #[test]
    fn two_components_get_distinct_grant_guids() {
        let env = test_env();
        let mut a = authority_component(1);
        let mut b = authority_component(2);

        let id_a = a
            .create_and_give_inventory(&env, SlotList::new(2), InventoryPermissions::FULL, "bag")
            .unwrap();
        let id_b = b
            .create_and_give_inventory(&env, SlotList::new(2), InventoryPermissions::FULL, "bag")
            .unwrap();

        let guid_a = a.grant_for_inventory(id_a).unwrap().guid;
        let guid_b = b.grant_for_inventory(id_b).unwrap().guid;
        assert_ne!(guid_a, guid_b);

        // No cross-contamination of grant lists.
        assert_eq!(a.grant_count(), 1);
        assert_eq!(b.grant_count(), 1);
        assert!(a.get_inventory_grant(guid_b).is_none());
        assert!(b.get_inventory_grant(guid_a).is_none());
    }

    #[test]
    fn oversized_inventory_is_rejected_by_config() {
        let mut isc = authority_component(1);
        let env = test_env();

        let err = isc
            .create_and_give_inventory(
                &env,
                SlotList::new(GameConfig::DEFAULT_MAX_INVENTORY_CAPACITY + 1),
                InventoryPermissions::FULL,
                "bag",
            )
            .unwrap_err();
        assert!(matches!(err, InventoryGrantError::CapacityExceeded { .. }));
        assert_eq!(isc.inventory_count(), 0);
    }

    #[test]
    fn receive_through_component_requires_known_name() {
        let mut isc = authority_component(1);
        let env = test_env();
        isc.create_and_give_inventory(&env, SlotList::new(2), InventoryPermissions::FULL, "bag")
            .unwrap();

        let data = ItemData::new(ItemDefId(1), native::ITEM_CONSUMABLE, 5);
        let item = ItemInstance::create(NetRole::Authority, ItemId(1), &data, 1).unwrap();

        let err = isc.try_receive_item("stash", item).unwrap_err();
        let item = match err {
            ReceiveError::UnknownInventory { item, .. } => item,
            other => panic!("unexpected rejection: {other:?}"),
        };

        let slot = isc.try_receive_item("bag", item).unwrap();
        assert_eq!(slot, SlotIndex(0));
        assert_eq!(isc.get_inventory("bag").unwrap().occupied_slots(), 1);
    }

    #[test]
    fn transfer_between_honors_grant_permissions() {
        let mut isc = authority_component(1);
        let env = test_env();

        isc.create_and_give_inventory(&env, SlotList::new(2), InventoryPermissions::FULL, "bag")
            .unwrap();
        // The drop-box only accepts deposits.
        isc.create_and_give_inventory(
            &env,
            SlotList::new(2),
            InventoryPermissions::ALLOW_PUT_ITEMS_IN,
            "dropbox",
        )
        .unwrap();

        let data = ItemData::new(ItemDefId(1), native::ITEM_QUEST, 1);
        let item = ItemInstance::create(NetRole::Authority, ItemId(1), &data, 1).unwrap();
        let slot = isc.try_receive_item("bag", item).unwrap();

        let dest_slot = isc.transfer_between("bag", slot, "dropbox").unwrap();
        assert_eq!(
            isc.get_inventory("dropbox").unwrap().occupied_slots(),
            1
        );
        assert_eq!(isc.get_inventory("bag").unwrap().occupied_slots(), 0);

        // Taking back out of the drop-box is denied by its grant.
        let err = isc
            .transfer_between("dropbox", dest_slot, "bag")
            .unwrap_err();
        assert!(matches!(err, TransferError::PermissionDenied { .. }));
        assert_eq!(
            isc.get_inventory("dropbox").unwrap().occupied_slots(),
            1
        );
    }

    #[test]
    fn rejected_transfer_between_restores_the_source() {
        let mut isc = authority_component(1);
        let env = test_env();

        isc.create_and_give_inventory(&env, SlotList::new(1), InventoryPermissions::FULL, "bag")
            .unwrap();
        isc.create_and_give_inventory(
            &env,
            SlotList::from_slots(vec![crate::inventory::InventorySlot::new()
                .with_blocked_type(native::ITEM_QUEST)]),
            InventoryPermissions::FULL,
            "pouch",
        )
        .unwrap();

        let data = ItemData::new(ItemDefId(1), native::ITEM_QUEST, 1);
        let item = ItemInstance::create(NetRole::Authority, ItemId(1), &data, 1).unwrap();
        let slot = isc.try_receive_item("bag", item).unwrap();

        let err = isc.transfer_between("bag", slot, "pouch").unwrap_err();
        assert!(matches!(err, TransferError::DestinationRejected { .. }));

        let bag = isc.get_inventory("bag").unwrap();
        let item = bag.slot(slot).item().unwrap();
        assert_eq!(item.owning_inventory(), Some(bag.id()));
    }

    #[test]
    fn secondary_access_grant_is_non_owning() {
        let env = test_env();
        let mut owner = authority_component(1);
        let mut visitor = authority_component(2);

        let id = owner
            .create_and_give_inventory(&env, SlotList::new(2), InventoryPermissions::FULL, "chest")
            .unwrap();

        let guid = visitor
            .grant_inventory_access(&env, id, InventoryPermissions::ALLOW_PUT_ITEMS_IN)
            .unwrap();

        assert_eq!(visitor.inventory_count(), 0);
        let grant = visitor.get_inventory_grant(guid).unwrap();
        assert_eq!(grant.inventory, id);
        assert!(!grant
            .permissions
            .contains(InventoryPermissions::ALLOW_TAKE_ITEMS_OUT));
    }
}
