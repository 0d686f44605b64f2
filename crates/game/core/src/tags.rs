//! Opaque gameplay tag identifiers and fixed-capacity tag containers.
//!
//! Tags are the identity currency between the input-binding layer, ability
//! specs, and inventory slot filters. The core never parses or interprets
//! tag names; comparison is exact-match on the raw id. The [`native`] table
//! registers the well-known tags the gameplay code refers to by name.

use std::fmt;

use arrayvec::ArrayVec;

use crate::config::GameConfig;

/// Opaque gameplay tag, compared by identity only.
///
/// The zero id is reserved as the invalid tag; event handlers ignore it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GameplayTag(u32);

impl GameplayTag {
    /// The invalid tag. Never matches any registered tag.
    pub const NONE: Self = Self(0);

    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Returns true for any tag other than [`GameplayTag::NONE`].
    #[inline]
    pub const fn is_valid(self) -> bool {
        self.0 != 0
    }

    /// Returns the registered name for native tags, if any.
    pub fn name(self) -> Option<&'static str> {
        native::name_of(self)
    }
}

impl fmt::Display for GameplayTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{}", name),
            None => write!(f, "tag:{}", self.0),
        }
    }
}

/// Natively registered tags.
///
/// Raw ids below 256 are reserved for this table; data-driven content should
/// allocate ids above that range.
pub mod native {
    use super::GameplayTag;

    /// While present on an ability system component, all ability input is
    /// dropped and pending input state is cleared.
    pub const STATUS_BLOCK_ABILITY_INPUT: GameplayTag = GameplayTag::new(1);

    // Input tags delivered by the input-binding layer.
    pub const INPUT_ATTACK: GameplayTag = GameplayTag::new(16);
    pub const INPUT_DODGE: GameplayTag = GameplayTag::new(17);
    pub const INPUT_SPRINT: GameplayTag = GameplayTag::new(18);

    // Item classification tags used by slot type filters.
    pub const ITEM_CONSUMABLE: GameplayTag = GameplayTag::new(32);
    pub const ITEM_EQUIPMENT: GameplayTag = GameplayTag::new(33);
    pub const ITEM_QUEST: GameplayTag = GameplayTag::new(34);
    pub const ITEM_CURRENCY: GameplayTag = GameplayTag::new(35);

    pub(super) fn name_of(tag: GameplayTag) -> Option<&'static str> {
        let name = match tag {
            STATUS_BLOCK_ABILITY_INPUT => "Status.Block.AbilityInput",
            INPUT_ATTACK => "Input.Attack",
            INPUT_DODGE => "Input.Dodge",
            INPUT_SPRINT => "Input.Sprint",
            ITEM_CONSUMABLE => "Item.Consumable",
            ITEM_EQUIPMENT => "Item.Equipment",
            ITEM_QUEST => "Item.Quest",
            ITEM_CURRENCY => "Item.Currency",
            _ => return None,
        };
        Some(name)
    }
}

/// Fixed-capacity set of gameplay tags with exact-match semantics.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TagSet {
    tags: ArrayVec<GameplayTag, { GameConfig::MAX_GRANTED_TAGS }>,
}

impl TagSet {
    pub fn new() -> Self {
        Self {
            tags: ArrayVec::new(),
        }
    }

    /// Adds a tag if not already present. Returns false when the tag was
    /// already in the set or the set is full.
    pub fn add_unique(&mut self, tag: GameplayTag) -> bool {
        if !tag.is_valid() || self.has_tag_exact(tag) {
            return false;
        }
        self.tags.try_push(tag).is_ok()
    }

    /// Removes a tag. Removing an absent tag is a no-op.
    pub fn remove(&mut self, tag: GameplayTag) -> bool {
        if let Some(index) = self.tags.iter().position(|&t| t == tag) {
            self.tags.remove(index);
            true
        } else {
            false
        }
    }

    #[inline]
    pub fn has_tag_exact(&self, tag: GameplayTag) -> bool {
        self.tags.iter().any(|&t| t == tag)
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = GameplayTag> + '_ {
        self.tags.iter().copied()
    }
}

impl FromIterator<GameplayTag> for TagSet {
    fn from_iter<I: IntoIterator<Item = GameplayTag>>(iter: I) -> Self {
        let mut set = Self::new();
        for tag in iter {
            set.add_unique(tag);
        }
        set
    }
}
