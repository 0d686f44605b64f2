//! Numeric gameplay attributes and attribute sets.
//!
//! Attributes come in two flavors: persistent stats (Health, HealthMax) that
//! survive across frames and replicate to observers, and meta-attributes
//! (Damage, Healing) that exist only as transient write channels on the
//! authority. Effect modifiers write into meta-attributes; the owning set
//! folds them into persistent attributes and resets them to zero within the
//! same mutation pass.

mod health;

pub use health::HealthAttributeSet;

/// Identifies a single attribute within an attribute set.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum AttributeId {
    Health,
    HealthMax,
    /// Meta-attribute: damage the owner should receive. Authority-local,
    /// never replicated.
    Damage,
    /// Meta-attribute: healing the owner should receive. Authority-local,
    /// never replicated.
    Healing,
}

impl AttributeId {
    /// Meta-attributes are transient write-only channels.
    #[inline]
    pub const fn is_meta(self) -> bool {
        matches!(self, AttributeId::Damage | AttributeId::Healing)
    }

    /// Attributes synchronized from authority to observers.
    #[inline]
    pub const fn is_replicated(self) -> bool {
        !self.is_meta()
    }
}

/// A single attribute value pair.
///
/// `base` is the authoritative canonical value; `current` additionally
/// carries whatever local prediction has been applied on top. On the
/// authority the two always agree.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Attribute {
    base: f32,
    current: f32,
}

impl Attribute {
    pub fn new(value: f32) -> Self {
        Self {
            base: value,
            current: value,
        }
    }

    #[inline]
    pub fn current(&self) -> f32 {
        self.current
    }

    #[inline]
    pub fn base(&self) -> f32 {
        self.base
    }

    /// Canonical write: sets base and current together.
    pub fn set(&mut self, value: f32) {
        self.base = value;
        self.current = value;
    }

    /// Reconciles a replicated base value against local prediction.
    ///
    /// The predicted delta (`current - base`) is preserved on top of the new
    /// authoritative base, so in-flight local prediction is corrected toward
    /// the server without being discarded outright.
    pub fn set_base_from_replication(&mut self, new_base: f32) {
        let predicted = self.current - self.base;
        self.base = new_base;
        self.current = new_base + predicted;
    }
}

/// Record of one committed attribute mutation, oldest first in any batch.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttributeChange {
    pub attribute: AttributeId,
    pub old: f32,
    pub new: f32,
}

/// Concrete attribute set types.
///
/// Deferred class references resolve to one of these variants; duplicate-set
/// detection on grant compares kinds.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum AttributeSetKind {
    Health,
}

/// An attribute set instance owned by an ability system component.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AttributeSetInstance {
    Health(HealthAttributeSet),
}

impl AttributeSetInstance {
    /// Constructs the default instance for a deferred class reference.
    pub fn construct(kind: AttributeSetKind) -> Self {
        match kind {
            AttributeSetKind::Health => Self::Health(HealthAttributeSet::default()),
        }
    }

    pub fn kind(&self) -> AttributeSetKind {
        match self {
            Self::Health(_) => AttributeSetKind::Health,
        }
    }

    /// Returns true if this set owns the given attribute.
    pub fn owns_attribute(&self, id: AttributeId) -> bool {
        match self {
            Self::Health(_) => matches!(
                id,
                AttributeId::Health
                    | AttributeId::HealthMax
                    | AttributeId::Damage
                    | AttributeId::Healing
            ),
        }
    }

    /// Current value of an attribute owned by this set.
    pub fn attribute_value(&self, id: AttributeId) -> Option<f32> {
        match self {
            Self::Health(set) => set.attribute_value(id),
        }
    }

    /// Routes a canonical write into this set, appending the committed
    /// changes (including any meta-attribute fold) to `changes`.
    pub fn set_attribute(
        &mut self,
        id: AttributeId,
        value: f32,
        changes: &mut Vec<AttributeChange>,
    ) {
        match self {
            Self::Health(set) => set.set_attribute(id, value, changes),
        }
    }

    /// Applies a replicated base value with the prediction-preserving merge.
    ///
    /// Meta-attributes are never replicated; passing one is a programmer
    /// error.
    pub fn set_base_from_replication(
        &mut self,
        id: AttributeId,
        new_base: f32,
    ) -> Option<AttributeChange> {
        match self {
            Self::Health(set) => set.set_base_from_replication(id, new_base),
        }
    }

    pub fn as_health(&self) -> Option<&HealthAttributeSet> {
        match self {
            Self::Health(set) => Some(set),
        }
    }

    pub fn as_health_mut(&mut self) -> Option<&mut HealthAttributeSet> {
        match self {
            Self::Health(set) => Some(set),
        }
    }
}
