//! Attribute set that manages the health of a character in the world.

use super::{Attribute, AttributeChange, AttributeId};
use crate::config::GameConfig;

/// Health attribute set: persistent Health/HealthMax plus the Damage and
/// Healing meta-attribute channels.
///
/// Invariants after any mutation:
/// - `0 <= health <= health_max`
/// - both meta-attributes are back at `0`
///
/// Lowering `health_max` does not retroactively clamp `health`; clamping
/// happens only when a Damage or Healing write is folded. Observers that care
/// about `health > health_max` states react to the change notifications.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HealthAttributeSet {
    health: Attribute,
    health_max: Attribute,
    damage: Attribute,
    healing: Attribute,
}

impl HealthAttributeSet {
    pub fn new(health: f32, health_max: f32) -> Self {
        Self {
            health: Attribute::new(health),
            health_max: Attribute::new(health_max),
            damage: Attribute::new(0.0),
            healing: Attribute::new(0.0),
        }
    }

    #[inline]
    pub fn health(&self) -> f32 {
        self.health.current()
    }

    #[inline]
    pub fn health_max(&self) -> f32 {
        self.health_max.current()
    }

    #[inline]
    pub fn damage(&self) -> f32 {
        self.damage.current()
    }

    #[inline]
    pub fn healing(&self) -> f32 {
        self.healing.current()
    }

    pub fn attribute_value(&self, id: AttributeId) -> Option<f32> {
        let value = match id {
            AttributeId::Health => self.health(),
            AttributeId::HealthMax => self.health_max(),
            AttributeId::Damage => self.damage(),
            AttributeId::Healing => self.healing(),
        };
        Some(value)
    }

    /// Canonical attribute write. Appends every committed change to
    /// `changes`, in commit order, including the meta-attribute fold.
    pub fn set_attribute(
        &mut self,
        id: AttributeId,
        value: f32,
        changes: &mut Vec<AttributeChange>,
    ) {
        let old = self
            .attribute_value(id)
            .expect("health set owns all four attribute ids");
        self.write(id, value);
        changes.push(AttributeChange {
            attribute: id,
            old,
            new: value,
        });
        self.post_attribute_change(id, value, changes);
    }

    /// Convenience for routing incoming damage through the meta channel.
    pub fn apply_damage(&mut self, amount: f32, changes: &mut Vec<AttributeChange>) {
        self.set_attribute(AttributeId::Damage, amount, changes);
    }

    /// Convenience for routing incoming healing through the meta channel.
    pub fn apply_healing(&mut self, amount: f32, changes: &mut Vec<AttributeChange>) {
        self.set_attribute(AttributeId::Healing, amount, changes);
    }

    /// Reconciles a replicated attribute against local prediction.
    ///
    /// Only Health and HealthMax replicate; meta-attributes never cross the
    /// wire.
    pub fn set_base_from_replication(
        &mut self,
        id: AttributeId,
        new_base: f32,
    ) -> Option<AttributeChange> {
        debug_assert!(id.is_replicated(), "meta-attribute {id} is never replicated");

        let attribute = match id {
            AttributeId::Health => &mut self.health,
            AttributeId::HealthMax => &mut self.health_max,
            _ => return None,
        };

        let old = attribute.current();
        attribute.set_base_from_replication(new_base);
        Some(AttributeChange {
            attribute: id,
            old,
            new: attribute.current(),
        })
    }

    fn write(&mut self, id: AttributeId, value: f32) {
        match id {
            AttributeId::Health => self.health.set(value),
            AttributeId::HealthMax => self.health_max.set(value),
            AttributeId::Damage => self.damage.set(value),
            AttributeId::Healing => self.healing.set(value),
        }
    }

    /// Folds meta-attribute writes into Health within the same mutation.
    ///
    /// Non-positive meta values are a no-op, so a negative-damage write can
    /// never heal through the damage channel (and vice versa).
    fn post_attribute_change(
        &mut self,
        id: AttributeId,
        new_value: f32,
        changes: &mut Vec<AttributeChange>,
    ) {
        match id {
            AttributeId::Damage => {
                let damage_done = new_value;
                if damage_done > 0.0 {
                    self.reset_meta(AttributeId::Damage, changes);

                    let new_health =
                        (self.health() - damage_done).clamp(0.0, self.health_max());
                    self.set_attribute(AttributeId::Health, new_health, changes);
                }
            }
            AttributeId::Healing => {
                let healing_done = new_value;
                if healing_done > 0.0 {
                    self.reset_meta(AttributeId::Healing, changes);

                    let new_health =
                        (self.health() + healing_done).clamp(0.0, self.health_max());
                    self.set_attribute(AttributeId::Health, new_health, changes);
                }
            }
            AttributeId::Health | AttributeId::HealthMax => {}
        }
    }

    fn reset_meta(&mut self, id: AttributeId, changes: &mut Vec<AttributeChange>) {
        let old = self
            .attribute_value(id)
            .expect("health set owns all four attribute ids");
        self.write(id, 0.0);
        changes.push(AttributeChange {
            attribute: id,
            old,
            new: 0.0,
        });
    }
}

impl Default for HealthAttributeSet {
    fn default() -> Self {
        Self::new(GameConfig::DEFAULT_HEALTH, GameConfig::DEFAULT_HEALTH_MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn damage_clamps_health_to_zero_and_resets_meta() {
        let mut set = HealthAttributeSet::new(50.0, 100.0);
        let mut changes = Vec::new();

        set.apply_damage(70.0, &mut changes);

        assert_eq!(set.health(), 0.0);
        assert_eq!(set.damage(), 0.0);
        assert_eq!(set.healing(), 0.0);
    }

    #[test]
    fn healing_clamps_health_to_max() {
        let mut set = HealthAttributeSet::new(90.0, 100.0);
        let mut changes = Vec::new();

        set.apply_healing(25.0, &mut changes);

        assert_eq!(set.health(), 100.0);
        assert_eq!(set.healing(), 0.0);
    }

    #[test]
    fn non_positive_meta_writes_are_noops_on_health() {
        let mut set = HealthAttributeSet::new(50.0, 100.0);
        let mut changes = Vec::new();

        set.apply_damage(-30.0, &mut changes);
        assert_eq!(set.health(), 50.0);

        set.apply_healing(0.0, &mut changes);
        assert_eq!(set.health(), 50.0);
    }

    #[test]
    fn change_records_commit_in_order() {
        let mut set = HealthAttributeSet::new(50.0, 100.0);
        let mut changes = Vec::new();

        set.apply_damage(10.0, &mut changes);

        let ids: Vec<_> = changes.iter().map(|c| c.attribute).collect();
        assert_eq!(
            ids,
            vec![AttributeId::Damage, AttributeId::Damage, AttributeId::Health]
        );
        let health_change = changes.last().unwrap();
        assert_eq!(health_change.old, 50.0);
        assert_eq!(health_change.new, 40.0);
    }

    #[test]
    fn lowering_health_max_does_not_clamp_health() {
        let mut set = HealthAttributeSet::new(80.0, 100.0);
        let mut changes = Vec::new();

        set.set_attribute(AttributeId::HealthMax, 60.0, &mut changes);

        // Health only clamps at the next Damage/Healing fold.
        assert_eq!(set.health(), 80.0);

        set.apply_damage(5.0, &mut changes);
        assert_eq!(set.health(), 60.0);
    }

    #[test]
    fn replication_merge_preserves_predicted_delta() {
        let mut set = HealthAttributeSet::new(100.0, 100.0);
        let mut changes = Vec::new();

        // Local prediction already subtracted 10.
        set.apply_damage(10.0, &mut changes);
        assert_eq!(set.health(), 90.0);

        // Server confirms a base of 85; the merge rebases without discarding
        // the (zero, post-fold) local delta.
        let change = set
            .set_base_from_replication(AttributeId::Health, 85.0)
            .unwrap();
        assert_eq!(change.new, 85.0);
        assert_eq!(set.health(), 85.0);
    }
}
