//! Before/after comparison helpers for replicated component state.

use arpg_core::{AbilitySystemComponent, ActorId, AttributeSetKind};

use super::bitmask::HealthSetFields;
use super::messages::ReplicationMessage;

/// Replicated values of a health set at one point in time.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct HealthSnapshot {
    pub health: f32,
    pub health_max: f32,
}

/// Captures the replicated health values of a component, if it has a health
/// set.
pub fn health_snapshot(asc: &AbilitySystemComponent) -> Option<HealthSnapshot> {
    let set = asc.attribute_set(AttributeSetKind::Health)?.as_health()?;
    Some(HealthSnapshot {
        health: set.health(),
        health_max: set.health_max(),
    })
}

/// Compares two health snapshots and emits the minimal message set.
///
/// Returns None when nothing replicated changed (meta-attribute churn on the
/// authority produces no wire traffic by construction).
pub fn diff_health(
    actor: ActorId,
    before: Option<HealthSnapshot>,
    after: Option<HealthSnapshot>,
) -> Option<ReplicationMessage> {
    let after = after?;
    let before = before.unwrap_or_default();

    let mut fields = HealthSetFields::empty();
    if before.health != after.health {
        fields |= HealthSetFields::HEALTH;
    }
    if before.health_max != after.health_max {
        fields |= HealthSetFields::HEALTH_MAX;
    }

    if fields.is_empty() {
        return None;
    }

    Some(ReplicationMessage::HealthSet {
        actor,
        fields,
        health: after.health,
        health_max: after.health_max,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unchanged_snapshot_emits_nothing() {
        let snap = Some(HealthSnapshot {
            health: 50.0,
            health_max: 100.0,
        });
        assert!(diff_health(ActorId(1), snap, snap).is_none());
    }

    #[test]
    fn health_only_change_sets_a_single_field() {
        let before = Some(HealthSnapshot {
            health: 50.0,
            health_max: 100.0,
        });
        let after = Some(HealthSnapshot {
            health: 40.0,
            health_max: 100.0,
        });

        let Some(ReplicationMessage::HealthSet { fields, health, .. }) =
            diff_health(ActorId(1), before, after)
        else {
            panic!("expected a health message");
        };
        assert_eq!(fields, HealthSetFields::HEALTH);
        assert_eq!(health, 40.0);
    }

    #[test]
    fn fresh_set_replicates_both_fields() {
        let after = Some(HealthSnapshot {
            health: 100.0,
            health_max: 100.0,
        });
        let Some(ReplicationMessage::HealthSet { fields, .. }) =
            diff_health(ActorId(1), None, after)
        else {
            panic!("expected a health message");
        };
        assert!(fields.contains(HealthSetFields::HEALTH | HealthSetFields::HEALTH_MAX));
    }
}
