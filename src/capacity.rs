//! Compteurs de capacité : vue matérialisée recalculée depuis les
//! affectations d'astreinte commises, jamais stockée comme vérité.

use crate::calendar::MonthRef;
use crate::model::{Caregiver, CaregiverId, CapacityBucket, DutySlot, SlotId};
use std::collections::HashMap;

/// Instantané (plafond, affecté, restant) pour un soignant, un
/// compartiment et un mois. `remaining` peut passer négatif en mode
/// sur-planification autorisée.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capacity {
    pub limit: u32,
    pub assigned: u32,
    pub remaining: i64,
}

impl Capacity {
    pub fn new(limit: u32, assigned: u32) -> Self {
        Self {
            limit,
            assigned,
            remaining: i64::from(limit) - i64::from(assigned),
        }
    }
}

/// Compte les créneaux commis pour `caregiver` dans `bucket` sur `month`.
/// `exclude` retire un créneau du décompte (remplacement atomique d'un
/// titulaire existant).
pub fn assigned_in_month(
    slots: &[DutySlot],
    caregiver: &CaregiverId,
    bucket: CapacityBucket,
    month: MonthRef,
    exclude: Option<&SlotId>,
) -> u32 {
    slots
        .iter()
        .filter(|s| {
            s.assigned.as_ref() == Some(caregiver)
                && s.duty_type.capacity_bucket() == bucket
                && month.contains(s.date)
                && exclude.map(|id| id != &s.id).unwrap_or(true)
        })
        .count() as u32
}

/// Capacité courante d'un soignant pour un compartiment et un mois.
pub fn capacity_of(
    caregiver: &Caregiver,
    slots: &[DutySlot],
    bucket: CapacityBucket,
    month: MonthRef,
) -> Capacity {
    let assigned = assigned_in_month(slots, &caregiver.id, bucket, month, None);
    Capacity::new(caregiver.limit_for(bucket), assigned)
}

/// Instantané de capacité figé avant l'appel au solveur : le solveur
/// raisonne dessus sans tenir aucun verrou.
#[derive(Debug, Clone, Default)]
pub struct CapacitySnapshot {
    entries: HashMap<(CaregiverId, CapacityBucket, MonthRef), Capacity>,
}

impl CapacitySnapshot {
    pub fn insert(
        &mut self,
        caregiver: CaregiverId,
        bucket: CapacityBucket,
        month: MonthRef,
        capacity: Capacity,
    ) {
        self.entries.insert((caregiver, bucket, month), capacity);
    }

    pub fn get(
        &self,
        caregiver: &CaregiverId,
        bucket: CapacityBucket,
        month: MonthRef,
    ) -> Option<Capacity> {
        self.entries
            .get(&(caregiver.clone(), bucket, month))
            .copied()
    }

    /// Restant connu, 0 si le couple n'a pas été relevé.
    pub fn remaining(&self, caregiver: &CaregiverId, bucket: CapacityBucket, month: MonthRef) -> i64 {
        self.get(caregiver, bucket, month)
            .map(|c| c.remaining)
            .unwrap_or(0)
    }
}
