//! Adaptateur de planification automatique des astreintes.
//!
//! Le solveur est un collaborateur opaque derrière le trait
//! [`DutySolver`] : il reçoit les créneaux ouverts, leurs candidats
//! éligibles et un instantané de capacité figé, et propose des
//! affectations. L'adaptateur reste le dernier filtre : chaque
//! proposition est commise une par une via `assign_duty`, donc chaque
//! créneau repasse individuellement les invariants de capacité et
//! d'unicité. Le solveur tourne sans aucun verrou tenu.

use crate::calendar::MonthRef;
use crate::capacity::CapacitySnapshot;
use crate::engine::{DispatchError, Dispatcher};
use crate::model::{Area, CaregiverId, DutyType, Replacement, SlotId};
use chrono::{Datelike, NaiveDate};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};

/// Traitement des créneaux déjà planifiés dans la période.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExistingHandling {
    /// Replanifie aussi les créneaux déjà tenus.
    Overwrite,
    /// Ne touche pas aux créneaux déjà tenus.
    Respect,
}

#[derive(Debug, Clone, Copy)]
pub struct AutoPlanOptions {
    pub existing: ExistingHandling,
    pub allow_overplanning: bool,
}

impl Default for AutoPlanOptions {
    fn default() -> Self {
        Self {
            existing: ExistingHandling::Respect,
            allow_overplanning: false,
        }
    }
}

/// Bilan d'une exécution : combien de créneaux réellement commis,
/// combien refusés (capacité), combien de créneaux tenus au total dans
/// la période après coup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AutoPlanReport {
    pub created: usize,
    pub rejected: usize,
    pub total_planned: usize,
    pub cancelled: bool,
}

/// Créneau ouvert soumis au solveur, candidats déjà filtrés par
/// fonction, secteur et absence de remplacement actif ce jour-là.
#[derive(Debug, Clone)]
pub struct SlotRequest {
    pub slot: SlotId,
    pub date: NaiveDate,
    pub duty_type: DutyType,
    pub area: Area,
    pub candidates: Vec<CaregiverId>,
}

/// Affectation proposée par le solveur.
#[derive(Debug, Clone)]
pub struct DutyProposal {
    pub slot: SlotId,
    pub caregiver: CaregiverId,
}

/// Contrat du solveur externe (invoqué hors verrous).
pub trait DutySolver {
    fn propose(&self, requests: &[SlotRequest], snapshot: &CapacitySnapshot) -> Vec<DutyProposal>;
}

/// Solveur intégré : tourniquet sur les candidats en sautant ceux dont
/// la capacité restante de l'instantané est épuisée.
#[derive(Debug, Default, Clone, Copy)]
pub struct RotationSolver;

impl DutySolver for RotationSolver {
    fn propose(&self, requests: &[SlotRequest], snapshot: &CapacitySnapshot) -> Vec<DutyProposal> {
        let mut out = Vec::new();
        let mut tally: HashMap<(CaregiverId, crate::model::CapacityBucket, MonthRef), i64> =
            HashMap::new();
        let mut idx = 0usize;

        for request in requests {
            let n = request.candidates.len();
            if n == 0 {
                continue;
            }
            let bucket = request.duty_type.capacity_bucket();
            let month = MonthRef::from_date(request.date);
            let mut tries = 0usize;

            while tries < n {
                let candidate = &request.candidates[idx % n];
                let key = (candidate.clone(), bucket, month);
                let remaining = *tally
                    .entry(key.clone())
                    .or_insert_with(|| snapshot.remaining(candidate, bucket, month));
                idx = (idx + 1) % n.max(1);
                if remaining > 0 {
                    tally.insert(key, remaining - 1);
                    out.push(DutyProposal {
                        slot: request.slot.clone(),
                        caregiver: candidate.clone(),
                    });
                    break;
                }
                tries += 1;
            }
            // aucun candidat avec du restant : créneau laissé ouvert
        }
        out
    }
}

impl Dispatcher {
    /// Planification automatique d'une période.
    ///
    /// Phases : (1) instantané des contraintes sous verrous lecture,
    /// (2) appel solveur sans verrou, (3) commits créneau par créneau,
    /// transactions indépendantes — l'échec de l'un n'annule pas les
    /// autres, et l'annulation coopérative arrête les commits suivants
    /// sans jamais revenir sur ceux déjà passés.
    pub fn auto_plan(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        options: AutoPlanOptions,
        solver: &dyn DutySolver,
        cancel: &AtomicBool,
    ) -> Result<AutoPlanReport, DispatchError> {
        if end < start {
            return Err(DispatchError::InvalidArgument(
                "invalid date range: end before start",
            ));
        }

        let (requests, snapshot) = self.snapshot_requests(start, end, options.existing);
        let requested: HashSet<&SlotId> = requests.iter().map(|r| &r.slot).collect();

        let proposals = solver.propose(&requests, &snapshot);

        let mut report = AutoPlanReport::default();
        for proposal in &proposals {
            if cancel.load(Ordering::Relaxed) {
                report.cancelled = true;
                break;
            }
            // Le solveur peut sur-proposer ou halluciner des créneaux :
            // seul ce qui repasse la porte est commis.
            if !requested.contains(&proposal.slot) {
                report.rejected += 1;
                continue;
            }
            // En mode Respect, « ne pas toucher » se revérifie au moment
            // du commit : un créneau pris entre l'instantané et le commit
            // reste à son titulaire.
            let commit = match options.existing {
                ExistingHandling::Respect => self.assign_duty_if_open(
                    &proposal.slot,
                    &proposal.caregiver,
                    options.allow_overplanning,
                ),
                ExistingHandling::Overwrite => self
                    .assign_duty(&proposal.slot, &proposal.caregiver, options.allow_overplanning)
                    .map(Some),
            };
            match commit {
                Ok(Some(_)) => report.created += 1,
                // créneau pris entre-temps, plafond atteint ou créneau inconnu
                Ok(None) | Err(_) => report.rejected += 1,
            }
        }

        let board = self.duty_read();
        report.total_planned = board
            .slots
            .iter()
            .filter(|s| s.date >= start && s.date <= end && s.assigned.is_some())
            .count();
        Ok(report)
    }

    /// Fige créneaux ouverts, candidats et capacités avant l'appel au
    /// solveur. Les soignants sous remplacement actif le jour du créneau
    /// sont exclus des candidats.
    fn snapshot_requests(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        existing: ExistingHandling,
    ) -> (Vec<SlotRequest>, CapacitySnapshot) {
        // Ordre de verrouillage fixe : care est relevé et relâché avant
        // de prendre duty, aucun guard n'est tenu en travers de l'autre.
        let replacements: Vec<Replacement> = {
            let board = self.care_read();
            board.replacements.clone()
        };

        let mut requests = Vec::new();
        let mut snapshot = CapacitySnapshot::default();
        {
            let duty = self.duty_read();
            let open_slots: Vec<_> = duty
                .slots
                .iter()
                .filter(|s| s.date >= start && s.date <= end)
                .filter(|s| existing == ExistingHandling::Overwrite || s.assigned.is_none())
                .cloned()
                .collect();
            for slot in &open_slots {
                let weekday = slot.date.weekday();
                let month = MonthRef::from_date(slot.date);
                let bucket = slot.duty_type.capacity_bucket();
                let candidates: Vec<CaregiverId> = self
                    .caregivers()
                    .iter()
                    .filter(|c| c.function == slot.duty_type.function())
                    .filter(|c| c.area.covers(slot.area))
                    .filter(|c| {
                        !replacements
                            .iter()
                            .any(|r| r.caregiver == c.id && r.weekday == weekday)
                    })
                    .map(|c| c.id.clone())
                    .collect();

                for id in &candidates {
                    if snapshot.get(id, bucket, month).is_none() {
                        if let Ok(caregiver) = self.caregiver(id) {
                            snapshot.insert(
                                id.clone(),
                                bucket,
                                month,
                                crate::capacity::capacity_of(caregiver, &duty.slots, bucket, month),
                            );
                        }
                    }
                }
                requests.push(SlotRequest {
                    slot: slot.id.clone(),
                    date: slot.date,
                    duty_type: slot.duty_type,
                    area: slot.area,
                    candidates,
                });
            }
        }
        requests.sort_by_key(|r| r.date);
        (requests, snapshot)
    }
}
