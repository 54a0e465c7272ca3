mod duty;
mod moves;
mod ownership;
mod replacement;
mod types;

pub use types::{DispatchError, MoveResult, ReplacementResult};

use crate::calendar::MonthRef;
use crate::capacity::Capacity;
use crate::model::{
    Appointment, AppointmentId, Area, Caregiver, CaregiverId, DutySlot, DutyType, Plan,
    Replacement, SlotId,
};
use chrono::{NaiveDate, Weekday};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// État mutable côté tournées : rendez-vous + remplacements actifs.
/// Les deux vivent sous le même verrou pour que pose/levée de
/// remplacement et déplacements soient des unités sérialisées.
#[derive(Debug, Default)]
pub(crate) struct CareBoard {
    pub appointments: Vec<Appointment>,
    pub replacements: Vec<Replacement>,
}

/// État mutable côté astreintes.
#[derive(Debug, Default)]
pub(crate) struct DutyBoard {
    pub slots: Vec<DutySlot>,
}

/// Moteur de réaffectation : façade unique sur les registres.
///
/// Toute mutation prend le verrou écriture du tableau concerné pour la
/// durée complète de l'opération (y compris les transferts en masse) ;
/// les lectures se partagent le verrou lecture. Les soignants sont
/// immuables pendant la planification et restent hors verrou.
#[derive(Debug, Default)]
pub struct Dispatcher {
    caregivers: Vec<Caregiver>,
    care: RwLock<CareBoard>,
    duty: RwLock<DutyBoard>,
}

impl Dispatcher {
    pub fn new(plan: Plan) -> Self {
        Self {
            caregivers: plan.caregivers,
            care: RwLock::new(CareBoard {
                appointments: plan.appointments,
                replacements: plan.replacements,
            }),
            duty: RwLock::new(DutyBoard {
                slots: plan.duty_slots,
            }),
        }
    }

    /// Instantané sérialisable de l'état courant.
    pub fn plan(&self) -> Plan {
        let care = self.care_read();
        let duty = self.duty_read();
        Plan {
            caregivers: self.caregivers.clone(),
            appointments: care.appointments.clone(),
            replacements: care.replacements.clone(),
            duty_slots: duty.slots.clone(),
        }
    }

    pub fn caregivers(&self) -> &[Caregiver] {
        &self.caregivers
    }

    pub(crate) fn caregiver(&self, id: &CaregiverId) -> Result<&Caregiver, DispatchError> {
        self.caregivers
            .iter()
            .find(|c| &c.id == id)
            .ok_or_else(|| DispatchError::UnknownCaregiver(id.as_str().to_string()))
    }

    // Un verrou empoisonné n'expose que l'état d'avant écriture : toutes
    // les mutations valident avant d'appliquer.
    pub(crate) fn care_read(&self) -> RwLockReadGuard<'_, CareBoard> {
        self.care.read().unwrap_or_else(PoisonError::into_inner)
    }
    pub(crate) fn care_write(&self) -> RwLockWriteGuard<'_, CareBoard> {
        self.care.write().unwrap_or_else(PoisonError::into_inner)
    }
    pub(crate) fn duty_read(&self) -> RwLockReadGuard<'_, DutyBoard> {
        self.duty.read().unwrap_or_else(PoisonError::into_inner)
    }
    pub(crate) fn duty_write(&self) -> RwLockWriteGuard<'_, DutyBoard> {
        self.duty.write().unwrap_or_else(PoisonError::into_inner)
    }

    // ---- registre de propriété ----

    /// Propriétaire courant d'un rendez-vous.
    pub fn owner_of(&self, id: &AppointmentId) -> Result<CaregiverId, DispatchError> {
        let board = self.care_read();
        ownership::owner_of(&board, id).cloned()
    }

    /// Rendez-vous détenus par un soignant un jour de semaine donné.
    pub fn appointments_of(&self, caregiver: &CaregiverId, weekday: Weekday) -> Vec<AppointmentId> {
        let board = self.care_read();
        ownership::owned_on(&board, caregiver, weekday)
    }

    // ---- registre des remplacements ----

    /// Pose un remplacement et transfère en masse les rendez-vous du jour.
    pub fn set_replacement(
        &self,
        caregiver: &CaregiverId,
        weekday: Weekday,
        replacement: &CaregiverId,
    ) -> Result<ReplacementResult, DispatchError> {
        replacement::set_replacement(self, caregiver, weekday, replacement)
    }

    /// Lève un remplacement ; seuls les rendez-vous encore étiquetés avec
    /// cette origine sont restitués.
    pub fn clear_replacement(
        &self,
        caregiver: &CaregiverId,
        weekday: Weekday,
    ) -> Result<ReplacementResult, DispatchError> {
        replacement::clear_replacement(self, caregiver, weekday)
    }

    /// Remplaçant actif d'un soignant pour un jour, s'il existe.
    pub fn check_replacement(
        &self,
        caregiver: &CaregiverId,
        weekday: Weekday,
    ) -> Option<CaregiverId> {
        let board = self.care_read();
        replacement::active_replacement(&board, caregiver, weekday)
    }

    // ---- moteur de transaction ----

    /// Déplace un rendez-vous, avec détour par le remplaçant du
    /// destinataire sauf si l'appelant force un déplacement littéral.
    pub fn move_appointment(
        &self,
        id: &AppointmentId,
        from: &CaregiverId,
        to: &CaregiverId,
        respect_replacement: bool,
    ) -> Result<MoveResult, DispatchError> {
        moves::move_appointment(self, id, from, to, respect_replacement)
    }

    /// Transfert de tournée complet, tous jours confondus, atomique,
    /// sans détour par les remplacements.
    pub fn batch_move_appointments(
        &self,
        from: &CaregiverId,
        to: &CaregiverId,
    ) -> Result<usize, DispatchError> {
        moves::batch_move_appointments(self, from, to)
    }

    // ---- astreintes & capacité ----

    /// Capacité courante, calculée à la lecture depuis les affectations.
    pub fn capacity(
        &self,
        caregiver: &CaregiverId,
        duty_type: DutyType,
        month: MonthRef,
    ) -> Result<Capacity, DispatchError> {
        duty::capacity(self, caregiver, duty_type, month)
    }

    /// Affecte un créneau ; un titulaire existant est remplacé
    /// atomiquement, jamais empilé.
    pub fn assign_duty(
        &self,
        slot: &SlotId,
        caregiver: &CaregiverId,
        allow_overplanning: bool,
    ) -> Result<Capacity, DispatchError> {
        duty::assign_duty(self, slot, caregiver, allow_overplanning)
    }

    /// Comme `assign_duty`, mais ne touche pas un créneau déjà tenu :
    /// `Ok(None)` signifie que le titulaire en place est conservé.
    pub(crate) fn assign_duty_if_open(
        &self,
        slot: &SlotId,
        caregiver: &CaregiverId,
        allow_overplanning: bool,
    ) -> Result<Option<Capacity>, DispatchError> {
        duty::assign_duty_if_open(self, slot, caregiver, allow_overplanning)
    }

    pub fn unassign_duty(&self, slot: &SlotId) -> Result<(), DispatchError> {
        duty::unassign_duty(self, slot)
    }

    /// Supprime toutes les affectations d'astreinte de la période.
    pub fn reset_planning(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<usize, DispatchError> {
        duty::reset_planning(self, start, end)
    }

    /// Crée un créneau de demande ; idempotent par (date, type, secteur).
    pub fn create_slot(&self, date: NaiveDate, duty_type: DutyType, area: Area) -> SlotId {
        duty::create_slot(self, date, duty_type, area)
    }

    /// Génère la demande type d'un mois complet (AW quotidien par secteur,
    /// RB médecin quotidien, RB infirmier jour/nuit les week-ends).
    pub fn seed_month(&self, month: MonthRef) -> usize {
        duty::seed_month(self, month)
    }
}
