//! Affectations d'astreinte et plafonds de capacité. Le jeu de créneaux
//! est la donnée faisant foi ; les compteurs sont recalculés à chaque
//! lecture (voir `capacity`).

use super::{DispatchError, Dispatcher};
use crate::calendar::{self, MonthRef};
use crate::capacity::{self, Capacity};
use crate::model::{Area, CaregiverId, DutySlot, DutyType, SlotId};
use chrono::NaiveDate;

pub(super) fn capacity(
    dispatcher: &Dispatcher,
    caregiver: &CaregiverId,
    duty_type: DutyType,
    month: MonthRef,
) -> Result<Capacity, DispatchError> {
    let caregiver = dispatcher.caregiver(caregiver)?;
    let board = dispatcher.duty_read();
    Ok(capacity::capacity_of(
        caregiver,
        &board.slots,
        duty_type.capacity_bucket(),
        month,
    ))
}

pub(super) fn assign_duty(
    dispatcher: &Dispatcher,
    slot: &SlotId,
    caregiver_id: &CaregiverId,
    allow_overplanning: bool,
) -> Result<Capacity, DispatchError> {
    match assign_inner(dispatcher, slot, caregiver_id, allow_overplanning, false)? {
        Some(capacity) => Ok(capacity),
        // inatteignable : sans only_if_open l'affectation passe toujours
        None => Err(DispatchError::UnknownSlot(slot.as_str().to_string())),
    }
}

/// Variante conditionnelle : n'affecte que si le créneau est encore
/// libre au moment où le verrou écriture est tenu. `Ok(None)` signifie
/// créneau déjà tenu, rien n'a été écrit.
pub(super) fn assign_duty_if_open(
    dispatcher: &Dispatcher,
    slot: &SlotId,
    caregiver_id: &CaregiverId,
    allow_overplanning: bool,
) -> Result<Option<Capacity>, DispatchError> {
    assign_inner(dispatcher, slot, caregiver_id, allow_overplanning, true)
}

fn assign_inner(
    dispatcher: &Dispatcher,
    slot: &SlotId,
    caregiver_id: &CaregiverId,
    allow_overplanning: bool,
    only_if_open: bool,
) -> Result<Option<Capacity>, DispatchError> {
    let caregiver = dispatcher.caregiver(caregiver_id)?;
    let mut board = dispatcher.duty_write();

    let (date, bucket) = {
        let s = board
            .slots
            .iter()
            .find(|s| &s.id == slot)
            .ok_or_else(|| DispatchError::UnknownSlot(slot.as_str().to_string()))?;
        if only_if_open && s.assigned.is_some() {
            return Ok(None);
        }
        (s.date, s.duty_type.capacity_bucket())
    };
    let month = MonthRef::from_date(date);

    // Le créneau lui-même est exclu du décompte : remplacer le titulaire
    // d'un créneau déjà planifié ne compte pas double.
    let assigned =
        capacity::assigned_in_month(&board.slots, caregiver_id, bucket, month, Some(slot));
    let limit = caregiver.limit_for(bucket);
    if !allow_overplanning && assigned + 1 > limit {
        return Err(DispatchError::CapacityExceeded {
            caregiver: caregiver_id.clone(),
            bucket,
            limit,
            month,
        });
    }

    let s = board
        .slots
        .iter_mut()
        .find(|s| &s.id == slot)
        .ok_or_else(|| DispatchError::UnknownSlot(slot.as_str().to_string()))?;
    s.assigned = Some(caregiver_id.clone());

    Ok(Some(Capacity::new(limit, assigned + 1)))
}

pub(super) fn unassign_duty(dispatcher: &Dispatcher, slot: &SlotId) -> Result<(), DispatchError> {
    let mut board = dispatcher.duty_write();
    let s = board
        .slots
        .iter_mut()
        .find(|s| &s.id == slot)
        .ok_or_else(|| DispatchError::UnknownSlot(slot.as_str().to_string()))?;
    s.assigned = None;
    Ok(())
}

pub(super) fn reset_planning(
    dispatcher: &Dispatcher,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<usize, DispatchError> {
    if end < start {
        return Err(DispatchError::InvalidArgument(
            "invalid date range: end before start",
        ));
    }
    let mut board = dispatcher.duty_write();
    let mut cleared = 0usize;
    for s in board
        .slots
        .iter_mut()
        .filter(|s| s.date >= start && s.date <= end)
    {
        if s.assigned.take().is_some() {
            cleared += 1;
        }
    }
    Ok(cleared)
}

pub(super) fn create_slot(
    dispatcher: &Dispatcher,
    date: NaiveDate,
    duty_type: DutyType,
    area: Area,
) -> SlotId {
    let mut board = dispatcher.duty_write();
    create_on_board(&mut board.slots, date, duty_type, area).0
}

/// Crée le créneau s'il n'existe pas déjà ; retourne (id, créé).
fn create_on_board(
    slots: &mut Vec<DutySlot>,
    date: NaiveDate,
    duty_type: DutyType,
    area: Area,
) -> (SlotId, bool) {
    if let Some(existing) = slots
        .iter()
        .find(|s| s.date == date && s.duty_type == duty_type && s.area == area)
    {
        return (existing.id.clone(), false);
    }
    let slot = DutySlot::new(date, duty_type, area);
    let id = slot.id.clone();
    slots.push(slot);
    (id, true)
}

pub(super) fn seed_month(dispatcher: &Dispatcher, month: MonthRef) -> usize {
    let mut board = dispatcher.duty_write();
    let mut created = 0usize;
    for date in calendar::month_days(month) {
        let mut demand = vec![
            (DutyType::AwNursing, Area::North),
            (DutyType::AwNursing, Area::South),
            (DutyType::RbDoctor, Area::Mixed),
        ];
        if calendar::is_weekend(date) {
            demand.extend([
                (DutyType::RbNursingWeekendDay, Area::North),
                (DutyType::RbNursingWeekendDay, Area::South),
                (DutyType::RbNursingWeekendNight, Area::North),
                (DutyType::RbNursingWeekendNight, Area::South),
            ]);
        }
        for (duty_type, area) in demand {
            if create_on_board(&mut board.slots, date, duty_type, area).1 {
                created += 1;
            }
        }
    }
    created
}
