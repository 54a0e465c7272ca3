//! Primitives du registre de propriété. Écriture réservée au moteur de
//! transaction : les appelants extérieurs passent par les opérations de
//! la façade pour garder l'atomicité.

use super::{CareBoard, DispatchError};
use crate::model::{AppointmentId, CaregiverId};
use chrono::Weekday;

pub(super) fn owner_of<'a>(
    board: &'a CareBoard,
    id: &AppointmentId,
) -> Result<&'a CaregiverId, DispatchError> {
    board
        .appointments
        .iter()
        .find(|a| &a.id == id)
        .map(|a| &a.owner)
        .ok_or_else(|| DispatchError::UnknownAppointment(id.as_str().to_string()))
}

/// Écriture inconditionnelle du propriétaire et de l'étiquette d'origine.
pub(super) fn set_owner(
    board: &mut CareBoard,
    id: &AppointmentId,
    owner: CaregiverId,
    replaced_from: Option<CaregiverId>,
) -> Result<(), DispatchError> {
    let appointment = board
        .appointments
        .iter_mut()
        .find(|a| &a.id == id)
        .ok_or_else(|| DispatchError::UnknownAppointment(id.as_str().to_string()))?;
    appointment.owner = owner;
    appointment.replaced_from = replaced_from;
    Ok(())
}

pub(super) fn owned_on(
    board: &CareBoard,
    caregiver: &CaregiverId,
    weekday: Weekday,
) -> Vec<AppointmentId> {
    board
        .appointments
        .iter()
        .filter(|a| &a.owner == caregiver && a.weekday == weekday)
        .map(|a| a.id.clone())
        .collect()
}
