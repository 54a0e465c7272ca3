//! Déplacements de rendez-vous : unitaire (avec détour éventuel par un
//! remplacement actif) et transfert de tournée en masse. Validation
//! complète avant toute écriture : en cas d'échec, le registre reste
//! inchangé.

use super::{ownership, replacement, DispatchError, Dispatcher, MoveResult};
use crate::model::{AppointmentId, CaregiverId};

pub(super) fn move_appointment(
    dispatcher: &Dispatcher,
    id: &AppointmentId,
    from: &CaregiverId,
    to: &CaregiverId,
    respect_replacement: bool,
) -> Result<MoveResult, DispatchError> {
    dispatcher.caregiver(to)?;
    let mut board = dispatcher.care_write();

    let (weekday, actual) = {
        let appointment = board
            .appointments
            .iter()
            .find(|a| &a.id == id)
            .ok_or_else(|| DispatchError::UnknownAppointment(id.as_str().to_string()))?;
        (appointment.weekday, appointment.owner.clone())
    };
    if &actual != from {
        return Err(DispatchError::StaleOwner {
            appointment: id.clone(),
            expected: from.clone(),
            actual,
        });
    }

    // Détour : déplacer « vers » un soignant remplacé livre en réalité
    // à son remplaçant, étiquette d'origine posée en conséquence.
    let redirect = if respect_replacement {
        replacement::active_replacement(&board, to, weekday)
    } else {
        None
    };

    let result = match redirect {
        Some(effective) => {
            ownership::set_owner(&mut board, id, effective.clone(), Some(to.clone()))?;
            MoveResult {
                final_owner: effective,
                redirected: true,
                replaced_caregiver: Some(to.clone()),
            }
        }
        None => {
            // Déplacement littéral : le rendez-vous sort de tout
            // remplacement en cours.
            ownership::set_owner(&mut board, id, to.clone(), None)?;
            MoveResult {
                final_owner: to.clone(),
                redirected: false,
                replaced_caregiver: None,
            }
        }
    };
    Ok(result)
}

pub(super) fn batch_move_appointments(
    dispatcher: &Dispatcher,
    from: &CaregiverId,
    to: &CaregiverId,
) -> Result<usize, DispatchError> {
    if from == to {
        return Err(DispatchError::InvalidArgument(
            "batch move target equals source",
        ));
    }
    dispatcher.caregiver(from)?;
    dispatcher.caregiver(to)?;

    let mut board = dispatcher.care_write();
    let ids: Vec<_> = board
        .appointments
        .iter()
        .filter(|a| &a.owner == from)
        .map(|a| a.id.clone())
        .collect();

    // Tout ou rien : la collecte et l'application se font sous le même
    // verrou, aucune écriture partielle n'est visible.
    for id in &ids {
        ownership::set_owner(&mut board, id, to.clone(), None)?;
    }
    Ok(ids.len())
}
