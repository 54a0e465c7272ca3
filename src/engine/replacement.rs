//! Registre des remplacements : relation journalière « C est remplacé
//! par R », transfert en masse à la pose, restitution sélective à la
//! levée. L'asymétrie est voulue : un rendez-vous redirigé ailleurs
//! entre-temps reflète une décision ultérieure et n'est pas restitué.

use super::{ownership, CareBoard, DispatchError, Dispatcher, ReplacementResult};
use crate::model::{CaregiverId, Replacement};
use chrono::Weekday;

pub(super) fn active_replacement(
    board: &CareBoard,
    caregiver: &CaregiverId,
    weekday: Weekday,
) -> Option<CaregiverId> {
    board
        .replacements
        .iter()
        .find(|r| &r.caregiver == caregiver && r.weekday == weekday)
        .map(|r| r.replacement.clone())
}

pub(super) fn set_replacement(
    dispatcher: &Dispatcher,
    caregiver: &CaregiverId,
    weekday: Weekday,
    replacement: &CaregiverId,
) -> Result<ReplacementResult, DispatchError> {
    if caregiver == replacement {
        return Err(DispatchError::InvalidArgument(
            "a caregiver cannot replace itself",
        ));
    }
    dispatcher.caregiver(caregiver)?;
    dispatcher.caregiver(replacement)?;

    let mut board = dispatcher.care_write();

    // Jamais empilé : un remplacement déjà actif est d'abord levé.
    if active_replacement(&board, caregiver, weekday).is_some() {
        clear_on_board(&mut board, caregiver, weekday)?;
    }

    let owned = ownership::owned_on(&board, caregiver, weekday);
    for id in &owned {
        ownership::set_owner(&mut board, id, replacement.clone(), Some(caregiver.clone()))?;
    }
    board.replacements.push(Replacement {
        caregiver: caregiver.clone(),
        weekday,
        replacement: replacement.clone(),
    });

    Ok(ReplacementResult { moved: owned.len() })
}

pub(super) fn clear_replacement(
    dispatcher: &Dispatcher,
    caregiver: &CaregiverId,
    weekday: Weekday,
) -> Result<ReplacementResult, DispatchError> {
    dispatcher.caregiver(caregiver)?;
    let mut board = dispatcher.care_write();
    clear_on_board(&mut board, caregiver, weekday)
}

/// Levée sous verrou déjà tenu : restitue uniquement les rendez-vous
/// dont `replaced_from` pointe encore sur `caregiver`, puis supprime la
/// ligne de remplacement.
fn clear_on_board(
    board: &mut CareBoard,
    caregiver: &CaregiverId,
    weekday: Weekday,
) -> Result<ReplacementResult, DispatchError> {
    let to_revert: Vec<_> = board
        .appointments
        .iter()
        .filter(|a| a.weekday == weekday && a.replaced_from.as_ref() == Some(caregiver))
        .map(|a| a.id.clone())
        .collect();

    for id in &to_revert {
        ownership::set_owner(board, id, caregiver.clone(), None)?;
    }
    board
        .replacements
        .retain(|r| !(&r.caregiver == caregiver && r.weekday == weekday));

    Ok(ReplacementResult {
        moved: to_revert.len(),
    })
}
