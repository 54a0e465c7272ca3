use crate::calendar::MonthRef;
use crate::model::{AppointmentId, CapacityBucket, CaregiverId};
use thiserror::Error;

/// Taxonomie d'erreurs du moteur de réaffectation.
///
/// `CapacityExceeded` est un refus de règle métier, toujours retourné en
/// `Err` ordinaire : le dispatcheur décide ensuite de forcer ou non.
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("unknown appointment: {0}")]
    UnknownAppointment(String),
    #[error("unknown caregiver: {0}")]
    UnknownCaregiver(String),
    #[error("unknown duty slot: {0}")]
    UnknownSlot(String),
    /// Protection client périmé : le propriétaire courant ne correspond
    /// plus à celui annoncé par l'appelant.
    #[error("stale owner for appointment {appointment}: expected {expected}, found {actual}")]
    StaleOwner {
        appointment: AppointmentId,
        expected: CaregiverId,
        actual: CaregiverId,
    },
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
    #[error("capacity exceeded for {caregiver}: {bucket} limit {limit} reached in {month}")]
    CapacityExceeded {
        caregiver: CaregiverId,
        bucket: CapacityBucket,
        limit: u32,
        month: MonthRef,
    },
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Issue structurée d'un déplacement de rendez-vous.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveResult {
    pub final_owner: CaregiverId,
    /// Un remplacement actif a détourné le destinataire effectif.
    pub redirected: bool,
    /// Soignant remplacé lorsque `redirected` (pour la confirmation UI).
    pub replaced_caregiver: Option<CaregiverId>,
}

/// Issue d'une pose ou d'une levée de remplacement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplacementResult {
    /// Nombre de rendez-vous transférés (ou restitués).
    pub moved: usize,
}
