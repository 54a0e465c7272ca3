#![forbid(unsafe_code)]
//! Releve — moteur de réaffectation de tournées de soins et d'astreintes.
//!
//! - Registre de propriété des rendez-vous (owner / replaced_from / tour_owner).
//! - Remplacements journaliers : transfert en masse, restitution sélective.
//! - Plafonds d'astreinte mensuels par compartiment, recalculés à la lecture.
//! - Planification automatique derrière un solveur opaque, annulable.
//! - Stockage fichiers (JSON/CSV), mutations sérialisées par verrou de tableau.

pub mod autoplan;
pub mod calendar;
pub mod capacity;
pub mod engine;
pub mod io;
pub mod model;
pub mod storage;

pub use autoplan::{
    AutoPlanOptions, AutoPlanReport, DutyProposal, DutySolver, ExistingHandling, RotationSolver,
    SlotRequest,
};
pub use calendar::MonthRef;
pub use capacity::{Capacity, CapacitySnapshot};
pub use engine::{DispatchError, Dispatcher, MoveResult, ReplacementResult};
pub use model::{
    Appointment, AppointmentId, Area, CapacityBucket, CareFunction, Caregiver, CaregiverId,
    DutySlot, DutyType, Plan, Replacement, SlotId, VisitType,
};
pub use storage::{JsonStorage, Storage};
