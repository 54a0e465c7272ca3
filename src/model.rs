use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

/// Identifiant fort pour Caregiver
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CaregiverId(String);

impl CaregiverId {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        Self(s.as_ref().to_owned())
    }
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CaregiverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fonction métier d'un soignant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CareFunction {
    Nursing,
    Doctor,
    Pdl,
    Physio,
}

impl CareFunction {
    pub fn as_str(self) -> &'static str {
        match self {
            CareFunction::Nursing => "nursing",
            CareFunction::Doctor => "doctor",
            CareFunction::Pdl => "pdl",
            CareFunction::Physio => "physio",
        }
    }
}

/// Secteur géographique couvert (tournées et astreintes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Area {
    North,
    South,
    Mixed,
}

impl Area {
    pub fn as_str(self) -> &'static str {
        match self {
            Area::North => "north",
            Area::South => "south",
            Area::Mixed => "mixed",
        }
    }

    /// Deux secteurs sont compatibles si égaux ou si l'un des deux est mixte.
    pub fn covers(self, other: Area) -> bool {
        self == other || self == Area::Mixed || other == Area::Mixed
    }
}

impl fmt::Display for Area {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Soignant (infirmier, médecin, PDL, kiné).
///
/// Créé/mis à jour par import administratif ; immuable pendant les
/// opérations de planification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caregiver {
    pub id: CaregiverId,
    pub handle: String,
    pub display_name: String,
    pub function: CareFunction,
    pub area: Area,
    /// Pourcentage de temps de travail (pilote la durée cible des tournées,
    /// pas les plafonds d'astreinte).
    #[serde(default = "full_time")]
    pub work_hours_percent: u8,
    /// Plafond mensuel par compartiment ; entrée absente = plafond 0.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub duty_limits: BTreeMap<CapacityBucket, u32>,
}

fn full_time() -> u8 {
    100
}

impl Caregiver {
    pub fn new<H: Into<String>, D: Into<String>>(
        handle: H,
        display_name: D,
        function: CareFunction,
        area: Area,
    ) -> Self {
        Self {
            id: CaregiverId::random(),
            handle: handle.into(),
            display_name: display_name.into(),
            function,
            area,
            work_hours_percent: 100,
            duty_limits: BTreeMap::new(),
        }
    }

    pub fn limit_for(&self, bucket: CapacityBucket) -> u32 {
        self.duty_limits.get(&bucket).copied().unwrap_or(0)
    }
}

/// Identifiant fort pour Appointment
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AppointmentId(String);

impl AppointmentId {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        Self(s.as_ref().to_owned())
    }
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AppointmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Type de visite d'un rendez-vous.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum VisitType {
    HomeVisit,
    PhoneContact,
    NewAdmission,
    #[default]
    Unspecified,
}

impl VisitType {
    pub fn as_str(self) -> &'static str {
        match self {
            VisitType::HomeVisit => "home_visit",
            VisitType::PhoneContact => "phone_contact",
            VisitType::NewAdmission => "new_admission",
            VisitType::Unspecified => "none",
        }
    }
}

/// Rendez-vous récurrent d'un patient, un jour de semaine donné.
///
/// Trois références soignant :
/// - `owner` : qui effectue le rendez-vous aujourd'hui (mutable) ;
/// - `replaced_from` : propriétaire avant le dernier remplacement
///   (Some ssi le rendez-vous est actuellement « sous remplacement ») ;
/// - `tour_owner` : tournée nominale, stable, pour le regroupement affichage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: AppointmentId,
    pub patient: String,
    pub weekday: Weekday,
    #[serde(default)]
    pub visit_type: VisitType,
    pub duration_minutes: u32,
    pub owner: CaregiverId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replaced_from: Option<CaregiverId>,
    pub tour_owner: CaregiverId,
}

impl Appointment {
    /// Crée un rendez-vous en validant durée et patient ; `tour_owner`
    /// démarre sur le propriétaire initial.
    pub fn new(
        patient: String,
        weekday: Weekday,
        visit_type: VisitType,
        duration_minutes: u32,
        owner: CaregiverId,
    ) -> Result<Self, String> {
        if patient.trim().is_empty() {
            return Err("patient cannot be empty".to_string());
        }
        if duration_minutes == 0 {
            return Err("duration must be > 0".to_string());
        }
        Ok(Self {
            id: AppointmentId::random(),
            patient,
            weekday,
            visit_type,
            duration_minutes,
            owner: owner.clone(),
            replaced_from: None,
            tour_owner: owner,
        })
    }

    /// Le rendez-vous est-il actuellement détenu via un remplacement ?
    pub fn under_replacement(&self) -> bool {
        self.replaced_from.is_some()
    }
}

/// Remplacement actif : les rendez-vous de `caregiver` le jour `weekday`
/// sont détenus par `replacement`. Au plus un par (caregiver, weekday).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Replacement {
    pub caregiver: CaregiverId,
    pub weekday: Weekday,
    pub replacement: CaregiverId,
}

/// Identifiant fort pour DutySlot
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SlotId(String);

impl SlotId {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        Self(s.as_ref().to_owned())
    }
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Type d'astreinte (AW = présence planifiée, RB = astreinte téléphonique).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DutyType {
    AwNursing,
    RbNursingWeekendDay,
    RbNursingWeekendNight,
    RbDoctor,
}

impl DutyType {
    pub fn as_str(self) -> &'static str {
        match self {
            DutyType::AwNursing => "aw_nursing",
            DutyType::RbNursingWeekendDay => "rb_nursing_weekend_day",
            DutyType::RbNursingWeekendNight => "rb_nursing_weekend_night",
            DutyType::RbDoctor => "rb_doctor",
        }
    }

    /// Compartiment de capacité. Jour et nuit du week-end infirmier
    /// partagent un seul compartiment (règle métier, volontaire).
    pub fn capacity_bucket(self) -> CapacityBucket {
        match self {
            DutyType::AwNursing => CapacityBucket::AwNursing,
            DutyType::RbNursingWeekendDay | DutyType::RbNursingWeekendNight => {
                CapacityBucket::RbNursingWeekend
            }
            DutyType::RbDoctor => CapacityBucket::RbDoctor,
        }
    }

    /// Fonction requise pour tenir ce type d'astreinte.
    pub fn function(self) -> CareFunction {
        match self {
            DutyType::AwNursing
            | DutyType::RbNursingWeekendDay
            | DutyType::RbNursingWeekendNight => CareFunction::Nursing,
            DutyType::RbDoctor => CareFunction::Doctor,
        }
    }
}

impl fmt::Display for DutyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compartiment de décompte des plafonds mensuels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CapacityBucket {
    AwNursing,
    RbNursingWeekend,
    RbDoctor,
}

impl CapacityBucket {
    pub fn as_str(self) -> &'static str {
        match self {
            CapacityBucket::AwNursing => "aw_nursing",
            CapacityBucket::RbNursingWeekend => "rb_nursing_weekend",
            CapacityBucket::RbDoctor => "rb_doctor",
        }
    }
}

impl fmt::Display for CapacityBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Créneau d'astreinte : une unité de demande (date, type, secteur).
///
/// `assigned` est l'affectation elle-même : au plus un soignant par créneau,
/// tenu par construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DutySlot {
    pub id: SlotId,
    pub date: NaiveDate,
    pub duty_type: DutyType,
    pub area: Area,
    pub assigned: Option<CaregiverId>,
}

impl DutySlot {
    pub fn new(date: NaiveDate, duty_type: DutyType, area: Area) -> Self {
        Self {
            id: SlotId::random(),
            date,
            duty_type,
            area,
            assigned: None,
        }
    }
}

/// Plan complet (document sérialisable, source de vérité unique).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Plan {
    pub caregivers: Vec<Caregiver>,
    #[serde(default)]
    pub appointments: Vec<Appointment>,
    #[serde(default)]
    pub replacements: Vec<Replacement>,
    #[serde(default)]
    pub duty_slots: Vec<DutySlot>,
}

impl Plan {
    pub fn find_caregiver_by_handle<'a>(&'a self, handle: &str) -> Option<&'a Caregiver> {
        self.caregivers.iter().find(|c| c.handle == handle)
    }
    pub fn find_caregiver_by_id<'a>(&'a self, id: &CaregiverId) -> Option<&'a Caregiver> {
        self.caregivers.iter().find(|c| &c.id == id)
    }
    pub fn find_appointment<'a>(&'a self, id: &AppointmentId) -> Option<&'a Appointment> {
        self.appointments.iter().find(|a| &a.id == id)
    }
    pub fn find_slot<'a>(&'a self, id: &SlotId) -> Option<&'a DutySlot> {
        self.duty_slots.iter().find(|s| &s.id == id)
    }
}
