#![forbid(unsafe_code)]
use chrono::NaiveDate;
use releve::{
    calendar, Area, CapacityBucket, CareFunction, Caregiver, CaregiverId, DispatchError,
    Dispatcher, DutyType, MonthRef, Plan, SlotId,
};

#[test]
fn capacity_arithmetic_holds() {
    let (dispatcher, nurse, _) = sample_dispatcher();
    let date = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
    let slot = dispatcher.create_slot(date, DutyType::AwNursing, Area::North);

    dispatcher.assign_duty(&slot, &nurse, false).unwrap();

    let month = MonthRef::new(2024, 3).unwrap();
    let capacity = dispatcher.capacity(&nurse, DutyType::AwNursing, month).unwrap();
    assert_eq!(capacity.limit, 2);
    assert_eq!(capacity.assigned, 1);
    assert_eq!(capacity.remaining, 1);
    assert_eq!(i64::from(capacity.assigned) + capacity.remaining, i64::from(capacity.limit));
}

#[test]
fn capacity_ceiling_blocks_then_overplanning_forces() {
    let (dispatcher, nurse, _) = sample_dispatcher();
    let month = MonthRef::new(2024, 3).unwrap();
    let slots: Vec<SlotId> = (4u32..7)
        .map(|d| {
            let date = NaiveDate::from_ymd_opt(2024, 3, d).unwrap();
            dispatcher.create_slot(date, DutyType::AwNursing, Area::North)
        })
        .collect();

    dispatcher.assign_duty(&slots[0], &nurse, false).unwrap();
    dispatcher.assign_duty(&slots[1], &nurse, false).unwrap();

    let err = dispatcher.assign_duty(&slots[2], &nurse, false).unwrap_err();
    assert!(matches!(err, DispatchError::CapacityExceeded { limit: 2, .. }));
    // le refus n'a rien écrit
    let capacity = dispatcher.capacity(&nurse, DutyType::AwNursing, month).unwrap();
    assert_eq!(capacity.assigned, 2);

    // forçage explicite : le restant passe négatif
    dispatcher.assign_duty(&slots[2], &nurse, true).unwrap();
    let capacity = dispatcher.capacity(&nurse, DutyType::AwNursing, month).unwrap();
    assert_eq!(capacity.assigned, 3);
    assert_eq!(capacity.remaining, -1);
}

// Jour et nuit du week-end infirmier partagent un seul compartiment :
// le plafond se lit sur le décompte combiné.
#[test]
fn weekend_day_and_night_share_one_bucket() {
    let (dispatcher, nurse, _) = sample_dispatcher();
    let saturday = NaiveDate::from_ymd_opt(2024, 3, 2).unwrap();
    let day = dispatcher.create_slot(saturday, DutyType::RbNursingWeekendDay, Area::North);
    let night = dispatcher.create_slot(saturday, DutyType::RbNursingWeekendNight, Area::North);

    dispatcher.assign_duty(&day, &nurse, false).unwrap();
    let err = dispatcher.assign_duty(&night, &nurse, false).unwrap_err();
    assert!(matches!(
        err,
        DispatchError::CapacityExceeded {
            bucket: CapacityBucket::RbNursingWeekend,
            ..
        }
    ));

    let month = MonthRef::new(2024, 3).unwrap();
    let via_day = dispatcher
        .capacity(&nurse, DutyType::RbNursingWeekendDay, month)
        .unwrap();
    let via_night = dispatcher
        .capacity(&nurse, DutyType::RbNursingWeekendNight, month)
        .unwrap();
    assert_eq!(via_day, via_night);
    assert_eq!(via_day.assigned, 1);
}

#[test]
fn slot_holder_is_replaced_never_stacked() {
    let (dispatcher, nurse, other) = sample_dispatcher();
    let date = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
    let slot = dispatcher.create_slot(date, DutyType::AwNursing, Area::North);
    let month = MonthRef::new(2024, 3).unwrap();

    dispatcher.assign_duty(&slot, &nurse, false).unwrap();
    dispatcher.assign_duty(&slot, &other, false).unwrap();

    let snapshot = dispatcher.plan();
    assert_eq!(snapshot.find_slot(&slot).unwrap().assigned, Some(other.clone()));
    // l'ancien titulaire récupère sa capacité
    let capacity = dispatcher.capacity(&nurse, DutyType::AwNursing, month).unwrap();
    assert_eq!(capacity.assigned, 0);
}

#[test]
fn reassigning_same_slot_does_not_double_count() {
    let (dispatcher, nurse, _) = sample_dispatcher();
    let saturday = NaiveDate::from_ymd_opt(2024, 3, 2).unwrap();
    let slot = dispatcher.create_slot(saturday, DutyType::RbNursingWeekendDay, Area::North);

    // plafond 1 sur le compartiment week-end : réaffecter le même
    // créneau au même soignant doit repasser
    dispatcher.assign_duty(&slot, &nurse, false).unwrap();
    dispatcher.assign_duty(&slot, &nurse, false).unwrap();
}

#[test]
fn unassign_and_reset_planning() {
    let (dispatcher, nurse, _) = sample_dispatcher();
    let d1 = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
    let d2 = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
    let s1 = dispatcher.create_slot(d1, DutyType::AwNursing, Area::North);
    let s2 = dispatcher.create_slot(d2, DutyType::AwNursing, Area::North);

    dispatcher.assign_duty(&s1, &nurse, false).unwrap();
    dispatcher.assign_duty(&s2, &nurse, false).unwrap();

    dispatcher.unassign_duty(&s1).unwrap();
    assert_eq!(dispatcher.plan().find_slot(&s1).unwrap().assigned, None);

    let cleared = dispatcher.reset_planning(d1, d2).unwrap();
    assert_eq!(cleared, 1);
    assert_eq!(dispatcher.plan().find_slot(&s2).unwrap().assigned, None);

    let err = dispatcher.reset_planning(d2, d1).unwrap_err();
    assert!(matches!(err, DispatchError::InvalidArgument(_)));
}

#[test]
fn unknown_slot_is_not_found() {
    let (dispatcher, _, _) = sample_dispatcher();
    let err = dispatcher.unassign_duty(&SlotId::new("missing")).unwrap_err();
    assert!(matches!(err, DispatchError::UnknownSlot(_)));
}

#[test]
fn seed_month_generates_standing_demand_once() {
    let (dispatcher, _, _) = sample_dispatcher();
    let month = MonthRef::new(2024, 3).unwrap();

    // mars 2024 : 31 jours dont 10 de week-end
    let days = calendar::month_days(month);
    assert_eq!(days.len(), 31);
    let weekend_days = days.iter().filter(|d| calendar::is_weekend(**d)).count();
    assert_eq!(weekend_days, 10);

    let created = dispatcher.seed_month(month);
    assert_eq!(created, 31 * 3 + 10 * 4);

    // idempotent par (date, type, secteur)
    assert_eq!(dispatcher.seed_month(month), 0);
}

#[test]
fn calendar_iso_weeks() {
    let date = NaiveDate::from_ymd_opt(2024, 3, 2).unwrap();
    assert_eq!(calendar::iso_week(date), (2024, 9));

    let week = calendar::week_days(2024, 9);
    assert_eq!(week.len(), 7);
    assert_eq!(week[0], NaiveDate::from_ymd_opt(2024, 2, 26).unwrap());
    assert_eq!(week[6], NaiveDate::from_ymd_opt(2024, 3, 3).unwrap());
}

/// Une infirmière plafonnée à 2 AW et 1 RB week-end par mois, plus une
/// collègue avec les mêmes plafonds.
fn sample_dispatcher() -> (Dispatcher, CaregiverId, CaregiverId) {
    let mut nurse = Caregiver::new("xenia", "Xenia", CareFunction::Nursing, Area::North);
    nurse.duty_limits.insert(CapacityBucket::AwNursing, 2);
    nurse.duty_limits.insert(CapacityBucket::RbNursingWeekend, 1);
    let mut other = Caregiver::new("yann", "Yann", CareFunction::Nursing, Area::North);
    other.duty_limits.insert(CapacityBucket::AwNursing, 2);
    other.duty_limits.insert(CapacityBucket::RbNursingWeekend, 1);

    let (x, y) = (nurse.id.clone(), other.id.clone());
    let plan = Plan {
        caregivers: vec![nurse, other],
        ..Plan::default()
    };
    (Dispatcher::new(plan), x, y)
}
