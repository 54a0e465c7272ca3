#![forbid(unsafe_code)]
use chrono::Weekday;
use releve::{
    Appointment, Area, CareFunction, Caregiver, CaregiverId, DispatchError, Dispatcher, Plan,
    VisitType,
};

#[test]
fn set_replacement_moves_every_monday_appointment() {
    let (plan, anna, bruno, _tessa) = sample_plan();
    let dispatcher = Dispatcher::new(plan);

    let result = dispatcher.set_replacement(&anna, Weekday::Mon, &bruno).unwrap();
    assert_eq!(result.moved, 3);

    let snapshot = dispatcher.plan();
    for a in snapshot.appointments.iter().filter(|a| a.weekday == Weekday::Mon) {
        assert_eq!(a.owner, bruno);
        assert_eq!(a.replaced_from, Some(anna.clone()));
    }
    // le mardi n'est pas concerné
    let tuesday = snapshot
        .appointments
        .iter()
        .find(|a| a.weekday == Weekday::Tue)
        .unwrap();
    assert_eq!(tuesday.owner, anna);
    assert_eq!(tuesday.replaced_from, None);

    assert_eq!(dispatcher.check_replacement(&anna, Weekday::Mon), Some(bruno));
    assert_eq!(dispatcher.check_replacement(&anna, Weekday::Tue), None);
}

#[test]
fn clear_replacement_restores_untouched_appointments() {
    let (plan, anna, bruno, _tessa) = sample_plan();
    let dispatcher = Dispatcher::new(plan);

    dispatcher.set_replacement(&anna, Weekday::Mon, &bruno).unwrap();
    let result = dispatcher.clear_replacement(&anna, Weekday::Mon).unwrap();
    assert_eq!(result.moved, 3);

    let snapshot = dispatcher.plan();
    for a in snapshot.appointments.iter().filter(|a| a.weekday == Weekday::Mon) {
        assert_eq!(a.owner, anna);
        assert_eq!(a.replaced_from, None);
    }
    assert_eq!(dispatcher.check_replacement(&anna, Weekday::Mon), None);
}

// Régression volontaire : un rendez-vous redirigé vers un tiers après la
// pose du remplacement reflète une décision ultérieure et n'est PAS
// restitué à la levée.
#[test]
fn redirected_appointment_survives_clear() {
    let (plan, anna, bruno, tessa) = sample_plan();
    let dispatcher = Dispatcher::new(plan);

    dispatcher.set_replacement(&anna, Weekday::Mon, &bruno).unwrap();
    let moved = dispatcher.appointments_of(&bruno, Weekday::Mon);
    let redirected = moved[0].clone();
    dispatcher
        .move_appointment(&redirected, &bruno, &tessa, true)
        .unwrap();

    let result = dispatcher.clear_replacement(&anna, Weekday::Mon).unwrap();
    assert_eq!(result.moved, 2);

    let snapshot = dispatcher.plan();
    let survivor = snapshot.find_appointment(&redirected).unwrap();
    assert_eq!(survivor.owner, tessa);
    assert_eq!(survivor.replaced_from, None);
}

#[test]
fn replacements_are_never_stacked() {
    let (plan, anna, bruno, tessa) = sample_plan();
    let dispatcher = Dispatcher::new(plan);

    dispatcher.set_replacement(&anna, Weekday::Mon, &bruno).unwrap();
    let result = dispatcher.set_replacement(&anna, Weekday::Mon, &tessa).unwrap();
    assert_eq!(result.moved, 3);

    let snapshot = dispatcher.plan();
    assert_eq!(snapshot.replacements.len(), 1);
    for a in snapshot.appointments.iter().filter(|a| a.weekday == Weekday::Mon) {
        assert_eq!(a.owner, tessa);
        assert_eq!(a.replaced_from, Some(anna.clone()));
    }

    // la levée restitue directement au propriétaire d'origine
    dispatcher.clear_replacement(&anna, Weekday::Mon).unwrap();
    let snapshot = dispatcher.plan();
    for a in snapshot.appointments.iter().filter(|a| a.weekday == Weekday::Mon) {
        assert_eq!(a.owner, anna);
    }
}

#[test]
fn self_replacement_is_rejected() {
    let (plan, anna, _bruno, _tessa) = sample_plan();
    let dispatcher = Dispatcher::new(plan);

    let err = dispatcher
        .set_replacement(&anna, Weekday::Mon, &anna)
        .unwrap_err();
    assert!(matches!(err, DispatchError::InvalidArgument(_)));
}

#[test]
fn unknown_replacement_caregiver_is_rejected() {
    let (plan, anna, _bruno, _tessa) = sample_plan();
    let dispatcher = Dispatcher::new(plan);

    let ghost = CaregiverId::new("ghost");
    let err = dispatcher
        .set_replacement(&anna, Weekday::Mon, &ghost)
        .unwrap_err();
    assert!(matches!(err, DispatchError::UnknownCaregiver(_)));
}

/// Anna possède 3 rendez-vous le lundi et 1 le mardi.
fn sample_plan() -> (Plan, CaregiverId, CaregiverId, CaregiverId) {
    let anna = Caregiver::new("anna", "Anna", CareFunction::Nursing, Area::North);
    let bruno = Caregiver::new("bruno", "Bruno", CareFunction::Nursing, Area::North);
    let tessa = Caregiver::new("tessa", "Tessa", CareFunction::Nursing, Area::South);
    let (a, b, t) = (anna.id.clone(), bruno.id.clone(), tessa.id.clone());

    let mut plan = Plan {
        caregivers: vec![anna, bruno, tessa],
        ..Plan::default()
    };
    for patient in ["Durand", "Martin", "Petit"] {
        plan.appointments.push(
            Appointment::new(
                patient.to_string(),
                Weekday::Mon,
                VisitType::HomeVisit,
                30,
                a.clone(),
            )
            .unwrap(),
        );
    }
    plan.appointments.push(
        Appointment::new(
            "Robert".to_string(),
            Weekday::Tue,
            VisitType::PhoneContact,
            15,
            a.clone(),
        )
        .unwrap(),
    );
    (plan, a, b, t)
}
