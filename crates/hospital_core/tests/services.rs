use hospital_core::{
    AppointmentService, AppointmentStatus, BillingService, EntityId, HospitalStore,
    NewAppointment, NewBillingRecord, NewDoctor, NewMedicalRecord, NewPatient, StoreError,
    SummaryService, ValidationError,
};
use rust_decimal::Decimal;
use std::str::FromStr;

fn seeded() -> (HospitalStore, EntityId, EntityId) {
    let mut store = HospitalStore::new();
    let patient = store
        .add_patient(NewPatient::new("Jane Doe", "1990-05-01", "555-0100", "jane@x.com"))
        .unwrap();
    let doctor = store
        .add_doctor(NewDoctor {
            name: "Gregory House".to_string(),
            specialization: "Diagnostics".to_string(),
            license_number: "LIC-001".to_string(),
            phone: "555-0200".to_string(),
            email: "house@ppth.org".to_string(),
            ..NewDoctor::default()
        })
        .unwrap();
    (store, patient, doctor)
}

fn appointment(patient: EntityId, doctor: EntityId, date: &str, time: &str) -> NewAppointment {
    NewAppointment {
        patient_id: patient,
        doctor_id: doctor,
        date: date.to_string(),
        time: time.to_string(),
        reason: "follow-up".to_string(),
    }
}

fn bill(patient: EntityId, amount: &str, issued: &str) -> NewBillingRecord {
    NewBillingRecord {
        patient_id: patient,
        appointment_id: None,
        amount: amount.to_string(),
        date_issued: issued.to_string(),
        date_paid: None,
        services: vec!["lab work".to_string()],
    }
}

fn decimal(value: &str) -> Decimal {
    Decimal::from_str(value).unwrap()
}

#[test]
fn complete_and_cancel_only_leave_scheduled() {
    let (mut store, patient, doctor) = seeded();
    let mut service = AppointmentService::new(&mut store);
    let first = service
        .schedule(appointment(patient, doctor, "2030-03-01", "08:00"))
        .unwrap();
    let second = service
        .schedule(appointment(patient, doctor, "2030-03-02", "08:00"))
        .unwrap();

    service.complete(&first).unwrap();
    service.cancel(&second).unwrap();

    let err = service.cancel(&first).unwrap_err();
    assert!(matches!(
        err,
        StoreError::Validation(ValidationError::InvalidState {
            field: "status",
            ..
        })
    ));
    assert!(service.complete(&second).is_err());

    assert_eq!(
        store.get_appointment(&first).unwrap().status,
        AppointmentStatus::Completed
    );
    assert_eq!(
        store.get_appointment(&second).unwrap().status,
        AppointmentStatus::Cancelled
    );
}

#[test]
fn upcoming_appointments_are_sorted_by_time() {
    let (mut store, patient, doctor) = seeded();
    let mut service = AppointmentService::new(&mut store);
    let late = service
        .schedule(appointment(patient, doctor, "2030-03-05", "16:00"))
        .unwrap();
    let early = service
        .schedule(appointment(patient, doctor, "2030-03-05", "09:00"))
        .unwrap();
    let done = service
        .schedule(appointment(patient, doctor, "2030-03-01", "09:00"))
        .unwrap();
    service.complete(&done).unwrap();

    let upcoming = service.upcoming_for_doctor(&doctor).unwrap();
    let ids = upcoming.iter().map(|a| a.id).collect::<Vec<_>>();
    assert_eq!(ids, vec![early, late]);
    assert_eq!(service.upcoming_for_patient(&patient).unwrap().len(), 2);
}

#[test]
fn mark_paid_once_and_not_before_issue() {
    let (mut store, patient, _) = seeded();
    let mut service = BillingService::new(&mut store);
    let bill_id = service.issue(bill(patient, "80.00", "2030-04-10")).unwrap();

    let err = service.mark_paid(&bill_id, "2030-04-09").unwrap_err();
    assert!(matches!(
        err,
        StoreError::Validation(ValidationError::InvalidState {
            field: "date_paid",
            ..
        })
    ));

    service.mark_paid(&bill_id, "2030-04-12").unwrap();
    let err = service.mark_paid(&bill_id, "2030-04-13").unwrap_err();
    assert!(matches!(
        err,
        StoreError::Validation(ValidationError::InvalidState { field: "paid", .. })
    ));

    let paid = store.get_billing_record(&bill_id).unwrap();
    assert!(paid.paid);
    assert_eq!(paid.date_paid.unwrap().to_string(), "2030-04-12");
}

#[test]
fn outstanding_balance_sums_unpaid_amounts_exactly() {
    let (mut store, patient, _) = seeded();
    let mut service = BillingService::new(&mut store);
    service.issue(bill(patient, "0.10", "2030-04-10")).unwrap();
    service.issue(bill(patient, "0.20", "2030-04-10")).unwrap();
    let paid = service.issue(bill(patient, "100.00", "2030-04-10")).unwrap();
    service.mark_paid(&paid, "2030-04-10").unwrap();

    assert_eq!(
        service.outstanding_balance(&patient).unwrap(),
        decimal("0.30")
    );

    let missing: EntityId = "P42".parse().unwrap();
    assert!(matches!(
        service.outstanding_balance(&missing),
        Err(StoreError::NotFound(_))
    ));
}

#[test]
fn negative_amount_is_rejected() {
    let (mut store, patient, _) = seeded();
    let err = BillingService::new(&mut store)
        .issue(bill(patient, "-5", "2030-04-10"))
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::Validation(ValidationError::NegativeAmount { .. })
    ));
}

#[test]
fn patient_summary_collects_history_and_balance() {
    let (mut store, patient, doctor) = seeded();
    {
        let mut appointments = AppointmentService::new(&mut store);
        appointments
            .schedule(appointment(patient, doctor, "2030-05-01", "10:00"))
            .unwrap();
        let cancelled = appointments
            .schedule(appointment(patient, doctor, "2030-05-02", "10:00"))
            .unwrap();
        appointments.cancel(&cancelled).unwrap();
    }
    store.add_billing_record(bill(patient, "45.50", "2030-05-01")).unwrap();
    let record = store
        .add_medical_record(NewMedicalRecord {
            patient_id: patient,
            doctor_id: None,
            date: "2030-05-01".to_string(),
            diagnosis: "sprain".to_string(),
            treatment: "ice".to_string(),
            notes: "left ankle".to_string(),
        })
        .unwrap();

    let summary = SummaryService::new(&store).patient_summary(&patient).unwrap();
    assert_eq!(summary.patient.id, patient);
    assert_eq!(summary.upcoming_appointments.len(), 1);
    assert_eq!(
        summary.medical_records.iter().map(|r| r.id).collect::<Vec<_>>(),
        vec![record]
    );
    assert_eq!(summary.unpaid_bills, 1);
    assert_eq!(summary.outstanding_balance, decimal("45.50"));
}
