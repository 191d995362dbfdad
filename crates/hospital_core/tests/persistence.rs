use hospital_core::{
    Address, EntityId, EntityKind, HospitalStore, NewAppointment, NewBillingRecord, NewDoctor,
    NewMedicalRecord, NewPatient, PersistError, RawSchedule, StoreError, SCHEMA_VERSION,
};
use serde_json::{json, Value};
use std::path::Path;

fn populated() -> HospitalStore {
    let mut store = HospitalStore::new();
    let patient = store
        .add_patient(NewPatient {
            gender: Some("F".to_string()),
            blood_type: Some("O+".to_string()),
            allergies: vec!["latex".to_string()],
            ..NewPatient::new("Jane Doe", "1990-05-01", "555-0100", "jane@x.com")
        })
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
    let appointment = store
        .add_appointment(NewAppointment {
            patient_id: patient,
            doctor_id: doctor,
            date: "2030-01-10".to_string(),
            time: "09:30".to_string(),
            reason: "checkup".to_string(),
        })
        .unwrap();
    store
        .add_billing_record(NewBillingRecord {
            patient_id: patient,
            appointment_id: Some(appointment),
            amount: "150.00".to_string(),
            date_issued: "2030-01-10".to_string(),
            date_paid: Some("2030-01-11".to_string()),
            services: vec!["consultation".to_string(), "x-ray".to_string()],
        })
        .unwrap();
    store
        .add_medical_record(NewMedicalRecord {
            patient_id: patient,
            doctor_id: Some(doctor),
            date: "2030-01-10".to_string(),
            diagnosis: "flu".to_string(),
            treatment: "rest".to_string(),
            notes: "recheck in a week".to_string(),
        })
        .unwrap();
    store
}

fn id(value: &str) -> EntityId {
    value.parse().unwrap()
}

fn write_json(path: &Path, value: &Value) {
    std::fs::write(path, serde_json::to_string_pretty(value).unwrap()).unwrap();
}

fn patient_json(id: &str, history: &[&str]) -> Value {
    json!({
        "id": id,
        "name": "Jane Doe",
        "date_of_birth": "1990-05-01",
        "phone": "555-0100",
        "email": "jane@x.com",
        "gender": null,
        "blood_type": null,
        "allergies": [],
        "medical_history": history,
    })
}

fn document(patients: Vec<Value>, appointments: Vec<Value>, records: Vec<Value>) -> Value {
    json!({
        "schema_version": 1,
        "patients": patients,
        "doctors": [{
            "id": "D1",
            "name": "Gregory House",
            "specialization": "Diagnostics",
            "license_number": "LIC-001",
            "phone": "555-0200",
            "email": "house@ppth.org",
        }],
        "appointments": appointments,
        "billing_records": [],
        "medical_records": records,
    })
}

fn appointment_json(id: &str, patient: &str) -> Value {
    json!({
        "id": id,
        "patient_id": patient,
        "doctor_id": "D1",
        "scheduled_at": "2030-01-10T09:30:00",
        "reason": "",
        "status": "scheduled",
    })
}

#[test]
fn save_then_load_reproduces_every_entity() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hospital.json");
    let store = populated();
    store.save_to_file(&path).unwrap();

    let mut loaded = HospitalStore::new();
    loaded.load_from_file(&path).unwrap();

    assert_eq!(loaded.counts(), store.counts());
    assert_eq!(
        loaded.list_patients().to_vec(),
        store.list_patients().to_vec()
    );
    assert_eq!(loaded.list_doctors().to_vec(), store.list_doctors().to_vec());
    assert_eq!(
        loaded.list_appointments().to_vec(),
        store.list_appointments().to_vec()
    );
    assert_eq!(
        loaded.list_billing_records().to_vec(),
        store.list_billing_records().to_vec()
    );
    assert_eq!(
        loaded.list_medical_records().to_vec(),
        store.list_medical_records().to_vec()
    );
}

#[test]
fn saved_document_has_stable_wire_shape() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hospital.json");
    populated().save_to_file(&path).unwrap();

    let value: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(value["schema_version"], json!(SCHEMA_VERSION));

    let patient = &value["patients"][0];
    assert_eq!(patient["id"], "P1");
    assert_eq!(patient["date_of_birth"], "1990-05-01");
    assert_eq!(patient["phone"], "555-0100");
    assert_eq!(patient["gender"], "F");
    assert_eq!(patient["blood_type"], "O+");
    assert_eq!(patient["medical_history"], json!(["M1"]));

    let appointment = &value["appointments"][0];
    assert_eq!(appointment["scheduled_at"], "2030-01-10T09:30:00");
    assert_eq!(appointment["status"], "scheduled");

    let bill = &value["billing_records"][0];
    assert_eq!(bill["amount"], "150.00");
    assert_eq!(bill["paid"], true);
    assert_eq!(bill["appointment_id"], "A1");
    assert_eq!(bill["services"], json!(["consultation", "x-ray"]));

    assert_eq!(value["medical_records"][0]["doctor_id"], "D1");
}

#[test]
fn save_replaces_the_file_without_leftovers() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hospital.json");
    std::fs::write(&path, "old contents").unwrap();

    populated().save_to_file(&path).unwrap();
    HospitalStore::new().save_to_file(&path).unwrap();

    let entries = std::fs::read_dir(dir.path()).unwrap().count();
    assert_eq!(entries, 1);
    let reopened = HospitalStore::open_or_create(&path).unwrap();
    assert!(reopened.is_empty());
}

#[test]
fn dangling_reference_in_file_fails_and_keeps_state() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.json");
    write_json(
        &path,
        &document(
            vec![patient_json("P1", &[])],
            vec![appointment_json("A1", "P2")],
            vec![],
        ),
    );

    let mut store = populated();
    let before = store.list_patients().to_vec();
    let err = store.load_from_file(&path).unwrap_err();

    assert!(matches!(
        err,
        StoreError::Persistence(PersistError::InvalidData(_))
    ));
    assert_eq!(store.list_patients().to_vec(), before);
    assert_eq!(store.counts().appointments, 1);
}

#[test]
fn malformed_or_foreign_documents_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.json");
    let mut store = HospitalStore::new();

    std::fs::write(&path, "{ not json").unwrap();
    assert!(matches!(
        store.load_from_file(&path),
        Err(StoreError::Persistence(PersistError::Json(_)))
    ));

    let mut unknown_key = document(vec![], vec![], vec![]);
    unknown_key["nurses"] = json!([]);
    write_json(&path, &unknown_key);
    assert!(matches!(
        store.load_from_file(&path),
        Err(StoreError::Persistence(PersistError::Json(_)))
    ));

    let mut newer = document(vec![], vec![], vec![]);
    newer["schema_version"] = json!(SCHEMA_VERSION + 1);
    write_json(&path, &newer);
    assert!(matches!(
        store.load_from_file(&path),
        Err(StoreError::Persistence(
            PersistError::UnsupportedSchemaVersion { .. }
        ))
    ));

    let missing = dir.path().join("missing.json");
    assert!(matches!(
        store.load_from_file(&missing),
        Err(StoreError::Persistence(PersistError::Io { .. }))
    ));

    assert!(store.is_empty());
}

#[test]
fn duplicate_ids_and_wrong_prefixes_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.json");
    let mut store = HospitalStore::new();

    write_json(
        &path,
        &document(
            vec![patient_json("P1", &[]), patient_json("P1", &[])],
            vec![],
            vec![],
        ),
    );
    assert!(matches!(
        store.load_from_file(&path),
        Err(StoreError::Persistence(PersistError::InvalidData(_)))
    ));

    write_json(
        &path,
        &document(vec![patient_json("D9", &[])], vec![], vec![]),
    );
    assert!(matches!(
        store.load_from_file(&path),
        Err(StoreError::Persistence(PersistError::InvalidData(_)))
    ));
    assert!(store.is_empty());
}

#[test]
fn medical_history_must_match_records() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.json");
    let record = json!({
        "id": "M1",
        "patient_id": "P1",
        "doctor_id": null,
        "date": "2030-01-10",
        "diagnosis": "flu",
        "treatment": "rest",
        "notes": "",
    });

    write_json(
        &path,
        &document(vec![patient_json("P1", &[])], vec![], vec![record.clone()]),
    );
    let mut store = HospitalStore::new();
    assert!(matches!(
        store.load_from_file(&path),
        Err(StoreError::Persistence(PersistError::InvalidData(_)))
    ));

    write_json(
        &path,
        &document(vec![patient_json("P1", &["M1"])], vec![], vec![record]),
    );
    store.load_from_file(&path).unwrap();
    assert_eq!(store.get_patient(&id("P1")).unwrap().medical_history, vec![id("M1")]);
}

#[test]
fn missing_schema_version_defaults_to_current() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("legacy.json");
    let mut legacy = document(vec![patient_json("P1", &[])], vec![], vec![]);
    legacy.as_object_mut().unwrap().remove("schema_version");
    write_json(&path, &legacy);

    let store = HospitalStore::open_or_create(&path).unwrap();
    assert_eq!(store.counts().patients, 1);
    assert_eq!(store.counts().doctors, 1);
}

#[test]
fn ids_resume_after_highest_loaded_id() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.json");
    write_json(
        &path,
        &document(
            vec![patient_json("P7", &[])],
            vec![appointment_json("A3", "P7")],
            vec![],
        ),
    );

    let mut store = HospitalStore::open_or_create(&path).unwrap();
    let patient = store
        .add_patient(NewPatient::new("Ann Poe", "2001-07-04", "555-0102", "ann@x.com"))
        .unwrap();
    assert_eq!(patient, id("P8"));
    let doctor = store
        .add_doctor(NewDoctor {
            name: "Lisa Cuddy".to_string(),
            specialization: "Endocrinology".to_string(),
            license_number: "LIC-002".to_string(),
            phone: "555-0300".to_string(),
            email: "cuddy@ppth.org".to_string(),
            ..NewDoctor::default()
        })
        .unwrap();
    assert_eq!(doctor, id("D2"));
}

#[test]
fn open_or_create_without_file_starts_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.json");

    let store = HospitalStore::open_or_create(&path).unwrap();
    assert!(store.is_empty());
    assert!(!path.exists());
}

fn schedule(entries: &[(&str, &[&str])]) -> RawSchedule {
    entries
        .iter()
        .map(|(day, times)| (day.to_string(), times.iter().map(|t| t.to_string()).collect()))
        .collect()
}

#[test]
fn address_gender_and_schedule_survive_a_save() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hospital.json");
    let mut store = HospitalStore::new();
    let patient = store
        .add_patient(NewPatient {
            address: Some(Address::parse("1 Main St", "Springfield", "IL", "62701", None).unwrap()),
            ..NewPatient::new("Jane Doe", "1990-05-01", "555-0100", "jane@x.com")
        })
        .unwrap();
    let doctor = store
        .add_doctor(NewDoctor {
            name: "Gregory House".to_string(),
            specialization: "Diagnostics".to_string(),
            license_number: "LIC-001".to_string(),
            phone: "555-0200".to_string(),
            email: "house@ppth.org".to_string(),
            address: Some(
                Address::parse("221B Baker St", "Princeton", "NJ", "08540", Some("USA")).unwrap(),
            ),
            gender: Some("m".to_string()),
            date_of_birth: Some("1959-06-11".to_string()),
            schedule: schedule(&[("mon", &["14:00", "09:00"]), ("Friday", &["10:30"])]),
        })
        .unwrap();
    store.save_to_file(&path).unwrap();

    let value: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(
        value["patients"][0]["address"],
        json!({
            "street": "1 Main St",
            "city": "Springfield",
            "state": "IL",
            "zip_code": "62701",
            "country": "USA",
        })
    );
    let saved_doctor = &value["doctors"][0];
    assert_eq!(saved_doctor["gender"], "M");
    assert_eq!(saved_doctor["date_of_birth"], "1959-06-11");
    assert_eq!(saved_doctor["address"]["city"], "Princeton");
    assert_eq!(
        saved_doctor["schedule"],
        json!({"Friday": ["10:30"], "Monday": ["09:00", "14:00"]})
    );

    let reopened = HospitalStore::open_or_create(&path).unwrap();
    assert_eq!(reopened.get_patient(&patient).unwrap(), store.get_patient(&patient).unwrap());
    assert_eq!(reopened.get_doctor(&doctor).unwrap(), store.get_doctor(&doctor).unwrap());
}

#[test]
fn doctor_without_new_fields_loads_with_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("legacy.json");
    write_json(&path, &document(vec![patient_json("P1", &[])], vec![], vec![]));

    let store = HospitalStore::open_or_create(&path).unwrap();
    let doctor = store.get_doctor(&id("D1")).unwrap();
    assert!(doctor.address.is_none());
    assert!(doctor.gender.is_none());
    assert!(doctor.schedule.is_empty());
    assert!(store.get_patient(&id("P1")).unwrap().address.is_none());
}

#[test]
fn bad_address_or_schedule_in_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.json");
    let mut store = HospitalStore::new();

    let mut blank_city = document(vec![], vec![], vec![]);
    blank_city["doctors"][0]["address"] = json!({
        "street": "1 Main St",
        "city": " ",
        "zip_code": "62701",
    });
    write_json(&path, &blank_city);
    assert!(matches!(
        store.load_from_file(&path),
        Err(StoreError::Persistence(PersistError::InvalidData(_)))
    ));

    let mut bad_day = document(vec![], vec![], vec![]);
    bad_day["doctors"][0]["schedule"] = json!({"Someday": ["09:00"]});
    write_json(&path, &bad_day);
    assert!(matches!(
        store.load_from_file(&path),
        Err(StoreError::Persistence(PersistError::Json(_)))
    ));
    assert!(store.is_empty());
}

#[test]
fn add_fails_once_the_last_id_is_taken() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.json");
    let last = format!("P{}", u64::MAX);
    write_json(&path, &document(vec![patient_json(&last, &[])], vec![], vec![]));

    let mut store = HospitalStore::open_or_create(&path).unwrap();
    let err = store
        .add_patient(NewPatient::new("New Patient", "2001-07-04", "555-0102", "new@x.com"))
        .unwrap_err();

    assert!(matches!(err, StoreError::IdsExhausted(EntityKind::Patient)));
    assert_eq!(err.code(), "ids_exhausted");
    assert_eq!(store.counts().patients, 1);
    assert_eq!(store.get_patient(&id(&last)).unwrap().name, "Jane Doe");
    assert!(store
        .add_doctor(NewDoctor {
            name: "Lisa Cuddy".to_string(),
            specialization: "Endocrinology".to_string(),
            license_number: "LIC-002".to_string(),
            phone: "555-0300".to_string(),
            email: "cuddy@ppth.org".to_string(),
            ..NewDoctor::default()
        })
        .is_ok());
}

#[test]
fn failed_save_onto_a_directory_leaves_no_temp_file() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("hospital.json");
    let target = dir.path().join("occupied");
    std::fs::create_dir(&target).unwrap();
    std::fs::write(target.join("keep.txt"), "keep").unwrap();
    populated().save_to_file(&data).unwrap();
    let before = std::fs::read(&data).unwrap();

    let err = HospitalStore::new().save_to_file(&target).unwrap_err();

    assert!(matches!(
        err,
        StoreError::Persistence(PersistError::Io { .. })
    ));
    assert!(target.is_dir());
    assert_eq!(std::fs::read(&data).unwrap(), before);
    let mut names = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().into_string().unwrap())
        .collect::<Vec<_>>();
    names.sort();
    assert_eq!(names, vec!["hospital.json", "occupied"]);
}

#[cfg(unix)]
#[test]
fn failed_save_in_read_only_dir_keeps_old_bytes() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let locked = dir.path().join("locked");
    std::fs::create_dir(&locked).unwrap();
    let path = locked.join("hospital.json");
    populated().save_to_file(&path).unwrap();
    let before = std::fs::read(&path).unwrap();
    std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o555)).unwrap();

    // Permission bits do not bind a privileged user.
    let canary = locked.join("canary");
    if std::fs::write(&canary, "x").is_ok() {
        std::fs::remove_file(&canary).unwrap();
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o755)).unwrap();
        return;
    }

    let mut store = populated();
    store
        .add_patient(NewPatient::new("Ann Poe", "2001-07-04", "555-0102", "ann@x.com"))
        .unwrap();
    let result = store.save_to_file(&path);
    let entries = std::fs::read_dir(&locked).unwrap().count();
    std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o755)).unwrap();

    assert!(matches!(
        result,
        Err(StoreError::Persistence(PersistError::Io { .. }))
    ));
    assert_eq!(std::fs::read(&path).unwrap(), before);
    assert_eq!(entries, 1);
}
