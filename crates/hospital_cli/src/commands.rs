//! Command dispatch and text rendering.
//!
//! # Invariants
//! - Domain rules stay in `hospital_core`; this module only maps arguments
//!   to store calls and results to text.

use crate::cli::{
    AddressFields, AppointmentCommand, BillCommand, Command, DoctorCommand, DoctorFields,
    PatientCommand, PatientFields, PatientUpdateFields, RecordCommand,
};
use hospital_core::model::validation::parse_date;
use hospital_core::{
    day_name, Address, Appointment, AppointmentQuery, AppointmentService, AppointmentStatus,
    BillingQuery, BillingRecord, BillingService, DeleteReport, Doctor, HospitalStore,
    MedicalRecord, NewAppointment, NewBillingRecord, NewDoctor, NewMedicalRecord, NewPatient,
    Patient, PatientChanges, RawSchedule, StoreResult, SummaryService,
};

/// Rendered output plus whether the store must be written back.
pub struct Outcome {
    pub output: String,
    pub changed: bool,
}

impl Outcome {
    fn read(lines: Vec<String>) -> Self {
        Self {
            output: join(lines),
            changed: false,
        }
    }

    fn write(message: String) -> Self {
        Self {
            output: join(vec![message]),
            changed: true,
        }
    }
}

pub fn execute(command: &Command, store: &mut HospitalStore) -> StoreResult<Outcome> {
    match command {
        Command::Patient(command) => patient(command, store),
        Command::Doctor(command) => doctor(command, store),
        Command::Appointment(command) => appointment(command, store),
        Command::Bill(command) => bill(command, store),
        Command::Record(command) => record(command, store),
        Command::Summary { patient } => {
            let summary = SummaryService::new(store).patient_summary(patient)?;
            let mut lines = vec![patient_header(), patient_row(&summary.patient)];
            lines.push(String::new());
            lines.push(format!(
                "Upcoming appointments ({}):",
                summary.upcoming_appointments.len()
            ));
            lines.extend(summary.upcoming_appointments.iter().map(appointment_row));
            lines.push(format!("Medical records ({}):", summary.medical_records.len()));
            lines.extend(summary.medical_records.iter().map(record_row));
            lines.push(format!(
                "Unpaid bills: {}  Outstanding balance: {}",
                summary.unpaid_bills, summary.outstanding_balance
            ));
            Ok(Outcome::read(lines))
        }
        Command::Stats => {
            let counts = store.counts();
            Ok(Outcome::read(vec![
                format!("patients:        {}", counts.patients),
                format!("doctors:         {}", counts.doctors),
                format!("appointments:    {}", counts.appointments),
                format!("billing records: {}", counts.billing_records),
                format!("medical records: {}", counts.medical_records),
            ]))
        }
    }
}

fn patient(command: &PatientCommand, store: &mut HospitalStore) -> StoreResult<Outcome> {
    match command {
        PatientCommand::Add(fields) => {
            let id = store.add_patient(new_patient(fields)?)?;
            Ok(Outcome::write(format!("Patient added. Patient ID: {id}")))
        }
        PatientCommand::Show { id } => {
            let patient = store.get_patient(id)?;
            let mut lines = vec![patient_header(), patient_row(patient)];
            if let Some(blood_type) = patient.blood_type {
                lines.push(format!("Blood type: {}", blood_type.as_str()));
            }
            if !patient.allergies.is_empty() {
                lines.push(format!("Allergies: {}", patient.allergies.join(", ")));
            }
            if let Some(address) = &patient.address {
                lines.push(format!("Address: {}", address_line(address)));
            }
            let history = patient
                .medical_history
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>();
            lines.push(format!("Medical history: {}", or_none(&history.join(", "))));
            Ok(Outcome::read(lines))
        }
        PatientCommand::List => {
            let mut lines = vec![patient_header()];
            lines.extend(store.list_patients().iter().map(patient_row));
            Ok(Outcome::read(lines))
        }
        PatientCommand::Update { id, fields } => {
            store.update_patient(id, &patient_changes(fields)?)?;
            Ok(Outcome::write(format!("Patient {id} updated.")))
        }
        PatientCommand::Delete { id, cascade } => {
            let report = store.delete_patient(id, *cascade)?;
            Ok(Outcome::write(deleted(&report)))
        }
    }
}

fn doctor(command: &DoctorCommand, store: &mut HospitalStore) -> StoreResult<Outcome> {
    match command {
        DoctorCommand::Add(fields) => {
            let id = store.add_doctor(new_doctor(fields)?)?;
            Ok(Outcome::write(format!("Doctor added. Doctor ID: {id}")))
        }
        DoctorCommand::Show { id } => {
            let doctor = store.get_doctor(id)?;
            let mut lines = vec![
                doctor_header(),
                doctor_row(doctor),
                format!("License: {}", doctor.license_number),
            ];
            if let Some(gender) = doctor.gender {
                lines.push(format!("Gender: {}", gender.as_str()));
            }
            if let Some(dob) = doctor.date_of_birth {
                lines.push(format!("Date of birth: {dob}"));
            }
            if let Some(address) = &doctor.address {
                lines.push(format!("Address: {}", address_line(address)));
            }
            lines.push("Schedule:".to_string());
            if doctor.schedule.is_empty() {
                lines.push("  none".to_string());
            }
            for (day, times) in doctor.schedule.days() {
                let times = times
                    .iter()
                    .map(|time| time.format("%H:%M").to_string())
                    .collect::<Vec<_>>();
                lines.push(format!("  {:<10}{}", day_name(day), times.join(", ")));
            }
            Ok(Outcome::read(lines))
        }
        DoctorCommand::List => {
            let mut lines = vec![doctor_header()];
            lines.extend(store.list_doctors().iter().map(doctor_row));
            Ok(Outcome::read(lines))
        }
        DoctorCommand::Delete { id, cascade } => {
            let report = store.delete_doctor(id, *cascade)?;
            Ok(Outcome::write(deleted(&report)))
        }
    }
}

fn appointment(command: &AppointmentCommand, store: &mut HospitalStore) -> StoreResult<Outcome> {
    match command {
        AppointmentCommand::Schedule {
            patient,
            doctor,
            date,
            time,
            reason,
        } => {
            let id = AppointmentService::new(store).schedule(NewAppointment {
                patient_id: *patient,
                doctor_id: *doctor,
                date: date.clone(),
                time: time.clone(),
                reason: reason.clone(),
            })?;
            Ok(Outcome::write(format!(
                "Appointment scheduled. Appointment ID: {id}"
            )))
        }
        AppointmentCommand::List {
            patient,
            doctor,
            status,
            from,
            to,
        } => {
            let query = AppointmentQuery {
                patient_id: *patient,
                doctor_id: *doctor,
                status: status.as_deref().map(AppointmentStatus::parse).transpose()?,
                from: from.as_deref().map(|v| parse_date("from", v)).transpose()?,
                to: to.as_deref().map(|v| parse_date("to", v)).transpose()?,
            };
            let mut lines = vec![appointment_header()];
            lines.extend(store.query_appointments(&query).iter().map(appointment_row));
            Ok(Outcome::read(lines))
        }
        AppointmentCommand::Complete { id } => {
            AppointmentService::new(store).complete(id)?;
            Ok(Outcome::write(format!("Appointment {id} completed.")))
        }
        AppointmentCommand::Cancel { id } => {
            AppointmentService::new(store).cancel(id)?;
            Ok(Outcome::write(format!("Appointment {id} cancelled.")))
        }
    }
}

fn bill(command: &BillCommand, store: &mut HospitalStore) -> StoreResult<Outcome> {
    match command {
        BillCommand::Add {
            patient,
            appointment,
            amount,
            issued,
            services,
        } => {
            let id = BillingService::new(store).issue(NewBillingRecord {
                patient_id: *patient,
                appointment_id: *appointment,
                amount: amount.clone(),
                date_issued: issued.clone(),
                date_paid: None,
                services: services.clone(),
            })?;
            Ok(Outcome::write(format!("Bill issued. Bill ID: {id}")))
        }
        BillCommand::List { patient, unpaid } => {
            let query = BillingQuery {
                patient_id: *patient,
                unpaid_only: *unpaid,
            };
            let mut lines = vec![bill_header()];
            lines.extend(store.query_billing_records(&query).iter().map(bill_row));
            Ok(Outcome::read(lines))
        }
        BillCommand::Pay { id, date } => {
            BillingService::new(store).mark_paid(id, date)?;
            Ok(Outcome::write(format!("Bill {id} paid on {date}.")))
        }
        BillCommand::Balance { patient } => {
            let balance = BillingService::new(store).outstanding_balance(patient)?;
            Ok(Outcome::read(vec![format!(
                "Outstanding balance for {patient}: {balance}"
            )]))
        }
    }
}

fn record(command: &RecordCommand, store: &mut HospitalStore) -> StoreResult<Outcome> {
    match command {
        RecordCommand::Add {
            patient,
            doctor,
            date,
            diagnosis,
            treatment,
            notes,
        } => {
            let id = store.add_medical_record(NewMedicalRecord {
                patient_id: *patient,
                doctor_id: *doctor,
                date: date.clone(),
                diagnosis: diagnosis.clone(),
                treatment: treatment.clone(),
                notes: notes.clone(),
            })?;
            Ok(Outcome::write(format!("Medical record added. Record ID: {id}")))
        }
        RecordCommand::List { patient } => {
            let records = match patient {
                Some(patient_id) => {
                    let patient_id = *patient_id;
                    store
                        .list_medical_records()
                        .filter(move |record| record.patient_id == patient_id)
                        .to_vec()
                }
                None => store.list_medical_records().to_vec(),
            };
            let mut lines = vec![record_header()];
            lines.extend(records.iter().map(record_row));
            Ok(Outcome::read(lines))
        }
    }
}

fn new_patient(fields: &PatientFields) -> StoreResult<NewPatient> {
    Ok(NewPatient {
        name: fields.name.clone(),
        date_of_birth: fields.dob.clone(),
        phone: fields.phone.clone(),
        email: fields.email.clone(),
        address: address(&fields.address)?,
        gender: fields.gender.clone(),
        blood_type: fields.blood_type.clone(),
        allergies: fields.allergies.clone(),
    })
}

fn patient_changes(fields: &PatientUpdateFields) -> StoreResult<PatientChanges> {
    let address = if fields.clear_address {
        Some(None)
    } else {
        address(&fields.address)?.map(Some)
    };
    Ok(PatientChanges {
        name: fields.name.clone(),
        date_of_birth: fields.dob.clone(),
        phone: fields.phone.clone(),
        email: fields.email.clone(),
        address,
        gender: fields.gender.clone(),
        blood_type: fields.blood_type.clone(),
        allergies: fields.allergies.clone(),
    })
}

fn new_doctor(fields: &DoctorFields) -> StoreResult<NewDoctor> {
    Ok(NewDoctor {
        name: fields.name.clone(),
        specialization: fields.specialization.clone(),
        license_number: fields.license.clone(),
        phone: fields.phone.clone(),
        email: fields.email.clone(),
        address: address(&fields.address)?,
        gender: fields.gender.clone(),
        date_of_birth: fields.dob.clone(),
        schedule: schedule(&fields.slots),
    })
}

/// `None` when no address part was given.
fn address(fields: &AddressFields) -> StoreResult<Option<Address>> {
    let parts = [
        &fields.street,
        &fields.city,
        &fields.state,
        &fields.zip,
        &fields.country,
    ];
    if parts.iter().all(|part| part.is_none()) {
        return Ok(None);
    }
    let part = |value: &Option<String>| value.clone().unwrap_or_default();
    let address = Address::parse(
        &part(&fields.street),
        &part(&fields.city),
        &part(&fields.state),
        &part(&fields.zip),
        fields.country.as_deref(),
    )?;
    Ok(Some(address))
}

/// Groups `DAY=HH:MM` slots by day. A slot without `=` keeps an empty time,
/// which the store rejects.
fn schedule(slots: &[String]) -> RawSchedule {
    let mut schedule = RawSchedule::new();
    for slot in slots {
        let (day, time) = slot.split_once('=').unwrap_or((slot.as_str(), ""));
        schedule
            .entry(day.trim().to_string())
            .or_default()
            .push(time.trim().to_string());
    }
    schedule
}

fn address_line(address: &Address) -> String {
    let region = [address.state.as_str(), address.zip_code.as_str()]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    format!(
        "{}, {}, {}, {}",
        address.street, address.city, region, address.country
    )
}

fn deleted(report: &DeleteReport) -> String {
    let ids = report
        .removed
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>();
    format!("Deleted {}: {}", ids.len(), ids.join(", "))
}

fn patient_header() -> String {
    format!(
        "{:<8}{:<25}{:<8}{:<12}{:<15}{:<30}",
        "ID", "Name", "Gender", "DOB", "Phone", "Email"
    )
}

fn patient_row(patient: &Patient) -> String {
    format!(
        "{:<8}{:<25}{:<8}{:<12}{:<15}{:<30}",
        patient.id.to_string(),
        patient.name,
        patient.gender.map_or("-", |gender| gender.as_str()),
        patient.date_of_birth.to_string(),
        patient.contact.phone,
        patient.contact.email
    )
}

fn doctor_header() -> String {
    format!(
        "{:<8}{:<25}{:<20}{:<15}{:<30}",
        "ID", "Name", "Specialization", "Phone", "Email"
    )
}

fn doctor_row(doctor: &Doctor) -> String {
    format!(
        "{:<8}{:<25}{:<20}{:<15}{:<30}",
        doctor.id.to_string(),
        doctor.name,
        doctor.specialization,
        doctor.contact.phone,
        doctor.contact.email
    )
}

fn appointment_header() -> String {
    format!(
        "{:<8}{:<10}{:<10}{:<18}{:<12}{}",
        "ID", "Patient", "Doctor", "When", "Status", "Reason"
    )
}

fn appointment_row(appointment: &Appointment) -> String {
    format!(
        "{:<8}{:<10}{:<10}{:<18}{:<12}{}",
        appointment.id.to_string(),
        appointment.patient_id.to_string(),
        appointment.doctor_id.to_string(),
        appointment.scheduled_at.format("%Y-%m-%d %H:%M").to_string(),
        appointment.status.as_str(),
        appointment.reason
    )
}

fn bill_header() -> String {
    format!(
        "{:<8}{:<10}{:<13}{:>12}  {:<6}{:<12}{}",
        "ID", "Patient", "Appointment", "Amount", "Paid", "Issued", "Services"
    )
}

fn bill_row(bill: &BillingRecord) -> String {
    format!(
        "{:<8}{:<10}{:<13}{:>12}  {:<6}{:<12}{}",
        bill.id.to_string(),
        bill.patient_id.to_string(),
        bill.appointment_id
            .map_or_else(|| "-".to_string(), |id| id.to_string()),
        bill.amount.to_string(),
        if bill.paid { "yes" } else { "no" },
        bill.date_issued.to_string(),
        bill.services.join(", ")
    )
}

fn record_header() -> String {
    format!(
        "{:<8}{:<10}{:<10}{:<12}{:<25}{}",
        "ID", "Patient", "Doctor", "Date", "Diagnosis", "Treatment"
    )
}

fn record_row(record: &MedicalRecord) -> String {
    format!(
        "{:<8}{:<10}{:<10}{:<12}{:<25}{}",
        record.id.to_string(),
        record.patient_id.to_string(),
        record
            .doctor_id
            .map_or_else(|| "-".to_string(), |id| id.to_string()),
        record.date.to_string(),
        record.diagnosis,
        record.treatment
    )
}

fn or_none(value: &str) -> &str {
    if value.is_empty() {
        "none"
    } else {
        value
    }
}

fn join(lines: Vec<String>) -> String {
    let mut output = lines.join("\n");
    output.push('\n');
    output
}
