//! Reference checks and whole-document consistency.
//!
//! # Invariants
//! - Reference checks never mutate tables.
//! - `from_snapshot` accepts a document only if every record would also have
//!   been accepted by the add paths.

use super::{StoreError, StoreResult, Tables};
use crate::model::appointment::Appointment;
use crate::model::billing::BillingRecord;
use crate::model::id::{EntityId, EntityKind};
use crate::model::medical_record::MedicalRecord;
use crate::model::validation::{ValidationError, ValidationResult};
use crate::persist::{HospitalSnapshot, PersistError, SCHEMA_VERSION};
use std::collections::{BTreeMap, BTreeSet};

impl Tables {
    pub(crate) fn require_patient(&self, field: &'static str, id: &EntityId) -> StoreResult<()> {
        if self.patients.contains_key(id) {
            Ok(())
        } else {
            Err(StoreError::Reference { field, id: *id })
        }
    }

    pub(crate) fn require_doctor(&self, field: &'static str, id: &EntityId) -> StoreResult<()> {
        if self.doctors.contains_key(id) {
            Ok(())
        } else {
            Err(StoreError::Reference { field, id: *id })
        }
    }

    pub(crate) fn check_appointment_refs(&self, appointment: &Appointment) -> StoreResult<()> {
        self.require_patient("patient_id", &appointment.patient_id)?;
        self.require_doctor("doctor_id", &appointment.doctor_id)
    }

    /// The linked appointment, when set, must exist and belong to the same
    /// patient as the bill.
    pub(crate) fn check_billing_refs(&self, bill: &BillingRecord) -> StoreResult<()> {
        self.require_patient("patient_id", &bill.patient_id)?;
        let Some(appointment_id) = bill.appointment_id else {
            return Ok(());
        };
        let appointment =
            self.appointments
                .get(&appointment_id)
                .ok_or(StoreError::Reference {
                    field: "appointment_id",
                    id: appointment_id,
                })?;
        if appointment.patient_id != bill.patient_id {
            return Err(ValidationError::InvalidState {
                field: "appointment_id",
                message: format!(
                    "appointment {} belongs to patient {}, not {}",
                    appointment_id, appointment.patient_id, bill.patient_id
                ),
            }
            .into());
        }
        Ok(())
    }

    pub(crate) fn check_medical_record_refs(&self, record: &MedicalRecord) -> StoreResult<()> {
        self.require_patient("patient_id", &record.patient_id)?;
        if let Some(doctor_id) = &record.doctor_id {
            self.require_doctor("doctor_id", doctor_id)?;
        }
        Ok(())
    }

    /// Ids of entities holding a direct reference to `id`.
    pub(crate) fn direct_dependents(&self, id: &EntityId) -> Vec<EntityId> {
        let mut dependents = Vec::new();
        match id.kind() {
            EntityKind::Patient => {
                dependents.extend(
                    self.appointments
                        .values()
                        .filter(|appointment| appointment.patient_id == *id)
                        .map(|appointment| appointment.id),
                );
                dependents.extend(
                    self.billing_records
                        .values()
                        .filter(|bill| bill.patient_id == *id)
                        .map(|bill| bill.id),
                );
                dependents.extend(
                    self.medical_records
                        .values()
                        .filter(|record| record.patient_id == *id)
                        .map(|record| record.id),
                );
            }
            EntityKind::Doctor => {
                dependents.extend(
                    self.appointments
                        .values()
                        .filter(|appointment| appointment.doctor_id == *id)
                        .map(|appointment| appointment.id),
                );
                dependents.extend(
                    self.medical_records
                        .values()
                        .filter(|record| record.doctor_id.as_ref() == Some(id))
                        .map(|record| record.id),
                );
            }
            EntityKind::Appointment => {
                dependents.extend(
                    self.billing_records
                        .values()
                        .filter(|bill| bill.appointment_id.as_ref() == Some(id))
                        .map(|bill| bill.id),
                );
            }
            EntityKind::BillingRecord | EntityKind::MedicalRecord => {}
        }
        dependents
    }

    pub(crate) fn to_snapshot(&self) -> HospitalSnapshot {
        HospitalSnapshot {
            schema_version: SCHEMA_VERSION,
            patients: self.patients.values().cloned().collect(),
            doctors: self.doctors.values().cloned().collect(),
            appointments: self.appointments.values().cloned().collect(),
            billing_records: self.billing_records.values().cloned().collect(),
            medical_records: self.medical_records.values().cloned().collect(),
        }
    }

    /// Rebuilds tables from a decoded document, rejecting it as a whole on
    /// the first inconsistency.
    pub(crate) fn from_snapshot(snapshot: HospitalSnapshot) -> Result<Self, PersistError> {
        let tables = Self {
            patients: index(EntityKind::Patient, snapshot.patients, |p| (p.id, p.validate()))?,
            doctors: index(EntityKind::Doctor, snapshot.doctors, |d| (d.id, d.validate()))?,
            appointments: index(EntityKind::Appointment, snapshot.appointments, |a| {
                (a.id, Ok(()))
            })?,
            billing_records: index(EntityKind::BillingRecord, snapshot.billing_records, |b| {
                (b.id, b.validate())
            })?,
            medical_records: index(EntityKind::MedicalRecord, snapshot.medical_records, |m| {
                (m.id, m.validate())
            })?,
        };

        for appointment in tables.appointments.values() {
            tables
                .check_appointment_refs(appointment)
                .map_err(|err| invalid(&appointment.id, err))?;
        }
        for bill in tables.billing_records.values() {
            tables
                .check_billing_refs(bill)
                .map_err(|err| invalid(&bill.id, err))?;
        }
        for record in tables.medical_records.values() {
            tables
                .check_medical_record_refs(record)
                .map_err(|err| invalid(&record.id, err))?;
        }
        tables.check_medical_histories()?;

        Ok(tables)
    }

    /// Each patient's history must list exactly the records it owns.
    fn check_medical_histories(&self) -> Result<(), PersistError> {
        let mut owned: BTreeMap<EntityId, BTreeSet<EntityId>> = BTreeMap::new();
        for record in self.medical_records.values() {
            owned.entry(record.patient_id).or_default().insert(record.id);
        }

        for patient in self.patients.values() {
            let listed: BTreeSet<EntityId> = patient.medical_history.iter().copied().collect();
            if listed.len() != patient.medical_history.len() {
                return Err(PersistError::InvalidData(format!(
                    "patient {}: medical_history lists a record twice",
                    patient.id
                )));
            }
            let expected = owned.remove(&patient.id).unwrap_or_default();
            if listed != expected {
                return Err(PersistError::InvalidData(format!(
                    "patient {}: medical_history does not match the medical records owned by this patient",
                    patient.id
                )));
            }
        }
        Ok(())
    }
}

fn index<T>(
    kind: EntityKind,
    records: Vec<T>,
    inspect: impl Fn(&T) -> (EntityId, ValidationResult<()>),
) -> Result<BTreeMap<EntityId, T>, PersistError> {
    let mut table = BTreeMap::new();
    for record in records {
        let (id, validation) = inspect(&record);
        if !id.is_kind(kind) {
            return Err(PersistError::InvalidData(format!(
                "id {id} found among {kind} entries"
            )));
        }
        validation.map_err(|err| invalid(&id, err.into()))?;
        if table.insert(id, record).is_some() {
            return Err(PersistError::InvalidData(format!("duplicate {kind} id {id}")));
        }
    }
    Ok(table)
}

fn invalid(id: &EntityId, err: StoreError) -> PersistError {
    PersistError::InvalidData(format!("{} {id}: {err}", id.kind()))
}
