//! Add and update paths.
//!
//! Every operation builds the complete next record and checks it before the
//! first write, so a rejected call changes nothing (ids included).

use super::{log_outcome, HospitalStore, StoreResult};
use crate::model::appointment::{AppointmentChanges, NewAppointment};
use crate::model::billing::{BillingRecordChanges, NewBillingRecord};
use crate::model::doctor::{DoctorChanges, NewDoctor};
use crate::model::id::{
    AppointmentId, BillingRecordId, DoctorId, EntityKind, MedicalRecordId, PatientId,
};
use crate::model::medical_record::{MedicalRecordChanges, NewMedicalRecord};
use crate::model::patient::{NewPatient, PatientChanges};
use crate::model::validation::ValidationError;

impl HospitalStore {
    /// Registers a patient and returns the assigned id.
    ///
    /// # Errors
    /// - `Validation` for blank name, bad date of birth, email or phone.
    /// - `IdsExhausted` when the highest patient id is already taken.
    pub fn add_patient(&mut self, input: NewPatient) -> StoreResult<PatientId> {
        let result = self
            .ids
            .peek(EntityKind::Patient)
            .and_then(|id| self.insert_patient(id, input));
        log_outcome("add", EntityKind::Patient, &result, result.as_ref().ok());
        result
    }

    pub fn add_doctor(&mut self, input: NewDoctor) -> StoreResult<DoctorId> {
        let result = self
            .ids
            .peek(EntityKind::Doctor)
            .and_then(|id| self.insert_doctor(id, input));
        log_outcome("add", EntityKind::Doctor, &result, result.as_ref().ok());
        result
    }

    /// Schedules an appointment between an existing patient and doctor.
    ///
    /// # Errors
    /// - `Validation` for a bad date or time.
    /// - `Reference` when the patient or doctor does not exist.
    pub fn add_appointment(&mut self, input: NewAppointment) -> StoreResult<AppointmentId> {
        let result = self
            .ids
            .peek(EntityKind::Appointment)
            .and_then(|id| self.insert_appointment(id, input));
        log_outcome("add", EntityKind::Appointment, &result, result.as_ref().ok());
        result
    }

    /// Issues a bill, optionally linked to one of the patient's appointments.
    ///
    /// # Errors
    /// - `Validation` for a bad amount or dates, or an appointment that
    ///   belongs to another patient.
    /// - `Reference` when the patient or appointment does not exist.
    pub fn add_billing_record(&mut self, input: NewBillingRecord) -> StoreResult<BillingRecordId> {
        let result = self
            .ids
            .peek(EntityKind::BillingRecord)
            .and_then(|id| self.insert_billing_record(id, input));
        log_outcome("add", EntityKind::BillingRecord, &result, result.as_ref().ok());
        result
    }

    /// Records a diagnosis and appends it to the patient's medical history.
    pub fn add_medical_record(&mut self, input: NewMedicalRecord) -> StoreResult<MedicalRecordId> {
        let result = self
            .ids
            .peek(EntityKind::MedicalRecord)
            .and_then(|id| self.insert_medical_record(id, input));
        log_outcome("add", EntityKind::MedicalRecord, &result, result.as_ref().ok());
        result
    }

    pub fn update_patient(&mut self, id: &PatientId, changes: &PatientChanges) -> StoreResult<()> {
        let result = self.replace_patient(id, changes);
        log_outcome("update", EntityKind::Patient, &result, Some(id));
        result
    }

    pub fn update_doctor(&mut self, id: &DoctorId, changes: &DoctorChanges) -> StoreResult<()> {
        let result = self.replace_doctor(id, changes);
        log_outcome("update", EntityKind::Doctor, &result, Some(id));
        result
    }

    /// Applies `changes` to an appointment.
    ///
    /// Moving an appointment to another patient is rejected while bills for
    /// it still name the previous patient.
    pub fn update_appointment(
        &mut self,
        id: &AppointmentId,
        changes: &AppointmentChanges,
    ) -> StoreResult<()> {
        let result = self.replace_appointment(id, changes);
        log_outcome("update", EntityKind::Appointment, &result, Some(id));
        result
    }

    pub fn update_billing_record(
        &mut self,
        id: &BillingRecordId,
        changes: &BillingRecordChanges,
    ) -> StoreResult<()> {
        let result = self.replace_billing_record(id, changes);
        log_outcome("update", EntityKind::BillingRecord, &result, Some(id));
        result
    }

    /// Applies `changes` to a medical record, moving it between patient
    /// histories when the owner changes.
    pub fn update_medical_record(
        &mut self,
        id: &MedicalRecordId,
        changes: &MedicalRecordChanges,
    ) -> StoreResult<()> {
        let result = self.replace_medical_record(id, changes);
        log_outcome("update", EntityKind::MedicalRecord, &result, Some(id));
        result
    }

    fn insert_patient(&mut self, id: PatientId, input: NewPatient) -> StoreResult<PatientId> {
        let patient = input.into_patient(id)?;
        self.ids.commit(id);
        self.tables.patients.insert(id, patient);
        Ok(id)
    }

    fn insert_doctor(&mut self, id: DoctorId, input: NewDoctor) -> StoreResult<DoctorId> {
        let doctor = input.into_doctor(id)?;
        self.ids.commit(id);
        self.tables.doctors.insert(id, doctor);
        Ok(id)
    }

    fn insert_appointment(
        &mut self,
        id: AppointmentId,
        input: NewAppointment,
    ) -> StoreResult<AppointmentId> {
        let appointment = input.into_appointment(id)?;
        self.tables.check_appointment_refs(&appointment)?;
        self.ids.commit(id);
        self.tables.appointments.insert(id, appointment);
        Ok(id)
    }

    fn insert_billing_record(
        &mut self,
        id: BillingRecordId,
        input: NewBillingRecord,
    ) -> StoreResult<BillingRecordId> {
        let bill = input.into_billing_record(id)?;
        self.tables.check_billing_refs(&bill)?;
        self.ids.commit(id);
        self.tables.billing_records.insert(id, bill);
        Ok(id)
    }

    fn insert_medical_record(
        &mut self,
        id: MedicalRecordId,
        input: NewMedicalRecord,
    ) -> StoreResult<MedicalRecordId> {
        let record = input.into_medical_record(id)?;
        self.tables.check_medical_record_refs(&record)?;
        let patient_id = record.patient_id;
        self.ids.commit(id);
        self.tables.medical_records.insert(id, record);
        if let Some(patient) = self.tables.patients.get_mut(&patient_id) {
            patient.medical_history.push(id);
        }
        Ok(id)
    }

    fn replace_patient(&mut self, id: &PatientId, changes: &PatientChanges) -> StoreResult<()> {
        let next = changes.apply_to(self.get_patient(id)?)?;
        self.tables.patients.insert(*id, next);
        Ok(())
    }

    fn replace_doctor(&mut self, id: &DoctorId, changes: &DoctorChanges) -> StoreResult<()> {
        let next = changes.apply_to(self.get_doctor(id)?)?;
        self.tables.doctors.insert(*id, next);
        Ok(())
    }

    fn replace_appointment(
        &mut self,
        id: &AppointmentId,
        changes: &AppointmentChanges,
    ) -> StoreResult<()> {
        let next = changes.apply_to(self.get_appointment(id)?)?;
        self.tables.check_appointment_refs(&next)?;
        let billed_elsewhere = self
            .tables
            .billing_records
            .values()
            .find(|bill| bill.appointment_id == Some(*id) && bill.patient_id != next.patient_id);
        if let Some(bill) = billed_elsewhere {
            return Err(ValidationError::InvalidState {
                field: "patient_id",
                message: format!(
                    "billing record {} for this appointment belongs to patient {}",
                    bill.id, bill.patient_id
                ),
            }
            .into());
        }
        self.tables.appointments.insert(*id, next);
        Ok(())
    }

    fn replace_billing_record(
        &mut self,
        id: &BillingRecordId,
        changes: &BillingRecordChanges,
    ) -> StoreResult<()> {
        let next = changes.apply_to(self.get_billing_record(id)?)?;
        self.tables.check_billing_refs(&next)?;
        self.tables.billing_records.insert(*id, next);
        Ok(())
    }

    fn replace_medical_record(
        &mut self,
        id: &MedicalRecordId,
        changes: &MedicalRecordChanges,
    ) -> StoreResult<()> {
        let current = self.get_medical_record(id)?;
        let previous_owner = current.patient_id;
        let next = changes.apply_to(current)?;
        self.tables.check_medical_record_refs(&next)?;
        let new_owner = next.patient_id;
        self.tables.medical_records.insert(*id, next);
        if new_owner != previous_owner {
            if let Some(patient) = self.tables.patients.get_mut(&previous_owner) {
                patient.medical_history.retain(|record_id| record_id != id);
            }
            if let Some(patient) = self.tables.patients.get_mut(&new_owner) {
                patient.medical_history.push(*id);
            }
        }
        Ok(())
    }
}
