//! Medical record model.

use crate::model::id::{DoctorId, MedicalRecordId, PatientId};
use crate::model::validation::{check_text, parse_date, require_text, ValidationResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedicalRecord {
    pub id: MedicalRecordId,
    pub patient_id: PatientId,
    /// Attending doctor, when known.
    pub doctor_id: Option<DoctorId>,
    pub date: NaiveDate,
    pub diagnosis: String,
    pub treatment: String,
    pub notes: String,
}

impl MedicalRecord {
    pub fn validate(&self) -> ValidationResult<()> {
        check_text("diagnosis", &self.diagnosis)?;
        check_text("treatment", &self.treatment)
    }
}

/// Raw input for recording a diagnosis and treatment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMedicalRecord {
    pub patient_id: PatientId,
    pub doctor_id: Option<DoctorId>,
    /// `YYYY-MM-DD`.
    pub date: String,
    pub diagnosis: String,
    pub treatment: String,
    pub notes: String,
}

impl NewMedicalRecord {
    pub fn into_medical_record(self, id: MedicalRecordId) -> ValidationResult<MedicalRecord> {
        Ok(MedicalRecord {
            id,
            patient_id: self.patient_id,
            doctor_id: self.doctor_id,
            date: parse_date("date", &self.date)?,
            diagnosis: require_text("diagnosis", &self.diagnosis)?,
            treatment: require_text("treatment", &self.treatment)?,
            notes: self.notes.trim().to_string(),
        })
    }
}

/// Partial update for a medical record. `None` leaves a field unchanged;
/// `doctor_id: Some(None)` clears the attending doctor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MedicalRecordChanges {
    pub patient_id: Option<PatientId>,
    pub doctor_id: Option<Option<DoctorId>>,
    pub date: Option<String>,
    pub diagnosis: Option<String>,
    pub treatment: Option<String>,
    pub notes: Option<String>,
}

impl MedicalRecordChanges {
    pub fn apply_to(&self, current: &MedicalRecord) -> ValidationResult<MedicalRecord> {
        let mut next = current.clone();
        if let Some(patient_id) = self.patient_id {
            next.patient_id = patient_id;
        }
        if let Some(doctor_id) = self.doctor_id {
            next.doctor_id = doctor_id;
        }
        if let Some(date) = &self.date {
            next.date = parse_date("date", date)?;
        }
        if let Some(diagnosis) = &self.diagnosis {
            next.diagnosis = require_text("diagnosis", diagnosis)?;
        }
        if let Some(treatment) = &self.treatment {
            next.treatment = require_text("treatment", treatment)?;
        }
        if let Some(notes) = &self.notes {
            next.notes = notes.trim().to_string();
        }
        Ok(next)
    }
}
