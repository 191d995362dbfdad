//! Read-only patient summary.

use crate::model::appointment::{Appointment, AppointmentStatus};
use crate::model::id::PatientId;
use crate::model::medical_record::MedicalRecord;
use crate::model::patient::Patient;
use crate::service::appointment_service::upcoming;
use crate::service::billing_service::outstanding_balance;
use crate::store::{AppointmentQuery, BillingQuery, HospitalStore, StoreResult};
use rust_decimal::Decimal;

/// Everything the front desk needs about one patient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatientSummary {
    pub patient: Patient,
    /// Scheduled appointments, earliest first.
    pub upcoming_appointments: Vec<Appointment>,
    /// Medical history in recorded order.
    pub medical_records: Vec<MedicalRecord>,
    pub unpaid_bills: usize,
    pub outstanding_balance: Decimal,
}

pub struct SummaryService<'s> {
    store: &'s HospitalStore,
}

impl<'s> SummaryService<'s> {
    pub fn new(store: &'s HospitalStore) -> Self {
        Self { store }
    }

    /// Builds the summary for `patient_id`.
    ///
    /// # Errors
    /// - `NotFound` for an unknown patient.
    pub fn patient_summary(&self, patient_id: &PatientId) -> StoreResult<PatientSummary> {
        let patient = self.store.get_patient(patient_id)?.clone();
        let upcoming_appointments = upcoming(self.store.query_appointments(&AppointmentQuery {
            patient_id: Some(*patient_id),
            status: Some(AppointmentStatus::Scheduled),
            ..AppointmentQuery::default()
        }));
        let medical_records = patient
            .medical_history
            .iter()
            .map(|record_id| self.store.get_medical_record(record_id).cloned())
            .collect::<StoreResult<Vec<_>>>()?;
        let unpaid_bills = self
            .store
            .query_billing_records(&BillingQuery {
                patient_id: Some(*patient_id),
                unpaid_only: true,
            })
            .count();

        Ok(PatientSummary {
            outstanding_balance: outstanding_balance(self.store, patient_id)?,
            patient,
            upcoming_appointments,
            medical_records,
            unpaid_bills,
        })
    }
}
