//! Billing use-case service.
//!
//! # Responsibility
//! - Issue bills and record payments.
//! - Compute outstanding balances per patient.
//!
//! # Invariants
//! - A bill is paid at most once; reopening goes through
//!   `HospitalStore::update_billing_record`.

use crate::model::billing::{BillingRecordChanges, NewBillingRecord};
use crate::model::id::{BillingRecordId, PatientId};
use crate::model::validation::ValidationError;
use crate::store::{BillingQuery, HospitalStore, StoreResult};
use log::info;
use rust_decimal::Decimal;

/// Use-case wrapper for bill issuing and payment.
pub struct BillingService<'s> {
    store: &'s mut HospitalStore,
}

impl<'s> BillingService<'s> {
    pub fn new(store: &'s mut HospitalStore) -> Self {
        Self { store }
    }

    pub fn issue(&mut self, input: NewBillingRecord) -> StoreResult<BillingRecordId> {
        self.store.add_billing_record(input)
    }

    /// Records payment of a bill on `date_paid` (`YYYY-MM-DD`).
    ///
    /// # Errors
    /// - `NotFound` for an unknown bill.
    /// - `Validation` when the bill is already paid, the date is malformed,
    ///   or the date precedes the issue date.
    pub fn mark_paid(&mut self, id: &BillingRecordId, date_paid: &str) -> StoreResult<()> {
        let bill = self.store.get_billing_record(id)?;
        if bill.paid {
            return Err(ValidationError::InvalidState {
                field: "paid",
                message: format!("billing record {id} is already paid"),
            }
            .into());
        }
        self.store.update_billing_record(
            id,
            &BillingRecordChanges {
                date_paid: Some(Some(date_paid.to_string())),
                ..BillingRecordChanges::default()
            },
        )?;
        info!("event=bill_paid module=service status=ok id={id}");
        Ok(())
    }

    /// Sum of unpaid bill amounts for one patient.
    ///
    /// # Errors
    /// - `NotFound` for an unknown patient.
    pub fn outstanding_balance(&self, patient_id: &PatientId) -> StoreResult<Decimal> {
        outstanding_balance(&*self.store, patient_id)
    }
}

pub(crate) fn outstanding_balance(
    store: &HospitalStore,
    patient_id: &PatientId,
) -> StoreResult<Decimal> {
    store.get_patient(patient_id)?;
    let query = BillingQuery {
        patient_id: Some(*patient_id),
        unpaid_only: true,
    };
    Ok(store
        .query_billing_records(&query)
        .iter()
        .map(|bill| bill.outstanding())
        .sum())
}
