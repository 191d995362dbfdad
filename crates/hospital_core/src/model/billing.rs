//! Billing record model.
//!
//! # Invariants
//! - `amount >= 0`.
//! - `paid == date_paid.is_some()`.
//! - `date_paid`, when set, is not earlier than `date_issued`.
//! - An `appointment_id`, when set, belongs to the same patient (enforced by
//!   the store).

use crate::model::id::{AppointmentId, BillingRecordId, PatientId};
use crate::model::validation::{
    check_amount, check_text, normalize_list, parse_amount, parse_date, ValidationError,
    ValidationResult,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingRecord {
    pub id: BillingRecordId,
    pub patient_id: PatientId,
    pub appointment_id: Option<AppointmentId>,
    /// Serialized as a decimal string to keep exact cents.
    pub amount: Decimal,
    pub paid: bool,
    pub date_issued: NaiveDate,
    pub date_paid: Option<NaiveDate>,
    pub services: Vec<String>,
}

impl BillingRecord {
    pub fn validate(&self) -> ValidationResult<()> {
        check_amount("amount", self.amount)?;
        for service in &self.services {
            check_text("services", service)?;
        }
        check_payment(self.paid, self.date_issued, self.date_paid)
    }

    /// Outstanding amount: the full amount while unpaid, zero once paid.
    pub fn outstanding(&self) -> Decimal {
        if self.paid {
            Decimal::ZERO
        } else {
            self.amount
        }
    }
}

fn check_payment(
    paid: bool,
    date_issued: NaiveDate,
    date_paid: Option<NaiveDate>,
) -> ValidationResult<()> {
    match (paid, date_paid) {
        (true, None) => Err(ValidationError::InvalidState {
            field: "date_paid",
            message: "paid bill must carry a payment date".to_string(),
        }),
        (false, Some(_)) => Err(ValidationError::InvalidState {
            field: "paid",
            message: "unpaid bill must not carry a payment date".to_string(),
        }),
        (true, Some(date_paid)) if date_paid < date_issued => Err(ValidationError::InvalidState {
            field: "date_paid",
            message: format!("payment date {date_paid} precedes issue date {date_issued}"),
        }),
        _ => Ok(()),
    }
}

/// Raw input for issuing a bill.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBillingRecord {
    pub patient_id: PatientId,
    pub appointment_id: Option<AppointmentId>,
    /// Decimal string, e.g. `"150.00"`.
    pub amount: String,
    /// `YYYY-MM-DD`.
    pub date_issued: String,
    /// `YYYY-MM-DD`; `Some` records the bill as already paid.
    pub date_paid: Option<String>,
    pub services: Vec<String>,
}

impl NewBillingRecord {
    pub fn into_billing_record(self, id: BillingRecordId) -> ValidationResult<BillingRecord> {
        let date_issued = parse_date("date_issued", &self.date_issued)?;
        let date_paid = self
            .date_paid
            .as_deref()
            .map(|value| parse_date("date_paid", value))
            .transpose()?;
        let record = BillingRecord {
            id,
            patient_id: self.patient_id,
            appointment_id: self.appointment_id,
            amount: parse_amount("amount", &self.amount)?,
            paid: date_paid.is_some(),
            date_issued,
            date_paid,
            services: normalize_list("services", &self.services)?,
        };
        check_payment(record.paid, record.date_issued, record.date_paid)?;
        Ok(record)
    }
}

/// Partial update for a bill. `None` leaves a field unchanged.
///
/// Nested options distinguish "leave" (`None`) from "clear" (`Some(None)`).
/// Setting `date_paid` to `Some(Some(..))` marks the bill paid; `Some(None)`
/// reopens it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BillingRecordChanges {
    pub patient_id: Option<PatientId>,
    pub appointment_id: Option<Option<AppointmentId>>,
    pub amount: Option<String>,
    pub date_issued: Option<String>,
    pub date_paid: Option<Option<String>>,
    pub services: Option<Vec<String>>,
}

impl BillingRecordChanges {
    pub fn apply_to(&self, current: &BillingRecord) -> ValidationResult<BillingRecord> {
        let mut next = current.clone();
        if let Some(patient_id) = self.patient_id {
            next.patient_id = patient_id;
        }
        if let Some(appointment_id) = self.appointment_id {
            next.appointment_id = appointment_id;
        }
        if let Some(amount) = &self.amount {
            next.amount = parse_amount("amount", amount)?;
        }
        if let Some(date_issued) = &self.date_issued {
            next.date_issued = parse_date("date_issued", date_issued)?;
        }
        if let Some(date_paid) = &self.date_paid {
            next.date_paid = date_paid
                .as_deref()
                .map(|value| parse_date("date_paid", value))
                .transpose()?;
            next.paid = next.date_paid.is_some();
        }
        if let Some(services) = &self.services {
            next.services = normalize_list("services", services)?;
        }
        check_payment(next.paid, next.date_issued, next.date_paid)?;
        Ok(next)
    }
}
