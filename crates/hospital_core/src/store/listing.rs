//! Filtered read views over entity collections.
//!
//! # Invariants
//! - A `Listing` never copies records; it borrows the store.
//! - Iteration order is id order (`P1, P2, ..., P10`).
//! - `iter()` can be called any number of times; each call starts over.

use super::HospitalStore;
use crate::model::appointment::{Appointment, AppointmentStatus};
use crate::model::billing::BillingRecord;
use crate::model::doctor::Doctor;
use crate::model::id::{DoctorId, EntityId, PatientId};
use crate::model::medical_record::MedicalRecord;
use crate::model::patient::Patient;
use chrono::NaiveDate;
use std::collections::BTreeMap;

type Predicate<'a, T> = Box<dyn Fn(&T) -> bool + 'a>;

/// Lazy, restartable view over one collection with an optional predicate.
pub struct Listing<'a, T> {
    items: &'a BTreeMap<EntityId, T>,
    predicate: Option<Predicate<'a, T>>,
}

impl<'a, T: 'a> Listing<'a, T> {
    fn new(items: &'a BTreeMap<EntityId, T>) -> Self {
        Self {
            items,
            predicate: None,
        }
    }

    /// Narrows the listing; successive filters are combined with AND.
    pub fn filter(self, predicate: impl Fn(&T) -> bool + 'a) -> Self {
        let combined: Predicate<'a, T> = match self.predicate {
            Some(existing) => Box::new(move |item: &T| existing(item) && predicate(item)),
            None => Box::new(predicate),
        };
        Self {
            items: self.items,
            predicate: Some(combined),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a T> + '_ {
        self.items.values().filter(move |&item| self.matches(item))
    }

    pub fn count(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.iter().cloned().collect()
    }

    fn matches(&self, item: &T) -> bool {
        self.predicate
            .as_ref()
            .map_or(true, |predicate| predicate(item))
    }
}

impl<'l, 'a: 'l, T: 'a> IntoIterator for &'l Listing<'a, T> {
    type Item = &'a T;
    type IntoIter = Box<dyn Iterator<Item = &'a T> + 'l>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}

/// Typed appointment filter. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppointmentQuery {
    pub patient_id: Option<PatientId>,
    pub doctor_id: Option<DoctorId>,
    pub status: Option<AppointmentStatus>,
    /// Inclusive lower bound on the appointment date.
    pub from: Option<NaiveDate>,
    /// Inclusive upper bound on the appointment date.
    pub to: Option<NaiveDate>,
}

impl AppointmentQuery {
    pub fn matches(&self, appointment: &Appointment) -> bool {
        let date = appointment.scheduled_at.date();
        self.patient_id.map_or(true, |id| appointment.patient_id == id)
            && self.doctor_id.map_or(true, |id| appointment.doctor_id == id)
            && self.status.map_or(true, |status| appointment.status == status)
            && self.from.map_or(true, |from| date >= from)
            && self.to.map_or(true, |to| date <= to)
    }
}

/// Typed billing filter. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BillingQuery {
    pub patient_id: Option<PatientId>,
    pub unpaid_only: bool,
}

impl BillingQuery {
    pub fn matches(&self, bill: &BillingRecord) -> bool {
        self.patient_id.map_or(true, |id| bill.patient_id == id) && !(self.unpaid_only && bill.paid)
    }
}

impl HospitalStore {
    pub fn list_patients(&self) -> Listing<'_, Patient> {
        Listing::new(&self.tables.patients)
    }

    pub fn list_doctors(&self) -> Listing<'_, Doctor> {
        Listing::new(&self.tables.doctors)
    }

    pub fn list_appointments(&self) -> Listing<'_, Appointment> {
        Listing::new(&self.tables.appointments)
    }

    pub fn list_billing_records(&self) -> Listing<'_, BillingRecord> {
        Listing::new(&self.tables.billing_records)
    }

    pub fn list_medical_records(&self) -> Listing<'_, MedicalRecord> {
        Listing::new(&self.tables.medical_records)
    }

    pub fn query_appointments(&self, query: &AppointmentQuery) -> Listing<'_, Appointment> {
        let query = query.clone();
        self.list_appointments()
            .filter(move |appointment| query.matches(appointment))
    }

    pub fn query_billing_records(&self, query: &BillingQuery) -> Listing<'_, BillingRecord> {
        let query = query.clone();
        self.list_billing_records()
            .filter(move |bill| query.matches(bill))
    }
}
