//! Appointment use-case service.
//!
//! # Responsibility
//! - Schedule appointments through the store.
//! - Guard status transitions (`scheduled -> completed|cancelled`).
//!
//! # Invariants
//! - Service APIs never bypass store validation or integrity checks.

use crate::model::appointment::{
    Appointment, AppointmentChanges, AppointmentStatus, NewAppointment,
};
use crate::model::id::{AppointmentId, DoctorId, PatientId};
use crate::store::{AppointmentQuery, HospitalStore, Listing, StoreResult};
use log::info;

/// Use-case wrapper for appointment scheduling and status changes.
pub struct AppointmentService<'s> {
    store: &'s mut HospitalStore,
}

impl<'s> AppointmentService<'s> {
    pub fn new(store: &'s mut HospitalStore) -> Self {
        Self { store }
    }

    /// Schedules a new appointment.
    pub fn schedule(&mut self, input: NewAppointment) -> StoreResult<AppointmentId> {
        self.store.add_appointment(input)
    }

    /// Marks a scheduled appointment as completed.
    ///
    /// # Errors
    /// - `NotFound` for an unknown id.
    /// - `Validation` (field `status`) when it is not currently scheduled.
    pub fn complete(&mut self, id: &AppointmentId) -> StoreResult<()> {
        self.transition(id, AppointmentStatus::Completed)
    }

    /// Cancels a scheduled appointment.
    pub fn cancel(&mut self, id: &AppointmentId) -> StoreResult<()> {
        self.transition(id, AppointmentStatus::Cancelled)
    }

    /// Scheduled appointments for one patient, earliest first.
    pub fn upcoming_for_patient(&self, patient_id: &PatientId) -> StoreResult<Vec<Appointment>> {
        self.store.get_patient(patient_id)?;
        Ok(upcoming(self.store.query_appointments(&AppointmentQuery {
            patient_id: Some(*patient_id),
            status: Some(AppointmentStatus::Scheduled),
            ..AppointmentQuery::default()
        })))
    }

    /// Scheduled appointments for one doctor, earliest first.
    pub fn upcoming_for_doctor(&self, doctor_id: &DoctorId) -> StoreResult<Vec<Appointment>> {
        self.store.get_doctor(doctor_id)?;
        Ok(upcoming(self.store.query_appointments(&AppointmentQuery {
            doctor_id: Some(*doctor_id),
            status: Some(AppointmentStatus::Scheduled),
            ..AppointmentQuery::default()
        })))
    }

    fn transition(&mut self, id: &AppointmentId, target: AppointmentStatus) -> StoreResult<()> {
        let mut appointment = self.store.get_appointment(id)?.clone();
        appointment.transition_to(target)?;
        self.store.update_appointment(
            id,
            &AppointmentChanges {
                status: Some(appointment.status),
                ..AppointmentChanges::default()
            },
        )?;
        info!(
            "event=appointment_transition module=service status=ok id={} to={}",
            id, target
        );
        Ok(())
    }
}

pub(crate) fn upcoming(listing: Listing<'_, Appointment>) -> Vec<Appointment> {
    let mut appointments = listing.to_vec();
    appointments.sort_by(|a, b| a.scheduled_at.cmp(&b.scheduled_at).then(a.id.cmp(&b.id)));
    appointments
}
