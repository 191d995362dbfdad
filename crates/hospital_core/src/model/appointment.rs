//! Appointment model.
//!
//! # Invariants
//! - `patient_id` and `doctor_id` resolve to live entities (enforced by the
//!   store, not by this module).
//! - Status only leaves `Scheduled`; `Completed` and `Cancelled` are final
//!   for guarded transitions.

use crate::model::id::{AppointmentId, DoctorId, PatientId};
use crate::model::validation::{
    parse_date, parse_date_time, parse_time, ValidationError, ValidationResult,
};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Scheduled,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    pub fn parse(value: &str) -> ValidationResult<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "scheduled" => Ok(Self::Scheduled),
            "completed" => Ok(Self::Completed),
            "cancelled" | "canceled" => Ok(Self::Cancelled),
            _ => Err(ValidationError::UnsupportedValue {
                field: "status",
                value: value.to_string(),
                expected: "scheduled|completed|cancelled",
            }),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl Display for AppointmentStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: AppointmentId,
    pub patient_id: PatientId,
    pub doctor_id: DoctorId,
    /// Local wall-clock time, persisted as `YYYY-MM-DDTHH:MM:SS`.
    pub scheduled_at: NaiveDateTime,
    pub reason: String,
    pub status: AppointmentStatus,
}

impl Appointment {
    /// Moves a scheduled appointment to `target`.
    pub fn transition_to(&mut self, target: AppointmentStatus) -> ValidationResult<()> {
        if self.status != AppointmentStatus::Scheduled || target == AppointmentStatus::Scheduled {
            return Err(ValidationError::InvalidState {
                field: "status",
                message: format!(
                    "cannot move appointment {} from {} to {}",
                    self.id, self.status, target
                ),
            });
        }
        self.status = target;
        Ok(())
    }
}

/// Raw input for scheduling an appointment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAppointment {
    pub patient_id: PatientId,
    pub doctor_id: DoctorId,
    /// `YYYY-MM-DD`.
    pub date: String,
    /// `HH:MM`.
    pub time: String,
    pub reason: String,
}

impl NewAppointment {
    /// Validates date/time and builds a `Scheduled` appointment under `id`.
    pub fn into_appointment(self, id: AppointmentId) -> ValidationResult<Appointment> {
        Ok(Appointment {
            id,
            patient_id: self.patient_id,
            doctor_id: self.doctor_id,
            scheduled_at: parse_date_time(&self.date, &self.time)?,
            reason: self.reason.trim().to_string(),
            status: AppointmentStatus::Scheduled,
        })
    }
}

/// Partial update for an appointment. `None` leaves a field unchanged.
///
/// `status` is written as given; guarded transitions live in
/// `AppointmentService`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppointmentChanges {
    pub patient_id: Option<PatientId>,
    pub doctor_id: Option<DoctorId>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub reason: Option<String>,
    pub status: Option<AppointmentStatus>,
}

impl AppointmentChanges {
    pub fn apply_to(&self, current: &Appointment) -> ValidationResult<Appointment> {
        let mut next = current.clone();
        if let Some(patient_id) = self.patient_id {
            next.patient_id = patient_id;
        }
        if let Some(doctor_id) = self.doctor_id {
            next.doctor_id = doctor_id;
        }
        let date = match &self.date {
            Some(date) => parse_date("date", date)?,
            None => current.scheduled_at.date(),
        };
        let time = match &self.time {
            Some(time) => parse_time("time", time)?,
            None => current.scheduled_at.time(),
        };
        next.scheduled_at = date.and_time(time);
        if let Some(reason) = &self.reason {
            next.reason = reason.trim().to_string();
        }
        if let Some(status) = self.status {
            next.status = status;
        }
        Ok(next)
    }
}
