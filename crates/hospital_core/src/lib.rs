//! Core domain logic for hospital records.
//! This crate is the single source of truth for record invariants.

pub mod logging;
pub mod model;
pub mod persist;
pub mod service;
pub mod store;

pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::address::{Address, DEFAULT_COUNTRY};
pub use model::appointment::{
    Appointment, AppointmentChanges, AppointmentStatus, NewAppointment,
};
pub use model::billing::{BillingRecord, BillingRecordChanges, NewBillingRecord};
pub use model::doctor::{Doctor, DoctorChanges, NewDoctor};
pub use model::id::{
    AppointmentId, BillingRecordId, DoctorId, EntityId, EntityKind, IdParseError,
    MedicalRecordId, PatientId,
};
pub use model::medical_record::{MedicalRecord, MedicalRecordChanges, NewMedicalRecord};
pub use model::patient::{BloodType, ContactInfo, Gender, NewPatient, Patient, PatientChanges};
pub use model::schedule::{day_name, RawSchedule, WeeklySchedule};
pub use model::validation::ValidationError;
pub use persist::{HospitalSnapshot, PersistError, SCHEMA_VERSION};
pub use service::appointment_service::AppointmentService;
pub use service::billing_service::BillingService;
pub use service::summary_service::{PatientSummary, SummaryService};
pub use store::{
    AppointmentQuery, BillingQuery, DeleteReport, EntityCounts, HospitalStore, Listing,
    StoreError, StoreResult,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
