//! In-memory domain store.
//!
//! # Responsibility
//! - Own every entity collection for one session.
//! - Enforce referential integrity on add, update, delete and load.
//! - Bridge in-memory state to the JSON data file.
//!
//! # Invariants
//! - Every foreign id held by a stored entity resolves to a stored entity.
//! - Ids are never reused within one store, even after deletion.
//! - A failed operation leaves the store exactly as it was.
//!
//! # See also
//! - `persist` for the document schema.

use crate::model::appointment::Appointment;
use crate::model::billing::BillingRecord;
use crate::model::doctor::Doctor;
use crate::model::id::{
    AppointmentId, BillingRecordId, DoctorId, EntityId, EntityKind, MedicalRecordId, PatientId,
};
use crate::model::medical_record::MedicalRecord;
use crate::model::patient::Patient;
use crate::model::validation::ValidationError;
use crate::persist::{load_snapshot, save_snapshot, PersistError};
use log::{info, warn};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

mod delete;
mod ids;
mod integrity;
mod listing;
mod mutate;

pub use delete::DeleteReport;
pub use listing::{AppointmentQuery, BillingQuery, Listing};

use ids::IdAllocator;

pub type StoreResult<T> = Result<T, StoreError>;

/// Error kinds reported by store operations.
#[derive(Debug)]
pub enum StoreError {
    /// A field value is malformed or inconsistent.
    Validation(ValidationError),
    /// A foreign id does not resolve to a live entity.
    Reference { field: &'static str, id: EntityId },
    /// Lookup by id failed.
    NotFound(EntityId),
    /// Delete blocked by entities that still reference the target.
    Integrity {
        id: EntityId,
        dependents: Vec<EntityId>,
    },
    /// Data file could not be read, written or trusted.
    Persistence(PersistError),
    /// Every sequence number for this kind has already been issued.
    IdsExhausted(EntityKind),
}

impl StoreError {
    /// Stable machine-readable code for logs and exit mapping.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_failed",
            Self::Reference { .. } => "dangling_reference",
            Self::NotFound(_) => "not_found",
            Self::Integrity { .. } => "integrity_violation",
            Self::Persistence(_) => "persistence_failed",
            Self::IdsExhausted(_) => "ids_exhausted",
        }
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Reference { field, id } => {
                write!(f, "{field} refers to unknown {}: {id}", id.kind())
            }
            Self::NotFound(id) => write!(f, "{} not found: {id}", id.kind()),
            Self::Integrity { id, dependents } => {
                let listed = dependents
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(
                    f,
                    "{} {id} is still referenced by {listed}; delete with cascade to remove them",
                    id.kind()
                )
            }
            Self::Persistence(err) => write!(f, "{err}"),
            Self::IdsExhausted(kind) => write!(f, "no {kind} ids left to allocate"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Persistence(err) => Some(err),
            Self::Reference { .. }
            | Self::NotFound(_)
            | Self::Integrity { .. }
            | Self::IdsExhausted(_) => None,
        }
    }
}

impl From<ValidationError> for StoreError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<PersistError> for StoreError {
    fn from(value: PersistError) -> Self {
        Self::Persistence(value)
    }
}

/// Entity collections keyed by id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Tables {
    pub(crate) patients: BTreeMap<PatientId, Patient>,
    pub(crate) doctors: BTreeMap<DoctorId, Doctor>,
    pub(crate) appointments: BTreeMap<AppointmentId, Appointment>,
    pub(crate) billing_records: BTreeMap<BillingRecordId, BillingRecord>,
    pub(crate) medical_records: BTreeMap<MedicalRecordId, MedicalRecord>,
}

/// Number of entities per type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EntityCounts {
    pub patients: usize,
    pub doctors: usize,
    pub appointments: usize,
    pub billing_records: usize,
    pub medical_records: usize,
}

impl EntityCounts {
    pub fn total(&self) -> usize {
        self.patients + self.doctors + self.appointments + self.billing_records + self.medical_records
    }
}

/// Session-owned hospital record store.
///
/// Holds no global state, so independent stores can coexist.
#[derive(Debug, Clone, Default)]
pub struct HospitalStore {
    tables: Tables,
    ids: IdAllocator,
}

impl HospitalStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads `path` when it exists, otherwise returns an empty store.
    ///
    /// # Errors
    /// - `Persistence` when the file exists but cannot be loaded.
    pub fn open_or_create(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        let mut store = Self::new();
        if path.exists() {
            store.load_from_file(path)?;
        } else {
            info!("event=store_open module=store status=ok mode=empty");
        }
        Ok(store)
    }

    pub fn counts(&self) -> EntityCounts {
        EntityCounts {
            patients: self.tables.patients.len(),
            doctors: self.tables.doctors.len(),
            appointments: self.tables.appointments.len(),
            billing_records: self.tables.billing_records.len(),
            medical_records: self.tables.medical_records.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.counts().total() == 0
    }

    pub fn get_patient(&self, id: &PatientId) -> StoreResult<&Patient> {
        self.tables
            .patients
            .get(id)
            .ok_or(StoreError::NotFound(*id))
    }

    pub fn get_doctor(&self, id: &DoctorId) -> StoreResult<&Doctor> {
        self.tables.doctors.get(id).ok_or(StoreError::NotFound(*id))
    }

    pub fn get_appointment(&self, id: &AppointmentId) -> StoreResult<&Appointment> {
        self.tables
            .appointments
            .get(id)
            .ok_or(StoreError::NotFound(*id))
    }

    pub fn get_billing_record(&self, id: &BillingRecordId) -> StoreResult<&BillingRecord> {
        self.tables
            .billing_records
            .get(id)
            .ok_or(StoreError::NotFound(*id))
    }

    pub fn get_medical_record(&self, id: &MedicalRecordId) -> StoreResult<&MedicalRecord> {
        self.tables
            .medical_records
            .get(id)
            .ok_or(StoreError::NotFound(*id))
    }

    /// Writes the full state to `path`, replacing the file atomically.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> StoreResult<()> {
        save_snapshot(path, &self.tables.to_snapshot())?;
        Ok(())
    }

    /// Replaces in-memory state with the contents of `path`.
    ///
    /// The whole document is decoded and checked (field validation, duplicate
    /// ids, references, medical history) before anything is replaced.
    ///
    /// # Errors
    /// - `Persistence` on I/O failure, malformed JSON, schema mismatch or any
    ///   integrity violation inside the file. Current state is kept.
    pub fn load_from_file(&mut self, path: impl AsRef<Path>) -> StoreResult<()> {
        let snapshot = load_snapshot(path)?;
        let tables = match Tables::from_snapshot(snapshot) {
            Ok(tables) => tables,
            Err(err) => {
                warn!(
                    "event=store_load module=store status=error error_code=invalid_data error={}",
                    err
                );
                return Err(err.into());
            }
        };
        self.ids.resume_after(&tables);
        self.tables = tables;
        let counts = self.counts();
        info!(
            "event=store_load module=store status=ok total={}",
            counts.total()
        );
        Ok(())
    }
}

fn log_outcome<T>(op: &'static str, kind: EntityKind, result: &StoreResult<T>, id: Option<&EntityId>) {
    let id = id.map_or_else(|| "-".to_string(), ToString::to_string);
    match result {
        Ok(_) => info!(
            "event=entity_{op} module=store status=ok kind={} id={id}",
            kind.prefix()
        ),
        Err(err) => warn!(
            "event=entity_{op} module=store status=error kind={} id={id} error_code={}",
            kind.prefix(),
            err.code()
        ),
    }
}
