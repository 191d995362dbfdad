//! JSON document storage for the hospital store.
//!
//! # Responsibility
//! - Define the on-disk document shape (`HospitalSnapshot`).
//! - Read and atomically replace the data file.
//!
//! # Invariants
//! - The document carries one array per entity type under stable keys.
//! - `schema_version` newer than `SCHEMA_VERSION` is rejected, never guessed.
//! - A save either fully replaces the target file or leaves it untouched.

use crate::model::appointment::Appointment;
use crate::model::billing::BillingRecord;
use crate::model::doctor::Doctor;
use crate::model::medical_record::MedicalRecord;
use crate::model::patient::Patient;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

mod file;

pub use file::{load_snapshot, save_snapshot};

/// Document schema version written by this build.
pub const SCHEMA_VERSION: u32 = 1;

pub type PersistResult<T> = Result<T, PersistError>;

#[derive(Debug)]
pub enum PersistError {
    /// Reading, writing or renaming the data file failed.
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The document is not valid JSON or does not match the schema.
    Json(serde_json::Error),
    UnsupportedSchemaVersion {
        file_version: u32,
        latest_supported: u32,
    },
    /// The document parsed but its contents violate store invariants.
    InvalidData(String),
}

impl Display for PersistError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "{}: {source}", path.display()),
            Self::Json(err) => write!(f, "malformed data file: {err}"),
            Self::UnsupportedSchemaVersion {
                file_version,
                latest_supported,
            } => write!(
                f,
                "data file schema version {file_version} is newer than supported {latest_supported}"
            ),
            Self::InvalidData(message) => write!(f, "invalid data file contents: {message}"),
        }
    }
}

impl Error for PersistError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<serde_json::Error> for PersistError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// Full persisted state, one array per entity type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HospitalSnapshot {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub patients: Vec<Patient>,
    pub doctors: Vec<Doctor>,
    pub appointments: Vec<Appointment>,
    pub billing_records: Vec<BillingRecord>,
    pub medical_records: Vec<MedicalRecord>,
}

impl Default for HospitalSnapshot {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            patients: Vec::new(),
            doctors: Vec::new(),
            appointments: Vec::new(),
            billing_records: Vec::new(),
            medical_records: Vec::new(),
        }
    }
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}
