//! Data file read/write.
//!
//! # Responsibility
//! - Decode a snapshot from disk and check its schema version.
//! - Replace the data file via temp file + rename.
//!
//! # Invariants
//! - The temp file lives in the target's directory so the rename never
//!   crosses filesystems.
//! - Log events carry counts and durations only, never record contents.

use super::{HospitalSnapshot, PersistError, PersistResult, SCHEMA_VERSION};
use log::{error, info};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tempfile::NamedTempFile;

/// Reads and decodes the data file at `path`.
///
/// # Side effects
/// - Emits `snapshot_load` logging events with duration and status.
///
/// # Errors
/// - `Io` when the file cannot be opened.
/// - `Json` when the content is malformed or does not match the schema.
/// - `UnsupportedSchemaVersion` when the file is newer than this build.
pub fn load_snapshot(path: impl AsRef<Path>) -> PersistResult<HospitalSnapshot> {
    let path = path.as_ref();
    let started_at = Instant::now();
    info!("event=snapshot_load module=persist status=start");

    match read_snapshot(path) {
        Ok(snapshot) => {
            info!(
                "event=snapshot_load module=persist status=ok duration_ms={} patients={} doctors={} appointments={} billing_records={} medical_records={}",
                started_at.elapsed().as_millis(),
                snapshot.patients.len(),
                snapshot.doctors.len(),
                snapshot.appointments.len(),
                snapshot.billing_records.len(),
                snapshot.medical_records.len()
            );
            Ok(snapshot)
        }
        Err(err) => {
            error!(
                "event=snapshot_load module=persist status=error duration_ms={} error_code={} error={}",
                started_at.elapsed().as_millis(),
                error_code(&err),
                err
            );
            Err(err)
        }
    }
}

/// Serializes `snapshot` and atomically replaces the file at `path`.
///
/// # Side effects
/// - Creates and removes a temp file next to `path`.
/// - Emits `snapshot_save` logging events with duration and status.
pub fn save_snapshot(path: impl AsRef<Path>, snapshot: &HospitalSnapshot) -> PersistResult<()> {
    let path = path.as_ref();
    let started_at = Instant::now();
    info!("event=snapshot_save module=persist status=start");

    match write_snapshot(path, snapshot) {
        Ok(()) => {
            info!(
                "event=snapshot_save module=persist status=ok duration_ms={}",
                started_at.elapsed().as_millis()
            );
            Ok(())
        }
        Err(err) => {
            error!(
                "event=snapshot_save module=persist status=error duration_ms={} error_code={} error={}",
                started_at.elapsed().as_millis(),
                error_code(&err),
                err
            );
            Err(err)
        }
    }
}

fn read_snapshot(path: &Path) -> PersistResult<HospitalSnapshot> {
    let file = File::open(path).map_err(|source| io_error(path, source))?;
    let snapshot: HospitalSnapshot = serde_json::from_reader(BufReader::new(file))?;
    if snapshot.schema_version > SCHEMA_VERSION {
        return Err(PersistError::UnsupportedSchemaVersion {
            file_version: snapshot.schema_version,
            latest_supported: SCHEMA_VERSION,
        });
    }
    Ok(snapshot)
}

fn write_snapshot(path: &Path, snapshot: &HospitalSnapshot) -> PersistResult<()> {
    let dir = parent_dir(path);
    let temp = NamedTempFile::new_in(&dir).map_err(|source| io_error(&dir, source))?;

    {
        let mut writer = BufWriter::new(temp.as_file());
        serde_json::to_writer_pretty(&mut writer, snapshot)?;
        writer
            .write_all(b"\n")
            .and_then(|()| writer.flush())
            .map_err(|source| io_error(temp.path(), source))?;
    }
    temp.as_file()
        .sync_all()
        .map_err(|source| io_error(temp.path(), source))?;

    temp.persist(path)
        .map_err(|err| io_error(path, err.error))?;
    Ok(())
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn io_error(path: &Path, source: std::io::Error) -> PersistError {
    PersistError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn error_code(err: &PersistError) -> &'static str {
    match err {
        PersistError::Io { .. } => "io_failed",
        PersistError::Json(_) => "malformed_json",
        PersistError::UnsupportedSchemaVersion { .. } => "unsupported_schema_version",
        PersistError::InvalidData(_) => "invalid_data",
    }
}
