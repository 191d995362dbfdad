//! Delete paths with optional transitive cascade.
//!
//! # Invariants
//! - Without cascade, an entity with any direct dependent is kept.
//! - With cascade, the removed set is closed under "references a removed
//!   entity", so no dangling id survives.
//! - Medical history lists never keep ids of removed records.

use super::{log_outcome, EntityCounts, HospitalStore, StoreError, StoreResult, Tables};
use crate::model::id::{
    AppointmentId, BillingRecordId, DoctorId, EntityId, EntityKind, MedicalRecordId, PatientId,
};
use std::collections::BTreeSet;

/// Entities removed by one delete call, ordered by kind then sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteReport {
    pub removed: Vec<EntityId>,
}

impl DeleteReport {
    pub fn contains(&self, id: &EntityId) -> bool {
        self.removed.contains(id)
    }

    pub fn counts(&self) -> EntityCounts {
        let mut counts = EntityCounts::default();
        for id in &self.removed {
            match id.kind() {
                EntityKind::Patient => counts.patients += 1,
                EntityKind::Doctor => counts.doctors += 1,
                EntityKind::Appointment => counts.appointments += 1,
                EntityKind::BillingRecord => counts.billing_records += 1,
                EntityKind::MedicalRecord => counts.medical_records += 1,
            }
        }
        counts
    }
}

impl HospitalStore {
    /// Deletes a patient. With `cascade`, also removes the patient's
    /// appointments, bills and medical records.
    ///
    /// # Errors
    /// - `NotFound` for an unknown id.
    /// - `Integrity` when dependents exist and `cascade` is false.
    pub fn delete_patient(&mut self, id: &PatientId, cascade: bool) -> StoreResult<DeleteReport> {
        self.delete_entity(EntityKind::Patient, id, cascade)
    }

    /// Deletes a doctor. With `cascade`, also removes the doctor's
    /// appointments (and their bills) and the records they attended.
    ///
    /// # Warning
    /// Cascading erases clinical history: every medical record the doctor
    /// attended is deleted and dropped from its patient's
    /// `medical_history`, even though the patient remains. Without
    /// `cascade`, such records block the delete.
    ///
    /// # Errors
    /// - `NotFound` for an unknown id.
    /// - `Integrity` when dependents exist and `cascade` is false.
    pub fn delete_doctor(&mut self, id: &DoctorId, cascade: bool) -> StoreResult<DeleteReport> {
        self.delete_entity(EntityKind::Doctor, id, cascade)
    }

    /// Deletes an appointment. With `cascade`, also removes bills linked to it.
    pub fn delete_appointment(
        &mut self,
        id: &AppointmentId,
        cascade: bool,
    ) -> StoreResult<DeleteReport> {
        self.delete_entity(EntityKind::Appointment, id, cascade)
    }

    /// Deletes a bill. Bills have no dependents, so `cascade` has no effect.
    pub fn delete_billing_record(
        &mut self,
        id: &BillingRecordId,
        cascade: bool,
    ) -> StoreResult<DeleteReport> {
        self.delete_entity(EntityKind::BillingRecord, id, cascade)
    }

    /// Deletes a medical record and drops it from the owner's history.
    pub fn delete_medical_record(
        &mut self,
        id: &MedicalRecordId,
        cascade: bool,
    ) -> StoreResult<DeleteReport> {
        self.delete_entity(EntityKind::MedicalRecord, id, cascade)
    }

    fn delete_entity(
        &mut self,
        kind: EntityKind,
        id: &EntityId,
        cascade: bool,
    ) -> StoreResult<DeleteReport> {
        let result = self.plan_delete(kind, id, cascade).map(|doomed| {
            self.tables.remove_all(&doomed);
            DeleteReport {
                removed: doomed.into_iter().collect(),
            }
        });
        log_outcome("delete", kind, &result, Some(id));
        result
    }

    /// Computes the set of ids to remove, without touching state.
    fn plan_delete(
        &self,
        kind: EntityKind,
        id: &EntityId,
        cascade: bool,
    ) -> StoreResult<BTreeSet<EntityId>> {
        if !id.is_kind(kind) || !self.tables.contains(id) {
            return Err(StoreError::NotFound(*id));
        }

        let direct = self.tables.direct_dependents(id);
        if !cascade && !direct.is_empty() {
            return Err(StoreError::Integrity {
                id: *id,
                dependents: direct,
            });
        }

        let mut doomed = BTreeSet::from([*id]);
        let mut pending = direct;
        while let Some(next) = pending.pop() {
            if doomed.insert(next) {
                pending.extend(self.tables.direct_dependents(&next));
            }
        }
        Ok(doomed)
    }
}

impl Tables {
    fn contains(&self, id: &EntityId) -> bool {
        match id.kind() {
            EntityKind::Patient => self.patients.contains_key(id),
            EntityKind::Doctor => self.doctors.contains_key(id),
            EntityKind::Appointment => self.appointments.contains_key(id),
            EntityKind::BillingRecord => self.billing_records.contains_key(id),
            EntityKind::MedicalRecord => self.medical_records.contains_key(id),
        }
    }

    fn remove_all(&mut self, doomed: &BTreeSet<EntityId>) {
        for id in doomed {
            match id.kind() {
                EntityKind::Patient => {
                    self.patients.remove(id);
                }
                EntityKind::Doctor => {
                    self.doctors.remove(id);
                }
                EntityKind::Appointment => {
                    self.appointments.remove(id);
                }
                EntityKind::BillingRecord => {
                    self.billing_records.remove(id);
                }
                EntityKind::MedicalRecord => {
                    if let Some(record) = self.medical_records.remove(id) {
                        if let Some(owner) = self.patients.get_mut(&record.patient_id) {
                            owner.medical_history.retain(|record_id| record_id != id);
                        }
                    }
                }
            }
        }
    }
}
