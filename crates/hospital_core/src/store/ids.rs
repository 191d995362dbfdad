//! Sequential id allocation per entity kind.

use super::{StoreError, StoreResult, Tables};
use crate::model::id::{EntityId, EntityKind};

/// Tracks the last issued sequence for each kind.
///
/// Sequences only grow: deletes never hand an id back, and loading a file
/// moves each counter to at least the highest id it contains.
#[derive(Debug, Clone, Default)]
pub(crate) struct IdAllocator {
    last: [u64; EntityKind::ALL.len()],
}

impl IdAllocator {
    /// Id the next successful add of `kind` will receive.
    ///
    /// Fails once the highest sequence has been issued; ids are never
    /// reused, so there is nothing left to hand out.
    pub(crate) fn peek(&self, kind: EntityKind) -> StoreResult<EntityId> {
        EntityId::next_after(kind, self.last[slot(kind)]).ok_or(StoreError::IdsExhausted(kind))
    }

    /// Marks `id` as issued.
    pub(crate) fn commit(&mut self, id: EntityId) {
        let last = &mut self.last[slot(id.kind())];
        *last = (*last).max(id.seq());
    }

    pub(crate) fn resume_after(&mut self, tables: &Tables) {
        let loaded = tables
            .patients
            .keys()
            .chain(tables.doctors.keys())
            .chain(tables.appointments.keys())
            .chain(tables.billing_records.keys())
            .chain(tables.medical_records.keys());
        for id in loaded {
            self.commit(*id);
        }
    }
}

fn slot(kind: EntityKind) -> usize {
    match kind {
        EntityKind::Patient => 0,
        EntityKind::Doctor => 1,
        EntityKind::Appointment => 2,
        EntityKind::BillingRecord => 3,
        EntityKind::MedicalRecord => 4,
    }
}
