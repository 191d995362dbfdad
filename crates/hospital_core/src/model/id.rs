//! Entity identity.
//!
//! # Responsibility
//! - Name the five entity kinds held by the store.
//! - Encode ids as `<prefix><sequence>` strings (`P1`, `D12`, `B3`).
//!
//! # Invariants
//! - Sequence numbers start at 1; `P0` is never a valid id.
//! - The prefix alone decides the kind, so an id can never be mistaken for
//!   another entity type's id.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Entity type discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    Patient,
    Doctor,
    Appointment,
    BillingRecord,
    MedicalRecord,
}

impl EntityKind {
    /// All kinds, in persisted document order.
    pub const ALL: [EntityKind; 5] = [
        EntityKind::Patient,
        EntityKind::Doctor,
        EntityKind::Appointment,
        EntityKind::BillingRecord,
        EntityKind::MedicalRecord,
    ];

    /// One-letter id prefix.
    pub fn prefix(self) -> char {
        match self {
            Self::Patient => 'P',
            Self::Doctor => 'D',
            Self::Appointment => 'A',
            Self::BillingRecord => 'B',
            Self::MedicalRecord => 'M',
        }
    }

    /// Human-readable singular label used in messages and logs.
    pub fn label(self) -> &'static str {
        match self {
            Self::Patient => "patient",
            Self::Doctor => "doctor",
            Self::Appointment => "appointment",
            Self::BillingRecord => "billing record",
            Self::MedicalRecord => "medical record",
        }
    }

    fn from_prefix(prefix: char) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.prefix() == prefix)
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Stable identifier for every entity in the store.
///
/// Ordering is by kind, then by numeric sequence, so `P2 < P10`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EntityId {
    kind: EntityKind,
    seq: u64,
}

pub type PatientId = EntityId;
pub type DoctorId = EntityId;
pub type AppointmentId = EntityId;
pub type BillingRecordId = EntityId;
pub type MedicalRecordId = EntityId;

impl EntityId {
    /// Builds an id from parts. Returns `None` for sequence `0`.
    pub fn new(kind: EntityKind, seq: u64) -> Option<Self> {
        (seq > 0).then_some(Self { kind, seq })
    }

    /// Id following sequence `last`. `None` once the sequence space is used up.
    pub(crate) fn next_after(kind: EntityKind, last: u64) -> Option<Self> {
        last.checked_add(1).map(|seq| Self { kind, seq })
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn is_kind(&self, kind: EntityKind) -> bool {
        self.kind == kind
    }
}

impl Display for EntityId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.kind.prefix(), self.seq)
    }
}

/// Error returned when text is not a well-formed entity id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdParseError {
    pub value: String,
}

impl Display for IdParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid entity id `{}`; expected a P/D/A/B/M prefix followed by a positive number",
            self.value
        )
    }
}

impl Error for IdParseError {}

impl FromStr for EntityId {
    type Err = IdParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = || IdParseError {
            value: value.to_string(),
        };
        let trimmed = value.trim();
        let mut chars = trimmed.chars();
        let prefix = chars.next().ok_or_else(invalid)?;
        let kind = EntityKind::from_prefix(prefix.to_ascii_uppercase()).ok_or_else(invalid)?;
        let digits = chars.as_str();
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let seq = digits.parse::<u64>().map_err(|_| invalid())?;
        Self::new(kind, seq).ok_or_else(invalid)
    }
}

impl TryFrom<String> for EntityId {
    type Error = IdParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<EntityId> for String {
    fn from(value: EntityId) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::{EntityId, EntityKind};

    #[test]
    fn parses_prefixed_sequence() {
        let id: EntityId = "P12".parse().expect("P12 should parse");
        assert_eq!(id.kind(), EntityKind::Patient);
        assert_eq!(id.seq(), 12);
        assert_eq!(id.to_string(), "P12");
    }

    #[test]
    fn lowercase_prefix_is_accepted() {
        let id: EntityId = " d3 ".parse().expect("d3 should parse");
        assert_eq!(id.to_string(), "D3");
    }

    #[test]
    fn rejects_zero_unknown_prefix_and_signs() {
        for value in ["P0", "X1", "P", "", "P-1", "P+1", "P1a"] {
            assert!(value.parse::<EntityId>().is_err(), "`{value}` should fail");
        }
    }

    #[test]
    fn next_after_stops_at_the_last_sequence() {
        let next = EntityId::next_after(EntityKind::Doctor, 41).unwrap();
        assert_eq!(next.to_string(), "D42");
        assert!(EntityId::next_after(EntityKind::Doctor, u64::MAX).is_none());
    }

    #[test]
    fn ordering_is_numeric_within_kind() {
        let two: EntityId = "P2".parse().unwrap();
        let ten: EntityId = "P10".parse().unwrap();
        assert!(two < ten);
    }
}
