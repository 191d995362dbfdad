//! Hospital domain model.
//!
//! # Responsibility
//! - Define typed entity records and their raw input/change shapes.
//! - Validate field values before anything reaches the store.
//!
//! # Invariants
//! - Every entity is identified by an `EntityId` whose prefix names its kind.
//! - Cross-entity references are checked by the store, not here.

pub mod address;
pub mod appointment;
pub mod billing;
pub mod doctor;
pub mod id;
pub mod medical_record;
pub mod patient;
pub mod schedule;
pub mod validation;
