//! Use-case services over the domain store.

pub mod appointment_service;
pub mod billing_service;
pub mod summary_service;
