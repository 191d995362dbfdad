//! Doctor model.
//!
//! The weekly schedule is published availability only; booking outside it
//! is allowed.

use crate::model::address::Address;
use crate::model::id::DoctorId;
use crate::model::patient::{ContactInfo, Gender};
use crate::model::schedule::{RawSchedule, WeeklySchedule};
use crate::model::validation::{
    check_text, parse_date, require_text, validate_email, validate_phone, ValidationResult,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Doctor {
    pub id: DoctorId,
    pub name: String,
    pub specialization: String,
    pub license_number: String,
    #[serde(flatten)]
    pub contact: ContactInfo,
    #[serde(default)]
    pub address: Option<Address>,
    #[serde(default)]
    pub gender: Option<Gender>,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub schedule: WeeklySchedule,
}

impl Doctor {
    pub fn validate(&self) -> ValidationResult<()> {
        check_text("name", &self.name)?;
        check_text("specialization", &self.specialization)?;
        check_text("license_number", &self.license_number)?;
        self.contact.validate()?;
        if let Some(address) = &self.address {
            address.validate()?;
        }
        Ok(())
    }
}

/// Raw input for registering a doctor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewDoctor {
    pub name: String,
    pub specialization: String,
    pub license_number: String,
    pub phone: String,
    pub email: String,
    pub address: Option<Address>,
    pub gender: Option<String>,
    /// `YYYY-MM-DD`.
    pub date_of_birth: Option<String>,
    pub schedule: RawSchedule,
}

impl NewDoctor {
    pub fn into_doctor(self, id: DoctorId) -> ValidationResult<Doctor> {
        Ok(Doctor {
            id,
            name: require_text("name", &self.name)?,
            specialization: require_text("specialization", &self.specialization)?,
            license_number: require_text("license_number", &self.license_number)?,
            contact: ContactInfo::parse(&self.phone, &self.email)?,
            address: self.address.as_ref().map(Address::normalized).transpose()?,
            gender: self.gender.as_deref().map(Gender::parse).transpose()?,
            date_of_birth: self
                .date_of_birth
                .as_deref()
                .map(|dob| parse_date("date_of_birth", dob))
                .transpose()?,
            schedule: WeeklySchedule::parse(&self.schedule)?,
        })
    }
}

/// Partial update for a doctor. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DoctorChanges {
    pub name: Option<String>,
    pub specialization: Option<String>,
    pub license_number: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    /// `Some(None)` removes the address.
    pub address: Option<Option<Address>>,
    pub gender: Option<String>,
    pub date_of_birth: Option<String>,
    /// Replaces the whole weekly schedule.
    pub schedule: Option<RawSchedule>,
}

impl DoctorChanges {
    pub fn apply_to(&self, current: &Doctor) -> ValidationResult<Doctor> {
        let mut next = current.clone();
        if let Some(name) = &self.name {
            next.name = require_text("name", name)?;
        }
        if let Some(specialization) = &self.specialization {
            next.specialization = require_text("specialization", specialization)?;
        }
        if let Some(license_number) = &self.license_number {
            next.license_number = require_text("license_number", license_number)?;
        }
        if let Some(phone) = &self.phone {
            next.contact.phone = validate_phone("phone", phone)?;
        }
        if let Some(email) = &self.email {
            next.contact.email = validate_email("email", email)?;
        }
        if let Some(address) = &self.address {
            next.address = address.as_ref().map(Address::normalized).transpose()?;
        }
        if let Some(gender) = &self.gender {
            next.gender = Some(Gender::parse(gender)?);
        }
        if let Some(dob) = &self.date_of_birth {
            next.date_of_birth = Some(parse_date("date_of_birth", dob)?);
        }
        if let Some(schedule) = &self.schedule {
            next.schedule = WeeklySchedule::parse(schedule)?;
        }
        Ok(next)
    }
}
