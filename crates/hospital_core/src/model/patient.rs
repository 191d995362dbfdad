//! Patient model plus the contact and gender types shared with doctors.
//!
//! # Invariants
//! - `name` is trimmed and non-empty.
//! - `medical_history` holds ids of medical records owned by this patient;
//!   the store keeps it in sync, callers never edit it directly.

use crate::model::address::Address;
use crate::model::id::{MedicalRecordId, PatientId};
use crate::model::validation::{
    check_text, normalize_list, parse_date, require_text, validate_email, validate_phone,
    ValidationError, ValidationResult,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Phone and email pair shared by patients and doctors.
///
/// Flattened into the owning record when serialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub phone: String,
    pub email: String,
}

impl ContactInfo {
    /// Validates and normalizes raw phone/email input.
    pub fn parse(phone: &str, email: &str) -> ValidationResult<Self> {
        Ok(Self {
            phone: validate_phone("phone", phone)?,
            email: validate_email("email", email)?,
        })
    }

    pub fn validate(&self) -> ValidationResult<()> {
        validate_phone("phone", &self.phone)?;
        validate_email("email", &self.email)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
    #[serde(rename = "O")]
    Other,
}

impl Gender {
    pub fn parse(value: &str) -> ValidationResult<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "M" => Ok(Self::Male),
            "F" => Ok(Self::Female),
            "O" => Ok(Self::Other),
            _ => Err(ValidationError::UnsupportedValue {
                field: "gender",
                value: value.to_string(),
                expected: "M|F|O",
            }),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Male => "M",
            Self::Female => "F",
            Self::Other => "O",
        }
    }
}

/// ABO/Rh blood group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BloodType {
    #[serde(rename = "A+")]
    APositive,
    #[serde(rename = "A-")]
    ANegative,
    #[serde(rename = "B+")]
    BPositive,
    #[serde(rename = "B-")]
    BNegative,
    #[serde(rename = "AB+")]
    AbPositive,
    #[serde(rename = "AB-")]
    AbNegative,
    #[serde(rename = "O+")]
    OPositive,
    #[serde(rename = "O-")]
    ONegative,
}

impl BloodType {
    const ALL: [BloodType; 8] = [
        BloodType::APositive,
        BloodType::ANegative,
        BloodType::BPositive,
        BloodType::BNegative,
        BloodType::AbPositive,
        BloodType::AbNegative,
        BloodType::OPositive,
        BloodType::ONegative,
    ];

    pub fn parse(value: &str) -> ValidationResult<Self> {
        let normalized = value.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|blood_type| blood_type.as_str() == normalized)
            .ok_or_else(|| ValidationError::UnsupportedValue {
                field: "blood_type",
                value: value.to_string(),
                expected: "A+|A-|B+|B-|AB+|AB-|O+|O-",
            })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::APositive => "A+",
            Self::ANegative => "A-",
            Self::BPositive => "B+",
            Self::BNegative => "B-",
            Self::AbPositive => "AB+",
            Self::AbNegative => "AB-",
            Self::OPositive => "O+",
            Self::ONegative => "O-",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patient {
    pub id: PatientId,
    pub name: String,
    pub date_of_birth: NaiveDate,
    #[serde(flatten)]
    pub contact: ContactInfo,
    #[serde(default)]
    pub address: Option<Address>,
    pub gender: Option<Gender>,
    pub blood_type: Option<BloodType>,
    pub allergies: Vec<String>,
    pub medical_history: Vec<MedicalRecordId>,
}

impl Patient {
    /// Re-checks field invariants on an already-typed record (load path).
    pub fn validate(&self) -> ValidationResult<()> {
        check_text("name", &self.name)?;
        self.contact.validate()?;
        if let Some(address) = &self.address {
            address.validate()?;
        }
        for allergy in &self.allergies {
            check_text("allergies", allergy)?;
        }
        Ok(())
    }
}

/// Raw input for registering a patient.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewPatient {
    pub name: String,
    /// `YYYY-MM-DD`.
    pub date_of_birth: String,
    pub phone: String,
    pub email: String,
    pub address: Option<Address>,
    pub gender: Option<String>,
    pub blood_type: Option<String>,
    pub allergies: Vec<String>,
}

impl NewPatient {
    pub fn new(
        name: impl Into<String>,
        date_of_birth: impl Into<String>,
        phone: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            date_of_birth: date_of_birth.into(),
            phone: phone.into(),
            email: email.into(),
            ..Self::default()
        }
    }

    /// Validates every field and builds the record under `id`.
    pub fn into_patient(self, id: PatientId) -> ValidationResult<Patient> {
        Ok(Patient {
            id,
            name: require_text("name", &self.name)?,
            date_of_birth: parse_date("date_of_birth", &self.date_of_birth)?,
            contact: ContactInfo::parse(&self.phone, &self.email)?,
            address: self.address.as_ref().map(Address::normalized).transpose()?,
            gender: self.gender.as_deref().map(Gender::parse).transpose()?,
            blood_type: self.blood_type.as_deref().map(BloodType::parse).transpose()?,
            allergies: normalize_list("allergies", &self.allergies)?,
            medical_history: Vec::new(),
        })
    }
}

/// Partial update for a patient. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatientChanges {
    pub name: Option<String>,
    pub date_of_birth: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    /// `Some(None)` removes the address.
    pub address: Option<Option<Address>>,
    pub gender: Option<String>,
    pub blood_type: Option<String>,
    pub allergies: Option<Vec<String>>,
}

impl PatientChanges {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Returns `current` with the changed fields applied and re-validated.
    pub fn apply_to(&self, current: &Patient) -> ValidationResult<Patient> {
        let mut next = current.clone();
        if let Some(name) = &self.name {
            next.name = require_text("name", name)?;
        }
        if let Some(dob) = &self.date_of_birth {
            next.date_of_birth = parse_date("date_of_birth", dob)?;
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
        if let Some(blood_type) = &self.blood_type {
            next.blood_type = Some(BloodType::parse(blood_type)?);
        }
        if let Some(allergies) = &self.allergies {
            next.allergies = normalize_list("allergies", allergies)?;
        }
        Ok(next)
    }
}
