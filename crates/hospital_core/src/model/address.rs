//! Postal address shared by patients and doctors.
//!
//! # Invariants
//! - `street`, `city`, `zip_code` and `country` are trimmed and non-empty.
//! - `state` may be empty; not every country has one.

use crate::model::validation::{check_text, require_text, ValidationResult};
use serde::{Deserialize, Serialize};

pub const DEFAULT_COUNTRY: &str = "USA";

/// Nested under `address` in the persisted record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub street: String,
    pub city: String,
    #[serde(default)]
    pub state: String,
    pub zip_code: String,
    #[serde(default = "default_country")]
    pub country: String,
}

impl Address {
    /// Validates and trims raw address parts. A blank or missing country
    /// becomes `USA`.
    pub fn parse(
        street: &str,
        city: &str,
        state: &str,
        zip_code: &str,
        country: Option<&str>,
    ) -> ValidationResult<Self> {
        let country = match country.map(str::trim) {
            Some(country) if !country.is_empty() => country.to_string(),
            _ => DEFAULT_COUNTRY.to_string(),
        };
        Ok(Self {
            street: require_text("street", street)?,
            city: require_text("city", city)?,
            state: state.trim().to_string(),
            zip_code: require_text("zip_code", zip_code)?,
            country,
        })
    }

    /// Re-checks a decoded address (load path).
    pub fn validate(&self) -> ValidationResult<()> {
        check_text("street", &self.street)?;
        check_text("city", &self.city)?;
        check_text("zip_code", &self.zip_code)?;
        check_text("country", &self.country)
    }

    /// Re-parses this address, as raw input would be.
    pub fn normalized(&self) -> ValidationResult<Self> {
        Self::parse(
            &self.street,
            &self.city,
            &self.state,
            &self.zip_code,
            Some(&self.country),
        )
    }
}

fn default_country() -> String {
    DEFAULT_COUNTRY.to_string()
}

#[cfg(test)]
mod tests {
    use super::{Address, DEFAULT_COUNTRY};
    use crate::model::validation::ValidationError;

    #[test]
    fn parse_trims_and_defaults_country() {
        let address = Address::parse(" 1 Main St ", "Springfield", " IL ", "62701", None).unwrap();
        assert_eq!(address.street, "1 Main St");
        assert_eq!(address.state, "IL");
        assert_eq!(address.country, DEFAULT_COUNTRY);

        let abroad = Address::parse("Kaiserstr. 5", "Berlin", "", "10115", Some("Germany")).unwrap();
        assert_eq!(abroad.country, "Germany");
        assert!(abroad.state.is_empty());
    }

    #[test]
    fn parse_rejects_blank_required_parts() {
        assert_eq!(
            Address::parse("1 Main St", " ", "IL", "62701", None).unwrap_err(),
            ValidationError::Blank { field: "city" }
        );
        assert_eq!(
            Address::parse("1 Main St", "Springfield", "IL", "", None).unwrap_err(),
            ValidationError::Blank { field: "zip_code" }
        );
    }

    #[test]
    fn missing_country_decodes_as_default() {
        let address: Address = serde_json::from_str(
            r#"{"street":"1 Main St","city":"Springfield","zip_code":"62701"}"#,
        )
        .unwrap();
        assert_eq!(address.country, DEFAULT_COUNTRY);
        assert!(address.state.is_empty());
    }
}
