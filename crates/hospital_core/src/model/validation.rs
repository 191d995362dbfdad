//! Field-level validation shared by all entity types.
//!
//! # Responsibility
//! - Turn raw user text into typed, normalized field values.
//! - Report failures as `ValidationError` naming the offending field.
//!
//! # Invariants
//! - Dates are ISO-8601 calendar dates (`YYYY-MM-DD`).
//! - Times are 24h `HH:MM`.
//! - Amounts are exact decimals and never negative.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M";
const MIN_PHONE_DIGITS: usize = 7;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("valid email regex")
});
static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[0-9(][0-9\s().-]*[0-9]$").expect("valid phone regex"));

/// Validation failure for one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Required text is empty after trim.
    Blank { field: &'static str },
    /// Not a valid `YYYY-MM-DD` calendar date.
    InvalidDate { field: &'static str, value: String },
    /// Not a valid `HH:MM` time.
    InvalidTime { field: &'static str, value: String },
    InvalidEmail { field: &'static str, value: String },
    InvalidPhone { field: &'static str, value: String },
    /// Not parseable as a decimal number.
    InvalidAmount { field: &'static str, value: String },
    NegativeAmount { field: &'static str, value: Decimal },
    /// Value outside a closed set of accepted values.
    UnsupportedValue {
        field: &'static str,
        value: String,
        expected: &'static str,
    },
    /// Fields are individually valid but inconsistent with each other or
    /// with the entity's current state.
    InvalidState { field: &'static str, message: String },
}

impl ValidationError {
    /// Name of the field that failed validation.
    pub fn field(&self) -> &'static str {
        match self {
            Self::Blank { field }
            | Self::InvalidDate { field, .. }
            | Self::InvalidTime { field, .. }
            | Self::InvalidEmail { field, .. }
            | Self::InvalidPhone { field, .. }
            | Self::InvalidAmount { field, .. }
            | Self::NegativeAmount { field, .. }
            | Self::UnsupportedValue { field, .. }
            | Self::InvalidState { field, .. } => field,
        }
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Blank { field } => write!(f, "{field} must not be blank"),
            Self::InvalidDate { field, value } => {
                write!(f, "{field} `{value}` is not a valid date (YYYY-MM-DD)")
            }
            Self::InvalidTime { field, value } => {
                write!(f, "{field} `{value}` is not a valid time (HH:MM)")
            }
            Self::InvalidEmail { field, value } => {
                write!(f, "{field} `{value}` is not a valid email address")
            }
            Self::InvalidPhone { field, value } => write!(
                f,
                "{field} `{value}` is not a valid phone number (at least {MIN_PHONE_DIGITS} digits)"
            ),
            Self::InvalidAmount { field, value } => {
                write!(f, "{field} `{value}` is not a valid decimal amount")
            }
            Self::NegativeAmount { field, value } => {
                write!(f, "{field} must not be negative, got {value}")
            }
            Self::UnsupportedValue {
                field,
                value,
                expected,
            } => write!(f, "{field} `{value}` is not supported; expected {expected}"),
            Self::InvalidState { field, message } => write!(f, "{field}: {message}"),
        }
    }
}

impl Error for ValidationError {}

pub type ValidationResult<T> = Result<T, ValidationError>;

/// Returns trimmed text, rejecting blank input.
pub fn require_text(field: &'static str, value: &str) -> ValidationResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Blank { field });
    }
    Ok(trimmed.to_string())
}

/// Checks already-stored text is not blank.
pub fn check_text(field: &'static str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::Blank { field });
    }
    Ok(())
}

pub fn parse_date(field: &'static str, value: &str) -> ValidationResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| {
        ValidationError::InvalidDate {
            field,
            value: value.to_string(),
        }
    })
}

pub fn parse_time(field: &'static str, value: &str) -> ValidationResult<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), TIME_FORMAT).map_err(|_| {
        ValidationError::InvalidTime {
            field,
            value: value.to_string(),
        }
    })
}

/// Combines a `YYYY-MM-DD` date and `HH:MM` time.
pub fn parse_date_time(date: &str, time: &str) -> ValidationResult<NaiveDateTime> {
    let date = parse_date("date", date)?;
    let time = parse_time("time", time)?;
    Ok(date.and_time(time))
}

/// Returns the trimmed address when it matches the accepted pattern.
pub fn validate_email(field: &'static str, value: &str) -> ValidationResult<String> {
    let trimmed = value.trim();
    if !EMAIL_RE.is_match(trimmed) {
        return Err(ValidationError::InvalidEmail {
            field,
            value: value.to_string(),
        });
    }
    Ok(trimmed.to_string())
}

/// Accepts an optional leading `+` and digits separated by spaces, dashes,
/// dots or parentheses, with at least seven digits overall.
pub fn validate_phone(field: &'static str, value: &str) -> ValidationResult<String> {
    let trimmed = value.trim();
    let digits = trimmed.chars().filter(char::is_ascii_digit).count();
    if !PHONE_RE.is_match(trimmed) || digits < MIN_PHONE_DIGITS {
        return Err(ValidationError::InvalidPhone {
            field,
            value: value.to_string(),
        });
    }
    Ok(trimmed.to_string())
}

pub fn parse_amount(field: &'static str, value: &str) -> ValidationResult<Decimal> {
    let amount = Decimal::from_str(value.trim()).map_err(|_| ValidationError::InvalidAmount {
        field,
        value: value.to_string(),
    })?;
    check_amount(field, amount)?;
    Ok(amount)
}

pub fn check_amount(field: &'static str, amount: Decimal) -> ValidationResult<()> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(ValidationError::NegativeAmount {
            field,
            value: amount,
        });
    }
    Ok(())
}

/// Trims every entry and rejects blank entries. Empty lists are allowed.
pub fn normalize_list(field: &'static str, values: &[String]) -> ValidationResult<Vec<String>> {
    values
        .iter()
        .map(|value| require_text(field, value))
        .collect()
}
