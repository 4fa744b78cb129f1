//! Resource records and typed request payloads.
//!
//! # Responsibility
//! - Define the records returned by repositories (company, job, user).
//! - Define per-resource create/update payloads that enumerate exactly the
//!   fields a caller may set, and convert updates into `UpdatePayload`s.
//!
//! # Invariants
//! - Primary keys (`handle`, `id`, `username`) are never part of an update
//!   payload's assignments. Update structs only carry them as a `KeyChange`
//!   marker so an attempted change can be rejected.
//! - `Patch::Null` means "set NULL"; `Patch::Absent` means "leave unchanged".

use rusqlite::types::Value;
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod company;
pub mod job;
pub mod user;

/// Tri-state field for nullable columns in partial updates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Patch<T> {
    /// Field not supplied; column keeps its value.
    #[default]
    Absent,
    /// Field supplied as `null`; column is cleared.
    Null,
    Value(T),
}

impl<T> Patch<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    pub fn as_value(&self) -> Option<&T> {
        match self {
            Self::Value(value) => Some(value),
            Self::Absent | Self::Null => None,
        }
    }

    /// Store value for a supplied field, `None` when absent.
    pub(crate) fn to_sql_value(&self) -> Option<Value>
    where
        T: Clone + Into<Value>,
    {
        match self {
            Self::Absent => None,
            Self::Null => Some(Value::Null),
            Self::Value(value) => Some(value.clone().into()),
        }
    }
}

// Only reached for keys present in the input; `#[serde(default)]` covers
// missing keys with `Absent`.
impl<'de, T> Deserialize<'de> for Patch<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Option::<T>::deserialize(deserializer)? {
            Some(value) => Self::Value(value),
            None => Self::Null,
        })
    }
}

/// Marker recording that an update payload tried to set the primary key.
///
/// Deserializes from any JSON value so the attempt is rejected by the
/// repository regardless of the value's type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyChange;

impl<'de> Deserialize<'de> for KeyChange {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        IgnoredAny::deserialize(deserializer)?;
        Ok(Self)
    }
}

/// `deserialize_with` helper: a present key is a change even when `null`.
pub(crate) fn present_key<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<KeyChange>, D::Error> {
    KeyChange::deserialize(deserializer).map(Some)
}

/// Payload rule violations caught before any store call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    EmptyField(&'static str),
    /// Explicit `null` on a field whose column is NOT NULL.
    NullField(&'static str),
    NegativeNumber { field: &'static str, value: i64 },
    EquityOutOfRange(String),
    InvalidHandle(String),
    InvalidEmail(String),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyField(field) => write!(f, "`{field}` must not be empty"),
            Self::NullField(field) => write!(f, "`{field}` must not be null"),
            Self::NegativeNumber { field, value } => {
                write!(f, "`{field}` must be >= 0, got {value}")
            }
            Self::EquityOutOfRange(value) => {
                write!(f, "equity must be a decimal between 0 and 1, got `{value}`")
            }
            Self::InvalidHandle(value) => write!(
                f,
                "handle must be lowercase letters, digits and dashes, got `{value}`"
            ),
            Self::InvalidEmail(value) => write!(f, "invalid email address `{value}`"),
        }
    }
}

impl Error for ValidationError {}

pub(crate) fn require_text(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::EmptyField(field));
    }
    Ok(())
}

/// Update-side check for a required text column: `null` and blank both fail.
pub(crate) fn require_patched_text(
    field: &'static str,
    value: &Patch<String>,
) -> Result<(), ValidationError> {
    match value {
        Patch::Absent => Ok(()),
        Patch::Null => Err(ValidationError::NullField(field)),
        Patch::Value(text) => require_text(field, text),
    }
}

pub(crate) fn require_non_negative(field: &'static str, value: i64) -> Result<(), ValidationError> {
    if value < 0 {
        return Err(ValidationError::NegativeNumber { field, value });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{KeyChange, Patch};
    use rusqlite::types::Value;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Sample {
        #[serde(default)]
        salary: Patch<i64>,
        #[serde(default, deserialize_with = "super::present_key")]
        id: Option<KeyChange>,
    }

    #[test]
    fn patch_distinguishes_absent_null_and_value() {
        let absent: Sample = serde_json::from_str("{}").unwrap();
        assert_eq!(absent.salary, Patch::Absent);
        assert_eq!(absent.salary.to_sql_value(), None);

        let null: Sample = serde_json::from_str(r#"{"salary": null}"#).unwrap();
        assert_eq!(null.salary, Patch::Null);
        assert_eq!(null.salary.to_sql_value(), Some(Value::Null));

        let value: Sample = serde_json::from_str(r#"{"salary": 10}"#).unwrap();
        assert_eq!(value.salary, Patch::Value(10));
        assert_eq!(value.salary.to_sql_value(), Some(Value::Integer(10)));
    }

    #[test]
    fn key_change_accepts_any_value_type() {
        for body in [
            r#"{"id": 5}"#,
            r#"{"id": "abc"}"#,
            r#"{"id": {"x": [1]}}"#,
            r#"{"id": null}"#,
        ] {
            let sample: Sample = serde_json::from_str(body).unwrap();
            assert_eq!(sample.id, Some(KeyChange));
        }
        let sample: Sample = serde_json::from_str("{}").unwrap();
        assert_eq!(sample.id, None);
    }
}
