//! Job records and payloads.
//!
//! # Invariants
//! - `id` is assigned by the store and never changes.
//! - `equity` is decimal text in `[0, 1]`; any zero value is stored as the
//!   canonical `"0"` so presence filters see one zero-sentinel.

use super::{
    require_non_negative, require_patched_text, require_text, KeyChange, Patch, ValidationError,
};
use crate::sql::UpdatePayload;
use rusqlite::types::Value;
use serde::{Deserialize, Serialize};

/// Store-assigned job identifier.
pub type JobId = i64;

/// Zero-sentinel used by the `hasEquity` filter.
pub const ZERO_EQUITY: &str = "0";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: JobId,
    pub title: String,
    pub salary: Option<i64>,
    pub equity: Option<String>,
    pub company_handle: String,
}

/// Payload for creating a job. The id is assigned on insert.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewJob {
    pub title: String,
    #[serde(default)]
    pub salary: Option<i64>,
    #[serde(default)]
    pub equity: Option<String>,
    pub company_handle: String,
}

impl NewJob {
    pub fn new(title: impl Into<String>, company_handle: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            salary: None,
            equity: None,
            company_handle: company_handle.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("title", &self.title)?;
        require_text("companyHandle", &self.company_handle)?;
        if let Some(salary) = self.salary {
            require_non_negative("salary", salary)?;
        }
        if let Some(equity) = self.equity.as_deref() {
            normalize_equity(equity)?;
        }
        Ok(())
    }

    /// Equity as it will be stored.
    pub(crate) fn stored_equity(&self) -> Result<Option<String>, ValidationError> {
        self.equity.as_deref().map(normalize_equity).transpose()
    }
}

/// Partial update for a job. `company_handle` is not mutable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct JobUpdate {
    /// Set when the caller attempted to change the id.
    #[serde(default, deserialize_with = "super::present_key")]
    pub id: Option<KeyChange>,
    /// Not nullable; `Patch::Null` fails validation.
    #[serde(default)]
    pub title: Patch<String>,
    #[serde(default)]
    pub salary: Patch<i64>,
    #[serde(default)]
    pub equity: Patch<String>,
}

impl JobUpdate {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_patched_text("title", &self.title)?;
        if let Some(salary) = self.salary.as_value() {
            require_non_negative("salary", *salary)?;
        }
        if let Some(equity) = self.equity.as_value() {
            normalize_equity(equity)?;
        }
        Ok(())
    }

    /// Supplied fields in declaration order, keyed by logical name.
    pub fn to_payload(&self) -> Result<UpdatePayload, ValidationError> {
        let mut payload = UpdatePayload::new();
        if let Some(value) = self.title.to_sql_value() {
            payload.set("title", value);
        }
        if let Some(value) = self.salary.to_sql_value() {
            payload.set("salary", value);
        }
        match &self.equity {
            Patch::Absent => {}
            Patch::Null => payload.set("equity", Value::Null),
            Patch::Value(equity) => payload.set("equity", normalize_equity(equity)?),
        }
        Ok(payload)
    }
}

/// Checks an equity string and maps every zero spelling to `"0"`.
pub fn normalize_equity(raw: &str) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    let parsed: f64 = trimmed
        .parse()
        .map_err(|_| ValidationError::EquityOutOfRange(raw.to_string()))?;
    if !parsed.is_finite() || !(0.0..=1.0).contains(&parsed) {
        return Err(ValidationError::EquityOutOfRange(raw.to_string()));
    }
    if parsed == 0.0 {
        return Ok(ZERO_EQUITY.to_string());
    }
    Ok(trimmed.to_string())
}
