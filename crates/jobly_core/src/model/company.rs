//! Company records and payloads.
//!
//! # Invariants
//! - `handle` is the caller-chosen primary key and never changes.
//! - Handles are lowercase slugs (`[a-z0-9]` segments joined by `-`).

use super::job::Job;
use super::{
    require_non_negative, require_patched_text, require_text, KeyChange, Patch, ValidationError,
};
use crate::sql::UpdatePayload;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static HANDLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9]+(-[a-z0-9]+)*$").expect("valid handle regex"));

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub handle: String,
    pub name: String,
    pub description: String,
    pub num_employees: Option<i64>,
    pub logo_url: Option<String>,
}

/// Company plus its jobs, ordered by job id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompanyDetail {
    #[serde(flatten)]
    pub company: Company,
    pub jobs: Vec<Job>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewCompany {
    pub handle: String,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub num_employees: Option<i64>,
    #[serde(default)]
    pub logo_url: Option<String>,
}

impl NewCompany {
    pub fn new(
        handle: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            handle: handle.into(),
            name: name.into(),
            description: description.into(),
            num_employees: None,
            logo_url: None,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_handle(&self.handle)?;
        require_text("name", &self.name)?;
        if let Some(count) = self.num_employees {
            require_non_negative("numEmployees", count)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CompanyUpdate {
    /// Set when the caller attempted to change the handle.
    #[serde(default, deserialize_with = "super::present_key")]
    pub handle: Option<KeyChange>,
    /// `name` and `description` are not nullable.
    #[serde(default)]
    pub name: Patch<String>,
    #[serde(default)]
    pub description: Patch<String>,
    #[serde(default)]
    pub num_employees: Patch<i64>,
    #[serde(default)]
    pub logo_url: Patch<String>,
}

impl CompanyUpdate {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_patched_text("name", &self.name)?;
        if self.description == Patch::Null {
            return Err(ValidationError::NullField("description"));
        }
        if let Some(count) = self.num_employees.as_value() {
            require_non_negative("numEmployees", *count)?;
        }
        Ok(())
    }

    pub fn to_payload(&self) -> UpdatePayload {
        let mut payload = UpdatePayload::new();
        if let Some(value) = self.name.to_sql_value() {
            payload.set("name", value);
        }
        if let Some(value) = self.description.to_sql_value() {
            payload.set("description", value);
        }
        if let Some(value) = self.num_employees.to_sql_value() {
            payload.set("numEmployees", value);
        }
        if let Some(value) = self.logo_url.to_sql_value() {
            payload.set("logoUrl", value);
        }
        payload
    }
}

fn validate_handle(handle: &str) -> Result<(), ValidationError> {
    if HANDLE_RE.is_match(handle) {
        Ok(())
    } else {
        Err(ValidationError::InvalidHandle(handle.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::{CompanyUpdate, NewCompany};
    use crate::model::ValidationError;

    #[test]
    fn handle_must_be_a_lowercase_slug() {
        assert!(NewCompany::new("bauer-gallagher", "Bauer", "d").validate().is_ok());
        for handle in ["", "Bauer", "a b", "-lead", "trail-", "x--y"] {
            assert_eq!(
                NewCompany::new(handle, "n", "d").validate(),
                Err(ValidationError::InvalidHandle(handle.to_string()))
            );
        }
    }

    #[test]
    fn update_maps_logical_names_in_declaration_order() {
        let update: CompanyUpdate =
            serde_json::from_str(r#"{"logoUrl": null, "numEmployees": 7, "name": "New"}"#)
                .unwrap();
        let names: Vec<_> = update.to_payload().iter().map(|(name, _)| name.to_string()).collect();
        assert_eq!(names, vec!["name", "numEmployees", "logoUrl"]);
    }

    #[test]
    fn null_name_or_description_is_rejected() {
        let update: CompanyUpdate = serde_json::from_str(r#"{"name": null}"#).unwrap();
        assert_eq!(update.validate(), Err(ValidationError::NullField("name")));

        let update: CompanyUpdate =
            serde_json::from_str(r#"{"description": null, "numEmployees": 3}"#).unwrap();
        assert_eq!(update.validate(), Err(ValidationError::NullField("description")));

        let update: CompanyUpdate = serde_json::from_str(r#"{"description": ""}"#).unwrap();
        assert!(update.validate().is_ok());
    }

    #[test]
    fn empty_update_produces_empty_payload() {
        assert!(CompanyUpdate::default().to_payload().is_empty());
    }
}
