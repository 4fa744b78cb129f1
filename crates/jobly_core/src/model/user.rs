//! User records and payloads.
//!
//! Password hashing happens outside this crate; payloads carry the already
//! hashed value and records never expose it.

use super::job::Job;
use super::{require_patched_text, require_text, KeyChange, Patch, ValidationError};
use crate::sql::UpdatePayload;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"));

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub is_admin: bool,
}

/// User plus the jobs they applied to, ascending by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserDetail {
    #[serde(flatten)]
    pub user: User,
    pub jobs: Vec<Job>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub is_admin: bool,
}

impl NewUser {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("username", &self.username)?;
        require_text("passwordHash", &self.password_hash)?;
        require_text("firstName", &self.first_name)?;
        require_text("lastName", &self.last_name)?;
        validate_email(&self.email)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UserUpdate {
    /// Set when the caller attempted to change the username.
    #[serde(default, deserialize_with = "super::present_key")]
    pub username: Option<KeyChange>,
    /// Every mutable user column is NOT NULL; `Patch::Null` fails validation.
    #[serde(default)]
    pub first_name: Patch<String>,
    #[serde(default)]
    pub last_name: Patch<String>,
    #[serde(default)]
    pub email: Patch<String>,
    #[serde(default)]
    pub password_hash: Patch<String>,
}

impl UserUpdate {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_patched_text("firstName", &self.first_name)?;
        require_patched_text("lastName", &self.last_name)?;
        require_patched_text("email", &self.email)?;
        require_patched_text("passwordHash", &self.password_hash)?;
        if let Some(email) = self.email.as_value() {
            validate_email(email)?;
        }
        Ok(())
    }

    pub fn to_payload(&self) -> UpdatePayload {
        let fields = [
            ("firstName", &self.first_name),
            ("lastName", &self.last_name),
            ("email", &self.email),
            ("passwordHash", &self.password_hash),
        ];
        let mut payload = UpdatePayload::new();
        for (name, value) in fields {
            if let Some(value) = value.to_sql_value() {
                payload.set(name, value);
            }
        }
        payload
    }
}

fn validate_email(email: &str) -> Result<(), ValidationError> {
    if EMAIL_RE.is_match(email) {
        Ok(())
    } else {
        Err(ValidationError::InvalidEmail(email.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::{NewUser, UserUpdate};
    use crate::model::ValidationError;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            username: "u1".to_string(),
            password_hash: "hash".to_string(),
            first_name: "U1F".to_string(),
            last_name: "U1L".to_string(),
            email: email.to_string(),
            is_admin: false,
        }
    }

    #[test]
    fn email_shape_is_checked() {
        assert!(new_user("user1@user.com").validate().is_ok());
        assert_eq!(
            new_user("not-an-email").validate(),
            Err(ValidationError::InvalidEmail("not-an-email".to_string()))
        );
    }

    #[test]
    fn update_payload_uses_logical_names() {
        let update: UserUpdate =
            serde_json::from_str(r#"{"firstName": "Aliya", "passwordHash": "h"}"#).unwrap();
        let names: Vec<_> = update.to_payload().iter().map(|(name, _)| name.to_string()).collect();
        assert_eq!(names, vec!["firstName", "passwordHash"]);
    }

    #[test]
    fn null_fields_are_rejected() {
        for field in ["firstName", "lastName", "email", "passwordHash"] {
            let body = format!(r#"{{"{field}": null}}"#);
            let update: UserUpdate = serde_json::from_str(&body).unwrap();
            assert_eq!(update.validate(), Err(ValidationError::NullField(field)));
        }
    }

    #[test]
    fn is_admin_cannot_be_patched() {
        assert!(serde_json::from_str::<UserUpdate>(r#"{"isAdmin": true}"#).is_err());
    }
}
