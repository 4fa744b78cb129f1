//! Repository layer: per-resource CRUD over SQLite.
//!
//! # Responsibility
//! - Define one repository contract per resource (company, job, user).
//! - Compile caller input through `crate::sql` and map rows to records.
//!
//! # Invariants
//! - Client faults (empty payload, key change, bad filters, invalid
//!   fields) are rejected before any statement runs.
//! - `get`/`update`/`remove` decide NotFound from returned or affected rows
//!   of the statement itself, not from a prior existence read.
//! - Store errors pass through as `RepoError::Db`, except constraint
//!   violations on insert or update, which are client faults.

use crate::db::DbError;
use crate::model::ValidationError;
use crate::sql::QueryError;
use rusqlite::ErrorCode;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod company_repo;
pub mod job_repo;
pub mod user_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Closed set of failure categories callers branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    BadRequest,
    NotFound,
    AuthorizationDenied,
    StoreFailure,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BadRequest => "bad_request",
            Self::NotFound => "not_found",
            Self::AuthorizationDenied => "authorization_denied",
            Self::StoreFailure => "store_failure",
        }
    }
}

#[derive(Debug)]
pub enum RepoError {
    Query(QueryError),
    Validation(ValidationError),
    /// Update payload tried to change the named primary-key field.
    ImmutableField(&'static str),
    /// Write rejected by a store constraint (duplicate key, missing parent).
    Constraint(String),
    NotFound {
        resource: &'static str,
        key: String,
    },
    Db(DbError),
}

impl RepoError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Query(_) | Self::Validation(_) | Self::ImmutableField(_) | Self::Constraint(_) => {
                ErrorKind::BadRequest
            }
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Db(_) => ErrorKind::StoreFailure,
        }
    }

    pub(crate) fn not_found(resource: &'static str, key: impl ToString) -> Self {
        Self::NotFound {
            resource,
            key: key.to_string(),
        }
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Query(err) => write!(f, "{err}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::ImmutableField(field) => write!(f, "cannot change `{field}`"),
            Self::Constraint(message) => write!(f, "rejected by store constraint: {message}"),
            Self::NotFound { resource, key } => write!(f, "no {resource}: {key}"),
            Self::Db(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Query(err) => Some(err),
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::ImmutableField(_) | Self::Constraint(_) | Self::NotFound { .. } => None,
        }
    }
}

impl From<QueryError> for RepoError {
    fn from(value: QueryError) -> Self {
        Self::Query(value)
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Maps insert/update failures: constraint violations become client faults.
pub(crate) fn classify_write_error(err: rusqlite::Error) -> RepoError {
    match &err {
        rusqlite::Error::SqliteFailure(failure, message)
            if failure.code == ErrorCode::ConstraintViolation =>
        {
            RepoError::Constraint(
                message
                    .clone()
                    .unwrap_or_else(|| failure.to_string()),
            )
        }
        _ => err.into(),
    }
}
