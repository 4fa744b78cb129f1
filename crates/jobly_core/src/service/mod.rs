//! Core use-case services.
//!
//! # Responsibility
//! - Gate every operation through `access::authorize` before touching a
//!   repository.
//! - Give the (external) HTTP layer one error type with a closed `kind()`.
//!
//! # Invariants
//! - A denied call performs no repository call at all.
//! - Repository errors pass through unchanged inside `ServiceError::Repo`.

use crate::access::{authorize, AccessDenied, Caller, Operation, Resource};
use crate::repo::{ErrorKind, RepoError};
use log::warn;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod company_service;
pub mod job_service;
pub mod user_service;

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug)]
pub enum ServiceError {
    Denied(AccessDenied),
    Repo(RepoError),
}

impl ServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Denied(_) => ErrorKind::AuthorizationDenied,
            Self::Repo(err) => err.kind(),
        }
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Denied(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Denied(err) => Some(err),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<AccessDenied> for ServiceError {
    fn from(value: AccessDenied) -> Self {
        Self::Denied(value)
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Runs the access gate and logs denials.
fn gate(
    operation: Operation,
    resource: Resource,
    owner: Option<&str>,
    caller: &Caller,
) -> ServiceResult<()> {
    authorize(operation, resource, owner, caller).map_err(|denied| {
        warn!(
            "event=access_denied module=service resource={} operation={} authenticated={}",
            resource.as_str(),
            operation.as_str(),
            caller.username().is_some()
        );
        ServiceError::Denied(denied)
    })
}
