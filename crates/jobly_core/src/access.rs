//! Role-based access gate for resource operations.
//!
//! # Responsibility
//! - Decide whether a caller may run an operation on a resource.
//!
//! # Invariants
//! - Company and job reads are public; their writes are admin-only.
//! - User operations require an admin or the owning user. Operations with no
//!   owner (listing, creating) are therefore admin-only.
//! - The gate never touches storage; callers consult it before any
//!   repository call.
//!
//! Token verification lives outside this crate. Callers arrive here already
//! resolved into a `Caller`.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Identity of the request issuer after token verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Caller {
    Anonymous,
    Authenticated { username: String },
    Admin { username: String },
}

impl Caller {
    /// Builds a caller from verified token claims.
    pub fn from_claims(username: impl Into<String>, is_admin: bool) -> Self {
        let username = username.into();
        if is_admin {
            Self::Admin { username }
        } else {
            Self::Authenticated { username }
        }
    }

    pub fn username(&self) -> Option<&str> {
        match self {
            Self::Anonymous => None,
            Self::Authenticated { username } | Self::Admin { username } => Some(username.as_str()),
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Company,
    Job,
    User,
}

impl Resource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Company => "company",
            Self::Job => "job",
            Self::User => "user",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    List,
    Get,
    Create,
    Update,
    Remove,
    /// Job application recorded against a user.
    Apply,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Get => "get",
            Self::Create => "create",
            Self::Update => "update",
            Self::Remove => "remove",
            Self::Apply => "apply",
        }
    }

    pub fn is_read(self) -> bool {
        matches!(self, Self::List | Self::Get)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny,
}

/// Authorization failure. Distinct from "not found".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessDenied {
    pub operation: Operation,
    pub resource: Resource,
}

impl Display for AccessDenied {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unauthorized: {} on {}",
            self.operation.as_str(),
            self.resource.as_str()
        )
    }
}

impl Error for AccessDenied {}

/// Pure decision function.
///
/// `owner` is the username owning the targeted user record, `None` when the
/// operation has no single owner. Ignored for company/job resources.
pub fn decide(
    operation: Operation,
    resource: Resource,
    owner: Option<&str>,
    caller: &Caller,
) -> Decision {
    if caller.is_admin() {
        return Decision::Allow;
    }

    let allowed = match resource {
        Resource::Company | Resource::Job => operation.is_read(),
        Resource::User => matches!(
            (caller.username(), owner),
            (Some(username), Some(owner)) if username == owner
        ),
    };

    if allowed {
        Decision::Allow
    } else {
        Decision::Deny
    }
}

/// `decide` as a `Result`, for `?` at service entry points.
pub fn authorize(
    operation: Operation,
    resource: Resource,
    owner: Option<&str>,
    caller: &Caller,
) -> Result<(), AccessDenied> {
    match decide(operation, resource, owner, caller) {
        Decision::Allow => Ok(()),
        Decision::Deny => Err(AccessDenied {
            operation,
            resource,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::{authorize, decide, AccessDenied, Caller, Decision, Operation, Resource};

    const ALL_OPERATIONS: [Operation; 6] = [
        Operation::List,
        Operation::Get,
        Operation::Create,
        Operation::Update,
        Operation::Remove,
        Operation::Apply,
    ];

    fn user(name: &str) -> Caller {
        Caller::from_claims(name, false)
    }

    #[test]
    fn anonymous_reads_companies_and_jobs_only() {
        for resource in [Resource::Company, Resource::Job] {
            for operation in ALL_OPERATIONS {
                let expected = if operation.is_read() {
                    Decision::Allow
                } else {
                    Decision::Deny
                };
                assert_eq!(
                    decide(operation, resource, None, &Caller::Anonymous),
                    expected,
                    "{operation:?} on {resource:?}"
                );
            }
        }
    }

    #[test]
    fn non_admin_cannot_write_companies_or_jobs() {
        let caller = user("u1");
        for resource in [Resource::Company, Resource::Job] {
            for operation in [Operation::Create, Operation::Update, Operation::Remove] {
                assert_eq!(decide(operation, resource, None, &caller), Decision::Deny);
            }
        }
    }

    #[test]
    fn admin_is_allowed_everything() {
        let admin = Caller::from_claims("root", true);
        for resource in [Resource::Company, Resource::Job, Resource::User] {
            for operation in ALL_OPERATIONS {
                assert_eq!(
                    decide(operation, resource, Some("someone"), &admin),
                    Decision::Allow
                );
            }
        }
    }

    #[test]
    fn user_records_are_owner_only() {
        for operation in [
            Operation::Get,
            Operation::Update,
            Operation::Remove,
            Operation::Apply,
        ] {
            assert_eq!(
                decide(operation, Resource::User, Some("u1"), &user("u1")),
                Decision::Allow
            );
            assert_eq!(
                decide(operation, Resource::User, Some("u1"), &user("u2")),
                Decision::Deny
            );
            assert_eq!(
                decide(operation, Resource::User, Some("u1"), &Caller::Anonymous),
                Decision::Deny
            );
        }
    }

    #[test]
    fn ownerless_user_operations_require_admin() {
        assert_eq!(
            decide(Operation::List, Resource::User, None, &user("u1")),
            Decision::Deny
        );
        assert_eq!(
            decide(Operation::Create, Resource::User, None, &user("u1")),
            Decision::Deny
        );
    }

    #[test]
    fn authorize_reports_operation_and_resource() {
        let err = authorize(Operation::Remove, Resource::Job, None, &Caller::Anonymous)
            .unwrap_err();
        assert_eq!(
            err,
            AccessDenied {
                operation: Operation::Remove,
                resource: Resource::Job,
            }
        );
        assert_eq!(err.to_string(), "unauthorized: remove on job");
    }
}
