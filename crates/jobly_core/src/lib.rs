//! Core domain logic for the Jobly job board.
//! This crate owns query compilation, resource persistence and the access
//! gate; transport and token verification live in callers.

pub mod access;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod sql;

pub use access::{authorize, decide, AccessDenied, Caller, Decision, Operation, Resource};
pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::company::{Company, CompanyDetail, CompanyUpdate, NewCompany};
pub use model::job::{Job, JobId, JobUpdate, NewJob};
pub use model::user::{NewUser, User, UserDetail, UserUpdate};
pub use model::{KeyChange, Patch, ValidationError};
pub use repo::company_repo::{CompanyRepository, SqliteCompanyRepository};
pub use repo::job_repo::{JobRepository, SqliteJobRepository};
pub use repo::user_repo::{SqliteUserRepository, UserRepository};
pub use repo::{ErrorKind, RepoError, RepoResult};
pub use service::company_service::CompanyService;
pub use service::job_service::JobService;
pub use service::user_service::UserService;
pub use service::{ServiceError, ServiceResult};
pub use sql::{
    compile_filters, sql_for_partial_update, CompiledAssignment, CompiledPredicate,
    FieldTranslationTable, FilterRequest, QueryError, UpdatePayload,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
