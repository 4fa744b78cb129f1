//! Job repository contract and SQLite implementation.
//!
//! # Invariants
//! - Unfiltered and filtered listings are ordered by ascending `id`.
//! - `update` touches only the supplied mutable fields
//!   (`title`, `salary`, `equity`); `company_handle` is fixed at creation.

use crate::model::job::{Job, JobId, JobUpdate, NewJob, ZERO_EQUITY};
use crate::repo::{classify_write_error, RepoError, RepoResult};
use crate::sql::{
    compile_filters, sql_for_partial_update, CompiledPredicate, FieldTranslationTable,
    FilterField, FilterMode, FilterRequest, ValueKind,
};
use log::info;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

const JOB_COLUMNS: &str = "id, title, salary, equity, company_handle";

/// Query-string filters accepted by job listings.
pub const JOB_FILTERS: &[FilterField] = &[
    FilterField {
        name: "title",
        column: "title",
        mode: FilterMode::Contains,
        kind: ValueKind::Text,
    },
    FilterField {
        name: "minSalary",
        column: "salary",
        mode: FilterMode::Min,
        kind: ValueKind::Integer,
    },
    FilterField {
        name: "hasEquity",
        column: "equity",
        mode: FilterMode::Presence { zero: ZERO_EQUITY },
        kind: ValueKind::Text,
    },
];

/// Logical update field names mapped to `jobs` columns.
pub const JOB_UPDATE_COLUMNS: &FieldTranslationTable =
    &[("title", "title"), ("salary", "salary"), ("equity", "equity")];

/// Repository interface for job CRUD.
pub trait JobRepository {
    fn create(&self, job: &NewJob) -> RepoResult<Job>;
    /// `None` or an empty request lists every job.
    fn find_all(&self, filters: Option<&FilterRequest>) -> RepoResult<Vec<Job>>;
    fn get(&self, id: JobId) -> RepoResult<Job>;
    fn update(&self, id: JobId, update: &JobUpdate) -> RepoResult<Job>;
    fn remove(&self, id: JobId) -> RepoResult<()>;
}

/// SQLite-backed job repository over an injected connection.
pub struct SqliteJobRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteJobRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl JobRepository for SqliteJobRepository<'_> {
    fn create(&self, job: &NewJob) -> RepoResult<Job> {
        job.validate()?;
        let equity = job.stored_equity()?;

        let created = self
            .conn
            .query_row(
                &format!(
                    "INSERT INTO jobs (title, salary, equity, company_handle)
                     VALUES (?1, ?2, ?3, ?4)
                     RETURNING {JOB_COLUMNS};"
                ),
                params![
                    job.title.as_str(),
                    job.salary,
                    equity,
                    job.company_handle.as_str(),
                ],
                job_from_row,
            )
            .map_err(classify_write_error)?;

        info!("event=job_create module=repo status=ok id={}", created.id);
        Ok(created)
    }

    fn find_all(&self, filters: Option<&FilterRequest>) -> RepoResult<Vec<Job>> {
        let predicate = match filters {
            Some(request) => compile_filters(request, JOB_FILTERS)?,
            None => CompiledPredicate::default(),
        };
        select_jobs(self.conn, &predicate)
    }

    fn get(&self, id: JobId) -> RepoResult<Job> {
        self.conn
            .query_row(
                &format!("SELECT {JOB_COLUMNS} FROM jobs WHERE id = ?1;"),
                [id],
                job_from_row,
            )
            .optional()?
            .ok_or_else(|| RepoError::not_found("job", id))
    }

    fn update(&self, id: JobId, update: &JobUpdate) -> RepoResult<Job> {
        if update.id.is_some() {
            return Err(RepoError::ImmutableField("id"));
        }
        update.validate()?;

        let assignment = sql_for_partial_update(&update.to_payload()?, JOB_UPDATE_COLUMNS)?;
        let sql = format!(
            "UPDATE jobs SET {} WHERE id = ?{} RETURNING {JOB_COLUMNS};",
            assignment.set_clause(),
            assignment.next_placeholder()
        );
        let fields = assignment.fragments().len();
        let mut bind_values = assignment.into_params();
        bind_values.push(Value::Integer(id));

        let updated = self
            .conn
            .query_row(&sql, params_from_iter(bind_values), job_from_row)
            .optional()
            .map_err(classify_write_error)?
            .ok_or_else(|| RepoError::not_found("job", id))?;

        info!("event=job_update module=repo status=ok id={id} fields={fields}");
        Ok(updated)
    }

    fn remove(&self, id: JobId) -> RepoResult<()> {
        let changed = self.conn.execute("DELETE FROM jobs WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::not_found("job", id));
        }

        info!("event=job_remove module=repo status=ok id={id}");
        Ok(())
    }
}

/// Lists jobs belonging to one company, ascending by id.
pub(crate) fn jobs_for_company(conn: &Connection, handle: &str) -> RepoResult<Vec<Job>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {JOB_COLUMNS} FROM jobs WHERE company_handle = ?1 ORDER BY id;"
    ))?;
    let jobs = stmt
        .query_map([handle], job_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(jobs)
}

/// Lists jobs `username` applied to, ascending by id.
pub(crate) fn jobs_for_user(conn: &Connection, username: &str) -> RepoResult<Vec<Job>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {JOB_COLUMNS} FROM jobs
         JOIN applications ON applications.job_id = jobs.id
         WHERE applications.username = ?1
         ORDER BY id;"
    ))?;
    let jobs = stmt
        .query_map([username], job_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(jobs)
}

fn select_jobs(conn: &Connection, predicate: &CompiledPredicate) -> RepoResult<Vec<Job>> {
    let sql = format!(
        "SELECT {JOB_COLUMNS} FROM jobs{} ORDER BY id;",
        predicate.where_clause()
    );
    let mut stmt = conn.prepare(&sql)?;
    let jobs = stmt
        .query_map(params_from_iter(predicate.params()), job_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(jobs)
}

fn job_from_row(row: &Row<'_>) -> rusqlite::Result<Job> {
    Ok(Job {
        id: row.get("id")?,
        title: row.get("title")?,
        salary: row.get("salary")?,
        equity: row.get("equity")?,
        company_handle: row.get("company_handle")?,
    })
}
