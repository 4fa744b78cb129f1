//! Company repository contract and SQLite implementation.
//!
//! # Invariants
//! - Listings are ordered by `handle`.
//! - Removing a company removes its jobs (schema cascade).

use crate::model::company::{Company, CompanyDetail, CompanyUpdate, NewCompany};
use crate::repo::job_repo::jobs_for_company;
use crate::repo::{classify_write_error, RepoError, RepoResult};
use crate::sql::{
    compile_filters, sql_for_partial_update, CompiledPredicate, FieldTranslationTable,
    FilterField, FilterMode, FilterRequest, ValueKind,
};
use log::info;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

const COMPANY_COLUMNS: &str = "handle, name, description, num_employees, logo_url";

/// Query-string filters accepted by company listings.
pub const COMPANY_FILTERS: &[FilterField] = &[
    FilterField {
        name: "name",
        column: "name",
        mode: FilterMode::Contains,
        kind: ValueKind::Text,
    },
    FilterField {
        name: "minEmp",
        column: "num_employees",
        mode: FilterMode::Min,
        kind: ValueKind::Integer,
    },
    FilterField {
        name: "maxEmp",
        column: "num_employees",
        mode: FilterMode::Max,
        kind: ValueKind::Integer,
    },
];

pub const COMPANY_UPDATE_COLUMNS: &FieldTranslationTable =
    &[("numEmployees", "num_employees"), ("logoUrl", "logo_url")];

/// Repository interface for company CRUD.
pub trait CompanyRepository {
    fn create(&self, company: &NewCompany) -> RepoResult<Company>;
    fn find_all(&self, filters: Option<&FilterRequest>) -> RepoResult<Vec<Company>>;
    /// Returns the company with its jobs.
    fn get(&self, handle: &str) -> RepoResult<CompanyDetail>;
    fn update(&self, handle: &str, update: &CompanyUpdate) -> RepoResult<Company>;
    fn remove(&self, handle: &str) -> RepoResult<()>;
}

/// SQLite-backed company repository.
pub struct SqliteCompanyRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCompanyRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl CompanyRepository for SqliteCompanyRepository<'_> {
    fn create(&self, company: &NewCompany) -> RepoResult<Company> {
        company.validate()?;

        let created = self
            .conn
            .query_row(
                &format!(
                    "INSERT INTO companies (handle, name, description, num_employees, logo_url)
                     VALUES (?1, ?2, ?3, ?4, ?5)
                     RETURNING {COMPANY_COLUMNS};"
                ),
                params![
                    company.handle.as_str(),
                    company.name.as_str(),
                    company.description.as_str(),
                    company.num_employees,
                    company.logo_url.as_deref(),
                ],
                company_from_row,
            )
            .map_err(classify_write_error)?;

        info!(
            "event=company_create module=repo status=ok handle={}",
            created.handle
        );
        Ok(created)
    }

    fn find_all(&self, filters: Option<&FilterRequest>) -> RepoResult<Vec<Company>> {
        let predicate = match filters {
            Some(request) => compile_filters(request, COMPANY_FILTERS)?,
            None => CompiledPredicate::default(),
        };

        let mut stmt = self.conn.prepare(&format!(
            "SELECT {COMPANY_COLUMNS} FROM companies{} ORDER BY handle;",
            predicate.where_clause()
        ))?;
        let companies = stmt
            .query_map(params_from_iter(predicate.params()), company_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(companies)
    }

    fn get(&self, handle: &str) -> RepoResult<CompanyDetail> {
        let company = self
            .conn
            .query_row(
                &format!("SELECT {COMPANY_COLUMNS} FROM companies WHERE handle = ?1;"),
                [handle],
                company_from_row,
            )
            .optional()?
            .ok_or_else(|| RepoError::not_found("company", handle))?;

        let jobs = jobs_for_company(self.conn, handle)?;
        Ok(CompanyDetail { company, jobs })
    }

    fn update(&self, handle: &str, update: &CompanyUpdate) -> RepoResult<Company> {
        if update.handle.is_some() {
            return Err(RepoError::ImmutableField("handle"));
        }
        update.validate()?;

        let assignment = sql_for_partial_update(&update.to_payload(), COMPANY_UPDATE_COLUMNS)?;
        let sql = format!(
            "UPDATE companies SET {} WHERE handle = ?{} RETURNING {COMPANY_COLUMNS};",
            assignment.set_clause(),
            assignment.next_placeholder()
        );
        let mut bind_values = assignment.into_params();
        bind_values.push(Value::Text(handle.to_string()));

        let updated = self
            .conn
            .query_row(&sql, params_from_iter(bind_values), company_from_row)
            .optional()
            .map_err(classify_write_error)?
            .ok_or_else(|| RepoError::not_found("company", handle))?;

        info!("event=company_update module=repo status=ok handle={handle}");
        Ok(updated)
    }

    fn remove(&self, handle: &str) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM companies WHERE handle = ?1;", [handle])?;
        if changed == 0 {
            return Err(RepoError::not_found("company", handle));
        }

        info!("event=company_remove module=repo status=ok handle={handle}");
        Ok(())
    }
}

fn company_from_row(row: &Row<'_>) -> rusqlite::Result<Company> {
    Ok(Company {
        handle: row.get("handle")?,
        name: row.get("name")?,
        description: row.get("description")?,
        num_employees: row.get("num_employees")?,
        logo_url: row.get("logo_url")?,
    })
}
