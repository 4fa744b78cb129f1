//! User repository contract and SQLite implementation.
//!
//! # Responsibility
//! - CRUD over `users`, never returning the stored password hash.
//! - Record job applications in `applications`.
//!
//! # Invariants
//! - Listings are ordered by `username`.
//! - Removing a user removes their applications (schema cascade).

use crate::model::job::JobId;
use crate::model::user::{NewUser, User, UserDetail, UserUpdate};
use crate::repo::job_repo::jobs_for_user;
use crate::repo::{classify_write_error, RepoError, RepoResult};
use crate::sql::{sql_for_partial_update, FieldTranslationTable};
use log::info;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

const USER_COLUMNS: &str = "username, first_name, last_name, email, is_admin";

pub const USER_UPDATE_COLUMNS: &FieldTranslationTable = &[
    ("firstName", "first_name"),
    ("lastName", "last_name"),
    ("passwordHash", "password"),
];

/// Repository interface for user CRUD and applications.
pub trait UserRepository {
    fn create(&self, user: &NewUser) -> RepoResult<User>;
    fn find_all(&self) -> RepoResult<Vec<User>>;
    /// Returns the user with applied job ids.
    fn get(&self, username: &str) -> RepoResult<UserDetail>;
    fn update(&self, username: &str, update: &UserUpdate) -> RepoResult<User>;
    fn remove(&self, username: &str) -> RepoResult<()>;
    /// Records that `username` applied to `job_id`; returns the job id.
    fn apply(&self, username: &str, job_id: JobId) -> RepoResult<JobId>;
}

/// SQLite-backed user repository.
pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn exists(&self, sql: &str, key: Value) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(sql, [key], |row| row.get(0))?;
        Ok(exists == 1)
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn create(&self, user: &NewUser) -> RepoResult<User> {
        user.validate()?;

        let created = self
            .conn
            .query_row(
                &format!(
                    "INSERT INTO users (username, password, first_name, last_name, email, is_admin)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                     RETURNING {USER_COLUMNS};"
                ),
                params![
                    user.username.as_str(),
                    user.password_hash.as_str(),
                    user.first_name.as_str(),
                    user.last_name.as_str(),
                    user.email.as_str(),
                    i64::from(user.is_admin),
                ],
                user_from_row,
            )
            .map_err(classify_write_error)?;

        info!(
            "event=user_create module=repo status=ok username={} is_admin={}",
            created.username, created.is_admin
        );
        Ok(created)
    }

    fn find_all(&self) -> RepoResult<Vec<User>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY username;"))?;
        let users = stmt
            .query_map([], user_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(users)
    }

    fn get(&self, username: &str) -> RepoResult<UserDetail> {
        let user = self
            .conn
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?1;"),
                [username],
                user_from_row,
            )
            .optional()?
            .ok_or_else(|| RepoError::not_found("user", username))?;

        let jobs = jobs_for_user(self.conn, username)?;
        Ok(UserDetail { user, jobs })
    }

    fn update(&self, username: &str, update: &UserUpdate) -> RepoResult<User> {
        if update.username.is_some() {
            return Err(RepoError::ImmutableField("username"));
        }
        update.validate()?;

        let assignment = sql_for_partial_update(&update.to_payload(), USER_UPDATE_COLUMNS)?;
        let sql = format!(
            "UPDATE users SET {} WHERE username = ?{} RETURNING {USER_COLUMNS};",
            assignment.set_clause(),
            assignment.next_placeholder()
        );
        let mut bind_values = assignment.into_params();
        bind_values.push(Value::Text(username.to_string()));

        let updated = self
            .conn
            .query_row(&sql, params_from_iter(bind_values), user_from_row)
            .optional()
            .map_err(classify_write_error)?
            .ok_or_else(|| RepoError::not_found("user", username))?;

        info!("event=user_update module=repo status=ok username={username}");
        Ok(updated)
    }

    fn remove(&self, username: &str) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM users WHERE username = ?1;", [username])?;
        if changed == 0 {
            return Err(RepoError::not_found("user", username));
        }

        info!("event=user_remove module=repo status=ok username={username}");
        Ok(())
    }

    fn apply(&self, username: &str, job_id: JobId) -> RepoResult<JobId> {
        if !self.exists(
            "SELECT EXISTS(SELECT 1 FROM users WHERE username = ?1);",
            Value::Text(username.to_string()),
        )? {
            return Err(RepoError::not_found("user", username));
        }
        if !self.exists(
            "SELECT EXISTS(SELECT 1 FROM jobs WHERE id = ?1);",
            Value::Integer(job_id),
        )? {
            return Err(RepoError::not_found("job", job_id));
        }

        self.conn
            .execute(
                "INSERT INTO applications (username, job_id) VALUES (?1, ?2);",
                params![username, job_id],
            )
            .map_err(classify_write_error)?;

        info!("event=user_apply module=repo status=ok username={username} job_id={job_id}");
        Ok(job_id)
    }
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        username: row.get("username")?,
        first_name: row.get("first_name")?,
        last_name: row.get("last_name")?,
        email: row.get("email")?,
        is_admin: row.get::<_, i64>("is_admin")? != 0,
    })
}
