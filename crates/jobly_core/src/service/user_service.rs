//! User use-case service.
//!
//! # Invariants
//! - Listing and creating users is admin-only.
//! - Every per-user operation is limited to that user or an admin.

use crate::access::{Caller, Operation, Resource};
use crate::model::job::JobId;
use crate::model::user::{NewUser, User, UserDetail, UserUpdate};
use crate::repo::user_repo::UserRepository;
use crate::service::{gate, ServiceResult};

/// Access-gated wrapper over a `UserRepository`.
pub struct UserService<R: UserRepository> {
    repo: R,
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn create(&self, caller: &Caller, user: &NewUser) -> ServiceResult<User> {
        gate(Operation::Create, Resource::User, None, caller)?;
        Ok(self.repo.create(user)?)
    }

    pub fn find_all(&self, caller: &Caller) -> ServiceResult<Vec<User>> {
        gate(Operation::List, Resource::User, None, caller)?;
        Ok(self.repo.find_all()?)
    }

    pub fn get(&self, caller: &Caller, username: &str) -> ServiceResult<UserDetail> {
        gate(Operation::Get, Resource::User, Some(username), caller)?;
        Ok(self.repo.get(username)?)
    }

    pub fn update(
        &self,
        caller: &Caller,
        username: &str,
        update: &UserUpdate,
    ) -> ServiceResult<User> {
        gate(Operation::Update, Resource::User, Some(username), caller)?;
        Ok(self.repo.update(username, update)?)
    }

    pub fn remove(&self, caller: &Caller, username: &str) -> ServiceResult<()> {
        gate(Operation::Remove, Resource::User, Some(username), caller)?;
        Ok(self.repo.remove(username)?)
    }

    pub fn apply(&self, caller: &Caller, username: &str, job_id: JobId) -> ServiceResult<JobId> {
        gate(Operation::Apply, Resource::User, Some(username), caller)?;
        Ok(self.repo.apply(username, job_id)?)
    }
}
