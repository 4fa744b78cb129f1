//! Job use-case service.

use crate::access::{Caller, Operation, Resource};
use crate::model::job::{Job, JobId, JobUpdate, NewJob};
use crate::repo::job_repo::JobRepository;
use crate::service::{gate, ServiceResult};
use crate::sql::FilterRequest;

/// Access-gated wrapper over a `JobRepository`.
pub struct JobService<R: JobRepository> {
    repo: R,
}

impl<R: JobRepository> JobService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Admin only.
    pub fn create(&self, caller: &Caller, job: &NewJob) -> ServiceResult<Job> {
        gate(Operation::Create, Resource::Job, None, caller)?;
        Ok(self.repo.create(job)?)
    }

    /// Public. Unknown filter names are ignored.
    pub fn find_all(
        &self,
        caller: &Caller,
        filters: Option<&FilterRequest>,
    ) -> ServiceResult<Vec<Job>> {
        gate(Operation::List, Resource::Job, None, caller)?;
        Ok(self.repo.find_all(filters)?)
    }

    pub fn get(&self, caller: &Caller, id: JobId) -> ServiceResult<Job> {
        gate(Operation::Get, Resource::Job, None, caller)?;
        Ok(self.repo.get(id)?)
    }

    pub fn update(&self, caller: &Caller, id: JobId, update: &JobUpdate) -> ServiceResult<Job> {
        gate(Operation::Update, Resource::Job, None, caller)?;
        Ok(self.repo.update(id, update)?)
    }

    pub fn remove(&self, caller: &Caller, id: JobId) -> ServiceResult<()> {
        gate(Operation::Remove, Resource::Job, None, caller)?;
        Ok(self.repo.remove(id)?)
    }
}
