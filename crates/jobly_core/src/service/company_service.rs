//! Company use-case service.

use crate::access::{Caller, Operation, Resource};
use crate::model::company::{Company, CompanyDetail, CompanyUpdate, NewCompany};
use crate::repo::company_repo::CompanyRepository;
use crate::service::{gate, ServiceResult};
use crate::sql::FilterRequest;

/// Access-gated wrapper over a `CompanyRepository`.
///
/// Reads are public; writes require an admin caller.
pub struct CompanyService<R: CompanyRepository> {
    repo: R,
}

impl<R: CompanyRepository> CompanyService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn create(&self, caller: &Caller, company: &NewCompany) -> ServiceResult<Company> {
        gate(Operation::Create, Resource::Company, None, caller)?;
        Ok(self.repo.create(company)?)
    }

    pub fn find_all(
        &self,
        caller: &Caller,
        filters: Option<&FilterRequest>,
    ) -> ServiceResult<Vec<Company>> {
        gate(Operation::List, Resource::Company, None, caller)?;
        Ok(self.repo.find_all(filters)?)
    }

    pub fn get(&self, caller: &Caller, handle: &str) -> ServiceResult<CompanyDetail> {
        gate(Operation::Get, Resource::Company, None, caller)?;
        Ok(self.repo.get(handle)?)
    }

    pub fn update(
        &self,
        caller: &Caller,
        handle: &str,
        update: &CompanyUpdate,
    ) -> ServiceResult<Company> {
        gate(Operation::Update, Resource::Company, None, caller)?;
        Ok(self.repo.update(handle, update)?)
    }

    pub fn remove(&self, caller: &Caller, handle: &str) -> ServiceResult<()> {
        gate(Operation::Remove, Resource::Company, None, caller)?;
        Ok(self.repo.remove(handle)?)
    }
}
