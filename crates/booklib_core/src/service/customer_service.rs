//! Customer use-case service.
//!
//! # Responsibility
//! - Provide stable entry points for core callers (CLI, embedding apps).
//! - Delegate persistence to repository implementations through a session.
//!
//! # Invariants
//! - Service APIs never bypass repository validation/persistence contracts.
//! - Service layer remains storage-agnostic.

use crate::model::customer::{Customer, CustomerId};
use crate::repo::customer_repo::{CustomerFilter, CustomerRepository, RepoError, RepoResult};
use crate::session::CustomerSession;

/// Use-case service wrapper for customer operations.
pub struct CustomerService<R: CustomerRepository> {
    session: CustomerSession<R>,
}

impl<R: CustomerRepository> CustomerService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self {
            session: CustomerSession::new(repo),
        }
    }

    /// Stores one customer and returns it with its assigned id.
    pub fn register(&mut self, customer: Customer) -> RepoResult<Customer> {
        self.session.add(customer);
        self.session
            .commit()?
            .pop()
            .ok_or_else(|| RepoError::InvalidData("commit returned no record".to_string()))
    }

    /// Stores several customers atomically.
    pub fn register_all(&mut self, customers: Vec<Customer>) -> RepoResult<Vec<Customer>> {
        self.session.add_all(customers);
        self.session.commit()
    }

    pub fn get(&self, id: CustomerId) -> RepoResult<Option<Customer>> {
        self.session.repository().get(id)
    }

    pub fn find_by_name(&self, name: &str) -> RepoResult<Option<Customer>> {
        self.find_first(&CustomerFilter::Name(name.to_string()))
    }

    pub fn find_first(&self, filter: &CustomerFilter) -> RepoResult<Option<Customer>> {
        self.session.repository().find_first(filter)
    }

    pub fn find_all(&self, filter: &CustomerFilter) -> RepoResult<Vec<Customer>> {
        self.session.repository().find_all(filter)
    }

    pub fn count(&self) -> RepoResult<u64> {
        self.session.repository().count()
    }

    /// Removes every customer and restarts id assignment.
    pub fn reset(&mut self) -> RepoResult<()> {
        self.session.rollback();
        self.session.repository_mut().drop_all()
    }
}
