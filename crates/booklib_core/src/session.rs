//! Unit-of-work session over a customer repository.
//!
//! # Responsibility
//! - Buffer transient customers until an explicit commit.
//! - Apply the whole buffer atomically through the repository.
//!
//! # Invariants
//! - `add` never touches storage; constraint violations surface at `commit`.
//! - A failed commit leaves storage unchanged and clears the buffer.
//! - Records returned by `commit` carry their store-assigned ids in
//!   queue order.

use crate::model::customer::Customer;
use crate::repo::customer_repo::{CustomerRepository, RepoResult};
use log::{debug, info, warn};
use std::time::Instant;

/// Pending-write buffer bound to one repository.
pub struct CustomerSession<R: CustomerRepository> {
    repo: R,
    pending: Vec<Customer>,
}

impl<R: CustomerRepository> CustomerSession<R> {
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            pending: Vec::new(),
        }
    }

    /// Queues one customer for the next commit.
    pub fn add(&mut self, customer: Customer) {
        self.pending.push(customer);
        debug!(
            "event=session_add module=session status=ok pending={}",
            self.pending.len()
        );
    }

    /// Queues several customers for the next commit.
    pub fn add_all(&mut self, customers: impl IntoIterator<Item = Customer>) {
        self.pending.extend(customers);
        debug!(
            "event=session_add module=session status=ok pending={}",
            self.pending.len()
        );
    }

    /// Number of customers waiting for commit.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Writes every pending customer in one transaction.
    ///
    /// # Errors
    /// - `RepoError::DuplicateName` when a queued name already exists in the
    ///   store or appears twice in the buffer.
    /// - Validation and DB errors from the repository, unchanged.
    pub fn commit(&mut self) -> RepoResult<Vec<Customer>> {
        let started_at = Instant::now();
        let pending = std::mem::take(&mut self.pending);
        if pending.is_empty() {
            return Ok(Vec::new());
        }

        match self.repo.insert_batch(&pending) {
            Ok(stored) => {
                info!(
                    "event=session_commit module=session status=ok records={} duration_ms={}",
                    stored.len(),
                    started_at.elapsed().as_millis()
                );
                Ok(stored)
            }
            Err(err) => {
                warn!(
                    "event=session_commit module=session status=error records={} duration_ms={} error_code={}",
                    pending.len(),
                    started_at.elapsed().as_millis(),
                    err.code()
                );
                Err(err)
            }
        }
    }

    /// Discards every pending customer without touching storage.
    pub fn rollback(&mut self) {
        let discarded = self.pending.len();
        self.pending.clear();
        debug!("event=session_rollback module=session status=ok discarded={discarded}");
    }

    /// Read access to the underlying repository.
    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Write access to the underlying repository, e.g. for `drop_all`.
    pub fn repository_mut(&mut self) -> &mut R {
        &mut self.repo
    }

    /// Consumes the session, dropping any uncommitted customers.
    pub fn into_repository(self) -> R {
        self.repo
    }
}
