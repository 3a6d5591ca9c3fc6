//! Customer domain model.
//!
//! # Responsibility
//! - Define canonical data structures used by the customer store.
//!
//! # Invariants
//! - Every stored customer is identified by a store-assigned `CustomerId`.
//! - Records are only ever inserted; there is no per-record delete.

pub mod customer;
