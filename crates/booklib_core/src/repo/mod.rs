//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Isolate SQLite query details from session/service orchestration.
//!
//! # Invariants
//! - Repository writes must enforce `Customer::validate()` before persistence.
//! - Repository APIs return semantic errors (`DuplicateName`) in addition to
//!   DB transport errors.

pub mod customer_repo;
