//! Core customer store for the book library.
//! This crate is the single source of truth for customer invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod session;

pub use config::{ConfigError, CoreConfig};
pub use logging::{default_log_level, init_logging, init_logging_from_config};
pub use model::customer::{
    Customer, CustomerDraft, CustomerField, CustomerId, CustomerValidationError,
};
pub use repo::customer_repo::{
    CustomerFilter, CustomerRepository, RepoError, RepoResult, SqliteCustomerRepository,
};
pub use service::customer_service::CustomerService;
pub use session::CustomerSession;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
