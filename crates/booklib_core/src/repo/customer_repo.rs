//! Customer repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide insert and lookup APIs over the canonical `customers` table.
//! - Keep SQL details inside the core persistence boundary.
//! - Translate store constraint failures into semantic errors.
//!
//! # Invariants
//! - Write paths call `Customer::validate()` before SQL mutations.
//! - A batch insert is atomic: either every record is stored or none is.
//! - Filter values are always bound as parameters, never spliced into SQL.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::{reset_schema, DbError};
use crate::model::customer::{
    Customer, CustomerDraft, CustomerField, CustomerId, CustomerValidationError,
};
use log::{info, warn};
use rusqlite::types::Value;
use rusqlite::{params, Connection, Row, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};

const CUSTOMERS_TABLE: &str = "customers";

const CUSTOMER_SELECT_SQL: &str = "SELECT
    id,
    name,
    city,
    age,
    pesel,
    street,
    app_no
FROM customers";

const REQUIRED_COLUMNS: &[&str] = &["id", "name", "city", "age", "pesel", "street", "app_no"];

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for customer persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(CustomerValidationError),
    Db(DbError),
    /// Another record (stored or in the same batch) already uses this name.
    DuplicateName(String),
    /// The record already carries a store-assigned id.
    AlreadyPersisted(CustomerId),
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::DuplicateName(name) => write!(f, "customer name `{name}` already exists"),
            Self::AlreadyPersisted(id) => write!(f, "customer {id} is already persisted"),
            Self::InvalidData(message) => {
                write!(f, "invalid persisted customer data: {message}")
            }
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}"
            ),
            Self::MissingRequiredTable(table) => write!(f, "required table `{table}` is missing"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "required column `{table}.{column}` is missing")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl RepoError {
    /// Stable machine-readable code for logs and CLI output.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(err) => err.code(),
            Self::Db(err) => err.code(),
            Self::DuplicateName(_) => "duplicate_name",
            Self::AlreadyPersisted(_) => "already_persisted",
            Self::InvalidData(_) => "invalid_data",
            Self::UninitializedConnection { .. } => "uninitialized_connection",
            Self::MissingRequiredTable(_) => "missing_table",
            Self::MissingRequiredColumn { .. } => "missing_column",
        }
    }
}

impl From<CustomerValidationError> for RepoError {
    fn from(value: CustomerValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Exact-match filter on a single customer field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CustomerFilter {
    Name(String),
    City(String),
    Age(i64),
    Pesel(String),
    Street(String),
    AppNo(String),
}

impl CustomerFilter {
    /// Builds a filter from a field and its textual value.
    ///
    /// Returns `None` when `raw` is not a valid value for `field`
    /// (only `age` is non-textual).
    pub fn parse(field: CustomerField, raw: &str) -> Option<Self> {
        let value = raw.to_string();
        Some(match field {
            CustomerField::Name => Self::Name(value),
            CustomerField::City => Self::City(value),
            CustomerField::Age => Self::Age(raw.trim().parse().ok()?),
            CustomerField::Pesel => Self::Pesel(value),
            CustomerField::Street => Self::Street(value),
            CustomerField::AppNo => Self::AppNo(value),
        })
    }

    pub fn field(&self) -> CustomerField {
        match self {
            Self::Name(_) => CustomerField::Name,
            Self::City(_) => CustomerField::City,
            Self::Age(_) => CustomerField::Age,
            Self::Pesel(_) => CustomerField::Pesel,
            Self::Street(_) => CustomerField::Street,
            Self::AppNo(_) => CustomerField::AppNo,
        }
    }

    fn bind_value(&self) -> Value {
        match self {
            Self::Age(age) => Value::Integer(*age),
            Self::Name(text)
            | Self::City(text)
            | Self::Pesel(text)
            | Self::Street(text)
            | Self::AppNo(text) => Value::Text(text.clone()),
        }
    }
}

/// Repository interface for customer persistence.
pub trait CustomerRepository {
    /// Stores every record in one transaction and returns them with ids.
    fn insert_batch(&mut self, customers: &[Customer]) -> RepoResult<Vec<Customer>>;
    fn get(&self, id: CustomerId) -> RepoResult<Option<Customer>>;
    /// Lowest-id record matching the filter.
    fn find_first(&self, filter: &CustomerFilter) -> RepoResult<Option<Customer>>;
    /// Every matching record ordered by id.
    fn find_all(&self, filter: &CustomerFilter) -> RepoResult<Vec<Customer>>;
    fn count(&self) -> RepoResult<u64>;
    /// Destroys every record and leaves an empty, usable store.
    fn drop_all(&mut self) -> RepoResult<()>;
}

/// SQLite-backed customer repository.
pub struct SqliteCustomerRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteCustomerRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    ///
    /// # Errors
    /// - `UninitializedConnection` when the schema version is behind.
    /// - `MissingRequiredTable` / `MissingRequiredColumn` when the schema
    ///   shape does not match.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl CustomerRepository for SqliteCustomerRepository<'_> {
    fn insert_batch(&mut self, customers: &[Customer]) -> RepoResult<Vec<Customer>> {
        for customer in customers {
            if let Some(id) = customer.id() {
                return Err(RepoError::AlreadyPersisted(id));
            }
            customer.validate()?;
        }

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let mut stored = Vec::with_capacity(customers.len());
        {
            let mut stmt = tx.prepare(
                "INSERT INTO customers (
                    name,
                    city,
                    age,
                    pesel,
                    street,
                    app_no
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            )?;

            for customer in customers {
                let id = stmt
                    .insert(params![
                        customer.name.as_str(),
                        customer.city.as_str(),
                        customer.age,
                        customer.pesel.as_str(),
                        customer.street.as_str(),
                        customer.app_no.as_str(),
                    ])
                    .map_err(|err| map_insert_error(err, customer))?;
                stored.push(customer.clone().with_assigned_id(id));
            }
        }
        tx.commit()?;

        Ok(stored)
    }

    fn get(&self, id: CustomerId) -> RepoResult<Option<Customer>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{CUSTOMER_SELECT_SQL} WHERE id = ?1;"))?;

        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_customer_row(row)?));
        }

        Ok(None)
    }

    fn find_first(&self, filter: &CustomerFilter) -> RepoResult<Option<Customer>> {
        let mut stmt = self.conn.prepare(&format!(
            "{CUSTOMER_SELECT_SQL} WHERE {} = ?1 ORDER BY id ASC LIMIT 1;",
            filter.field().column()
        ))?;

        let mut rows = stmt.query([filter.bind_value()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_customer_row(row)?));
        }

        Ok(None)
    }

    fn find_all(&self, filter: &CustomerFilter) -> RepoResult<Vec<Customer>> {
        let mut stmt = self.conn.prepare(&format!(
            "{CUSTOMER_SELECT_SQL} WHERE {} = ?1 ORDER BY id ASC;",
            filter.field().column()
        ))?;

        let mut rows = stmt.query([filter.bind_value()])?;
        let mut customers = Vec::new();
        while let Some(row) = rows.next()? {
            customers.push(parse_customer_row(row)?);
        }

        Ok(customers)
    }

    fn count(&self) -> RepoResult<u64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM customers;", [], |row| {
                row.get::<_, i64>(0)
            })?;
        u64::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative row count `{count}`")))
    }

    fn drop_all(&mut self) -> RepoResult<()> {
        reset_schema(self.conn)?;
        info!("event=customer_drop_all module=repo status=ok");
        Ok(())
    }
}

fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_user_version(conn)?;
    if actual_version < expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    let table_exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [CUSTOMERS_TABLE],
        |row| row.get(0),
    )?;
    if table_exists == 0 {
        return Err(RepoError::MissingRequiredTable(CUSTOMERS_TABLE));
    }

    let mut stmt = conn.prepare("PRAGMA table_info(customers);")?;
    let columns = stmt
        .query_map([], |row| row.get::<_, String>("name"))?
        .collect::<Result<Vec<_>, _>>()?;
    for &required in REQUIRED_COLUMNS {
        if !columns.iter().any(|column| column == required) {
            return Err(RepoError::MissingRequiredColumn {
                table: CUSTOMERS_TABLE,
                column: required,
            });
        }
    }

    Ok(())
}

fn map_insert_error(err: rusqlite::Error, customer: &Customer) -> RepoError {
    if let rusqlite::Error::SqliteFailure(code, Some(message)) = &err {
        if code.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
            && message.contains("customers.name")
        {
            warn!(
                "event=customer_insert module=repo status=error error_code=duplicate_name name_chars={}",
                customer.name.chars().count()
            );
            return RepoError::DuplicateName(customer.name.clone());
        }
    }
    err.into()
}

fn parse_customer_row(row: &Row<'_>) -> RepoResult<Customer> {
    let id: CustomerId = row.get("id")?;
    let draft = CustomerDraft {
        name: row.get("name")?,
        city: row.get("city")?,
        age: row.get("age")?,
        pesel: row.get("pesel")?,
        street: row.get("street")?,
        app_no: row.get("app_no")?,
    };

    Customer::from_stored(id, draft)
        .map_err(|err| RepoError::InvalidData(format!("customers.id={id}: {err}")))
}
