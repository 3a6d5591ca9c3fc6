//! SQLite migration registry and schema lifecycle.
//!
//! # Responsibility
//! - Register schema migrations in strictly increasing order.
//! - Apply pending migrations atomically.
//! - Drop and re-create the customer schema for store resets.
//!
//! # Invariants
//! - `version` values must remain monotonic.
//! - Applied migration version is mirrored to `PRAGMA user_version`.
//! - `drop_all` leaves `user_version = 0` so the next `create_all` rebuilds
//!   the full schema.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::{Connection, Transaction};

#[derive(Debug, Clone, Copy)]
struct Migration {
    version: u32,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    sql: include_str!("0001_customers.sql"),
}];

const DROP_SCHEMA_SQL: &str = "DROP INDEX IF EXISTS ix_customers_name;
DROP TABLE IF EXISTS customers;
PRAGMA user_version = 0;";

/// Returns the latest migration version known by this binary.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

/// Applies all pending migrations on the provided connection.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let current_version = current_user_version(conn)?;
    let latest = latest_version();

    if current_version > latest {
        return Err(DbError::SchemaTooNew {
            found: current_version,
            supported: latest,
        });
    }

    if current_version == latest {
        return Ok(());
    }

    let tx = conn.transaction()?;
    apply_pending(&tx, current_version)?;
    tx.commit()?;

    Ok(())
}

/// Ensures the customer schema exists. Idempotent.
pub fn create_all(conn: &mut Connection) -> DbResult<()> {
    apply_migrations(conn)?;
    info!(
        "event=schema_create module=db status=ok version={}",
        latest_version()
    );
    Ok(())
}

/// Drops every customer record together with the schema.
///
/// The connection is left uninitialized; call [`create_all`] before reuse.
pub fn drop_all(conn: &mut Connection) -> DbResult<()> {
    let tx = conn.transaction()?;
    tx.execute_batch(DROP_SCHEMA_SQL)?;
    tx.commit()?;
    info!("event=schema_drop module=db status=ok");
    Ok(())
}

/// Drops and re-creates the schema in one transaction.
///
/// Leaves an empty, immediately usable store whose id sequence restarts.
pub fn reset_schema(conn: &mut Connection) -> DbResult<()> {
    let tx = conn.transaction()?;
    tx.execute_batch(DROP_SCHEMA_SQL)?;
    apply_pending(&tx, 0)?;
    tx.commit()?;
    info!(
        "event=schema_reset module=db status=ok version={}",
        latest_version()
    );
    Ok(())
}

fn apply_pending(tx: &Transaction<'_>, current_version: u32) -> DbResult<()> {
    for migration in MIGRATIONS {
        if migration.version <= current_version {
            continue;
        }

        tx.execute_batch(migration.sql)?;
        tx.execute_batch(&format!("PRAGMA user_version = {};", migration.version))?;
    }
    Ok(())
}

pub(crate) fn current_user_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}
