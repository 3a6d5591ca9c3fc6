//! Command-line entry point for the customer store.
//!
//! # Responsibility
//! - Resolve configuration, start logging and open the store explicitly.
//! - Map subcommands onto `CustomerService` calls and print JSON results.

use booklib_core::db::{open_db, open_db_in_memory};
use booklib_core::config::{ENV_DB_PATH, ENV_LOG_DIR, ENV_LOG_LEVEL};
use booklib_core::{
    init_logging_from_config, CoreConfig, Customer, CustomerField, CustomerFilter,
    CustomerService, SqliteCustomerRepository,
};
use clap::{Parser, Subcommand};
use log::info;
use std::error::Error;
use std::io::Write;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "booklib", version, about = "Library customer store")]
struct Cli {
    /// SQLite database file. Without it each run uses a throwaway in-memory
    /// store, so nothing persists between commands.
    #[arg(long, env = ENV_DB_PATH, global = true)]
    db: Option<String>,
    /// trace|debug|info|warn|error; only takes effect together with --log-dir.
    #[arg(long, env = ENV_LOG_LEVEL, global = true)]
    log_level: Option<String>,
    /// Absolute directory for rolling log files.
    #[arg(long, env = ENV_LOG_DIR, global = true)]
    log_dir: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Store a new customer.
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        city: String,
        #[arg(long, allow_negative_numbers = true)]
        age: i64,
        #[arg(long)]
        pesel: String,
        #[arg(long)]
        street: String,
        #[arg(long = "app-no")]
        app_no: String,
    },
    /// Look up a customer by id.
    Get { id: i64 },
    /// Look up customers by exact field value.
    Find {
        /// name|city|age|pesel|street|appNo
        field: String,
        value: String,
        /// Return every match instead of the first.
        #[arg(long)]
        all: bool,
    },
    /// Remove every customer.
    Reset,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let mut stdout = std::io::stdout();
    let mut stderr = std::io::stderr();
    ExitCode::from(run(cli, &mut stdout, &mut stderr))
}

/// Runs one command, writing JSON results to `out` and notices/errors to `err`.
///
/// Returns the process exit status.
fn run(cli: Cli, out: &mut impl Write, err: &mut impl Write) -> u8 {
    let result = resolve_config(&cli).and_then(|config| {
        for notice in startup_notices(&config, cli.log_level.is_some()) {
            let _ = writeln!(err, "note: {notice}");
        }
        execute(&config, cli.command)
    });

    match result {
        Ok(output) => {
            let _ = writeln!(out, "{output}");
            0
        }
        Err(error) => {
            let _ = writeln!(err, "error: {error}");
            1
        }
    }
}

fn resolve_config(cli: &Cli) -> Result<CoreConfig, Box<dyn Error>> {
    Ok(CoreConfig::from_parts(
        cli.db.as_deref(),
        cli.log_level.as_deref(),
        cli.log_dir.as_deref(),
    )?)
}

/// Settings that silently do nothing are reported instead of ignored.
fn startup_notices(config: &CoreConfig, log_level_given: bool) -> Vec<&'static str> {
    let mut notices = Vec::new();
    if config.db_path.is_none() {
        notices.push("no --db given; using an in-memory store that is discarded on exit");
    }
    if log_level_given && config.log_dir.is_none() {
        notices.push("--log-level has no effect without --log-dir; logging is disabled");
    }
    notices
}

/// Opens the configured store and runs `command`, returning its JSON output.
fn execute(config: &CoreConfig, command: Command) -> Result<String, Box<dyn Error>> {
    init_logging_from_config(config)?;

    let mut conn = match config.db_path.as_deref() {
        Some(path) => open_db(path)?,
        None => open_db_in_memory()?,
    };
    let repo = SqliteCustomerRepository::try_new(&mut conn)?;
    let mut service = CustomerService::new(repo);

    let output = match command {
        Command::Add {
            name,
            city,
            age,
            pesel,
            street,
            app_no,
        } => {
            let customer = Customer::new(name, city, age, pesel, street, app_no)?;
            let stored = service.register(customer)?;
            info!(
                "event=cli_add module=cli status=ok id={}",
                stored.id().unwrap_or_default()
            );
            serde_json::to_string_pretty(&stored)?
        }
        Command::Get { id } => serde_json::to_string_pretty(&service.get(id)?)?,
        Command::Find { field, value, all } => {
            let field = CustomerField::parse(&field)
                .ok_or_else(|| format!("unknown customer field `{field}`"))?;
            let filter = CustomerFilter::parse(field, &value)
                .ok_or_else(|| format!("invalid value for `{field}`"))?;
            if all {
                serde_json::to_string_pretty(&service.find_all(&filter)?)?
            } else {
                serde_json::to_string_pretty(&service.find_first(&filter)?)?
            }
        }
        Command::Reset => {
            service.reset()?;
            info!("event=cli_reset module=cli status=ok");
            "reset".to_string()
        }
    };

    Ok(output)
}
