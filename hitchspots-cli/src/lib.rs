//! Command-line interface for Hitchspots.
#![forbid(unsafe_code)]

use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, Subcommand};
use hitchspots_core::{SpotStore, SqliteBackend};
use serde::Serialize;

mod error;
mod fs;
mod ingest;
mod manage;
mod plan;

pub use error::CliError;

use ingest::IngestArgs;
use manage::{DeleteArgs, ListArgs};
use plan::PlanArgs;

const ARG_DB: &str = "db";
const ARG_RECORDS: &str = "records";
const ARG_SPOT_IDS: &str = "spot-ids";
const ARG_PROVIDER: &str = "provider";
const ARG_BASE_URL: &str = "base-url";
const ARG_PROFILE: &str = "profile";
const ARG_ACCESS_TOKEN: &str = "access-token";
const ARG_COUNTRY: &str = "country";
const ARG_OUTPUT_DIR: &str = "output-dir";
const ENV_INGEST_RECORDS: &str = "HITCHSPOTS_CMDS_INGEST_RECORDS";
const ENV_PLAN_SPOT_IDS: &str = "HITCHSPOTS_CMDS_PLAN_SPOT_IDS";
const ENV_DELETE_SPOT_IDS: &str = "HITCHSPOTS_CMDS_DELETE_SPOT_IDS";
/// Mapbox token variable honoured when no access token is configured.
const ENV_MAPBOX_TOKEN: &str = "MAPBOX_TOKEN";

/// Database used when `--db` is not supplied.
const DEFAULT_DB: &str = "hitchspots.db";

/// Run the Hitchspots CLI with the current process arguments and environment.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    let mut stdout = std::io::stdout().lock();
    match cli.command {
        Command::Ingest(args) => ingest::run_ingest(args, &mut stdout),
        Command::Plan(args) => plan::run_plan(args, &plan::DefaultPlannerBuilder, &mut stdout),
        Command::Delete(args) => manage::run_delete(args, &mut stdout),
        Command::List(args) => manage::run_list(args, &mut stdout),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "hitchspots",
    about = "Store hitchhiking spots and plan trips through them",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Sanitise and store spots from an upstream JSON export.
    Ingest(IngestArgs),
    /// Plan a routed trip through stored spots.
    Plan(PlanArgs),
    /// Delete stored spots by identifier.
    Delete(DeleteArgs),
    /// Print every stored spot as JSON.
    List(ListArgs),
}

fn resolve_db(db: Option<Utf8PathBuf>) -> Utf8PathBuf {
    db.unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_DB))
}

fn open_store(path: &Utf8Path) -> Result<SpotStore<SqliteBackend>, CliError> {
    let backend = SqliteBackend::open(path.as_std_path())?;
    Ok(SpotStore::new(backend))
}

fn write_json<T: Serialize + ?Sized>(writer: &mut dyn Write, value: &T) -> Result<(), CliError> {
    let payload = serde_json::to_string_pretty(value).map_err(CliError::SerialiseOutput)?;
    writer
        .write_all(payload.as_bytes())
        .map_err(CliError::WriteOutput)?;
    writer.write_all(b"\n").map_err(CliError::WriteOutput)
}

#[cfg(test)]
mod tests;
