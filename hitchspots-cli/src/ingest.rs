//! Ingest command: sanitise upstream spots and upsert them into the store.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;
use hitchspots_core::IngestReport;
use hitchspots_data::upstream::load_upstream_records;
use log::{info, warn};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::{ARG_DB, ARG_RECORDS, CliError, ENV_INGEST_RECORDS, fs, open_store, resolve_db};

/// CLI arguments for the `ingest` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Read a JSON array of upstream spot objects, sanitise each \
                 one and upsert it into the spot database. Records that \
                 fail are reported and skipped; the rest of the batch is \
                 still stored.",
    about = "Store spots from an upstream JSON export"
)]
#[ortho_config(prefix = "HITCHSPOTS")]
pub(crate) struct IngestArgs {
    /// Path to a JSON file holding an array of spot objects.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) records: Option<Utf8PathBuf>,
    /// Path to the SQLite spot database.
    #[arg(long = ARG_DB, value_name = "path")]
    #[serde(default)]
    pub(crate) db: Option<Utf8PathBuf>,
}

impl IngestArgs {
    fn into_config(self) -> Result<IngestConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        IngestConfig::try_from(merged)
    }
}

/// Resolved `ingest` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct IngestConfig {
    pub(crate) records: Utf8PathBuf,
    pub(crate) db: Utf8PathBuf,
}

impl TryFrom<IngestArgs> for IngestConfig {
    type Error = CliError;

    fn try_from(args: IngestArgs) -> Result<Self, Self::Error> {
        let records = args.records.ok_or(CliError::MissingArgument {
            field: ARG_RECORDS,
            env: ENV_INGEST_RECORDS,
        })?;
        Ok(Self {
            records,
            db: resolve_db(args.db),
        })
    }
}

/// Summary printed after an ingest run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct IngestSummary {
    pub(crate) inserted: usize,
    pub(crate) updated: usize,
    pub(crate) repair_disabled: usize,
    pub(crate) failed: Vec<FailedRecord>,
}

/// A record that could not be stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct FailedRecord {
    pub(crate) id: Option<u64>,
    pub(crate) reason: String,
}

impl From<&IngestReport> for IngestSummary {
    fn from(report: &IngestReport) -> Self {
        Self {
            inserted: report.inserted,
            updated: report.updated,
            repair_disabled: report.repair_disabled,
            failed: report
                .failures
                .iter()
                .map(|failure| FailedRecord {
                    id: failure.external_id,
                    reason: failure.error.to_string(),
                })
                .collect(),
        }
    }
}

pub(crate) fn run_ingest(args: IngestArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    run_ingest_config(&config, writer)
}

pub(crate) fn run_ingest_config(
    config: &IngestConfig,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    fs::require_existing_file(&config.records, ARG_RECORDS)?;
    let payloads =
        load_upstream_records(&config.records).map_err(|source| CliError::LoadInput {
            field: ARG_RECORDS,
            path: config.records.clone(),
            source,
        })?;
    let total = payloads.len();
    let store = open_store(&config.db)?;
    let report = store.ingest_upstream(payloads);

    info!(
        "ingested {} of {total} spots from {} into {}",
        report.stored(),
        config.records,
        config.db
    );
    if total > 0 && report.stored() == 0 {
        warn!("no spots from {} were stored", config.records);
        return Err(CliError::NothingIngested {
            path: config.records.clone(),
            failed: report.failures.len(),
        });
    }
    crate::write_json(writer, &IngestSummary::from(&report))
}
