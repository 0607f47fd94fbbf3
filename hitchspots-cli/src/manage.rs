//! Delete and list commands over the spot database.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;
use hitchspots_data::upstream::load_spot_ids;
use log::info;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::{ARG_DB, ARG_SPOT_IDS, CliError, ENV_DELETE_SPOT_IDS, fs, open_store, resolve_db};

/// CLI arguments for the `delete` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Delete the spots named in a listing file. Spots that are \
                 not stored are reported as absent; deleting twice is \
                 harmless.",
    about = "Delete stored spots"
)]
#[ortho_config(prefix = "HITCHSPOTS")]
pub(crate) struct DeleteArgs {
    /// Path to a JSON listing of spot ids (numbers or objects with `id`).
    #[arg(long = ARG_SPOT_IDS, value_name = "path")]
    #[serde(default)]
    pub(crate) spot_ids: Option<Utf8PathBuf>,
    /// Path to the SQLite spot database.
    #[arg(long = ARG_DB, value_name = "path")]
    #[serde(default)]
    pub(crate) db: Option<Utf8PathBuf>,
}

/// Resolved `delete` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DeleteConfig {
    pub(crate) spot_ids: Utf8PathBuf,
    pub(crate) db: Utf8PathBuf,
}

impl TryFrom<DeleteArgs> for DeleteConfig {
    type Error = CliError;

    fn try_from(args: DeleteArgs) -> Result<Self, Self::Error> {
        let spot_ids = args.spot_ids.ok_or(CliError::MissingArgument {
            field: ARG_SPOT_IDS,
            env: ENV_DELETE_SPOT_IDS,
        })?;
        Ok(Self {
            spot_ids,
            db: resolve_db(args.db),
        })
    }
}

/// Outcome printed after a delete run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct DeleteSummary {
    pub(crate) deleted: Vec<u64>,
    pub(crate) absent: Vec<u64>,
}

pub(crate) fn run_delete(args: DeleteArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let merged = args.load_and_merge().map_err(CliError::Configuration)?;
    run_delete_config(&DeleteConfig::try_from(merged)?, writer)
}

pub(crate) fn run_delete_config(
    config: &DeleteConfig,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    fs::require_existing_file(&config.spot_ids, ARG_SPOT_IDS)?;
    let ids = load_spot_ids(&config.spot_ids).map_err(|source| CliError::LoadInput {
        field: ARG_SPOT_IDS,
        path: config.spot_ids.clone(),
        source,
    })?;
    let store = open_store(&config.db)?;

    let mut summary = DeleteSummary::default();
    for id in ids {
        match store.delete(id)? {
            Some(_) => summary.deleted.push(id),
            None => summary.absent.push(id),
        }
    }
    info!(
        "deleted {} spots from {} ({} absent)",
        summary.deleted.len(),
        config.db,
        summary.absent.len()
    );
    crate::write_json(writer, &summary)
}

/// CLI arguments for the `list` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(about = "Print every stored spot as JSON")]
#[ortho_config(prefix = "HITCHSPOTS")]
pub(crate) struct ListArgs {
    /// Path to the SQLite spot database.
    #[arg(long = ARG_DB, value_name = "path")]
    #[serde(default)]
    pub(crate) db: Option<Utf8PathBuf>,
}

pub(crate) fn run_list(args: ListArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let merged = args.load_and_merge().map_err(CliError::Configuration)?;
    run_list_db(&resolve_db(merged.db), writer)
}

pub(crate) fn run_list_db(db: &camino::Utf8Path, writer: &mut dyn Write) -> Result<(), CliError> {
    let documents = open_store(db)?.find_all()?;
    crate::write_json(writer, &documents)
}
