//! Plan command: route a trip through stored spots.

use std::collections::HashSet;
use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use hitchspots_core::{Trip, TripPlanner, arrange_by_ids, assemble_trip, export_file_name};
use hitchspots_data::routing::{ProviderKind, RoutingConfig, build_planner};
use hitchspots_data::upstream::load_spot_ids;
use log::info;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::{
    ARG_ACCESS_TOKEN, ARG_BASE_URL, ARG_COUNTRY, ARG_DB, ARG_OUTPUT_DIR, ARG_PROFILE,
    ARG_PROVIDER, ARG_SPOT_IDS, CliError, ENV_MAPBOX_TOKEN, ENV_PLAN_SPOT_IDS, fs, open_store,
    resolve_db,
};

/// Extension of trip files written with `--country`.
const TRIP_FILE_EXTENSION: &str = "json";

/// CLI arguments for the `plan` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Load the spots named in a listing file from the spot \
                 database, in listing order, and ask a routing provider \
                 for a trip visiting them. The trip is printed as JSON or, \
                 with --country, written to a file named after the country.",
    about = "Plan a trip through stored spots"
)]
#[ortho_config(prefix = "HITCHSPOTS")]
pub(crate) struct PlanArgs {
    /// Path to a JSON listing of spot ids (numbers or objects with `id`).
    #[arg(long = ARG_SPOT_IDS, value_name = "path")]
    #[serde(default)]
    pub(crate) spot_ids: Option<Utf8PathBuf>,
    /// Path to the SQLite spot database.
    #[arg(long = ARG_DB, value_name = "path")]
    #[serde(default)]
    pub(crate) db: Option<Utf8PathBuf>,
    /// Routing provider: `osrm` (default) or `mapbox`.
    #[arg(long = ARG_PROVIDER, value_name = "name")]
    #[serde(default)]
    pub(crate) provider: Option<ProviderKind>,
    /// Override the provider's service root.
    #[arg(long = ARG_BASE_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) base_url: Option<String>,
    /// Routing profile, e.g. `driving`.
    #[arg(long = ARG_PROFILE, value_name = "name")]
    #[serde(default)]
    pub(crate) profile: Option<String>,
    /// Access token for providers that need one (Mapbox).
    #[arg(long = ARG_ACCESS_TOKEN, value_name = "token")]
    #[serde(default)]
    pub(crate) access_token: Option<String>,
    /// Country name used to derive the output file name.
    #[arg(long = ARG_COUNTRY, value_name = "name")]
    #[serde(default)]
    pub(crate) country: Option<String>,
    /// Directory receiving the trip file when `--country` is set.
    #[arg(long = ARG_OUTPUT_DIR, value_name = "dir")]
    #[serde(default)]
    pub(crate) output_dir: Option<Utf8PathBuf>,
}

impl PlanArgs {
    fn into_config(self) -> Result<PlanConfig, CliError> {
        let mut merged = self.load_and_merge().map_err(CliError::Configuration)?;
        if merged.access_token.is_none() {
            merged.access_token = std::env::var(ENV_MAPBOX_TOKEN).ok();
        }
        PlanConfig::try_from(merged)
    }
}

/// Where the planned trip goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TripOutput {
    /// Print to standard output.
    Stdout,
    /// Write `<country>.json` into `dir`.
    CountryFile { dir: Utf8PathBuf, country: String },
}

/// Resolved `plan` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PlanConfig {
    pub(crate) spot_ids: Utf8PathBuf,
    pub(crate) db: Utf8PathBuf,
    pub(crate) routing: RoutingConfig,
    pub(crate) output: TripOutput,
}

impl TryFrom<PlanArgs> for PlanConfig {
    type Error = CliError;

    fn try_from(args: PlanArgs) -> Result<Self, Self::Error> {
        let spot_ids = args.spot_ids.ok_or(CliError::MissingArgument {
            field: ARG_SPOT_IDS,
            env: ENV_PLAN_SPOT_IDS,
        })?;
        let provider = args.provider.unwrap_or_default();

        let mut routing = RoutingConfig::new(provider);
        if let Some(base_url) = args.base_url {
            routing = routing.with_base_url(base_url);
        }
        if let Some(profile) = args.profile {
            routing = routing.with_profile(profile);
        }
        let access_token = args
            .access_token
            .filter(|token| !token.trim().is_empty());
        match access_token {
            Some(token) => routing = routing.with_access_token(token),
            None if provider == ProviderKind::Mapbox => {
                return Err(CliError::MissingArgument {
                    field: ARG_ACCESS_TOKEN,
                    env: ENV_MAPBOX_TOKEN,
                });
            }
            None => {}
        }

        let output = match args.country {
            Some(country) => TripOutput::CountryFile {
                dir: args.output_dir.unwrap_or_else(|| Utf8PathBuf::from(".")),
                country,
            },
            None => TripOutput::Stdout,
        };

        Ok(Self {
            spot_ids,
            db: resolve_db(args.db),
            routing,
            output,
        })
    }
}

/// Builds the routing provider for the current plan invocation.
pub(crate) trait PlannerBuilder {
    fn build(&self, config: &RoutingConfig) -> Result<Box<dyn TripPlanner>, CliError>;
}

pub(crate) struct DefaultPlannerBuilder;

impl PlannerBuilder for DefaultPlannerBuilder {
    fn build(&self, config: &RoutingConfig) -> Result<Box<dyn TripPlanner>, CliError> {
        build_planner(config).map_err(|source| CliError::BuildPlanner {
            provider: config.provider.name(),
            source,
        })
    }
}

pub(crate) fn run_plan(
    args: PlanArgs,
    builder: &dyn PlannerBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    run_plan_config(&config, builder, writer)
}

pub(crate) fn run_plan_config(
    config: &PlanConfig,
    builder: &dyn PlannerBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let trip = execute_plan(config, builder)?;
    match &config.output {
        TripOutput::Stdout => crate::write_json(writer, &trip),
        TripOutput::CountryFile { dir, country } => write_trip_file(dir, country, &trip),
    }
}

fn execute_plan(config: &PlanConfig, builder: &dyn PlannerBuilder) -> Result<Trip, CliError> {
    fs::require_existing_file(&config.spot_ids, ARG_SPOT_IDS)?;
    let ids = load_spot_ids(&config.spot_ids).map_err(|source| CliError::LoadInput {
        field: ARG_SPOT_IDS,
        path: config.spot_ids.clone(),
        source,
    })?;
    let store = open_store(&config.db)?;
    let spots = arrange_by_ids(store.find_by_ids(&ids)?, &ids);
    ensure_all_found(&ids, &spots)?;

    let planner = builder.build(&config.routing)?;
    let trip = assemble_trip(planner.as_ref(), &spots)?;
    info!(
        "planned trip through {} spots with {}",
        spots.len(),
        planner.name()
    );
    Ok(trip)
}

pub(crate) fn ensure_all_found(
    ids: &[u64],
    spots: &[hitchspots_core::SpotDocument],
) -> Result<(), CliError> {
    let mut seen: HashSet<u64> = spots.iter().filter_map(|spot| spot.external_id()).collect();
    let missing: Vec<u64> = ids.iter().copied().filter(|id| seen.insert(*id)).collect();
    if missing.is_empty() {
        return Ok(());
    }
    Err(CliError::UnknownSpots { missing })
}

fn write_trip_file(dir: &Utf8Path, country: &str, trip: &Trip) -> Result<(), CliError> {
    let payload = serde_json::to_vec_pretty(trip).map_err(CliError::SerialiseOutput)?;
    let file_name = export_file_name(country, TRIP_FILE_EXTENSION);
    let written = fs::write_into_dir(dir, &file_name, &payload)?;
    info!("wrote trip to {written}");
    Ok(())
}
