//! Error types emitted by the Hitchspots CLI.
//!
//! Keep this error type reasonably small, as many CLI helpers return
//! `Result<_, CliError>`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use hitchspots_core::{AssembleError, SpotStoreError, SqliteBackendError};
use hitchspots_data::routing::ProviderBuildError;
use hitchspots_data::upstream::LoadRecordsError;
use thiserror::Error;

/// Errors emitted by the Hitchspots CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        field: &'static str,
        env: &'static str,
    },
    /// A referenced input path does not exist on disk.
    #[error("{field} path {path:?} does not exist")]
    MissingSourceFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// A referenced input path exists but is not a file.
    #[error("{field} path {path:?} exists but is not a file")]
    SourcePathNotFile {
        field: &'static str,
        path: Utf8PathBuf,
    },
    /// A referenced input path could not be inspected due to an IO error.
    #[error("failed to inspect {field} path {path:?}: {source}")]
    InspectSourcePath {
        field: &'static str,
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Loading spot records or identifiers failed.
    #[error("failed to load {field} from {path:?}: {source}")]
    LoadInput {
        field: &'static str,
        path: Utf8PathBuf,
        #[source]
        source: LoadRecordsError,
    },
    /// Opening the spot database failed.
    #[error(transparent)]
    OpenStore(#[from] SqliteBackendError),
    /// A spot store operation failed.
    #[error(transparent)]
    Store(#[from] SpotStoreError),
    /// Every record of an ingest batch was rejected.
    #[error("none of the {failed} records in {path:?} could be stored")]
    NothingIngested { path: Utf8PathBuf, failed: usize },
    /// Some requested spots are not in the store.
    #[error("spots not found in the store: {missing:?}")]
    UnknownSpots { missing: Vec<u64> },
    /// Constructing the routing provider failed.
    #[error("failed to build {provider} routing provider: {source}")]
    BuildPlanner {
        provider: &'static str,
        #[source]
        source: ProviderBuildError,
    },
    /// Assembling the trip failed.
    #[error("trip planning failed: {0}")]
    Assemble(#[from] AssembleError),
    /// The output directory exists but is not a directory.
    #[error("output directory {path:?} could not be opened: {source}")]
    OpenOutputDirectory {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Serialising command output failed.
    #[error("failed to serialise output: {0}")]
    SerialiseOutput(#[source] serde_json::Error),
    /// Writing command output failed.
    #[error("failed to write output: {0}")]
    WriteOutput(#[source] std::io::Error),
}
