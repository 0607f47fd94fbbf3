//! Test helpers for composing CLI workspaces and dispatching commands.

use super::*;
use crate::plan::{PlannerBuilder, run_plan};
use hitchspots_core::{SpotDocument, TripPlanner};
use hitchspots_core::test_support::EchoTripPlanner;
use hitchspots_data::routing::RoutingConfig;
use std::cell::RefCell;
use tempfile::TempDir;

/// Planner builder that never touches the network.
#[derive(Debug, Default)]
pub(super) struct EchoPlannerBuilder;

impl PlannerBuilder for EchoPlannerBuilder {
    fn build(&self, _config: &RoutingConfig) -> Result<Box<dyn TripPlanner>, CliError> {
        Ok(Box::new(EchoTripPlanner))
    }
}

/// Temporary directory holding a spot database and input files.
#[derive(Debug)]
pub(super) struct Workspace {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl Workspace {
    pub(super) fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 workspace");
        Self { _dir: dir, root }
    }

    pub(super) fn path(&self, name: &str) -> Utf8PathBuf {
        self.root.join(name)
    }

    pub(super) fn db(&self) -> Utf8PathBuf {
        self.path("spots.db")
    }

    pub(super) fn write(&self, name: &str, contents: &str) -> Utf8PathBuf {
        let path = self.path(name);
        std::fs::write(&path, contents).expect("write workspace file");
        path
    }
}

/// Parse `argv` and run the selected command, planning with [`EchoTripPlanner`].
pub(super) fn dispatch(argv: &[String], writer: &mut dyn Write) -> Result<(), CliError> {
    let cli = Cli::try_parse_from(argv).map_err(CliError::ArgumentParsing)?;
    match cli.command {
        Command::Ingest(args) => ingest::run_ingest(args, writer),
        Command::Plan(args) => run_plan(args, &EchoPlannerBuilder, writer),
        Command::Delete(args) => manage::run_delete(args, writer),
        Command::List(args) => manage::run_list(args, writer),
    }
}

/// Upstream export with two well-formed spots and one malformed coordinate.
pub(super) const MIXED_EXPORT: &str = r#"[
    { "id": 1, "lat": "45.5", "lon": -73.6, "name": "Montreal on-ramp" },
    { "id": 2, "lat": 46.8, "lon": "-71.2", "name": "Quebec services" },
    { "id": 3, "lat": "north", "lon": 10.0 }
]"#;

/// Shared scenario state for the CLI behaviour tests.
#[derive(Debug)]
pub(super) struct CliWorld {
    pub(super) workspace: Workspace,
    pub(super) input: RefCell<Option<Utf8PathBuf>>,
    pub(super) extra_args: RefCell<Vec<String>>,
    pub(super) stdout: RefCell<Vec<u8>>,
    pub(super) result: RefCell<Option<Result<(), CliError>>>,
}

impl CliWorld {
    pub(super) fn new() -> Self {
        Self {
            workspace: Workspace::new(),
            input: RefCell::new(None),
            extra_args: RefCell::new(Vec::new()),
            stdout: RefCell::new(Vec::new()),
            result: RefCell::new(None),
        }
    }

    /// Run `command` against the workspace database, recording the outcome.
    pub(super) fn run(&self, command: &str, input_flag: Option<&str>) {
        let mut argv = vec!["hitchspots".to_owned(), command.to_owned()];
        if let Some(input) = self.input.borrow().as_ref() {
            if let Some(flag) = input_flag {
                argv.push(format!("--{flag}"));
            }
            argv.push(input.as_str().to_owned());
        }
        argv.extend([format!("--{ARG_DB}"), self.workspace.db().as_str().to_owned()]);
        argv.extend(self.extra_args.borrow().iter().cloned());

        let mut stdout = self.stdout.borrow_mut();
        stdout.clear();
        let outcome = dispatch(&argv, &mut *stdout);
        self.result.replace(Some(outcome));
    }

    /// Seed the database with [`MIXED_EXPORT`].
    pub(super) fn seed_sample_spots(&self) {
        let records = self.workspace.write("seed.json", MIXED_EXPORT);
        let argv = [
            "hitchspots".to_owned(),
            "ingest".to_owned(),
            records.as_str().to_owned(),
            format!("--{ARG_DB}"),
            self.workspace.db().as_str().to_owned(),
        ];
        dispatch(&argv, &mut Vec::new()).expect("seeding the store should succeed");
    }

    /// Every stored document, read through the `list` command.
    pub(super) fn stored_spots(&self) -> Vec<SpotDocument> {
        let argv = [
            "hitchspots".to_owned(),
            "list".to_owned(),
            format!("--{ARG_DB}"),
            self.workspace.db().as_str().to_owned(),
        ];
        let mut buffer = Vec::new();
        dispatch(&argv, &mut buffer).expect("listing should succeed");
        serde_json::from_slice(&buffer).expect("list output should be JSON documents")
    }

    pub(super) fn stdout_json<T: serde::de::DeserializeOwned>(&self) -> T {
        serde_json::from_slice(&self.stdout.borrow()).expect("stdout should hold JSON")
    }

    pub(super) fn error(&self) -> std::cell::Ref<'_, CliError> {
        std::cell::Ref::map(self.result.borrow(), |result| {
            result
                .as_ref()
                .expect("result recorded")
                .as_ref()
                .expect_err("expected failure")
        })
    }
}
