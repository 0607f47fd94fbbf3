//! Focused unit tests covering CLI configuration resolution.

use super::*;
use crate::ingest::{IngestArgs, IngestConfig};
use crate::manage::{DeleteArgs, DeleteConfig};
use crate::plan::{PlanArgs, PlanConfig, TripOutput, ensure_all_found};
use hitchspots_data::routing::{MAPBOX_BASE_URL, OSRM_BASE_URL, ProviderKind};
use rstest::rstest;

#[rstest]
fn converting_ingest_without_records_errors() {
    let err = IngestConfig::try_from(IngestArgs::default()).expect_err("missing records");
    match err {
        CliError::MissingArgument { field, env } => {
            assert_eq!(field, ARG_RECORDS);
            assert_eq!(env, ENV_INGEST_RECORDS);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
fn ingest_defaults_the_database_path() {
    let args = IngestArgs {
        records: Some(Utf8PathBuf::from("spots.json")),
        db: None,
    };

    let config = IngestConfig::try_from(args).expect("config should build");

    assert_eq!(config.db, Utf8PathBuf::from(DEFAULT_DB));
}

#[rstest]
fn converting_delete_without_listing_errors() {
    let err = DeleteConfig::try_from(DeleteArgs::default()).expect_err("missing listing");
    assert!(matches!(
        err,
        CliError::MissingArgument {
            field: ARG_SPOT_IDS,
            env: ENV_DELETE_SPOT_IDS
        }
    ));
}

fn plan_args() -> PlanArgs {
    PlanArgs {
        spot_ids: Some(Utf8PathBuf::from("chile.json")),
        ..PlanArgs::default()
    }
}

#[rstest]
fn plan_defaults_to_public_osrm_on_stdout() {
    let config = PlanConfig::try_from(plan_args()).expect("config should build");

    assert_eq!(config.routing.provider, ProviderKind::Osrm);
    assert_eq!(config.routing.http.base_url, OSRM_BASE_URL);
    assert_eq!(config.output, TripOutput::Stdout);
}

#[rstest]
fn plan_requires_a_listing() {
    let args = PlanArgs {
        spot_ids: None,
        ..plan_args()
    };
    let err = PlanConfig::try_from(args).expect_err("missing listing");
    assert!(matches!(
        err,
        CliError::MissingArgument {
            field: ARG_SPOT_IDS,
            env: ENV_PLAN_SPOT_IDS
        }
    ));
}

#[rstest]
#[case(None)]
#[case(Some("   "))]
fn mapbox_requires_an_access_token(#[case] token: Option<&str>) {
    let args = PlanArgs {
        provider: Some(ProviderKind::Mapbox),
        access_token: token.map(str::to_owned),
        ..plan_args()
    };
    let err = PlanConfig::try_from(args).expect_err("missing token");
    assert!(matches!(
        err,
        CliError::MissingArgument {
            field: ARG_ACCESS_TOKEN,
            env: ENV_MAPBOX_TOKEN
        }
    ));
}

#[rstest]
fn plan_applies_provider_overrides() {
    let args = PlanArgs {
        provider: Some(ProviderKind::Mapbox),
        base_url: Some("http://127.0.0.1:9000".to_owned()),
        profile: Some("driving-traffic".to_owned()),
        access_token: Some("pk.test".to_owned()),
        ..plan_args()
    };

    let config = PlanConfig::try_from(args).expect("config should build");

    assert_eq!(config.routing.http.base_url, "http://127.0.0.1:9000");
    assert_ne!(config.routing.http.base_url, MAPBOX_BASE_URL);
    assert_eq!(config.routing.http.profile, "driving-traffic");
    assert_eq!(config.routing.access_token.as_deref(), Some("pk.test"));
}

#[rstest]
#[case(None, Utf8PathBuf::from("."))]
#[case(Some(Utf8PathBuf::from("out")), Utf8PathBuf::from("out"))]
fn country_selects_file_output(
    #[case] output_dir: Option<Utf8PathBuf>,
    #[case] expected_dir: Utf8PathBuf,
) {
    let args = PlanArgs {
        country: Some("Chile".to_owned()),
        output_dir,
        ..plan_args()
    };

    let config = PlanConfig::try_from(args).expect("config should build");

    assert_eq!(
        config.output,
        TripOutput::CountryFile {
            dir: expected_dir,
            country: "Chile".to_owned(),
        }
    );
}

#[rstest]
#[case(&["hitchspots", "plan", "--provider", "MapBox"], ProviderKind::Mapbox)]
#[case(&["hitchspots", "plan", "--provider", "osrm"], ProviderKind::Osrm)]
fn provider_flag_parses_case_insensitively(#[case] argv: &[&str], #[case] expected: ProviderKind) {
    let cli = Cli::try_parse_from(argv).expect("arguments should parse");
    match cli.command {
        Command::Plan(args) => assert_eq!(args.provider, Some(expected)),
        other => panic!("expected plan command, found {other:?}"),
    }
}

#[rstest]
fn unknown_provider_is_rejected_by_clap() {
    let err = Cli::try_parse_from(["hitchspots", "plan", "--provider", "here"])
        .expect_err("unknown provider");
    assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
}

#[rstest]
fn unknown_spots_are_reported_once_in_listing_order() {
    let stored = hitchspots_core::SpotRecord::from_upstream(
        serde_json::json!({ "id": 1, "lat": 0, "lon": 0 }),
    )
    .expect("valid upstream spot")
    .to_document(hitchspots_core::EncodingRepair::Enabled)
    .expect("numeric coordinates");

    let err = ensure_all_found(&[99, 1, 7, 99, 1], &[stored]).expect_err("spots are missing");

    match err {
        CliError::UnknownSpots { missing } => assert_eq!(missing, vec![99, 7]),
        other => panic!("expected UnknownSpots, found {other:?}"),
    }
}
