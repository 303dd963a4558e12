use clap::Parser;

use super::{Cli, Commands};

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(args).expect("parse")
}

#[test]
fn import_parses_report_paths() {
    let cli = parse(&[
        "fitment",
        "import",
        "fitments.csv",
        "--report",
        "report.json",
        "--report-log",
        "imports.jsonl",
    ]);
    let Commands::Import(args) = cli.command else {
        panic!("expected import command");
    };
    assert_eq!(args.csv.to_str(), Some("fitments.csv"));
    assert_eq!(args.report.as_deref().and_then(|p| p.to_str()), Some("report.json"));
    assert_eq!(
        args.report_log.as_deref().and_then(|p| p.to_str()),
        Some("imports.jsonl")
    );
}

#[test]
fn store_flag_defaults_to_local_db() {
    let cli = parse(&["fitment", "stats"]);
    assert_eq!(cli.store.to_str(), Some("fitment.db"));
}

#[test]
fn resolve_requires_all_vehicle_parameters() {
    let err = Cli::try_parse_from([
        "fitment", "resolve", "--brand", "ABARTH", "--model", "500 II",
    ])
    .expect_err("missing engine and filter type");
    let rendered = err.to_string();
    assert!(rendered.contains("--engine"));
}

#[test]
fn match_takes_positional_reference() {
    let cli = parse(&["fitment", "match", "37-L330", "--filter-type", "oil"]);
    let Commands::Match(args) = cli.command else {
        panic!("expected match command");
    };
    assert_eq!(args.compatibility_ref, "37-L330");
    assert_eq!(args.filter_type, "oil");
}

#[test]
fn search_filter_type_is_optional() {
    let cli = parse(&[
        "fitment", "search", "--brand", "ABARTH", "--model", "500", "--engine", "312",
    ]);
    let Commands::Search(args) = cli.command else {
        panic!("expected search command");
    };
    assert!(args.filter_type.is_none());
}
