//! CLI parse tests.

use clap::Parser;
use std::path::PathBuf;

use super::Cli;

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(args).expect("parse")
}

#[test]
fn cli_parse_count_only() {
    let cli = parse(&["pardl", "25"]);
    assert_eq!(cli.count, 25);
    assert!(cli.parallelism.is_none());
    assert_eq!(cli.output, PathBuf::from("outputs"));
    assert!(cli.url.is_none());
}

#[test]
fn cli_parse_parallelism() {
    let cli = parse(&["pardl", "10", "-p", "5"]);
    assert_eq!(cli.parallelism, Some(5));
    let cli = parse(&["pardl", "10", "--parallelism", "8"]);
    assert_eq!(cli.parallelism, Some(8));
}

#[test]
fn cli_parse_output_dir() {
    let cli = parse(&["pardl", "3", "-o", "/tmp/imgs"]);
    assert_eq!(cli.output, PathBuf::from("/tmp/imgs"));
}

#[test]
fn cli_parse_url_override() {
    let cli = parse(&["pardl", "3", "--url", "http://localhost:9/img.png"]);
    assert_eq!(cli.url.as_deref(), Some("http://localhost:9/img.png"));
}

#[test]
fn cli_missing_count_is_an_error() {
    assert!(Cli::try_parse_from(["pardl"]).is_err());
}

#[test]
fn cli_non_numeric_count_is_an_error() {
    assert!(Cli::try_parse_from(["pardl", "lots"]).is_err());
}
