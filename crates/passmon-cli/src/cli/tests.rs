//! CLI parse tests.

use super::{Cli, CliCommand};
use clap::Parser;
use std::path::PathBuf;

fn parse(args: &[&str]) -> CliCommand {
    let cli = Cli::try_parse_from(args).unwrap();
    cli.command
}

#[test]
fn run_with_no_flags() {
    let CliCommand::Run {
        passes,
        buf_mib,
        output,
        poll_ms,
    } = parse(&["passmon", "run"]);
    assert!(passes.is_none());
    assert!(buf_mib.is_none());
    assert!(output.is_none());
    assert!(poll_ms.is_none());
}

#[test]
fn run_with_overrides() {
    let CliCommand::Run {
        passes,
        buf_mib,
        output,
        poll_ms,
    } = parse(&[
        "passmon", "run", "--passes", "12", "--buf-mib", "8", "--output", "out.log",
        "--poll-ms", "100",
    ]);
    assert_eq!(passes, Some(12));
    assert_eq!(buf_mib, Some(8));
    assert_eq!(output, Some(PathBuf::from("out.log")));
    assert_eq!(poll_ms, Some(100));
}

#[test]
fn missing_subcommand_is_an_error() {
    assert!(Cli::try_parse_from(["passmon"]).is_err());
}

#[test]
fn unknown_subcommand_is_an_error() {
    assert!(Cli::try_parse_from(["passmon", "download"]).is_err());
}

#[test]
fn non_numeric_passes_is_an_error() {
    assert!(Cli::try_parse_from(["passmon", "run", "--passes", "many"]).is_err());
}
