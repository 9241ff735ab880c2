//! Sort fixed-width record files by byte-range keys
//!
//! A DFSORT-flavoured command line over the record layout library: keys are
//! given as 1-based position and length, and every key shares one direction.

use clap::{Arg, Command};
use std::process;

use record_layout::{
    config::{parse_key_spec, SortConfig, SortConfigBuilder},
    error::RecordResult,
    sort,
};

fn main() {
    let result = run();
    match result {
        Ok(exit_code) => process::exit(exit_code),
        Err(e) => {
            eprintln!("recsort: {}", e);
            process::exit(e.exit_code());
        }
    }
}

fn run() -> RecordResult<i32> {
    let matches = build_cli().get_matches();

    let config = parse_config_from_matches(&matches)?;
    init_tracing(config.debug);

    sort(&config)
}

/// `RUST_LOG` wins; otherwise `--debug` selects debug output
fn init_tracing(debug: bool) {
    let default_level = if debug { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn build_cli() -> Command {
    Command::new("recsort")
        .version(env!("CARGO_PKG_VERSION"))
        .override_usage("recsort [OPTION]... [FILE]...")
        .about("Sort fixed-width records by byte-range keys")
        .long_about("Sort lines of fixed-width records by one or more byte-range keys.\n\nKeys are compared byte by byte, most significant first; lines shorter than a key are treated as if padded with spaces. Records with equal keys keep their input order.")

        // Input files
        .arg(Arg::new("files")
            .help("Input files to sort (use '-' or omit for stdin)")
            .num_args(0..)
            .value_name("FILE"))

        .arg(Arg::new("key")
            .short('k')
            .long("key")
            .help("Sort via a key; POS,LEN gives its 1-based position and length")
            .long_help("Sort via a key; POS,LEN gives its 1-based position and length in bytes.\n\nRepeat the option for secondary keys.\n\nExamples:\n  1,4  - sort by the first four bytes\n  6,2  - sort by bytes 6 and 7")
            .value_name("POS,LEN")
            .required(true)
            .action(clap::ArgAction::Append))
        .arg(Arg::new("reverse")
            .short('r')
            .long("reverse")
            .help("Sort every key in descending order")
            .action(clap::ArgAction::SetTrue))

        // I/O options
        .arg(Arg::new("output")
            .short('o')
            .long("output")
            .help("Write result to FILE instead of standard output")
            .value_name("FILE"))
        .arg(Arg::new("zero-terminated")
            .short('z')
            .long("zero-terminated")
            .help("Line delimiter is NUL, not newline")
            .action(clap::ArgAction::SetTrue))

        // Operation modes
        .arg(Arg::new("check")
            .short('c')
            .long("check")
            .help("Check for sorted input; do not sort")
            .action(clap::ArgAction::SetTrue))
        .arg(Arg::new("debug")
            .long("debug")
            .help("Log debug events to stderr")
            .action(clap::ArgAction::SetTrue))
}

/// Parse configuration from command line matches
fn parse_config_from_matches(matches: &clap::ArgMatches) -> RecordResult<SortConfig> {
    let mut builder = SortConfigBuilder::new();

    for spec in matches.get_many::<String>("key").unwrap_or_default() {
        builder = builder.key(parse_key_spec(spec)?);
    }

    if matches.get_flag("reverse") {
        builder = builder.reverse();
    }
    if matches.get_flag("check") {
        builder = builder.check();
    }
    if matches.get_flag("zero-terminated") {
        builder = builder.zero_terminated();
    }
    if matches.get_flag("debug") {
        builder = builder.debug();
    }
    if let Some(output) = matches.get_one::<String>("output") {
        builder = builder.output_file(output.clone());
    }

    let input_files: Vec<String> = matches
        .get_many::<String>("files")
        .unwrap_or_default()
        .cloned()
        .collect();
    builder = builder.input_files(input_files);

    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use record_layout::{ByteRange, SortOrder};

    #[test]
    fn test_parse_basic_config() {
        let app = build_cli();
        let matches = app
            .try_get_matches_from(["recsort", "-k", "1,4", "-r"])
            .expect("Failed to parse test arguments");

        let config = parse_config_from_matches(&matches).expect("Failed to parse test config");

        assert_eq!(config.keys, vec![ByteRange::new(0, 4)]);
        assert_eq!(config.sort_order(), SortOrder::Descending);
        assert!(config.reading_from_stdin());
    }

    #[test]
    fn test_parse_complex_config() {
        let app = build_cli();
        let matches = app
            .try_get_matches_from([
                "recsort", "-k", "6,2", "-k", "1,5", "-z", "-o", "output.txt", "input.txt",
            ])
            .expect("Failed to parse test arguments");

        let config = parse_config_from_matches(&matches).expect("Failed to parse test config");

        assert_eq!(config.keys, vec![ByteRange::new(5, 2), ByteRange::new(0, 5)]);
        assert!(config.zero_terminated);
        assert_eq!(config.output_file, Some("output.txt".to_string()));
        assert_eq!(config.input_files, vec!["input.txt".to_string()]);
    }

    #[test]
    fn test_invalid_key() {
        let app = build_cli();
        let matches = app
            .try_get_matches_from(["recsort", "-k", "0,4"])
            .expect("Failed to parse test arguments");
        assert!(parse_config_from_matches(&matches).is_err());
    }

    #[test]
    fn test_key_is_required() {
        assert!(build_cli().try_get_matches_from(["recsort", "file.txt"]).is_err());
    }

    #[test]
    fn test_conflicting_options() {
        let app = build_cli();
        let matches = app
            .try_get_matches_from(["recsort", "-k", "1,1", "-c", "-o", "out.txt"])
            .expect("Failed to parse test arguments");
        assert!(parse_config_from_matches(&matches).is_err());
    }
}
