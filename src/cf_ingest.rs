use super::{DEFAULT_PROCESSED_DIR, VERSION};
use clap::{value_parser, Arg, Command};
use std::path::PathBuf;

/// Takes the CLI arguments that select which processed generation file to inspect.
pub fn parse_cli() -> (Option<String>, PathBuf) {
    let arg_source = Arg::new("source")
        .help("processed generation to load, 'solar' or 'wind'; loads both when omitted")
        .short('s')
        .long("source")
        .num_args(1)
        .required(false);

    let arg_processed_dir = Arg::new("processed_dir")
        .help("directory holding the processed generation csv files")
        .long("processed-dir")
        .num_args(1)
        .value_parser(value_parser!(PathBuf))
        .default_value(DEFAULT_PROCESSED_DIR);

    let cli_args = Command::new("cf_ingest")
        .version(VERSION.unwrap_or("unknown"))
        .about("cli app to reload the processed MW generation files for inspection")
        .arg(arg_source)
        .arg(arg_processed_dir)
        .get_matches();

    let source = cli_args.get_one::<String>("source").map(|s| s.to_owned());
    let processed_dir = cli_args
        .get_one::<PathBuf>("processed_dir")
        .unwrap()
        .to_owned();

    return (source, processed_dir);
}
