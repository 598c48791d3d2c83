use super::VERSION;
use clap::{value_parser, Arg, Command};
use std::path::PathBuf;

/// Takes the CLI arguments that point to the raw input files and the output directory.
/// It is safe to unwrap clap cli_args.get_one when a default is given
/// because the default will be used when no argument is passed (i.e., it is always Some<T>).
pub fn parse_cli() -> (PathBuf, PathBuf, PathBuf, PathBuf, PathBuf) {
    let arg_solar_config = Arg::new("solar_config")
        .help("path to the solar plant config csv")
        .long("solar-config")
        .num_args(1)
        .value_parser(value_parser!(PathBuf))
        .default_value("data/raw/configs/eia_solar_configs.csv");

    let arg_wind_config = Arg::new("wind_config")
        .help("path to the wind plant config csv")
        .long("wind-config")
        .num_args(1)
        .value_parser(value_parser!(PathBuf))
        .default_value("data/raw/configs/eia_wind_configs.csv");

    let arg_solar_cf = Arg::new("solar_cf")
        .help("path to the solar capacity factor csv")
        .long("solar-cf")
        .num_args(1)
        .value_parser(value_parser!(PathBuf))
        .default_value("data/raw/solar/solar_gen_cf_2020_bc.csv");

    let arg_wind_cf = Arg::new("wind_cf")
        .help("path to the wind capacity factor csv")
        .long("wind-cf")
        .num_args(1)
        .value_parser(value_parser!(PathBuf))
        .default_value("data/raw/wind/wind_gen_cf_2020.csv");

    let arg_output_dir = Arg::new("output_dir")
        .help("output directory for the MW csv files")
        .short('o')
        .long("output-dir")
        .num_args(1)
        .value_parser(value_parser!(PathBuf))
        .default_value("data/processed");

    let cli_args = Command::new("cf_process")
        .version(VERSION.unwrap_or("unknown"))
        .about("cli app to convert solar and wind capacity-factor time series to MW generation")
        .arg(arg_solar_config)
        .arg(arg_wind_config)
        .arg(arg_solar_cf)
        .arg(arg_wind_cf)
        .arg(arg_output_dir)
        .get_matches();

    let solar_config = cli_args
        .get_one::<PathBuf>("solar_config")
        .unwrap()
        .to_owned();
    let wind_config = cli_args
        .get_one::<PathBuf>("wind_config")
        .unwrap()
        .to_owned();
    let solar_cf = cli_args.get_one::<PathBuf>("solar_cf").unwrap().to_owned();
    let wind_cf = cli_args.get_one::<PathBuf>("wind_cf").unwrap().to_owned();
    let output_dir = cli_args
        .get_one::<PathBuf>("output_dir")
        .unwrap()
        .to_owned();

    return (solar_config, wind_config, solar_cf, wind_cf, output_dir);
}
