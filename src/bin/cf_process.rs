use cf_gen::cf_process::parse_cli;
use cf_gen::process_all;
use log::info;

fn main() -> Result<(), cf_gen::Error> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .init();

    let (solar_config, wind_config, solar_cf, wind_cf, output_dir) = parse_cli();
    info!(
        "processing capacity factors into {}",
        output_dir.display()
    );
    process_all(&solar_config, &wind_config, &solar_cf, &wind_cf, &output_dir)
}
