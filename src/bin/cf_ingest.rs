use cf_gen::cf_ingest::parse_cli;
use cf_gen::load_processed_generation;
use log::{error, info};

/// Diagnostic loader for the processed generation files.
/// Failures are logged, not propagated: a missing or bad file
/// should not abort the inspection of the other one.
fn main() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .init();

    let (source, processed_dir) = parse_cli();
    let sources: Vec<String> = match source {
        Some(s) => vec![s],
        None => vec![String::from("solar"), String::from("wind")],
    };

    for source in sources {
        match load_processed_generation(&source, &processed_dir) {
            Ok(table) => info!("{} generation sample:\n{}", source, table),
            Err(e) => error!("failed to load {} generation data: {}", source, e),
        }
    }
}
