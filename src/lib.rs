use chrono::{NaiveDate, NaiveDateTime};
use log::{info, warn};
use std::fmt;
use std::fs;
use std::path::Path;

pub mod cf_ingest;
pub mod cf_process;
pub mod config;
pub mod error;

pub use config::PlantConfig;
pub use error::{Error, Result};

// constants
pub const VERSION: Option<&'static str> = option_env!("CARGO_PKG_VERSION");

/// Fixed names of the processed generation files,
/// shared between the processing and the ingest sides.
pub const SOLAR_GEN_FILE: &str = "solar_gen_2020_mw.csv";
pub const WIND_GEN_FILE: &str = "wind_gen_2020_mw.csv";
pub const DEFAULT_PROCESSED_DIR: &str = "data/processed";

/// Raw capacity-factor table as read from csv.
/// The first column holds the timestamps, kept unparsed at this stage;
/// the remaining columns hold one capacity-factor series per plant code.
/// Values are stored column major, one Vec per plant.
#[derive(Debug, Clone)]
pub struct CfTable {
    pub timestamps: Vec<String>,
    pub plants: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

impl CfTable {
    /// Read a raw capacity-factor csv.
    /// The header label of the timestamp column is ignored (it is unlabeled
    /// in the source files); plant codes are trimmed so that numeric and
    /// string spellings of the same code match the config index.
    /// Empty value cells become NaN, anything else that does not parse
    /// as a float is an error with line and plant named.
    pub fn from_csv<P>(path: P) -> Result<CfTable>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::MissingFile(path.to_path_buf()));
        }
        let mut rdr = csv::Reader::from_path(path)?;
        let headers = rdr.headers()?.clone();
        let plants: Vec<String> = headers.iter().skip(1).map(|h| h.trim().to_string()).collect();
        let mut timestamps: Vec<String> = Vec::new();
        let mut values: Vec<Vec<f64>> = vec![Vec::new(); plants.len()];
        for (i, record) in rdr.records().enumerate() {
            let record = record?;
            timestamps.push(record.get(0).unwrap_or("").to_string());
            for (j, column) in values.iter_mut().enumerate() {
                let raw = record.get(j + 1).unwrap_or("").trim();
                let value = parse_value(raw).ok_or_else(|| Error::BadValue {
                    path: path.to_path_buf(),
                    line: i + 2,
                    plant: plants[j].clone(),
                    value: raw.to_string(),
                })?;
                column.push(value);
            }
        }
        Ok(CfTable {
            timestamps,
            plants,
            values,
        })
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.timestamps.len(), self.plants.len())
    }
}

/// Time-indexed generation table in MW.
/// Same shape as the capacity-factor table it was derived from,
/// but rows are keyed by parsed datetimes; timestamps that failed
/// to parse are kept as missing rather than dropped.
#[derive(Debug, Clone)]
pub struct GenTable {
    pub datetime: Vec<Option<NaiveDateTime>>,
    pub plants: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

impl GenTable {
    pub fn shape(&self) -> (usize, usize) {
        (self.datetime.len(), self.plants.len())
    }

    /// Write the table to csv with a "datetime" column followed by
    /// one column per plant code. Missing datetimes and NaN values
    /// are written as empty cells.
    pub fn to_csv<P>(&self, path: P) -> Result<()>
    where
        P: AsRef<Path>,
    {
        let mut wtr = csv::Writer::from_path(path)?;
        let mut header: Vec<String> = Vec::with_capacity(self.plants.len() + 1);
        header.push("datetime".to_string());
        header.extend(self.plants.iter().cloned());
        wtr.write_record(&header)?;
        for (i, dt) in self.datetime.iter().enumerate() {
            let mut record: Vec<String> = Vec::with_capacity(self.plants.len() + 1);
            record.push(match dt {
                Some(t) => t.format("%Y-%m-%d %H:%M:%S").to_string(),
                None => String::new(),
            });
            for column in self.values.iter() {
                let v = column[i];
                record.push(if v.is_nan() { String::new() } else { v.to_string() });
            }
            wtr.write_record(&record)?;
        }
        wtr.flush()?;
        Ok(())
    }

    /// Reload a processed generation csv, parsing the datetime column
    /// back into timestamps. The first header must be the literal
    /// "datetime" written by to_csv.
    pub fn from_csv<P>(path: P) -> Result<GenTable>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::MissingFile(path.to_path_buf()));
        }
        let mut rdr = csv::Reader::from_path(path)?;
        let headers = rdr.headers()?.clone();
        if headers.get(0).map(|h| h.trim()) != Some("datetime") {
            return Err(Error::MissingColumn {
                path: path.to_path_buf(),
                column: "datetime".to_string(),
            });
        }
        let plants: Vec<String> = headers.iter().skip(1).map(|h| h.trim().to_string()).collect();
        let mut datetime: Vec<Option<NaiveDateTime>> = Vec::new();
        let mut values: Vec<Vec<f64>> = vec![Vec::new(); plants.len()];
        let mut unparseable = 0usize;
        for (i, record) in rdr.records().enumerate() {
            let record = record?;
            let raw_ts = record.get(0).unwrap_or("").trim();
            let parsed = parse_datetime(raw_ts);
            if parsed.is_none() && !raw_ts.is_empty() {
                unparseable += 1;
            }
            datetime.push(parsed);
            for (j, column) in values.iter_mut().enumerate() {
                let raw = record.get(j + 1).unwrap_or("").trim();
                let value = parse_value(raw).ok_or_else(|| Error::BadValue {
                    path: path.to_path_buf(),
                    line: i + 2,
                    plant: plants[j].clone(),
                    value: raw.to_string(),
                })?;
                column.push(value);
            }
        }
        if unparseable > 0 {
            warn!(
                "{}: {} datetime values could not be parsed and were set to missing",
                path.display(),
                unparseable
            );
        }
        Ok(GenTable {
            datetime,
            plants,
            values,
        })
    }
}

impl fmt::Display for GenTable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let (nrows, ncols) = self.shape();
        writeln!(f, "datetime,{}", self.plants.join(","))?;
        for (i, dt) in self.datetime.iter().enumerate().take(5) {
            let ts = match dt {
                Some(t) => t.format("%Y-%m-%d %H:%M:%S").to_string(),
                None => String::from("NaT"),
            };
            let row: Vec<String> = self.values.iter().map(|c| c[i].to_string()).collect();
            writeln!(f, "{},{}", ts, row.join(","))?;
        }
        if nrows > 5 {
            writeln!(f, "... {} rows x {} columns", nrows, ncols)?;
        }
        Ok(())
    }
}

/// Parse the datetime spellings that show up in the raw and processed
/// files: with or without seconds, space or T separated, or a bare date.
/// Returns None when the value does not parse.
pub fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    for fmt in [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
    ] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

fn parse_value(raw: &str) -> Option<f64> {
    if raw.is_empty() {
        return Some(f64::NAN);
    }
    raw.parse::<f64>().ok()
}

/// Convert a raw capacity-factor table to MW generation.
///
/// The valid plants are the intersection of the capacity-factor columns
/// and the config index, in capacity-factor column order; everything else
/// is dropped, with the dropped count logged. Each kept column is
/// multiplied by that plant's nameplate capacity. An empty intersection
/// is not an error: the result has zero columns and the full row index.
pub fn convert_cf_to_mw(cf: CfTable, config: &PlantConfig, config_type: &str) -> GenTable {
    info!("converting {} capacity factors to MW", config_type);

    let mut unparseable = 0usize;
    let datetime: Vec<Option<NaiveDateTime>> = cf
        .timestamps
        .iter()
        .map(|s| {
            let dt = parse_datetime(s);
            if dt.is_none() {
                unparseable += 1;
            }
            dt
        })
        .collect();
    if unparseable > 0 {
        warn!(
            "{} {} timestamps could not be parsed and were set to missing",
            unparseable, config_type
        );
    }

    let mut plants: Vec<String> = Vec::with_capacity(cf.plants.len());
    let mut values: Vec<Vec<f64>> = Vec::with_capacity(cf.plants.len());
    let mut dropped = 0usize;
    for (plant, column) in cf.plants.into_iter().zip(cf.values.into_iter()) {
        match config.capacity(&plant) {
            Some(capacity) => {
                values.push(column.into_iter().map(|v| v * capacity).collect());
                plants.push(plant);
            }
            None => dropped += 1,
        }
    }
    if dropped > 0 {
        warn!(
            "dropped {} {} capacity-factor columns with no config entry",
            dropped, config_type
        );
    }

    let out = GenTable {
        datetime,
        plants,
        values,
    };
    info!("{} generation shape (MW): {:?}", config_type, out.shape());
    out
}

/// Complete preprocessing pipeline from raw capacity factors to MW csv files.
/// Any failure aborts the run; partially written outputs are not cleaned up.
pub fn process_all(
    solar_config_path: &Path,
    wind_config_path: &Path,
    solar_cf_path: &Path,
    wind_cf_path: &Path,
    output_dir: &Path,
) -> Result<()> {
    fs::create_dir_all(output_dir)?;

    let solar_config = PlantConfig::from_csv(solar_config_path, "solar")?;
    let wind_config = PlantConfig::from_csv(wind_config_path, "wind")?;

    let solar_cf = CfTable::from_csv(solar_cf_path)?;
    let wind_cf = CfTable::from_csv(wind_cf_path)?;

    let solar_mw = convert_cf_to_mw(solar_cf, &solar_config, "solar");
    let wind_mw = convert_cf_to_mw(wind_cf, &wind_config, "wind");

    solar_mw.to_csv(output_dir.join(SOLAR_GEN_FILE))?;
    wind_mw.to_csv(output_dir.join(WIND_GEN_FILE))?;
    info!("MW generation files saved successfully");
    Ok(())
}

/// Map a source selector to its processed file name.
/// The selector is validated before any filesystem access.
pub fn gen_file_name(source: &str) -> Result<&'static str> {
    match source {
        "solar" => Ok(SOLAR_GEN_FILE),
        "wind" => Ok(WIND_GEN_FILE),
        other => Err(Error::InvalidSource(other.to_string())),
    }
}

/// Reload a processed generation file for inspection.
pub fn load_processed_generation(source: &str, processed_dir: &Path) -> Result<GenTable> {
    let path = processed_dir.join(gen_file_name(source)?);
    info!(
        "loading processed {} generation from {}",
        source,
        path.display()
    );
    let table = GenTable::from_csv(&path)?;
    info!("{} data loaded with shape {:?}", source, table.shape());
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn dt(s: &str) -> NaiveDateTime {
        parse_datetime(s).unwrap()
    }

    fn f64eq_with_nan_eq(a: f64, b: f64) -> bool {
        (a.is_nan() && b.is_nan()) || (a - b).abs() < 1e-9
    }

    fn f64vec_compare(va: &[f64], vb: &[f64]) -> bool {
        (va.len() == vb.len()) && va.iter().zip(vb).all(|(a, b)| f64eq_with_nan_eq(*a, *b))
    }

    fn out_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join("cf_gen_tests").join(name);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn sample_config() -> PlantConfig {
        [("123".to_string(), 5.0), ("456".to_string(), 2.5)]
            .into_iter()
            .collect()
    }

    #[test]
    fn datetime_parsing_accepts_common_spellings() {
        let expected = NaiveDate::from_ymd_opt(2020, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(parse_datetime("2020-01-01 00:00"), Some(expected));
        assert_eq!(parse_datetime("2020-01-01 00:00:00"), Some(expected));
        assert_eq!(parse_datetime("2020-01-01T00:00:00"), Some(expected));
        assert_eq!(parse_datetime("2020-01-01"), Some(expected));
        assert_eq!(parse_datetime("not-a-date"), None);
    }

    #[test]
    fn cf_table_from_csv_reads_plants_and_values() {
        let cf = CfTable::from_csv("./test/solar_cf.csv").unwrap();
        assert_eq!(cf.plants, vec!["123", "456", "999"]);
        assert_eq!(cf.shape(), (3, 3));
        assert!(f64vec_compare(&cf.values[0], &[0.4, 0.5, 0.6]));
        // empty cell read back as NaN
        assert!(cf.values[1][2].is_nan());
    }

    #[test]
    fn conversion_multiplies_by_nameplate_capacity() {
        let cf = CfTable {
            timestamps: vec!["2020-01-01 00:00".into(), "2020-01-01 01:00".into()],
            plants: vec!["123".into(), "456".into()],
            values: vec![vec![0.4, 0.5], vec![0.0, 0.2]],
        };
        let mw = convert_cf_to_mw(cf, &sample_config(), "solar");
        assert_eq!(mw.plants, vec!["123", "456"]);
        assert_eq!(mw.datetime[0], Some(dt("2020-01-01 00:00")));
        assert!(f64vec_compare(&mw.values[0], &[2.0, 2.5]));
        assert!(f64vec_compare(&mw.values[1], &[0.0, 0.5]));
    }

    #[test]
    fn plants_without_config_entry_are_dropped() {
        let cf = CfTable {
            timestamps: vec!["2020-01-01 00:00".into()],
            plants: vec!["999".into(), "123".into()],
            values: vec![vec![0.3], vec![0.4]],
        };
        let mw = convert_cf_to_mw(cf, &sample_config(), "solar");
        assert_eq!(mw.plants, vec!["123"]);
        assert!(f64vec_compare(&mw.values[0], &[2.0]));
    }

    #[test]
    fn config_plants_without_cf_column_add_nothing() {
        // config also knows "456", which has no column here:
        // it must not show up in the output, with no NaN injection
        let cf = CfTable {
            timestamps: vec!["2020-01-01 00:00".into()],
            plants: vec!["123".into()],
            values: vec![vec![0.4]],
        };
        let mw = convert_cf_to_mw(cf, &sample_config(), "solar");
        assert_eq!(mw.plants, vec!["123"]);
        assert_eq!(mw.shape(), (1, 1));
    }

    #[test]
    fn empty_intersection_keeps_the_row_index() {
        let cf = CfTable {
            timestamps: vec![
                "2020-01-01 00:00".into(),
                "2020-01-01 01:00".into(),
                "2020-01-01 02:00".into(),
            ],
            plants: vec!["a".into(), "b".into()],
            values: vec![vec![0.1, 0.2, 0.3], vec![0.4, 0.5, 0.6]],
        };
        let mw = convert_cf_to_mw(cf, &sample_config(), "wind");
        assert_eq!(mw.shape(), (3, 0));
    }

    #[test]
    fn unparseable_timestamps_become_missing() {
        let cf = CfTable {
            timestamps: vec!["2020-01-01 00:00".into(), "not-a-date".into()],
            plants: vec!["123".into()],
            values: vec![vec![0.4, 0.5]],
        };
        let mw = convert_cf_to_mw(cf, &sample_config(), "solar");
        assert!(mw.datetime[0].is_some());
        assert!(mw.datetime[1].is_none());
        assert_eq!(mw.shape(), (2, 1));
    }

    #[test]
    fn roundtrip_write_then_ingest() {
        let dir = out_dir("roundtrip");
        let table = GenTable {
            datetime: vec![
                Some(dt("2020-01-01 00:00")),
                Some(dt("2020-01-01 01:00")),
                None,
            ],
            plants: vec!["123".into(), "456".into()],
            values: vec![vec![2.0, 2.5, f64::NAN], vec![0.0, 0.5, 1.25]],
        };
        table.to_csv(dir.join(SOLAR_GEN_FILE)).unwrap();
        let reloaded = load_processed_generation("solar", &dir).unwrap();
        assert_eq!(reloaded.shape(), table.shape());
        assert_eq!(reloaded.plants, table.plants);
        assert_eq!(reloaded.datetime, table.datetime);
        for (got, expected) in reloaded.values.iter().zip(table.values.iter()) {
            assert!(f64vec_compare(got, expected));
        }
    }

    #[test]
    fn invalid_source_fails_before_any_file_read() {
        let dir = PathBuf::from("./definitely/not/a/dir");
        let err = load_processed_generation("geothermal", &dir).unwrap_err();
        match err {
            Error::InvalidSource(s) => assert_eq!(s, "geothermal"),
            other => panic!("expected InvalidSource, got {:?}", other),
        }
    }

    #[test]
    fn missing_processed_file_is_reported() {
        let dir = out_dir("empty");
        let err = load_processed_generation("wind", &dir).unwrap_err();
        assert!(matches!(err, Error::MissingFile(_)));
    }

    #[test]
    fn process_all_end_to_end() {
        let dir = out_dir("process_all");
        process_all(
            Path::new("./test/solar_configs.csv"),
            Path::new("./test/wind_configs.csv"),
            Path::new("./test/solar_cf.csv"),
            Path::new("./test/wind_cf.csv"),
            &dir,
        )
        .unwrap();

        // plant 999 has no config entry and must be gone
        let solar = load_processed_generation("solar", &dir).unwrap();
        assert_eq!(solar.plants, vec!["123", "456"]);
        assert_eq!(solar.shape(), (3, 2));
        assert!(f64vec_compare(&solar.values[0], &[2.0, 2.5, 3.0]));
        assert_eq!(solar.datetime[0], Some(dt("2020-01-01 00:00")));
        // the bad timestamp row survives with a missing datetime
        assert!(solar.datetime[2].is_none());

        let wind = load_processed_generation("wind", &dir).unwrap();
        assert_eq!(wind.plants, vec!["w1", "w2"]);
        assert!(f64vec_compare(&wind.values[0], &[1.5, 0.75]));
        assert!(f64vec_compare(&wind.values[1], &[1.5, 0.0]));
    }
}
