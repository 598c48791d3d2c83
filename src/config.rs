use crate::error::{Error, Result};
use log::{error, info};
use std::collections::HashMap;
use std::path::Path;

pub const PLANT_CODE_COLUMN: &str = "plant_code_unique";
pub const CAPACITY_COLUMN: &str = "system_capacity";

/// Plant metadata indexed by the unique plant code.
/// Only the nameplate capacity survives the load;
/// the remaining config columns are not needed for the conversion.
#[derive(Debug, Clone, Default)]
pub struct PlantConfig {
    capacity_mw: HashMap<String, f64>,
}

impl PlantConfig {
    /// Load a plant config csv and index it by plant code.
    /// The config_type ("solar" or "wind") is only used for logging.
    /// Errors are logged here and returned to the caller, never swallowed.
    pub fn from_csv<P>(path: P, config_type: &str) -> Result<PlantConfig>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        info!("loading {} config from {}", config_type, path.display());
        Self::read_csv(path).map_err(|e| {
            error!("failed to load {} config: {}", config_type, e);
            e
        })
    }

    fn read_csv(path: &Path) -> Result<PlantConfig> {
        if !path.exists() {
            return Err(Error::MissingFile(path.to_path_buf()));
        }
        let mut rdr = csv::Reader::from_path(path)?;
        let headers = rdr.headers()?.clone();
        let code_idx = position_of(&headers, PLANT_CODE_COLUMN, path)?;
        let capacity_idx = position_of(&headers, CAPACITY_COLUMN, path)?;
        let mut capacity_mw = HashMap::new();
        for (i, record) in rdr.records().enumerate() {
            let record = record?;
            let code = record.get(code_idx).unwrap_or("").trim().to_string();
            let raw = record.get(capacity_idx).unwrap_or("").trim();
            let capacity = raw.parse::<f64>().map_err(|_| Error::BadValue {
                path: path.to_path_buf(),
                line: i + 2,
                plant: code.clone(),
                value: raw.to_string(),
            })?;
            // duplicate plant codes keep the last row, as key semantics imply
            capacity_mw.insert(code, capacity);
        }
        Ok(PlantConfig { capacity_mw })
    }

    /// Nameplate capacity in MW for the plant code, if configured.
    pub fn capacity(&self, plant_code: &str) -> Option<f64> {
        self.capacity_mw.get(plant_code).copied()
    }

    pub fn contains(&self, plant_code: &str) -> bool {
        self.capacity_mw.contains_key(plant_code)
    }

    pub fn len(&self) -> usize {
        self.capacity_mw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.capacity_mw.is_empty()
    }

    pub fn plant_codes(&self) -> impl Iterator<Item = &str> {
        self.capacity_mw.keys().map(|k| k.as_str())
    }
}

impl FromIterator<(String, f64)> for PlantConfig {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        PlantConfig {
            capacity_mw: iter.into_iter().collect(),
        }
    }
}

fn position_of(headers: &csv::StringRecord, column: &str, path: &Path) -> Result<usize> {
    headers
        .iter()
        .position(|h| h.trim() == column)
        .ok_or_else(|| Error::MissingColumn {
            path: path.to_path_buf(),
            column: column.to_string(),
        })
}
