//! Model parameters loaded from `config.csv`.

use std::path::Path;

use crate::csv::{self, CsvFile};
use crate::error::{Error, Result};

/// Model parameters shared by the whole pipeline.
#[derive(Debug, Clone, Copy)]
pub struct Config {
    /// Sine of the minimum admissible pipe slope against the Oxy plane.
    ///
    /// Loaded as a vertical drop in mm per metre of pipe and stored as the
    /// corresponding sine. Carried for the 3D realization stage; the 2D
    /// router validates and stores it without consuming it.
    pub min_slope_angle_sin: f64,
}

impl Config {
    /// Construct directly from a sine value in `[0, 1]`.
    pub fn new(min_slope_angle_sin: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&min_slope_angle_sin) {
            return Err(Error::Validation(format!(
                "minimum slope sine must lie in [0, 1], got {min_slope_angle_sin}"
            )));
        }
        Ok(Self {
            min_slope_angle_sin,
        })
    }

    /// Load the single-row model configuration from a CSV file.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        Self::load(&csv::load(path, "config.csv")?)
    }

    fn load(file: &CsvFile) -> Result<Self> {
        const COLUMN: &str = "minDeltaZ";

        let mut row = file.rows().next().ok_or_else(|| {
            Error::Validation("the model configuration file contains no data row".to_string())
        })?;

        let min_delta_z: f64 = row.parse(COLUMN)?;
        if min_delta_z <= 0.0 {
            return Err(row.error(COLUMN, "the minimum drop per metre must be positive"));
        }
        if min_delta_z > 100.0 {
            return Err(row.error(COLUMN, "the minimum drop per metre must not exceed 100"));
        }

        Ok(Self {
            min_slope_angle_sin: min_delta_z / 1000.0,
        })
    }
}
