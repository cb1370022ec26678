//! Water-connection objects: the sources and the single destination (stack).

use std::path::Path;

use crate::csv::{self, CsvFile};
use crate::error::{Error, Result};
use crate::geometry::Point;

/// One water source: a leaf of the trace. Immutable.
#[derive(Debug, Clone)]
pub struct WaterSource {
    pub name: String,
    /// Attachment coordinate in mm.
    pub point: Point,
    /// Connection pipe diameter in mm.
    pub diameter: u32,
    /// Sine of the feed pipe slope, in `[0, 1)`.
    pub slope_sin: f64,
}

/// The single water destination (stack): the root of the trace. Immutable.
#[derive(Debug, Clone)]
pub struct WaterDestination {
    pub name: String,
    /// Attachment coordinate in mm.
    pub point: Point,
    /// Connection pipe diameter in mm.
    pub diameter: u32,
}

/// The full set of connection objects for one problem.
#[derive(Debug, Clone)]
pub struct WaterConnections {
    /// Sources in input-file order; the route builder orders them itself.
    pub sources: Vec<WaterSource>,
    pub destination: WaterDestination,
}

impl WaterConnections {
    /// Load sources and the destination from `connections.csv`.
    ///
    /// Requires at least one `source` row and exactly one `stack` row.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        Self::load(&csv::load(path, "connections.csv")?)
    }

    fn load(file: &CsvFile) -> Result<Self> {
        let mut sources = Vec::new();
        let mut destination: Option<WaterDestination> = None;

        for mut row in file.rows() {
            let kind = row.field("kind").to_ascii_lowercase();
            let name = row.field("name").to_string();
            let x: f64 = row.parse("x")?;
            let y: f64 = row.parse("y")?;
            let z: f64 = row.parse("z")?;
            let diameter: u32 = row.parse("diameter")?;
            if diameter == 0 {
                return Err(row.error("diameter", "the diameter must be positive"));
            }
            let slope_text = row.field("slopeSin");

            match kind.as_str() {
                "source" => {
                    let slope_sin = if slope_text.is_empty() {
                        0.0
                    } else {
                        let value: f64 = slope_text
                            .parse()
                            .map_err(|_| row.error("slopeSin", "cannot parse the slope sine"))?;
                        if !(0.0..1.0).contains(&value) {
                            return Err(
                                row.error("slopeSin", "the slope sine must lie in [0, 1)")
                            );
                        }
                        value
                    };
                    sources.push(WaterSource {
                        name,
                        point: Point::new(x, y, z),
                        diameter,
                        slope_sin,
                    });
                }
                "stack" => {
                    if !slope_text.is_empty() {
                        return Err(
                            row.error("slopeSin", "a stack must not specify a slope sine")
                        );
                    }
                    if destination.is_some() {
                        return Err(Error::Validation(
                            "the connections file contains more than one stack".to_string(),
                        ));
                    }
                    destination = Some(WaterDestination {
                        name,
                        point: Point::new(x, y, z),
                        diameter,
                    });
                }
                other => {
                    return Err(row.error(
                        "kind",
                        format!("unknown connection kind \"{other}\" (expected source or stack)"),
                    ));
                }
            }
        }

        if sources.is_empty() {
            return Err(Error::Validation(
                "the connections file contains no sources".to_string(),
            ));
        }
        let destination = destination.ok_or_else(|| {
            Error::Validation("the connections file contains no stack".to_string())
        })?;

        Ok(Self {
            sources,
            destination,
        })
    }
}
