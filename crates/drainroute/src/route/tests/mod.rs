mod simple;

use super::RouteBuilder;
use crate::catalog::Catalog;
use crate::config::Config;
use crate::connections::{WaterConnections, WaterDestination, WaterSource};
use crate::csv;
use crate::decisions::DecisionOracle;
use crate::error::Result;
use crate::geometry::Point;
use crate::graph::CorridorGraph;
use crate::params::OptimizationParameters;
use crate::sink::VecSink;
use crate::track::PipeTrack;

/// Catalog with straight pipes of 40/50/100 mm and their external diameters
/// (46/60/120).
fn catalog() -> Catalog {
    Catalog::load(
        &csv::from_str(
            "diameter;externalDiameter\n40;46\n50;60\n100;120\n",
            "externalDiameters.csv",
        ),
        &csv::from_str(
            "type;id;name;d1;d2;d3;angle;L1;L2;L3;L4;crossType;reductionAlignment;cost\n\
             pipe;1;PP 40;40;;;;;;;;;;0.3\n\
             pipe;2;PP 50;50;;;;;;;;;;0.5\n\
             pipe;3;PP 100;100;;;;;;;;;;1.5\n",
            "materials.csv",
        ),
    )
    .unwrap()
}

fn source(name: &str, x: f64, y: f64, diameter: u32) -> WaterSource {
    WaterSource {
        name: name.to_string(),
        point: Point::new(x, y, 0.0),
        diameter,
        slope_sin: 0.0,
    }
}

fn destination(name: &str, x: f64, y: f64, diameter: u32) -> WaterDestination {
    WaterDestination {
        name: name.to_string(),
        point: Point::new(x, y, 0.0),
        diameter,
    }
}

/// Run the route builder with default parameters and an empty oracle.
fn compute(
    graph: CorridorGraph,
    sources: Vec<WaterSource>,
    dest: WaterDestination,
) -> Result<PipeTrack> {
    compute_with(
        graph,
        sources,
        dest,
        OptimizationParameters::default(),
        DecisionOracle::new(),
    )
}

/// Run the route builder with explicit parameters and oracle.
fn compute_with(
    graph: CorridorGraph,
    sources: Vec<WaterSource>,
    dest: WaterDestination,
    params: OptimizationParameters,
    mut oracle: DecisionOracle,
) -> Result<PipeTrack> {
    let catalog = catalog();
    let config = Config::new(0.02).unwrap();
    let connections = WaterConnections {
        sources,
        destination: dest,
    };
    let sink = VecSink::new();
    let mut builder = RouteBuilder::new(
        &config,
        &connections,
        &catalog,
        graph,
        &params,
        &sink,
        &mut oracle,
    );
    builder.compute_track()
}

/// The endpoints of track segment `index` as `(start, end)`.
fn segment(track: &PipeTrack, index: usize) -> (Point, Point) {
    let node = &track.nodes()[index];
    (node.start, node.end)
}

fn assert_segment(track: &PipeTrack, index: usize, start: (f64, f64), end: (f64, f64)) {
    let (actual_start, actual_end) = segment(track, index);
    let expected_start = Point::new(start.0, start.1, 0.0);
    let expected_end = Point::new(end.0, end.1, 0.0);
    assert!(
        actual_start.approx_eq(expected_start, 1e-9) && actual_end.approx_eq(expected_end, 1e-9),
        "segment {index}: expected {expected_start:?} -> {expected_end:?}, \
         got {actual_start:?} -> {actual_end:?}"
    );
}
