
use super::CorridorGraph;
use crate::catalog::Catalog;
use crate::connections::{WaterConnections, WaterDestination, WaterSource};
use crate::csv;
use crate::geometry::Point;
use crate::params::OptimizationParameters;

/// Catalog with external diameters and straight pipes for 40/50/100 mm.
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

fn connections(sources: Vec<WaterSource>, dest: WaterDestination) -> WaterConnections {
    WaterConnections {
        sources,
        destination: dest,
    }
}

/// Default separation parameters (150 mm / 150 mm).
fn params() -> OptimizationParameters {
    OptimizationParameters::default()
}

/// Assert that every adjacency is symmetric and geometrically valid.
fn assert_symmetric(graph: &CorridorGraph) {
    for node in graph.nodes() {
        for &id in &node.right_neighbors {
            let neighbor = graph.node(id);
            assert!(
                neighbor.left_neighbors.contains(&node.id),
                "node {} lists {} as right neighbor without the reverse",
                node.id,
                id
            );
            assert_eq!(node.right, neighbor.left);
            assert!(node.bottom < neighbor.top && node.top > neighbor.bottom);
        }
        for &id in &node.left_neighbors {
            assert!(graph.node(id).right_neighbors.contains(&node.id));
        }
        for &id in &node.top_neighbors {
            let neighbor = graph.node(id);
            assert!(
                neighbor.bottom_neighbors.contains(&node.id),
                "node {} lists {} as top neighbor without the reverse",
                node.id,
                id
            );
            assert_eq!(node.top, neighbor.bottom);
            assert!(node.left < neighbor.right && node.right > neighbor.left);
        }
        for &id in &node.bottom_neighbors {
            assert!(graph.node(id).top_neighbors.contains(&node.id));
        }
    }
}
