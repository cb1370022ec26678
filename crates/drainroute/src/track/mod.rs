//! The pipe track: the flat, tree-shaped collection of laid pipe objects.

pub mod node;

use std::fs;
use std::io::Write;
use std::path::Path;

use crate::catalog::Catalog;
use crate::error::{Error, Result};
use crate::geometry::Point;
use crate::sink::MessageSink;

pub use node::{TrackKind, TrackNode};

/// The trace of the drainage system, rooted at the destination.
#[derive(Debug, Clone, Default)]
pub struct PipeTrack {
    nodes: Vec<TrackNode>,
}

impl PipeTrack {
    /// Create an empty track.
    pub fn new() -> Self {
        Self::default()
    }

    /// All nodes in creation order.
    pub fn nodes(&self) -> &[TrackNode] {
        &self.nodes
    }

    /// Number of laid objects.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether nothing has been laid yet.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Append a straight pipe segment of the given diameter and return its
    /// index. The segment is not linked into the tree topology.
    pub fn append_direct_segment(
        &mut self,
        catalog: &Catalog,
        diameter: u32,
        start: Point,
        end: Point,
    ) -> Result<usize> {
        let object = catalog.direct_pipe(diameter)?;
        let index = self.nodes.len();
        self.nodes.push(TrackNode {
            kind: TrackKind::Direct,
            object,
            start,
            end,
            diameter,
            next: None,
            parent: None,
        });
        Ok(index)
    }

    /// Total material cost: the sum of every node's cost.
    pub fn cost(&self, catalog: &Catalog) -> f64 {
        self.nodes.iter().map(|node| node.cost(catalog)).sum()
    }

    /// Print a human-readable 2D table of the track through the sink.
    pub fn print_2d(&self, sink: &dyn MessageSink) {
        sink.info("");
        sink.info("2D view of the pipe trace:");
        sink.info("start            | end              | length  | diameter");
        sink.info("-----------------+------------------+---------+---------");
        for node in &self.nodes {
            let length = (node.end - node.start).length();
            sink.info(&format!(
                "({:>6}, {:>6}) | ({:>6}, {:>6})  | {:>7.0} | {:>8}",
                node.start.x, node.start.y, node.end.x, node.end.y, length, node.diameter
            ));
        }
        sink.info("-----------------+------------------+---------+---------");
    }

    /// Write the 2D track data file: a `<N> 0` header, then one line per
    /// node with `startX startY endX endY diameter`.
    pub fn write_2d(&self, path: &Path) -> Result<()> {
        let mut file = fs::File::create(path).map_err(|source| Error::Output {
            path: path.to_path_buf(),
            source,
        })?;
        file.write_all(self.render_2d().as_bytes())
            .map_err(|source| Error::Output {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(())
    }

    /// Render the 2D data file contents in memory.
    pub fn render_2d(&self) -> String {
        let mut contents = String::new();
        contents.push_str(&format!("{} 0\n", self.nodes.len()));
        for node in &self.nodes {
            contents.push_str(&format!(
                "{} {} {} {} {}\n",
                node.start.x, node.start.y, node.end.x, node.end.y, node.diameter
            ));
        }
        contents
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::csv;

    fn catalog() -> Catalog {
        Catalog::load(
            &csv::from_str(
                "diameter;externalDiameter\n50;60\n100;120\n",
                "externalDiameters.csv",
            ),
            &csv::from_str(
                "type;id;name;d1;d2;d3;angle;L1;L2;L3;L4;crossType;reductionAlignment;cost\n\
                 pipe;1;PP 50;50;;;;;;;;;;0.5\n\
                 pipe;2;PP 100;100;;;;;;;;;;1.5\n",
                "materials.csv",
            ),
        )
        .unwrap()
    }

    #[test]
    fn append_and_cost() {
        let catalog = catalog();
        let mut track = PipeTrack::new();
        track
            .append_direct_segment(
                &catalog,
                50,
                Point::new(0.0, 0.0, 0.0),
                Point::new(100.0, 0.0, 0.0),
            )
            .unwrap();
        track
            .append_direct_segment(
                &catalog,
                100,
                Point::new(100.0, 0.0, 0.0),
                Point::new(100.0, 200.0, 0.0),
            )
            .unwrap();
        assert_eq!(track.len(), 2);
        // 100 mm at 0.5 plus 200 mm at 1.5.
        assert_eq!(track.cost(&catalog), 50.0 + 300.0);
    }

    #[test]
    fn append_requires_a_catalog_pipe() {
        let catalog = catalog();
        let mut track = PipeTrack::new();
        let err = track
            .append_direct_segment(
                &catalog,
                75,
                Point::new(0.0, 0.0, 0.0),
                Point::new(1.0, 0.0, 0.0),
            )
            .unwrap_err();
        assert!(err.to_string().contains("75"));
    }

    #[test]
    fn render_2d_format() {
        let catalog = catalog();
        let mut track = PipeTrack::new();
        track
            .append_direct_segment(
                &catalog,
                50,
                Point::new(130.0, 500.0, 0.0),
                Point::new(840.0, 500.0, 0.0),
            )
            .unwrap();
        assert_eq!(track.render_2d(), "1 0\n130 500 840 500 50\n");
    }

    #[test]
    fn nearest_center_point_on_horizontal_run() {
        let catalog = catalog();
        let mut track = PipeTrack::new();
        track
            .append_direct_segment(
                &catalog,
                50,
                Point::new(0.0, 0.0, 0.0),
                Point::new(100.0, 0.0, 0.0),
            )
            .unwrap();
        let node = &track.nodes()[0];
        // Interior projection.
        let p = node
            .nearest_center_point_2d(Point::new(40.0, 30.0, 7.0))
            .unwrap();
        assert!(p.approx_eq(Point::new(40.0, 0.0, 0.0), 1e-9));
        // Clamped to the near end.
        let p = node
            .nearest_center_point_2d(Point::new(-50.0, 10.0, 0.0))
            .unwrap();
        assert!(p.approx_eq(Point::new(0.0, 0.0, 0.0), 1e-9));
    }

    #[test]
    fn nearest_center_point_on_skew_run() {
        let catalog = catalog();
        let mut track = PipeTrack::new();
        track
            .append_direct_segment(
                &catalog,
                50,
                Point::new(0.0, 0.0, 0.0),
                Point::new(100.0, 100.0, 0.0),
            )
            .unwrap();
        let node = &track.nodes()[0];
        // (0, 50) projects onto the diagonal at (25, 25).
        let p = node
            .nearest_center_point_2d(Point::new(0.0, 50.0, 0.0))
            .unwrap();
        assert!(p.approx_eq(Point::new(25.0, 25.0, 0.0), 1e-9));
        // Beyond the far end: clamped.
        let p = node
            .nearest_center_point_2d(Point::new(300.0, 300.0, 0.0))
            .unwrap();
        assert!(p.approx_eq(Point::new(100.0, 100.0, 0.0), 1e-9));
    }

    #[test]
    fn footprint_intersection_uses_external_diameter() {
        let catalog = catalog();
        let mut track = PipeTrack::new();
        track
            .append_direct_segment(
                &catalog,
                50,
                Point::new(0.0, 100.0, 0.0),
                Point::new(200.0, 100.0, 0.0),
            )
            .unwrap();
        let node = &track.nodes()[0];
        // External diameter 60 -> band y in [70, 130].
        assert!(node
            .footprint_intersects(&catalog, 50.0, 150.0, 120.0, 200.0)
            .unwrap());
        assert!(!node
            .footprint_intersects(&catalog, 50.0, 150.0, 130.0, 200.0)
            .unwrap());
    }
}
