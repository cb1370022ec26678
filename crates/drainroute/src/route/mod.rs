//! The route builder: connects every source to the growing trace.
//!
//! Sources are processed in descending-diameter order so the thick trunk
//! runs are laid first. For each source the builder enumerates every simple
//! corridor path from the source's node to the destination's node or to any
//! node the track already passes through, builds a clearance-respecting
//! zigzag polyline per path, and commits the shortest one as a chain of
//! straight pipe segments.

#[cfg(test)]
mod tests;

use std::collections::{HashMap, HashSet};

use crate::catalog::Catalog;
use crate::config::Config;
use crate::connections::{WaterConnections, WaterSource};
use crate::decisions::{Alternative, DecisionOracle};
use crate::error::{Error, Result};
use crate::geometry::{Point, LENGTH_EPSILON};
use crate::graph::{CorridorGraph, NodeId};
use crate::params::OptimizationParameters;
use crate::sink::MessageSink;
use crate::track::PipeTrack;

/// How a path leaves the current corridor node into the next one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Crossing {
    Up,
    Down,
    Left,
    Right,
}

/// Per-source index of which track nodes pass through which corridor nodes.
struct IntersectionIndex {
    /// Corridor nodes each track node's footprint intersects.
    loc_nodes_for_track_node: HashMap<usize, Vec<NodeId>>,
    /// Track nodes passing through each corridor node.
    track_nodes_for_loc_node: HashMap<NodeId, Vec<usize>>,
}

/// Computes the drainage trace for one problem instance.
///
/// Holds its own copy of the corridor graph; the attach and separate phases
/// mutate it, routing only reads it.
pub struct RouteBuilder<'a> {
    config: &'a Config,
    connections: &'a WaterConnections,
    catalog: &'a Catalog,
    graph: CorridorGraph,
    params: &'a OptimizationParameters,
    sink: &'a dyn MessageSink,
    oracle: &'a mut DecisionOracle,
}

impl<'a> RouteBuilder<'a> {
    pub fn new(
        config: &'a Config,
        connections: &'a WaterConnections,
        catalog: &'a Catalog,
        graph: CorridorGraph,
        params: &'a OptimizationParameters,
        sink: &'a dyn MessageSink,
        oracle: &'a mut DecisionOracle,
    ) -> Self {
        Self {
            config,
            connections,
            catalog,
            graph,
            params,
            sink,
            oracle,
        }
    }

    /// Compute the trace connecting every source to the destination.
    pub fn compute_track(&mut self) -> Result<PipeTrack> {
        self.sink.info("Computing the drainage pipe trace.");
        self.sink.info(&format!(
            "Minimum slope sine carried for 3D realization: {}",
            self.config.min_slope_angle_sin
        ));

        self.sink
            .info("Step 1: attaching water-connection objects to the corridor graph.");
        self.graph.attach(self.connections, self.catalog)?;

        self.sink
            .info("Step 2: separating corridor nodes holding several source entry points.");
        self.graph
            .separate_multi_source_nodes(self.params, self.catalog)?;

        self.sink
            .info("Step 3: connecting sources in descending diameter order.");
        let mut order: Vec<usize> = (0..self.connections.sources.len()).collect();
        order.sort_by(|a, b| {
            self.connections.sources[*b]
                .diameter
                .cmp(&self.connections.sources[*a].diameter)
        });

        let mut track = PipeTrack::new();
        for source_index in order {
            let source = &self.connections.sources[source_index];
            self.sink
                .info(&format!("Connecting source \"{}\".", source.name));
            self.connect_source(&mut track, source_index)?;
            self.sink
                .info(&format!("Source \"{}\" connected.", source.name));
        }

        self.sink.info("Step 4: computing the trace cost.");
        let cost = track.cost(self.catalog);
        self.sink
            .info(&format!("Total material cost of the trace: {cost:.2}"));

        Ok(track)
    }

    /// Connect one source to the track (or to the destination while the
    /// track is still empty).
    fn connect_source(&mut self, track: &mut PipeTrack, source_index: usize) -> Result<()> {
        let source = &self.connections.sources[source_index];

        // Index which track nodes run through which corridor nodes.
        let index = self.build_intersection_index(track)?;
        let reaching = index
            .loc_nodes_for_track_node
            .values()
            .filter(|nodes| !nodes.is_empty())
            .count();
        self.sink.info(&format!(
            "  track segments so far: {}, of which {} overlap the corridor area",
            track.len(),
            reaching
        ));

        // The corridor node the source is attached to.
        let source_node = self
            .graph
            .nodes()
            .find(|node| node.sources.iter().any(|s| s.source == source_index))
            .map(|node| node.id)
            .ok_or_else(|| Error::Routing {
                source_name: source.name.clone(),
            })?;

        // Every simple corridor path from the source to the track or the
        // destination.
        let paths = self.enumerate_paths(source_node, &index.track_nodes_for_loc_node);

        // The minimum-pseudo-length zigzag for each path, then the shortest.
        let mut candidates = Vec::with_capacity(paths.len());
        for path in &paths {
            let (zigzag, end_track_node) =
                self.min_pseudo_length_zigzag(path, track, source_index, &index)?;
            let length = polyline_length(&zigzag);
            candidates.push(Candidate {
                zigzag,
                end_track_node,
                length,
            });
        }
        candidates.sort_by(|a, b| a.length.total_cmp(&b.length));
        candidates.retain(|candidate| !candidate.zigzag.is_empty());

        if candidates.is_empty() {
            return Err(Error::Routing {
                source_name: source.name.clone(),
            });
        }

        let chosen = self.resolve_length_tie(&candidates, source);
        match candidates[chosen].end_track_node {
            Some(track_index) => self.sink.info(&format!(
                "  joining the existing trace at segment #{track_index}"
            )),
            None => self.sink.info("  connecting directly to the destination"),
        }
        let zigzag = &candidates[chosen].zigzag;

        // Lay straight segments: source point (projected to the plan) to the
        // entry point, then along the polyline.
        let mut previous = source.point.flattened();
        for point in zigzag {
            track.append_direct_segment(self.catalog, source.diameter, previous, *point)?;
            previous = *point;
        }
        Ok(())
    }

    fn build_intersection_index(&self, track: &PipeTrack) -> Result<IntersectionIndex> {
        let mut loc_nodes_for_track_node: HashMap<usize, Vec<NodeId>> = HashMap::new();
        let mut track_nodes_for_loc_node: HashMap<NodeId, Vec<usize>> = HashMap::new();
        for track_index in 0..track.len() {
            loc_nodes_for_track_node.insert(track_index, Vec::new());
        }
        for node in self.graph.nodes() {
            track_nodes_for_loc_node.insert(node.id, Vec::new());
        }

        for (track_index, track_node) in track.nodes().iter().enumerate() {
            for node in self.graph.nodes() {
                if track_node.footprint_intersects(
                    self.catalog,
                    node.left,
                    node.right,
                    node.bottom,
                    node.top,
                )? {
                    loc_nodes_for_track_node
                        .entry(track_index)
                        .or_default()
                        .push(node.id);
                    track_nodes_for_loc_node
                        .entry(node.id)
                        .or_default()
                        .push(track_index);
                }
            }
        }
        Ok(IntersectionIndex {
            loc_nodes_for_track_node,
            track_nodes_for_loc_node,
        })
    }

    /// DFS all simple paths from `start`, recording every prefix whose tail
    /// is the destination node or holds part of the track. Recording a prefix
    /// does not stop the search from extending it further.
    fn enumerate_paths(
        &self,
        start: NodeId,
        track_nodes_for_loc_node: &HashMap<NodeId, Vec<usize>>,
    ) -> Vec<Vec<NodeId>> {
        let mut paths = Vec::new();
        let mut building = vec![start];
        let mut visited: HashSet<NodeId> = HashSet::from([start]);
        self.extend_path(
            start,
            track_nodes_for_loc_node,
            &mut building,
            &mut visited,
            &mut paths,
        );
        paths
    }

    fn extend_path(
        &self,
        current: NodeId,
        track_nodes_for_loc_node: &HashMap<NodeId, Vec<usize>>,
        building: &mut Vec<NodeId>,
        visited: &mut HashSet<NodeId>,
        paths: &mut Vec<Vec<NodeId>>,
    ) {
        let reaches_track = track_nodes_for_loc_node
            .get(&current)
            .is_some_and(|nodes| !nodes.is_empty());
        if reaches_track || Some(current) == self.graph.destination_node() {
            paths.push(building.clone());
        }

        let neighbors: Vec<NodeId> = self.graph.node(current).adjacent().collect();
        for next in neighbors {
            if visited.insert(next) {
                building.push(next);
                self.extend_path(next, track_nodes_for_loc_node, building, visited, paths);
                building.pop();
                visited.remove(&next);
            }
        }
    }

    /// Build the minimum-pseudo-length zigzag along one corridor path.
    ///
    /// Returns the polyline and the track node it connects to (`None` when
    /// the endpoint is the destination). A rejected path yields an empty
    /// polyline.
    fn min_pseudo_length_zigzag(
        &self,
        path: &[NodeId],
        track: &PipeTrack,
        source_index: usize,
        index: &IntersectionIndex,
    ) -> Result<(Vec<Point>, Option<usize>)> {
        const NO_POLYLINE: (Vec<Point>, Option<usize>) = (Vec::new(), None);

        let radius = self.catalog.external_radius(
            self.connections.sources[source_index].diameter,
        )?;

        // Start at the source's entry point in the first path node.
        let first = self.graph.node(path[0]);
        let Some(entry) = first
            .sources
            .iter()
            .find(|attached| attached.source == source_index)
        else {
            return Ok(NO_POLYLINE);
        };
        let mut zigzag = vec![entry.entry_point];

        // One boundary-crossing point per hop between path nodes.
        for hop in path.windows(2) {
            let current = self.graph.node(hop[0]);
            let next = self.graph.node(hop[1]);

            let crossing = if current.top_neighbors.contains(&next.id) {
                Crossing::Up
            } else if current.bottom_neighbors.contains(&next.id) {
                Crossing::Down
            } else if current.right_neighbors.contains(&next.id) {
                Crossing::Right
            } else if current.left_neighbors.contains(&next.id) {
                Crossing::Left
            } else {
                // Non-adjacent hop: cannot happen for enumerated paths.
                return Ok(NO_POLYLINE);
            };

            let last = zigzag[zigzag.len() - 1];
            let point = match crossing {
                Crossing::Up | Crossing::Down => {
                    let left = current.left.max(next.left);
                    let right = current.right.min(next.right);
                    if right - left < 2.0 * radius {
                        // The shared opening is too narrow for the pipe.
                        return Ok(NO_POLYLINE);
                    }
                    let x = last.x.clamp(left + radius, right - radius);
                    let y = match crossing {
                        Crossing::Up => current.top + radius,
                        _ => current.bottom - radius,
                    };
                    Point::new(x, y, 0.0)
                }
                Crossing::Left | Crossing::Right => {
                    let bottom = current.bottom.max(next.bottom);
                    let top = current.top.min(next.top);
                    if top - bottom < 2.0 * radius {
                        return Ok(NO_POLYLINE);
                    }
                    let y = last.y.clamp(bottom + radius, top - radius);
                    let x = match crossing {
                        Crossing::Right => current.right + radius,
                        _ => current.left - radius,
                    };
                    Point::new(x, y, 0.0)
                }
            };
            zigzag.push(point);
        }

        // Pick the endpoint in the tail node: the nearest reachable axis
        // point of a run already laid there, or the destination itself.
        let tail = self.graph.node(path[path.len() - 1]);
        let last = zigzag[zigzag.len() - 1];

        let mut best_distance = f64::INFINITY;
        let mut end_point: Option<Point> = None;
        let mut end_track_node: Option<usize> = None;

        if let Some(track_indices) = index.track_nodes_for_loc_node.get(&tail.id) {
            for &track_index in track_indices {
                let track_node = &track.nodes()[track_index];
                let Some(center_point) = track_node.nearest_center_point_2d(last) else {
                    continue;
                };
                if !tail.contains_point(center_point) {
                    continue;
                }
                let distance = (last - center_point).length();
                if distance < best_distance {
                    best_distance = distance;
                    end_point = Some(center_point);
                    end_track_node = Some(track_index);
                }
            }
        }

        if let Some(destination) = &tail.destination {
            let destination_point = destination.point.flattened();
            let distance = (destination_point - last).length();
            if distance < best_distance {
                end_point = Some(destination_point);
                end_track_node = None;
            }
        }

        match end_point {
            Some(point) => {
                zigzag.push(point);
                Ok((zigzag, end_track_node))
            }
            None => Ok(NO_POLYLINE),
        }
    }

    /// Pick the winning candidate among the length-sorted list, consulting
    /// the decision oracle when several candidates tie for minimal length.
    /// The default alternative is the first candidate, so default runs keep
    /// the stable enumeration-order tie-break.
    fn resolve_length_tie(&mut self, candidates: &[Candidate], source: &WaterSource) -> usize {
        let tied = candidates
            .iter()
            .take_while(|candidate| candidate.length - candidates[0].length <= LENGTH_EPSILON)
            .count();
        if tied < 2 {
            return 0;
        }

        let alternatives: Vec<Alternative> = (0..tied)
            .map(|i| {
                Alternative::new(
                    (i + 1) as u32,
                    format!(
                        "polyline with {} vertices, length {:.1} mm",
                        candidates[i].zigzag.len(),
                        candidates[i].length
                    ),
                )
            })
            .collect();
        let chosen = self.oracle.choose(
            self.sink,
            &format!(
                "several shortest polylines tie for source \"{}\"; which one to lay?",
                source.name
            ),
            &alternatives,
        );
        (chosen as usize).saturating_sub(1).min(tied - 1)
    }
}

struct Candidate {
    zigzag: Vec<Point>,
    end_track_node: Option<usize>,
    length: f64,
}

/// Total Euclidean length of a polyline; empty polylines count as infinite.
fn polyline_length(points: &[Point]) -> f64 {
    if points.is_empty() {
        return f64::INFINITY;
    }
    points
        .windows(2)
        .map(|pair| (pair[1] - pair[0]).length())
        .sum()
}
