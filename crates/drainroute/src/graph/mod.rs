//! The corridor graph: a planar subdivision of the drawing area into
//! axis-aligned rectangular nodes connected along shared edges.
//!
//! The graph owns its nodes in an arena and wires them with stable integer
//! ids, so cloning the graph is a full deep copy and no reference ever
//! dangles. Construction happens in phases: populate (file load or
//! [`CorridorGraph::add_node`]), wire ([`CorridorGraph::auto_connect`]),
//! attach water-connection objects, then optionally separate multi-source
//! nodes.

pub mod node;

#[cfg(test)]
mod tests;

use std::collections::HashMap;
use std::path::Path;

use crate::catalog::Catalog;
use crate::connections::WaterConnections;
use crate::csv::{self, CsvFile};
use crate::error::{Error, Result};
use crate::geometry::Point;
use crate::params::OptimizationParameters;

pub use node::{AttachedSource, CorridorNode, NodeId};

/// Axis of a node-separating cut.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CutAxis {
    X,
    Y,
}

/// The corridor graph. See the module documentation.
#[derive(Debug, Clone, Default)]
pub struct CorridorGraph {
    last_generated_id: NodeId,
    nodes: Vec<CorridorNode>,
    index: HashMap<NodeId, usize>,
    destination_node: Option<NodeId>,
}

impl CorridorGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load corridor rectangles from `corridor.csv`. Adjacency is not wired;
    /// call [`CorridorGraph::auto_connect`] afterwards.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        Self::load(&csv::load(path, "corridor.csv")?)
    }

    /// Load corridor rectangles from already-read CSV contents.
    pub fn load(file: &CsvFile) -> Result<Self> {
        let mut graph = Self::new();
        for mut row in file.rows() {
            let left: f64 = row.parse("left")?;
            let right: f64 = row.parse("right")?;
            let bottom: f64 = row.parse("bottom")?;
            let top: f64 = row.parse("top")?;
            graph.add_node(left, right, bottom, top)?;
        }
        Ok(graph)
    }

    /// Add a rectangular node and return its id.
    ///
    /// Rejects degenerate bounds and any positive-area overlap with an
    /// existing node.
    pub fn add_node(&mut self, left: f64, right: f64, bottom: f64, top: f64) -> Result<NodeId> {
        let candidate = CorridorNode::new(0, left, right, bottom, top);

        if !(left < right && bottom < top) {
            return Err(Error::Geometry(format!(
                "cannot add corridor node {}: the bounds are degenerate",
                candidate.position_str()
            )));
        }
        for existing in &self.nodes {
            if candidate.overlaps_area(existing) {
                return Err(Error::Geometry(format!(
                    "cannot add corridor node {}: it overlaps existing node {} with positive area",
                    candidate.position_str(),
                    existing.position_str()
                )));
            }
        }

        let id = self.generate_node_id();
        self.index.insert(id, self.nodes.len());
        self.nodes.push(CorridorNode::new(id, left, right, bottom, top));
        Ok(id)
    }

    fn generate_node_id(&mut self) -> NodeId {
        self.last_generated_id += 1;
        self.last_generated_id
    }

    /// The node with the given id. Panics if the id is not part of the graph;
    /// ids stored in adjacency lists are always valid.
    pub fn node(&self, id: NodeId) -> &CorridorNode {
        &self.nodes[self.index[&id]]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut CorridorNode {
        &mut self.nodes[self.index[&id]]
    }

    /// All nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &CorridorNode> {
        self.nodes.iter()
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Id of the node holding the destination, once attached.
    pub fn destination_node(&self) -> Option<NodeId> {
        self.destination_node
    }

    /// Connect two nodes as left-right neighbors.
    ///
    /// Both ids must exist, the nodes must actually share a positive-length
    /// vertical edge, and the connection must not exist yet.
    pub fn connect_left_right(&mut self, left_id: NodeId, right_id: NodeId) -> Result<()> {
        self.check_known(left_id, "left-right")?;
        self.check_known(right_id, "left-right")?;

        let left = self.node(left_id);
        let right = self.node(right_id);

        if left.right_neighbors.contains(&right_id) || right.left_neighbors.contains(&left_id) {
            return Err(Error::Geometry(format!(
                "nodes {} and {} are already connected left-right",
                left.position_str(),
                right.position_str()
            )));
        }
        if left.right != right.left || left.bottom >= right.top || left.top <= right.bottom {
            return Err(Error::Geometry(format!(
                "nodes {} and {} do not share a left-right edge",
                left.position_str(),
                right.position_str()
            )));
        }

        self.node_mut(left_id).right_neighbors.push(right_id);
        self.node_mut(right_id).left_neighbors.push(left_id);
        Ok(())
    }

    /// Connect two nodes as bottom-top neighbors. Mirror of
    /// [`CorridorGraph::connect_left_right`].
    pub fn connect_bottom_top(&mut self, bottom_id: NodeId, top_id: NodeId) -> Result<()> {
        self.check_known(bottom_id, "bottom-top")?;
        self.check_known(top_id, "bottom-top")?;

        let bottom = self.node(bottom_id);
        let top = self.node(top_id);

        if bottom.top_neighbors.contains(&top_id) || top.bottom_neighbors.contains(&bottom_id) {
            return Err(Error::Geometry(format!(
                "nodes {} and {} are already connected bottom-top",
                bottom.position_str(),
                top.position_str()
            )));
        }
        if bottom.top != top.bottom || bottom.left >= top.right || bottom.right <= top.left {
            return Err(Error::Geometry(format!(
                "nodes {} and {} do not share a bottom-top edge",
                bottom.position_str(),
                top.position_str()
            )));
        }

        self.node_mut(bottom_id).top_neighbors.push(top_id);
        self.node_mut(top_id).bottom_neighbors.push(bottom_id);
        Ok(())
    }

    fn check_known(&self, id: NodeId, edge_kind: &str) -> Result<()> {
        if !self.index.contains_key(&id) {
            return Err(Error::Geometry(format!(
                "cannot make a {edge_kind} connection: node id {id} is not part of the corridor graph"
            )));
        }
        Ok(())
    }

    /// Wire every pair of nodes sharing a positive-length edge, exactly once.
    ///
    /// Must be called once, before any adjacency exists. Pairs touching only
    /// at a corner share no edge and stay unconnected.
    pub fn auto_connect(&mut self) -> Result<()> {
        for i in 0..self.nodes.len() {
            for j in i + 1..self.nodes.len() {
                let a = &self.nodes[i];
                let b = &self.nodes[j];
                if !a.touches(b) {
                    continue;
                }
                let (a_id, b_id) = (a.id, b.id);
                let vertical_overlap = a.bottom < b.top && a.top > b.bottom;
                let horizontal_overlap = a.left < b.right && a.right > b.left;
                if a.left == b.right && vertical_overlap {
                    self.connect_left_right(b_id, a_id)?;
                } else if a.right == b.left && vertical_overlap {
                    self.connect_left_right(a_id, b_id)?;
                } else if a.bottom == b.top && horizontal_overlap {
                    self.connect_bottom_top(b_id, a_id)?;
                } else if a.top == b.bottom && horizontal_overlap {
                    self.connect_bottom_top(a_id, b_id)?;
                }
            }
        }
        Ok(())
    }

    /// The point of the corridor area closest to `point`, with its node.
    ///
    /// Ties are resolved in favor of the earliest-inserted node. Returns
    /// `None` on an empty graph.
    pub fn closest_point(&self, point: Point) -> Option<(Point, NodeId)> {
        let mut best: Option<(Point, NodeId, f64)> = None;
        for node in &self.nodes {
            let candidate = node.closest_point(point);
            let distance = candidate.distance_to(point.flattened());
            let better = match &best {
                None => true,
                Some((_, _, best_distance)) => distance < *best_distance,
            };
            if better {
                best = Some((candidate, node.id, distance));
            }
        }
        best.map(|(candidate, id, _)| (candidate, id))
    }

    /// Attach every water source and the destination to the graph.
    ///
    /// Each source lands on the node closest to its point; its entry point is
    /// the closest corridor point shifted inward by the pipe's clearance
    /// radius on every edge it lies on. The destination's full external
    /// footprint must fit inside a single node.
    pub fn attach(&mut self, connections: &WaterConnections, catalog: &Catalog) -> Result<()> {
        if connections.sources.is_empty() {
            return Err(Error::Validation(
                "cannot attach water-connection objects: there are no sources".to_string(),
            ));
        }

        for (source_index, source) in connections.sources.iter().enumerate() {
            let (closest, node_id) = self.closest_point(source.point).ok_or_else(|| {
                Error::Attachment(
                    "cannot attach water-connection objects to an empty corridor graph"
                        .to_string(),
                )
            })?;
            let radius = catalog.external_radius(source.diameter)?;

            let node = self.node(node_id);
            let mut entry_point = closest;
            if entry_point.x == node.left {
                entry_point.x += radius;
            } else if entry_point.x == node.right {
                entry_point.x -= radius;
            }
            if entry_point.y == node.bottom {
                entry_point.y += radius;
            } else if entry_point.y == node.top {
                entry_point.y -= radius;
            }

            self.node_mut(node_id).sources.push(AttachedSource {
                source: source_index,
                entry_point,
            });
        }

        let destination = &connections.destination;
        let (_, node_id) = self.closest_point(destination.point).ok_or_else(|| {
            Error::Attachment(
                "cannot attach water-connection objects to an empty corridor graph".to_string(),
            )
        })?;
        let radius = catalog.external_radius(destination.diameter)?;
        let point = destination.point;

        let node = self.node(node_id);
        if !node.contains_rect(
            point.x - radius,
            point.x + radius,
            point.y - radius,
            point.y + radius,
        ) {
            return Err(Error::Attachment(format!(
                "no corridor node fully contains the destination \"{}\" with its external \
                 diameter; the closest node is {}",
                destination.name,
                node.position_str()
            )));
        }
        self.node_mut(node_id).destination = Some(destination.clone());
        self.destination_node = Some(node_id);
        Ok(())
    }

    /// Split nodes holding several source entry points until a fixpoint.
    ///
    /// A node splits along the midpoint between two adjacent distinct entry
    /// coordinates when the node is narrow enough across the cut, the entry
    /// points are far enough apart, and the cut stays clear of the
    /// destination footprint. X cuts are preferred over Y cuts. The scan
    /// restarts after every split and stops when nothing is splittable.
    pub fn separate_multi_source_nodes(
        &mut self,
        params: &OptimizationParameters,
        catalog: &Catalog,
    ) -> Result<()> {
        loop {
            let Some((node_id, axis, cut)) = self.find_split(params, catalog)? else {
                break;
            };
            match axis {
                CutAxis::X => self.separate_node_x(node_id, cut),
                CutAxis::Y => self.separate_node_y(node_id, cut),
            }
        }
        self.recalculate_destination_node();
        Ok(())
    }

    fn find_split(
        &self,
        params: &OptimizationParameters,
        catalog: &Catalog,
    ) -> Result<Option<(NodeId, CutAxis, f64)>> {
        for node in &self.nodes {
            if node.sources.len() < 2 {
                continue;
            }

            let xs = distinct_sorted(node.sources.iter().map(|s| s.entry_point.x));
            let ys = distinct_sorted(node.sources.iter().map(|s| s.entry_point.y));

            if xs.len() > 1 && node.size_y() <= params.max_node_width_to_separate {
                for pair in xs.windows(2) {
                    if pair[1] - pair[0] >= params.min_source_distance_to_separate {
                        let cut = (pair[0] + pair[1]) / 2.0;
                        if self.cut_clears_destination(node, CutAxis::X, cut, catalog)? {
                            return Ok(Some((node.id, CutAxis::X, cut)));
                        }
                    }
                }
            }

            if ys.len() > 1 && node.size_x() <= params.max_node_width_to_separate {
                for pair in ys.windows(2) {
                    if pair[1] - pair[0] >= params.min_source_distance_to_separate {
                        let cut = (pair[0] + pair[1]) / 2.0;
                        if self.cut_clears_destination(node, CutAxis::Y, cut, catalog)? {
                            return Ok(Some((node.id, CutAxis::Y, cut)));
                        }
                    }
                }
            }
        }
        Ok(None)
    }

    /// Whether a cut through `node` avoids the destination footprint.
    fn cut_clears_destination(
        &self,
        node: &CorridorNode,
        axis: CutAxis,
        cut: f64,
        catalog: &Catalog,
    ) -> Result<bool> {
        let Some(destination) = &node.destination else {
            return Ok(true);
        };
        let radius = catalog.external_radius(destination.diameter)?;
        let center = match axis {
            CutAxis::X => destination.point.x,
            CutAxis::Y => destination.point.y,
        };
        Ok(cut < center - radius || cut > center + radius)
    }

    /// Split `node_id` along the vertical line `x = cut`; the old node keeps
    /// the left half, a new node takes the right half.
    fn separate_node_x(&mut self, node_id: NodeId, cut: f64) {
        let new_id = self.generate_node_id();
        let old = self.node(node_id);
        let mut new_node = CorridorNode::new(new_id, cut, old.right, old.bottom, old.top);

        // The far (right) side transfers wholesale.
        new_node.right_neighbors = old.right_neighbors.clone();
        new_node.left_neighbors.push(node_id);
        let right_ids = old.right_neighbors.clone();
        let bottom_ids = old.bottom_neighbors.clone();
        let top_ids = old.top_neighbors.clone();

        for id in right_ids {
            replace_id(&mut self.node_mut(id).left_neighbors, node_id, new_id);
        }

        // Perpendicular sides are assigned to each half by positive-length
        // overlap; a neighbor straddling the cut stays listed by both halves.
        for id in bottom_ids {
            let neighbor = self.node(id);
            let (neighbor_left, neighbor_right) = (neighbor.left, neighbor.right);
            if neighbor_right > cut {
                new_node.bottom_neighbors.push(id);
                self.node_mut(id).top_neighbors.push(new_id);
            }
            if neighbor_left >= cut {
                self.node_mut(node_id).bottom_neighbors.retain(|n| *n != id);
                self.node_mut(id).top_neighbors.retain(|n| *n != node_id);
            }
        }
        for id in top_ids {
            let neighbor = self.node(id);
            let (neighbor_left, neighbor_right) = (neighbor.left, neighbor.right);
            if neighbor_right > cut {
                new_node.top_neighbors.push(id);
                self.node_mut(id).bottom_neighbors.push(new_id);
            }
            if neighbor_left >= cut {
                self.node_mut(node_id).top_neighbors.retain(|n| *n != id);
                self.node_mut(id).bottom_neighbors.retain(|n| *n != node_id);
            }
        }

        let old = self.node_mut(node_id);
        old.right = cut;
        old.right_neighbors = vec![new_id];

        let (stay, moved): (Vec<_>, Vec<_>) = old
            .sources
            .drain(..)
            .partition(|attached| attached.entry_point.x <= cut);
        old.sources = stay;
        new_node.sources = moved;

        if old
            .destination
            .as_ref()
            .is_some_and(|destination| destination.point.x > cut)
        {
            new_node.destination = old.destination.take();
        }

        self.index.insert(new_id, self.nodes.len());
        self.nodes.push(new_node);
    }

    /// Split `node_id` along the horizontal line `y = cut`; the old node
    /// keeps the bottom half, a new node takes the top half.
    fn separate_node_y(&mut self, node_id: NodeId, cut: f64) {
        let new_id = self.generate_node_id();
        let old = self.node(node_id);
        let mut new_node = CorridorNode::new(new_id, old.left, old.right, cut, old.top);

        new_node.top_neighbors = old.top_neighbors.clone();
        new_node.bottom_neighbors.push(node_id);
        let top_ids = old.top_neighbors.clone();
        let left_ids = old.left_neighbors.clone();
        let right_ids = old.right_neighbors.clone();

        for id in top_ids {
            replace_id(&mut self.node_mut(id).bottom_neighbors, node_id, new_id);
        }

        for id in left_ids {
            let neighbor = self.node(id);
            let (neighbor_bottom, neighbor_top) = (neighbor.bottom, neighbor.top);
            if neighbor_top > cut {
                new_node.left_neighbors.push(id);
                self.node_mut(id).right_neighbors.push(new_id);
            }
            if neighbor_bottom >= cut {
                self.node_mut(node_id).left_neighbors.retain(|n| *n != id);
                self.node_mut(id).right_neighbors.retain(|n| *n != node_id);
            }
        }
        for id in right_ids {
            let neighbor = self.node(id);
            let (neighbor_bottom, neighbor_top) = (neighbor.bottom, neighbor.top);
            if neighbor_top > cut {
                new_node.right_neighbors.push(id);
                self.node_mut(id).left_neighbors.push(new_id);
            }
            if neighbor_bottom >= cut {
                self.node_mut(node_id).right_neighbors.retain(|n| *n != id);
                self.node_mut(id).left_neighbors.retain(|n| *n != node_id);
            }
        }

        let old = self.node_mut(node_id);
        old.top = cut;
        old.top_neighbors = vec![new_id];

        let (stay, moved): (Vec<_>, Vec<_>) = old
            .sources
            .drain(..)
            .partition(|attached| attached.entry_point.y <= cut);
        old.sources = stay;
        new_node.sources = moved;

        if old
            .destination
            .as_ref()
            .is_some_and(|destination| destination.point.y > cut)
        {
            new_node.destination = old.destination.take();
        }

        self.index.insert(new_id, self.nodes.len());
        self.nodes.push(new_node);
    }

    fn recalculate_destination_node(&mut self) {
        self.destination_node = self
            .nodes
            .iter()
            .find(|node| node.destination.is_some())
            .map(|node| node.id);
    }
}

/// Sorted distinct values of an f64 sequence.
fn distinct_sorted(values: impl Iterator<Item = f64>) -> Vec<f64> {
    let mut values: Vec<f64> = values.collect();
    values.sort_by(f64::total_cmp);
    values.dedup();
    values
}

fn replace_id(list: &mut [NodeId], from: NodeId, to: NodeId) {
    if let Some(slot) = list.iter_mut().find(|id| **id == from) {
        *slot = to;
    }
}
