use crate::connections::WaterDestination;
use crate::geometry::Point;

/// Identifier of a corridor node, assigned by the owning graph.
pub type NodeId = u32;

/// A water source attached to a corridor node.
#[derive(Debug, Clone)]
pub struct AttachedSource {
    /// Index of the source in the problem's source list.
    pub source: usize,
    /// The source's attachment coordinate snapped inside the node by half the
    /// pipe's external diameter.
    pub entry_point: Point,
}

/// One axis-aligned rectangular region pipes may pass through.
///
/// Neighbor lists hold the ids of nodes sharing a positive-length edge on the
/// respective side. All coordinates are millimetres; `left < right` and
/// `bottom < top` always hold.
#[derive(Debug, Clone)]
pub struct CorridorNode {
    pub id: NodeId,
    pub left: f64,
    pub right: f64,
    pub bottom: f64,
    pub top: f64,
    pub left_neighbors: Vec<NodeId>,
    pub right_neighbors: Vec<NodeId>,
    pub bottom_neighbors: Vec<NodeId>,
    pub top_neighbors: Vec<NodeId>,
    pub sources: Vec<AttachedSource>,
    /// The destination, if it is attached to this node.
    pub destination: Option<WaterDestination>,
}

impl CorridorNode {
    pub(crate) fn new(id: NodeId, left: f64, right: f64, bottom: f64, top: f64) -> Self {
        Self {
            id,
            left,
            right,
            bottom,
            top,
            left_neighbors: Vec::new(),
            right_neighbors: Vec::new(),
            bottom_neighbors: Vec::new(),
            top_neighbors: Vec::new(),
            sources: Vec::new(),
            destination: None,
        }
    }

    /// Extent along the X axis.
    pub fn size_x(&self) -> f64 {
        self.right - self.left
    }

    /// Extent along the Y axis.
    pub fn size_y(&self) -> f64 {
        self.top - self.bottom
    }

    /// Human-readable bounds, used in error messages.
    pub fn position_str(&self) -> String {
        format!(
            "(left: {}, right: {}, bottom: {}, top: {})",
            self.left, self.right, self.bottom, self.top
        )
    }

    /// The point of this node closest to `point`, on the Oxy plane.
    pub fn closest_point(&self, point: Point) -> Point {
        Point::new(
            point.x.clamp(self.left, self.right),
            point.y.clamp(self.bottom, self.top),
            0.0,
        )
    }

    /// Whether the node contains `point` (boundary included, z ignored).
    pub fn contains_point(&self, point: Point) -> bool {
        self.left <= point.x && point.x <= self.right && self.bottom <= point.y && point.y <= self.top
    }

    /// Whether the node fully contains the given rectangle.
    pub fn contains_rect(&self, left: f64, right: f64, bottom: f64, top: f64) -> bool {
        self.left <= left && right <= self.right && self.bottom <= bottom && top <= self.top
    }

    /// Whether the closures of the two nodes intersect (edge contact counts).
    pub fn touches(&self, other: &CorridorNode) -> bool {
        !(self.left > other.right
            || self.right < other.left
            || self.bottom > other.top
            || self.top < other.bottom)
    }

    /// Whether the two nodes overlap with positive area.
    pub fn overlaps_area(&self, other: &CorridorNode) -> bool {
        !(self.left >= other.right
            || self.right <= other.left
            || self.bottom >= other.top
            || self.top <= other.bottom)
    }

    /// Ids of all adjacent nodes: left, right, bottom, then top neighbors.
    ///
    /// This order is the path-enumeration order, so it must stay stable.
    pub fn adjacent(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.left_neighbors
            .iter()
            .chain(&self.right_neighbors)
            .chain(&self.bottom_neighbors)
            .chain(&self.top_neighbors)
            .copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(left: f64, right: f64, bottom: f64, top: f64) -> CorridorNode {
        CorridorNode::new(1, left, right, bottom, top)
    }

    #[test]
    fn sizes() {
        let n = node(0.0, 300.0, 100.0, 1100.0);
        assert_eq!(n.size_x(), 300.0);
        assert_eq!(n.size_y(), 1000.0);
    }

    #[test]
    fn closest_point_clamps_and_flattens() {
        let n = node(0.0, 100.0, 0.0, 100.0);
        assert_eq!(
            n.closest_point(Point::new(150.0, -20.0, 5.0)),
            Point::new(100.0, 0.0, 0.0)
        );
        assert_eq!(
            n.closest_point(Point::new(40.0, 60.0, 5.0)),
            Point::new(40.0, 60.0, 0.0)
        );
    }

    #[test]
    fn containment_is_boundary_inclusive() {
        let n = node(0.0, 100.0, 0.0, 100.0);
        assert!(n.contains_point(Point::new(0.0, 100.0, 0.0)));
        assert!(!n.contains_point(Point::new(-0.1, 50.0, 0.0)));
        assert!(n.contains_rect(0.0, 100.0, 0.0, 100.0));
        assert!(!n.contains_rect(-1.0, 100.0, 0.0, 100.0));
    }

    #[test]
    fn touch_versus_area_overlap() {
        let a = node(0.0, 100.0, 0.0, 100.0);
        let edge = node(100.0, 200.0, 0.0, 100.0);
        let apart = node(101.0, 200.0, 0.0, 100.0);
        assert!(a.touches(&edge));
        assert!(!a.overlaps_area(&edge));
        assert!(!a.touches(&apart));

        let overlapping = node(50.0, 150.0, 50.0, 150.0);
        assert!(a.overlaps_area(&overlapping));
    }

    #[test]
    fn adjacent_iterates_sides_in_order() {
        let mut n = node(0.0, 100.0, 0.0, 100.0);
        n.left_neighbors = vec![2];
        n.right_neighbors = vec![3, 4];
        n.bottom_neighbors = vec![5];
        n.top_neighbors = vec![6];
        let order: Vec<NodeId> = n.adjacent().collect();
        assert_eq!(order, vec![2, 3, 4, 5, 6]);
    }
}
