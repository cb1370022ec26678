use crate::catalog::{Catalog, PipeRef};
use crate::error::Result;
use crate::geometry::{solver, Point};

/// Kind tag of a laid object, mirroring the catalog's closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackKind {
    Direct,
    Fan,
    Reduction,
    Angle,
    Tee,
    Cross,
}

impl TrackKind {
    /// Whether the object is a straight run (direct or fan pipe).
    pub fn is_run(self) -> bool {
        matches!(self, TrackKind::Direct | TrackKind::Fan)
    }
}

/// One laid pipe object of the track.
///
/// `start` and `end` are the centers of the object's two ends in mm. The 2D
/// router only creates [`TrackKind::Direct`] nodes; the other kinds exist for
/// the downstream 3D realization. `next`/`parent` record tree topology but
/// the 2D router appends leaves without linking them.
#[derive(Debug, Clone)]
pub struct TrackNode {
    pub kind: TrackKind,
    pub object: PipeRef,
    pub start: Point,
    pub end: Point,
    pub diameter: u32,
    pub next: Option<usize>,
    pub parent: Option<usize>,
}

impl TrackNode {
    /// Cost of this node: unit cost times 2D length for runs, the per-piece
    /// cost for fittings.
    pub fn cost(&self, catalog: &Catalog) -> f64 {
        let object = catalog.object(self.object);
        if self.kind.is_run() {
            object.cost * (self.end - self.start).length()
        } else {
            object.cost
        }
    }

    /// The point of this run's axis segment closest to `point` in 2D.
    ///
    /// The point is projected perpendicularly onto the axis line and clamped
    /// to the segment; z is ignored throughout. Returns `None` for fittings,
    /// which have no axis segment in this representation.
    pub fn nearest_center_point_2d(&self, point: Point) -> Option<Point> {
        if !self.kind.is_run() {
            return None;
        }

        let a = self.start.flattened();
        let b = self.end.flattened();
        let direction = b - a;
        let target = point.flattened();

        // Perpendicular foot of `target` on the axis line: the line equation,
        // the Oxy plane, and the normal-plane equation through `target`.
        let projection = solver::solve_3x3(
            direction.y,
            -direction.x,
            0.0,
            direction.y * a.x - direction.x * a.y,
            0.0,
            0.0,
            1.0,
            0.0,
            direction.x,
            direction.y,
            direction.z,
            direction.dot(target),
        );
        let Some(projection) = projection else {
            // Zero-length segment; its only point is the answer.
            return Some(a);
        };

        let t = (projection - a).dot(direction) / direction.dot(direction);
        Some(a + direction * t.clamp(0.0, 1.0))
    }

    /// Whether this node's 2D footprint intersects the axis-aligned rectangle.
    ///
    /// The footprint is the axis segment extruded to the pipe's external
    /// diameter. Boundary tangency does not count as intersection.
    pub fn footprint_intersects(
        &self,
        catalog: &Catalog,
        left: f64,
        right: f64,
        bottom: f64,
        top: f64,
    ) -> Result<bool> {
        let width = f64::from(catalog.external_diameter(self.diameter)?);
        Ok(oriented_rect_intersects_aabb(
            self.start.flattened(),
            self.end.flattened(),
            width,
            left,
            right,
            bottom,
            top,
        ))
    }
}

/// Whether the rectangle of the given axis segment and width intersects the
/// axis-aligned rectangle `[left, right] x [bottom, top]`. Tangent contact is
/// not an intersection.
pub(crate) fn oriented_rect_intersects_aabb(
    start: Point,
    end: Point,
    width: f64,
    left: f64,
    right: f64,
    bottom: f64,
    top: f64,
) -> bool {
    let direction = end - start;

    if direction.x == 0.0 || direction.y == 0.0 {
        // Axis-aligned footprint: plain open-interval AABB overlap.
        let (own_left, own_right, own_bottom, own_top) = if direction.x == 0.0 {
            (
                start.x - width / 2.0,
                start.x + width / 2.0,
                start.y.min(end.y),
                start.y.max(end.y),
            )
        } else {
            (
                start.x.min(end.x),
                start.x.max(end.x),
                start.y - width / 2.0,
                start.y + width / 2.0,
            )
        };
        return !(own_left >= right || own_right <= left || own_bottom >= top || own_top <= bottom);
    }

    // Skew footprint. Quick reject on the enlarged AABB first.
    let reserve_left = start.x.min(end.x) - width;
    let reserve_right = start.x.max(end.x) + width;
    let reserve_bottom = start.y.min(end.y) - width;
    let reserve_top = start.y.max(end.y) + width;
    if reserve_left >= right || reserve_right <= left || reserve_bottom >= top || reserve_top <= bottom
    {
        return false;
    }

    // The rectangles intersect iff some pair of their edges crosses.
    let half_normal = normal_2d(direction) * (width / 2.0);
    let own_edges = [
        (start + half_normal, start - half_normal),
        (end + half_normal, end - half_normal),
        (start + half_normal, end + half_normal),
        (start - half_normal, end - half_normal),
    ];
    let aabb_edges = [
        (Point::new(left, bottom, 0.0), Point::new(left, top, 0.0)),
        (Point::new(right, bottom, 0.0), Point::new(right, top, 0.0)),
        (Point::new(left, bottom, 0.0), Point::new(right, bottom, 0.0)),
        (Point::new(left, top, 0.0), Point::new(right, top, 0.0)),
    ];

    for (a1, a2) in own_edges {
        for (b1, b2) in aabb_edges {
            if segments_cross(a1, a2, b1, b2) {
                return true;
            }
        }
    }
    false
}

/// Unit normal of a nonzero 2D vector.
fn normal_2d(vector: Point) -> Point {
    Point::new(-vector.y, vector.x, 0.0).normalized()
}

/// Whether two 2D segments cross with both intersection parameters strictly
/// inside `(0, 1)`. Touching endpoints and collinear overlap do not count.
fn segments_cross(a1: Point, a2: Point, b1: Point, b2: Point) -> bool {
    let da = a2 - a1;
    let db = b2 - b1;
    let e = b1 - a1;

    let det = db.x * da.y - da.x * db.y;
    if det == 0.0 {
        return false;
    }
    let t = (db.x * e.y - db.y * e.x) / det;
    let u = (da.x * e.y - da.y * e.x) / det;
    0.0 < t && t < 1.0 && 0.0 < u && u < 1.0
}
