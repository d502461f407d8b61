use geo::{Area, Contains, LineString, Polygon};
use serde::{Deserialize, Serialize};

use super::Bounds;

/// An ordered vertex of a sector or yard boundary
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PolygonPoint {
    /// Position in the winding sequence
    pub order: i32,
    pub x: f64,
    pub y: f64,
}

impl PolygonPoint {
    pub fn new(order: i32, x: f64, y: f64) -> Self {
        Self { order, x, y }
    }
}

/// Even-odd ray casting test.
///
/// Casts a ray from `(x, y)` towards +x and counts the edges it crosses.
/// An edge `(p1, p2)` counts when `y` lies in the half-open span between the
/// two endpoint heights (`p.y > y` on exactly one side) and the edge's
/// intercept at height `y` is strictly greater than `x`.
///
/// Points lying exactly on the boundary follow the same half-open rule, so the
/// answer is deterministic: for an axis-aligned rectangle the bottom and left
/// edges count as inside and the top and right edges as outside.
///
/// Fewer than 3 vertices never form a polygon and always yield `false`.
pub fn is_point_inside_polygon(x: f64, y: f64, boundary: &[PolygonPoint]) -> bool {
    let n = boundary.len();
    if n < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let pi = boundary[i];
        let pj = boundary[j];

        if (pi.y > y) != (pj.y > y) {
            // pi.y != pj.y here, so the division is well defined
            let x_cross = (pj.x - pi.x) * (y - pi.y) / (pj.y - pi.y) + pi.x;
            if x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }

    inside
}

/// Ordered, implicitly closed vertex sequence (last joins back to first)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Boundary {
    points: Vec<PolygonPoint>,
}

impl Boundary {
    pub fn new(points: Vec<PolygonPoint>) -> Self {
        Self { points }
    }

    /// Build a boundary from plain coordinates, numbering vertices in sequence
    pub fn from_coords(coords: &[(f64, f64)]) -> Self {
        let points = coords
            .iter()
            .enumerate()
            .map(|(i, &(x, y))| PolygonPoint::new(i as i32, x, y))
            .collect();
        Self { points }
    }

    /// Append vertices, keeping the caller's order. Simplicity is not checked.
    pub fn extend(&mut self, points: impl IntoIterator<Item = PolygonPoint>) {
        self.points.extend(points);
    }

    pub fn points(&self) -> &[PolygonPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn is_polygon(&self) -> bool {
        self.points.len() >= 3
    }

    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::from_points(&self.points)
    }

    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        is_point_inside_polygon(x, y, &self.points)
    }

    /// Convert to a closed `geo` polygon, or `None` for fewer than 3 vertices
    pub fn to_geo(&self) -> Option<Polygon<f64>> {
        if !self.is_polygon() {
            return None;
        }

        let ring: LineString<f64> = self
            .points
            .iter()
            .map(|p| geo::coord! { x: p.x, y: p.y })
            .collect();

        // geo closes the exterior ring itself
        Some(Polygon::new(ring, vec![]))
    }

    /// Enclosed area; zero for degenerate boundaries
    pub fn area(&self) -> f64 {
        self.to_geo().map(|p| p.unsigned_area()).unwrap_or(0.0)
    }

    /// Whether `inner` lies entirely within this boundary (shared edges allowed)
    pub fn encloses(&self, inner: &Boundary) -> bool {
        match (self.to_geo(), inner.to_geo()) {
            (Some(outer), Some(inner)) => outer.contains(&inner),
            _ => false,
        }
    }
}
