pub mod bounds;
pub mod polygon;

pub use bounds::Bounds;
pub use polygon::{Boundary, PolygonPoint, is_point_inside_polygon};
