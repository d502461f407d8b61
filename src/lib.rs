//! yardgrid - Sector geometry, spot grids and motorcycle placement for vehicle yards

pub mod config;
pub mod domain;
pub mod error;
pub mod geometry;
pub mod layout;
pub mod ops;
pub mod store;

pub use error::{Result, YardError};
pub use geometry::{PolygonPoint, is_point_inside_polygon};
pub use layout::generate_spots;
pub use ops::relocate_motorcycle;
pub use store::{MemoryStore, YardRepository};
