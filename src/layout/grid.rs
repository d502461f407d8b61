//! Grid-based spot layout
//!
//! A sector is covered by a row/column grid anchored at the minimum corner of
//! its bounding box. Every grid node that passes the point-in-polygon test
//! becomes one spot.

use crate::domain::{Sector, Spot};
use crate::error::{Result, YardError};
use crate::geometry::{Bounds, is_point_inside_polygon};

/// Upper bound on candidate nodes for a single generation call
pub const MAX_GRID_CELLS: usize = 1_000_000;

/// Candidate grid over a bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grid {
    pub origin_x: f64,
    pub origin_y: f64,
    pub step_x: f64,
    pub step_y: f64,
    pub cols: usize,
    pub rows: usize,
}

impl Grid {
    /// Lay a grid of `width` x `height` cells over `bounds`.
    ///
    /// `cols = floor(bounds.width / width) + 1`, likewise for rows, so even a
    /// zero-extent box yields one node.
    pub fn new(bounds: &Bounds, width: f64, height: f64) -> Result<Self> {
        validate_footprint(width, height)?;

        let cols = axis_count(bounds.width(), width, "x")?;
        let rows = axis_count(bounds.height(), height, "y")?;

        if cols.saturating_mul(rows) > MAX_GRID_CELLS {
            return Err(YardError::InvalidGeometry(format!(
                "footprint {}x{} produces {}x{} grid nodes (limit {})",
                width, height, cols, rows, MAX_GRID_CELLS
            )));
        }

        Ok(Self {
            origin_x: bounds.min_x,
            origin_y: bounds.min_y,
            step_x: width,
            step_y: height,
            cols,
            rows,
        })
    }

    /// Node `(i, j)`; the step is applied as `origin + i * step` so no
    /// error accumulates across rows or columns
    pub fn node(&self, i: usize, j: usize) -> (f64, f64) {
        (
            self.origin_x + i as f64 * self.step_x,
            self.origin_y + j as f64 * self.step_y,
        )
    }

    /// All nodes, column by column
    pub fn nodes(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        (0..self.cols).flat_map(move |i| (0..self.rows).map(move |j| self.node(i, j)))
    }
}

fn validate_footprint(width: f64, height: f64) -> Result<()> {
    if !(width.is_finite() && width > 0.0 && height.is_finite() && height > 0.0) {
        return Err(YardError::InvalidGeometry(format!(
            "spot footprint must be positive and finite, got {}x{}",
            width, height
        )));
    }
    Ok(())
}

fn axis_count(extent: f64, step: f64, axis: &str) -> Result<usize> {
    let cells = (extent / step).floor();
    if !cells.is_finite() || cells < 0.0 || cells >= MAX_GRID_CELLS as f64 {
        return Err(YardError::InvalidGeometry(format!(
            "cannot lay out {} axis: extent {} with step {}",
            axis, extent, step
        )));
    }
    Ok(cells as usize + 1)
}

/// Generate available spots for every grid node inside the sector boundary.
///
/// Pure: the sector is not modified; the caller decides whether to register
/// the spots with [`Sector::add_spots`]. Output order is deterministic
/// (column-major from the bounding-box minimum).
///
/// # Errors
/// * `InvalidGeometry` if the boundary has fewer than 3 points or the
///   footprint is not positive
pub fn generate_spots(sector: &Sector, width: f64, height: f64) -> Result<Vec<Spot>> {
    validate_footprint(width, height)?;

    let boundary = sector.boundary();
    if !boundary.is_polygon() {
        return Err(YardError::InvalidGeometry(format!(
            "sector {} boundary has {} point(s), at least 3 are required",
            sector.id(),
            boundary.len()
        )));
    }

    let bounds = boundary.bounds().ok_or_else(|| {
        YardError::InvalidGeometry(format!("sector {} boundary is empty", sector.id()))
    })?;
    let grid = Grid::new(&bounds, width, height)?;

    let spots = grid
        .nodes()
        .filter(|&(x, y)| is_point_inside_polygon(x, y, boundary.points()))
        .map(|(x, y)| Spot::new(sector.id(), x, y))
        .collect();

    Ok(spots)
}
