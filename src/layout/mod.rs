pub mod grid;

pub use grid::{Grid, MAX_GRID_CELLS, generate_spots};
