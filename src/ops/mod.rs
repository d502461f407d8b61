//! Use cases over a [`YardRepository`](crate::store::YardRepository).
//!
//! Each operation stages its writes in one
//! [`ChangeSet`](crate::store::ChangeSet) and commits once, so a failure at
//! any step leaves the store untouched.

pub mod motorcycles;
pub mod relocation;
pub mod sectors;
pub mod spots;

#[cfg(test)]
pub(crate) mod testing;

pub use motorcycles::{create_motorcycle, delete_motorcycle, update_motorcycle};
pub use relocation::relocate_motorcycle;
pub use sectors::{change_sector_type, create_sector, create_sector_type, create_yard, delete_sector};
pub use spots::{GenerationMode, generate_sector_spots};
