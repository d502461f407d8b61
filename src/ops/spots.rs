use crate::domain::{SectorId, Spot};
use crate::error::{Result, YardError};
use crate::layout::generate_spots;
use crate::store::YardRepository;

/// What to do with a sector's existing spots when generating again
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GenerationMode {
    /// Keep existing spots; skip grid nodes already taken by one
    #[default]
    Append,
    /// Discard the current set first (refused while any spot is occupied)
    Replace,
}

/// Generate spots for a stored sector and persist them with it.
///
/// Returns only the spots created by this call. Concurrent calls against the
/// same sector are serialized by the sector version: the slower one fails
/// with `ConcurrentModification` instead of adding an overlapping set.
pub fn generate_sector_spots<R: YardRepository + ?Sized>(
    repo: &R,
    sector_id: SectorId,
    width: f64,
    height: f64,
    mode: GenerationMode,
) -> Result<Vec<Spot>> {
    let mut sector = repo
        .find_sector_by_id(sector_id)?
        .ok_or_else(|| YardError::not_found("sector", sector_id))?;

    if mode == GenerationMode::Replace {
        sector.clear_spots()?;
    }

    let spots: Vec<Spot> = generate_spots(&sector, width, height)?
        .into_iter()
        .filter(|s| !sector.has_spot_at(s.x(), s.y()))
        .collect();

    sector.add_spots(spots.clone())?;
    repo.save_sector(sector)?;
    Ok(spots)
}
