use crate::domain::{Motorcycle, MotorcycleId, Movement, Sector, SpotId};
use crate::error::{Result, YardError};
use crate::store::{ChangeSet, YardRepository};

/// Move a motorcycle to `new_spot_id`, or release its spot when `None`.
///
/// # Algorithm
/// 1. Load the motorcycle (`NotFound` if absent)
/// 2. If it holds a spot, find that spot's sector by spot id and free the spot
/// 3. If a target is given, find its sector by spot id (`NotFound` if no
///    sector owns it) and park the motorcycle there (`OccupancyConflict` if
///    another motorcycle holds it)
/// 4. Point the motorcycle at the new spot
///
/// Both sectors and the motorcycle are committed together. Moving within one
/// sector stages that sector once with both edits applied.
pub fn relocate_motorcycle<R: YardRepository + ?Sized>(
    repo: &R,
    motorcycle_id: MotorcycleId,
    new_spot_id: Option<SpotId>,
) -> Result<Motorcycle> {
    let mut motorcycle = repo
        .find_motorcycle_by_id(motorcycle_id)?
        .ok_or_else(|| YardError::not_found("motorcycle", motorcycle_id))?;

    let mut changes = ChangeSet::new();
    stage_relocation(repo, &mut changes, &mut motorcycle, new_spot_id)?;
    changes.put_motorcycle(motorcycle);
    repo.commit(changes)?;

    repo.find_motorcycle_by_id(motorcycle_id)?
        .ok_or_else(|| YardError::not_found("motorcycle", motorcycle_id))
}

/// Stage the spot-side edits of a relocation and update `motorcycle` in place.
///
/// The caller is responsible for putting `motorcycle` into `changes` and
/// committing.
pub(crate) fn stage_relocation<R: YardRepository + ?Sized>(
    repo: &R,
    changes: &mut ChangeSet,
    motorcycle: &mut Motorcycle,
    new_spot_id: Option<SpotId>,
) -> Result<()> {
    let previous = motorcycle.spot_id();

    if let Some(old_spot_id) = previous {
        let mut sector = sector_owning(repo, changes, old_spot_id)?.ok_or_else(|| {
            YardError::ConsistencyViolation(format!(
                "motorcycle {} points at spot {} which no sector owns",
                motorcycle.id(),
                old_spot_id
            ))
        })?;

        let spot = sector.spot_mut(old_spot_id).ok_or_else(|| {
            YardError::ConsistencyViolation(format!(
                "spot {} is indexed but missing from its sector",
                old_spot_id
            ))
        })?;
        if spot.occupant() != Some(motorcycle.id()) {
            return Err(YardError::ConsistencyViolation(format!(
                "motorcycle {} points at spot {} but the spot holds {:?}",
                motorcycle.id(),
                old_spot_id,
                spot.occupant()
            )));
        }
        spot.release();
        changes.put_sector(sector);
    }

    if let Some(target) = new_spot_id {
        let mut sector = sector_owning(repo, changes, target)?
            .ok_or_else(|| YardError::not_found("spot", target))?;
        let spot = sector
            .spot_mut(target)
            .ok_or_else(|| YardError::not_found("spot", target))?;
        spot.assign_motorcycle(motorcycle.id())?;
        changes.put_sector(sector);
    }

    motorcycle.set_spot(new_spot_id);

    if let (Some(from), Some(to)) = (previous, new_spot_id)
        && from != to
    {
        changes.record_movement(Movement::new(motorcycle.id(), from, to));
    }

    Ok(())
}

/// Owning sector of `spot_id`, preferring a copy already staged in `changes`
fn sector_owning<R: YardRepository + ?Sized>(
    repo: &R,
    changes: &ChangeSet,
    spot_id: SpotId,
) -> Result<Option<Sector>> {
    if let Some(staged) = changes.sectors.iter().find(|s| s.contains_spot(spot_id)) {
        return Ok(Some(staged.clone()));
    }
    repo.find_sector_by_spot_id(spot_id)
}
