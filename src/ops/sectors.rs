use crate::domain::{Sector, SectorId, SectorType, SectorTypeId, Yard, YardId};
use crate::error::{Result, YardError};
use crate::geometry::{Boundary, PolygonPoint};
use crate::store::{ChangeSet, YardRepository};

pub fn create_yard<R: YardRepository + ?Sized>(
    repo: &R,
    name: &str,
    boundary: Boundary,
) -> Result<Yard> {
    if !boundary.is_polygon() {
        return Err(YardError::InvalidGeometry(format!(
            "yard boundary has {} point(s), at least 3 are required",
            boundary.len()
        )));
    }

    let yard = Yard::new(name, boundary)?;
    let mut changes = ChangeSet::new();
    changes.put_yard(yard.clone());
    repo.commit(changes)?;
    Ok(yard)
}

pub fn create_sector_type<R: YardRepository + ?Sized>(repo: &R, name: &str) -> Result<SectorType> {
    let sector_type = SectorType::new(name)?;
    let mut changes = ChangeSet::new();
    changes.put_sector_type(sector_type.clone());
    repo.commit(changes)?;
    Ok(sector_type)
}

/// Create a sector inside a yard. Spots are generated separately.
///
/// Points are sorted by their `order` before being joined into the boundary.
/// The boundary must lie within the yard's boundary.
pub fn create_sector<R: YardRepository + ?Sized>(
    repo: &R,
    yard_id: YardId,
    sector_type_id: SectorTypeId,
    mut points: Vec<PolygonPoint>,
) -> Result<Sector> {
    let yard = repo
        .find_yard_by_id(yard_id)?
        .ok_or_else(|| YardError::not_found("yard", yard_id))?;
    repo.find_sector_type_by_id(sector_type_id)?
        .ok_or_else(|| YardError::not_found("sector type", sector_type_id))?;

    if points.len() < 3 {
        return Err(YardError::InvalidGeometry(format!(
            "sector boundary has {} point(s), at least 3 are required",
            points.len()
        )));
    }
    points.sort_by_key(|p| p.order);

    let mut sector = Sector::new(yard_id, sector_type_id);
    sector.add_points(points);

    if yard.boundary().is_polygon() && !yard.boundary().encloses(sector.boundary()) {
        return Err(YardError::InvalidGeometry(format!(
            "sector boundary is not within yard {}",
            yard.name()
        )));
    }

    let id = sector.id();
    repo.save_sector(sector)?;
    repo.find_sector_by_id(id)?
        .ok_or_else(|| YardError::not_found("sector", id))
}

pub fn change_sector_type<R: YardRepository + ?Sized>(
    repo: &R,
    sector_id: SectorId,
    sector_type_id: SectorTypeId,
) -> Result<Sector> {
    let mut sector = repo
        .find_sector_by_id(sector_id)?
        .ok_or_else(|| YardError::not_found("sector", sector_id))?;
    repo.find_sector_type_by_id(sector_type_id)?
        .ok_or_else(|| YardError::not_found("sector type", sector_type_id))?;

    sector.set_sector_type(sector_type_id);
    repo.save_sector(sector)?;
    repo.find_sector_by_id(sector_id)?
        .ok_or_else(|| YardError::not_found("sector", sector_id))
}

/// Delete a sector together with its spots. Refused while any spot is occupied.
pub fn delete_sector<R: YardRepository + ?Sized>(repo: &R, sector_id: SectorId) -> Result<()> {
    let sector = repo
        .find_sector_by_id(sector_id)?
        .ok_or_else(|| YardError::not_found("sector", sector_id))?;

    let occupied = sector.occupied_count();
    if occupied > 0 {
        return Err(YardError::SectorInUse {
            sector: sector_id,
            occupied,
        });
    }

    let mut changes = ChangeSet::new();
    changes.delete_sector(&sector);
    repo.commit(changes)
}
