use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::{SectorId, SectorTypeId, Spot, SpotId, YardId};
use crate::error::{Result, YardError};
use crate::geometry::{Boundary, PolygonPoint};

/// A polygonal region of a yard. Owns its spots exclusively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sector {
    id: SectorId,
    yard_id: YardId,
    sector_type_id: SectorTypeId,
    boundary: Boundary,
    spots: Vec<Spot>,
    /// Optimistic concurrency token, bumped by the store on every commit
    #[serde(default)]
    version: u64,
}

impl Sector {
    /// An empty sector with no boundary and no spots
    pub fn new(yard_id: YardId, sector_type_id: SectorTypeId) -> Self {
        Self {
            id: SectorId::new(),
            yard_id,
            sector_type_id,
            boundary: Boundary::default(),
            spots: Vec::new(),
            version: 0,
        }
    }

    pub fn id(&self) -> SectorId {
        self.id
    }

    pub fn yard_id(&self) -> YardId {
        self.yard_id
    }

    pub fn sector_type_id(&self) -> SectorTypeId {
        self.sector_type_id
    }

    pub fn set_sector_type(&mut self, sector_type_id: SectorTypeId) {
        self.sector_type_id = sector_type_id;
    }

    pub fn boundary(&self) -> &Boundary {
        &self.boundary
    }

    pub fn spots(&self) -> &[Spot] {
        &self.spots
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub(crate) fn set_version(&mut self, version: u64) {
        self.version = version;
    }

    /// Append boundary vertices in the given order
    pub fn add_points(&mut self, points: impl IntoIterator<Item = PolygonPoint>) {
        self.boundary.extend(points);
    }

    /// Take ownership of generated spots.
    ///
    /// Rejects the whole batch if any spot belongs to another sector or
    /// repeats an id this sector already holds.
    pub fn add_spots(&mut self, spots: Vec<Spot>) -> Result<()> {
        let mut seen: HashSet<SpotId> = self.spots.iter().map(Spot::id).collect();

        for spot in &spots {
            if spot.sector_id() != self.id {
                return Err(YardError::ConsistencyViolation(format!(
                    "spot {} belongs to sector {}, not {}",
                    spot.id(),
                    spot.sector_id(),
                    self.id
                )));
            }
            if !seen.insert(spot.id()) {
                return Err(YardError::ConsistencyViolation(format!(
                    "spot {} is already registered in sector {}",
                    spot.id(),
                    self.id
                )));
            }
        }

        self.spots.extend(spots);
        Ok(())
    }

    pub fn spot(&self, id: SpotId) -> Option<&Spot> {
        self.spots.iter().find(|s| s.id() == id)
    }

    pub fn spot_mut(&mut self, id: SpotId) -> Option<&mut Spot> {
        self.spots.iter_mut().find(|s| s.id() == id)
    }

    pub fn contains_spot(&self, id: SpotId) -> bool {
        self.spot(id).is_some()
    }

    pub fn has_spot_at(&self, x: f64, y: f64) -> bool {
        self.spots.iter().any(|s| s.x() == x && s.y() == y)
    }

    pub fn occupied_count(&self) -> usize {
        self.spots.iter().filter(|s| s.is_occupied()).count()
    }

    pub fn available_count(&self) -> usize {
        self.spots.len() - self.occupied_count()
    }

    /// Discard the whole spot set. Refused while any spot is occupied.
    pub fn clear_spots(&mut self) -> Result<Vec<Spot>> {
        let occupied = self.occupied_count();
        if occupied > 0 {
            return Err(YardError::SectorInUse {
                sector: self.id,
                occupied,
            });
        }
        Ok(std::mem::take(&mut self.spots))
    }
}
