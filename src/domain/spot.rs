use serde::{Deserialize, Serialize};

use super::{MotorcycleId, SectorId, SpotId};
use crate::error::{Result, YardError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpotStatus {
    Available,
    Occupied,
}

/// A discrete parking location inside a sector.
///
/// `status` is `Occupied` exactly when an occupant is set. Both fields are
/// private and only change together through [`Spot::assign_motorcycle`] and
/// [`Spot::release`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spot {
    id: SpotId,
    sector_id: SectorId,
    x: f64,
    y: f64,
    status: SpotStatus,
    occupant: Option<MotorcycleId>,
}

impl Spot {
    /// A new, available spot owned by `sector_id`
    pub fn new(sector_id: SectorId, x: f64, y: f64) -> Self {
        Self {
            id: SpotId::new(),
            sector_id,
            x,
            y,
            status: SpotStatus::Available,
            occupant: None,
        }
    }

    pub fn id(&self) -> SpotId {
        self.id
    }

    /// Owning sector; fixed for the spot's lifetime
    pub fn sector_id(&self) -> SectorId {
        self.sector_id
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn status(&self) -> SpotStatus {
        self.status
    }

    pub fn occupant(&self) -> Option<MotorcycleId> {
        self.occupant
    }

    pub fn is_occupied(&self) -> bool {
        self.status == SpotStatus::Occupied
    }

    /// Park `motorcycle` here. Re-assigning the current occupant is a no-op.
    pub fn assign_motorcycle(&mut self, motorcycle: MotorcycleId) -> Result<()> {
        match self.occupant {
            Some(current) if current != motorcycle => Err(YardError::OccupancyConflict {
                spot: self.id,
                occupant: current,
            }),
            _ => {
                self.occupant = Some(motorcycle);
                self.status = SpotStatus::Occupied;
                Ok(())
            }
        }
    }

    /// Free the spot; idempotent
    pub fn release(&mut self) {
        self.occupant = None;
        self.status = SpotStatus::Available;
    }

    /// Status and occupant agree (checked on data loaded from outside)
    pub fn is_consistent(&self) -> bool {
        (self.status == SpotStatus::Occupied) == self.occupant.is_some()
    }
}
