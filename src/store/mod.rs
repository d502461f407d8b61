//! Persistence seam
//!
//! The workflows in [`crate::ops`] only talk to a [`YardRepository`]. Every
//! write goes through [`YardRepository::commit`], which applies a whole
//! [`ChangeSet`] or nothing.

pub mod changes;
pub mod memory;
pub mod snapshot;

pub use changes::ChangeSet;
pub use memory::MemoryStore;
pub use snapshot::Snapshot;

use crate::domain::{
    Motorcycle, MotorcycleId, Sector, SectorId, SectorType, SectorTypeId, SpotId, Yard, YardId,
};
use crate::error::Result;

/// Lookup and persistence capabilities the core consumes.
///
/// Calls are synchronous and fallible. Implementations own any retry policy;
/// the core never retries.
pub trait YardRepository {
    fn find_motorcycle_by_id(&self, id: MotorcycleId) -> Result<Option<Motorcycle>>;

    fn find_sector_by_id(&self, id: SectorId) -> Result<Option<Sector>>;

    /// Resolve which sector owns an arbitrary spot id
    fn find_sector_by_spot_id(&self, spot_id: SpotId) -> Result<Option<Sector>>;

    fn find_yard_by_id(&self, id: YardId) -> Result<Option<Yard>>;

    fn find_sector_type_by_id(&self, id: SectorTypeId) -> Result<Option<SectorType>>;

    /// Apply every change atomically.
    ///
    /// Fails with `ConcurrentModification` if any written aggregate's version
    /// no longer matches the stored one, and with `ConsistencyViolation` if
    /// the result would break motorcycle/spot agreement.
    fn commit(&self, changes: ChangeSet) -> Result<()>;

    fn save_sector(&self, sector: Sector) -> Result<()> {
        let mut changes = ChangeSet::new();
        changes.put_sector(sector);
        self.commit(changes)
    }

    fn save_motorcycle(&self, motorcycle: Motorcycle) -> Result<()> {
        let mut changes = ChangeSet::new();
        changes.put_motorcycle(motorcycle);
        self.commit(changes)
    }
}
