use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::{ChangeSet, YardRepository};
use crate::domain::{
    Motorcycle, MotorcycleId, Movement, Sector, SectorId, SectorType, SectorTypeId, Spot, SpotId,
    Yard, YardId,
};
use crate::error::{Result, YardError};

/// In-memory aggregate store.
///
/// Keeps a `SpotId -> SectorId` index next to the sectors so that owning
/// sector lookups are O(1). All reads take a shared lock; a commit holds the
/// exclusive lock across validation and apply, so two commits never
/// interleave.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<StoreState>,
}

#[derive(Debug, Default, Clone)]
pub(crate) struct StoreState {
    pub(crate) yards: BTreeMap<YardId, Yard>,
    pub(crate) sector_types: BTreeMap<SectorTypeId, SectorType>,
    pub(crate) sectors: BTreeMap<SectorId, Sector>,
    pub(crate) motorcycles: BTreeMap<MotorcycleId, Motorcycle>,
    pub(crate) movements: Vec<Movement>,
    pub(crate) spot_index: HashMap<SpotId, SectorId>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_state(state: StoreState) -> Self {
        Self {
            state: RwLock::new(state),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, StoreState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, StoreState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn state_snapshot(&self) -> StoreState {
        self.read().clone()
    }

    pub fn yards(&self) -> Vec<Yard> {
        self.read().yards.values().cloned().collect()
    }

    pub fn sector_types(&self) -> Vec<SectorType> {
        self.read().sector_types.values().cloned().collect()
    }

    pub fn sectors(&self) -> Vec<Sector> {
        self.read().sectors.values().cloned().collect()
    }

    pub fn sectors_in_yard(&self, yard_id: YardId) -> Vec<Sector> {
        self.read()
            .sectors
            .values()
            .filter(|s| s.yard_id() == yard_id)
            .cloned()
            .collect()
    }

    pub fn motorcycles(&self) -> Vec<Motorcycle> {
        self.read().motorcycles.values().cloned().collect()
    }

    /// Movement log for one motorcycle, oldest first
    pub fn movements_for(&self, motorcycle_id: MotorcycleId) -> Vec<Movement> {
        self.read()
            .movements
            .iter()
            .filter(|m| m.motorcycle_id == motorcycle_id)
            .cloned()
            .collect()
    }

    pub fn spot_count(&self) -> usize {
        self.read().spot_index.len()
    }
}

impl YardRepository for MemoryStore {
    fn find_motorcycle_by_id(&self, id: MotorcycleId) -> Result<Option<Motorcycle>> {
        Ok(self.read().motorcycles.get(&id).cloned())
    }

    fn find_sector_by_id(&self, id: SectorId) -> Result<Option<Sector>> {
        Ok(self.read().sectors.get(&id).cloned())
    }

    fn find_sector_by_spot_id(&self, spot_id: SpotId) -> Result<Option<Sector>> {
        let state = self.read();
        Ok(state
            .spot_index
            .get(&spot_id)
            .and_then(|sector_id| state.sectors.get(sector_id))
            .cloned())
    }

    fn find_yard_by_id(&self, id: YardId) -> Result<Option<Yard>> {
        Ok(self.read().yards.get(&id).cloned())
    }

    fn find_sector_type_by_id(&self, id: SectorTypeId) -> Result<Option<SectorType>> {
        Ok(self.read().sector_types.get(&id).cloned())
    }

    fn commit(&self, changes: ChangeSet) -> Result<()> {
        if changes.is_empty() {
            return Ok(());
        }
        let mut state = self.write();

        state.check_versions(&changes)?;
        let index = state.staged_spot_index(&changes)?;
        Staged {
            state: &state,
            changes: &changes,
            index: &index,
        }
        .check_occupancy()?;

        state.apply(changes, index);
        Ok(())
    }
}

impl StoreState {
    /// Rebuild the spot index from scratch, rejecting spot ids claimed twice
    pub(crate) fn rebuild_index(&mut self) -> Result<()> {
        let mut index = HashMap::new();
        for sector in self.sectors.values() {
            index_sector(&mut index, sector)?;
        }
        self.spot_index = index;
        Ok(())
    }

    fn check_versions(&self, changes: &ChangeSet) -> Result<()> {
        for sector in &changes.sectors {
            let found = self.sectors.get(&sector.id()).map(Sector::version);
            check_version("sector", sector.id(), sector.version(), found)?;
        }
        for &(id, expected) in &changes.deleted_sectors {
            let found = self
                .sectors
                .get(&id)
                .map(Sector::version)
                .ok_or_else(|| YardError::not_found("sector", id))?;
            check_version("sector", id, expected, Some(found))?;
        }
        for motorcycle in &changes.motorcycles {
            let found = self
                .motorcycles
                .get(&motorcycle.id())
                .map(Motorcycle::version);
            check_version("motorcycle", motorcycle.id(), motorcycle.version(), found)?;
        }
        for &(id, expected) in &changes.deleted_motorcycles {
            let found = self
                .motorcycles
                .get(&id)
                .map(Motorcycle::version)
                .ok_or_else(|| YardError::not_found("motorcycle", id))?;
            check_version("motorcycle", id, expected, Some(found))?;
        }
        Ok(())
    }

    /// The spot index as it would look after the commit
    fn staged_spot_index(&self, changes: &ChangeSet) -> Result<HashMap<SpotId, SectorId>> {
        let mut index = self.spot_index.clone();

        let removed: Vec<SectorId> = changes
            .deleted_sectors
            .iter()
            .map(|&(id, _)| id)
            .chain(changes.sectors.iter().map(Sector::id))
            .collect();
        for sector_id in &removed {
            if let Some(stored) = self.sectors.get(sector_id) {
                for spot in stored.spots() {
                    index.remove(&spot.id());
                }
            }
        }

        for sector in &changes.sectors {
            index_sector(&mut index, sector)?;
        }
        Ok(index)
    }

    fn apply(&mut self, changes: ChangeSet, index: HashMap<SpotId, SectorId>) {
        for (id, _) in changes.deleted_sectors {
            self.sectors.remove(&id);
        }
        for (id, _) in changes.deleted_motorcycles {
            self.motorcycles.remove(&id);
        }
        for mut sector in changes.sectors {
            sector.set_version(sector.version() + 1);
            self.sectors.insert(sector.id(), sector);
        }
        for mut motorcycle in changes.motorcycles {
            motorcycle.set_version(motorcycle.version() + 1);
            self.motorcycles.insert(motorcycle.id(), motorcycle);
        }
        for yard in changes.yards {
            self.yards.insert(yard.id(), yard);
        }
        for sector_type in changes.sector_types {
            self.sector_types.insert(sector_type.id(), sector_type);
        }
        self.movements.extend(changes.movements);
        self.spot_index = index;
    }
}

fn check_version(
    kind: &'static str,
    id: impl ToString,
    expected: u64,
    found: Option<u64>,
) -> Result<()> {
    match found {
        Some(found) if found == expected => Ok(()),
        // Unknown aggregate with version 0 is an insert
        None if expected == 0 => Ok(()),
        None => Err(YardError::not_found(kind, id)),
        Some(found) => Err(YardError::ConcurrentModification {
            kind,
            id: id.to_string(),
            expected,
            found,
        }),
    }
}

fn index_sector(index: &mut HashMap<SpotId, SectorId>, sector: &Sector) -> Result<()> {
    for spot in sector.spots() {
        if spot.sector_id() != sector.id() {
            return Err(YardError::ConsistencyViolation(format!(
                "spot {} is stored in sector {} but belongs to sector {}",
                spot.id(),
                sector.id(),
                spot.sector_id()
            )));
        }
        if let Some(owner) = index.insert(spot.id(), sector.id())
            && owner != sector.id()
        {
            return Err(YardError::ConsistencyViolation(format!(
                "spot {} is claimed by sectors {} and {}",
                spot.id(),
                owner,
                sector.id()
            )));
        }
    }
    Ok(())
}

/// Post-commit view used to validate cross-aggregate invariants
struct Staged<'a> {
    state: &'a StoreState,
    changes: &'a ChangeSet,
    index: &'a HashMap<SpotId, SectorId>,
}

impl Staged<'_> {
    fn sector(&self, id: SectorId) -> Option<&Sector> {
        if self.changes.deleted_sectors.iter().any(|&(d, _)| d == id) {
            return None;
        }
        self.changes.sector(id).or_else(|| self.state.sectors.get(&id))
    }

    fn motorcycle(&self, id: MotorcycleId) -> Option<&Motorcycle> {
        if self.changes.deleted_motorcycles.iter().any(|&(d, _)| d == id) {
            return None;
        }
        self.changes
            .motorcycles
            .iter()
            .find(|m| m.id() == id)
            .or_else(|| self.state.motorcycles.get(&id))
    }

    fn spot(&self, id: SpotId) -> Option<&Spot> {
        self.index
            .get(&id)
            .and_then(|&sector_id| self.sector(sector_id))
            .and_then(|sector| sector.spot(id))
    }

    fn check_occupancy(&self) -> Result<()> {
        for motorcycle in &self.changes.motorcycles {
            if let Some(spot_id) = motorcycle.spot_id() {
                let spot = self.spot(spot_id).ok_or_else(|| {
                    YardError::ConsistencyViolation(format!(
                        "motorcycle {} points at unknown spot {}",
                        motorcycle.id(),
                        spot_id
                    ))
                })?;
                if spot.occupant() != Some(motorcycle.id()) {
                    return Err(YardError::ConsistencyViolation(format!(
                        "motorcycle {} points at spot {} which does not hold it",
                        motorcycle.id(),
                        spot_id
                    )));
                }
            }
        }

        let mut occupants = HashSet::new();
        for sector in &self.changes.sectors {
            for spot in sector.spots() {
                if !spot.is_consistent() {
                    return Err(YardError::ConsistencyViolation(format!(
                        "spot {} status disagrees with its occupant",
                        spot.id()
                    )));
                }
                let Some(occupant) = spot.occupant() else {
                    continue;
                };
                if !occupants.insert(occupant) {
                    return Err(YardError::ConsistencyViolation(format!(
                        "motorcycle {} occupies more than one spot",
                        occupant
                    )));
                }
                let points_back = self
                    .motorcycle(occupant)
                    .is_some_and(|m| m.spot_id() == Some(spot.id()));
                if !points_back {
                    return Err(YardError::ConsistencyViolation(format!(
                        "spot {} holds motorcycle {} which does not point back",
                        spot.id(),
                        occupant
                    )));
                }
            }
        }

        // A spot that used to hold a motorcycle may only be freed if the
        // motorcycle no longer points at it
        for sector in &self.changes.sectors {
            let Some(stored) = self.state.sectors.get(&sector.id()) else {
                continue;
            };
            for spot in stored.spots() {
                let Some(previous) = spot.occupant() else {
                    continue;
                };
                let still_points = self
                    .motorcycle(previous)
                    .is_some_and(|m| m.spot_id() == Some(spot.id()));
                let still_holds = self
                    .spot(spot.id())
                    .is_some_and(|s| s.occupant() == Some(previous));
                if still_points && !still_holds {
                    return Err(YardError::ConsistencyViolation(format!(
                        "spot {} released while motorcycle {} still points at it",
                        spot.id(),
                        previous
                    )));
                }
            }
        }

        // A motorcycle leaving a spot must not stay recorded there, even when
        // the old spot's sector is not part of the commit
        let leaving = self
            .changes
            .motorcycles
            .iter()
            .map(|m| (m.id(), m.spot_id()))
            .chain(
                self.changes
                    .deleted_motorcycles
                    .iter()
                    .map(|&(id, _)| (id, None)),
            );
        for (motorcycle_id, new_spot) in leaving {
            let Some(old_spot) = self
                .state
                .motorcycles
                .get(&motorcycle_id)
                .and_then(Motorcycle::spot_id)
            else {
                continue;
            };
            if Some(old_spot) == new_spot {
                continue;
            }
            if self
                .spot(old_spot)
                .is_some_and(|s| s.occupant() == Some(motorcycle_id))
            {
                return Err(YardError::ConsistencyViolation(format!(
                    "motorcycle {} left spot {} but the spot still holds it",
                    motorcycle_id, old_spot
                )));
            }
        }

        for &(sector_id, _) in &self.changes.deleted_sectors {
            if let Some(stored) = self.state.sectors.get(&sector_id) {
                let occupied = stored.occupied_count();
                if occupied > 0 {
                    return Err(YardError::SectorInUse {
                        sector: sector_id,
                        occupied,
                    });
                }
            }
        }

        Ok(())
    }
}
