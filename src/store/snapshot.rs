use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use super::MemoryStore;
use super::memory::StoreState;
use crate::domain::{Motorcycle, Movement, Sector, SectorType, Yard};
use crate::error::{Result, YardError};

/// Serializable image of a [`MemoryStore`].
///
/// The spot index is derived data and is rebuilt on load.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub yards: Vec<Yard>,
    #[serde(default)]
    pub sector_types: Vec<SectorType>,
    #[serde(default)]
    pub sectors: Vec<Sector>,
    #[serde(default)]
    pub motorcycles: Vec<Motorcycle>,
    #[serde(default)]
    pub movements: Vec<Movement>,
}

impl Snapshot {
    fn from_state(state: StoreState) -> Self {
        Self {
            yards: state.yards.into_values().collect(),
            sector_types: state.sector_types.into_values().collect(),
            sectors: state.sectors.into_values().collect(),
            motorcycles: state.motorcycles.into_values().collect(),
            movements: state.movements,
        }
    }

    /// Rebuild store state, refusing data whose occupancy does not add up
    fn into_state(self) -> Result<StoreState> {
        let mut state = StoreState {
            yards: self.yards.into_iter().map(|y| (y.id(), y)).collect(),
            sector_types: self
                .sector_types
                .into_iter()
                .map(|t| (t.id(), t))
                .collect(),
            sectors: self.sectors.into_iter().map(|s| (s.id(), s)).collect(),
            motorcycles: self
                .motorcycles
                .into_iter()
                .map(|m| (m.id(), m))
                .collect(),
            movements: self.movements,
            spot_index: Default::default(),
        };
        state.rebuild_index()?;

        for sector in state.sectors.values() {
            for spot in sector.spots() {
                if !spot.is_consistent() {
                    return Err(YardError::ConsistencyViolation(format!(
                        "spot {} status disagrees with its occupant",
                        spot.id()
                    )));
                }
                if let Some(occupant) = spot.occupant() {
                    let points_back = state
                        .motorcycles
                        .get(&occupant)
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
        }

        for motorcycle in state.motorcycles.values() {
            let Some(spot_id) = motorcycle.spot_id() else {
                continue;
            };
            let holds = state
                .spot_index
                .get(&spot_id)
                .and_then(|sector_id| state.sectors.get(sector_id))
                .and_then(|sector| sector.spot(spot_id))
                .is_some_and(|spot| spot.occupant() == Some(motorcycle.id()));
            if !holds {
                return Err(YardError::ConsistencyViolation(format!(
                    "motorcycle {} points at spot {} which does not hold it",
                    motorcycle.id(),
                    spot_id
                )));
            }
        }

        Ok(state)
    }
}

impl MemoryStore {
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::from_state(self.state_snapshot())
    }

    pub fn from_snapshot(snapshot: Snapshot) -> Result<Self> {
        Ok(MemoryStore::from_state(snapshot.into_state()?))
    }

    /// Write the whole store as pretty-printed JSON.
    ///
    /// The file is written next to `path` first and renamed over it, so an
    /// interrupted save leaves the previous snapshot intact.
    pub fn save_snapshot(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.snapshot())?;
        let staging = staging_path(path);
        std::fs::write(&staging, json)?;
        if let Err(e) = std::fs::rename(&staging, path) {
            let _ = std::fs::remove_file(&staging);
            return Err(e.into());
        }
        Ok(())
    }

    pub fn load_snapshot(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let snapshot: Snapshot = serde_json::from_str(&contents)?;
        Self::from_snapshot(snapshot)
    }

    /// Load `path` if it exists, otherwise start empty
    pub fn open(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load_snapshot(path)
        } else {
            Ok(Self::new())
        }
    }
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EngineType, SectorTypeId, Spot};
    use crate::geometry::Boundary;
    use crate::store::{ChangeSet, YardRepository};
    use chrono::NaiveDate;

    fn populated_store() -> (MemoryStore, Sector, Motorcycle) {
        let store = MemoryStore::new();
        let yard = Yard::new(
            "Main",
            Boundary::from_coords(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0)]),
        )
        .unwrap();

        let mut sector = Sector::new(yard.id(), SectorTypeId::new());
        let spot = Spot::new(sector.id(), 1.0, 1.0);
        let spot_id = spot.id();
        sector.add_spots(vec![spot]).unwrap();

        let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let mut moto = Motorcycle::new("Street", EngineType::Electric, "EV00001", date).unwrap();
        sector
            .spot_mut(spot_id)
            .unwrap()
            .assign_motorcycle(moto.id())
            .unwrap();
        moto.set_spot(Some(spot_id));

        let mut changes = ChangeSet::new();
        changes.put_yard(yard);
        changes.put_sector(sector.clone());
        changes.put_motorcycle(moto.clone());
        store.commit(changes).unwrap();

        (store, sector, moto)
    }

    #[test]
    fn test_snapshot_file_roundtrip() {
        let (store, sector, moto) = populated_store();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("yard.json");

        store.save_snapshot(&path).unwrap();
        let loaded = MemoryStore::load_snapshot(&path).unwrap();

        let spot_id = sector.spots()[0].id();
        let owner = loaded.find_sector_by_spot_id(spot_id).unwrap().unwrap();
        assert_eq!(owner.id(), sector.id());
        assert_eq!(owner.version(), 1);

        let loaded_moto = loaded.find_motorcycle_by_id(moto.id()).unwrap().unwrap();
        assert_eq!(loaded_moto.spot_id(), Some(spot_id));
        assert_eq!(loaded.yards().len(), 1);
    }

    #[test]
    fn test_save_replaces_previous_snapshot() {
        let (store, _, moto) = populated_store();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("yard.json");
        std::fs::write(&path, "stale contents").unwrap();

        store.save_snapshot(&path).unwrap();

        let loaded = MemoryStore::load_snapshot(&path).unwrap();
        assert!(loaded.find_motorcycle_by_id(moto.id()).unwrap().is_some());
        assert!(!staging_path(&path).exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_failed_save_keeps_previous_snapshot() {
        let (store, _, _) = populated_store();
        let dir = tempfile::tempdir().unwrap();
        // A directory cannot be replaced by a file rename
        let path = dir.path().join("yard.json");
        std::fs::create_dir(&path).unwrap();
        std::fs::write(path.join("keep"), "x").unwrap();

        assert!(matches!(store.save_snapshot(&path), Err(YardError::Io(_))));
        assert!(path.join("keep").exists());
        assert!(!staging_path(&path).exists());
    }

    #[test]
    fn test_staging_path_is_a_sibling() {
        let path = Path::new("/data/yard.json");
        assert_eq!(staging_path(path), PathBuf::from("/data/yard.json.tmp"));
    }

    #[test]
    fn test_open_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = MemoryStore::open(&dir.path().join("absent.json")).unwrap();
        assert!(store.sectors().is_empty());
    }

    #[test]
    fn test_inconsistent_snapshot_is_rejected() {
        let (store, _, _) = populated_store();
        let mut snapshot = store.snapshot();
        // Drop the motorcycle, leaving its spot pointing at nothing
        snapshot.motorcycles.clear();

        assert!(matches!(
            MemoryStore::from_snapshot(snapshot),
            Err(YardError::ConsistencyViolation(_))
        ));
    }

    #[test]
    fn test_corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(matches!(
            MemoryStore::load_snapshot(&path),
            Err(YardError::Snapshot(_))
        ));
        assert!(matches!(
            MemoryStore::load_snapshot(&dir.path().join("missing.json")),
            Err(YardError::Io(_))
        ));
    }

    #[test]
    fn test_empty_snapshot_fields_default() {
        let snapshot: Snapshot = serde_json::from_str("{}").unwrap();
        let store = MemoryStore::from_snapshot(snapshot).unwrap();
        assert!(store.motorcycles().is_empty());
    }
}
