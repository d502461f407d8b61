//! Hand-written repository double and a two-sector yard fixture

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::NaiveDate;

use crate::domain::{
    EngineType, Motorcycle, MotorcycleId, Sector, SectorId, SectorType, SectorTypeId, Spot, SpotId,
    Yard, YardId,
};
use crate::error::{Result, YardError};
use crate::geometry::Boundary;
use crate::layout::generate_spots;
use crate::store::{ChangeSet, MemoryStore, YardRepository};

/// What one successful commit wrote
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CommitRecord {
    pub sectors: Vec<SectorId>,
    pub motorcycles: Vec<MotorcycleId>,
    pub deleted_sectors: Vec<SectorId>,
    pub deleted_motorcycles: Vec<MotorcycleId>,
}

/// Wraps a [`MemoryStore`], logging spot lookups and committed aggregates
#[derive(Debug, Default)]
pub(crate) struct RecordingRepository {
    inner: MemoryStore,
    commits: Mutex<Vec<CommitRecord>>,
    spot_lookups: Mutex<Vec<SpotId>>,
    fail_next: AtomicBool,
}

impl RecordingRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inner(&self) -> &MemoryStore {
        &self.inner
    }

    pub fn commits(&self) -> Vec<CommitRecord> {
        self.commits.lock().unwrap().clone()
    }

    pub fn spot_lookups(&self) -> Vec<SpotId> {
        self.spot_lookups.lock().unwrap().clone()
    }

    pub fn clear_log(&self) {
        self.commits.lock().unwrap().clear();
        self.spot_lookups.lock().unwrap().clear();
    }

    /// Make the next commit fail as if the backing store were unreachable
    pub fn fail_next_commit(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }
}

impl YardRepository for RecordingRepository {
    fn find_motorcycle_by_id(&self, id: MotorcycleId) -> Result<Option<Motorcycle>> {
        self.inner.find_motorcycle_by_id(id)
    }

    fn find_sector_by_id(&self, id: SectorId) -> Result<Option<Sector>> {
        self.inner.find_sector_by_id(id)
    }

    fn find_sector_by_spot_id(&self, spot_id: SpotId) -> Result<Option<Sector>> {
        self.spot_lookups.lock().unwrap().push(spot_id);
        self.inner.find_sector_by_spot_id(spot_id)
    }

    fn find_yard_by_id(&self, id: YardId) -> Result<Option<Yard>> {
        self.inner.find_yard_by_id(id)
    }

    fn find_sector_type_by_id(&self, id: SectorTypeId) -> Result<Option<SectorType>> {
        self.inner.find_sector_type_by_id(id)
    }

    fn commit(&self, changes: ChangeSet) -> Result<()> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(YardError::Io(std::io::Error::other("injected failure")));
        }

        let record = CommitRecord {
            sectors: changes.sector_ids(),
            motorcycles: changes.motorcycles.iter().map(Motorcycle::id).collect(),
            deleted_sectors: changes.deleted_sectors.iter().map(|&(id, _)| id).collect(),
            deleted_motorcycles: changes
                .deleted_motorcycles
                .iter()
                .map(|&(id, _)| id)
                .collect(),
        };
        self.inner.commit(changes)?;
        self.commits.lock().unwrap().push(record);
        Ok(())
    }
}

/// Yard `[0,20]x[0,10]` split into sector A (`x < 10`) and sector B, each
/// holding 9 spots on a 4x4 grid, plus two unassigned motorcycles
pub(crate) struct Fixture {
    pub repo: RecordingRepository,
    pub yard: YardId,
    pub sector_type: SectorTypeId,
    pub sector_a: SectorId,
    pub sector_b: SectorId,
    pub moto1: MotorcycleId,
    pub moto2: MotorcycleId,
    spots_a: Vec<SpotId>,
    spots_b: Vec<SpotId>,
}

pub(crate) fn revision_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()
}

pub(crate) fn rectangle(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Boundary {
    Boundary::from_coords(&[(min_x, min_y), (max_x, min_y), (max_x, max_y), (min_x, max_y)])
}

impl Fixture {
    pub fn new() -> Self {
        let repo = RecordingRepository::new();
        let yard = Yard::new("Fixture yard", rectangle(0.0, 0.0, 20.0, 10.0)).unwrap();
        let sector_type = SectorType::new("Parking").unwrap();

        let sector_a = Self::sector(&yard, &sector_type, rectangle(0.0, 0.0, 10.0, 10.0));
        let sector_b = Self::sector(&yard, &sector_type, rectangle(10.0, 0.0, 20.0, 10.0));
        let spots_a = sector_a.spots().iter().map(Spot::id).collect();
        let spots_b = sector_b.spots().iter().map(Spot::id).collect();

        let moto1 =
            Motorcycle::new("Sport 160", EngineType::Combustion, "MOT0001", revision_date()).unwrap();
        let moto2 =
            Motorcycle::new("E-Scoot", EngineType::Electric, "MOT0002", revision_date()).unwrap();

        let fixture = Fixture {
            yard: yard.id(),
            sector_type: sector_type.id(),
            sector_a: sector_a.id(),
            sector_b: sector_b.id(),
            moto1: moto1.id(),
            moto2: moto2.id(),
            spots_a,
            spots_b,
            repo,
        };

        let mut changes = ChangeSet::new();
        changes.put_yard(yard);
        changes.put_sector_type(sector_type);
        changes.put_sector(sector_a);
        changes.put_sector(sector_b);
        changes.put_motorcycle(moto1);
        changes.put_motorcycle(moto2);
        fixture.repo.inner().commit(changes).unwrap();

        fixture
    }

    fn sector(yard: &Yard, sector_type: &SectorType, boundary: Boundary) -> Sector {
        let mut sector = Sector::new(yard.id(), sector_type.id());
        sector.add_points(boundary.points().iter().copied());
        let spots = generate_spots(&sector, 4.0, 4.0).unwrap();
        sector.add_spots(spots).unwrap();
        sector
    }

    pub fn spot_a(&self, i: usize) -> SpotId {
        self.spots_a[i]
    }

    pub fn spot_b(&self, i: usize) -> SpotId {
        self.spots_b[i]
    }

    /// Current stored state of a spot
    pub fn spot(&self, id: SpotId) -> Spot {
        self.repo
            .inner()
            .find_sector_by_spot_id(id)
            .unwrap()
            .and_then(|sector| sector.spot(id).cloned())
            .unwrap()
    }

    pub fn motorcycle(&self, id: MotorcycleId) -> Motorcycle {
        self.repo.inner().find_motorcycle_by_id(id).unwrap().unwrap()
    }
}
