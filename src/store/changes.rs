use crate::domain::{
    Motorcycle, MotorcycleId, Movement, Sector, SectorId, SectorType, Yard,
};

/// Writes staged for one atomic commit.
///
/// Staging the same aggregate twice keeps the latest copy, so a workflow can
/// mutate a sector in several steps and hand over a single result.
#[derive(Debug, Clone, Default)]
pub struct ChangeSet {
    pub yards: Vec<Yard>,
    pub sector_types: Vec<SectorType>,
    pub sectors: Vec<Sector>,
    /// Sector id with the version the caller last saw
    pub deleted_sectors: Vec<(SectorId, u64)>,
    pub motorcycles: Vec<Motorcycle>,
    /// Motorcycle id with the version the caller last saw
    pub deleted_motorcycles: Vec<(MotorcycleId, u64)>,
    pub movements: Vec<Movement>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.yards.is_empty()
            && self.sector_types.is_empty()
            && self.sectors.is_empty()
            && self.deleted_sectors.is_empty()
            && self.motorcycles.is_empty()
            && self.deleted_motorcycles.is_empty()
            && self.movements.is_empty()
    }

    pub fn put_yard(&mut self, yard: Yard) {
        self.yards.retain(|y| y.id() != yard.id());
        self.yards.push(yard);
    }

    pub fn put_sector_type(&mut self, sector_type: SectorType) {
        self.sector_types.retain(|t| t.id() != sector_type.id());
        self.sector_types.push(sector_type);
    }

    pub fn put_sector(&mut self, sector: Sector) {
        match self.sectors.iter_mut().find(|s| s.id() == sector.id()) {
            Some(existing) => *existing = sector,
            None => self.sectors.push(sector),
        }
    }

    /// The staged copy of a sector, if one was put
    pub fn sector(&self, id: SectorId) -> Option<&Sector> {
        self.sectors.iter().find(|s| s.id() == id)
    }

    pub fn delete_sector(&mut self, sector: &Sector) {
        self.sectors.retain(|s| s.id() != sector.id());
        self.deleted_sectors.push((sector.id(), sector.version()));
    }

    pub fn put_motorcycle(&mut self, motorcycle: Motorcycle) {
        match self
            .motorcycles
            .iter_mut()
            .find(|m| m.id() == motorcycle.id())
        {
            Some(existing) => *existing = motorcycle,
            None => self.motorcycles.push(motorcycle),
        }
    }

    pub fn delete_motorcycle(&mut self, motorcycle: &Motorcycle) {
        self.motorcycles.retain(|m| m.id() != motorcycle.id());
        self.deleted_motorcycles
            .push((motorcycle.id(), motorcycle.version()));
    }

    pub fn record_movement(&mut self, movement: Movement) {
        self.movements.push(movement);
    }

    /// Ids of the sectors this change set writes (not deletes)
    pub fn sector_ids(&self) -> Vec<SectorId> {
        self.sectors.iter().map(Sector::id).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{SectorTypeId, YardId};

    #[test]
    fn test_put_sector_keeps_latest_copy() {
        let mut sector = Sector::new(YardId::new(), SectorTypeId::new());
        let mut changes = ChangeSet::new();
        assert!(changes.is_empty());

        changes.put_sector(sector.clone());
        sector.set_sector_type(SectorTypeId::new());
        changes.put_sector(sector.clone());

        assert_eq!(changes.sectors.len(), 1);
        assert_eq!(changes.sector(sector.id()), Some(&sector));
        assert!(!changes.is_empty());
    }

    #[test]
    fn test_delete_unstages_put() {
        let sector = Sector::new(YardId::new(), SectorTypeId::new());
        let mut changes = ChangeSet::new();
        changes.put_sector(sector.clone());
        changes.delete_sector(&sector);

        assert!(changes.sectors.is_empty());
        assert_eq!(changes.deleted_sectors, vec![(sector.id(), 0)]);
    }
}
