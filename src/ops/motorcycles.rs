use super::relocation::stage_relocation;
use crate::domain::{Motorcycle, MotorcycleDetails, MotorcycleId, SpotId};
use crate::error::{Result, YardError};
use crate::store::{ChangeSet, YardRepository};

/// Register a motorcycle, optionally parking it on `spot_id` in the same commit
pub fn create_motorcycle<R: YardRepository + ?Sized>(
    repo: &R,
    details: MotorcycleDetails,
    spot_id: Option<SpotId>,
) -> Result<Motorcycle> {
    let mut motorcycle = Motorcycle::from_details(details)?;
    let id = motorcycle.id();

    let mut changes = ChangeSet::new();
    if spot_id.is_some() {
        stage_relocation(repo, &mut changes, &mut motorcycle, spot_id)?;
    }
    changes.put_motorcycle(motorcycle);
    repo.commit(changes)?;

    repo.find_motorcycle_by_id(id)?
        .ok_or_else(|| YardError::not_found("motorcycle", id))
}

/// Replace a motorcycle's details and move it to `spot_id` (`None` releases it)
pub fn update_motorcycle<R: YardRepository + ?Sized>(
    repo: &R,
    id: MotorcycleId,
    details: MotorcycleDetails,
    spot_id: Option<SpotId>,
) -> Result<Motorcycle> {
    let mut motorcycle = repo
        .find_motorcycle_by_id(id)?
        .ok_or_else(|| YardError::not_found("motorcycle", id))?;
    motorcycle.update_details(details)?;

    let mut changes = ChangeSet::new();
    stage_relocation(repo, &mut changes, &mut motorcycle, spot_id)?;
    changes.put_motorcycle(motorcycle);
    repo.commit(changes)?;

    repo.find_motorcycle_by_id(id)?
        .ok_or_else(|| YardError::not_found("motorcycle", id))
}

/// Free the motorcycle's spot and delete it, atomically
pub fn delete_motorcycle<R: YardRepository + ?Sized>(repo: &R, id: MotorcycleId) -> Result<()> {
    let mut motorcycle = repo
        .find_motorcycle_by_id(id)?
        .ok_or_else(|| YardError::not_found("motorcycle", id))?;

    let mut changes = ChangeSet::new();
    stage_relocation(repo, &mut changes, &mut motorcycle, None)?;
    changes.delete_motorcycle(&motorcycle);
    repo.commit(changes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EngineType, SpotStatus};
    use crate::ops::relocate_motorcycle;
    use crate::ops::testing::{Fixture, revision_date};

    fn details(model: &str, plate: &str) -> MotorcycleDetails {
        MotorcycleDetails {
            model: model.to_string(),
            engine_type: EngineType::Combustion,
            plate: plate.to_string(),
            last_revision_date: revision_date(),
        }
    }

    #[test]
    fn test_create_unassigned() {
        let fx = Fixture::new();
        let moto = create_motorcycle(&fx.repo, details("Trail", "NEW0001"), None).unwrap();

        assert_eq!(moto.spot_id(), None);
        assert_eq!(moto.version(), 1);
        assert!(fx.repo.spot_lookups().is_empty());
    }

    #[test]
    fn test_create_on_spot() {
        let fx = Fixture::new();
        let spot = fx.spot_a(3);
        let moto = create_motorcycle(&fx.repo, details("Trail", "NEW0002"), Some(spot)).unwrap();

        assert_eq!(moto.spot_id(), Some(spot));
        assert_eq!(fx.spot(spot).occupant(), Some(moto.id()));
        let commits = fx.repo.commits();
        assert_eq!(commits.len(), 1);
        assert_eq!(commits[0].sectors, vec![fx.sector_a]);
    }

    #[test]
    fn test_create_on_occupied_spot_persists_nothing() {
        let fx = Fixture::new();
        let spot = fx.spot_a(3);
        relocate_motorcycle(&fx.repo, fx.moto1, Some(spot)).unwrap();
        let before = fx.repo.inner().motorcycles().len();

        let err = create_motorcycle(&fx.repo, details("Trail", "NEW0003"), Some(spot)).unwrap_err();
        assert!(err.is_conflict());
        assert_eq!(fx.repo.inner().motorcycles().len(), before);
    }

    #[test]
    fn test_create_rejects_invalid_details() {
        let fx = Fixture::new();
        let err = create_motorcycle(&fx.repo, details("", "NEW0004"), None).unwrap_err();
        assert!(matches!(err, YardError::InvalidMotorcycle(_)));
        assert!(fx.repo.commits().is_empty());
    }

    #[test]
    fn test_update_fields_and_spot() {
        let fx = Fixture::new();
        let from = fx.spot_a(0);
        let to = fx.spot_b(5);
        relocate_motorcycle(&fx.repo, fx.moto1, Some(from)).unwrap();

        let updated = update_motorcycle(&fx.repo, fx.moto1, details("Renamed", "MOT0001"), Some(to))
            .unwrap();

        assert_eq!(updated.model(), "Renamed");
        assert_eq!(updated.spot_id(), Some(to));
        assert_eq!(fx.spot(from).status(), SpotStatus::Available);
        assert_eq!(fx.spot(to).occupant(), Some(fx.moto1));
    }

    #[test]
    fn test_update_missing_motorcycle() {
        let fx = Fixture::new();
        let err = update_motorcycle(&fx.repo, MotorcycleId::new(), details("X", "X1"), None)
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_delete_releases_spot() {
        let fx = Fixture::new();
        let spot = fx.spot_b(1);
        relocate_motorcycle(&fx.repo, fx.moto2, Some(spot)).unwrap();
        fx.repo.clear_log();

        delete_motorcycle(&fx.repo, fx.moto2).unwrap();

        assert!(fx.repo.find_motorcycle_by_id(fx.moto2).unwrap().is_none());
        assert_eq!(fx.spot(spot).occupant(), None);
        let commits = fx.repo.commits();
        assert_eq!(commits[0].sectors, vec![fx.sector_b]);
        assert_eq!(commits[0].deleted_motorcycles, vec![fx.moto2]);
    }
}
