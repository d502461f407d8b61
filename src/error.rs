use thiserror::Error;

use crate::domain::{MotorcycleId, SectorId, SpotId};

/// Errors raised by geometry validation, layout generation and the
/// occupancy workflows.
#[derive(Debug, Error)]
pub enum YardError {
    /// A motorcycle, sector, spot, yard or sector type referenced by id does not exist
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: String },

    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    /// Target spot already holds a different motorcycle
    #[error("spot {spot} is already occupied by motorcycle {occupant}")]
    OccupancyConflict { spot: SpotId, occupant: MotorcycleId },

    /// An internal invariant was found broken; never silently corrected
    #[error("consistency violation: {0}")]
    ConsistencyViolation(String),

    /// Optimistic version check failed at commit time
    #[error("{kind} {id} was modified concurrently (expected version {expected}, found {found})")]
    ConcurrentModification {
        kind: &'static str,
        id: String,
        expected: u64,
        found: u64,
    },

    #[error("sector {sector} still has {occupied} occupied spot(s)")]
    SectorInUse { sector: SectorId, occupied: usize },

    #[error("invalid motorcycle: {0}")]
    InvalidMotorcycle(String),

    #[error("invalid name: {0}")]
    InvalidName(String),

    #[error("I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("snapshot could not be encoded or decoded: {0}")]
    Snapshot(#[from] serde_json::Error),

    #[error("config file could not be parsed: {0}")]
    Config(#[from] toml::de::Error),
}

impl YardError {
    pub fn not_found(kind: &'static str, id: impl ToString) -> Self {
        YardError::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    /// True for errors a boundary layer should report as "not found"
    pub fn is_not_found(&self) -> bool {
        matches!(self, YardError::NotFound { .. })
    }

    /// True for errors a boundary layer should report as a conflict
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            YardError::OccupancyConflict { .. }
                | YardError::ConcurrentModification { .. }
                | YardError::SectorInUse { .. }
        )
    }

    /// True for local validation failures (bad input, never retried)
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            YardError::InvalidGeometry(_)
                | YardError::InvalidMotorcycle(_)
                | YardError::InvalidName(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, YardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        let err = YardError::not_found("motorcycle", "abc");
        assert!(err.is_not_found());
        assert!(!err.is_conflict());
        assert_eq!(err.to_string(), "motorcycle abc not found");

        let err = YardError::OccupancyConflict {
            spot: SpotId::new(),
            occupant: MotorcycleId::new(),
        };
        assert!(err.is_conflict());

        let err = YardError::InvalidGeometry("too few points".to_string());
        assert!(err.is_validation());
        assert!(!err.is_not_found());
    }
}
