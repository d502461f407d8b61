pub mod ids;
pub mod motorcycle;
pub mod movement;
pub mod sector;
pub mod spot;
pub mod yard;

pub use ids::{MotorcycleId, MovementId, SectorId, SectorTypeId, SpotId, YardId};
pub use motorcycle::{EngineType, Motorcycle, MotorcycleDetails};
pub use movement::Movement;
pub use sector::Sector;
pub use spot::{Spot, SpotStatus};
pub use yard::{SectorType, Yard};
