use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{MotorcycleId, MovementId, SpotId};

/// Log entry written when a motorcycle moves from one spot to another
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movement {
    pub id: MovementId,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub motorcycle_id: MotorcycleId,
    pub previous_spot_id: SpotId,
    pub destination_spot_id: SpotId,
}

impl Movement {
    pub fn new(motorcycle_id: MotorcycleId, previous: SpotId, destination: SpotId) -> Self {
        Self {
            id: MovementId::new(),
            message: format!(
                "motorcycle {} moved from spot {} to spot {}",
                motorcycle_id, previous, destination
            ),
            created_at: Utc::now(),
            motorcycle_id,
            previous_spot_id: previous,
            destination_spot_id: destination,
        }
    }
}
