use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{MotorcycleId, SpotId};
use crate::error::{Result, YardError};

const MAX_PLATE_LEN: usize = 8;
const MAX_MODEL_LEN: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineType {
    Combustion,
    Electric,
}

impl fmt::Display for EngineType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineType::Combustion => f.write_str("combustion"),
            EngineType::Electric => f.write_str("electric"),
        }
    }
}

impl FromStr for EngineType {
    type Err = YardError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "combustion" | "gas" => Ok(EngineType::Combustion),
            "electric" | "ev" => Ok(EngineType::Electric),
            other => Err(YardError::InvalidMotorcycle(format!(
                "unknown engine type {:?} (expected combustion or electric)",
                other
            ))),
        }
    }
}

/// Descriptive fields of a motorcycle, validated as a unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MotorcycleDetails {
    pub model: String,
    pub engine_type: EngineType,
    pub plate: String,
    pub last_revision_date: NaiveDate,
}

impl MotorcycleDetails {
    pub fn validate(&self) -> Result<()> {
        let model = self.model.trim();
        if model.is_empty() {
            return Err(YardError::InvalidMotorcycle(
                "model must not be empty".to_string(),
            ));
        }
        if model.chars().count() > MAX_MODEL_LEN {
            return Err(YardError::InvalidMotorcycle(format!(
                "model must be at most {} characters",
                MAX_MODEL_LEN
            )));
        }

        let plate_len = self.plate.trim().chars().count();
        if plate_len == 0 || plate_len > MAX_PLATE_LEN {
            return Err(YardError::InvalidMotorcycle(format!(
                "plate must be 1 to {} characters, got {:?}",
                MAX_PLATE_LEN, self.plate
            )));
        }
        Ok(())
    }
}

/// A motorcycle, optionally parked on one spot.
///
/// `spot_id` is a lookup key only; the spot side records the occupant.
/// The store refuses commits where the two sides disagree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Motorcycle {
    id: MotorcycleId,
    details: MotorcycleDetails,
    spot_id: Option<SpotId>,
    #[serde(default)]
    version: u64,
}

impl Motorcycle {
    /// A new, unassigned motorcycle
    pub fn new(
        model: impl Into<String>,
        engine_type: EngineType,
        plate: impl Into<String>,
        last_revision_date: NaiveDate,
    ) -> Result<Self> {
        Self::from_details(MotorcycleDetails {
            model: model.into(),
            engine_type,
            plate: plate.into(),
            last_revision_date,
        })
    }

    pub fn from_details(details: MotorcycleDetails) -> Result<Self> {
        details.validate()?;
        Ok(Self {
            id: MotorcycleId::new(),
            details,
            spot_id: None,
            version: 0,
        })
    }

    pub fn id(&self) -> MotorcycleId {
        self.id
    }

    pub fn details(&self) -> &MotorcycleDetails {
        &self.details
    }

    pub fn model(&self) -> &str {
        &self.details.model
    }

    pub fn engine_type(&self) -> EngineType {
        self.details.engine_type
    }

    pub fn plate(&self) -> &str {
        &self.details.plate
    }

    pub fn last_revision_date(&self) -> NaiveDate {
        self.details.last_revision_date
    }

    pub fn spot_id(&self) -> Option<SpotId> {
        self.spot_id
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub(crate) fn set_version(&mut self, version: u64) {
        self.version = version;
    }

    /// Replace the descriptive fields; the spot assignment is untouched
    pub fn update_details(&mut self, details: MotorcycleDetails) -> Result<()> {
        details.validate()?;
        self.details = details;
        Ok(())
    }

    /// Only the relocation workflow moves a motorcycle, so the spot side
    /// is always updated in the same commit.
    pub(crate) fn set_spot(&mut self, spot_id: Option<SpotId>) {
        self.spot_id = spot_id;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 14).unwrap()
    }

    #[test]
    fn test_new_motorcycle_is_unassigned() {
        let moto = Motorcycle::new("Pop 110i", EngineType::Combustion, "ABC1D23", date()).unwrap();
        assert_eq!(moto.spot_id(), None);
        assert_eq!(moto.model(), "Pop 110i");
        assert_eq!(moto.engine_type(), EngineType::Combustion);
        assert_eq!(moto.last_revision_date(), date());
        assert_eq!(moto.version(), 0);
    }

    #[test]
    fn test_engine_type_from_str() {
        assert_eq!("Electric".parse::<EngineType>().unwrap(), EngineType::Electric);
        assert_eq!("gas".parse::<EngineType>().unwrap(), EngineType::Combustion);
        assert!("diesel".parse::<EngineType>().is_err());
    }

    #[test]
    fn test_invalid_details_rejected() {
        assert!(matches!(
            Motorcycle::new("  ", EngineType::Electric, "ABC1234", date()),
            Err(YardError::InvalidMotorcycle(_))
        ));
        assert!(Motorcycle::new("E", EngineType::Electric, "", date()).is_err());
        assert!(Motorcycle::new("E", EngineType::Electric, "ABCDEFGHI", date()).is_err());
    }

    #[test]
    fn test_update_details_keeps_spot() {
        let mut moto = Motorcycle::new("Sport", EngineType::Combustion, "XYZ9876", date()).unwrap();
        let spot = SpotId::new();
        moto.set_spot(Some(spot));

        let details = MotorcycleDetails {
            model: "Sport 2".to_string(),
            engine_type: EngineType::Electric,
            plate: "XYZ9876".to_string(),
            last_revision_date: date(),
        };
        moto.update_details(details.clone()).unwrap();

        assert_eq!(moto.details(), &details);
        assert_eq!(moto.spot_id(), Some(spot));
    }
}
