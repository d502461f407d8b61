use serde::{Deserialize, Serialize};

use super::{SectorTypeId, YardId};
use crate::error::{Result, YardError};
use crate::geometry::Boundary;

fn validated_name(name: String) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(YardError::InvalidName("name must not be blank".to_string()));
    }
    Ok(trimmed.to_string())
}

/// A storage yard; its boundary encloses every sector created in it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Yard {
    id: YardId,
    name: String,
    boundary: Boundary,
}

impl Yard {
    pub fn new(name: impl Into<String>, boundary: Boundary) -> Result<Self> {
        Ok(Self {
            id: YardId::new(),
            name: validated_name(name.into())?,
            boundary,
        })
    }

    pub fn id(&self) -> YardId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn boundary(&self) -> &Boundary {
        &self.boundary
    }
}

/// Category of sector (e.g. "maintenance", "ready for pickup")
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorType {
    id: SectorTypeId,
    name: String,
}

impl SectorType {
    pub fn new(name: impl Into<String>) -> Result<Self> {
        Ok(Self {
            id: SectorTypeId::new(),
            name: validated_name(name.into())?,
        })
    }

    pub fn id(&self) -> SectorTypeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_are_trimmed_and_required() {
        let yard = Yard::new("  North Lot ", Boundary::default()).unwrap();
        assert_eq!(yard.name(), "North Lot");
        assert!(Yard::new("   ", Boundary::default()).is_err());
        assert!(matches!(
            SectorType::new(""),
            Err(YardError::InvalidName(_))
        ));
    }
}
