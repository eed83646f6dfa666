//! Factory Kinds and Ecology Categories
//!
//! Vocabulary shared by the configuration table, the factory model and the
//! snapshot output.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Pollutant classification of a factory.
///
/// Variants are ordered by breadth: a broader kind also pollutes every
/// narrower category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactoryKind {
    /// Pollutes air only
    Air,
    /// Pollutes forest and air
    Forest,
    /// Pollutes water, forest and air
    Water,
}

impl FactoryKind {
    /// All kinds, narrowest first.
    pub const ALL: [FactoryKind; 3] = [FactoryKind::Air, FactoryKind::Forest, FactoryKind::Water];

    pub fn as_str(&self) -> &'static str {
        match self {
            FactoryKind::Air => "air",
            FactoryKind::Forest => "forest",
            FactoryKind::Water => "water",
        }
    }
}

/// Error returned when a factory kind name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseKindError(pub String);

impl fmt::Display for ParseKindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown factory kind '{}' (expected air, forest or water)", self.0)
    }
}

impl std::error::Error for ParseKindError {}

impl FromStr for FactoryKind {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "air" => Ok(FactoryKind::Air),
            "forest" => Ok(FactoryKind::Forest),
            "water" => Ok(FactoryKind::Water),
            _ => Err(ParseKindError(s.to_string())),
        }
    }
}

impl fmt::Display for FactoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A category tracked by the ecology accumulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EcologyCategory {
    Air,
    Forest,
    Water,
}

impl EcologyCategory {
    pub const ALL: [EcologyCategory; 3] = [
        EcologyCategory::Air,
        EcologyCategory::Forest,
        EcologyCategory::Water,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EcologyCategory::Air => "air",
            EcologyCategory::Forest => "forest",
            EcologyCategory::Water => "water",
        }
    }
}

impl fmt::Display for EcologyCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pollution emitted per second, one value per ecology category.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PollutionRates {
    pub air: f32,
    pub forest: f32,
    pub water: f32,
}

impl PollutionRates {
    pub fn new(air: f32, forest: f32, water: f32) -> Self {
        Self { air, forest, water }
    }

    /// Rate for a single category.
    pub fn rate(&self, category: EcologyCategory) -> f32 {
        match category {
            EcologyCategory::Air => self.air,
            EcologyCategory::Forest => self.forest,
            EcologyCategory::Water => self.water,
        }
    }
}
