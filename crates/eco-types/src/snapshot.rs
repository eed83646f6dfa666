//! Snapshot Types
//!
//! Serialization structs for session snapshots and state output.
//!
//! Snapshots capture the state of every factory and shared accumulator at a
//! point in time. They are reports for analysis and debugging, not a save
//! format.

use serde::{Deserialize, Serialize};

use crate::{EcologyCategory, FactoryKind, PollutionRates};

/// Generates a snapshot ID with the given sequence number.
pub fn generate_snapshot_id(sequence: u64) -> String {
    format!("snap_{:06}", sequence)
}

/// Accumulated pollution per ecology category
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EcologySnapshot {
    pub air: f32,
    pub forest: f32,
    pub water: f32,
}

impl EcologySnapshot {
    pub fn level(&self, category: EcologyCategory) -> f32 {
        match category {
            EcologyCategory::Air => self.air,
            EcologyCategory::Forest => self.forest,
            EcologyCategory::Water => self.water,
        }
    }

    pub fn total(&self) -> f32 {
        self.air + self.forest + self.water
    }
}

/// Factory snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactorySnapshot {
    pub factory_id: usize,
    pub kind: FactoryKind,
    pub storage_level: f32,
    pub storage_capacity: u32,
    pub is_burning: bool,
    pub current_upgrade: usize,
    pub upgrade_count: usize,
    /// Cost of the next tier, absent once every tier is bought
    #[serde(default)]
    pub next_upgrade_cost: Option<u32>,
    pub pollution: PollutionRates,
}

impl FactorySnapshot {
    /// Fraction of storage in use, 0.0 for a zero-capacity factory.
    pub fn fill_ratio(&self) -> f32 {
        if self.storage_capacity == 0 {
            0.0
        } else {
            (self.storage_level / self.storage_capacity as f32).clamp(0.0, 1.0)
        }
    }

    pub fn is_fully_upgraded(&self) -> bool {
        self.current_upgrade >= self.upgrade_count
    }
}

/// Complete session snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub snapshot_id: String,
    pub tick: u64,
    pub elapsed_seconds: f64,
    pub triggered_by: String,
    pub money: u64,
    pub dissatisfaction: f32,
    pub ecology: EcologySnapshot,
    #[serde(default)]
    pub factories: Vec<FactorySnapshot>,
}

impl SessionSnapshot {
    pub fn new(
        snapshot_id: impl Into<String>,
        tick: u64,
        elapsed_seconds: f64,
        triggered_by: impl Into<String>,
    ) -> Self {
        Self {
            snapshot_id: snapshot_id.into(),
            tick,
            elapsed_seconds,
            triggered_by: triggered_by.into(),
            money: 0,
            dissatisfaction: 0.0,
            ecology: EcologySnapshot::default(),
            factories: Vec::new(),
        }
    }

    pub fn burning_count(&self) -> usize {
        self.factories.iter().filter(|f| f.is_burning).count()
    }

    /// Total garbage waiting in all factory storages.
    pub fn total_stored(&self) -> f32 {
        self.factories.iter().map(|f| f.storage_level.max(0.0)).sum()
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
