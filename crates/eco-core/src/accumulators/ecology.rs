//! Ecology Accumulator

use std::cell::Cell;

use eco_types::{EcologyCategory, EcologySnapshot};

/// Receives pollution, one category at a time.
pub trait EcologySink {
    fn add(&self, category: EcologyCategory, amount: f32);
}

/// In-memory pollution levels for air, forest and water.
#[derive(Debug, Default)]
pub struct Ecology {
    air: Cell<f32>,
    forest: Cell<f32>,
    water: Cell<f32>,
}

impl Ecology {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn level(&self, category: EcologyCategory) -> f32 {
        self.cell(category).get()
    }

    pub fn total(&self) -> f32 {
        EcologyCategory::ALL.iter().map(|c| self.level(*c)).sum()
    }

    pub fn snapshot(&self) -> EcologySnapshot {
        EcologySnapshot {
            air: self.air.get(),
            forest: self.forest.get(),
            water: self.water.get(),
        }
    }

    fn cell(&self, category: EcologyCategory) -> &Cell<f32> {
        match category {
            EcologyCategory::Air => &self.air,
            EcologyCategory::Forest => &self.forest,
            EcologyCategory::Water => &self.water,
        }
    }
}

impl EcologySink for Ecology {
    fn add(&self, category: EcologyCategory, amount: f32) {
        let cell = self.cell(category);
        cell.set(cell.get() + amount);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories_are_independent() {
        let ecology = Ecology::new();
        ecology.add(EcologyCategory::Water, 2.0);
        ecology.add(EcologyCategory::Air, 0.5);

        assert_eq!(ecology.level(EcologyCategory::Water), 2.0);
        assert_eq!(ecology.level(EcologyCategory::Forest), 0.0);
        assert_eq!(ecology.level(EcologyCategory::Air), 0.5);
        assert_eq!(ecology.total(), 2.5);
    }

    #[test]
    fn test_snapshot_matches_levels() {
        let ecology = Ecology::new();
        ecology.add(EcologyCategory::Forest, 1.25);

        let snapshot = ecology.snapshot();
        assert_eq!(snapshot.forest, 1.25);
        assert_eq!(snapshot.air, 0.0);
    }
}
