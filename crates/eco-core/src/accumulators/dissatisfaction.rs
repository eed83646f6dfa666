//! Dissatisfaction Accumulator

use std::cell::Cell;

/// Receives dissatisfaction produced by burning factories.
pub trait DissatisfactionSink {
    fn add(&self, amount: f32);
}

/// In-memory dissatisfaction level.
#[derive(Debug, Default)]
pub struct Dissatisfaction {
    level: Cell<f32>,
}

impl Dissatisfaction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn level(&self) -> f32 {
        self.level.get()
    }
}

impl DissatisfactionSink for Dissatisfaction {
    fn add(&self, amount: f32) {
        self.level.set(self.level.get() + amount);
    }
}
