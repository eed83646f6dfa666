//! Pollution Dispatch
//!
//! Which ecology categories each factory kind pollutes, and in what order.
//! A broader kind cascades into every narrower category: Water -> Forest -> Air.

use eco_types::{EcologyCategory, FactoryKind, PollutionRates};

use crate::accumulators::EcologySink;

const AIR_CASCADE: &[EcologyCategory] = &[EcologyCategory::Air];
const FOREST_CASCADE: &[EcologyCategory] = &[EcologyCategory::Forest, EcologyCategory::Air];
const WATER_CASCADE: &[EcologyCategory] = &[
    EcologyCategory::Water,
    EcologyCategory::Forest,
    EcologyCategory::Air,
];

/// Categories a kind pollutes, in dispatch order.
pub fn cascade(kind: FactoryKind) -> &'static [EcologyCategory] {
    match kind {
        FactoryKind::Air => AIR_CASCADE,
        FactoryKind::Forest => FOREST_CASCADE,
        FactoryKind::Water => WATER_CASCADE,
    }
}

/// Whether a kind ever touches the given category.
pub fn pollutes(kind: FactoryKind, category: EcologyCategory) -> bool {
    cascade(kind).contains(&category)
}

/// Adds `rate * elapsed_seconds` to each category in the kind's cascade.
pub fn dispatch(
    kind: FactoryKind,
    rates: &PollutionRates,
    elapsed_seconds: f32,
    ecology: &dyn EcologySink,
) {
    for &category in cascade(kind) {
        ecology.add(category, rates.rate(category) * elapsed_seconds);
    }
}
