//! Shared data types for the eco-factory simulation.
//!
//! This crate contains pure data structures with no simulation logic.
//! It is a dependency for all other crates in the workspace.

pub mod kind;
pub mod snapshot;

// Re-export kind types
pub use kind::{EcologyCategory, FactoryKind, ParseKindError, PollutionRates};

// Re-export snapshot types
pub use snapshot::{
    generate_snapshot_id, EcologySnapshot, FactorySnapshot, SessionSnapshot,
};
