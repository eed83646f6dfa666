//! Core factory simulation: storage, burning, pollution and upgrades.
//!
//! # Modules
//!
//! - [`config`]: Per-kind factory settings and the lookup table
//! - [`accumulators`]: Currency, dissatisfaction and ecology accumulators
//! - [`pollution`]: Which ecology categories each kind pollutes
//! - [`factory`]: The factory state machine
//! - [`session`]: Hosts factories and steps them once per tick
//! - [`scenario`]: Seeded scripted player for headless runs
//! - [`output`]: JSON snapshot writing

pub mod accumulators;
pub mod config;
pub mod factory;
pub mod output;
pub mod pollution;
pub mod scenario;
pub mod session;

pub use accumulators::{
    CurrencyLedger, Dissatisfaction, DissatisfactionSink, Ecology, EcologySink, Money,
};
pub use config::{
    default_config_toml, ConfigError, FactoryConfig, FactoryConfigTable, FactorySet,
    UpgradeTier, DEFAULT_CONFIG_PATH,
};
pub use factory::{BurnState, Factory, FactoryError};
pub use output::{OutputError, SnapshotGenerator, SnapshotWriter};
pub use scenario::{Scenario, ScenarioConfig, TickReport};
pub use session::{FactoryId, Session, SessionError};

pub use eco_types::{EcologyCategory, FactoryKind, PollutionRates};
