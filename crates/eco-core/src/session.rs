//! Session
//!
//! Hosts a set of factories together with the accumulators they share, and
//! steps every factory once per tick in placement order.

use std::fmt;
use std::rc::Rc;
use thiserror::Error;
use tracing::debug;

use eco_types::{FactoryKind, FactorySnapshot, SessionSnapshot};

use crate::accumulators::{Dissatisfaction, Ecology, Money};
use crate::config::{ConfigError, FactoryConfigTable, UpgradeTier};
use crate::factory::{Factory, FactoryError};

/// Index of a factory within its session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FactoryId(pub usize);

impl fmt::Display for FactoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "factory_{:03}", self.0)
    }
}

/// Errors from session-level operations.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("{0} does not exist")]
    UnknownFactory(FactoryId),
    #[error("{id}: {source}")]
    Factory {
        id: FactoryId,
        #[source]
        source: FactoryError,
    },
}

/// All factories of one game session and the accumulators they feed.
#[derive(Debug)]
pub struct Session {
    table: FactoryConfigTable,
    money: Rc<Money>,
    dissatisfaction: Rc<Dissatisfaction>,
    ecology: Rc<Ecology>,
    factories: Vec<Factory>,
    current_tick: u64,
    elapsed_seconds: f64,
}

impl Session {
    pub fn new(table: FactoryConfigTable, starting_money: u64) -> Self {
        Self {
            table,
            money: Rc::new(Money::new(starting_money)),
            dissatisfaction: Rc::new(Dissatisfaction::new()),
            ecology: Rc::new(Ecology::new()),
            factories: Vec::new(),
            current_tick: 0,
            elapsed_seconds: 0.0,
        }
    }

    /// Places a new factory wired to this session's accumulators.
    pub fn place_factory(&mut self, kind: FactoryKind) -> Result<FactoryId, SessionError> {
        let factory = Factory::new(
            kind,
            &self.table,
            self.money.clone(),
            self.dissatisfaction.clone(),
            self.ecology.clone(),
        )?;

        let id = FactoryId(self.factories.len());
        self.factories.push(factory);
        debug!("Placed {} factory as {}", kind, id);
        Ok(id)
    }

    pub fn factory(&self, id: FactoryId) -> Option<&Factory> {
        self.factories.get(id.0)
    }

    pub fn factory_mut(&mut self, id: FactoryId) -> Option<&mut Factory> {
        self.factories.get_mut(id.0)
    }

    /// All factories with their ids, in placement order.
    pub fn factories(&self) -> impl Iterator<Item = (FactoryId, &Factory)> {
        self.factories
            .iter()
            .enumerate()
            .map(|(index, factory)| (FactoryId(index), factory))
    }

    pub fn factory_ids(&self) -> Vec<FactoryId> {
        (0..self.factories.len()).map(FactoryId).collect()
    }

    pub fn factory_count(&self) -> usize {
        self.factories.len()
    }

    /// Deposits garbage into one factory.
    pub fn deposit(&mut self, id: FactoryId, amount: f32) -> Result<(), SessionError> {
        self.factory_mut(id)
            .ok_or(SessionError::UnknownFactory(id))?
            .try_add_to_storage(amount)
            .map_err(|source| SessionError::Factory { id, source })
    }

    /// Buys the next upgrade tier for one factory.
    pub fn upgrade(&mut self, id: FactoryId) -> Result<UpgradeTier, SessionError> {
        self.factory_mut(id)
            .ok_or(SessionError::UnknownFactory(id))?
            .try_upgrade()
            .map_err(|source| SessionError::Factory { id, source })
    }

    /// Advances every factory by one tick of `elapsed_seconds`.
    pub fn tick(&mut self, elapsed_seconds: f32) {
        for factory in &mut self.factories {
            factory.step(elapsed_seconds);
        }

        self.current_tick += 1;
        if elapsed_seconds.is_finite() && elapsed_seconds > 0.0 {
            self.elapsed_seconds += f64::from(elapsed_seconds);
        }
    }

    pub fn current_tick(&self) -> u64 {
        self.current_tick
    }

    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed_seconds
    }

    pub fn config(&self) -> &FactoryConfigTable {
        &self.table
    }

    pub fn money(&self) -> &Money {
        &self.money
    }

    pub fn dissatisfaction(&self) -> &Dissatisfaction {
        &self.dissatisfaction
    }

    pub fn ecology(&self) -> &Ecology {
        &self.ecology
    }

    /// Captures the current state of every factory and accumulator.
    pub fn snapshot(&self, snapshot_id: impl Into<String>, triggered_by: &str) -> SessionSnapshot {
        let mut snapshot = SessionSnapshot::new(
            snapshot_id,
            self.current_tick,
            self.elapsed_seconds,
            triggered_by,
        );
        snapshot.money = self.money.amount();
        snapshot.dissatisfaction = self.dissatisfaction.level();
        snapshot.ecology = self.ecology.snapshot();
        snapshot.factories = self
            .factories()
            .map(|(id, factory)| FactorySnapshot {
                factory_id: id.0,
                kind: factory.kind(),
                storage_level: factory.storage_level(),
                storage_capacity: factory.config().storage_capacity,
                is_burning: factory.is_burning(),
                current_upgrade: factory.current_upgrade(),
                upgrade_count: factory.upgrade_count(),
                next_upgrade_cost: factory.next_upgrade_cost(),
                pollution: factory.pollution_rates(),
            })
            .collect();
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eco_types::EcologyCategory;

    fn session(money: u64) -> Session {
        Session::new(FactoryConfigTable::default(), money)
    }

    #[test]
    fn test_place_factories() {
        let mut session = session(0);
        let air = session.place_factory(FactoryKind::Air).unwrap();
        let water = session.place_factory(FactoryKind::Water).unwrap();

        assert_eq!(air, FactoryId(0));
        assert_eq!(water, FactoryId(1));
        assert_eq!(session.factory_count(), 2);
        assert_eq!(session.factory(water).unwrap().kind(), FactoryKind::Water);
        assert_eq!(session.factory_ids(), vec![air, water]);
    }

    #[test]
    fn test_config_lists_kinds() {
        let session = session(0);
        assert_eq!(session.config().kinds(), FactoryKind::ALL.to_vec());
    }

    #[test]
    fn test_place_unconfigured_kind() {
        let table = FactoryConfigTable::from_sets(Vec::new()).unwrap();
        let mut session = Session::new(table, 0);

        let result = session.place_factory(FactoryKind::Forest);
        assert!(matches!(
            result,
            Err(SessionError::Config(ConfigError::NotFound(FactoryKind::Forest)))
        ));
        assert_eq!(session.factory_count(), 0);
    }

    #[test]
    fn test_unknown_factory() {
        let mut session = session(0);
        let result = session.deposit(FactoryId(3), 1.0);
        assert!(matches!(result, Err(SessionError::UnknownFactory(FactoryId(3)))));
    }

    #[test]
    fn test_deposit_rejection_carries_id() {
        let mut session = session(0);
        let id = session.place_factory(FactoryKind::Air).unwrap();

        let err = session.deposit(id, 1_000.0).unwrap_err();
        match err {
            SessionError::Factory { id: failed, source } => {
                assert_eq!(failed, id);
                assert!(matches!(source, FactoryError::InsufficientStorageSpace { .. }));
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_tick_steps_all_factories() {
        let mut session = session(0);
        let air = session.place_factory(FactoryKind::Air).unwrap();
        let forest = session.place_factory(FactoryKind::Forest).unwrap();
        session.deposit(air, 50.0).unwrap();
        session.deposit(forest, 50.0).unwrap();

        session.tick(1.0);

        assert_eq!(session.current_tick(), 1);
        assert_eq!(session.elapsed_seconds(), 1.0);
        // Default table: air 10/s, forest 12/s
        assert_eq!(session.factory(air).unwrap().storage_level(), 40.0);
        assert_eq!(session.factory(forest).unwrap().storage_level(), 38.0);
        // Both pollute air: 1.0 + 0.5
        assert_eq!(session.ecology().level(EcologyCategory::Air), 1.5);
        assert_eq!(session.ecology().level(EcologyCategory::Forest), 1.5);
        assert_eq!(session.ecology().level(EcologyCategory::Water), 0.0);
        assert!((session.dissatisfaction().level() - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_upgrade_charges_shared_money() {
        let mut session = session(100);
        let air = session.place_factory(FactoryKind::Air).unwrap();

        let tier = session.upgrade(air).unwrap();
        assert_eq!(tier.cost, 50);
        assert_eq!(session.money().amount(), 50);

        assert!(session.upgrade(air).is_err());
        assert_eq!(session.factory(air).unwrap().current_upgrade(), 1);
    }

    #[test]
    fn test_snapshot_reflects_state() {
        let mut session = session(10);
        let water = session.place_factory(FactoryKind::Water).unwrap();
        session.deposit(water, 30.0).unwrap();
        session.tick(1.0);

        let snapshot = session.snapshot("snap_000001", "test");

        assert_eq!(snapshot.tick, 1);
        assert_eq!(snapshot.money, 10);
        assert_eq!(snapshot.factories.len(), 1);
        let factory = &snapshot.factories[0];
        assert_eq!(factory.kind, FactoryKind::Water);
        assert_eq!(factory.storage_level, 15.0);
        assert!(factory.is_burning);
        assert_eq!(factory.next_upgrade_cost, Some(120));
        assert_eq!(snapshot.ecology.water, 2.0);
    }
}
