//! Factory Model
//!
//! A single placed factory: garbage storage, the burn state machine, the
//! per-step update that emits pollution and dissatisfaction, and the ordered
//! upgrade tiers paid for from the shared currency ledger.

use std::fmt;
use std::rc::Rc;
use thiserror::Error;
use tracing::{debug, trace};

use eco_types::{FactoryKind, PollutionRates};

use crate::accumulators::{CurrencyLedger, DissatisfactionSink, EcologySink};
use crate::config::{ConfigError, FactoryConfig, FactoryConfigTable, UpgradeTier};
use crate::pollution;

/// Whether a factory is currently burning its stored garbage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BurnState {
    Idle,
    Burning,
}

/// Recoverable outcomes of storage and upgrade requests.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FactoryError {
    #[error("cannot store {requested} units, only {free} free")]
    InsufficientStorageSpace { requested: f32, free: f32 },
    #[error("storage amount must be finite and non-negative, got {0}")]
    InvalidAmount(f32),
    #[error("no upgrade tiers left")]
    NoUpgradeAvailable,
    #[error("upgrade costs {cost}, balance is {balance}")]
    InsufficientFunds { cost: u32, balance: u64 },
}

/// One placed factory of a given kind.
pub struct Factory {
    kind: FactoryKind,
    config: Rc<FactoryConfig>,
    storage_level: f32,
    burn_state: BurnState,
    current_upgrade: usize,
    pollution: PollutionRates,
    ledger: Rc<dyn CurrencyLedger>,
    dissatisfaction: Rc<dyn DissatisfactionSink>,
    ecology: Rc<dyn EcologySink>,
}

impl Factory {
    /// Creates an idle, empty, un-upgraded factory.
    ///
    /// Fails with [`ConfigError::NotFound`] when the table has no entry for `kind`.
    pub fn new(
        kind: FactoryKind,
        table: &FactoryConfigTable,
        ledger: Rc<dyn CurrencyLedger>,
        dissatisfaction: Rc<dyn DissatisfactionSink>,
        ecology: Rc<dyn EcologySink>,
    ) -> Result<Self, ConfigError> {
        let config = table.lookup(kind)?;
        let pollution = config.pollution;

        Ok(Self {
            kind,
            config,
            storage_level: 0.0,
            burn_state: BurnState::Idle,
            current_upgrade: 0,
            pollution,
            ledger,
            dissatisfaction,
            ecology,
        })
    }

    pub fn kind(&self) -> FactoryKind {
        self.kind
    }

    pub fn config(&self) -> &FactoryConfig {
        &self.config
    }

    // --- Storage ---

    pub fn storage_level(&self) -> f32 {
        self.storage_level
    }

    pub fn storage_capacity(&self) -> f32 {
        self.config.storage_capacity as f32
    }

    pub fn is_storage_full(&self) -> bool {
        self.storage_level >= self.storage_capacity()
    }

    pub fn free_space(&self) -> f32 {
        self.storage_capacity() - self.storage_level
    }

    /// Deposits garbage, starting the burn if storage becomes non-empty.
    ///
    /// Nothing changes when the request is rejected.
    pub fn try_add_to_storage(&mut self, amount: f32) -> Result<(), FactoryError> {
        if !amount.is_finite() || amount < 0.0 {
            return Err(FactoryError::InvalidAmount(amount));
        }

        let free = self.free_space();
        if amount > free {
            return Err(FactoryError::InsufficientStorageSpace {
                requested: amount,
                free,
            });
        }

        self.storage_level += amount;
        if self.storage_level > 0.0 && !self.is_burning() {
            self.start_burn();
        }
        Ok(())
    }

    /// Deposits garbage. Returns false, without mutating, when it does not fit.
    pub fn add_to_storage(&mut self, amount: f32) -> bool {
        self.try_add_to_storage(amount).is_ok()
    }

    // --- Burn lifecycle ---

    pub fn burn_state(&self) -> BurnState {
        self.burn_state
    }

    pub fn is_burning(&self) -> bool {
        self.burn_state == BurnState::Burning
    }

    pub fn start_burn(&mut self) {
        trace!("{} factory started burning", self.kind);
        self.burn_state = BurnState::Burning;
    }

    pub fn stop_burn(&mut self) {
        trace!("{} factory stopped burning", self.kind);
        self.burn_state = BurnState::Idle;
    }

    /// Advances the factory by `elapsed_seconds`.
    ///
    /// While burning: consumes stored garbage, stops once storage drops below
    /// zero, and emits this step's pollution and dissatisfaction either way.
    /// Storage is not clamped back to zero on the step that empties it.
    pub fn step(&mut self, elapsed_seconds: f32) {
        if !self.is_burning() {
            return;
        }

        let dt = if elapsed_seconds.is_finite() && elapsed_seconds > 0.0 {
            elapsed_seconds
        } else {
            0.0
        };

        self.storage_level -= self.config.burn_per_second * dt;
        if self.storage_level < 0.0 {
            self.stop_burn();
        }

        pollution::dispatch(self.kind, &self.pollution, dt, self.ecology.as_ref());
        self.dissatisfaction.add(self.config.dissatisfied_per_second * dt);
    }

    // --- Upgrades ---

    /// Number of tiers already bought.
    pub fn current_upgrade(&self) -> usize {
        self.current_upgrade
    }

    /// Total number of tiers for this kind.
    pub fn upgrade_count(&self) -> usize {
        self.config.upgrades.len()
    }

    /// Pollution rates currently in effect.
    pub fn pollution_rates(&self) -> PollutionRates {
        self.pollution
    }

    /// The next tier to buy, if any remain.
    pub fn next_upgrade(&self) -> Option<&UpgradeTier> {
        self.config.upgrades.get(self.current_upgrade)
    }

    /// Cost of the next tier whether or not it is affordable.
    pub fn next_upgrade_cost(&self) -> Option<u32> {
        self.next_upgrade().map(|tier| tier.cost)
    }

    /// True when a tier remains and the ledger can pay for it.
    pub fn can_upgrade(&self) -> bool {
        self.next_upgrade()
            .is_some_and(|tier| self.ledger.balance() >= u64::from(tier.cost))
    }

    /// Buys the next tier, replacing the current pollution rates.
    ///
    /// Either the ledger is charged and the tier applied, or nothing changes.
    pub fn try_upgrade(&mut self) -> Result<UpgradeTier, FactoryError> {
        let tier = self
            .next_upgrade()
            .cloned()
            .ok_or(FactoryError::NoUpgradeAvailable)?;

        let balance = self.ledger.balance();
        if balance < u64::from(tier.cost) {
            return Err(FactoryError::InsufficientFunds {
                cost: tier.cost,
                balance,
            });
        }

        // The ledger may still refuse if another spender got there first
        if !self.ledger.try_subtract(tier.cost) {
            return Err(FactoryError::InsufficientFunds {
                cost: tier.cost,
                balance: self.ledger.balance(),
            });
        }

        self.pollution = tier.pollution;
        self.current_upgrade += 1;
        debug!(
            "{} factory upgraded to tier {}/{} for {}",
            self.kind,
            self.current_upgrade,
            self.upgrade_count(),
            tier.cost
        );
        Ok(tier)
    }

    /// Buys the next tier. Returns false, without mutating, when it cannot.
    pub fn do_upgrade(&mut self) -> bool {
        self.try_upgrade().is_ok()
    }
}

impl fmt::Debug for Factory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Factory")
            .field("kind", &self.kind)
            .field("storage_level", &self.storage_level)
            .field("burn_state", &self.burn_state)
            .field("current_upgrade", &self.current_upgrade)
            .field("pollution", &self.pollution)
            .finish_non_exhaustive()
    }
}
