//! Scenario Driver
//!
//! Scripted stand-in for the player in headless runs: earns income, delivers
//! random loads of garbage to factories and, optionally, buys upgrades as soon
//! as they are affordable. Seeded, so a run is reproducible.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, trace};

use crate::session::Session;

/// Tuning for the scripted player.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioConfig {
    /// Chance per factory per tick that a garbage truck arrives
    pub delivery_chance: f32,
    /// Largest load a single truck carries
    pub max_delivery: f32,
    /// Currency earned every tick
    pub income_per_tick: u64,
    /// Buy the next upgrade whenever it is affordable
    pub auto_upgrade: bool,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            delivery_chance: 0.1,
            max_delivery: 40.0,
            income_per_tick: 1,
            auto_upgrade: false,
        }
    }
}

/// What the driver did during one tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    /// Garbage accepted into storage
    pub delivered: f32,
    /// Deliveries that did not fit and were cut down to the free space
    pub overflowed: u32,
    /// Garbage that could not be stored at all
    pub discarded: f32,
    /// Upgrades bought
    pub upgrades: u32,
}

/// Seeded scripted player.
#[derive(Debug)]
pub struct Scenario {
    config: ScenarioConfig,
    rng: SmallRng,
}

impl Scenario {
    pub fn new(config: ScenarioConfig, seed: u64) -> Self {
        Self {
            config,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    pub fn config(&self) -> &ScenarioConfig {
        &self.config
    }

    /// Applies income, deliveries and upgrades. Call before [`Session::tick`].
    pub fn apply(&mut self, session: &mut Session) -> TickReport {
        let mut report = TickReport::default();
        session.money().deposit(self.config.income_per_tick);

        let max_delivery = self.config.max_delivery.max(0.0);

        for id in session.factory_ids() {
            let Some(factory) = session.factory_mut(id) else {
                continue;
            };

            if self.rng.gen::<f32>() < self.config.delivery_chance {
                let load = self.rng.gen::<f32>() * max_delivery;

                if factory.add_to_storage(load) {
                    report.delivered += load;
                } else {
                    // Truck unloads what fits and dumps the rest
                    report.overflowed += 1;
                    let free = factory.free_space().max(0.0);
                    if free > 0.0 && factory.add_to_storage(free) {
                        report.delivered += free;
                    }
                    report.discarded += load - free;
                    trace!("{} overflowed, discarded {:.1}", id, load - free);
                }
            }

            if self.config.auto_upgrade && factory.can_upgrade() {
                if let Ok(tier) = factory.try_upgrade() {
                    report.upgrades += 1;
                    debug!("Scenario bought upgrade for {} at {}", id, tier.cost);
                }
            }
        }

        report
    }
}
