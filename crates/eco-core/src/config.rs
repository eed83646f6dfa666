//! Factory Configuration
//!
//! Per-kind factory settings, loaded once from a TOML file (or the built-in
//! defaults) and shared read-only by every factory of that kind.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::rc::Rc;
use thiserror::Error;

use eco_types::{FactoryKind, PollutionRates};

/// Default factory configuration file path
pub const DEFAULT_CONFIG_PATH: &str = "factories.toml";

/// One step of a factory's upgrade sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpgradeTier {
    /// One-time currency cost
    pub cost: u32,
    /// Pollution rates that replace the current ones once bought
    pub pollution: PollutionRates,
}

impl UpgradeTier {
    pub fn new(cost: u32, pollution: PollutionRates) -> Self {
        Self { cost, pollution }
    }
}

/// Settings shared by every factory of one kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactoryConfig {
    /// Maximum amount of garbage the storage holds
    pub storage_capacity: u32,
    /// Garbage burned per second while burning
    pub burn_per_second: f32,
    /// Dissatisfaction produced per second while burning
    pub dissatisfied_per_second: f32,
    /// Base pollution rates before any upgrade
    pub pollution: PollutionRates,
    /// Upgrade tiers, bought strictly in order
    #[serde(default)]
    pub upgrades: Vec<UpgradeTier>,
}

impl FactoryConfig {
    /// Checks that every rate is a finite, non-negative number.
    pub fn validate(&self, kind: FactoryKind) -> Result<(), ConfigError> {
        check_rate(kind, "burn_per_second", self.burn_per_second)?;
        check_rate(kind, "dissatisfied_per_second", self.dissatisfied_per_second)?;
        check_rates(kind, "pollution", &self.pollution)?;

        for (index, tier) in self.upgrades.iter().enumerate() {
            check_rates(kind, &format!("upgrades[{}].pollution", index), &tier.pollution)?;
        }
        Ok(())
    }
}

fn check_rates(kind: FactoryKind, field: &str, rates: &PollutionRates) -> Result<(), ConfigError> {
    check_rate(kind, &format!("{}.air", field), rates.air)?;
    check_rate(kind, &format!("{}.forest", field), rates.forest)?;
    check_rate(kind, &format!("{}.water", field), rates.water)
}

fn check_rate(kind: FactoryKind, field: &str, value: f32) -> Result<(), ConfigError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ConfigError::Invalid {
            kind,
            field: field.to_string(),
            reason: format!("expected a finite, non-negative number, got {}", value),
        });
    }
    Ok(())
}

/// A kind paired with its settings, as written in the configuration file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorySet {
    pub kind: FactoryKind,
    pub settings: FactoryConfig,
}

impl FactorySet {
    pub fn new(kind: FactoryKind, settings: FactoryConfig) -> Self {
        Self { kind, settings }
    }
}

/// On-disk layout of the configuration file.
#[derive(Debug, Default, Serialize, Deserialize)]
struct ConfigFile {
    #[serde(default, rename = "factory")]
    factories: Vec<FactorySet>,
}

/// Read-only lookup table from factory kind to its configuration.
#[derive(Debug, Clone)]
pub struct FactoryConfigTable {
    configs: HashMap<FactoryKind, Rc<FactoryConfig>>,
}

impl FactoryConfigTable {
    /// Builds the table, rejecting duplicate kinds and invalid settings.
    pub fn from_sets(sets: impl IntoIterator<Item = FactorySet>) -> Result<Self, ConfigError> {
        let mut configs = HashMap::new();

        for set in sets {
            set.settings.validate(set.kind)?;
            if configs.insert(set.kind, Rc::new(set.settings)).is_some() {
                return Err(ConfigError::DuplicateKind(set.kind));
            }
        }

        Ok(Self { configs })
    }

    /// Loads the table from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Parses the table from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(content)?;
        Self::from_sets(file.factories)
    }

    /// Renders the table as TOML, kinds in breadth order.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        let file = ConfigFile {
            factories: self.to_sets(),
        };
        Ok(toml::to_string_pretty(&file)?)
    }

    /// Returns the configuration for a kind.
    pub fn lookup(&self, kind: FactoryKind) -> Result<Rc<FactoryConfig>, ConfigError> {
        self.configs
            .get(&kind)
            .cloned()
            .ok_or(ConfigError::NotFound(kind))
    }

    pub fn get(&self, kind: FactoryKind) -> Option<&FactoryConfig> {
        self.configs.get(&kind).map(Rc::as_ref)
    }

    pub fn contains(&self, kind: FactoryKind) -> bool {
        self.configs.contains_key(&kind)
    }

    /// Configured kinds in breadth order.
    pub fn kinds(&self) -> Vec<FactoryKind> {
        let mut kinds: Vec<FactoryKind> = self.configs.keys().copied().collect();
        kinds.sort();
        kinds
    }

    pub fn len(&self) -> usize {
        self.configs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }

    fn to_sets(&self) -> Vec<FactorySet> {
        self.kinds()
            .into_iter()
            .filter_map(|kind| {
                self.get(kind)
                    .map(|settings| FactorySet::new(kind, settings.clone()))
            })
            .collect()
    }
}

impl Default for FactoryConfigTable {
    fn default() -> Self {
        let sets = vec![
            FactorySet::new(
                FactoryKind::Air,
                FactoryConfig {
                    storage_capacity: 100,
                    burn_per_second: 10.0,
                    dissatisfied_per_second: 0.1,
                    pollution: PollutionRates::new(1.0, 0.0, 0.0),
                    upgrades: vec![
                        UpgradeTier::new(50, PollutionRates::new(0.7, 0.0, 0.0)),
                        UpgradeTier::new(120, PollutionRates::new(0.4, 0.0, 0.0)),
                        UpgradeTier::new(250, PollutionRates::new(0.2, 0.0, 0.0)),
                    ],
                },
            ),
            FactorySet::new(
                FactoryKind::Forest,
                FactoryConfig {
                    storage_capacity: 150,
                    burn_per_second: 12.0,
                    dissatisfied_per_second: 0.2,
                    pollution: PollutionRates::new(0.5, 1.5, 0.0),
                    upgrades: vec![
                        UpgradeTier::new(80, PollutionRates::new(0.3, 1.0, 0.0)),
                        UpgradeTier::new(200, PollutionRates::new(0.15, 0.5, 0.0)),
                    ],
                },
            ),
            FactorySet::new(
                FactoryKind::Water,
                FactoryConfig {
                    storage_capacity: 200,
                    burn_per_second: 15.0,
                    dissatisfied_per_second: 0.3,
                    pollution: PollutionRates::new(0.5, 1.0, 2.0),
                    upgrades: vec![
                        UpgradeTier::new(120, PollutionRates::new(0.4, 0.8, 1.5)),
                        UpgradeTier::new(300, PollutionRates::new(0.25, 0.5, 0.9)),
                        UpgradeTier::new(600, PollutionRates::new(0.1, 0.2, 0.4)),
                    ],
                },
            ),
        ];

        Self::from_sets(sets).expect("built-in factory table is valid")
    }
}

/// Generates the built-in configuration file content.
pub fn default_config_toml() -> Result<String, ConfigError> {
    FactoryConfigTable::default().to_toml()
}

/// Errors that can occur while building or looking up factory configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No entry for the requested kind
    #[error("no configuration for {0} factories")]
    NotFound(FactoryKind),
    /// A kind was listed more than once
    #[error("{0} factories are configured more than once")]
    DuplicateKind(FactoryKind),
    /// A setting is out of range
    #[error("invalid {field} for {kind} factories: {reason}")]
    Invalid {
        kind: FactoryKind,
        field: String,
        reason: String,
    },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn air_config(capacity: u32) -> FactoryConfig {
        FactoryConfig {
            storage_capacity: capacity,
            burn_per_second: 10.0,
            dissatisfied_per_second: 0.5,
            pollution: PollutionRates::new(1.0, 0.0, 0.0),
            upgrades: vec![UpgradeTier::new(10, PollutionRates::new(0.5, 0.0, 0.0))],
        }
    }

    #[test]
    fn test_default_table_has_all_kinds() {
        let table = FactoryConfigTable::default();
        assert_eq!(table.len(), 3);
        assert_eq!(table.kinds(), FactoryKind::ALL.to_vec());
        for kind in FactoryKind::ALL {
            assert!(!table.lookup(kind).unwrap().upgrades.is_empty());
        }
    }

    #[test]
    fn test_lookup_missing_kind() {
        let table =
            FactoryConfigTable::from_sets(vec![FactorySet::new(FactoryKind::Air, air_config(100))])
                .unwrap();

        assert!(table.contains(FactoryKind::Air));
        let err = table.lookup(FactoryKind::Water).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(FactoryKind::Water)));
    }

    #[test]
    fn test_lookup_shares_config() {
        let table = FactoryConfigTable::default();
        let a = table.lookup(FactoryKind::Forest).unwrap();
        let b = table.lookup(FactoryKind::Forest).unwrap();
        assert!(Rc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_duplicate_kind_rejected() {
        let result = FactoryConfigTable::from_sets(vec![
            FactorySet::new(FactoryKind::Air, air_config(100)),
            FactorySet::new(FactoryKind::Air, air_config(50)),
        ]);
        assert!(matches!(result, Err(ConfigError::DuplicateKind(FactoryKind::Air))));
    }

    #[test]
    fn test_negative_rate_rejected() {
        let mut config = air_config(100);
        config.upgrades[0].pollution.air = -1.0;

        let err = FactoryConfigTable::from_sets(vec![FactorySet::new(FactoryKind::Air, config)])
            .unwrap_err();
        match err {
            ConfigError::Invalid { kind, field, .. } => {
                assert_eq!(kind, FactoryKind::Air);
                assert_eq!(field, "upgrades[0].pollution.air");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_non_finite_burn_rejected() {
        let mut config = air_config(100);
        config.burn_per_second = f32::NAN;
        assert!(config.validate(FactoryKind::Air).is_err());
    }

    #[test]
    fn test_parse_toml() {
        let content = r#"
[[factory]]
kind = "forest"

[factory.settings]
storage_capacity = 80
burn_per_second = 8.0
dissatisfied_per_second = 0.25
pollution = { air = 0.5, forest = 1.5 }

[[factory.settings.upgrades]]
cost = 40
pollution = { air = 0.25, forest = 1.0 }
"#;
        let table = FactoryConfigTable::from_toml_str(content).unwrap();
        let forest = table.get(FactoryKind::Forest).unwrap();

        assert_eq!(forest.storage_capacity, 80);
        assert_eq!(forest.pollution.water, 0.0);
        assert_eq!(forest.upgrades.len(), 1);
        assert_eq!(forest.upgrades[0].cost, 40);
        assert!(!table.contains(FactoryKind::Air));
    }

    #[test]
    fn test_parse_error_reported() {
        let result = FactoryConfigTable::from_toml_str("[[factory]]\nkind = \"steel\"\n");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_default_toml_round_trip() {
        let toml = default_config_toml().unwrap();
        let parsed = FactoryConfigTable::from_toml_str(&toml).unwrap();

        for kind in FactoryKind::ALL {
            assert_eq!(parsed.get(kind), FactoryConfigTable::default().get(kind));
        }
    }

    #[test]
    fn test_empty_file_gives_empty_table() {
        let table = FactoryConfigTable::from_toml_str("").unwrap();
        assert!(table.is_empty());
    }
}
