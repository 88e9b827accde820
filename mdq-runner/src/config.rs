//! Serializable universe configuration.
//!
//! One TOML file captures everything a sweep needs: the as-of date,
//! the lookback, rule threshold overrides (defaulting to the values in
//! the rule structs themselves), the risk factor universe, and the
//! relational wiring (correlation peers, FX triangles).
//!
//! ```toml
//! as_of = "2024-06-28"
//! lookback_days = 400
//!
//! [rules.spike]
//! n_sigmas = 6.0
//!
//! [[risk_factors]]
//! id = "EURUSD"
//! asset_class = "fx"
//! description = "Euro / US dollar spot"
//! unit = "rate"
//!
//! [relations.correlation_peers]
//! US10Y = "US2Y"
//!
//! [[relations.triangles]]
//! ab = "EURUSD"
//! bc = "USDGBP"
//! ac = "EURGBP"
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;
use thiserror::Error;

use mdq_core::domain::{AssetClass, RiskFactor};
use mdq_core::engine::{RelationPolicy, DEFAULT_LOOKBACK_DAYS};
use mdq_core::rules::RuleSet;

/// Errors from loading or validating a universe config.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("universe has no risk factors")]
    EmptyUniverse,
    #[error("duplicate risk factor id '{0}'")]
    DuplicateRiskFactor(String),
    #[error("triangle leg '{0}' is not in the universe")]
    UnknownTriangleLeg(String),
}

/// One risk factor of the universe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskFactorEntry {
    pub id: String,
    pub asset_class: AssetClass,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub unit: String,
}

impl RiskFactorEntry {
    pub fn to_risk_factor(&self) -> RiskFactor {
        RiskFactor {
            id: self.id.clone(),
            asset_class: self.asset_class,
            description: self.description.clone(),
            unit: self.unit.clone(),
        }
    }
}

/// Full sweep configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UniverseConfig {
    pub as_of: NaiveDate,
    #[serde(default = "default_lookback")]
    pub lookback_days: u32,
    /// Rule thresholds; omitted tables keep the documented defaults.
    #[serde(default)]
    pub rules: RuleSet,
    pub risk_factors: Vec<RiskFactorEntry>,
    #[serde(default)]
    pub relations: RelationPolicy,
}

fn default_lookback() -> u32 {
    DEFAULT_LOOKBACK_DAYS
}

impl UniverseConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: UniverseConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a file path.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        Self::from_toml(&std::fs::read_to_string(path)?)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.risk_factors.is_empty() {
            return Err(ConfigError::EmptyUniverse);
        }
        let mut seen = BTreeSet::new();
        for rf in &self.risk_factors {
            if !seen.insert(rf.id.as_str()) {
                return Err(ConfigError::DuplicateRiskFactor(rf.id.clone()));
            }
        }
        for triangle in &self.relations.triangles {
            for leg in [&triangle.ab, &triangle.bc, &triangle.ac] {
                if !seen.contains(leg.as_str()) {
                    return Err(ConfigError::UnknownTriangleLeg(leg.clone()));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
        as_of = "2024-06-28"

        [[risk_factors]]
        id = "EURUSD"
        asset_class = "fx"
    "#;

    #[test]
    fn minimal_config_gets_defaults() {
        let config = UniverseConfig::from_toml(MINIMAL).unwrap();
        assert_eq!(config.lookback_days, 400);
        assert_eq!(config.rules, RuleSet::default());
        assert!(config.relations.triangles.is_empty());
        assert_eq!(config.risk_factors[0].asset_class, AssetClass::Fx);
    }

    #[test]
    fn rule_overrides_merge_with_defaults() {
        let text = r#"
            as_of = "2024-06-28"
            lookback_days = 90

            [rules.spike]
            n_sigmas = 5.0

            [rules.staleness]
            min_streak = 5

            [[risk_factors]]
            id = "US10Y"
            asset_class = "rates"
            description = "US 10y treasury yield"
            unit = "pct"
        "#;
        let config = UniverseConfig::from_toml(text).unwrap();
        assert_eq!(config.rules.spike.n_sigmas, 5.0);
        assert_eq!(config.rules.spike.window, 21); // default preserved
        assert_eq!(config.rules.staleness.min_streak, 5);
        assert_eq!(config.rules.reconcile, Default::default());
        assert_eq!(config.lookback_days, 90);
    }

    #[test]
    fn duplicate_risk_factor_rejected() {
        let text = r#"
            as_of = "2024-06-28"

            [[risk_factors]]
            id = "EURUSD"
            asset_class = "fx"

            [[risk_factors]]
            id = "EURUSD"
            asset_class = "fx"
        "#;
        assert!(matches!(
            UniverseConfig::from_toml(text),
            Err(ConfigError::DuplicateRiskFactor(_))
        ));
    }

    #[test]
    fn triangle_legs_must_be_in_universe() {
        let text = r#"
            as_of = "2024-06-28"

            [[risk_factors]]
            id = "EURUSD"
            asset_class = "fx"

            [[relations.triangles]]
            ab = "EURUSD"
            bc = "USDGBP"
            ac = "EURGBP"
        "#;
        assert!(matches!(
            UniverseConfig::from_toml(text),
            Err(ConfigError::UnknownTriangleLeg(leg)) if leg == "USDGBP"
        ));
    }

    #[test]
    fn empty_universe_rejected() {
        let text = r#"
            as_of = "2024-06-28"
            risk_factors = []
        "#;
        assert!(matches!(UniverseConfig::from_toml(text), Err(ConfigError::EmptyUniverse)));
    }

    #[test]
    fn config_round_trips_through_toml() {
        let config = UniverseConfig::from_toml(MINIMAL).unwrap();
        let text = toml::to_string(&config).unwrap();
        let back = UniverseConfig::from_toml(&text).unwrap();
        assert_eq!(config, back);
    }
}
