//! Asset class — drives calendar choice, source preference, and rule calibration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The four asset classes the engine evaluates.
///
/// A closed set: every calibration table in the rule battery is keyed
/// on this enum, so adding a class is a compile-time event, not a
/// config typo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetClass {
    Equities,
    Rates,
    Fx,
    Commodities,
}

impl AssetClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetClass::Equities => "equities",
            AssetClass::Rates => "rates",
            AssetClass::Fx => "fx",
            AssetClass::Commodities => "commodities",
        }
    }
}

impl fmt::Display for AssetClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for unknown asset class names.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown asset class '{0}'")]
pub struct ParseAssetClassError(pub String);

impl FromStr for AssetClass {
    type Err = ParseAssetClassError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "equities" => Ok(AssetClass::Equities),
            "rates" => Ok(AssetClass::Rates),
            "fx" => Ok(AssetClass::Fx),
            "commodities" => Ok(AssetClass::Commodities),
            other => Err(ParseAssetClassError(other.to_string())),
        }
    }
}
