//! Deterministic vendor source selection.
//!
//! Each asset class carries two ordered preference lists, one for the
//! primary (basis) feed and one for the secondary (reconciliation
//! comparator). Selection is a pure function of the available source
//! names: same inputs, same pick, every time.

use std::collections::BTreeSet;

use crate::domain::AssetClass;

/// Resolved sources for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcePick {
    pub primary: String,
    /// Absent when no distinct secondary is available; all
    /// secondary-dependent rules are skipped for the run.
    pub secondary: Option<String>,
}

/// Picks primary and secondary vendor feeds per asset class.
#[derive(Debug, Clone, Copy, Default)]
pub struct SourceSelector;

impl SourceSelector {
    /// Primary preference order per asset class.
    pub fn primary_preferences(asset_class: AssetClass) -> &'static [&'static str] {
        match asset_class {
            AssetClass::Equities => &["yfinance", "stooq", "twelvedata"],
            AssetClass::Rates => &["fred", "twelvedata", "yfinance"],
            AssetClass::Fx => &["ecb_fx", "yfinance", "twelvedata"],
            AssetClass::Commodities => &["yfinance", "stooq", "twelvedata"],
        }
    }

    /// Secondary preference order per asset class.
    pub fn secondary_preferences(asset_class: AssetClass) -> &'static [&'static str] {
        match asset_class {
            AssetClass::Equities => &["stooq", "twelvedata", "yfinance"],
            AssetClass::Rates => &["twelvedata", "yfinance", "stooq"],
            AssetClass::Fx => &["yfinance", "twelvedata", "stooq"],
            AssetClass::Commodities => &["stooq", "twelvedata", "yfinance"],
        }
    }

    /// Resolve primary and secondary from the available source names.
    ///
    /// Primary: first primary preference present, else the
    /// lexicographically smallest available name. Secondary: first
    /// secondary preference present and distinct from primary, else none.
    /// Returns `None` only when no sources are available at all.
    pub fn pick(&self, asset_class: AssetClass, available: &BTreeSet<String>) -> Option<SourcePick> {
        if available.is_empty() {
            return None;
        }

        let primary = Self::primary_preferences(asset_class)
            .iter()
            .find(|name| available.contains(**name))
            .map(|name| name.to_string())
            // BTreeSet iterates sorted, so first() is the lexicographic minimum.
            .unwrap_or_else(|| available.iter().next().cloned().unwrap_or_default());

        let secondary = Self::secondary_preferences(asset_class)
            .iter()
            .find(|name| available.contains(**name) && **name != primary)
            .map(|name| name.to_string());

        Some(SourcePick { primary, secondary })
    }
}
