//! # Inventory Module
//!
//! Note stock as a plain value: the breakdown reads an [`Inventory`]
//! snapshot and emits a [`Consumption`]; the store decides whether and when
//! that consumption is written back.
//!
//! ## Snapshot Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  store ──snapshot──► Inventory {1000: 2, 500: 5}                        │
//! │                          │                                              │
//! │                          ▼                                              │
//! │            breakdown_with_limits(1500, ...)                             │
//! │                          │                                              │
//! │               Success ───┴─── Failure                                   │
//! │                  │               │                                      │
//! │     Consumption {1000: 1, 500: 1}   Consumption {} (nothing written)    │
//! │                  │                                                      │
//! │                  ▼                                                      │
//! │  store ◄──guarded decrement── {1000: 1, 500: 4}                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::amount::Amount;
use crate::breakdown::BreakdownLine;
use crate::error::{CoreError, CoreResult};
use crate::types::Denomination;
use crate::{DEFAULT_CRITICAL_STOCK_THRESHOLD, DEFAULT_LOW_STOCK_THRESHOLD};

// =============================================================================
// Inventory
// =============================================================================

/// Notes on hand per denomination value.
///
/// Values that are not present count as zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Inventory {
    counts: BTreeMap<i64, i64>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a snapshot from stored denominations.
    pub fn from_denominations(denominations: &[Denomination]) -> Self {
        denominations
            .iter()
            .map(|d| (d.value, d.available_count))
            .collect()
    }

    /// Count for `value`; zero when unknown.
    pub fn available(&self, value: i64) -> i64 {
        self.counts.get(&value).copied().unwrap_or(0)
    }

    pub fn set(&mut self, value: i64, count: i64) {
        self.counts.insert(value, count);
    }

    /// Adds notes to a denomination.
    pub fn restock(&mut self, value: i64, quantity: i64) {
        *self.counts.entry(value).or_insert(0) += quantity;
    }

    /// Checks every line of `consumption` against stock.
    pub fn covers(&self, consumption: &Consumption) -> bool {
        consumption
            .iter()
            .all(|(value, count)| self.available(value) >= count)
    }

    /// Removes the consumed notes, all or nothing.
    ///
    /// ## Errors
    /// `InsufficientNotes` for the first value that would go negative; the
    /// inventory is left untouched.
    pub fn apply(&mut self, consumption: &Consumption) -> CoreResult<()> {
        if let Some(shortfall) = consumption.overdraws(self).into_iter().next() {
            return Err(CoreError::InsufficientNotes {
                value: shortfall.value,
                available: shortfall.available,
                requested: shortfall.requested,
            });
        }

        for (value, count) in consumption.iter() {
            *self.counts.entry(value).or_insert(0) -= count;
        }
        Ok(())
    }

    /// `(value, count)` pairs, largest value first.
    pub fn iter(&self) -> impl Iterator<Item = (i64, i64)> + '_ {
        self.counts.iter().rev().map(|(&value, &count)| (value, count))
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Cash value of all notes on hand.
    pub fn total_value(&self) -> Amount {
        self.iter()
            .map(|(value, count)| Amount::from_units(value).times(count))
            .sum()
    }
}

impl FromIterator<(i64, i64)> for Inventory {
    fn from_iter<I: IntoIterator<Item = (i64, i64)>>(iter: I) -> Self {
        Inventory {
            counts: iter.into_iter().collect(),
        }
    }
}

// =============================================================================
// Consumption
// =============================================================================

/// Notes to remove from stock, per value. Counts are always positive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Consumption {
    counts: BTreeMap<i64, i64>,
}

/// A value the consumption would overdraw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shortfall {
    pub value: i64,
    pub available: i64,
    pub requested: i64,
}

impl Consumption {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_lines(lines: &[BreakdownLine]) -> Self {
        let mut consumption = Consumption::new();
        for line in lines {
            consumption.add(line.value, line.count);
        }
        consumption
    }

    /// Adds `count` notes of `value`; non-positive counts are ignored.
    pub fn add(&mut self, value: i64, count: i64) {
        if count > 0 {
            *self.counts.entry(value).or_insert(0) += count;
        }
    }

    /// Folds another consumption into this one.
    pub fn merge(&mut self, other: &Consumption) {
        for (value, count) in other.iter() {
            self.add(value, count);
        }
    }

    pub fn get(&self, value: i64) -> i64 {
        self.counts.get(&value).copied().unwrap_or(0)
    }

    /// `(value, count)` pairs, largest value first.
    pub fn iter(&self) -> impl Iterator<Item = (i64, i64)> + '_ {
        self.counts.iter().rev().map(|(&value, &count)| (value, count))
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn total_notes(&self) -> i64 {
        self.counts.values().sum()
    }

    pub fn total_value(&self) -> Amount {
        self.iter()
            .map(|(value, count)| Amount::from_units(value).times(count))
            .sum()
    }

    /// Values whose requested count exceeds `inventory`, largest first.
    pub fn overdraws(&self, inventory: &Inventory) -> Vec<Shortfall> {
        self.iter()
            .filter_map(|(value, requested)| {
                let available = inventory.available(value);
                (requested > available).then_some(Shortfall {
                    value,
                    available,
                    requested,
                })
            })
            .collect()
    }

    /// Consumption as breakdown lines, largest value first.
    pub fn lines(&self) -> Vec<BreakdownLine> {
        self.iter()
            .map(|(value, count)| BreakdownLine::new(value, count))
            .collect()
    }
}

// =============================================================================
// Stock Alerts
// =============================================================================

/// How close a denomination is to running out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StockLevel {
    Ok,
    Low,
    Critical,
}

/// Alert cut-offs. A count equal to a threshold falls into that band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertThresholds {
    pub low: i64,
    pub critical: i64,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        AlertThresholds {
            low: DEFAULT_LOW_STOCK_THRESHOLD,
            critical: DEFAULT_CRITICAL_STOCK_THRESHOLD,
        }
    }
}

impl AlertThresholds {
    /// ```rust
    /// use cashplan_core::inventory::{AlertThresholds, StockLevel};
    ///
    /// let t = AlertThresholds::default();
    /// assert_eq!(t.classify(10), StockLevel::Critical);
    /// assert_eq!(t.classify(20), StockLevel::Low);
    /// assert_eq!(t.classify(21), StockLevel::Ok);
    /// ```
    pub fn classify(&self, count: i64) -> StockLevel {
        if count <= self.critical {
            StockLevel::Critical
        } else if count <= self.low {
            StockLevel::Low
        } else {
            StockLevel::Ok
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockAlert {
    pub value: i64,
    pub available_count: i64,
    pub level: StockLevel,
}

/// Classifies every denomination, largest value first.
pub fn stock_alerts(
    denominations: &[Denomination],
    thresholds: AlertThresholds,
) -> Vec<StockAlert> {
    let mut alerts: Vec<StockAlert> = denominations
        .iter()
        .map(|d| StockAlert {
            value: d.value,
            available_count: d.available_count,
            level: thresholds.classify(d.available_count),
        })
        .collect();
    alerts.sort_by(|a, b| b.value.cmp(&a.value));
    alerts
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_value_is_zero() {
        let inventory: Inventory = [(500, 3)].into_iter().collect();
        assert_eq!(inventory.available(500), 3);
        assert_eq!(inventory.available(1_000), 0);
    }

    #[test]
    fn test_apply_is_all_or_nothing() {
        let mut inventory: Inventory = [(1_000, 2), (500, 1)].into_iter().collect();
        let mut consumption = Consumption::new();
        consumption.add(1_000, 1);
        consumption.add(500, 2);

        let err = inventory.apply(&consumption).unwrap_err();
        assert!(matches!(
            err,
            CoreError::InsufficientNotes {
                value: 500,
                available: 1,
                requested: 2
            }
        ));
        assert_eq!(inventory.available(1_000), 2);
        assert_eq!(inventory.available(500), 1);

        let mut ok = Consumption::new();
        ok.add(1_000, 2);
        inventory.apply(&ok).unwrap();
        assert_eq!(inventory.available(1_000), 0);
    }

    #[test]
    fn test_consumption_merge_and_totals() {
        let mut a =
            Consumption::from_lines(&[BreakdownLine::new(1_000, 1), BreakdownLine::new(500, 1)]);
        let b = Consumption::from_lines(&[BreakdownLine::new(500, 2)]);
        a.merge(&b);

        assert_eq!(a.get(500), 3);
        assert_eq!(a.total_notes(), 4);
        assert_eq!(a.total_value().units(), 2_500);
        assert_eq!(
            a.lines(),
            vec![BreakdownLine::new(1_000, 1), BreakdownLine::new(500, 3)]
        );

        a.add(250, 0);
        assert_eq!(a.get(250), 0);
    }

    #[test]
    fn test_overdraws_reports_each_shortfall() {
        let inventory: Inventory = [(500, 1), (250, 5)].into_iter().collect();
        let consumption =
            Consumption::from_lines(&[BreakdownLine::new(500, 2), BreakdownLine::new(250, 5)]);

        let shortfalls = consumption.overdraws(&inventory);
        assert_eq!(shortfalls.len(), 1);
        assert_eq!(shortfalls[0].value, 500);
        assert!(!inventory.covers(&consumption));
    }

    #[test]
    fn test_restock_and_total_value() {
        let mut inventory = Inventory::new();
        inventory.restock(250, 4);
        inventory.restock(250, 4);
        inventory.set(1_000, 1);
        assert_eq!(inventory.available(250), 8);
        assert_eq!(inventory.total_value().units(), 3_000);
        assert_eq!(inventory.iter().next(), Some((1_000, 1)));
    }

    #[test]
    fn test_stock_alerts() {
        let denominations = vec![
            Denomination::new(250, 25),
            Denomination::new(50_000, 5),
            Denomination::new(1_000, 20),
        ];
        let alerts = stock_alerts(&denominations, AlertThresholds::default());

        assert_eq!(alerts[0].value, 50_000);
        assert_eq!(alerts[0].level, StockLevel::Critical);
        assert_eq!(alerts[1].level, StockLevel::Low);
        assert_eq!(alerts[2].level, StockLevel::Ok);
    }
}
