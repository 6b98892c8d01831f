//! # Breakdown Module
//!
//! Splits an amount into banknotes, largest value first.
//!
//! ## Greedy Walk
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  amount = 1,750    denominations = {1000, 500, 250}                     │
//! │                                                                         │
//! │  1000: 1750 / 1000 = 1  → take 1   remaining   750                      │
//! │   500:  750 /  500 = 1  → take 1   remaining   250                      │
//! │   250:  250 /  250 = 1  → take 1   remaining     0  → Success           │
//! │                                                                         │
//! │  With an inventory the take is capped: min(remaining / d, available[d])│
//! │  A non-zero remainder at the end is a Failure carrying no lines.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## No Backtracking
//! The walk never revisits a larger note once it has moved past it. With
//! `{1000, 600}` and stock `{1000: 1, 600: 2}`, 1200 fails (1000 is taken,
//! 200 is left) even though `600 × 2` would pay it. Callers that need the
//! minimal-note answer select [`Strategy::Optimal`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::amount::Amount;
use crate::error::{CoreError, CoreResult, ValidationError};
use crate::inventory::{Consumption, Inventory};
use crate::types::default_image_name;
use crate::validation::validate_amount;
use crate::{optimal, DEFAULT_CURRENCY_CODE};

/// Message attached to every successful result.
pub const SUCCESS_MESSAGE: &str = "Calculation successful";

// =============================================================================
// Denomination Set
// =============================================================================

/// A validated, non-empty set of distinct positive note values in
/// descending order.
///
/// ## Example
/// ```rust
/// use cashplan_core::breakdown::DenominationSet;
///
/// let set = DenominationSet::new(&[250, 1000, 500]).unwrap();
/// assert_eq!(set.values(), &[1000, 500, 250]);
/// assert!(DenominationSet::new(&[500, 500]).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DenominationSet {
    values: Vec<i64>,
}

impl DenominationSet {
    /// Validates and sorts the given values.
    ///
    /// ## Errors
    /// - `NoDenominationsSelected` for an empty slice
    /// - `InvalidDenomination` for a zero or negative value
    /// - `DuplicateDenomination` when a value appears twice
    pub fn new(values: &[i64]) -> CoreResult<Self> {
        if values.is_empty() {
            return Err(CoreError::NoDenominationsSelected);
        }

        let mut seen = BTreeSet::new();
        for &value in values {
            if value <= 0 {
                return Err(CoreError::InvalidDenomination { value });
            }
            if !seen.insert(value) {
                return Err(CoreError::DuplicateDenomination { value });
            }
        }

        Ok(DenominationSet {
            values: seen.into_iter().rev().collect(),
        })
    }

    /// Values, largest first.
    pub fn values(&self) -> &[i64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always false; construction rejects empty input.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn contains(&self, value: i64) -> bool {
        self.values.contains(&value)
    }

    /// Greatest common divisor of all values.
    ///
    /// Every payable amount is a multiple of this.
    pub fn gcd(&self) -> i64 {
        self.values.iter().copied().fold(0, gcd)
    }
}

fn gcd(a: i64, b: i64) -> i64 {
    if b == 0 {
        a
    } else {
        gcd(b, a % b)
    }
}

// =============================================================================
// Result Types
// =============================================================================

/// One denomination in a breakdown. `count` is always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakdownLine {
    pub value: i64,
    pub count: i64,
}

impl BreakdownLine {
    pub const fn new(value: i64, count: i64) -> Self {
        BreakdownLine { value, count }
    }

    /// `value × count`.
    pub fn subtotal(&self) -> Amount {
        Amount::from_units(self.value).times(self.count)
    }

    pub fn image_name(&self) -> String {
        default_image_name(self.value)
    }
}

/// A successful breakdown: lines in descending value order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breakdown {
    pub lines: Vec<BreakdownLine>,
    pub total_notes: i64,
}

impl Breakdown {
    /// Wraps lines and derives the note total.
    pub fn from_lines(lines: Vec<BreakdownLine>) -> Self {
        let total_notes = lines.iter().map(|line| line.count).sum();
        Breakdown { lines, total_notes }
    }

    /// Sum of all subtotals. Equals the requested amount.
    pub fn total(&self) -> Amount {
        self.lines.iter().map(BreakdownLine::subtotal).sum()
    }

    /// Notes to remove from inventory for this breakdown.
    pub fn consumption(&self) -> Consumption {
        Consumption::from_lines(&self.lines)
    }
}

/// Why an amount could not be paid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The denominations cannot reach the amount even with unlimited notes.
    UnrepresentableAmount,
    /// The notes on hand ran out before the amount was reached.
    InsufficientSupply,
}

/// A failed breakdown. Carries no partial lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakdownFailure {
    pub amount: i64,
    pub remainder: i64,
    pub kind: FailureKind,
    pub reason: String,
}

impl BreakdownFailure {
    pub fn new(amount: i64, remainder: i64, kind: FailureKind) -> Self {
        BreakdownFailure {
            amount,
            remainder,
            kind,
            reason: failure_reason(amount, remainder, kind, DEFAULT_CURRENCY_CODE),
        }
    }

    /// Rewrites the reason for another currency code.
    pub fn with_currency(mut self, currency: &str) -> Self {
        self.reason = failure_reason(self.amount, self.remainder, self.kind, currency);
        self
    }
}

fn failure_reason(amount: i64, remainder: i64, kind: FailureKind, currency: &str) -> String {
    let amount = Amount::from_units(amount);
    let remainder = Amount::from_units(remainder);
    match kind {
        FailureKind::UnrepresentableAmount => format!(
            "Cannot make exact change for {amount} {currency} with the selected denominations. Remaining: {remainder} {currency}"
        ),
        FailureKind::InsufficientSupply => format!(
            "Cannot make exact change for {amount} {currency} with the available denominations. Remaining: {remainder} {currency}. Please add more denominations or increase available amounts."
        ),
    }
}

/// Outcome of a breakdown request.
///
/// ## Serialized Shape
/// ```json
/// {"status":"success","lines":[{"value":1000,"count":1}],"total_notes":1}
/// {"status":"failure","amount":300,"remainder":50,"kind":"unrepresentable_amount","reason":"..."}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BreakdownResult {
    Success(Breakdown),
    Failure(BreakdownFailure),
}

impl BreakdownResult {
    pub fn is_success(&self) -> bool {
        matches!(self, BreakdownResult::Success(_))
    }

    /// Lines of a success; empty for a failure.
    pub fn lines(&self) -> &[BreakdownLine] {
        match self {
            BreakdownResult::Success(breakdown) => &breakdown.lines,
            BreakdownResult::Failure(_) => &[],
        }
    }

    /// Note total of a success; zero for a failure.
    pub fn total_notes(&self) -> i64 {
        match self {
            BreakdownResult::Success(breakdown) => breakdown.total_notes,
            BreakdownResult::Failure(_) => 0,
        }
    }

    /// Unpaid amount; zero for a success.
    pub fn remainder(&self) -> i64 {
        match self {
            BreakdownResult::Success(_) => 0,
            BreakdownResult::Failure(failure) => failure.remainder,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            BreakdownResult::Success(_) => SUCCESS_MESSAGE,
            BreakdownResult::Failure(failure) => &failure.reason,
        }
    }

    /// Notes to remove from inventory. Empty for a failure.
    pub fn consumption(&self) -> Consumption {
        Consumption::from_lines(self.lines())
    }

    pub fn as_breakdown(&self) -> Option<&Breakdown> {
        match self {
            BreakdownResult::Success(breakdown) => Some(breakdown),
            BreakdownResult::Failure(_) => None,
        }
    }

    /// Applies a currency code to the failure reason, if any.
    pub fn with_currency(self, currency: &str) -> Self {
        match self {
            BreakdownResult::Failure(failure) => {
                BreakdownResult::Failure(failure.with_currency(currency))
            }
            success => success,
        }
    }
}

// =============================================================================
// Strategy
// =============================================================================

/// How notes are chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Largest note first, no backtracking.
    #[default]
    Greedy,
    /// Fewest notes, respecting stock. Bounded by
    /// [`optimal::MAX_OPTIMAL_STATES`].
    Optimal,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Greedy => write!(f, "greedy"),
            Strategy::Optimal => write!(f, "optimal"),
        }
    }
}

impl FromStr for Strategy {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "greedy" => Ok(Strategy::Greedy),
            "optimal" => Ok(Strategy::Optimal),
            _ => Err(ValidationError::NotAllowed {
                field: "strategy".to_string(),
                allowed: vec!["greedy".to_string(), "optimal".to_string()],
            }),
        }
    }
}

// =============================================================================
// Algorithms
// =============================================================================

/// Greedy breakdown with unlimited notes.
///
/// Expects a positive amount; use [`calculate`] for unvalidated input.
pub fn breakdown(amount: i64, denominations: &DenominationSet) -> BreakdownResult {
    greedy(amount, denominations, FailureKind::UnrepresentableAmount, |_| {
        i64::MAX
    })
}

/// Greedy breakdown capped by the notes on hand.
///
/// Values missing from `available` count as zero. The caller applies
/// `result.consumption()` to its stock only when the result is a success.
pub fn breakdown_with_limits(
    amount: i64,
    denominations: &DenominationSet,
    available: &Inventory,
) -> BreakdownResult {
    greedy(amount, denominations, FailureKind::InsufficientSupply, |value| {
        available.available(value)
    })
}

fn greedy<F>(
    amount: i64,
    denominations: &DenominationSet,
    kind: FailureKind,
    limit: F,
) -> BreakdownResult
where
    F: Fn(i64) -> i64,
{
    let mut remaining = amount;
    let mut lines = Vec::new();

    for &value in denominations.values() {
        if remaining < value {
            continue;
        }
        let take = (remaining / value).min(limit(value).max(0));
        if take > 0 {
            lines.push(BreakdownLine::new(value, take));
            remaining -= value * take;
        }
    }

    if remaining != 0 {
        return BreakdownResult::Failure(BreakdownFailure::new(amount, remaining, kind));
    }

    BreakdownResult::Success(Breakdown::from_lines(lines))
}

/// Validates input and runs the unlimited greedy breakdown.
///
/// ```rust
/// use cashplan_core::breakdown::calculate;
///
/// let result = calculate(300, &[250]).unwrap();
/// assert!(!result.is_success());
/// assert_eq!(result.remainder(), 50);
/// ```
pub fn calculate(amount: i64, denominations: &[i64]) -> CoreResult<BreakdownResult> {
    validate_amount(amount)?;
    let set = DenominationSet::new(denominations)?;
    Ok(breakdown(amount, &set))
}

/// Validates input and runs the stock-capped greedy breakdown.
///
/// Pure: `inventory` is not modified. The returned consumption equals the
/// success lines and is empty on failure.
pub fn calculate_with_inventory(
    amount: i64,
    denominations: &[i64],
    inventory: &Inventory,
) -> CoreResult<(BreakdownResult, Consumption)> {
    validate_amount(amount)?;
    let set = DenominationSet::new(denominations)?;
    let result = breakdown_with_limits(amount, &set, inventory);
    let consumption = result.consumption();
    Ok((result, consumption))
}

/// Runs the selected strategy, constrained when an inventory is given.
pub fn plan(
    amount: i64,
    denominations: &DenominationSet,
    inventory: Option<&Inventory>,
    strategy: Strategy,
) -> CoreResult<BreakdownResult> {
    validate_amount(amount)?;
    match (strategy, inventory) {
        (Strategy::Greedy, None) => Ok(breakdown(amount, denominations)),
        (Strategy::Greedy, Some(stock)) => Ok(breakdown_with_limits(amount, denominations, stock)),
        (Strategy::Optimal, stock) => optimal::solve(amount, denominations, stock),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn set(values: &[i64]) -> DenominationSet {
        DenominationSet::new(values).unwrap()
    }

    fn stock(pairs: &[(i64, i64)]) -> Inventory {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_denomination_set_validation() {
        assert!(matches!(
            DenominationSet::new(&[]),
            Err(CoreError::NoDenominationsSelected)
        ));
        assert!(matches!(
            DenominationSet::new(&[500, 0]),
            Err(CoreError::InvalidDenomination { value: 0 })
        ));
        assert!(matches!(
            DenominationSet::new(&[500, 250, 500]),
            Err(CoreError::DuplicateDenomination { value: 500 })
        ));
        assert_eq!(set(&[250, 50_000, 1_000]).values(), &[50_000, 1_000, 250]);
        assert_eq!(set(&[1_000, 600]).gcd(), 200);
        assert_eq!(set(&[250]).gcd(), 250);
    }

    #[test]
    fn test_unlimited_exact() {
        let result = calculate(1_750, &[1_000, 500, 250]).unwrap();
        assert_eq!(
            result.lines(),
            &[
                BreakdownLine::new(1_000, 1),
                BreakdownLine::new(500, 1),
                BreakdownLine::new(250, 1)
            ]
        );
        assert_eq!(result.total_notes(), 3);
        assert_eq!(result.message(), SUCCESS_MESSAGE);
    }

    #[test]
    fn test_unlimited_unrepresentable() {
        let result = calculate(300, &[250]).unwrap();
        match result {
            BreakdownResult::Failure(failure) => {
                assert_eq!(failure.remainder, 50);
                assert_eq!(failure.kind, FailureKind::UnrepresentableAmount);
                assert_eq!(
                    failure.reason,
                    "Cannot make exact change for 300 IQD with the selected denominations. Remaining: 50 IQD"
                );
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_input_is_rejected_before_running() {
        assert!(matches!(
            calculate(0, &[250]),
            Err(CoreError::InvalidAmount { amount: 0 })
        ));
        assert!(matches!(
            calculate(-5, &[250]),
            Err(CoreError::InvalidAmount { .. })
        ));
        assert!(matches!(
            calculate(1_000, &[]),
            Err(CoreError::NoDenominationsSelected)
        ));
    }

    #[test]
    fn test_lines_are_exact_descending_and_non_zero() {
        let denominations = [50_000, 25_000, 10_000, 5_000, 1_000, 500, 250];
        for amount in [250, 1_250_000, 1_450_000, 987_750, 50_000, 75_250] {
            let result = calculate(amount, &denominations).unwrap();
            let lines = result.lines();
            assert!(result.is_success());
            assert_eq!(lines.iter().map(|l| l.value * l.count).sum::<i64>(), amount);
            assert!(lines.iter().all(|l| l.count > 0));
            assert!(lines.windows(2).all(|w| w[0].value > w[1].value));
        }
    }

    #[test]
    fn test_deterministic_regardless_of_input_order() {
        let a = calculate(1_250_000, &[250, 500, 1_000, 25_000, 50_000]).unwrap();
        let b = calculate(1_250_000, &[50_000, 25_000, 1_000, 500, 250]).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_constrained_sufficient() {
        let inventory = stock(&[(1_000, 2), (500, 5)]);
        let (result, consumption) =
            calculate_with_inventory(1_500, &[1_000, 500], &inventory).unwrap();

        assert_eq!(
            result.lines(),
            &[BreakdownLine::new(1_000, 1), BreakdownLine::new(500, 1)]
        );

        let mut after = inventory.clone();
        after.apply(&consumption).unwrap();
        assert_eq!(after.available(1_000), 1);
        assert_eq!(after.available(500), 4);
    }

    #[test]
    fn test_constrained_falls_through_to_smaller_notes() {
        let inventory = stock(&[(1_000, 0), (500, 2)]);
        let (result, _) = calculate_with_inventory(1_000, &[1_000, 500], &inventory).unwrap();
        assert_eq!(result.lines(), &[BreakdownLine::new(500, 2)]);
    }

    #[test]
    fn test_constrained_missing_value_counts_as_zero() {
        let inventory = stock(&[(500, 10)]);
        let (result, _) = calculate_with_inventory(1_000, &[1_000, 500], &inventory).unwrap();
        assert_eq!(result.lines(), &[BreakdownLine::new(500, 2)]);
    }

    #[test]
    fn test_constrained_greedy_gap() {
        let inventory = stock(&[(1_000, 1), (600, 2)]);
        let (result, consumption) =
            calculate_with_inventory(1_200, &[1_000, 600], &inventory).unwrap();

        match &result {
            BreakdownResult::Failure(failure) => {
                assert_eq!(failure.remainder, 200);
                assert_eq!(failure.kind, FailureKind::InsufficientSupply);
                assert!(failure.reason.contains("available denominations"));
                assert!(failure.reason.ends_with("increase available amounts."));
            }
            other => panic!("expected failure, got {:?}", other),
        }
        assert!(consumption.is_empty());
        assert!(result.lines().is_empty());
    }

    #[test]
    fn test_constrained_never_exceeds_stock() {
        let inventory = stock(&[(50_000, 3), (25_000, 1), (10_000, 4), (1_000, 50)]);
        let (result, _) = calculate_with_inventory(
            245_000,
            &[50_000, 25_000, 10_000, 1_000],
            &inventory,
        )
        .unwrap();
        assert!(result.is_success());
        for line in result.lines() {
            assert!(line.count <= inventory.available(line.value));
        }
    }

    #[test]
    fn test_plan_dispatch() {
        let denominations = set(&[1_000, 600]);
        let inventory = stock(&[(1_000, 1), (600, 2)]);

        let greedy = plan(1_200, &denominations, Some(&inventory), Strategy::Greedy).unwrap();
        assert!(!greedy.is_success());

        let optimal = plan(1_200, &denominations, Some(&inventory), Strategy::Optimal).unwrap();
        assert_eq!(optimal.lines(), &[BreakdownLine::new(600, 2)]);

        assert!(plan(0, &denominations, None, Strategy::Optimal).is_err());
    }

    #[test]
    fn test_strategy_parse_and_display() {
        assert_eq!("greedy".parse::<Strategy>().unwrap(), Strategy::Greedy);
        assert_eq!(" Optimal ".parse::<Strategy>().unwrap(), Strategy::Optimal);
        assert!("fastest".parse::<Strategy>().is_err());
        assert_eq!(Strategy::Optimal.to_string(), "optimal");
        assert_eq!(Strategy::default(), Strategy::Greedy);
    }

    #[test]
    fn test_result_serialization_is_tagged() {
        let success = calculate(500, &[250]).unwrap();
        let json = serde_json::to_value(&success).unwrap();
        assert_eq!(json["status"], "success");
        assert_eq!(json["total_notes"], 2);

        let failure = calculate(300, &[250]).unwrap();
        let json = serde_json::to_value(&failure).unwrap();
        assert_eq!(json["status"], "failure");
        assert_eq!(json["kind"], "unrepresentable_amount");
        assert_eq!(json["remainder"], 50);
    }

    #[test]
    fn test_reason_groups_thousands_and_follows_currency() {
        let failure = calculate(1_250_100, &[50_000, 250])
            .unwrap()
            .with_currency("USD");
        assert_eq!(
            failure.message(),
            "Cannot make exact change for 1,250,100 USD with the selected denominations. Remaining: 100 USD"
        );
    }
}
