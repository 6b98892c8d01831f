//! # Amount Module
//!
//! Provides the `Amount` type for salaries, remainders and note subtotals.
//!
//! ## Why Whole Units?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Banknotes only exist in whole currency units (250, 500, 1000 ...).    │
//! │  Salaries are paid in the same units, so the engine never needs a      │
//! │  minor unit and never touches floating point:                          │
//! │                                                                         │
//! │    1,750 = 1000 × 1 + 500 × 1 + 250 × 1   (exact, integer only)        │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use cashplan_core::amount::Amount;
//!
//! let salary = Amount::from_units(1_750_000);
//! let note = Amount::from_units(25_000);
//!
//! assert_eq!((note * 70).units(), 1_750_000);
//! assert_eq!(salary.to_string(), "1,750,000");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

// =============================================================================
// Amount Type
// =============================================================================

/// A monetary value in whole currency units.
///
/// ## Design Decisions
/// - **i64 (signed)**: differences between amounts stay representable
/// - **Single field tuple struct**: zero-cost abstraction over i64
/// - **Transparent serde**: serializes as a plain JSON number
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Amount(i64);

impl Amount {
    /// Creates an amount from whole currency units.
    #[inline]
    pub const fn from_units(units: i64) -> Self {
        Amount(units)
    }

    /// Returns the value in whole currency units.
    #[inline]
    pub const fn units(&self) -> i64 {
        self.0
    }

    /// Returns the zero amount.
    #[inline]
    pub const fn zero() -> Self {
        Amount(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is strictly positive.
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Multiplies a note value by a note count.
    ///
    /// ```rust
    /// use cashplan_core::amount::Amount;
    ///
    /// let subtotal = Amount::from_units(5_000).times(12);
    /// assert_eq!(subtotal.units(), 60_000);
    /// ```
    #[inline]
    pub const fn times(&self, count: i64) -> Self {
        Amount(self.0 * count)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Groups digits in threes: `1750000` displays as `1,750,000`.
///
/// ## Note
/// Currency codes are appended by the caller; the core has no notion of
/// locale.
impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.0.unsigned_abs().to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (index, ch) in digits.chars().enumerate() {
            if index > 0 && (digits.len() - index) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }
        if self.0 < 0 {
            write!(f, "-{}", grouped)
        } else {
            write!(f, "{}", grouped)
        }
    }
}

impl From<i64> for Amount {
    fn from(units: i64) -> Self {
        Amount(units)
    }
}

impl Add for Amount {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Amount(self.0 + other.0)
    }
}

impl AddAssign for Amount {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Amount {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Amount(self.0 - other.0)
    }
}

impl SubAssign for Amount {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Multiplication by a note count.
impl Mul<i64> for Amount {
    type Output = Self;

    #[inline]
    fn mul(self, count: i64) -> Self {
        Amount(self.0 * count)
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Amount>>(iter: I) -> Self {
        iter.fold(Amount::zero(), Add::add)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_groups_thousands() {
        assert_eq!(Amount::from_units(0).to_string(), "0");
        assert_eq!(Amount::from_units(250).to_string(), "250");
        assert_eq!(Amount::from_units(1_750).to_string(), "1,750");
        assert_eq!(Amount::from_units(100_000).to_string(), "100,000");
        assert_eq!(Amount::from_units(1_250_000).to_string(), "1,250,000");
        assert_eq!(Amount::from_units(-50).to_string(), "-50");
        assert_eq!(Amount::from_units(-12_500).to_string(), "-12,500");
    }

    #[test]
    fn test_arithmetic() {
        let a = Amount::from_units(1_000);
        let b = Amount::from_units(250);

        assert_eq!((a + b).units(), 1_250);
        assert_eq!((a - b).units(), 750);
        assert_eq!((b * 4).units(), 1_000);
        assert_eq!(b.times(3).units(), 750);

        let mut c = a;
        c -= b;
        c += b;
        assert_eq!(c, a);
    }

    #[test]
    fn test_sum_and_checks() {
        let total: Amount = [500, 250, 1_000]
            .into_iter()
            .map(Amount::from_units)
            .sum();
        assert_eq!(total.units(), 1_750);

        assert!(Amount::zero().is_zero());
        assert!(!Amount::zero().is_positive());
        assert!(Amount::from_units(1).is_positive());
        assert!(!Amount::from_units(-1).is_positive());
    }

    #[test]
    fn test_serializes_as_plain_number() {
        let json = serde_json::to_string(&Amount::from_units(1_750)).unwrap();
        assert_eq!(json, "1750");
        let back: Amount = serde_json::from_str("300").unwrap();
        assert_eq!(back.units(), 300);
    }
}
