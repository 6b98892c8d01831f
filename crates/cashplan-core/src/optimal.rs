//! # Optimal Strategy
//!
//! Minimal-note breakdown with optional stock limits (bounded change making).
//!
//! ## Table Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Amounts are scaled down by g = gcd(denominations):                     │
//! │                                                                         │
//! │      {1000, 600}, 1200  →  g = 200, steps {5, 3}, target 6              │
//! │                                                                         │
//! │  One layer per denomination, smallest first:                            │
//! │                                                                         │
//! │      layer[k][t] = fewest notes paying t·g with the first k values      │
//! │                                                                         │
//! │  Each layer allows 0..=limit notes of its value. A sliding-window       │
//! │  minimum per residue class keeps a layer at O(target) work.             │
//! │                                                                         │
//! │  Reconstruction walks the layers back from the largest value, taking    │
//! │  the most notes of each value that still reach the optimum.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Tables grow with `amount / g`, so the target is capped at
//! [`MAX_OPTIMAL_STATES`].

use std::collections::VecDeque;

use crate::breakdown::{
    Breakdown, BreakdownFailure, BreakdownLine, BreakdownResult, DenominationSet, FailureKind,
};
use crate::error::{CoreError, CoreResult};
use crate::inventory::Inventory;

/// Largest table (`amount / gcd + 1` entries per layer) the solver builds.
pub const MAX_OPTIMAL_STATES: i64 = 200_000;

const UNREACHABLE: i64 = i64::MAX;

/// One denomination scaled to table units.
#[derive(Debug, Clone, Copy)]
struct Column {
    value: i64,
    step: usize,
    limit: i64,
}

/// Finds the fewest notes paying `amount` exactly.
///
/// With `inventory` each value is capped at its stock and a miss is
/// reported as `InsufficientSupply`; without it a miss is
/// `UnrepresentableAmount`. On a miss the remainder is measured from the
/// largest payable amount below the target.
///
/// ## Errors
/// `AmountTooLargeForOptimal` when the table would exceed
/// [`MAX_OPTIMAL_STATES`].
pub fn solve(
    amount: i64,
    denominations: &DenominationSet,
    inventory: Option<&Inventory>,
) -> CoreResult<BreakdownResult> {
    let g = denominations.gcd();
    let states = amount / g + 1;
    if states > MAX_OPTIMAL_STATES {
        return Err(CoreError::AmountTooLargeForOptimal {
            amount,
            states,
            max: MAX_OPTIMAL_STATES,
        });
    }
    let target = (amount / g) as usize;

    let columns: Vec<Column> = denominations
        .values()
        .iter()
        .rev()
        .map(|&value| {
            let step = (value / g) as usize;
            let most = (target / step) as i64;
            let limit = inventory.map_or(most, |stock| stock.available(value).clamp(0, most));
            Column { value, step, limit }
        })
        .collect();

    let mut base = vec![UNREACHABLE; target + 1];
    base[0] = 0;
    let mut layers = vec![base];
    for column in &columns {
        let next = relax(&layers[layers.len() - 1], column.step, column.limit);
        layers.push(next);
    }

    let kind = if inventory.is_some() {
        FailureKind::InsufficientSupply
    } else {
        FailureKind::UnrepresentableAmount
    };

    let last = &layers[columns.len()];
    let reached = (0..=target)
        .rev()
        .find(|&t| last[t] != UNREACHABLE)
        .unwrap_or(0);

    if amount % g != 0 || reached != target {
        let remainder = amount - reached as i64 * g;
        return Ok(BreakdownResult::Failure(BreakdownFailure::new(
            amount, remainder, kind,
        )));
    }

    let mut t = target;
    let mut lines = Vec::new();
    for (index, column) in columns.iter().enumerate().rev() {
        let prev = &layers[index];
        let best = layers[index + 1][t];
        let most = ((t / column.step) as i64).min(column.limit);

        let Some(count) = (0..=most).rev().find(|&count| {
            let rest = t - count as usize * column.step;
            prev[rest] != UNREACHABLE && prev[rest] + count == best
        }) else {
            break;
        };

        if count > 0 {
            lines.push(BreakdownLine::new(column.value, count));
            t -= count as usize * column.step;
        }
    }

    if t != 0 {
        let remainder = amount - (target - t) as i64 * g;
        return Ok(BreakdownResult::Failure(BreakdownFailure::new(
            amount, remainder, kind,
        )));
    }

    Ok(BreakdownResult::Success(Breakdown::from_lines(lines)))
}

/// Adds one denomination to a layer.
///
/// `next[j] = min over c in 0..=limit of prev[j - c·step] + c`, computed per
/// residue class as `min(prev[i] - q_i) + q_j` over a window of `limit + 1`
/// positions.
fn relax(prev: &[i64], step: usize, limit: i64) -> Vec<i64> {
    let len = prev.len();
    let mut next = vec![UNREACHABLE; len];
    let mut window: VecDeque<(i64, i64)> = VecDeque::new();

    for residue in 0..step.min(len) {
        window.clear();
        let mut q: i64 = 0;
        let mut j = residue;
        while j < len {
            if prev[j] != UNREACHABLE {
                let key = prev[j] - q;
                while window.back().is_some_and(|&(_, back)| back >= key) {
                    window.pop_back();
                }
                window.push_back((q, key));
            }
            while window.front().is_some_and(|&(front, _)| front + limit < q) {
                window.pop_front();
            }
            if let Some(&(_, key)) = window.front() {
                next[j] = key + q;
            }
            q += 1;
            j += step;
        }
    }

    next
}

// =============================================================================
// Unit Tests
// =============================================================================
