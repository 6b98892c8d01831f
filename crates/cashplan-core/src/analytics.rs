//! # Analytics Module
//!
//! Aggregates saved calculations into dashboard figures.
//!
//! Everything here is a pure fold over [`CalculationRecord`]s; the store
//! only loads the rows.

use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::CalculationRecord;

/// Newest days kept in [`HistoryAnalytics::daily_stats`].
pub const DAILY_STATS_LIMIT: usize = 30;

/// Newest months kept in [`HistoryAnalytics::monthly_stats`].
pub const MONTHLY_STATS_LIMIT: usize = 12;

/// Salary bands as `(label, inclusive lower bound, exclusive upper bound)`.
const SALARY_BANDS: [(&str, i64, i64); 5] = [
    ("0-500K", 0, 500_000),
    ("500K-1M", 500_000, 1_000_000),
    ("1M-2M", 1_000_000, 2_000_000),
    ("2M-5M", 2_000_000, 5_000_000),
    ("5M+", 5_000_000, i64::MAX),
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DenominationUsage {
    pub count: i64,
    pub total_amount: i64,
}

/// Totals for one day (`date`, `YYYY-MM-DD`) or month (`YYYY-MM`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodStats {
    pub period: String,
    pub count: i64,
    pub total_salary: i64,
    pub total_notes: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryBand {
    pub label: String,
    pub count: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryAnalytics {
    pub total_calculations: i64,
    pub total_salary: i64,
    pub total_notes: i64,
    /// Rounded half up.
    pub avg_salary: i64,
    /// Rounded half up.
    pub avg_notes: i64,
    pub max_salary: i64,
    pub min_salary: i64,
    /// Keyed by note value.
    pub denomination_usage: BTreeMap<i64, DenominationUsage>,
    /// Newest first.
    pub daily_stats: Vec<PeriodStats>,
    /// Newest first.
    pub monthly_stats: Vec<PeriodStats>,
    pub salary_distribution: Vec<SalaryBand>,
}

/// Builds the analytics view over the full history.
///
/// An empty history yields zeros, empty period lists and empty bands.
pub fn summarize(records: &[CalculationRecord]) -> HistoryAnalytics {
    let mut analytics = HistoryAnalytics {
        salary_distribution: SALARY_BANDS
            .iter()
            .map(|(label, _, _)| SalaryBand {
                label: label.to_string(),
                count: 0,
            })
            .collect(),
        ..HistoryAnalytics::default()
    };

    if records.is_empty() {
        return analytics;
    }

    let mut daily: BTreeMap<String, PeriodStats> = BTreeMap::new();
    let mut monthly: BTreeMap<String, PeriodStats> = BTreeMap::new();

    analytics.max_salary = i64::MIN;
    analytics.min_salary = i64::MAX;

    for record in records {
        analytics.total_calculations += 1;
        analytics.total_salary = analytics.total_salary.saturating_add(record.salary);
        analytics.total_notes = analytics.total_notes.saturating_add(record.total_notes);
        analytics.max_salary = analytics.max_salary.max(record.salary);
        analytics.min_salary = analytics.min_salary.min(record.salary);

        for line in &record.breakdown {
            let usage = analytics.denomination_usage.entry(line.value).or_default();
            usage.count = usage.count.saturating_add(line.count);
            usage.total_amount = usage
                .total_amount
                .saturating_add(line.value.saturating_mul(line.count));
        }

        let day = record.created_at.format("%Y-%m-%d").to_string();
        let month = format!(
            "{}-{:02}",
            record.created_at.year(),
            record.created_at.month()
        );
        add_to_period(&mut daily, day, record);
        add_to_period(&mut monthly, month, record);

        if let Some(index) = SALARY_BANDS
            .iter()
            .position(|(_, low, high)| record.salary >= *low && record.salary < *high)
        {
            analytics.salary_distribution[index].count += 1;
        }
    }

    analytics.avg_salary = rounded_mean(analytics.total_salary, analytics.total_calculations);
    analytics.avg_notes = rounded_mean(analytics.total_notes, analytics.total_calculations);
    analytics.daily_stats = daily.into_values().rev().take(DAILY_STATS_LIMIT).collect();
    analytics.monthly_stats = monthly
        .into_values()
        .rev()
        .take(MONTHLY_STATS_LIMIT)
        .collect();

    analytics
}

fn add_to_period(
    periods: &mut BTreeMap<String, PeriodStats>,
    key: String,
    record: &CalculationRecord,
) {
    let stats = periods.entry(key.clone()).or_insert_with(|| PeriodStats {
        period: key,
        count: 0,
        total_salary: 0,
        total_notes: 0,
    });
    stats.count += 1;
    stats.total_salary = stats.total_salary.saturating_add(record.salary);
    stats.total_notes = stats.total_notes.saturating_add(record.total_notes);
}

/// Computed in `i128`; totals upstream saturate at `i64::MAX`.
fn rounded_mean(total: i64, count: i64) -> i64 {
    if count == 0 {
        return 0;
    }
    let (total, count) = (i128::from(total), i128::from(count));
    let mean = (2 * total + count).div_euclid(2 * count);
    i64::try_from(mean).unwrap_or(i64::MAX)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::breakdown::BreakdownLine;
    use chrono::{TimeZone, Utc};

    fn record(
        salary: i64,
        lines: Vec<BreakdownLine>,
        y: i32,
        m: u32,
        d: u32,
    ) -> CalculationRecord {
        let total_notes = lines.iter().map(|l| l.count).sum();
        CalculationRecord {
            id: uuid::Uuid::new_v4().to_string(),
            name: "Employee".to_string(),
            rank: String::new(),
            salary,
            breakdown: lines,
            total_notes,
            created_at: Utc.with_ymd_and_hms(y, m, d, 9, 30, 0).unwrap(),
        }
    }

    #[test]
    fn test_empty_history_is_all_zero() {
        let analytics = summarize(&[]);
        assert_eq!(analytics.total_calculations, 0);
        assert_eq!(analytics.avg_salary, 0);
        assert_eq!(analytics.max_salary, 0);
        assert!(analytics.daily_stats.is_empty());
        assert_eq!(analytics.salary_distribution.len(), 5);
        assert!(analytics.salary_distribution.iter().all(|b| b.count == 0));
    }

    #[test]
    fn test_totals_and_averages() {
        let records = vec![
            record(1_250_000, vec![BreakdownLine::new(50_000, 25)], 2026, 3, 1),
            record(750_000, vec![BreakdownLine::new(50_000, 15)], 2026, 3, 2),
            record(
                1_000_250,
                vec![BreakdownLine::new(50_000, 20), BreakdownLine::new(250, 1)],
                2026,
                4,
                2,
            ),
        ];
        let analytics = summarize(&records);

        assert_eq!(analytics.total_calculations, 3);
        assert_eq!(analytics.total_salary, 3_000_250);
        assert_eq!(analytics.total_notes, 61);
        assert_eq!(analytics.avg_salary, 1_000_083);
        assert_eq!(analytics.avg_notes, 20);
        assert_eq!(analytics.max_salary, 1_250_000);
        assert_eq!(analytics.min_salary, 750_000);

        let usage = analytics.denomination_usage[&50_000];
        assert_eq!(usage.count, 60);
        assert_eq!(usage.total_amount, 3_000_000);
        assert_eq!(analytics.denomination_usage[&250].count, 1);
    }

    #[test]
    fn test_periods_are_newest_first() {
        let records = vec![
            record(500_000, vec![], 2026, 3, 1),
            record(500_000, vec![], 2026, 3, 1),
            record(500_000, vec![], 2026, 5, 9),
        ];
        let analytics = summarize(&records);

        assert_eq!(analytics.daily_stats[0].period, "2026-05-09");
        assert_eq!(analytics.daily_stats[1].period, "2026-03-01");
        assert_eq!(analytics.daily_stats[1].count, 2);
        assert_eq!(analytics.monthly_stats[0].period, "2026-05");
        assert_eq!(analytics.monthly_stats[1].total_salary, 1_000_000);
    }

    #[test]
    fn test_salary_bands_use_inclusive_lower_bound() {
        let records = vec![
            record(499_999, vec![], 2026, 1, 1),
            record(500_000, vec![], 2026, 1, 1),
            record(2_000_000, vec![], 2026, 1, 1),
            record(9_000_000, vec![], 2026, 1, 1),
        ];
        let bands = summarize(&records).salary_distribution;
        let counts: Vec<i64> = bands.iter().map(|b| b.count).collect();
        assert_eq!(counts, vec![1, 1, 0, 1, 1]);
        assert_eq!(bands[4].label, "5M+");
    }

    #[test]
    fn test_daily_stats_are_capped() {
        let records: Vec<_> = (1..=31)
            .chain(1..=10)
            .enumerate()
            .map(|(i, d)| record(1_000, vec![], 2026, if i < 31 { 1 } else { 2 }, d))
            .collect();
        let analytics = summarize(&records);
        assert_eq!(analytics.daily_stats.len(), DAILY_STATS_LIMIT);
        assert_eq!(analytics.daily_stats[0].period, "2026-02-10");
    }

    #[test]
    fn test_rounded_mean_rounds_half_up() {
        assert_eq!(rounded_mean(5, 2), 3);
        assert_eq!(rounded_mean(4, 3), 1);
        assert_eq!(rounded_mean(0, 0), 0);
        assert_eq!(rounded_mean(i64::MAX, 1), i64::MAX);
    }

    #[test]
    fn test_oversized_salaries_do_not_overflow() {
        let huge = 5_000_000_000_000_000_000;
        let notes = || vec![BreakdownLine::new(50_000, 100_000_000_000_000)];
        let records = vec![
            record(huge, notes(), 2026, 1, 1),
            record(huge, notes(), 2026, 1, 1),
        ];
        let analytics = summarize(&records);

        assert_eq!(analytics.total_salary, i64::MAX);
        assert_eq!(analytics.avg_salary, i64::MAX / 2 + 1);
        assert_eq!(analytics.max_salary, huge);
        assert_eq!(analytics.denomination_usage[&50_000].total_amount, i64::MAX);
        assert_eq!(analytics.daily_stats[0].total_salary, i64::MAX);
        assert_eq!(analytics.salary_distribution[4].count, 2);
    }
}
