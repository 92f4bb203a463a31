use crate::config::DEFAULT_TREND_MONTHS;
use crate::utils::{ratio_percent, PeriodKey};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const GROWTH_WINDOW: usize = 3;

/// One month of the joined profit/loss series.
///
/// `profit` and `profit_margin` are derived in [`MonthlyBucket::new`]; fields are
/// private so they cannot drift from revenue and expenses. Deserialization reads
/// only the period and the two inputs and derives the rest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "BucketInputs")]
pub struct MonthlyBucket {
    period_key: PeriodKey,
    month: String,
    year: i32,
    revenue: f64,
    expenses: f64,
    profit: f64,
    profit_margin: f64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BucketInputs {
    period_key: PeriodKey,
    #[serde(default)]
    revenue: f64,
    #[serde(default)]
    expenses: f64,
}

impl From<BucketInputs> for MonthlyBucket {
    fn from(inputs: BucketInputs) -> Self {
        Self::new(inputs.period_key, inputs.revenue, inputs.expenses)
    }
}

impl MonthlyBucket {
    pub fn new(period_key: PeriodKey, revenue: f64, expenses: f64) -> Self {
        let profit = revenue - expenses;
        Self {
            period_key,
            month: period_key.month_label().to_string(),
            year: period_key.year,
            revenue,
            expenses,
            profit,
            profit_margin: ratio_percent(profit, revenue),
        }
    }

    pub fn period_key(&self) -> PeriodKey {
        self.period_key
    }

    pub fn month(&self) -> &str {
        &self.month
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn revenue(&self) -> f64 {
        self.revenue
    }

    pub fn expenses(&self) -> f64 {
        self.expenses
    }

    pub fn profit(&self) -> f64 {
        self.profit
    }

    pub fn profit_margin(&self) -> f64 {
        self.profit_margin
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearComparison {
    pub current_year: i32,
    pub previous_year: i32,
    pub current_revenue: f64,
    pub previous_revenue: f64,
    pub revenue_growth: f64,
}

/// Joins monthly revenue and expenses into the most recent 12 months.
pub fn build_monthly_trend(
    revenue_by_month: &BTreeMap<PeriodKey, f64>,
    expense_by_month: &BTreeMap<PeriodKey, f64>,
) -> Vec<MonthlyBucket> {
    build_monthly_trend_window(revenue_by_month, expense_by_month, DEFAULT_TREND_MONTHS)
}

/// Union join on period: a month known to only one side gets `0.0` for the
/// other. Output is ascending and keeps at most `months` trailing entries.
pub fn build_monthly_trend_window(
    revenue_by_month: &BTreeMap<PeriodKey, f64>,
    expense_by_month: &BTreeMap<PeriodKey, f64>,
    months: usize,
) -> Vec<MonthlyBucket> {
    let mut joined: BTreeMap<PeriodKey, (f64, f64)> = BTreeMap::new();
    for (key, revenue) in revenue_by_month {
        joined.entry(*key).or_default().0 += revenue;
    }
    for (key, expenses) in expense_by_month {
        joined.entry(*key).or_default().1 += expenses;
    }

    let skip = joined.len().saturating_sub(months);
    joined
        .into_iter()
        .skip(skip)
        .map(|(key, (revenue, expenses))| MonthlyBucket::new(key, revenue, expenses))
        .collect()
}

/// Trailing growth: average of the last 3 values against the average of the
/// 3 before them, in percent.
///
/// With fewer than 6 values the recent window shrinks to `min(3, n - 1)` so
/// both windows are non-empty. Returns `0.0` for fewer than 2 values or a
/// zero prior average.
pub fn growth_rate(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }

    let recent_len = GROWTH_WINDOW.min(n - 1);
    let split = n - recent_len;
    let prior = &values[split.saturating_sub(GROWTH_WINDOW)..split];
    let recent = &values[split..];

    let prior_avg = average(prior);
    let recent_avg = average(recent);
    ratio_percent(recent_avg - prior_avg, prior_avg)
}

/// [`growth_rate`] over the revenue column of a trend.
pub fn revenue_growth_rate(series: &[MonthlyBucket]) -> f64 {
    let revenue: Vec<f64> = series.iter().map(MonthlyBucket::revenue).collect();
    growth_rate(&revenue)
}

/// [`growth_rate`] over the profit column of a trend.
pub fn profit_growth_rate(series: &[MonthlyBucket]) -> f64 {
    let profit: Vec<f64> = series.iter().map(MonthlyBucket::profit).collect();
    growth_rate(&profit)
}

pub fn year_comparison(revenue_by_month: &BTreeMap<PeriodKey, f64>, current_year: i32) -> YearComparison {
    let previous_year = current_year - 1;
    let mut comparison = YearComparison {
        current_year,
        previous_year,
        ..Default::default()
    };

    for (key, revenue) in revenue_by_month {
        if key.year == current_year {
            comparison.current_revenue += revenue;
        } else if key.year == previous_year {
            comparison.previous_revenue += revenue;
        }
    }

    if comparison.previous_revenue > 0.0 {
        comparison.revenue_growth = ratio_percent(
            comparison.current_revenue - comparison.previous_revenue,
            comparison.previous_revenue,
        );
    }

    comparison
}

fn average(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(year: i32, month: u32) -> PeriodKey {
        PeriodKey { year, month }
    }

    #[test]
    fn test_union_join_keeps_one_sided_months() {
        let revenue = BTreeMap::from([(key(2024, 1), 1000.0), (key(2024, 3), 3000.0)]);
        let expenses = BTreeMap::from([(key(2024, 2), 500.0), (key(2024, 3), 1000.0)]);

        let trend = build_monthly_trend(&revenue, &expenses);
        assert_eq!(trend.len(), 3);

        assert_eq!(trend[0].period_key(), key(2024, 1));
        assert_eq!(trend[0].expenses(), 0.0);
        assert_eq!(trend[0].profit(), 1000.0);
        assert_eq!(trend[0].profit_margin(), 100.0);

        assert_eq!(trend[1].month(), "Feb");
        assert_eq!(trend[1].revenue(), 0.0);
        assert_eq!(trend[1].profit(), -500.0);
        assert_eq!(trend[1].profit_margin(), 0.0);

        assert_eq!(trend[2].profit(), 2000.0);
    }

    #[test]
    fn test_trend_sorted_across_years_and_truncated() {
        let mut revenue = BTreeMap::new();
        for month in 1..=12 {
            revenue.insert(key(2023, month), month as f64);
            revenue.insert(key(2024, month), 100.0 + month as f64);
        }
        let expenses = BTreeMap::from([(key(2022, 12), 50.0)]);

        let trend = build_monthly_trend(&revenue, &expenses);
        assert_eq!(trend.len(), 12);
        assert_eq!(trend[0].period_key(), key(2024, 1));
        assert_eq!(trend[11].period_key(), key(2024, 12));
        assert!(trend.windows(2).all(|w| w[0].period_key() < w[1].period_key()));

        let short = build_monthly_trend_window(&revenue, &expenses, 3);
        assert_eq!(short.len(), 3);
        assert_eq!(short[0].period_key(), key(2024, 10));
    }

    #[test]
    fn test_growth_rate_full_windows() {
        let values = [100.0, 100.0, 100.0, 150.0, 150.0, 150.0];
        assert_eq!(growth_rate(&values), 50.0);

        let values = [1.0, 1.0, 100.0, 100.0, 100.0, 120.0, 120.0, 120.0];
        assert_eq!(growth_rate(&values), 20.0);
    }

    #[test]
    fn test_growth_rate_short_series() {
        assert_eq!(growth_rate(&[]), 0.0);
        assert_eq!(growth_rate(&[500.0]), 0.0);
        assert_eq!(growth_rate(&[100.0, 150.0]), 50.0);
        assert_eq!(growth_rate(&[100.0, 200.0, 200.0, 200.0]), 100.0);
    }

    #[test]
    fn test_growth_rate_zero_prior() {
        assert_eq!(growth_rate(&[0.0, 0.0, 0.0, 10.0, 20.0, 30.0]), 0.0);
        assert_eq!(growth_rate(&[0.0, 0.0]), 0.0);
    }

    #[test]
    fn test_growth_over_trend_columns() {
        let revenue = BTreeMap::from([(key(2024, 1), 100.0), (key(2024, 2), 110.0)]);
        let expenses = BTreeMap::from([(key(2024, 1), 50.0), (key(2024, 2), 10.0)]);
        let trend = build_monthly_trend(&revenue, &expenses);

        assert!((revenue_growth_rate(&trend) - 10.0).abs() < 1e-9);
        assert_eq!(profit_growth_rate(&trend), 100.0);
    }

    #[test]
    fn test_year_comparison() {
        let revenue = BTreeMap::from([
            (key(2022, 6), 999.0),
            (key(2023, 1), 400.0),
            (key(2023, 7), 600.0),
            (key(2024, 2), 1200.0),
        ]);

        let comparison = year_comparison(&revenue, 2024);
        assert_eq!(comparison.current_revenue, 1200.0);
        assert_eq!(comparison.previous_revenue, 1000.0);
        assert!((comparison.revenue_growth - 20.0).abs() < 1e-9);

        let comparison = year_comparison(&revenue, 2026);
        assert_eq!(comparison.previous_revenue, 0.0);
        assert_eq!(comparison.revenue_growth, 0.0);
    }

    #[test]
    fn test_bucket_serializes_camel_case() {
        let bucket = MonthlyBucket::new(key(2024, 5), 200.0, 150.0);
        let json = serde_json::to_value(&bucket).unwrap();
        assert_eq!(json["periodKey"], "2024-05");
        assert_eq!(json["month"], "May");
        assert_eq!(json["profit"], 50.0);
        assert_eq!(json["profitMargin"], 25.0);
    }

    #[test]
    fn test_bucket_from_json_derives_profit() {
        let bucket: MonthlyBucket = serde_json::from_value(serde_json::json!({
            "periodKey": "2024-05",
            "month": "Dec",
            "year": 1999,
            "revenue": 100,
            "expenses": 40,
            "profit": 9999,
            "profitMargin": -5
        }))
        .unwrap();

        assert_eq!(bucket.profit(), bucket.revenue() - bucket.expenses());
        assert_eq!(bucket.profit(), 60.0);
        assert_eq!(bucket.profit_margin(), 60.0);
        assert_eq!(bucket.year(), 2024);
        assert_eq!(bucket.month(), "May");

        let round_trip: MonthlyBucket = serde_json::from_value(serde_json::to_value(&bucket).unwrap()).unwrap();
        assert_eq!(round_trip, bucket);
    }
}
