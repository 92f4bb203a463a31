//! # Healthcare Finance Analytics
//!
//! Derives a consolidated financial picture for a hospital from three
//! independently sourced, partially malformed datasets: billing payments,
//! payroll and inventory.
//!
//! ## Core Concepts
//!
//! - **Normalization**: every raw amount goes through [`normalize`]; anything
//!   unreadable counts as `0`, never NaN
//! - **Aggregation**: revenue and expense summaries with groupings by method,
//!   hospital, month and inventory category
//! - **KPIs**: profit margin, ROI, expense ratio and collection rate, each
//!   guarded against a zero denominator
//! - **Trend**: revenue and payroll expense joined per calendar month
//! - **Insights**: a fixed rule table turned into priority-ordered advice
//!
//! Every call is a pure function of its inputs. Nothing is cached between
//! calls, so reports for different requests can be generated concurrently.
//!
//! ## Example
//!
//! ```rust,ignore
//! use healthcare_finance_analytics::*;
//! use chrono::NaiveDate;
//!
//! let dataset = FinancialDataset::from_json(r#"{
//!     "payments": [{ "date": "2024-03-02", "totalAmount": 1200, "amountPaid": "1200" }],
//!     "payroll": [{ "employeeId": "E1", "grossSalary": 100000, "payrollMonth": "March", "payrollYear": 2024 }],
//!     "inventory": [{ "category": "Drugs", "price": "4.5", "quantity": 200 }]
//! }"#).unwrap();
//!
//! let request = ReportRequest::for_year(2024, NaiveDate::from_ymd_opt(2024, 12, 31).unwrap());
//! let report = generate_financial_report(&dataset, &request).unwrap();
//!
//! for insight in &report.insights {
//!     println!("[{:?}] {}: {}", insight.priority, insight.title, insight.message);
//! }
//! ```

pub mod config;
pub mod error;
pub mod expenses;
pub mod insights;
pub mod metrics;
pub mod normalizer;
pub mod payments;
pub mod request;
pub mod revenue;
pub mod schema;
pub mod statutory;
pub mod trend;
pub mod utils;

pub use config::{AnalyticsConfig, InsightThresholds, StatutoryRates};
pub use error::{AnalyticsError, Result};
pub use expenses::{
    aggregate_expenses, aggregate_expenses_with_rates, CategoryTotals, ExpenseSummary,
    MonthlyPayroll, PayrollTotals,
};
pub use insights::{
    generate_insights, generate_insights_with, AdvisoryInsight, InsightType, Priority,
};
pub use metrics::{compute_kpis, KpiSet};
pub use normalizer::normalize;
pub use payments::{categorize, overdue_critical, PartitionSummary, PaymentPartition, PaymentStatus};
pub use request::{PeriodFilter, ReportPeriod, ReportRequest};
pub use revenue::{aggregate_revenue, RevenueGroup, RevenueSummary};
pub use schema::*;
pub use statutory::{apply_epf_backfill, plan_epf_backfill, Contributions, EpfBackfillEntry};
pub use trend::{
    build_monthly_trend, build_monthly_trend_window, growth_rate, year_comparison, MonthlyBucket,
    YearComparison,
};
pub use utils::PeriodKey;

use chrono::Datelike;
use log::{debug, info};
use serde::Serialize;

/// Everything derived for one [`ReportRequest`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialReport {
    pub request: ReportRequest,
    pub revenue: RevenueSummary,
    pub expenses: ExpenseSummary,
    pub kpis: KpiSet,
    pub monthly_trend: Vec<MonthlyBucket>,
    /// Trailing 3-month revenue growth over the trend, in percent.
    pub revenue_growth_rate: f64,
    /// Same measure over the profit column.
    pub profit_growth_rate: f64,
    pub year_comparison: YearComparison,
    pub payment_status: PartitionSummary,
    pub overdue_critical: usize,
    pub insights: Vec<AdvisoryInsight>,
}

pub struct FinancialAnalyticsProcessor {
    config: AnalyticsConfig,
}

impl Default for FinancialAnalyticsProcessor {
    fn default() -> Self {
        Self {
            config: AnalyticsConfig::default(),
        }
    }
}

impl FinancialAnalyticsProcessor {
    pub fn new(config: AnalyticsConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    pub fn process(
        &self,
        dataset: &FinancialDataset,
        request: &ReportRequest,
    ) -> Result<FinancialReport> {
        let filtered = request.apply(dataset)?;
        if filtered.is_empty() {
            debug!("No records fall in period '{}'; report will be zeroed", request.period);
        }

        info!(
            "Generating financial report for period '{}' as of {}",
            request.period, request.as_of
        );
        debug!(
            "Report input: {} of {} payments, {} of {} payroll records, {} inventory items",
            filtered.payments.len(),
            dataset.payments.len(),
            filtered.payroll.len(),
            dataset.payroll.len(),
            filtered.inventory.len()
        );

        let revenue = aggregate_revenue(&filtered.payments);
        let expenses = aggregate_expenses_with_rates(
            &filtered.payroll,
            &filtered.inventory,
            &self.config.statutory_rates,
        );
        let kpis = compute_kpis(&revenue, &expenses);

        let revenue_by_month = revenue.revenue_by_month();
        let monthly_trend = build_monthly_trend_window(
            &revenue_by_month,
            &expenses.expense_by_month(),
            self.config.trend_months,
        );
        let revenue_growth_rate = trend::revenue_growth_rate(&monthly_trend);
        let profit_growth_rate = trend::profit_growth_rate(&monthly_trend);

        // Year-over-year needs the previous year, which a period filter would
        // have removed, so it runs on the unfiltered payments.
        let all_revenue_by_month = if request.period == ReportPeriod::All {
            revenue_by_month
        } else {
            aggregate_revenue(&dataset.payments).revenue_by_month()
        };
        let year_comparison = year_comparison(&all_revenue_by_month, request.as_of.year());

        let partition = categorize(&filtered.payments);
        let payment_status = partition.summary();
        let overdue_critical = partition.overdue_critical(request.as_of, self.config.overdue_days);

        let insights =
            generate_insights_with(&kpis, &revenue, &self.config.insight_thresholds);

        info!(
            "Report complete: net result {:.2}, {} insights, {} overdue-critical invoices",
            kpis.net_result,
            insights.len(),
            overdue_critical
        );

        Ok(FinancialReport {
            request: request.clone(),
            revenue,
            expenses,
            kpis,
            monthly_trend,
            revenue_growth_rate,
            profit_growth_rate,
            year_comparison,
            payment_status,
            overdue_critical,
            insights,
        })
    }
}

pub fn generate_financial_report(
    dataset: &FinancialDataset,
    request: &ReportRequest,
) -> Result<FinancialReport> {
    FinancialAnalyticsProcessor::default().process(dataset, request)
}
