use crate::error::{AnalyticsError, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub const DEFAULT_TREND_MONTHS: usize = 12;
pub const DEFAULT_OVERDUE_DAYS: i64 = 30;

/// Statutory contribution rates, applied to gross salary only (bonuses excluded).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct StatutoryRates {
    #[schemars(description = "Employee EPF share of gross salary (0.08 = 8%)")]
    pub employee_epf: f64,

    #[schemars(description = "Employer EPF share of gross salary (0.12 = 12%)")]
    pub employer_epf: f64,

    #[schemars(description = "Employer ETF share of gross salary (0.03 = 3%)")]
    pub employer_etf: f64,
}

impl Default for StatutoryRates {
    fn default() -> Self {
        Self {
            employee_epf: 0.08,
            employer_epf: 0.12,
            employer_etf: 0.03,
        }
    }
}

impl StatutoryRates {
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("employeeEpf", self.employee_epf),
            ("employerEpf", self.employer_epf),
            ("employerEtf", self.employer_etf),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(AnalyticsError::InvalidStatutoryRate {
                    name: name.to_string(),
                    value,
                });
            }
        }
        Ok(())
    }
}

/// Percentage thresholds the insight rules compare KPIs against.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct InsightThresholds {
    #[schemars(description = "Profit margin (%) at or above which profitability is 'strong'")]
    pub strong_margin: f64,

    #[schemars(description = "Profit margin (%) at or above which profitability is 'healthy'")]
    pub healthy_margin: f64,

    #[schemars(description = "Expense ratio (%) above which a cost warning is raised")]
    pub expense_ratio_warning: f64,

    #[schemars(description = "Collection rate (%) below which a collection warning is raised")]
    pub collection_rate_warning: f64,
}

impl Default for InsightThresholds {
    fn default() -> Self {
        Self {
            strong_margin: 20.0,
            healthy_margin: 10.0,
            expense_ratio_warning: 80.0,
            collection_rate_warning: 90.0,
        }
    }
}

impl InsightThresholds {
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("strongMargin", self.strong_margin),
            ("healthyMargin", self.healthy_margin),
            ("expenseRatioWarning", self.expense_ratio_warning),
            ("collectionRateWarning", self.collection_rate_warning),
        ] {
            if !value.is_finite() {
                return Err(AnalyticsError::InvalidThreshold {
                    name: name.to_string(),
                    value,
                    details: "must be a finite percentage".to_string(),
                });
            }
        }

        if self.healthy_margin > self.strong_margin {
            return Err(AnalyticsError::InvalidThreshold {
                name: "healthyMargin".to_string(),
                value: self.healthy_margin,
                details: format!(
                    "must not exceed strongMargin ({})",
                    self.strong_margin
                ),
            });
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalyticsConfig {
    pub statutory_rates: StatutoryRates,

    pub insight_thresholds: InsightThresholds,

    #[schemars(description = "Number of most recent months kept in the monthly trend")]
    pub trend_months: usize,

    #[schemars(description = "Days after which an unpaid invoice counts as overdue-critical")]
    pub overdue_days: i64,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            statutory_rates: StatutoryRates::default(),
            insight_thresholds: InsightThresholds::default(),
            trend_months: DEFAULT_TREND_MONTHS,
            overdue_days: DEFAULT_OVERDUE_DAYS,
        }
    }
}

impl AnalyticsConfig {
    pub fn validate(&self) -> Result<()> {
        self.statutory_rates.validate()?;
        self.insight_thresholds.validate()?;
        if self.trend_months == 0 {
            return Err(AnalyticsError::InvalidTrendWindow(self.trend_months));
        }
        if self.overdue_days < 0 {
            return Err(AnalyticsError::InvalidThreshold {
                name: "overdueDays".to_string(),
                value: self.overdue_days as f64,
                details: "must not be negative".to_string(),
            });
        }
        Ok(())
    }

    /// Parses and validates a JSON config. Omitted fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(AnalyticsConfig)
    }
}
