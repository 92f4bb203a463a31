use crate::error::{AnalyticsError, Result};
use crate::expenses::payroll_period;
use crate::schema::{FinancialDataset, RawPaymentRecord, RawPayrollRecord};
use crate::utils::{parse_date, text_field, validate_month, PeriodKey};
use chrono::{Datelike, NaiveDate};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ReportPeriod {
    #[default]
    All,
    Year,
    Month,
}

impl fmt::Display for ReportPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ReportPeriod::All => "all",
            ReportPeriod::Year => "year",
            ReportPeriod::Month => "month",
        };
        f.write_str(label)
    }
}

/// Caller-owned description of one report. The pipeline keeps no state
/// between requests; `as_of` stands in for "today" wherever a date is needed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportRequest {
    #[serde(default)]
    pub period: ReportPeriod,

    #[serde(default)]
    pub year: Option<i32>,

    #[serde(default)]
    pub month: Option<u32>,

    #[serde(default)]
    #[schemars(description = "Restrict payroll figures to one employee")]
    pub employee_id: Option<String>,

    #[schemars(description = "Reference date for overdue checks and the year-over-year comparison")]
    pub as_of: NaiveDate,
}

/// A validated request period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodFilter {
    All,
    Year(i32),
    Month(PeriodKey),
}

impl PeriodFilter {
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        match self {
            PeriodFilter::All => true,
            PeriodFilter::Year(year) => date.year() == *year,
            PeriodFilter::Month(key) => key.contains(date),
        }
    }

    pub fn contains_period(&self, key: PeriodKey) -> bool {
        match self {
            PeriodFilter::All => true,
            PeriodFilter::Year(year) => key.year == *year,
            PeriodFilter::Month(month) => *month == key,
        }
    }
}

impl ReportRequest {
    pub fn all(as_of: NaiveDate) -> Self {
        Self {
            period: ReportPeriod::All,
            year: None,
            month: None,
            employee_id: None,
            as_of,
        }
    }

    pub fn for_year(year: i32, as_of: NaiveDate) -> Self {
        Self {
            period: ReportPeriod::Year,
            year: Some(year),
            ..Self::all(as_of)
        }
    }

    pub fn for_month(year: i32, month: u32, as_of: NaiveDate) -> Self {
        Self {
            period: ReportPeriod::Month,
            year: Some(year),
            month: Some(month),
            ..Self::all(as_of)
        }
    }

    pub fn with_employee(mut self, employee_id: impl Into<String>) -> Self {
        self.employee_id = Some(employee_id.into());
        self
    }

    pub fn period_filter(&self) -> Result<PeriodFilter> {
        match self.period {
            ReportPeriod::All => Ok(PeriodFilter::All),
            ReportPeriod::Year => {
                let year = self
                    .year
                    .ok_or_else(|| AnalyticsError::MissingYear(self.period.to_string()))?;
                Ok(PeriodFilter::Year(year))
            }
            ReportPeriod::Month => {
                let year = self
                    .year
                    .ok_or_else(|| AnalyticsError::MissingYear(self.period.to_string()))?;
                let month = self.month.ok_or(AnalyticsError::MissingMonth)?;
                validate_month(month)?;
                Ok(PeriodFilter::Month(PeriodKey { year, month }))
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.period_filter().map(|_| ())
    }

    /// The slice of `dataset` this request covers.
    ///
    /// Payments are kept when their date falls in the period; undated payments
    /// only survive an `all` request. Payroll is matched on its payroll period
    /// and, when set, the employee id. Inventory has no date and is kept whole.
    pub fn apply(&self, dataset: &FinancialDataset) -> Result<FinancialDataset> {
        let filter = self.period_filter()?;

        let payments = dataset
            .payments
            .iter()
            .filter(|p| payment_in_period(p, &filter))
            .cloned()
            .collect();

        let payroll = dataset
            .payroll
            .iter()
            .filter(|r| payroll_in_period(r, &filter) && self.matches_employee(r))
            .cloned()
            .collect();

        Ok(FinancialDataset {
            payments,
            payroll,
            inventory: dataset.inventory.clone(),
        })
    }

    fn matches_employee(&self, record: &RawPayrollRecord) -> bool {
        match &self.employee_id {
            None => true,
            Some(wanted) => text_field(&record.employee_id).as_deref() == Some(wanted.trim()),
        }
    }
}

fn payment_in_period(payment: &RawPaymentRecord, filter: &PeriodFilter) -> bool {
    match (filter, parse_date(&payment.date)) {
        (PeriodFilter::All, _) => true,
        (_, Some(date)) => filter.contains_date(date),
        (_, None) => false,
    }
}

fn payroll_in_period(record: &RawPayrollRecord, filter: &PeriodFilter) -> bool {
    match (filter, payroll_period(record)) {
        (PeriodFilter::All, _) => true,
        (_, Some(key)) => filter.contains_period(key),
        (_, None) => false,
    }
}
