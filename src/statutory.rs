//! Statutory payroll contributions (EPF/ETF) and the stored-EPF backfill.
//!
//! Contributions are always derived from gross salary at read time. Stored
//! `epf` values on payroll records are only looked at by the backfill, which
//! is an explicit operation the caller runs once; aggregation never rewrites
//! records.

use crate::config::StatutoryRates;
use crate::error::{AnalyticsError, Result};
use crate::expenses::payroll_period;
use crate::normalizer::normalize;
use crate::schema::RawPayrollRecord;
use crate::utils::{text_field, PeriodKey};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contributions {
    pub employee_epf: f64,
    pub employer_epf: f64,
    pub employer_etf: f64,
}

impl StatutoryRates {
    /// Contributions on `gross_salary`, each rounded to the nearest whole unit.
    pub fn contributions(&self, gross_salary: f64) -> Contributions {
        Contributions {
            employee_epf: (gross_salary * self.employee_epf).round(),
            employer_epf: (gross_salary * self.employer_epf).round(),
            employer_etf: (gross_salary * self.employer_etf).round(),
        }
    }
}

/// One stored EPF value that disagrees with the derived one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpfBackfillEntry {
    /// Position of the record in the slice the plan was built from.
    pub index: usize,
    pub employee_id: Option<String>,
    pub period: Option<PeriodKey>,
    pub gross_salary: f64,
    pub stored_epf: Value,
    pub derived_epf: f64,
}

/// Lists every record whose stored `epf` differs from the employee EPF derived
/// from its gross salary. Read-only; nothing is modified.
pub fn plan_epf_backfill(
    records: &[RawPayrollRecord],
    rates: &StatutoryRates,
) -> Vec<EpfBackfillEntry> {
    let plan: Vec<EpfBackfillEntry> = records
        .iter()
        .enumerate()
        .filter_map(|(index, record)| {
            let gross_salary = normalize(&record.gross_salary);
            let derived_epf = rates.contributions(gross_salary).employee_epf;

            let matches = match &record.epf {
                Value::Null => false,
                stored => normalize(stored) == derived_epf,
            };
            if matches {
                return None;
            }

            Some(EpfBackfillEntry {
                index,
                employee_id: text_field(&record.employee_id),
                period: payroll_period(record),
                gross_salary,
                stored_epf: record.epf.clone(),
                derived_epf,
            })
        })
        .collect();

    debug!(
        "EPF backfill plan: {} of {} payroll records need rewriting",
        plan.len(),
        records.len()
    );

    plan
}

/// Applies a plan produced by [`plan_epf_backfill`] to the same records.
///
/// Every entry is checked against its record before anything is written, so a
/// stale plan leaves the records untouched. Returns the number of rewritten records.
pub fn apply_epf_backfill(
    records: &mut [RawPayrollRecord],
    plan: &[EpfBackfillEntry],
) -> Result<usize> {
    for entry in plan {
        let record = records
            .get(entry.index)
            .ok_or(AnalyticsError::BackfillMismatch { index: entry.index })?;
        if record.epf != entry.stored_epf || normalize(&record.gross_salary) != entry.gross_salary {
            return Err(AnalyticsError::BackfillMismatch { index: entry.index });
        }
    }

    for entry in plan {
        records[entry.index].epf = Value::from(entry.derived_epf);
    }

    info!("EPF backfill rewrote {} payroll records", plan.len());
    Ok(plan.len())
}
