use crate::config::StatutoryRates;
use crate::normalizer::normalize;
use crate::schema::{RawInventoryItem, RawPayrollRecord};
use crate::utils::{parse_month, parse_year, text_field, PeriodKey};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

pub const UNCATEGORIZED_LABEL: &str = "Uncategorized";

/// Payroll sums, either over the whole input or over one payroll period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayrollTotals {
    pub record_count: usize,
    pub gross_salary: f64,
    pub bonuses: f64,
    pub deductions: f64,
    pub employee_epf: f64,
    pub employer_epf: f64,
    pub employer_etf: f64,
    /// Take-home pay: gross + bonuses - deductions - employee EPF.
    pub net_pay: f64,
}

impl PayrollTotals {
    fn add(&mut self, record: &RawPayrollRecord, rates: &StatutoryRates) {
        let gross = normalize(&record.gross_salary);
        let bonuses = normalize(&record.bonuses);
        let deductions = normalize(&record.deductions);
        let contributions = rates.contributions(gross);

        self.record_count += 1;
        self.gross_salary += gross;
        self.bonuses += bonuses;
        self.deductions += deductions;
        self.employee_epf += contributions.employee_epf;
        self.employer_epf += contributions.employer_epf;
        self.employer_etf += contributions.employer_etf;
        self.net_pay += gross + bonuses - deductions - contributions.employee_epf;
    }

    /// What payroll costs the employer: salaries, bonuses and employer-side contributions.
    pub fn payroll_expense(&self) -> f64 {
        self.gross_salary + self.bonuses + self.employer_epf + self.employer_etf
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyPayroll {
    pub totals: PayrollTotals,
    pub employee_ids: BTreeSet<String>,
}

impl MonthlyPayroll {
    pub fn headcount(&self) -> usize {
        self.employee_ids.len()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryTotals {
    pub item_count: usize,
    pub quantity: f64,
    pub value: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseSummary {
    pub payroll: PayrollTotals,
    pub total_payroll_expense: f64,
    pub total_inventory_value: f64,
    pub total_expenses: f64,
    pub unique_employee_count: usize,
    pub by_month: BTreeMap<PeriodKey, MonthlyPayroll>,
    /// Payroll records left out of `by_month` because their period could not be read.
    pub unresolved_period_count: usize,
    pub inventory_by_category: BTreeMap<String, CategoryTotals>,
}

impl ExpenseSummary {
    /// Payroll expense per period, for the trend builder. Inventory carries
    /// no date and only contributes to `total_expenses`.
    pub fn expense_by_month(&self) -> BTreeMap<PeriodKey, f64> {
        self.by_month
            .iter()
            .map(|(key, month)| (*key, month.totals.payroll_expense()))
            .collect()
    }
}

pub fn aggregate_expenses(
    payroll: &[RawPayrollRecord],
    inventory: &[RawInventoryItem],
) -> ExpenseSummary {
    aggregate_expenses_with_rates(payroll, inventory, &StatutoryRates::default())
}

pub fn aggregate_expenses_with_rates(
    payroll: &[RawPayrollRecord],
    inventory: &[RawInventoryItem],
    rates: &StatutoryRates,
) -> ExpenseSummary {
    let mut summary = ExpenseSummary::default();
    let mut employees: BTreeSet<String> = BTreeSet::new();

    for record in payroll {
        summary.payroll.add(record, rates);

        let employee_id = text_field(&record.employee_id);
        if let Some(id) = &employee_id {
            employees.insert(id.clone());
        }

        match payroll_period(record) {
            Some(key) => {
                let month = summary.by_month.entry(key).or_default();
                month.totals.add(record, rates);
                if let Some(id) = employee_id {
                    month.employee_ids.insert(id);
                }
            }
            None => summary.unresolved_period_count += 1,
        }
    }

    for item in inventory {
        let price = normalize(&item.price);
        let quantity = normalize(&item.quantity);
        let value = price * quantity;

        let category = text_field(&item.category).unwrap_or_else(|| UNCATEGORIZED_LABEL.to_string());
        let totals = summary.inventory_by_category.entry(category).or_default();
        totals.item_count += 1;
        totals.quantity += quantity;
        totals.value += value;

        summary.total_inventory_value += value;
    }

    summary.unique_employee_count = employees.len();
    summary.total_payroll_expense = summary.payroll.payroll_expense();
    summary.total_expenses = summary.total_payroll_expense + summary.total_inventory_value;

    debug!(
        "Aggregated {} payroll records ({} employees, {} periods) and {} inventory items",
        summary.payroll.record_count,
        summary.unique_employee_count,
        summary.by_month.len(),
        inventory.len()
    );

    summary
}

/// The `(payrollYear, payrollMonth)` period of a record, if both parts are readable.
pub fn payroll_period(record: &RawPayrollRecord) -> Option<PeriodKey> {
    let year = parse_year(&record.payroll_year)?;
    let month = parse_month(&record.payroll_month)?;
    Some(PeriodKey { year, month })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn payroll(id: Value, gross: Value, bonuses: Value, deductions: Value, month: Value, year: Value) -> RawPayrollRecord {
        RawPayrollRecord {
            employee_id: id,
            gross_salary: gross,
            bonuses,
            deductions,
            payroll_month: month,
            payroll_year: year,
            ..Default::default()
        }
    }

    fn item(category: Value, price: Value, quantity: Value) -> RawInventoryItem {
        RawInventoryItem {
            category,
            price,
            quantity,
            ..Default::default()
        }
    }

    #[test]
    fn test_statutory_contributions_exclude_bonuses() {
        let records = vec![payroll(
            json!("EMP-1"),
            json!(100000),
            json!(10000),
            json!(2000),
            json!("January"),
            json!(2024),
        )];

        let summary = aggregate_expenses(&records, &[]);
        assert_eq!(summary.payroll.employee_epf, 8000.0);
        assert_eq!(summary.payroll.employer_epf, 12000.0);
        assert_eq!(summary.payroll.employer_etf, 3000.0);
        assert_eq!(summary.payroll.deductions, 2000.0);
        assert_eq!(summary.total_payroll_expense, 100000.0 + 10000.0 + 12000.0 + 3000.0);
        assert_eq!(summary.payroll.net_pay, 100000.0 + 10000.0 - 2000.0 - 8000.0);
        assert_eq!(summary.total_expenses, 125000.0);
    }

    #[test]
    fn test_inventory_value_by_category() {
        let items = vec![
            item(json!("Drugs"), json!("2.50"), json!(100)),
            item(json!("Drugs"), json!(10), json!("3")),
            item(Value::Null, json!(5), json!(4)),
            item(json!("Equipment"), json!("n/a"), json!(7)),
        ];

        let summary = aggregate_expenses(&[], &items);
        assert_eq!(summary.total_inventory_value, 250.0 + 30.0 + 20.0);
        assert_eq!(summary.inventory_by_category["Drugs"].value, 280.0);
        assert_eq!(summary.inventory_by_category["Drugs"].quantity, 103.0);
        assert_eq!(summary.inventory_by_category[UNCATEGORIZED_LABEL].item_count, 1);
        assert_eq!(summary.inventory_by_category["Equipment"].value, 0.0);
        assert_eq!(summary.total_expenses, 300.0);
    }

    #[test]
    fn test_unique_employees_and_monthly_headcount() {
        let records = vec![
            payroll(json!("EMP-1"), json!(1000), Value::Null, Value::Null, json!("January"), json!(2024)),
            payroll(json!("EMP-2"), json!(2000), Value::Null, Value::Null, json!(1), json!("2024")),
            payroll(json!("EMP-1"), json!(1000), Value::Null, Value::Null, json!("Feb"), json!(2024)),
            payroll(json!(""), json!(500), Value::Null, Value::Null, json!("Feb"), json!(2024)),
            payroll(json!("EMP-3"), json!(700), Value::Null, Value::Null, json!("Smarch"), json!(2024)),
        ];

        let summary = aggregate_expenses(&records, &[]);
        assert_eq!(summary.unique_employee_count, 3);
        assert_eq!(summary.payroll.record_count, 5);
        assert_eq!(summary.unresolved_period_count, 1);

        let jan = &summary.by_month[&PeriodKey { year: 2024, month: 1 }];
        assert_eq!(jan.headcount(), 2);
        assert_eq!(jan.totals.gross_salary, 3000.0);

        let feb = &summary.by_month[&PeriodKey { year: 2024, month: 2 }];
        assert_eq!(feb.headcount(), 1);
        assert_eq!(feb.totals.record_count, 2);
        assert_eq!(feb.totals.gross_salary, 1500.0);

        assert_eq!(summary.payroll.gross_salary, 5200.0);
    }

    #[test]
    fn test_expense_by_month_is_payroll_expense() {
        let records = vec![payroll(
            json!("EMP-1"),
            json!(10000),
            json!(500),
            json!(100),
            json!(6),
            json!(2024),
        )];

        let summary = aggregate_expenses(&records, &[item(json!("Drugs"), json!(1), json!(50))]);
        let months = summary.expense_by_month();
        assert_eq!(months.len(), 1);
        assert_eq!(months[&PeriodKey { year: 2024, month: 6 }], 10000.0 + 500.0 + 1200.0 + 300.0);
        assert_eq!(summary.total_expenses, 12000.0 + 50.0);
    }

    #[test]
    fn test_custom_rates() {
        let rates = StatutoryRates {
            employee_epf: 0.1,
            employer_epf: 0.15,
            employer_etf: 0.0,
        };
        let records = vec![payroll(json!("A"), json!(1000), Value::Null, Value::Null, json!(1), json!(2024))];

        let summary = aggregate_expenses_with_rates(&records, &[], &rates);
        assert_eq!(summary.payroll.employee_epf, 100.0);
        assert_eq!(summary.payroll.employer_epf, 150.0);
        assert_eq!(summary.total_payroll_expense, 1150.0);
    }

    #[test]
    fn test_empty_input() {
        let summary = aggregate_expenses(&[], &[]);
        assert_eq!(summary, ExpenseSummary::default());
    }

    #[test]
    fn test_float_encoded_period_is_resolved() {
        let records = vec![payroll(json!("EMP-1"), json!(1000), Value::Null, Value::Null, json!(3.0), json!(2024.0))];

        let summary = aggregate_expenses(&records, &[]);
        assert_eq!(summary.unresolved_period_count, 0);
        assert_eq!(summary.by_month.len(), 1);
        assert!(summary.by_month.contains_key(&PeriodKey { year: 2024, month: 3 }));
    }
}
