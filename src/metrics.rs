use crate::expenses::ExpenseSummary;
use crate::revenue::RevenueSummary;
use crate::utils::ratio_percent;
use serde::{Deserialize, Serialize};

/// Headline KPIs. All percentages are in the 0-100 scale and are `0.0` when
/// their denominator is zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiSet {
    pub total_revenue: f64,
    pub total_expenses: f64,
    pub net_result: f64,
    pub is_profit: bool,
    pub profit_margin: f64,
    pub roi: f64,
    pub expense_ratio: f64,
    pub collection_rate: f64,
}

impl KpiSet {
    pub fn from_totals(total_revenue: f64, total_expenses: f64, total_invoiced: f64) -> Self {
        let net_result = total_revenue - total_expenses;

        Self {
            total_revenue,
            total_expenses,
            net_result,
            is_profit: net_result > 0.0,
            profit_margin: ratio_percent(net_result, total_revenue),
            roi: ratio_percent(net_result, total_expenses),
            expense_ratio: ratio_percent(total_expenses, total_revenue),
            collection_rate: ratio_percent(total_revenue, total_invoiced),
        }
    }
}

pub fn compute_kpis(revenue: &RevenueSummary, expenses: &ExpenseSummary) -> KpiSet {
    KpiSet::from_totals(
        revenue.total_revenue,
        expenses.total_expenses,
        revenue.total_invoiced,
    )
}
