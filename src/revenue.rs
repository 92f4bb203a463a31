use crate::normalizer::normalize;
use crate::schema::RawPaymentRecord;
use crate::utils::{parse_date, text_field, PeriodKey};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const UNKNOWN_LABEL: &str = "Unknown";

/// Received and invoiced totals for one grouping bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueGroup {
    pub count: usize,
    pub revenue: f64,
    pub invoiced: f64,
}

impl RevenueGroup {
    fn add(&mut self, paid: f64, invoiced: f64) {
        self.count += 1;
        self.revenue += paid;
        self.invoiced += invoiced;
    }

    pub fn outstanding(&self) -> f64 {
        self.invoiced - self.revenue
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueSummary {
    pub total_revenue: f64,
    pub total_invoiced: f64,
    pub total_outstanding: f64,
    pub payment_count: usize,
    /// Payments left out of `by_month` because their date could not be read.
    pub undated_count: usize,
    pub by_method: BTreeMap<String, RevenueGroup>,
    pub by_month: BTreeMap<PeriodKey, RevenueGroup>,
    pub by_hospital: BTreeMap<String, RevenueGroup>,
}

impl RevenueSummary {
    /// Received revenue per calendar month, for the trend builder.
    pub fn revenue_by_month(&self) -> BTreeMap<PeriodKey, f64> {
        self.by_month
            .iter()
            .map(|(key, group)| (*key, group.revenue))
            .collect()
    }
}

pub fn aggregate_revenue(payments: &[RawPaymentRecord]) -> RevenueSummary {
    let mut summary = RevenueSummary {
        payment_count: payments.len(),
        ..Default::default()
    };

    for payment in payments {
        let paid = normalize(&payment.amount_paid);
        let invoiced = normalize(&payment.total_amount);

        let method = text_field(&payment.payment_method).unwrap_or_else(|| UNKNOWN_LABEL.to_string());
        summary.by_method.entry(method).or_default().add(paid, invoiced);

        let hospital = text_field(&payment.hospital_name).unwrap_or_else(|| UNKNOWN_LABEL.to_string());
        summary.by_hospital.entry(hospital).or_default().add(paid, invoiced);

        match parse_date(&payment.date) {
            Some(date) => summary
                .by_month
                .entry(PeriodKey::from_date(date))
                .or_default()
                .add(paid, invoiced),
            None => summary.undated_count += 1,
        }
    }

    // Totals are folded from the method buckets so that the per-method
    // breakdown always sums to exactly the reported total.
    summary.total_revenue = summary.by_method.values().map(|g| g.revenue).sum();
    summary.total_invoiced = summary.by_method.values().map(|g| g.invoiced).sum();
    summary.total_outstanding = summary.total_invoiced - summary.total_revenue;

    debug!(
        "Aggregated {} payments across {} methods and {} months ({} undated)",
        summary.payment_count,
        summary.by_method.len(),
        summary.by_month.len(),
        summary.undated_count
    );

    summary
}
