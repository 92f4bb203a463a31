use crate::normalizer::normalize;
use crate::schema::RawPaymentRecord;
use crate::utils::parse_date;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    FullyPaid,
    PartiallyPaid,
    Unpaid,
}

impl PaymentStatus {
    /// `FullyPaid` is checked first, so a zero-amount invoice with nothing paid is fully paid.
    pub fn of(payment: &RawPaymentRecord) -> Self {
        let paid = normalize(&payment.amount_paid);
        let total = normalize(&payment.total_amount);

        if paid >= total {
            PaymentStatus::FullyPaid
        } else if paid == 0.0 {
            PaymentStatus::Unpaid
        } else {
            PaymentStatus::PartiallyPaid
        }
    }
}

/// Disjoint, exhaustive split of a payment slice by status.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaymentPartition<'a> {
    pub fully_paid: Vec<&'a RawPaymentRecord>,
    pub partially_paid: Vec<&'a RawPaymentRecord>,
    pub unpaid: Vec<&'a RawPaymentRecord>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusTotals {
    pub count: usize,
    pub invoiced: f64,
    pub outstanding: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartitionSummary {
    pub fully_paid: StatusTotals,
    pub partially_paid: StatusTotals,
    pub unpaid: StatusTotals,
}

impl PaymentPartition<'_> {
    pub fn len(&self) -> usize {
        self.fully_paid.len() + self.partially_paid.len() + self.unpaid.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn summary(&self) -> PartitionSummary {
        PartitionSummary {
            fully_paid: status_totals(&self.fully_paid),
            partially_paid: status_totals(&self.partially_paid),
            unpaid: status_totals(&self.unpaid),
        }
    }

    /// Unpaid items more than `overdue_days` old as of `as_of`.
    pub fn overdue_critical(&self, as_of: NaiveDate, overdue_days: i64) -> usize {
        overdue_critical(&self.unpaid, as_of, overdue_days)
    }
}

fn status_totals(records: &[&RawPaymentRecord]) -> StatusTotals {
    records.iter().fold(StatusTotals::default(), |mut acc, record| {
        let invoiced = normalize(&record.total_amount);
        let paid = normalize(&record.amount_paid);
        acc.count += 1;
        acc.invoiced += invoiced;
        acc.outstanding += (invoiced - paid).max(0.0);
        acc
    })
}

pub fn categorize(payments: &[RawPaymentRecord]) -> PaymentPartition<'_> {
    let mut partition = PaymentPartition::default();

    for payment in payments {
        match PaymentStatus::of(payment) {
            PaymentStatus::FullyPaid => partition.fully_paid.push(payment),
            PaymentStatus::PartiallyPaid => partition.partially_paid.push(payment),
            PaymentStatus::Unpaid => partition.unpaid.push(payment),
        }
    }

    partition
}

/// Counts the `unpaid` items dated more than `overdue_days` before `as_of`.
/// Items without a readable date are never counted.
pub fn overdue_critical(unpaid: &[&RawPaymentRecord], as_of: NaiveDate, overdue_days: i64) -> usize {
    unpaid
        .iter()
        .filter_map(|payment| parse_date(&payment.date))
        .filter(|date| (as_of - *date).num_days() > overdue_days)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn payment(id: u32, date: Value, total: Value, paid: Value) -> RawPaymentRecord {
        RawPaymentRecord {
            id: json!(id),
            date,
            total_amount: total,
            amount_paid: paid,
            ..Default::default()
        }
    }

    #[test]
    fn test_three_way_split() {
        let payments = vec![
            payment(1, Value::Null, json!(100), json!(100)),
            payment(2, Value::Null, json!(100), json!(50)),
            payment(3, Value::Null, json!(100), json!(0)),
        ];

        let partition = categorize(&payments);
        assert_eq!(partition.fully_paid, vec![&payments[0]]);
        assert_eq!(partition.partially_paid, vec![&payments[1]]);
        assert_eq!(partition.unpaid, vec![&payments[2]]);
    }

    #[test]
    fn test_edge_amounts() {
        let payments = vec![
            payment(1, Value::Null, json!(100), json!(120)),
            payment(2, Value::Null, Value::Null, Value::Null),
            payment(3, Value::Null, json!("garbage"), json!("")),
            payment(4, Value::Null, json!("80"), json!("abc")),
        ];

        let partition = categorize(&payments);
        assert_eq!(partition.fully_paid.len(), 3);
        assert_eq!(partition.unpaid, vec![&payments[3]]);
        assert!(partition.partially_paid.is_empty());
    }

    #[test]
    fn test_partition_is_exhaustive_and_disjoint() {
        let payments: Vec<RawPaymentRecord> = (0..60)
            .map(|i| {
                let total = (i % 7) * 25;
                let paid = (i % 5) * 20;
                payment(i, Value::Null, json!(total), json!(paid))
            })
            .collect();

        let partition = categorize(&payments);
        assert_eq!(partition.len(), payments.len());

        let mut seen: Vec<u64> = partition
            .fully_paid
            .iter()
            .chain(partition.partially_paid.iter())
            .chain(partition.unpaid.iter())
            .map(|p| p.id.as_u64().unwrap())
            .collect();
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), payments.len());
    }

    #[test]
    fn test_summary_outstanding() {
        let payments = vec![
            payment(1, Value::Null, json!(100), json!(100)),
            payment(2, Value::Null, json!(100), json!(30)),
            payment(3, Value::Null, json!(200), json!(0)),
        ];

        let summary = categorize(&payments).summary();
        assert_eq!(summary.fully_paid.outstanding, 0.0);
        assert_eq!(summary.partially_paid.outstanding, 70.0);
        assert_eq!(summary.unpaid.count, 1);
        assert_eq!(summary.unpaid.invoiced, 200.0);
        assert_eq!(summary.unpaid.outstanding, 200.0);
    }

    #[test]
    fn test_overdue_critical() {
        let as_of = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();
        let payments = vec![
            payment(1, json!("2024-05-30"), json!(100), json!(0)),
            payment(2, json!("2024-05-31"), json!(100), json!(0)),
            payment(3, json!("2024-01-01"), json!(100), json!(0)),
            payment(4, Value::Null, json!(100), json!(0)),
            payment(5, json!("2023-01-01"), json!(100), json!(100)),
        ];

        let partition = categorize(&payments);
        assert_eq!(partition.unpaid.len(), 4);
        assert_eq!(partition.overdue_critical(as_of, 30), 2);
        assert_eq!(partition.overdue_critical(as_of, 200), 0);
        assert_eq!(partition.overdue_critical(as_of, 0), 3);
        assert_eq!(partition.unpaid.len(), 4);
    }
}
