use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A billing/payment record as delivered by the upstream API.
///
/// Every field is kept as a raw JSON value: the upstream data is partially
/// malformed (numbers as strings, missing fields, blank labels) and coercion
/// happens in the aggregators, never at deserialization time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct RawPaymentRecord {
    #[schemars(description = "Payment identifier")]
    pub id: Value,

    #[schemars(description = "Payment date, ISO 8601 (YYYY-MM-DD or a full timestamp)")]
    pub date: Value,

    #[schemars(description = "Invoiced amount. Number or numeric string.")]
    pub total_amount: Value,

    #[schemars(description = "Amount actually received. Number or numeric string.")]
    pub amount_paid: Value,

    #[schemars(description = "Payment method label, e.g. 'Cash', 'Card', 'Insurance'")]
    pub payment_method: Value,

    pub hospital_name: Value,

    pub patient_name: Value,

    pub invoice_number: Value,
}

/// A monthly payroll record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct RawPayrollRecord {
    pub employee_id: Value,

    pub employee_name: Value,

    #[schemars(description = "Base salary. Statutory contributions are computed on this amount only.")]
    pub gross_salary: Value,

    pub bonuses: Value,

    pub deductions: Value,

    #[schemars(
        description = "Employee EPF as stored by the payroll screen. Never used for totals; see the EPF backfill."
    )]
    pub epf: Value,

    #[schemars(description = "Month number (1-12) or English month name")]
    pub payroll_month: Value,

    pub payroll_year: Value,
}

/// A stock line from the inventory module.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct RawInventoryItem {
    pub name: Value,

    pub category: Value,

    #[schemars(description = "Unit price")]
    pub price: Value,

    pub quantity: Value,
}

/// The three source collections one report is computed from.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct FinancialDataset {
    pub payments: Vec<RawPaymentRecord>,
    pub payroll: Vec<RawPayrollRecord>,
    pub inventory: Vec<RawInventoryItem>,
}

impl FinancialDataset {
    pub fn new(
        payments: Vec<RawPaymentRecord>,
        payroll: Vec<RawPayrollRecord>,
        inventory: Vec<RawInventoryItem>,
    ) -> Self {
        Self {
            payments,
            payroll,
            inventory,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.payments.is_empty() && self.payroll.is_empty() && self.inventory.is_empty()
    }

    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(FinancialDataset)
    }

    pub fn schema_as_json() -> Result<String, serde_json::Error> {
        let schema = Self::generate_json_schema();
        serde_json::to_string_pretty(&schema)
    }
}
