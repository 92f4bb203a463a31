use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyticsError {
    #[error("Invalid month {0}: must be between 1 and 12")]
    InvalidMonth(u32),

    #[error("Invalid period key '{0}': expected YYYY-MM")]
    InvalidPeriodKey(String),

    #[error("Report period '{0}' requires a year")]
    MissingYear(String),

    #[error("Report period 'month' requires a month")]
    MissingMonth,

    #[error("Invalid statutory rate {name} = {value}: must be between 0.0 and 1.0")]
    InvalidStatutoryRate { name: String, value: f64 },

    #[error("Invalid insight threshold {name} = {value}: {details}")]
    InvalidThreshold {
        name: String,
        value: f64,
        details: String,
    },

    #[error("Invalid trend window {0}: must be at least 1 month")]
    InvalidTrendWindow(usize),

    #[error("Backfill entry for record #{index} does not match the supplied payroll records")]
    BackfillMismatch { index: usize },

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AnalyticsError>;
