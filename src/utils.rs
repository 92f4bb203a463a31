use crate::error::{AnalyticsError, Result};
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Calendar year + month, ordered chronologically. Used to join the revenue
/// and expense series into one monthly bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PeriodKey {
    pub year: i32,
    pub month: u32,
}

impl PeriodKey {
    pub fn new(year: i32, month: u32) -> Result<Self> {
        validate_month(month)?;
        Ok(Self { year, month })
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Three-letter month label, e.g. "Mar".
    pub fn month_label(&self) -> &'static str {
        let idx = (self.month.clamp(1, 12) - 1) as usize;
        &MONTH_NAMES[idx][..3]
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

impl fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for PeriodKey {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self> {
        let parsed = NaiveDate::parse_from_str(&format!("{}-01", s.trim()), "%Y-%m-%d")
            .map_err(|_| AnalyticsError::InvalidPeriodKey(s.to_string()))?;
        Ok(Self::from_date(parsed))
    }
}

impl Serialize for PeriodKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PeriodKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

pub fn validate_month(month: u32) -> Result<()> {
    if !(1..=12).contains(&month) {
        return Err(AnalyticsError::InvalidMonth(month));
    }
    Ok(())
}

/// Parses the date formats seen in billing exports: plain ISO dates,
/// RFC 3339 timestamps and naive ISO timestamps. Anything else is `None`.
pub fn parse_date(raw: &Value) -> Option<NaiveDate> {
    let text = raw.as_str()?.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Some(ts.date_naive());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(text, fmt) {
            return Some(ts.date());
        }
    }
    NaiveDate::parse_from_str(text, "%Y/%m/%d").ok()
}

/// Resolves a payroll month given either as a number (`3`, `"03"`) or as an
/// English month name or abbreviation (`"March"`, `"mar"`).
pub fn parse_month(raw: &Value) -> Option<u32> {
    match raw {
        Value::Number(n) => whole_number(n)
            .and_then(|m| u32::try_from(m).ok())
            .filter(|m| (1..=12).contains(m)),
        Value::String(s) => {
            let text = s.trim();
            if let Ok(m) = text.parse::<u32>() {
                return (1..=12).contains(&m).then_some(m);
            }
            let lower = text.to_lowercase();
            if lower.len() < 3 {
                return None;
            }
            MONTH_NAMES
                .iter()
                .position(|name| name.to_lowercase().starts_with(&lower))
                .map(|idx| idx as u32 + 1)
        }
        _ => None,
    }
}

pub fn parse_year(raw: &Value) -> Option<i32> {
    let year = match raw {
        Value::Number(n) => whole_number(n)?,
        Value::String(s) => s.trim().parse::<i64>().ok()?,
        _ => return None,
    };
    i32::try_from(year).ok().filter(|y| *y > 0)
}

/// Integer value of a JSON number, accepting floats without a fractional part (`3.0`).
fn whole_number(n: &serde_json::Number) -> Option<i64> {
    n.as_i64().or_else(|| {
        n.as_f64()
            .filter(|f| f.fract() == 0.0 && f.abs() <= i32::MAX as f64)
            .map(|f| f as i64)
    })
}

/// Reads a free-text field, accepting numbers as text (ids are often numeric).
/// Blank strings are treated as missing.
pub fn text_field(raw: &Value) -> Option<String> {
    match raw {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// `numerator / denominator * 100`, or `0.0` when the denominator is zero
/// or the result would not be finite.
pub fn ratio_percent(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        return 0.0;
    }
    let ratio = numerator / denominator * 100.0;
    if ratio.is_finite() {
        ratio
    } else {
        0.0
    }
}

/// Formats an amount with two decimals and thousands separators, e.g. `215,000.00`.
pub fn format_amount(amount: f64) -> String {
    let formatted = format!("{:.2}", amount.abs());
    let (whole, fraction) = formatted.split_once('.').unwrap_or((formatted.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (idx, ch) in whole.chars().enumerate() {
        if idx > 0 && (whole.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if amount < 0.0 && formatted != "0.00" { "-" } else { "" };
    format!("{}{}.{}", sign, grouped, fraction)
}
