use chrono::{Duration, NaiveDate, SecondsFormat, Utc};

use crate::error::{AppError, Result};

pub const DEFAULT_WINDOW_DAYS: u32 = 30;
pub const MAX_WINDOW_DAYS: u32 = 365;

pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn today_utc() -> NaiveDate {
    Utc::now().date_naive()
}

pub fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|err| AppError::InvalidInput(format!("invalid date {value}: {err}")))
}

/// Clamp a requested summary window to something the API will serve.
pub fn clamp_window_days(days: Option<u32>) -> u32 {
    days.unwrap_or(DEFAULT_WINDOW_DAYS).clamp(1, MAX_WINDOW_DAYS)
}

/// Inclusive [start, end] calendar window of `days` days ending on `end`.
pub fn window_ending(end: NaiveDate, days: u32) -> (String, String) {
    let span = i64::from(days.max(1)) - 1;
    let start = end - Duration::days(span);
    (
        start.format("%Y-%m-%d").to_string(),
        end.format("%Y-%m-%d").to_string(),
    )
}
