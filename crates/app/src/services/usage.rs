use crate::error::{AppError, Result};
use crate::services::{SharedConfig, daily_from_rows, missing_user, open_db, user_streak};
use crate::util::time::{clamp_window_days, now_rfc3339, parse_date, today_utc, window_ending};
use gather_core::{DailyUsage, StreakResult, UsageStat, daily_averages, daily_totals};
use gather_db::Db;

/// Largest batch a single submission may carry. A year of daily entries per
/// device is more than any backfill needs.
const MAX_SUBMISSION_ENTRIES: usize = 366;
const MAX_DEVICE_LEN: usize = 64;
const DEFAULT_DEVICE: &str = "web";

#[derive(Debug, Clone)]
pub struct UsageSubmission {
    pub device: Option<String>,
    pub entries: Vec<UsageEntry>,
}

/// One day of usage as reported by a client. Token and cost fields stay
/// optional here; coercion to zero happens when rows are built.
#[derive(Debug, Clone)]
pub struct UsageEntry {
    pub date: String,
    pub total_tokens: Option<i64>,
    pub cost_usd: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct SubmitOutcome {
    pub written: usize,
    pub total_tokens: u64,
    pub total_cost: f64,
}

#[derive(Debug, Clone)]
pub struct UsageSummaryData {
    pub days: u32,
    pub daily: Vec<DailyUsage>,
    pub total_tokens: u64,
    pub total_cost: f64,
    pub sessions: usize,
    pub avg_daily_tokens: f64,
    pub avg_daily_cost: f64,
    pub streak: StreakResult,
}

#[derive(Clone)]
pub struct UsageService {
    config: SharedConfig,
}

impl UsageService {
    pub(super) fn new(config: SharedConfig) -> Self {
        Self { config }
    }

    fn db(&self) -> Result<Db> {
        open_db(&self.config)
    }

    /// Store a batch of per-day rows for one device, then refresh the user's
    /// lifetime totals and the rank table. Rows keyed to an already-reported
    /// (date, device) pair replace the stored values.
    pub fn submit(&self, user_id: &str, submission: &UsageSubmission) -> Result<SubmitOutcome> {
        let mut db = self.db()?;
        if db.get_user(user_id)?.is_none() {
            return Err(missing_user(user_id));
        }
        if submission.entries.is_empty() {
            return Err(AppError::InvalidInput("no usage entries".to_string()));
        }
        if submission.entries.len() > MAX_SUBMISSION_ENTRIES {
            return Err(AppError::InvalidInput(format!(
                "too many entries: {} (max {})",
                submission.entries.len(),
                MAX_SUBMISSION_ENTRIES
            )));
        }
        let device = normalize_device(submission.device.as_deref())?;

        let submitted_at = now_rfc3339();
        let mut rows = Vec::with_capacity(submission.entries.len());
        for entry in &submission.entries {
            parse_date(&entry.date)?;
            rows.push(UsageStat {
                user_id: user_id.to_string(),
                date: entry.date.clone(),
                device_id: device.clone(),
                total_tokens: entry.total_tokens.unwrap_or(0).max(0) as u64,
                cost_usd: entry.cost_usd.unwrap_or(0.0).max(0.0),
                submitted_at: submitted_at.clone(),
            });
        }

        let written = db.upsert_usage_stats(&rows)?;
        let (total_tokens, total_cost) = db.update_user_totals(user_id)?;
        db.recompute_ranks()?;
        tracing::info!(user_id, device, written, "stored usage submission");
        Ok(SubmitOutcome {
            written,
            total_tokens,
            total_cost,
        })
    }

    /// Aggregated daily history over a trailing window, plus totals,
    /// per-active-day averages, and the user's streaks.
    pub fn summary(&self, user_id: &str, days: Option<u32>) -> Result<UsageSummaryData> {
        let db = self.db()?;
        if db.get_user(user_id)?.is_none() {
            return Err(missing_user(user_id));
        }
        let days = clamp_window_days(days);
        let today = today_utc();
        let (start, end) = window_ending(today, days);

        let rows = db.usage_rows_in_range(user_id, &start, &end)?;
        let daily = daily_from_rows(&rows);
        let (total_tokens, total_cost) = daily_totals(&daily);
        let (avg_daily_tokens, avg_daily_cost) = daily_averages(&daily);
        let streak = user_streak(&db, user_id, today)?;

        Ok(UsageSummaryData {
            days,
            daily,
            total_tokens,
            total_cost,
            sessions: rows.len(),
            avg_daily_tokens,
            avg_daily_cost,
            streak,
        })
    }
}

fn normalize_device(device: Option<&str>) -> Result<String> {
    let device = device.map(str::trim).filter(|value| !value.is_empty());
    let Some(device) = device else {
        return Ok(DEFAULT_DEVICE.to_string());
    };
    if device.len() > MAX_DEVICE_LEN {
        return Err(AppError::InvalidInput(format!(
            "device id too long (max {MAX_DEVICE_LEN} chars)"
        )));
    }
    Ok(device.to_string())
}
