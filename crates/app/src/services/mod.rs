mod badges;
mod settings;
mod usage;
mod users;

use std::sync::Arc;

use chrono::NaiveDate;

use crate::app::AppConfig;
use crate::error::{AppError, Result};
use gather_core::{
    DailyUsage, StreakAnchor, StreakResult, UsageStat, aggregate_daily, compute_streaks,
};
use gather_db::Db;

pub use badges::{BadgeOutcome, BadgeService};
pub use settings::{STREAK_ANCHOR_KEY, SettingsService, SettingsSnapshot};
pub use usage::{SubmitOutcome, UsageEntry, UsageService, UsageSubmission, UsageSummaryData};
pub use users::{RegisterUser, UsersService};

type SharedConfig = Arc<AppConfig>;

/// Service registry for app-level operations.
#[derive(Clone)]
pub struct AppServices {
    pub usage: UsageService,
    pub badges: BadgeService,
    pub users: UsersService,
    pub settings: SettingsService,
}

impl AppServices {
    pub fn new(config: &AppConfig) -> Self {
        let shared = Arc::new(config.clone());
        Self {
            usage: UsageService::new(shared.clone()),
            badges: BadgeService::new(shared.clone()),
            users: UsersService::new(shared.clone()),
            settings: SettingsService::new(shared),
        }
    }
}

fn open_db(config: &SharedConfig) -> Result<Db> {
    Ok(Db::open(&config.db_path)?)
}

fn load_streak_anchor(db: &Db) -> Result<StreakAnchor> {
    let stored = db.get_setting(STREAK_ANCHOR_KEY)?;
    Ok(stored
        .as_deref()
        .and_then(StreakAnchor::parse)
        .unwrap_or_default())
}

fn stat_date(row: &UsageStat) -> &str {
    &row.date
}

fn daily_from_rows(rows: &[UsageStat]) -> Vec<DailyUsage> {
    aggregate_daily(
        rows,
        stat_date,
        |row| Some(row.total_tokens as i64),
        |row| Some(row.cost_usd),
    )
}

fn user_streak(db: &Db, user_id: &str, today: NaiveDate) -> Result<StreakResult> {
    let rows = db.all_usage_rows(user_id)?;
    let daily = daily_from_rows(&rows);
    let anchor = load_streak_anchor(db)?;
    Ok(compute_streaks(&daily, today, anchor))
}

fn missing_user(user_id: &str) -> AppError {
    AppError::NotFound(format!("user {user_id} not found"))
}
