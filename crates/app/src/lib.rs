pub mod app;
pub mod config;
pub mod error;
pub mod services;
pub mod startup;
pub mod util;

pub use app::{AppConfig, AppState};
pub use config::LeaderboardParams;
pub use error::{ApiError, AppError, Result};
pub use services::{
    AppServices, BadgeOutcome, RegisterUser, SettingsSnapshot, SubmitOutcome, UsageEntry,
    UsageSubmission, UsageSummaryData,
};
pub use startup::{AppPaths, ensure_app_data_dir};
pub use util::time::{clamp_window_days, now_rfc3339, today_utc, window_ending};
