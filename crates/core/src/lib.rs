//! Domain logic shared by the server and CLI: usage aggregation, streak
//! computation, and the badge catalog with its progress trackers.
//!
//! Everything here is pure. Persistence and clock access live in the
//! surrounding crates so these functions can be tested with plain values.

pub mod aggregate;
pub mod badges;
pub mod progress;
pub mod streak;
mod types;

pub use aggregate::{aggregate_daily, daily_averages, daily_totals};
pub use badges::{
    BADGE_CATALOG, Badge, BadgeCategory, BadgeCondition, BadgeEvaluation, EARLY_COHORT_SIZE,
    badge_by_id, evaluate_badges,
};
pub use progress::{BadgeProgress, badge_progress, rank_percent, threshold_percent};
pub use streak::{StreakAnchor, compute_streaks};
pub use types::{BadgeContext, DailyUsage, StreakResult, UsageStat, UserBadge, UserProfile};
