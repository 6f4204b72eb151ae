use serde::{Deserialize, Serialize};

/// One device's usage submission for one calendar day.
///
/// Several rows may exist for the same `(user_id, date)`, one per device,
/// and the same device overwrites its own row on re-submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageStat {
    pub user_id: String,
    pub date: String,
    pub device_id: String,
    pub total_tokens: u64,
    pub cost_usd: f64,
    pub submitted_at: String,
}

/// Per-date usage summed across all devices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyUsage {
    pub date: String,
    pub tokens: u64,
    pub cost: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakResult {
    pub current: u32,
    pub longest: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub username: String,
    pub country_code: Option<String>,
    pub total_tokens: u64,
    pub total_cost: f64,
    pub global_rank: Option<u32>,
    pub country_rank: Option<u32>,
    pub referral_count: u32,
    pub created_at: String,
}

/// Snapshot of a user's aggregate statistics, assembled fresh for each badge
/// evaluation and discarded afterwards. Conditions only ever see this struct,
/// so anything they need (cohort membership included) is resolved before it
/// is built.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BadgeContext {
    pub total_tokens: u64,
    pub total_cost: f64,
    pub global_rank: Option<u32>,
    pub country_rank: Option<u32>,
    pub country_code: Option<String>,
    pub referral_count: u32,
    pub streak: StreakResult,
    pub is_early_country_user: bool,
}

/// A badge a user has permanently earned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserBadge {
    pub user_id: String,
    pub badge_type: String,
    pub earned_at: String,
}
