use std::collections::BTreeMap;

use gather_core::{
    Badge, BadgeCategory, DailyUsage, StreakResult, UserBadge, UserProfile, badge_by_id,
};
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
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

impl UserResponse {
    pub fn from_profile(profile: UserProfile) -> Self {
        Self {
            id: profile.id,
            username: profile.username,
            country_code: profile.country_code,
            total_tokens: profile.total_tokens,
            total_cost: profile.total_cost,
            global_rank: profile.global_rank,
            country_rank: profile.country_rank,
            referral_count: profile.referral_count,
            created_at: profile.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DailyUsageResponse {
    pub date: String,
    pub tokens: u64,
    pub cost: f64,
}

impl DailyUsageResponse {
    pub fn from_daily(daily: DailyUsage) -> Self {
        Self {
            date: daily.date,
            tokens: daily.tokens,
            cost: daily.cost,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SummaryTotalsResponse {
    pub tokens: u64,
    pub cost: f64,
    pub sessions: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryAveragesResponse {
    pub daily_tokens: f64,
    pub daily_cost: f64,
}

#[derive(Debug, Serialize)]
pub struct StreakResponse {
    pub current: u32,
    pub longest: u32,
}

impl StreakResponse {
    pub fn from_streak(streak: StreakResult) -> Self {
        Self {
            current: streak.current,
            longest: streak.longest,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageSummaryResponse {
    pub days: u32,
    pub daily: Vec<DailyUsageResponse>,
    pub totals: SummaryTotalsResponse,
    pub averages: SummaryAveragesResponse,
    pub streaks: StreakResponse,
}

/// Catalog metadata for one badge, without any per-user state.
#[derive(Debug, Serialize)]
pub struct BadgeInfoResponse {
    pub id: String,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub category: BadgeCategory,
}

impl BadgeInfoResponse {
    pub fn from_badge(badge: &Badge) -> Self {
        Self {
            id: badge.id.to_string(),
            name: badge.name.to_string(),
            description: badge.description.to_string(),
            icon: badge.icon.to_string(),
            category: badge.category,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BadgeViewResponse {
    #[serde(flatten)]
    pub info: BadgeInfoResponse,
    pub earned_at: String,
}

impl BadgeViewResponse {
    /// Join an earned row with its catalog entry. Rows whose badge id has
    /// left the catalog still render, with the raw id standing in for the
    /// display fields.
    pub fn from_earned(earned: UserBadge) -> Self {
        let info = match badge_by_id(&earned.badge_type) {
            Some(badge) => BadgeInfoResponse::from_badge(badge),
            None => BadgeInfoResponse {
                id: earned.badge_type.clone(),
                name: earned.badge_type.clone(),
                description: String::new(),
                icon: "award".to_string(),
                category: BadgeCategory::Community,
            },
        };
        Self {
            info,
            earned_at: earned.earned_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BadgesResponse {
    pub badges: Vec<BadgeViewResponse>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BadgeCheckResponse {
    pub new_badges: Vec<BadgeInfoResponse>,
    pub all_badges: Vec<BadgeViewResponse>,
}

#[derive(Debug, Serialize)]
pub struct ProgressEntryResponse {
    pub current: f64,
    pub target: f64,
    pub percent: f64,
}

#[derive(Debug, Serialize)]
pub struct BadgeProgressResponse {
    pub trackers: BTreeMap<String, ProgressEntryResponse>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    pub accepted: usize,
    pub total_tokens: u64,
    pub total_cost: f64,
    pub new_badges: Vec<BadgeInfoResponse>,
}

#[derive(Debug, Serialize)]
pub struct LeaderboardResponse {
    pub users: Vec<UserResponse>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsResponse {
    pub streak_anchor: String,
    pub db_path: String,
    pub app_data_dir: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}
