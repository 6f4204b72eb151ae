use gather_app::{
    AppError, LeaderboardParams, RegisterUser, Result, UsageEntry, UsageSubmission,
};
use gather_core::StreakAnchor;

use crate::{
    AppContext, BadgeCheckResponse, BadgeInfoResponse, BadgeProgressResponse, BadgeViewResponse,
    BadgesResponse, DailyUsageResponse, HealthResponse, LeaderboardRequest, LeaderboardResponse,
    ProgressEntryResponse, RegisterRequest, SettingsPutRequest, SettingsResponse, StreakResponse,
    SubmitResponse, SummaryAveragesResponse, SummaryRequest, SummaryTotalsResponse,
    UsageSubmitRequest, UsageSummaryResponse, UserResponse,
};

pub fn health() -> HealthResponse {
    HealthResponse { status: "ok" }
}

pub fn register(ctx: &AppContext, user_id: &str, req: RegisterRequest) -> Result<UserResponse> {
    let profile = ctx.app_state.services.users.register(
        user_id,
        &RegisterUser {
            username: req.username,
            country_code: req.country_code,
            referred_by: req.referred_by,
        },
    )?;
    Ok(UserResponse::from_profile(profile))
}

pub fn user_profile(ctx: &AppContext, user_id: &str) -> Result<UserResponse> {
    let profile = ctx.app_state.services.users.profile(user_id)?;
    Ok(UserResponse::from_profile(profile))
}

/// Store a usage batch, then run the badge catalog so a submission that
/// crosses thresholds reports its new badges in the same response. A failed
/// evaluation never fails the submission; the stats are already stored.
pub fn submit_usage(
    ctx: &AppContext,
    user_id: &str,
    req: UsageSubmitRequest,
) -> Result<SubmitResponse> {
    let submission = UsageSubmission {
        device: req.device,
        entries: req
            .entries
            .into_iter()
            .map(|entry| UsageEntry {
                date: entry.date,
                total_tokens: entry.total_tokens,
                cost_usd: entry.cost_usd,
            })
            .collect(),
    };
    let outcome = ctx.app_state.services.usage.submit(user_id, &submission)?;
    let new_badges = match ctx.app_state.services.badges.evaluate(user_id) {
        Ok(badges) => badges
            .newly_earned
            .iter()
            .map(|badge| BadgeInfoResponse::from_badge(badge))
            .collect(),
        Err(err) => {
            tracing::warn!(user_id, error = %err, "badge evaluation failed after submission");
            Vec::new()
        }
    };
    Ok(SubmitResponse {
        accepted: outcome.written,
        total_tokens: outcome.total_tokens,
        total_cost: outcome.total_cost,
        new_badges,
    })
}

pub fn usage_summary(
    ctx: &AppContext,
    user_id: &str,
    req: SummaryRequest,
) -> Result<UsageSummaryResponse> {
    let summary = ctx.app_state.services.usage.summary(user_id, req.days)?;
    Ok(UsageSummaryResponse {
        days: summary.days,
        daily: summary
            .daily
            .into_iter()
            .map(DailyUsageResponse::from_daily)
            .collect(),
        totals: SummaryTotalsResponse {
            tokens: summary.total_tokens,
            cost: summary.total_cost,
            sessions: summary.sessions,
        },
        averages: SummaryAveragesResponse {
            daily_tokens: summary.avg_daily_tokens,
            daily_cost: summary.avg_daily_cost,
        },
        streaks: StreakResponse::from_streak(summary.streak),
    })
}

pub fn user_badges(ctx: &AppContext, user_id: &str) -> Result<BadgesResponse> {
    let earned = ctx.app_state.services.badges.earned(user_id)?;
    Ok(BadgesResponse {
        badges: earned.into_iter().map(BadgeViewResponse::from_earned).collect(),
    })
}

pub fn badge_check(ctx: &AppContext, user_id: &str) -> Result<BadgeCheckResponse> {
    let outcome = ctx.app_state.services.badges.evaluate(user_id)?;
    Ok(BadgeCheckResponse {
        new_badges: outcome
            .newly_earned
            .iter()
            .map(|badge| BadgeInfoResponse::from_badge(badge))
            .collect(),
        all_badges: outcome
            .badges
            .into_iter()
            .map(BadgeViewResponse::from_earned)
            .collect(),
    })
}

pub fn badge_progress(ctx: &AppContext, user_id: &str) -> Result<BadgeProgressResponse> {
    let entries = ctx.app_state.services.badges.progress(user_id)?;
    let trackers = entries
        .into_iter()
        .map(|entry| {
            (
                entry.id.to_string(),
                ProgressEntryResponse {
                    current: entry.current,
                    target: entry.target,
                    percent: entry.percent,
                },
            )
        })
        .collect();
    Ok(BadgeProgressResponse { trackers })
}

pub fn leaderboard(ctx: &AppContext, req: LeaderboardRequest) -> Result<LeaderboardResponse> {
    let users = ctx.app_state.services.users.leaderboard(&LeaderboardParams {
        limit: req.limit,
        offset: req.offset,
        country: req.country,
    })?;
    Ok(LeaderboardResponse {
        users: users.into_iter().map(UserResponse::from_profile).collect(),
    })
}

pub fn settings_get(ctx: &AppContext) -> Result<SettingsResponse> {
    let snapshot = ctx.app_state.services.settings.get()?;
    Ok(SettingsResponse {
        streak_anchor: snapshot.streak_anchor.as_str().to_string(),
        db_path: snapshot.db_path,
        app_data_dir: ctx.app_data_dir.to_string_lossy().to_string(),
    })
}

pub fn settings_put(ctx: &AppContext, req: SettingsPutRequest) -> Result<SettingsResponse> {
    if let Some(anchor) = req.streak_anchor.as_deref() {
        let anchor = StreakAnchor::parse(anchor).ok_or_else(|| {
            AppError::InvalidInput(format!("unsupported streak anchor {anchor}"))
        })?;
        ctx.app_state.services.settings.set_streak_anchor(anchor)?;
    }
    settings_get(ctx)
}
