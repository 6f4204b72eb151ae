use crate::error::Result;
use crate::services::{SharedConfig, missing_user, open_db, user_streak};
use crate::util::time::{now_rfc3339, today_utc};
use gather_core::{
    Badge, BadgeContext, BadgeProgress, EARLY_COHORT_SIZE, UserBadge, UserProfile, badge_progress,
    evaluate_badges,
};
use gather_db::Db;

#[derive(Debug)]
pub struct BadgeOutcome {
    /// Badges that fired in this evaluation, in catalog order.
    pub newly_earned: Vec<&'static Badge>,
    /// Everything the user has earned, including this pass.
    pub badges: Vec<UserBadge>,
}

#[derive(Clone)]
pub struct BadgeService {
    config: SharedConfig,
}

impl BadgeService {
    pub(super) fn new(config: SharedConfig) -> Self {
        Self { config }
    }

    fn db(&self) -> Result<Db> {
        open_db(&self.config)
    }

    /// Run the whole catalog for one user and persist whatever newly fired.
    ///
    /// Persistence is best effort: a failed insert is logged and swallowed so
    /// the caller's submission still succeeds, and the missed badges are
    /// picked up by the next evaluation. Failures while reading the context
    /// or the earned set are real errors and propagate.
    pub fn evaluate(&self, user_id: &str) -> Result<BadgeOutcome> {
        let mut db = self.db()?;
        let user = db.get_user(user_id)?.ok_or_else(|| missing_user(user_id))?;
        let ctx = build_context(&db, &user)?;
        let earned = db.earned_badge_types(user_id)?;
        let evaluation = evaluate_badges(&ctx, &earned);

        if !evaluation.newly_earned.is_empty() {
            let badge_types: Vec<&str> = evaluation
                .newly_earned
                .iter()
                .map(|badge| badge.id)
                .collect();
            match db.insert_user_badges(user_id, &badge_types, &now_rfc3339()) {
                Ok(inserted) => {
                    tracing::info!(user_id, inserted, badges = ?badge_types, "awarded badges");
                }
                Err(err) => {
                    tracing::warn!(user_id, error = %err, "failed to persist earned badges");
                }
            }
        }

        let badges = db.list_user_badges(user_id)?;
        Ok(BadgeOutcome {
            newly_earned: evaluation.newly_earned,
            badges,
        })
    }

    pub fn earned(&self, user_id: &str) -> Result<Vec<UserBadge>> {
        let db = self.db()?;
        if db.get_user(user_id)?.is_none() {
            return Err(missing_user(user_id));
        }
        Ok(db.list_user_badges(user_id)?)
    }

    /// Progress bars for thresholds the user has not reached yet.
    pub fn progress(&self, user_id: &str) -> Result<Vec<BadgeProgress>> {
        let db = self.db()?;
        let user = db.get_user(user_id)?.ok_or_else(|| missing_user(user_id))?;
        let streak = user_streak(&db, user_id, today_utc())?;
        Ok(badge_progress(
            user.total_tokens,
            user.total_cost,
            user.global_rank,
            streak.current,
        ))
    }
}

/// Snapshot everything the badge conditions look at. Built fresh per
/// evaluation; never persisted.
fn build_context(db: &Db, user: &UserProfile) -> Result<BadgeContext> {
    let streak = user_streak(db, &user.id, today_utc())?;
    let is_early_country_user = match user.country_code.as_deref() {
        Some(country) => db
            .country_cohort_user_ids(country, EARLY_COHORT_SIZE)?
            .contains(&user.id),
        None => false,
    };
    Ok(BadgeContext {
        total_tokens: user.total_tokens,
        total_cost: user.total_cost,
        global_rank: user.global_rank,
        country_rank: user.country_rank,
        country_code: user.country_code.clone(),
        referral_count: user.referral_count,
        streak,
        is_early_country_user,
    })
}
