use std::collections::BTreeSet;

use serde::Serialize;

use crate::BadgeContext;

/// How many signups per country count as that country's early adopters.
pub const EARLY_COHORT_SIZE: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeCategory {
    Usage,
    Cost,
    Rank,
    Streak,
    Community,
}

/// Declarative award condition, checked against a [`BadgeContext`] snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BadgeCondition {
    TokensAtLeast(u64),
    CostAtLeast(f64),
    GlobalRankAtMost(u32),
    CountryRankAtMost(u32),
    StreakAtLeast(u32),
    ReferralsAtLeast(u32),
    EarlyCountryUser,
}

impl BadgeCondition {
    pub fn evaluate(&self, ctx: &BadgeContext) -> bool {
        match *self {
            Self::TokensAtLeast(target) => ctx.total_tokens >= target,
            Self::CostAtLeast(target) => ctx.total_cost >= target,
            Self::GlobalRankAtMost(target) => {
                ctx.global_rank.is_some_and(|rank| rank >= 1 && rank <= target)
            }
            Self::CountryRankAtMost(target) => {
                ctx.country_code.is_some()
                    && ctx.country_rank.is_some_and(|rank| rank >= 1 && rank <= target)
            }
            Self::StreakAtLeast(target) => ctx.streak.current >= target,
            Self::ReferralsAtLeast(target) => ctx.referral_count >= target,
            Self::EarlyCountryUser => ctx.country_code.is_some() && ctx.is_early_country_user,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Badge {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub category: BadgeCategory,
    pub condition: BadgeCondition,
}

/// Every badge the product awards, in evaluation (and display) order.
///
/// Tiers are cumulative: crossing one billion tokens in a single submission
/// awards every lower token tier in the same pass because each tier is an
/// independent threshold over the same lifetime total.
pub const BADGE_CATALOG: &[Badge] = &[
    Badge {
        id: "tokens_1m",
        name: "Million Club",
        description: "Burned through 1 million tokens",
        icon: "zap",
        category: BadgeCategory::Usage,
        condition: BadgeCondition::TokensAtLeast(1_000_000),
    },
    Badge {
        id: "tokens_10m",
        name: "Heavy Hitter",
        description: "Burned through 10 million tokens",
        icon: "flame",
        category: BadgeCategory::Usage,
        condition: BadgeCondition::TokensAtLeast(10_000_000),
    },
    Badge {
        id: "tokens_100m",
        name: "Token Furnace",
        description: "Burned through 100 million tokens",
        icon: "factory",
        category: BadgeCategory::Usage,
        condition: BadgeCondition::TokensAtLeast(100_000_000),
    },
    Badge {
        id: "tokens_1b",
        name: "Billionaire",
        description: "Burned through 1 billion tokens",
        icon: "crown",
        category: BadgeCategory::Usage,
        condition: BadgeCondition::TokensAtLeast(1_000_000_000),
    },
    Badge {
        id: "cost_100",
        name: "Paying Customer",
        description: "Spent $100 in compute",
        icon: "coins",
        category: BadgeCategory::Cost,
        condition: BadgeCondition::CostAtLeast(100.0),
    },
    Badge {
        id: "cost_1k",
        name: "Big Spender",
        description: "Spent $1,000 in compute",
        icon: "banknote",
        category: BadgeCategory::Cost,
        condition: BadgeCondition::CostAtLeast(1_000.0),
    },
    Badge {
        id: "cost_10k",
        name: "Whale",
        description: "Spent $10,000 in compute",
        icon: "gem",
        category: BadgeCategory::Cost,
        condition: BadgeCondition::CostAtLeast(10_000.0),
    },
    Badge {
        id: "top_50",
        name: "Top 50",
        description: "Reached the global top 50",
        icon: "trending-up",
        category: BadgeCategory::Rank,
        condition: BadgeCondition::GlobalRankAtMost(50),
    },
    Badge {
        id: "top_3",
        name: "Podium",
        description: "Reached the global top 3",
        icon: "medal",
        category: BadgeCategory::Rank,
        condition: BadgeCondition::GlobalRankAtMost(3),
    },
    Badge {
        id: "global_first",
        name: "World Champion",
        description: "Ranked #1 worldwide",
        icon: "trophy",
        category: BadgeCategory::Rank,
        condition: BadgeCondition::GlobalRankAtMost(1),
    },
    Badge {
        id: "country_first",
        name: "National Champion",
        description: "Ranked #1 in your country",
        icon: "flag",
        category: BadgeCategory::Rank,
        condition: BadgeCondition::CountryRankAtMost(1),
    },
    Badge {
        id: "streak_7",
        name: "One Week In",
        description: "7-day usage streak",
        icon: "calendar",
        category: BadgeCategory::Streak,
        condition: BadgeCondition::StreakAtLeast(7),
    },
    Badge {
        id: "streak_14",
        name: "Fortnight",
        description: "14-day usage streak",
        icon: "calendar-check",
        category: BadgeCategory::Streak,
        condition: BadgeCondition::StreakAtLeast(14),
    },
    Badge {
        id: "streak_30",
        name: "Monthly Habit",
        description: "30-day usage streak",
        icon: "calendar-heart",
        category: BadgeCategory::Streak,
        condition: BadgeCondition::StreakAtLeast(30),
    },
    Badge {
        id: "streak_60",
        name: "Two Months Strong",
        description: "60-day usage streak",
        icon: "calendar-range",
        category: BadgeCategory::Streak,
        condition: BadgeCondition::StreakAtLeast(60),
    },
    Badge {
        id: "streak_90",
        name: "Quarter Grinder",
        description: "90-day usage streak",
        icon: "calendar-clock",
        category: BadgeCategory::Streak,
        condition: BadgeCondition::StreakAtLeast(90),
    },
    Badge {
        id: "streak_180",
        name: "Half-Year Machine",
        description: "180-day usage streak",
        icon: "infinity",
        category: BadgeCategory::Streak,
        condition: BadgeCondition::StreakAtLeast(180),
    },
    Badge {
        id: "early_adopter",
        name: "Early Adopter",
        description: "Among the first 10 users from your country",
        icon: "sunrise",
        category: BadgeCategory::Community,
        condition: BadgeCondition::EarlyCountryUser,
    },
    Badge {
        id: "referrer_1",
        name: "Recruiter",
        description: "Referred your first user",
        icon: "user-plus",
        category: BadgeCategory::Community,
        condition: BadgeCondition::ReferralsAtLeast(1),
    },
    Badge {
        id: "referrer_10",
        name: "Talent Scout",
        description: "Referred 10 users",
        icon: "users",
        category: BadgeCategory::Community,
        condition: BadgeCondition::ReferralsAtLeast(10),
    },
];

pub fn badge_by_id(id: &str) -> Option<&'static Badge> {
    BADGE_CATALOG.iter().find(|badge| badge.id == id)
}

#[derive(Debug)]
pub struct BadgeEvaluation {
    /// Badges that fired this pass and were not already earned.
    pub newly_earned: Vec<&'static Badge>,
    /// Complete earned set after this pass, newly earned included.
    pub earned_ids: BTreeSet<String>,
}

/// Run the full catalog against `ctx`, skipping badges in `already_earned`.
///
/// Badges are never revoked: a user who falls out of the top 50 keeps the
/// badge, so only the earned set filters evaluation, never the context.
pub fn evaluate_badges(ctx: &BadgeContext, already_earned: &BTreeSet<String>) -> BadgeEvaluation {
    let mut newly_earned = Vec::new();
    let mut earned_ids = already_earned.clone();
    for badge in BADGE_CATALOG {
        if earned_ids.contains(badge.id) {
            continue;
        }
        if badge.condition.evaluate(ctx) {
            newly_earned.push(badge);
            earned_ids.insert(badge.id.to_string());
        }
    }
    BadgeEvaluation { newly_earned, earned_ids }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StreakResult;

    fn ids(evaluation: &BadgeEvaluation) -> Vec<&'static str> {
        evaluation.newly_earned.iter().map(|badge| badge.id).collect()
    }

    #[test]
    fn catalog_ids_are_unique() {
        let unique: BTreeSet<&str> = BADGE_CATALOG.iter().map(|badge| badge.id).collect();
        assert_eq!(unique.len(), BADGE_CATALOG.len());
    }

    #[test]
    fn fresh_user_earns_nothing() {
        let evaluation = evaluate_badges(&BadgeContext::default(), &BTreeSet::new());
        assert!(evaluation.newly_earned.is_empty());
        assert!(evaluation.earned_ids.is_empty());
    }

    #[test]
    fn cumulative_token_tiers_fire_together() {
        let ctx = BadgeContext { total_tokens: 2_000_000_000, ..BadgeContext::default() };
        let evaluation = evaluate_badges(&ctx, &BTreeSet::new());
        assert_eq!(ids(&evaluation), vec!["tokens_1m", "tokens_10m", "tokens_100m", "tokens_1b"]);
    }

    #[test]
    fn already_earned_badges_never_fire_again() {
        let ctx = BadgeContext { total_tokens: 2_000_000, ..BadgeContext::default() };
        let first = evaluate_badges(&ctx, &BTreeSet::new());
        assert_eq!(ids(&first), vec!["tokens_1m"]);

        let second = evaluate_badges(&ctx, &first.earned_ids);
        assert!(second.newly_earned.is_empty());
        assert_eq!(second.earned_ids, first.earned_ids);
    }

    #[test]
    fn rank_badges_require_a_rank() {
        let unranked = BadgeContext { global_rank: None, ..BadgeContext::default() };
        assert!(!BadgeCondition::GlobalRankAtMost(50).evaluate(&unranked));

        let first = BadgeContext { global_rank: Some(1), ..BadgeContext::default() };
        let evaluation = evaluate_badges(&first, &BTreeSet::new());
        assert_eq!(ids(&evaluation), vec!["top_50", "top_3", "global_first"]);
    }

    #[test]
    fn country_badges_require_a_country() {
        let stateless = BadgeContext {
            country_rank: Some(1),
            is_early_country_user: true,
            country_code: None,
            ..BadgeContext::default()
        };
        let evaluation = evaluate_badges(&stateless, &BTreeSet::new());
        assert!(evaluation.newly_earned.is_empty());

        let placed = BadgeContext { country_code: Some("NL".to_string()), ..stateless };
        let evaluation = evaluate_badges(&placed, &BTreeSet::new());
        assert_eq!(ids(&evaluation), vec!["country_first", "early_adopter"]);
    }

    #[test]
    fn streak_badges_follow_current_streak() {
        let ctx = BadgeContext {
            streak: StreakResult { current: 14, longest: 40 },
            ..BadgeContext::default()
        };
        let evaluation = evaluate_badges(&ctx, &BTreeSet::new());
        assert_eq!(ids(&evaluation), vec!["streak_7", "streak_14"]);
    }

    #[test]
    fn referral_tiers() {
        let ctx = BadgeContext { referral_count: 10, ..BadgeContext::default() };
        let evaluation = evaluate_badges(&ctx, &BTreeSet::new());
        assert_eq!(ids(&evaluation), vec!["referrer_1", "referrer_10"]);
    }

    #[test]
    fn badge_by_id_finds_catalog_entries() {
        assert_eq!(badge_by_id("whale").map(|badge| badge.id), None);
        assert_eq!(badge_by_id("cost_10k").map(|badge| badge.id), Some("cost_10k"));
    }
}
