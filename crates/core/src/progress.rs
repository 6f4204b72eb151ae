use serde::Serialize;

use crate::badges::{BADGE_CATALOG, BadgeCondition};

/// Progress toward one not-yet-reached badge threshold.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BadgeProgress {
    pub id: &'static str,
    pub current: f64,
    pub target: f64,
    pub percent: f64,
}

pub fn threshold_percent(current: f64, target: f64) -> f64 {
    if target <= 0.0 {
        return 100.0;
    }
    (current / target * 100.0).min(100.0)
}

/// Rank progress is inverted: a lower rank number is better, so the percent
/// climbs toward 100 as `current` falls toward `target`. Unranked users sit
/// at zero.
pub fn rank_percent(current: Option<u32>, target: u32) -> f64 {
    match current {
        Some(rank) if rank >= 1 => (f64::from(target) / f64::from(rank) * 100.0).min(100.0),
        _ => 0.0,
    }
}

fn rank_reached(rank: Option<u32>, target: u32) -> bool {
    rank.is_some_and(|rank| rank >= 1 && rank <= target)
}

/// Progress entries for every unreached token, cost, global-rank, and streak
/// threshold, in catalog order. Reached thresholds are omitted rather than
/// reported at 100%, and badges without a numeric ladder (country rank,
/// referrals, early-adopter) carry no progress bar at all.
pub fn badge_progress(
    total_tokens: u64,
    total_cost: f64,
    global_rank: Option<u32>,
    streak_current: u32,
) -> Vec<BadgeProgress> {
    let mut entries = Vec::new();
    for badge in BADGE_CATALOG {
        let entry = match badge.condition {
            BadgeCondition::TokensAtLeast(target) if total_tokens < target => BadgeProgress {
                id: badge.id,
                current: total_tokens as f64,
                target: target as f64,
                percent: threshold_percent(total_tokens as f64, target as f64),
            },
            BadgeCondition::CostAtLeast(target) if total_cost < target => BadgeProgress {
                id: badge.id,
                current: total_cost,
                target,
                percent: threshold_percent(total_cost, target),
            },
            BadgeCondition::StreakAtLeast(target) if streak_current < target => BadgeProgress {
                id: badge.id,
                current: f64::from(streak_current),
                target: f64::from(target),
                percent: threshold_percent(f64::from(streak_current), f64::from(target)),
            },
            BadgeCondition::GlobalRankAtMost(target) if !rank_reached(global_rank, target) => {
                BadgeProgress {
                    id: badge.id,
                    current: f64::from(global_rank.unwrap_or(0)),
                    target: f64::from(target),
                    percent: rank_percent(global_rank, target),
                }
            }
            _ => continue,
        };
        entries.push(entry);
    }
    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry<'a>(entries: &'a [BadgeProgress], id: &str) -> Option<&'a BadgeProgress> {
        entries.iter().find(|entry| entry.id == id)
    }

    #[test]
    fn fresh_user_sees_every_ladder_rung() {
        let entries = badge_progress(0, 0.0, None, 0);
        // 4 token + 3 cost + 3 global-rank + 6 streak thresholds
        assert_eq!(entries.len(), 16);
        assert!(entries.iter().all(|entry| entry.percent == 0.0));
    }

    #[test]
    fn reached_thresholds_are_omitted() {
        let entries = badge_progress(15_000_000, 0.0, None, 0);
        assert!(entry(&entries, "tokens_1m").is_none());
        assert!(entry(&entries, "tokens_10m").is_none());

        let next = entry(&entries, "tokens_100m").expect("unreached tier present");
        assert_eq!(next.current, 15_000_000.0);
        assert_eq!(next.percent, 15.0);
    }

    #[test]
    fn rank_one_has_no_rank_entries() {
        let entries = badge_progress(0, 0.0, Some(1), 0);
        assert!(entry(&entries, "top_50").is_none());
        assert!(entry(&entries, "top_3").is_none());
        assert!(entry(&entries, "global_first").is_none());
    }

    #[test]
    fn inverse_rank_formula() {
        assert_eq!(rank_percent(Some(10), 50), 100.0);
        assert_eq!(rank_percent(Some(10), 5), 50.0);
        assert_eq!(rank_percent(Some(4), 1), 25.0);
    }

    #[test]
    fn unranked_users_show_zero_rank_progress() {
        let entries = badge_progress(0, 0.0, None, 0);
        let top_50 = entry(&entries, "top_50").expect("top 50 tracker");
        assert_eq!(top_50.current, 0.0);
        assert_eq!(top_50.percent, 0.0);

        // rank 0 from a stale snapshot is treated the same as unranked
        let entries = badge_progress(0, 0.0, Some(0), 0);
        assert_eq!(entry(&entries, "top_50").map(|entry| entry.percent), Some(0.0));
    }

    #[test]
    fn ranked_outside_target_still_tracks() {
        let entries = badge_progress(0, 0.0, Some(200), 0);
        let top_50 = entry(&entries, "top_50").expect("top 50 tracker");
        assert_eq!(top_50.percent, 25.0);
        assert!(entry(&entries, "top_3").is_some());
    }

    #[test]
    fn streak_and_cost_percentages() {
        let entries = badge_progress(0, 250.0, None, 21);
        assert!(entry(&entries, "streak_7").is_none());
        assert!(entry(&entries, "streak_14").is_none());
        assert_eq!(entry(&entries, "streak_30").map(|entry| entry.percent), Some(70.0));
        assert!(entry(&entries, "cost_100").is_none());
        assert_eq!(entry(&entries, "cost_1k").map(|entry| entry.percent), Some(25.0));
    }

    #[test]
    fn entries_follow_catalog_order() {
        let entries = badge_progress(0, 0.0, None, 0);
        let ids: Vec<&str> = entries.iter().map(|entry| entry.id).collect();
        let mut sorted_by_catalog = ids.clone();
        sorted_by_catalog.sort_by_key(|id| {
            crate::badges::BADGE_CATALOG
                .iter()
                .position(|badge| badge.id == *id)
                .unwrap_or(usize::MAX)
        });
        assert_eq!(ids, sorted_by_catalog);
    }
}
