use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{DailyUsage, StreakResult};

/// Where the current-streak walk starts.
///
/// Daily stats are usually submitted retroactively, so with `TodayOnly` a
/// user who was active through yesterday reads as streakless until their
/// next submission lands. `TodayOrYesterday` keeps the run alive until a
/// full calendar day has been missed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreakAnchor {
    #[default]
    TodayOrYesterday,
    TodayOnly,
}

impl StreakAnchor {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "today_or_yesterday" => Some(Self::TodayOrYesterday),
            "today_only" => Some(Self::TodayOnly),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TodayOrYesterday => "today_or_yesterday",
            Self::TodayOnly => "today_only",
        }
    }
}

/// Compute current and longest consecutive-active-day streaks.
///
/// A date is active when its summed tokens are greater than zero. Dates are
/// compared as plain `YYYY-MM-DD` calendar days, so DST transitions cannot
/// produce off-by-one runs. Unparseable dates are ignored.
pub fn compute_streaks(
    daily: &[DailyUsage],
    today: NaiveDate,
    anchor: StreakAnchor,
) -> StreakResult {
    let active: BTreeSet<NaiveDate> = daily
        .iter()
        .filter(|day| day.tokens > 0)
        .filter_map(|day| NaiveDate::parse_from_str(&day.date, "%Y-%m-%d").ok())
        .collect();
    if active.is_empty() {
        return StreakResult { current: 0, longest: 0 };
    }

    let start = if active.contains(&today) {
        Some(today)
    } else if anchor == StreakAnchor::TodayOrYesterday {
        today.pred_opt().filter(|yesterday| active.contains(yesterday))
    } else {
        None
    };

    let mut current = 0u32;
    let mut cursor = start;
    while let Some(day) = cursor {
        if !active.contains(&day) {
            break;
        }
        current += 1;
        cursor = day.pred_opt();
    }

    let mut longest = 0u32;
    let mut run = 0u32;
    let mut prev: Option<NaiveDate> = None;
    for date in &active {
        run = match prev {
            Some(prev) if prev.succ_opt() == Some(*date) => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        prev = Some(*date);
    }

    StreakResult { current, longest }
}
