use std::collections::BTreeMap;

use crate::DailyUsage;

/// Sum raw per-device rows into one entry per calendar date.
///
/// The accessors make this reusable for any row shape: `date_of` yields the
/// `YYYY-MM-DD` key, `tokens_of`/`cost_of` yield the numeric fields. Missing
/// and negative values are coerced to zero before summing. Output is sparse
/// (no entry for dates without rows) and chronologically sorted.
pub fn aggregate_daily<T, D, K, C>(
    rows: &[T],
    date_of: D,
    tokens_of: K,
    cost_of: C,
) -> Vec<DailyUsage>
where
    D: Fn(&T) -> &str,
    K: Fn(&T) -> Option<i64>,
    C: Fn(&T) -> Option<f64>,
{
    let mut buckets: BTreeMap<String, (u64, f64)> = BTreeMap::new();
    for row in rows {
        let tokens = tokens_of(row).unwrap_or(0).max(0) as u64;
        let cost = cost_of(row).unwrap_or(0.0).max(0.0);
        let entry = buckets.entry(date_of(row).to_string()).or_insert((0, 0.0));
        entry.0 = entry.0.saturating_add(tokens);
        entry.1 += cost;
    }
    buckets
        .into_iter()
        .map(|(date, (tokens, cost))| DailyUsage { date, tokens, cost })
        .collect()
}

/// Summed tokens and cost over an aggregated window.
pub fn daily_totals(daily: &[DailyUsage]) -> (u64, f64) {
    let tokens = daily.iter().fold(0u64, |acc, day| acc.saturating_add(day.tokens));
    let cost = daily.iter().map(|day| day.cost).sum();
    (tokens, cost)
}

/// Average tokens/cost per date present in the window. Dates with no rows do
/// not dilute the average; an empty window averages to zero.
pub fn daily_averages(daily: &[DailyUsage]) -> (f64, f64) {
    if daily.is_empty() {
        return (0.0, 0.0);
    }
    let (tokens, cost) = daily_totals(daily);
    let days = daily.len() as f64;
    (tokens as f64 / days, cost / days)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct RawRow {
        date: &'static str,
        tokens: Option<i64>,
        cost: Option<f64>,
    }

    fn aggregate(rows: &[RawRow]) -> Vec<DailyUsage> {
        aggregate_daily(rows, |row| row.date, |row| row.tokens, |row| row.cost)
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert!(aggregate(&[]).is_empty());
    }

    #[test]
    fn sums_rows_sharing_a_date() {
        let daily = aggregate(&[
            RawRow { date: "2024-03-01", tokens: Some(500), cost: Some(1.25) },
            RawRow { date: "2024-03-01", tokens: Some(300), cost: Some(0.75) },
            RawRow { date: "2024-03-02", tokens: Some(0), cost: Some(0.0) },
        ]);

        assert_eq!(daily.len(), 2);
        assert_eq!(daily[0].date, "2024-03-01");
        assert_eq!(daily[0].tokens, 800);
        assert!((daily[0].cost - 2.0).abs() < 1e-9);
        assert_eq!(daily[1].date, "2024-03-02");
        assert_eq!(daily[1].tokens, 0);
    }

    #[test]
    fn preserves_total_across_dates() {
        let rows = [
            RawRow { date: "2024-01-03", tokens: Some(10), cost: Some(0.1) },
            RawRow { date: "2024-01-01", tokens: Some(20), cost: Some(0.2) },
            RawRow { date: "2024-01-03", tokens: Some(30), cost: Some(0.3) },
            RawRow { date: "2024-01-02", tokens: Some(40), cost: Some(0.4) },
        ];
        let daily = aggregate(&rows);

        let summed_tokens: u64 = daily.iter().map(|day| day.tokens).sum();
        let summed_cost: f64 = daily.iter().map(|day| day.cost).sum();
        assert_eq!(summed_tokens, 100);
        assert!((summed_cost - 1.0).abs() < 1e-9);
        // Chronological regardless of input order.
        let dates: Vec<&str> = daily.iter().map(|day| day.date.as_str()).collect();
        assert_eq!(dates, ["2024-01-01", "2024-01-02", "2024-01-03"]);
    }

    #[test]
    fn coerces_missing_and_negative_values_to_zero() {
        let daily = aggregate(&[
            RawRow { date: "2024-05-05", tokens: None, cost: None },
            RawRow { date: "2024-05-05", tokens: Some(-50), cost: Some(-2.0) },
            RawRow { date: "2024-05-05", tokens: Some(7), cost: Some(0.5) },
        ]);

        assert_eq!(daily.len(), 1);
        assert_eq!(daily[0].tokens, 7);
        assert!((daily[0].cost - 0.5).abs() < 1e-9);
    }

    #[test]
    fn averages_divide_by_dates_present() {
        let daily = vec![
            DailyUsage { date: "2024-02-01".to_string(), tokens: 100, cost: 2.0 },
            DailyUsage { date: "2024-02-05".to_string(), tokens: 300, cost: 4.0 },
        ];
        let (avg_tokens, avg_cost) = daily_averages(&daily);
        assert!((avg_tokens - 200.0).abs() < 1e-9);
        assert!((avg_cost - 3.0).abs() < 1e-9);

        let (empty_tokens, empty_cost) = daily_averages(&[]);
        assert_eq!(empty_tokens, 0.0);
        assert_eq!(empty_cost, 0.0);
    }
}
