use std::cmp::Ordering;

use chrono::{DateTime, Datelike, NaiveDate, Utc};

/// Most recent of the candidate timestamps, `None` when all are missing.
pub fn latest_timestamp(candidates: &[Option<DateTime<Utc>>]) -> Option<DateTime<Utc>> {
    candidates.iter().flatten().max().copied()
}

/// Sort newest first by the latest of each item's candidate timestamps.
/// Items without any timestamp sink to the end.
pub fn sort_by_latest<T, F, const N: usize>(items: &mut [T], candidates: F)
where
    F: Fn(&T) -> [Option<DateTime<Utc>>; N],
{
    items.sort_by(|a, b| {
        match (latest_timestamp(&candidates(a)), latest_timestamp(&candidates(b))) {
            (Some(ta), Some(tb)) => tb.cmp(&ta),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    });
}

/// Midnight UTC on the first day of `now`'s month.
pub fn start_of_month(now: DateTime<Utc>) -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(now.year(), now.month(), 1)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .unwrap_or(now)
}
