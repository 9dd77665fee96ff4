use crate::models::{Metrics, RecordSet, TrendPoint};
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::{BTreeMap, HashSet};

const TIMESTAMP_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

pub fn summarize(records: &RecordSet) -> Metrics {
    let total_kg: f64 = records.iter().map(|record| record.quantity_kg.kg()).sum();
    let distinct_cafes = records
        .iter()
        .map(|record| record.cafe_name.as_str())
        .filter(|name| !name.is_empty())
        .collect::<HashSet<_>>()
        .len();

    Metrics {
        request_count: records.len(),
        total_kg,
        distinct_cafes,
    }
}

/// Per-day totals, oldest first. Records whose timestamp does not parse are
/// left out, so this can be empty even when `records` is not.
pub fn trend(records: &RecordSet) -> Vec<TrendPoint> {
    let mut days: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for record in records {
        if let Some(date) = request_date(&record.requested_at) {
            *days.entry(date).or_default() += record.quantity_kg.kg();
        }
    }

    days.into_iter()
        .map(|(date, total_kg)| TrendPoint { date, total_kg })
        .collect()
}

pub fn request_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|timestamp| timestamp.date())
        .or_else(|| NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok())
}

/// `total_kg / goal_kg` clamped to `[0, 1]`; a non-positive goal gives 0.
pub fn progress_ratio(total_kg: f64, goal_kg: f64) -> f64 {
    if goal_kg <= 0.0 {
        return 0.0;
    }
    let ratio = total_kg / goal_kg;
    if ratio.is_nan() {
        return 0.0;
    }
    ratio.clamp(0.0, 1.0)
}

pub fn progress_label(ratio: f64) -> String {
    format!("{:.1}%", ratio * 100.0)
}
