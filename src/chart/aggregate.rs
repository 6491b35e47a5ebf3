//! Monthly bucketing, categorical counts and per-series progressions over a
//! primary collection.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde_json::Value;

use super::{ChartPoint, ChartX};
use crate::error::StoreError;
use crate::store::{path, BucketCount, Filter, PrimaryStore};

/// Bucket id for records whose date falls outside every month.
pub const DEFAULT_BUCKET: &str = "1970-01";

fn month_label(year: i32, month: u32) -> String {
    format!("{year:04}-{month:02}")
}

/// `YYYY-MM` labels from January of `start_year` through the month of `now`,
/// followed by the next month as the exclusive upper bound.
pub fn month_boundaries(start_year: i32, now: DateTime<Utc>) -> Vec<String> {
    let (end_year, end_month) = (now.year(), now.month());
    if end_year < start_year {
        return Vec::new();
    }

    let mut out = Vec::with_capacity(((end_year - start_year + 1) * 12) as usize);
    let (mut year, mut month) = (start_year, 1);
    loop {
        out.push(month_label(year, month));
        if (year, month) > (end_year, end_month) {
            break;
        }
        month += 1;
        if month > 12 {
            month = 1;
            year += 1;
        }
    }
    out
}

/// Unix seconds of midnight UTC on the first of a `YYYY-MM` month.
pub fn month_start(label: &str) -> Option<i64> {
    let date = NaiveDate::parse_from_str(&format!("{label}-01"), "%Y-%m-%d").ok()?;
    Some(date.and_hms_opt(0, 0, 0)?.and_utc().timestamp())
}

/// Unix seconds of an RFC 3339 timestamp or a `YYYY-MM-DD` date.
pub fn date_seconds(s: &str) -> Option<i64> {
    if let Ok(t) = DateTime::parse_from_rfc3339(s) {
        return Some(t.timestamp());
    }
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()?;
    Some(date.and_hms_opt(0, 0, 0)?.and_utc().timestamp())
}

/// Turn sparse bucket counts into a dense month series.
///
/// The default bucket is dropped. Months between the first and last
/// observed bucket that had no records are filled with zero.
pub fn fill_month_gaps(buckets: &[BucketCount], boundaries: &[String]) -> Vec<ChartPoint> {
    let counts: HashMap<&str, u64> = buckets
        .iter()
        .filter(|b| b.id != DEFAULT_BUCKET)
        .map(|b| (b.id.as_str(), b.count))
        .collect();

    let observed: Vec<usize> = boundaries
        .iter()
        .enumerate()
        .filter(|(_, label)| counts.contains_key(label.as_str()))
        .map(|(i, _)| i)
        .collect();
    let (Some(&first), Some(&last)) = (observed.first(), observed.last()) else {
        return Vec::new();
    };

    boundaries[first..=last]
        .iter()
        .filter_map(|label| {
            let x = month_start(label)?;
            let y = counts.get(label.as_str()).copied().unwrap_or(0);
            Some(ChartPoint::time(x, y as f64))
        })
        .collect()
}

/// Count records per calendar month of `date_path`.
pub fn month_volume(
    primary: &dyn PrimaryStore,
    collection: &str,
    filter: &Filter,
    date_path: &str,
    start_year: i32,
    now: DateTime<Utc>,
) -> Result<Vec<ChartPoint>, StoreError> {
    let boundaries = month_boundaries(start_year, now);
    let buckets =
        primary.bucket_count(collection, filter, date_path, &boundaries, DEFAULT_BUCKET)?;
    Ok(fill_month_gaps(&buckets, &boundaries))
}

/// Count records per distinct value of `group_path`, most frequent first.
/// Records without the field are left out.
pub fn distribution(
    primary: &dyn PrimaryStore,
    collection: &str,
    filter: &Filter,
    group_path: &str,
) -> Result<Vec<ChartPoint>, StoreError> {
    Ok(primary
        .group_count(collection, filter, group_path)?
        .into_iter()
        .filter_map(|g| Some(ChartPoint::label(path::scalar_key(&g.key)?, g.count as f64)))
        .collect())
}

/// Plot `value_path` against `date_path`, one series per record kind.
///
/// The series name joins the scalar values found at `series_paths` with `_`,
/// skipping absent ones. Records without a readable date or a numeric value
/// are left out. Points are in date order.
pub fn series(
    primary: &dyn PrimaryStore,
    collection: &str,
    filter: &Filter,
    series_paths: &[String],
    date_path: &str,
    value_path: &str,
) -> Result<BTreeMap<String, Vec<ChartPoint>>, StoreError> {
    let mut data: BTreeMap<String, Vec<ChartPoint>> = BTreeMap::new();
    for (_, doc) in primary.find(collection, filter)? {
        let x = path::lookup_first(&doc, date_path)
            .and_then(Value::as_str)
            .and_then(date_seconds);
        let y = path::lookup_first(&doc, value_path).and_then(Value::as_f64);
        let (Some(x), Some(y)) = (x, y) else {
            continue;
        };

        let name = series_paths
            .iter()
            .filter_map(|p| path::lookup_first(&doc, p).and_then(path::scalar_key))
            .collect::<Vec<_>>()
            .join("_");
        if name.is_empty() {
            continue;
        }
        data.entry(name).or_default().push(ChartPoint::time(x, y));
    }

    for points in data.values_mut() {
        points.sort_by_key(|p| match p.x {
            ChartX::Time(t) => t,
            ChartX::Label(_) => 0,
        });
    }
    Ok(data)
}
