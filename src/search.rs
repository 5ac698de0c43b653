//! # Temporal Search
//!
//! Lookups over the timeslice store used by synthesis.
//!
//! The service does not promise a point reading at every interval boundary, so
//! the search works in two steps:
//! 1. [`find_point_data`] collects point readings in a window on either side of
//!    the target instant
//! 2. [`find_smallest_interval`] pairs one reading from each side and checks
//!    whether the store holds an interval with exactly those bounds
//!
//! The nested loops return the *first* hit, so their iteration order is the
//! tie-break: the smallest search walks outward from the target instant, the
//! largest search walks inward from the window edges.

use crate::{TimeSlice, Timestamp, WeatherData};
use chrono::{DateTime, Duration, LocalResult, TimeZone, Utc};

/// Point readings within `[min_diff, max_diff]` of `point_t`.
///
/// Returns `(before, after)`: readings at or before `point_t` and readings
/// after it, both sorted by ascending start. The readings nearest to `point_t`
/// are therefore the *last* of `before` and the *first* of `after`.
pub fn find_point_data(
    wd: &WeatherData,
    point_t: Timestamp,
    min_diff: Duration,
    max_diff: Duration,
) -> (Vec<&TimeSlice>, Vec<&TimeSlice>) {
    let mut before = Vec::new();
    let mut after = Vec::new();
    let in_window = |diff: Duration| min_diff <= diff && diff <= max_diff;

    for ts in wd.timeslices().filter(|ts| !ts.is_interval()) {
        let diff = point_t - ts.end;
        if diff >= Duration::zero() {
            if in_window(diff) {
                before.push(ts);
            }
        } else if in_window(-diff) {
            after.push(ts);
        }
    }

    before.sort_by_key(|ts| ts.start);
    after.sort_by_key(|ts| ts.start);
    (before, after)
}

/// Interval spanning from a reading in `before` to a reading in `after`,
/// preferring bounds close to the target instant.
pub fn find_smallest_interval<'a>(
    wd: &'a WeatherData,
    before: &[&TimeSlice],
    after: &[&TimeSlice],
) -> Option<&'a TimeSlice> {
    before.iter().rev().find_map(|ts_start| {
        after
            .iter()
            .find_map(|ts_end| wd.get_timeslice(ts_start.start, ts_end.end))
    })
}

/// Like [`find_smallest_interval`] but preferring the widest span.
pub fn find_largest_interval<'a>(
    wd: &'a WeatherData,
    before: &[&TimeSlice],
    after: &[&TimeSlice],
) -> Option<&'a TimeSlice> {
    before.iter().find_map(|ts_start| {
        after
            .iter()
            .rev()
            .find_map(|ts_end| wd.get_timeslice(ts_start.start, ts_end.end))
    })
}

/// Narrowest interval ending exactly at `end_t`.
pub fn find_smallest_incomplete_interval(wd: &WeatherData, end_t: Timestamp) -> Option<&TimeSlice> {
    wd.timeslices()
        .filter(|ts| ts.is_interval() && ts.end == end_t)
        .max_by_key(|ts| ts.start)
}

/// Local wall-clock time `hour` hours after midnight of the day `day_offset`
/// days after `now`, in `now`'s time zone.
///
/// Hours past 23 roll into the following days. Ambiguous local times resolve to
/// the earlier instant; times skipped by a DST jump move forward by an hour.
pub fn local_time_at<Tz: TimeZone>(now: &DateTime<Tz>, day_offset: i64, hour: i64) -> Option<Timestamp> {
    let tz = now.timezone();
    let naive = (now.date_naive() + Duration::days(day_offset)).and_hms_opt(0, 0, 0)?
        + Duration::hours(hour);

    let local = match tz.from_local_datetime(&naive) {
        LocalResult::Single(t) => Some(t),
        LocalResult::Ambiguous(earliest, _) => Some(earliest),
        LocalResult::None => tz.from_local_datetime(&(naive + Duration::hours(1))).earliest(),
    };
    local.map(|t| t.with_timezone(&Utc))
}

/// Local midnight of the day `day_offset` days after `now`.
pub fn day_at_midnight<Tz: TimeZone>(now: &DateTime<Tz>, day_offset: i64) -> Option<Timestamp> {
    local_time_at(now, day_offset, 0)
}

/// Point readings relevant to the forecasts of one day: from 03:00 that day to
/// 09:00 the next morning, sorted by start.
pub fn get_point_data_for_day<'a, Tz: TimeZone>(
    wd: &'a WeatherData,
    now: &DateTime<Tz>,
    day_offset: i64,
) -> Vec<&'a TimeSlice> {
    let (Some(first), Some(last)) = (
        local_time_at(now, day_offset, 3),
        local_time_at(now, day_offset, 33),
    ) else {
        return Vec::new();
    };

    let mut found: Vec<_> = wd
        .timeslices()
        .filter(|ts| !ts.is_interval() && ts.start >= first && ts.end <= last)
        .collect();
    found.sort_by_key(|ts| ts.start);
    found
}
