//! # Timeslice Store
//!
//! Rolling window of service timeslices keyed by `(start, end)`, plus the cached
//! current conditions derived from it.
//!
//! ## Merge Semantics
//! - **Upsert**: a slice with a known key replaces the stored one in place
//! - **Stale on arrival**: slices that ended more than 24 hours ago are dropped
//! - **Reversed**: slices ending before they start are refused
//! - **Ownership**: merging moves the slice into the store; a replaced slice is
//!   handed back to the caller
//!
//! ## Expiry
//! [`expire_timeslices`] removes everything that ended more than 24 hours before
//! the given instant. Running it twice with the same instant is a no-op.
//!
//! Ordering inside the store carries no meaning; searches in [`crate::search`]
//! sort whatever they collect.

use crate::{TimeSlice, Timestamp};
use chrono::Duration;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

/// How long a timeslice is kept after its end
pub const MAX_AGE_HOURS: i64 = 24;

fn too_old(end: Timestamp, now: Timestamp) -> bool {
    now - end > Duration::hours(MAX_AGE_HOURS)
}

/// All timeslices currently known, at most one per `(start, end)`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct WeatherData {
    pub(crate) timeslices: Vec<TimeSlice>,
    /// Synthesized, not part of the keyed set; replaced wholesale on refresh
    pub current_conditions: Option<TimeSlice>,
}

/// Outcome of [`merge_timeslice`].
#[derive(Clone, Debug, PartialEq)]
pub enum Merge {
    /// No slice with that key existed
    Inserted,
    /// The previous slice with the same key
    Replaced(TimeSlice),
    /// The slice ended too long ago and was not stored
    Stale(TimeSlice),
    /// The slice ends before it starts and was not stored
    Invalid(TimeSlice),
}

impl WeatherData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.timeslices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timeslices.is_empty()
    }

    pub fn timeslices(&self) -> impl Iterator<Item = &TimeSlice> {
        self.timeslices.iter()
    }

    /// Exact lookup by key.
    pub fn get_timeslice(&self, start: Timestamp, end: Timestamp) -> Option<&TimeSlice> {
        self.timeslices
            .iter()
            .find(|ts| ts.start == start && ts.end == end)
    }

    fn position(&self, start: Timestamp, end: Timestamp) -> Option<usize> {
        self.timeslices
            .iter()
            .position(|ts| ts.start == start && ts.end == end)
    }
}

/// Insert `ts` or replace the slice stored under the same key.
///
/// `now` is only used to reject slices that are already past the retention
/// window. Slices with `end < start` are never stored.
///
/// # Example
/// ```
/// use chrono::{Duration, TimeZone, Utc};
/// use weather_core::weather_data::{merge_timeslice, Merge};
/// use weather_core::{Location, TimeSlice, WeatherData};
///
/// let now = Utc.with_ymd_and_hms(2024, 6, 16, 12, 0, 0).unwrap();
/// let mut wd = WeatherData::new();
///
/// let reading = TimeSlice::point_data(now, Location::default());
/// assert_eq!(merge_timeslice(&mut wd, reading.clone(), now), Merge::Inserted);
/// assert!(matches!(merge_timeslice(&mut wd, reading, now), Merge::Replaced(_)));
/// assert_eq!(wd.len(), 1);
///
/// let old = TimeSlice::point_data(now - Duration::hours(25), Location::default());
/// assert!(matches!(merge_timeslice(&mut wd, old, now), Merge::Stale(_)));
/// ```
pub fn merge_timeslice(wd: &mut WeatherData, ts: TimeSlice, now: Timestamp) -> Merge {
    if ts.end < ts.start {
        warn!("refusing reversed timeslice {} - {}", ts.start, ts.end);
        return Merge::Invalid(ts);
    }
    if too_old(ts.end, now) {
        debug!("discarding stale timeslice {} - {}", ts.start, ts.end);
        return Merge::Stale(ts);
    }

    match wd.position(ts.start, ts.end) {
        Some(idx) => Merge::Replaced(std::mem::replace(&mut wd.timeslices[idx], ts)),
        None => {
            wd.timeslices.push(ts);
            Merge::Inserted
        }
    }
}

/// Drop every timeslice that ended more than 24 hours before `now`.
///
/// Cached current conditions are cleared by the same rule. Returns the number
/// of timeslices removed.
pub fn expire_timeslices(wd: &mut WeatherData, now: Timestamp) -> usize {
    let before = wd.timeslices.len();
    wd.timeslices.retain(|ts| !too_old(ts.end, now));
    let removed = before - wd.timeslices.len();

    if wd
        .current_conditions
        .as_ref()
        .is_some_and(|cc| too_old(cc.end, now))
    {
        wd.current_conditions = None;
    }

    if removed > 0 {
        debug!("expired {removed} timeslices, {} left", wd.timeslices.len());
    }
    removed
}
