//! # Astronomical Data
//!
//! Per-day sunrise/sunset, moonrise/moonset and moon phase, kept separately from
//! the timeslice series. One record per calendar day; merging a record for a
//! known day replaces it.

use crate::{lunar, Timestamp};
use chrono::{DateTime, Duration, TimeZone, Timelike};
use log::debug;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;

/// How long an astro record is kept after its day started
pub const MAX_AGE_HOURS: i64 = 24;

/// The eight canonical moon phases.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoonPhase {
    #[serde(rename = "New moon")]
    NewMoon,
    #[serde(rename = "Waxing crescent")]
    WaxingCrescent,
    #[serde(rename = "First quarter")]
    FirstQuarter,
    #[serde(rename = "Waxing gibbous")]
    WaxingGibbous,
    #[serde(rename = "Full moon")]
    FullMoon,
    #[serde(rename = "Waning gibbous")]
    WaningGibbous,
    #[serde(rename = "Third quarter")]
    ThirdQuarter,
    #[serde(rename = "Waning crescent")]
    WaningCrescent,
}

impl MoonPhase {
    pub const fn all() -> &'static [MoonPhase] {
        &[
            MoonPhase::NewMoon,
            MoonPhase::WaxingCrescent,
            MoonPhase::FirstQuarter,
            MoonPhase::WaxingGibbous,
            MoonPhase::FullMoon,
            MoonPhase::WaningGibbous,
            MoonPhase::ThirdQuarter,
            MoonPhase::WaningCrescent,
        ]
    }

    /// Phase for index 0 – 7, 0 being new moon. Wraps modulo 8.
    pub fn from_index(index: u8) -> Self {
        Self::all()[usize::from(index & 7)]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MoonPhase::NewMoon => "New moon",
            MoonPhase::WaxingCrescent => "Waxing crescent",
            MoonPhase::FirstQuarter => "First quarter",
            MoonPhase::WaxingGibbous => "Waxing gibbous",
            MoonPhase::FullMoon => "Full moon",
            MoonPhase::WaningGibbous => "Waning gibbous",
            MoonPhase::ThirdQuarter => "Third quarter",
            MoonPhase::WaningCrescent => "Waning crescent",
        }
    }
}

impl fmt::Display for MoonPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Moon phase name outside the canonical eight.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown moon phase '{0}'")]
pub struct UnknownMoonPhase(pub String);

impl FromStr for MoonPhase {
    type Err = UnknownMoonPhase;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let wanted = value.trim();
        MoonPhase::all()
            .iter()
            .copied()
            .find(|phase| phase.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownMoonPhase(value.to_string()))
    }
}

/// Sun and moon events of one day.
///
/// For the sun, exactly one of these holds: both `sunrise` and `sunset` are
/// known, `sun_never_rises`, or `sun_never_sets`. The moon follows the same
/// pattern.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AstroRecord {
    /// Local midnight of the day
    pub day: Timestamp,

    pub sunrise: Option<Timestamp>,
    pub sunset: Option<Timestamp>,
    pub sun_never_rises: bool,
    pub sun_never_sets: bool,

    pub moonrise: Option<Timestamp>,
    pub moonset: Option<Timestamp>,
    pub moon_never_rises: bool,
    pub moon_never_sets: bool,

    pub moon_phase: Option<MoonPhase>,
}

impl AstroRecord {
    /// Record for `day` with no events known yet.
    pub fn new(day: Timestamp) -> Self {
        AstroRecord {
            day,
            sunrise: None,
            sunset: None,
            sun_never_rises: false,
            sun_never_sets: false,
            moonrise: None,
            moonset: None,
            moon_never_rises: false,
            moon_never_sets: false,
            moon_phase: None,
        }
    }

    /// Phase reported by the service, or an estimate from the calendar date.
    pub fn moon_phase_or_estimate(&self) -> MoonPhase {
        self.moon_phase
            .unwrap_or_else(|| lunar::estimate_phase(self.day.date_naive()))
    }
}

/// Astro records keyed by day.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AstroSet {
    records: Vec<AstroRecord>,
}

impl AstroSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AstroRecord> {
        self.records.iter()
    }

    /// Exact lookup by day.
    pub fn get(&self, day: Timestamp) -> Option<&AstroRecord> {
        self.records.iter().find(|rec| rec.day == day)
    }

    /// Record for the local calendar day `day_offset` days after `now`.
    pub fn for_day<Tz: TimeZone>(&self, now: &DateTime<Tz>, day_offset: i64) -> Option<&AstroRecord> {
        let tz = now.timezone();
        let target = now.date_naive() + Duration::days(day_offset);
        self.records
            .iter()
            .find(|rec| rec.day.with_timezone(&tz).date_naive() == target)
    }
}

/// Insert `record` or replace the one for the same day, returning the
/// replaced record.
pub fn merge_astro(set: &mut AstroSet, record: AstroRecord) -> Option<AstroRecord> {
    match set.records.iter().position(|rec| rec.day == record.day) {
        Some(idx) => Some(std::mem::replace(&mut set.records[idx], record)),
        None => {
            set.records.push(record);
            None
        }
    }
}

/// Drop every record whose day started more than 24 hours before `now`.
pub fn expire_astro(set: &mut AstroSet, now: Timestamp) -> usize {
    let before = set.records.len();
    set.records
        .retain(|rec| now - rec.day <= Duration::hours(MAX_AGE_HOURS));
    let removed = before - set.records.len();
    if removed > 0 {
        debug!("expired {removed} astro records");
    }
    removed
}

/// Whether `now` falls into the night.
///
/// With astro data the sun events decide; without it, 21:00 – 05:00 local time
/// counts as night.
pub fn is_night_time<Tz: TimeZone>(astro: Option<&AstroRecord>, now: &DateTime<Tz>) -> bool {
    match astro {
        Some(rec) if rec.sun_never_rises => true,
        Some(rec) if rec.sun_never_sets => false,
        Some(AstroRecord {
            sunrise: Some(sunrise),
            sunset: Some(sunset),
            ..
        }) => {
            let now = now.with_timezone(&chrono::Utc);
            now < *sunrise || now >= *sunset
        }
        _ => {
            let hour = now.hour();
            hour >= 21 || hour < 5
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    fn midnight(day: u32) -> Timestamp {
        Utc.with_ymd_and_hms(2024, 6, day, 0, 0, 0).unwrap()
    }

    fn record(day: u32, rise_hour: i64, set_hour: i64) -> AstroRecord {
        let mut rec = AstroRecord::new(midnight(day));
        rec.sunrise = Some(midnight(day) + Duration::hours(rise_hour));
        rec.sunset = Some(midnight(day) + Duration::hours(set_hour));
        rec
    }

    #[test]
    fn test_merge_replaces_same_day() {
        let mut set = AstroSet::new();
        assert!(merge_astro(&mut set, record(16, 5, 21)).is_none());
        assert!(merge_astro(&mut set, record(17, 5, 21)).is_none());

        let replaced = merge_astro(&mut set, record(16, 4, 22));
        assert_eq!(replaced.and_then(|r| r.sunrise), Some(midnight(16) + Duration::hours(5)));
        assert_eq!(set.len(), 2);
        assert_eq!(set.iter().next().map(|r| r.day), Some(midnight(16)), "replaced in place");
        assert_eq!(
            set.get(midnight(16)).and_then(|r| r.sunset),
            Some(midnight(16) + Duration::hours(22))
        );
    }

    #[test]
    fn test_expire_astro() {
        let mut set = AstroSet::new();
        for day in 14..=18 {
            merge_astro(&mut set, AstroRecord::new(midnight(day)));
        }
        let now = midnight(17);
        assert_eq!(expire_astro(&mut set, now), 2, "the day before yesterday and earlier go");
        assert!(set.iter().all(|r| now - r.day <= Duration::hours(24)));
        assert_eq!(expire_astro(&mut set, now), 0);
    }

    #[test]
    fn test_for_day_uses_local_calendar() {
        let mut set = AstroSet::new();
        merge_astro(&mut set, AstroRecord::new(midnight(16)));
        merge_astro(&mut set, AstroRecord::new(midnight(17)));

        let now = midnight(16) + Duration::hours(10);
        assert_eq!(set.for_day(&now, 1).map(|r| r.day), Some(midnight(17)));
        assert!(set.for_day(&now, 2).is_none());
    }

    #[test]
    fn test_night_from_sun_events() {
        let rec = record(16, 5, 21);
        let at = |h: i64| midnight(16) + Duration::hours(h);

        assert!(is_night_time(Some(&rec), &at(4)));
        assert!(!is_night_time(Some(&rec), &at(5)));
        assert!(!is_night_time(Some(&rec), &at(20)));
        assert!(is_night_time(Some(&rec), &at(21)), "sunset itself is night");
    }

    #[test]
    fn test_polar_day_and_night() {
        let mut polar_night = AstroRecord::new(midnight(16));
        polar_night.sun_never_rises = true;
        let mut midnight_sun = AstroRecord::new(midnight(16));
        midnight_sun.sun_never_sets = true;

        let noon = midnight(16) + Duration::hours(12);
        assert!(is_night_time(Some(&polar_night), &noon));
        assert!(!is_night_time(Some(&midnight_sun), &(noon + Duration::hours(11))));
    }

    #[test]
    fn test_night_fallback_uses_local_hour() {
        let tz = FixedOffset::east_opt(2 * 3600).unwrap();
        // 19:30 UTC is 21:30 at UTC+2
        let now = Utc.with_ymd_and_hms(2024, 6, 16, 19, 30, 0).unwrap().with_timezone(&tz);
        assert!(is_night_time(None, &now));

        let morning = Utc.with_ymd_and_hms(2024, 6, 16, 3, 0, 0).unwrap().with_timezone(&tz);
        assert!(!is_night_time(None, &morning), "05:00 local is day");
    }

    #[test]
    fn test_moon_phase_names() {
        assert_eq!("full moon".parse::<MoonPhase>(), Ok(MoonPhase::FullMoon));
        assert!("blue moon".parse::<MoonPhase>().is_err());
        assert_eq!(MoonPhase::from_index(9), MoonPhase::WaxingCrescent);

        let mut rec = AstroRecord::new(Utc.with_ymd_and_hms(2024, 1, 25, 0, 0, 0).unwrap());
        assert_eq!(rec.moon_phase_or_estimate(), MoonPhase::FullMoon);
        rec.moon_phase = Some(MoonPhase::WaningGibbous);
        assert_eq!(rec.moon_phase_or_estimate(), MoonPhase::WaningGibbous);
    }
}
